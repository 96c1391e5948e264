mod logger;
mod shell;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use lepton::{BlockDevice, FileDisk, FileSystem, SECTOR_SIZE, SECTORS_PER_MB};

use shell::Shell;

#[derive(Debug, Parser)]
#[command(name = "lepton")]
#[command(about = "Interactive shell over a lepton volume image")]
struct Cli {
    /// Disk image file, created when it doesn't exist yet.
    image: PathBuf,
    /// Size of a newly created image in MB.
    size_mb: Option<usize>,
    /// error|warn|info|debug|trace, falls back to $LEPTON_LOG, then warn.
    #[arg(long = "log-level")]
    log_level: Option<String>,
}

fn run(cli: Cli) -> Result<()> {
    logger::init(cli.log_level.as_deref())?;

    let requested_sectors = cli.size_mb.map_or(0, |mb| mb * SECTORS_PER_MB);
    let disk = FileDisk::open_or_create(&cli.image, requested_sectors)
        .with_context(|| format!("opening image {}", cli.image.display()))?;
    println!("Image file {} opened.", cli.image.display());
    println!(
        "Size {} sectors ({} bytes).",
        disk.num_sectors(),
        disk.num_sectors() * SECTOR_SIZE
    );

    let fs = FileSystem::mount(Arc::new(disk)).context("loading volume tables")?;
    let mut shell = Shell::new(fs, io::stdout().lock());
    shell.run(io::stdin().lock())?;
    Ok(())
}

fn main() -> Result<()> {
    run(Cli::parse())
}
