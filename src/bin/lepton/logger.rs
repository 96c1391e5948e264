use anyhow::{anyhow, Result};
use log::{Level, LevelFilter, Log, Metadata, Record};

const LOG_ENV: &str = "LEPTON_LOG";

/// Coloured level tag on stderr, so log lines never mix into command output.
struct ShellLogger {
    level: LevelFilter,
}

impl Log for ShellLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let color = match record.level() {
            Level::Error => 31, // Red
            Level::Warn => 93,  // BrightYellow
            Level::Info => 34,  // Blue
            Level::Debug => 32, // Green
            Level::Trace => 90, // BrightBlack
        };
        eprintln!(
            "\u{1B}[{}m[{:>5}] {}\u{1B}[0m",
            color,
            record.level(),
            record.args(),
        );
    }

    fn flush(&self) {}
}

fn parse_level(raw: &str) -> Result<LevelFilter> {
    raw.parse()
        .map_err(|_| anyhow!("Invalid log level `{raw}` (use error|warn|info|debug|trace)"))
}

pub fn init(flag: Option<&str>) -> Result<()> {
    let level = match flag {
        Some(raw) => parse_level(raw)?,
        None => match std::env::var(LOG_ENV) {
            Ok(raw) => parse_level(&raw)?,
            Err(_) => LevelFilter::Warn,
        },
    };
    log::set_boxed_logger(Box::new(ShellLogger { level }))?;
    log::set_max_level(level);
    Ok(())
}
