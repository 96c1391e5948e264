use std::fs::File;
use std::io::{self, BufRead, Read, Write};

use anyhow::{Context, Result};
use lepton::{BlockDevice, CLUSTER_SIZE, FileSystem, OpenMode};

const COPY_BUFFER_SIZE: usize = CLUSTER_SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Line-oriented command interpreter. Every command is a thin wrapper over one or more
/// volume operations, the only validation done here is the argument count.
pub struct Shell<D: BlockDevice, W: Write> {
    fs: FileSystem<D>,
    out: W,
}

impl<D: BlockDevice, W: Write> Shell<D, W> {
    pub fn new(fs: FileSystem<D>, out: W) -> Self {
        Self { fs, out }
    }

    /// Prompts and executes lines until `exit` or end of input.
    pub fn run(&mut self, mut input: impl BufRead) -> io::Result<()> {
        let mut line = String::new();
        loop {
            write!(self.out, "> ")?;
            self.out.flush()?;
            line.clear();
            if input.read_line(&mut line)? == 0 {
                writeln!(self.out)?;
                return Ok(());
            }
            if self.execute(&line)? == Flow::Exit {
                return Ok(());
            }
        }
    }

    pub fn execute(&mut self, line: &str) -> io::Result<Flow> {
        let args: Vec<&str> = line.split_whitespace().collect();
        let Some((&command, rest)) = args.split_first() else {
            return Ok(Flow::Continue);
        };

        let outcome = match (command, rest) {
            ("exit", _) => return Ok(Flow::Exit),
            ("format", _) => self.format(),
            ("list", _) => Ok(self.list()),
            ("create", [file]) => self.create(file),
            ("create", _) => Ok("How-To-Use: create <file>".to_owned()),
            ("remove", [file]) => self.remove(file),
            ("remove", _) => Ok("How-To-Use: remove <file>".to_owned()),
            ("copy", [src, dst]) => self.copy(src, dst),
            ("copy", _) => Ok("How-To-Use: copy <file1> <file2>".to_owned()),
            ("copyf", [real, file]) => self.copy_from(real, file),
            ("copyf", _) => Ok("How-To-Use: copyf <real_file> <file>".to_owned()),
            ("copyt", [file, real]) => self.copy_to(file, real),
            ("copyt", _) => Ok("How-To-Use: copyt <file> <real_file>".to_owned()),
            _ => Ok("Invalid command.".to_owned()),
        };

        match outcome {
            Ok(message) => writeln!(self.out, "{message}")?,
            Err(err) => writeln!(self.out, "Error: {err:#}")?,
        }
        Ok(Flow::Continue)
    }

    fn format(&mut self) -> Result<String> {
        self.fs.format()?;
        Ok(format!(
            "Completed formatting. {} free bytes.",
            self.fs.free_space()
        ))
    }

    fn list(&self) -> String {
        format!("{}{} free bytes.", self.fs.list_text(), self.fs.free_space())
    }

    fn create(&mut self, file: &str) -> Result<String> {
        self.fs
            .create(file)
            .with_context(|| format!("creating {file}"))?;
        Ok(format!("Created {file}."))
    }

    fn remove(&mut self, file: &str) -> Result<String> {
        self.fs
            .remove(file)
            .with_context(|| format!("removing {file}"))?;
        Ok(format!("Removed {file}."))
    }

    /// Volume to volume copy.
    fn copy(&mut self, src: &str, dst: &str) -> Result<String> {
        let fd_src = self
            .fs
            .open(src, OpenMode::Read)
            .with_context(|| format!("opening {src}"))?;
        let fd_dst = match self.fs.open(dst, OpenMode::Write) {
            Ok(fd) => fd,
            Err(err) => {
                self.fs.close(fd_src)?;
                return Err(anyhow::Error::new(err).context(format!("opening {dst}")));
            }
        };

        let mut buffer = vec![0u8; COPY_BUFFER_SIZE];
        let mut copied = 0u64;
        let result = loop {
            let read = match self.fs.read(fd_src, &mut buffer) {
                Ok(0) => break Ok(()),
                Ok(read) => read,
                Err(err) => break Err(err),
            };
            if let Err(err) = self.fs.write(fd_dst, &buffer[..read]) {
                break Err(err);
            }
            copied += read as u64;
        };

        self.fs.close(fd_src)?;
        self.fs.close(fd_dst)?;
        result.with_context(|| format!("copying {src} to {dst}"))?;
        Ok(format!("Copied {copied} bytes from {src} to {dst}."))
    }

    /// Host file into the volume.
    fn copy_from(&mut self, real: &str, file: &str) -> Result<String> {
        let mut stream = File::open(real)
            .with_context(|| format!("opening real file {real} for copy (read mode)"))?;
        let fd = self
            .fs
            .open(file, OpenMode::Write)
            .with_context(|| format!("opening {file}"))?;

        let mut buffer = vec![0u8; COPY_BUFFER_SIZE];
        let mut copied = 0u64;
        let result: Result<()> = loop {
            let read = match stream.read(&mut buffer) {
                Ok(0) => break Ok(()),
                Ok(read) => read,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => break Err(err.into()),
            };
            if let Err(err) = self.fs.write(fd, &buffer[..read]) {
                break Err(err.into());
            }
            copied += read as u64;
        };

        self.fs.close(fd)?;
        result.with_context(|| format!("copying {real} to {file}"))?;
        Ok(format!("Copied {copied} bytes from {real} to {file}."))
    }

    /// Volume file out to the host.
    fn copy_to(&mut self, file: &str, real: &str) -> Result<String> {
        let fd = self
            .fs
            .open(file, OpenMode::Read)
            .with_context(|| format!("opening {file}"))?;
        let mut stream = match File::create(real) {
            Ok(stream) => stream,
            Err(err) => {
                self.fs.close(fd)?;
                return Err(anyhow::Error::new(err)
                    .context(format!("opening real file {real} for copy (write mode)")));
            }
        };

        let mut buffer = vec![0u8; COPY_BUFFER_SIZE];
        let mut copied = 0u64;
        let result: Result<()> = loop {
            let read = match self.fs.read(fd, &mut buffer) {
                Ok(0) => break Ok(()),
                Ok(read) => read,
                Err(err) => break Err(err.into()),
            };
            if let Err(err) = stream.write_all(&buffer[..read]) {
                break Err(err.into());
            }
            copied += read as u64;
        };

        self.fs.close(fd)?;
        result.with_context(|| format!("copying {file} to {real}"))?;
        Ok(format!("Copied {copied} bytes from {file} to {real}."))
    }

    #[cfg(test)]
    pub fn output(&self) -> &W {
        &self.out
    }

    #[cfg(test)]
    pub fn fs(&self) -> &FileSystem<D> {
        &self.fs
    }
}
