//! Common utilities for tests
#![allow(dead_code)]

use std::io::ErrorKind;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use lepton::{BlockDevice, Error, FileSystem, OpenMode, SECTOR_SIZE, SECTORS_PER_CLUSTER};

pub const ORANGE: &str = "\x1b[38;5;214m";
pub const RESET: &str = "\x1b[0m";

/// Provides a macro for logging messages during tests.
/// e.g. log!("placeholder") -> println!("[test] placeholder");
#[macro_export]
macro_rules! log {
    ($msg:expr) => {
        println!("{}[test] {}{}", crate::common::ORANGE, $msg, crate::common::RESET)
    };
    ($msg:expr, $($arg:tt)*) => {
        println!("{}[test] {}{}", crate::common::ORANGE, format!($msg, $($arg)*), crate::common::RESET)
    };
}

pub struct RamDisk {
    inner: Arc<Mutex<Vec<u8>>>,
    num_sectors: usize,
    read_only: AtomicBool,
}

impl RamDisk {
    /// Creates a new RamDisk with the specified number of sectors.
    /// Each sector is SECTOR_SIZE bytes, zero filled like a fresh image.
    pub fn new(num_sectors: usize) -> Self {
        let size = num_sectors * SECTOR_SIZE;
        let inner = Arc::new(Mutex::new(vec![0u8; size]));
        RamDisk {
            inner,
            num_sectors,
            read_only: AtomicBool::new(false),
        }
    }

    pub fn with_clusters(num_clusters: usize) -> Self {
        Self::new(num_clusters * SECTORS_PER_CLUSTER)
    }

    /// While set, every sector write fails.
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    pub fn bytes(&self, start: usize, len: usize) -> Vec<u8> {
        self.inner.lock().unwrap()[start..start + len].to_vec()
    }

    /// Overwrites raw image bytes behind the file system's back.
    pub fn poke(&self, start: usize, bytes: &[u8]) {
        self.inner.lock().unwrap()[start..start + bytes.len()].copy_from_slice(bytes);
    }
}

impl BlockDevice for RamDisk {
    fn num_sectors(&self) -> usize {
        self.num_sectors
    }

    fn read_sector(&self, sector_id: usize, buf: &mut [u8]) -> Result<(), Error> {
        if sector_id >= self.num_sectors {
            return Err(Error::InvalidSector(sector_id));
        }
        if buf.len() != SECTOR_SIZE {
            return Err(Error::BufferSize);
        }
        let start = sector_id * SECTOR_SIZE;
        let end = start + SECTOR_SIZE;
        let data = self.inner.lock().unwrap();
        buf.copy_from_slice(&data[start..end]);
        Ok(())
    }

    fn write_sector(&self, sector_id: usize, buf: &[u8]) -> Result<(), Error> {
        if self.read_only.load(Ordering::SeqCst) {
            return Err(Error::Io(ErrorKind::PermissionDenied));
        }
        if sector_id >= self.num_sectors {
            return Err(Error::InvalidSector(sector_id));
        }
        if buf.len() != SECTOR_SIZE {
            return Err(Error::BufferSize);
        }
        let start = sector_id * SECTOR_SIZE;
        let end = start + SECTOR_SIZE;
        let mut data = self.inner.lock().unwrap();
        data[start..end].copy_from_slice(buf);
        Ok(())
    }

    fn flush(&self) -> Result<(), Error> {
        // In a RAM disk, flushing is a no-op since data is already in memory.
        Ok(())
    }
}

/// A formatted volume over a fresh RamDisk, plus a handle on the disk itself.
pub fn formatted(num_clusters: usize) -> (Arc<RamDisk>, FileSystem<RamDisk>) {
    let rd = Arc::new(RamDisk::with_clusters(num_clusters));
    let fs = FileSystem::format_device(Arc::clone(&rd)).unwrap();
    (rd, fs)
}

/// Deterministic, non-repeating-per-cluster test bytes.
pub fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 31 % 251) as u8).collect()
}

/// Writes `data` into a fresh `name` in `chunk`-sized calls, then closes it.
pub fn write_file(fs: &mut FileSystem<RamDisk>, name: &str, data: &[u8], chunk: usize) {
    let fd = fs.open(name, OpenMode::Write).unwrap();
    for piece in data.chunks(chunk) {
        assert_eq!(fs.write(fd, piece).unwrap(), piece.len());
    }
    fs.close(fd).unwrap();
}

/// Reads `name` to its end in `chunk`-sized calls.
pub fn read_file(fs: &mut FileSystem<RamDisk>, name: &str, chunk: usize) -> Vec<u8> {
    let fd = fs.open(name, OpenMode::Read).unwrap();
    let mut out = Vec::new();
    let mut buf = vec![0u8; chunk];
    loop {
        let n = fs.read(fd, &mut buf).unwrap();
        if n == 0 {
            break;
        }
        out.extend_from_slice(&buf[..n]);
    }
    fs.close(fd).unwrap();
    out
}
