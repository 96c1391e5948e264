//! A block device backed by a regular file on the host.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::Mutex;

use fs2::FileExt;
use log::{debug, info};

use crate::config::SECTOR_SIZE;
use crate::error::{FsError, Result};
use crate::BlockDevice;

#[derive(Debug)]
pub struct FileDisk {
    inner: Mutex<File>,
    num_sectors: usize,
}

impl FileDisk {
    /// Opens `path` as-is if it already exists, its length deciding the capacity.
    /// Otherwise creates it and sizes it to `requested_sectors` sectors.
    ///
    /// The image is locked exclusively for the lifetime of the returned device.
    pub fn open_or_create(path: impl AsRef<Path>, requested_sectors: usize) -> Result<Self> {
        let path = path.as_ref();
        let file = if path.exists() {
            let file = OpenOptions::new().read(true).write(true).open(path)?;
            if !file.metadata()?.is_file() {
                return Err(FsError::Io(std::io::ErrorKind::InvalidInput));
            }
            info!("opened existing image {}", path.display());
            file
        } else {
            let bytes = requested_sectors
                .checked_mul(SECTOR_SIZE)
                .ok_or(FsError::InvalidDeviceSize)?;
            if bytes == 0 {
                return Err(FsError::InvalidDeviceSize);
            }
            let file = OpenOptions::new()
                .read(true)
                .write(true)
                .create_new(true)
                .open(path)?;
            file.set_len(bytes as u64)?;
            info!("created image {} with {} sectors", path.display(), requested_sectors);
            file
        };

        file.try_lock_exclusive().map_err(|_| FsError::Locked)?;

        let num_sectors = (file.metadata()?.len() / SECTOR_SIZE as u64) as usize;
        Ok(FileDisk {
            inner: Mutex::new(file),
            num_sectors,
        })
    }

    fn check(&self, sector_id: usize, len: usize) -> Result<u64> {
        if sector_id >= self.num_sectors {
            return Err(FsError::InvalidSector(sector_id));
        }
        if len != SECTOR_SIZE {
            return Err(FsError::BufferSize);
        }
        Ok((sector_id * SECTOR_SIZE) as u64)
    }
}

impl BlockDevice for FileDisk {
    fn num_sectors(&self) -> usize {
        self.num_sectors
    }

    fn read_sector(&self, sector_id: usize, buf: &mut [u8]) -> Result<()> {
        let start = self.check(sector_id, buf.len())?;
        let mut inner = self.inner.lock().map_err(|_| FsError::Io(std::io::ErrorKind::Other))?;
        inner.seek(SeekFrom::Start(start))?;
        inner.read_exact(buf)?;
        Ok(())
    }

    fn write_sector(&self, sector_id: usize, buf: &[u8]) -> Result<()> {
        let start = self.check(sector_id, buf.len())?;
        let mut inner = self.inner.lock().map_err(|_| FsError::Io(std::io::ErrorKind::Other))?;
        inner.seek(SeekFrom::Start(start))?;
        inner.write_all(buf)?;
        inner.flush()?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        let inner = self.inner.lock().map_err(|_| FsError::Io(std::io::ErrorKind::Other))?;
        inner.sync_data()?;
        debug!("image synced");
        Ok(())
    }
}
