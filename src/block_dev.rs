use crate::error::FsError;

pub trait BlockDevice: Send + Sync {
    /// Returns the number of sectors in the block device.
    fn num_sectors(&self) -> usize;

    /// Reads a sector of data from the block device.
    /// buf.len() must be equal to sector_size().
    fn read_sector(&self, sector_id: usize, buf: &mut [u8]) -> Result<(), FsError>;

    /// Writes a sector of data to the block device.
    /// buf.len() must be equal to sector_size().
    /// The data must have left the process once this returns Ok.
    fn write_sector(&self, sector_id: usize, buf: &[u8]) -> Result<(), FsError>;

    /// Forces previously written sectors down to stable storage.
    fn flush(&self) -> Result<(), FsError>;

    /// Returns the size of each sector in bytes.
    fn sector_size(&self) -> usize {
        crate::config::SECTOR_SIZE
    }
}
