//! Persistence of the reserved region: the allocation table in clusters 0..32 and the
//! directory in cluster 32.

use log::warn;

use crate::cluster::{cluster_buf, device_clusters, read_cluster, write_cluster};
use crate::config::*;
use crate::{BlockDevice, Directory, Error, FatEntry, FileAllocTable, Result};

/// Reads both tables from their reserved clusters.
pub fn load_tables<D: BlockDevice>(device: &D) -> Result<(FileAllocTable, Directory)> {
    let num_clusters = device_clusters(device);
    if num_clusters < FIRST_DATA_CLUSTER as usize {
        return Err(Error::DeviceTooSmall(num_clusters));
    }

    let mut buf = cluster_buf();
    let mut fat_bytes = vec![0u8; FAT_CLUSTERS * CLUSTER_SIZE];
    for (i, chunk) in fat_bytes.chunks_exact_mut(CLUSTER_SIZE).enumerate() {
        read_cluster(device, i as u16, &mut buf)?;
        chunk.copy_from_slice(&buf[..]);
    }
    let fat = FileAllocTable::from_bytes(&fat_bytes, num_clusters);

    read_cluster(device, DIR_CLUSTER, &mut buf)?;
    let dir = Directory::from_bytes(&buf[..]);

    Ok((fat, dir))
}

/// Writes both tables back as one unit and syncs the device.
pub fn store_tables<D: BlockDevice>(device: &D, fat: &FileAllocTable, dir: &Directory) -> Result<()> {
    let mut fat_bytes = vec![0u8; FAT_CLUSTERS * CLUSTER_SIZE];
    fat.write_bytes(&mut fat_bytes);

    let mut buf = cluster_buf();
    for (i, chunk) in fat_bytes.chunks_exact(CLUSTER_SIZE).enumerate() {
        buf.copy_from_slice(chunk);
        write_cluster(device, i as u16, &buf)?;
    }

    dir.write_bytes(&mut buf[..]);
    write_cluster(device, DIR_CLUSTER, &buf)?;
    device.flush()?;
    Ok(())
}

/// Advisory probe of the reserved region. Only logs, callers go on regardless.
pub fn check_disk(fat: &FileAllocTable) -> bool {
    if !(0..FAT_CLUSTERS as u16).all(|c| fat.lookup(c) == FatEntry::ReservedTable) {
        warn!("volume is not formatted");
        return false;
    }
    if fat.lookup(DIR_CLUSTER) != FatEntry::ReservedDir {
        warn!("directory region is compromised");
        return false;
    }
    debug_assert!(fat.validate_layout());
    true
}
