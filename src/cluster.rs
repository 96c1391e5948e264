//! Cluster I/O. A cluster is SECTORS_PER_CLUSTER contiguous sectors, moved as one unit.

use log::trace;

use crate::config::*;
use crate::{BlockDevice, Result};

pub type ClusterBuf = [u8; CLUSTER_SIZE];

/// Allocates a zeroed cluster buffer on the heap.
pub fn cluster_buf() -> Box<ClusterBuf> {
    Box::new([0u8; CLUSTER_SIZE])
}

pub fn read_cluster(device: &impl BlockDevice, cluster: u16, buf: &mut ClusterBuf) -> Result<()> {
    trace!("read cluster {}", cluster);
    let first_sector = cluster as usize * SECTORS_PER_CLUSTER;
    for (i, sector) in buf.chunks_exact_mut(SECTOR_SIZE).enumerate() {
        device.read_sector(first_sector + i, sector)?;
    }
    Ok(())
}

pub fn write_cluster(device: &impl BlockDevice, cluster: u16, buf: &ClusterBuf) -> Result<()> {
    trace!("write cluster {}", cluster);
    let first_sector = cluster as usize * SECTORS_PER_CLUSTER;
    for (i, sector) in buf.chunks_exact(SECTOR_SIZE).enumerate() {
        device.write_sector(first_sector + i, sector)?;
    }
    Ok(())
}

/// Number of whole clusters the device can hold.
pub fn device_clusters(device: &impl BlockDevice) -> usize {
    device.num_sectors() / SECTORS_PER_CLUSTER
}
