//! The in-memory file allocation table.
//! Every cluster has one entry. Reserved entries cover the table's own clusters and the
//! directory cluster, data clusters are either free or part of exactly one file chain.

use log::debug;

use crate::config::*;
use crate::error::{FsError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatEntry {
    Free,
    ReservedTable,
    ReservedDir,
    ChainEnd,
    /// Allocated and not last, holds the index of the next cluster.
    Next(u16),
    /// Raw code outside every known class, e.g. on a never formatted image.
    Invalid(u16),
}

impl FatEntry {
    pub fn from_raw(raw: u16) -> Self {
        match raw {
            FAT_FREE => FatEntry::Free,
            FAT_CHAIN_END => FatEntry::ChainEnd,
            FAT_RESERVED_TABLE => FatEntry::ReservedTable,
            FAT_RESERVED_DIR => FatEntry::ReservedDir,
            n if n >= FIRST_DATA_CLUSTER => FatEntry::Next(n),
            n => FatEntry::Invalid(n),
        }
    }

    pub fn to_raw(self) -> u16 {
        match self {
            FatEntry::Free => FAT_FREE,
            FatEntry::ChainEnd => FAT_CHAIN_END,
            FatEntry::ReservedTable => FAT_RESERVED_TABLE,
            FatEntry::ReservedDir => FAT_RESERVED_DIR,
            FatEntry::Next(n) | FatEntry::Invalid(n) => n,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileAllocTable {
    entries: Vec<FatEntry>,
    /// Clusters actually backed by the device, never more than FAT_ENTRIES.
    num_clusters: usize,
}

impl FileAllocTable {
    /// A freshly formatted table: reserved region marked, everything else free.
    pub fn new(num_clusters: usize) -> Self {
        let mut fat = Self {
            entries: vec![FatEntry::Free; FAT_ENTRIES],
            num_clusters: num_clusters.min(FAT_ENTRIES),
        };
        fat.format();
        fat
    }

    /// Decodes the little-endian on-disk image of the table.
    pub fn from_bytes(bytes: &[u8], num_clusters: usize) -> Self {
        debug_assert_eq!(bytes.len(), FAT_ENTRIES * FAT_ENTRY_SIZE);
        let entries = bytes
            .chunks_exact(FAT_ENTRY_SIZE)
            .map(|raw| FatEntry::from_raw(u16::from_le_bytes([raw[0], raw[1]])))
            .collect();
        Self {
            entries,
            num_clusters: num_clusters.min(FAT_ENTRIES),
        }
    }

    pub fn write_bytes(&self, out: &mut [u8]) {
        debug_assert_eq!(out.len(), FAT_ENTRIES * FAT_ENTRY_SIZE);
        for (raw, entry) in out.chunks_exact_mut(FAT_ENTRY_SIZE).zip(&self.entries) {
            raw.copy_from_slice(&entry.to_raw().to_le_bytes());
        }
    }

    pub fn format(&mut self) {
        for (i, entry) in self.entries.iter_mut().enumerate() {
            *entry = match i {
                i if i < FAT_CLUSTERS => FatEntry::ReservedTable,
                i if i == DIR_CLUSTER as usize => FatEntry::ReservedDir,
                _ => FatEntry::Free,
            };
        }
    }

    pub fn num_clusters(&self) -> usize {
        self.num_clusters
    }

    pub fn lookup(&self, cluster: u16) -> FatEntry {
        self.entries[cluster as usize]
    }

    pub fn link(&mut self, cluster: u16, target: u16) {
        debug_assert!(target >= FIRST_DATA_CLUSTER);
        self.entries[cluster as usize] = FatEntry::Next(target);
    }

    pub fn mark_free(&mut self, cluster: u16) {
        self.entries[cluster as usize] = FatEntry::Free;
    }

    pub fn mark_chain_end(&mut self, cluster: u16) {
        self.entries[cluster as usize] = FatEntry::ChainEnd;
    }

    fn data_clusters(&self) -> impl Iterator<Item = u16> + '_ {
        (FIRST_DATA_CLUSTER as usize..self.num_clusters).map(|c| c as u16)
    }

    /// First free data cluster by ascending index.
    pub fn find_free(&self) -> Option<u16> {
        self.data_clusters().find(|&c| self.lookup(c) == FatEntry::Free)
    }

    /// The first `count` free data clusters by ascending index, the same clusters
    /// `count` successive allocations through `find_free` would hand out.
    pub fn find_free_n(&self, count: usize) -> Option<Vec<u16>> {
        let found: Vec<u16> = self
            .data_clusters()
            .filter(|&c| self.lookup(c) == FatEntry::Free)
            .take(count)
            .collect();
        (found.len() == count).then_some(found)
    }

    pub fn free_count(&self) -> usize {
        self.data_clusters()
            .filter(|&c| self.lookup(c) == FatEntry::Free)
            .count()
    }

    /// Follows one link. `None` means `cluster` ends its chain.
    pub fn next(&self, cluster: u16) -> Result<Option<u16>> {
        if cluster < FIRST_DATA_CLUSTER || cluster as usize >= self.num_clusters {
            return Err(FsError::CorruptChain(cluster));
        }
        match self.lookup(cluster) {
            FatEntry::ChainEnd => Ok(None),
            FatEntry::Next(next) if (next as usize) < self.num_clusters => Ok(Some(next)),
            _ => Err(FsError::CorruptChain(cluster)),
        }
    }

    /// Every cluster of the chain starting at `first`, in order.
    /// A chain can't be longer than the data region, so a walk past that is a cycle.
    pub fn chain(&self, first: u16) -> Result<Vec<u16>> {
        let limit = self.num_clusters.saturating_sub(FIRST_DATA_CLUSTER as usize);
        let mut clusters = vec![first];
        let mut cur = first;
        while let Some(next) = self.next(cur)? {
            if clusters.len() >= limit {
                return Err(FsError::CorruptChain(next));
            }
            clusters.push(next);
            cur = next;
        }
        Ok(clusters)
    }

    /// The cluster coded as chain end for the chain starting at `first`.
    pub fn tail(&self, first: u16) -> Result<u16> {
        let chain = self.chain(first)?;
        Ok(chain[chain.len() - 1])
    }

    /// Frees the whole chain. The chain is walked completely before anything is
    /// freed, a corrupt chain leaves the table untouched.
    pub fn release_chain(&mut self, first: u16) -> Result<usize> {
        let chain = self.chain(first)?;
        for &cluster in &chain {
            self.mark_free(cluster);
        }
        debug!("released chain at cluster {} ({} clusters)", first, chain.len());
        Ok(chain.len())
    }

    /// True iff the table's own clusters and the directory cluster carry their reserved codes.
    pub fn validate_layout(&self) -> bool {
        self.entries[..FAT_CLUSTERS]
            .iter()
            .all(|&e| e == FatEntry::ReservedTable)
            && self.lookup(DIR_CLUSTER) == FatEntry::ReservedDir
    }
}
