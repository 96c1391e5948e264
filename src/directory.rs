//! The flat directory: a fixed table of records living in a single cluster.

use crate::config::*;
use crate::error::{FsError, Result};
use crate::structs::*;

pub fn trim_zero(name: &[u8]) -> &[u8] {
    let end = name.iter().position(|&c| c == 0).unwrap_or(name.len());
    &name[..end]
}

fn name_cmp(n1: &[u8], n2: &[u8]) -> bool {
    trim_zero(n1) == trim_zero(n2)
}

impl DirEntry {
    pub fn name_eq(&self, name: &[u8]) -> bool {
        name_cmp(&self.name, name)
    }

    pub fn name_str(&self) -> String {
        String::from_utf8_lossy(trim_zero(&self.name)).into_owned()
    }

    /// Marks the record unused and clears its name. The size and first cluster are
    /// left as they were, like the on-disk format always did.
    pub fn clear(&mut self) {
        self.used = 0;
        self.name = [0; DIR_NAME_FIELD_LEN];
    }
}

#[derive(Debug, Clone)]
pub struct Directory {
    entries: Vec<DirEntry>,
}

impl Directory {
    /// A formatted directory, every record unused.
    pub fn new() -> Self {
        Self {
            entries: vec![DirEntry::NULL; MAX_DIR_ENTRIES],
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        debug_assert_eq!(bytes.len(), MAX_DIR_ENTRIES * DIR_ENTRY_SIZE);
        let entries = bytes
            .chunks_exact(DIR_ENTRY_SIZE)
            .map(bytemuck::pod_read_unaligned::<DirEntry>)
            .collect();
        Self { entries }
    }

    pub fn write_bytes(&self, out: &mut [u8]) {
        debug_assert_eq!(out.len(), MAX_DIR_ENTRIES * DIR_ENTRY_SIZE);
        for (raw, entry) in out.chunks_exact_mut(DIR_ENTRY_SIZE).zip(&self.entries) {
            raw.copy_from_slice(bytemuck::bytes_of(entry));
        }
    }

    pub fn format(&mut self) {
        self.entries.fill(DirEntry::NULL);
    }

    /// Index of the used record called `name`.
    pub fn find_by_name(&self, name: &str) -> Result<usize> {
        self.entries
            .iter()
            .position(|e| e.is_used() && e.name_eq(name.as_bytes()))
            .ok_or(FsError::NotFound)
    }

    pub fn get(&self, index: usize) -> &DirEntry {
        &self.entries[index]
    }

    pub fn get_mut(&mut self, index: usize) -> &mut DirEntry {
        &mut self.entries[index]
    }

    /// Checks that `name` could be inserted right now, without inserting it.
    pub fn check_insert(&self, name: &str) -> Result<usize> {
        // Validates the name before anything else.
        DirEntry::new(name.as_bytes(), NO_CLUSTER)?;
        if self.find_by_name(name).is_ok() {
            return Err(FsError::AlreadyExists);
        }
        self.entries
            .iter()
            .position(|e| !e.is_used())
            .ok_or(FsError::DirectoryFull)
    }

    /// Puts a new record into the first unused slot and returns its index.
    pub fn insert(&mut self, name: &str, first_cluster: u16) -> Result<usize> {
        let index = self.check_insert(name)?;
        self.entries[index] = DirEntry::new(name.as_bytes(), first_cluster)?;
        Ok(index)
    }

    /// Drops the record called `name` and returns it.
    /// Releasing its cluster chain is the caller's responsibility.
    pub fn remove(&mut self, name: &str) -> Result<DirEntry> {
        let index = self.find_by_name(name)?;
        let removed = self.entries[index];
        self.entries[index].clear();
        Ok(removed)
    }

    pub fn enumerate(&self) -> Vec<FileInfo> {
        self.entries
            .iter()
            .filter(|e| e.is_used())
            .map(|e| FileInfo {
                name: e.name_str(),
                size: e.size(),
            })
            .collect()
    }

    pub fn used_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_used()).count()
    }
}

impl Default for Directory {
    fn default() -> Self {
        Self::new()
    }
}
