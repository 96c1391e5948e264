//! Open file table. Purely in memory, every mount starts with nothing open.

use log::debug;

use crate::config::MAX_OPEN_FILES;
use crate::error::{FsError, Result};
use crate::structs::OpenMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenFile {
    pub id: u32,
    pub mode: OpenMode,
    /// Index of the directory record this descriptor is bound to.
    pub dir_index: usize,
    /// Bytes appended so far in this session.
    pub write_counter: u32,
    /// Cluster holding the last byte read, or the first cluster before any read.
    /// `None` until the first read.
    pub read_cursor: Option<u16>,
    /// Bytes delivered so far.
    pub read_total: u32,
}

#[derive(Debug, Clone)]
pub struct OpenFileTable {
    slots: Vec<Option<OpenFile>>,
    next_id: u32,
}

impl OpenFileTable {
    pub fn new() -> Self {
        Self {
            slots: vec![None; MAX_OPEN_FILES],
            next_id: 1,
        }
    }

    /// Fails with `TooManyOpenFiles` when `allocate` would.
    pub fn check_allocate(&self) -> Result<usize> {
        self.slots
            .iter()
            .position(Option::is_none)
            .ok_or(FsError::TooManyOpenFiles)
    }

    /// Binds a fresh descriptor to the record at `dir_index`. Ids are never reused.
    pub fn allocate(&mut self, dir_index: usize, mode: OpenMode) -> Result<u32> {
        let slot = self.check_allocate()?;
        let id = self.next_id;
        self.next_id += 1;
        self.slots[slot] = Some(OpenFile {
            id,
            mode,
            dir_index,
            write_counter: 0,
            read_cursor: None,
            read_total: 0,
        });
        debug!("descriptor {} opened on record {} for {}", id, dir_index, mode);
        Ok(id)
    }

    pub fn release(&mut self, id: u32) -> Result<()> {
        let slot = self
            .slots
            .iter_mut()
            .find(|s| matches!(s, Some(f) if f.id == id))
            .ok_or(FsError::NotOpen)?;
        *slot = None;
        debug!("descriptor {} closed", id);
        Ok(())
    }

    pub fn lookup(&self, id: u32) -> Result<&OpenFile> {
        self.iter().find(|f| f.id == id).ok_or(FsError::NotOpen)
    }

    pub fn lookup_mut(&mut self, id: u32) -> Result<&mut OpenFile> {
        self.slots
            .iter_mut()
            .flatten()
            .find(|f| f.id == id)
            .ok_or(FsError::NotOpen)
    }

    pub fn iter(&self) -> impl Iterator<Item = &OpenFile> {
        self.slots.iter().flatten()
    }

    /// Whether any descriptor bound to `dir_index` is open, optionally only in `mode`.
    pub fn is_open(&self, dir_index: usize, mode: Option<OpenMode>) -> bool {
        self.iter()
            .any(|f| f.dir_index == dir_index && mode.is_none_or(|m| m == f.mode))
    }

    /// Closes every descriptor. Ids keep counting up.
    pub fn clear(&mut self) {
        self.slots.fill(None);
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for OpenFileTable {
    fn default() -> Self {
        Self::new()
    }
}
