use core::fmt;

use bytemuck::{Pod, Zeroable};

use crate::config::*;
use crate::Error;
use crate::Result;

/// One directory record exactly as it sits in the directory cluster.
/// Multi-byte fields are little-endian byte arrays so the record has no padding.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct DirEntry {
    pub used: u8,
    pub name: [u8; DIR_NAME_FIELD_LEN],
    first_cluster: [u8; 2],
    size: [u8; 4],
}

const _: () = assert!(core::mem::size_of::<DirEntry>() == DIR_ENTRY_SIZE);

impl DirEntry {
    pub const NULL: Self = Self {
        used: 0,
        name: [0; DIR_NAME_FIELD_LEN],
        first_cluster: NO_CLUSTER.to_le_bytes(),
        size: [0; 4],
    };

    pub fn new(name: &[u8], first_cluster: u16) -> Result<Self> {
        if name.is_empty() || name.len() > MAX_FILE_NAME_LEN || name.contains(&0) {
            return Err(Error::InvalidFileName);
        }
        let mut entry = Self::NULL;
        entry.used = 1;
        entry.name[..name.len()].copy_from_slice(name);
        entry.set_first_cluster(first_cluster);
        Ok(entry)
    }

    pub fn is_used(&self) -> bool {
        self.used == 1
    }

    pub fn first_cluster(&self) -> u16 {
        u16::from_le_bytes(self.first_cluster)
    }

    pub fn set_first_cluster(&mut self, cluster: u16) {
        self.first_cluster = cluster.to_le_bytes();
    }

    pub fn size(&self) -> u32 {
        u32::from_le_bytes(self.size)
    }

    pub fn set_size(&mut self, size: u32) {
        self.size = size.to_le_bytes();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    Read,
    Write,
}

impl fmt::Display for OpenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpenMode::Read => f.write_str("read"),
            OpenMode::Write => f.write_str("write"),
        }
    }
}

/// A listing line: a used record's name and byte length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub name: String,
    pub size: u32,
}
