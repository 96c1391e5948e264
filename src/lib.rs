//! Lepton is a tiny single-volume file system with a flat namespace, built on a
//! FAT-style allocation table. No directories, permissions, timestamps or journaling.
//!
//! Lepton's linear layout, in clusters of 8 sectors:
//! - Clusters 0..32: File Allocation Table (one u16 code per cluster)
//! - Cluster 32:     Directory (128 fixed records)
//! - Clusters 33..:  File data
//!
//! Lepton's layers (from bottom to top):
//! 1. Block Device: sector storage, e.g. a host file.      | User implemented or `FileDisk`
//! 2. Cluster: whole-cluster I/O built from sectors.        | Fs implemented
//! 3. FAT / Directory: allocation and naming tables.        | Fs implemented
//! 4. Open File Table: descriptors with mode and cursors.   | Fs implemented
//! 5. File: chained reads and appends.                      | Fs implemented
//! 6. FileSystem: the volume every caller goes through.     | Fs implemented
//!
//! Both tables are written back after every change, so there is no separate sync call.

mod config;
mod error;
mod block_dev;
mod file_disk;
mod cluster;
mod structs;
mod fat;
mod directory;
mod ofile;
mod file;
mod layout;
mod fs;

pub use block_dev::BlockDevice;
pub use file_disk::FileDisk;
pub use config::*;
pub use cluster::*;
pub use structs::*;
pub use fat::*;
pub use directory::*;
pub use ofile::*;
pub use file::*;
pub use layout::*;
pub use fs::*;
pub use error::FsError as Error;
pub use error::Result;
