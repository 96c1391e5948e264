use std::io;

use thiserror::Error;

use crate::structs::OpenMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FsError {
    #[error("device I/O error: {0}")]
    Io(io::ErrorKind),
    #[error("sector {0} is out of range")]
    InvalidSector(usize),
    #[error("buffer length does not match the sector size")]
    BufferSize,
    #[error("image can't have size 0")]
    InvalidDeviceSize,
    #[error("device holds only {0} clusters, too few for the reserved layout")]
    DeviceTooSmall(usize),
    #[error("image is locked by another process")]
    Locked,
    #[error("file doesn't exist")]
    NotFound,
    #[error("file already exists")]
    AlreadyExists,
    #[error("invalid file name")]
    InvalidFileName,
    #[error("directory is full")]
    DirectoryFull,
    #[error("disk is full")]
    DiskFull,
    #[error("too many open files")]
    TooManyOpenFiles,
    #[error("file is currently in {mode} mode")]
    WrongMode { mode: OpenMode },
    #[error("file isn't opened or doesn't exist")]
    NotOpen,
    #[error("file is in use by another descriptor")]
    Busy,
    #[error("corrupt cluster chain at cluster {0}")]
    CorruptChain(u16),
    #[error("file too large")]
    FileTooLarge,
}

impl From<io::Error> for FsError {
    fn from(err: io::Error) -> Self {
        FsError::Io(err.kind())
    }
}

pub type Result<T> = core::result::Result<T, FsError>;
