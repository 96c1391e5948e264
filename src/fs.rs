use std::fmt::Write as _;
use std::sync::Arc;

use log::{debug, info};

use crate::cluster::device_clusters;
use crate::config::*;
use crate::file::{fread, fwrite};
use crate::layout::{check_disk, load_tables, store_tables};
use crate::{
    BlockDevice, Directory, Error, FileAllocTable, FileInfo, OpenFileTable, OpenMode, Result,
};

/// One mounted volume. Owns the allocation table, the directory and the open file table;
/// every operation goes through it. Callers sharing a volume across threads must wrap it
/// in a lock themselves.
#[derive(Debug)]
pub struct FileSystem<D: BlockDevice> {
    device: Arc<D>,
    fat: FileAllocTable,
    dir: Directory,
    ofiles: OpenFileTable,
}

impl<D: BlockDevice> FileSystem<D> {
    /// Loads the tables from the reserved clusters. An unformatted image mounts fine,
    /// the layout probe only warns about it.
    pub fn mount(device: Arc<D>) -> Result<Self> {
        let (fat, dir) = load_tables(&*device)?;
        info!(
            "mounted volume: {} sectors, {} clusters, {} files",
            device.num_sectors(),
            device_clusters(&*device),
            dir.used_count()
        );
        let fs_inst = Self {
            device,
            fat,
            dir,
            ofiles: OpenFileTable::new(),
        };
        fs_inst.check_disk();
        Ok(fs_inst)
    }

    /// Mounts `device` and formats it right away.
    pub fn format_device(device: Arc<D>) -> Result<Self> {
        let num_clusters = device_clusters(&*device);
        if num_clusters < FIRST_DATA_CLUSTER as usize {
            return Err(Error::DeviceTooSmall(num_clusters));
        }
        let mut fs_inst = Self {
            device,
            fat: FileAllocTable::new(num_clusters),
            dir: Directory::new(),
            ofiles: OpenFileTable::new(),
        };
        fs_inst.format()?;
        Ok(fs_inst)
    }

    /// Resets the table to its reserved layout, empties the directory and closes every
    /// open descriptor.
    pub fn format(&mut self) -> Result<()> {
        self.check_disk();
        info!("formatting volume");
        self.mutate(|fs| {
            fs.fat.format();
            fs.dir.format();
            fs.ofiles.clear();
            Ok(())
        })
    }

    /// Writes the allocation table and the directory back to their reserved clusters.
    pub fn flush(&self) -> Result<()> {
        store_tables(&*self.device, &self.fat, &self.dir)
    }

    /// Runs the layout probe. Logs a warning when it fails and never blocks anything.
    pub fn check_disk(&self) -> bool {
        check_disk(&self.fat)
    }

    /// Applies `op` and flushes. If either fails the in-memory tables go back to what
    /// they were, so memory never runs ahead of the last successful flush.
    fn mutate<T>(&mut self, op: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let fat = self.fat.clone();
        let dir = self.dir.clone();
        let ofiles = self.ofiles.clone();
        let result = op(self).and_then(|value| self.flush().map(|()| value));
        if result.is_err() {
            self.fat = fat;
            self.dir = dir;
            self.ofiles = ofiles;
        }
        result
    }

    pub fn free_space(&self) -> u64 {
        self.fat.free_count() as u64 * CLUSTER_SIZE as u64
    }

    pub fn list(&self) -> Vec<FileInfo> {
        self.dir.enumerate()
    }

    /// The listing as text, one `name\t\tsize` line per file.
    pub fn list_text(&self) -> String {
        let mut out = String::new();
        for info in self.list() {
            let _ = writeln!(out, "{}\t\t{}", info.name, info.size);
        }
        out
    }

    /// Creates an empty file owning one fresh cluster.
    pub fn create(&mut self, name: &str) -> Result<()> {
        self.check_disk();
        self.mutate(|fs| fs.create_record(name).map(|_| ()))
    }

    fn create_record(&mut self, name: &str) -> Result<usize> {
        self.dir.check_insert(name)?;
        let cluster = self.fat.find_free().ok_or(Error::DiskFull)?;
        self.fat.mark_chain_end(cluster);
        let index = self.dir.insert(name, cluster)?;
        debug!("created {} at cluster {}", name, cluster);
        Ok(index)
    }

    /// Drops the record at `index` down to size 0 with a single fresh cluster.
    fn truncate(&mut self, index: usize) -> Result<()> {
        let first = self.dir.get(index).first_cluster();
        self.fat.release_chain(first)?;
        let cluster = self.fat.find_free().ok_or(Error::DiskFull)?;
        self.fat.mark_chain_end(cluster);
        let entry = self.dir.get_mut(index);
        entry.set_first_cluster(cluster);
        entry.set_size(0);
        debug!("truncated {} to cluster {}", entry.name_str(), cluster);
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Result<()> {
        self.check_disk();
        let index = self.dir.find_by_name(name)?;
        if self.ofiles.is_open(index, None) {
            return Err(Error::Busy);
        }
        self.mutate(|fs| {
            let entry = fs.dir.remove(name)?;
            fs.fat.release_chain(entry.first_cluster())?;
            Ok(())
        })
    }

    /// Opens `name` and returns a descriptor id.
    ///
    /// Read mode needs an existing file. Write mode creates a missing file and truncates
    /// an existing one. A file being written can't be opened again, and a file with any
    /// descriptor open can't be opened for writing.
    pub fn open(&mut self, name: &str, mode: OpenMode) -> Result<u32> {
        self.check_disk();
        self.ofiles.check_allocate()?;
        let existing = self.dir.find_by_name(name).ok();
        match (existing, mode) {
            (Some(index), OpenMode::Read) => {
                if self.ofiles.is_open(index, Some(OpenMode::Write)) {
                    return Err(Error::Busy);
                }
                self.ofiles.allocate(index, OpenMode::Read)
            }
            (None, OpenMode::Read) => Err(Error::NotFound),
            (Some(index), OpenMode::Write) => {
                if self.ofiles.is_open(index, None) {
                    return Err(Error::Busy);
                }
                self.mutate(|fs| {
                    fs.truncate(index)?;
                    fs.ofiles.allocate(index, OpenMode::Write)
                })
            }
            (None, OpenMode::Write) => self.mutate(|fs| {
                let index = fs.create_record(name)?;
                fs.ofiles.allocate(index, OpenMode::Write)
            }),
        }
    }

    /// Releases the descriptor. The file's data is untouched.
    pub fn close(&mut self, fd: u32) -> Result<()> {
        self.ofiles.release(fd)
    }

    pub fn read(&mut self, fd: u32, buf: &mut [u8]) -> Result<usize> {
        let ofile = self.ofiles.lookup_mut(fd)?;
        fread(&*self.device, &self.fat, &self.dir, ofile, buf)
    }

    pub fn write(&mut self, fd: u32, buf: &[u8]) -> Result<usize> {
        let ofile = self.ofiles.lookup(fd)?;
        if ofile.mode != OpenMode::Write {
            return Err(Error::WrongMode { mode: ofile.mode });
        }
        if buf.is_empty() {
            return Ok(0);
        }
        self.mutate(|fs| {
            let ofile = fs.ofiles.lookup_mut(fd)?;
            fwrite(&*fs.device, &mut fs.fat, &mut fs.dir, ofile, buf)
        })
    }

    pub fn allocation_table(&self) -> &FileAllocTable {
        &self.fat
    }

    pub fn directory(&self) -> &Directory {
        &self.dir
    }

    pub fn open_files(&self) -> &OpenFileTable {
        &self.ofiles
    }

    pub fn capacity_sectors(&self) -> usize {
        self.device.num_sectors()
    }

    pub fn cluster_count(&self) -> usize {
        self.fat.num_clusters()
    }

    pub fn device(&self) -> Arc<D> {
        Arc::clone(&self.device)
    }
}
