//! Byte-range reads and appends over cluster chains.

use log::debug;

use crate::cluster::{cluster_buf, read_cluster, write_cluster};
use crate::config::CLUSTER_SIZE;
use crate::{BlockDevice, Directory, Error, FileAllocTable, OpenFile, OpenMode, Result};

/// Reads from the descriptor's read position into `buffer`.
/// Returns the number of bytes read, 0 at end of file.
pub fn fread(
    device: &impl BlockDevice,
    fat: &FileAllocTable,
    dir: &Directory,
    ofile: &mut OpenFile,
    buffer: &mut [u8],
) -> Result<usize> {
    if ofile.mode != OpenMode::Read {
        return Err(Error::WrongMode { mode: ofile.mode });
    }

    let entry = dir.get(ofile.dir_index);
    let mut cursor = ofile.read_cursor.unwrap_or(entry.first_cluster());
    let remaining = entry.size().saturating_sub(ofile.read_total) as usize;
    let len = buffer.len().min(remaining);
    if len == 0 {
        return Ok(0);
    }

    // Work on copies of the cursor state so a failed device read changes nothing.
    let mut total = ofile.read_total as usize;
    let mut bytes_read = 0;
    let mut cluster_data = cluster_buf();

    while bytes_read < len {
        let offset = total % CLUSTER_SIZE;
        if offset == 0 && total > 0 {
            cursor = fat.next(cursor)?.ok_or(Error::CorruptChain(cursor))?;
        }
        let bytes_to_read = (CLUSTER_SIZE - offset).min(len - bytes_read);
        read_cluster(device, cursor, &mut cluster_data)?;
        buffer[bytes_read..bytes_read + bytes_to_read]
            .copy_from_slice(&cluster_data[offset..offset + bytes_to_read]);

        bytes_read += bytes_to_read;
        total += bytes_to_read;
    }

    ofile.read_cursor = Some(cursor);
    ofile.read_total = total as u32;
    Ok(bytes_read)
}

/// Appends `buffer` to the end of the descriptor's file, growing the chain as needed.
/// Returns the number of bytes written.
///
/// Fresh clusters are reserved up front: either every byte fits or nothing is touched.
/// Data clusters are written before the table is linked, so a device error leaves the
/// table as it was.
pub fn fwrite(
    device: &impl BlockDevice,
    fat: &mut FileAllocTable,
    dir: &mut Directory,
    ofile: &mut OpenFile,
    buffer: &[u8],
) -> Result<usize> {
    if ofile.mode != OpenMode::Write {
        return Err(Error::WrongMode { mode: ofile.mode });
    }
    if buffer.is_empty() {
        return Ok(0);
    }

    let new_size = u32::try_from(buffer.len())
        .ok()
        .and_then(|len| ofile.write_counter.checked_add(len))
        .ok_or(Error::FileTooLarge)?;

    let first = dir.get(ofile.dir_index).first_cluster();
    let tail = fat.tail(first)?;
    let counter = ofile.write_counter as usize;
    let offset = counter % CLUSTER_SIZE;

    // An exactly filled tail has no room, the next byte starts a new cluster.
    let room = if counter == 0 || offset != 0 {
        CLUSTER_SIZE - offset
    } else {
        0
    };
    let head_len = room.min(buffer.len());
    let needed = (buffer.len() - head_len).div_ceil(CLUSTER_SIZE);
    let fresh = match needed {
        0 => Vec::new(),
        n => fat.find_free_n(n).ok_or(Error::DiskFull)?,
    };

    let mut cluster_data = cluster_buf();
    if head_len > 0 {
        if offset > 0 {
            read_cluster(device, tail, &mut cluster_data)?;
        }
        cluster_data[offset..offset + head_len].copy_from_slice(&buffer[..head_len]);
        write_cluster(device, tail, &cluster_data)?;
    }

    let mut bytes_written = head_len;
    for &cluster in &fresh {
        let bytes_to_write = CLUSTER_SIZE.min(buffer.len() - bytes_written);
        cluster_data.fill(0);
        cluster_data[..bytes_to_write]
            .copy_from_slice(&buffer[bytes_written..bytes_written + bytes_to_write]);
        write_cluster(device, cluster, &cluster_data)?;
        bytes_written += bytes_to_write;
    }

    let mut prev = tail;
    for &cluster in &fresh {
        fat.link(prev, cluster);
        prev = cluster;
    }
    if !fresh.is_empty() {
        fat.mark_chain_end(prev);
        debug!("chain at cluster {} grew by {} clusters", first, fresh.len());
    }

    ofile.write_counter = new_size;
    dir.get_mut(ofile.dir_index).set_size(new_size);
    Ok(bytes_written)
}
