mod common;

use lepton::{
    Error, FatEntry, FileAllocTable, DIR_CLUSTER, FAT_CLUSTERS, FAT_ENTRIES, FAT_ENTRY_SIZE,
    FIRST_DATA_CLUSTER,
};

#[test]
fn test_raw_codes() {
    assert_eq!(FatEntry::from_raw(1), FatEntry::Free);
    assert_eq!(FatEntry::from_raw(2), FatEntry::ChainEnd);
    assert_eq!(FatEntry::from_raw(3), FatEntry::ReservedTable);
    assert_eq!(FatEntry::from_raw(4), FatEntry::ReservedDir);
    assert_eq!(FatEntry::from_raw(33), FatEntry::Next(33));
    assert_eq!(FatEntry::from_raw(0xFFFF), FatEntry::Next(0xFFFF));
    assert_eq!(FatEntry::from_raw(0), FatEntry::Invalid(0));
    assert_eq!(FatEntry::from_raw(17), FatEntry::Invalid(17));
    for raw in [0u16, 1, 2, 3, 4, 17, 33, 4096] {
        assert_eq!(FatEntry::from_raw(raw).to_raw(), raw);
    }
}

#[test]
fn test_new_table_layout() {
    let fat = FileAllocTable::new(64);
    assert!(fat.validate_layout());
    assert_eq!(fat.num_clusters(), 64);
    assert_eq!(fat.free_count(), 64 - 33);
    for c in 0..FAT_CLUSTERS as u16 {
        assert_eq!(fat.lookup(c), FatEntry::ReservedTable);
    }
    assert_eq!(fat.lookup(DIR_CLUSTER), FatEntry::ReservedDir);
    assert_eq!(fat.lookup(FIRST_DATA_CLUSTER), FatEntry::Free);

    // Entries past the device end are never handed out.
    let fat = FileAllocTable::new(100_000);
    assert_eq!(fat.num_clusters(), FAT_ENTRIES);
    assert_eq!(fat.free_count(), FAT_ENTRIES - 33);
}

#[test]
fn test_allocation_order() {
    let mut fat = FileAllocTable::new(40);
    assert_eq!(fat.find_free(), Some(33));
    fat.mark_chain_end(33);
    fat.mark_chain_end(35);
    assert_eq!(fat.find_free(), Some(34));
    assert_eq!(fat.find_free_n(3), Some(vec![34, 36, 37]));
    assert_eq!(fat.find_free_n(5), Some(vec![34, 36, 37, 38, 39]));
    assert_eq!(fat.find_free_n(6), None);
    assert_eq!(fat.find_free_n(0), Some(vec![]));
    assert_eq!(fat.free_count(), 5);
}

#[test]
fn test_chain_walk_and_release() {
    let mut fat = FileAllocTable::new(64);
    fat.link(33, 40);
    fat.link(40, 34);
    fat.mark_chain_end(34);
    assert_eq!(fat.next(33), Ok(Some(40)));
    assert_eq!(fat.next(34), Ok(None));
    assert_eq!(fat.chain(33), Ok(vec![33, 40, 34]));
    assert_eq!(fat.tail(33), Ok(34));
    assert_eq!(fat.free_count(), 31 - 3);

    assert_eq!(fat.release_chain(33), Ok(3));
    assert_eq!(fat.free_count(), 31);
    for c in [33, 34, 40] {
        assert_eq!(fat.lookup(c), FatEntry::Free);
    }
}

#[test]
fn test_corrupt_chains() {
    let mut fat = FileAllocTable::new(64);

    // A cycle.
    fat.link(33, 34);
    fat.link(34, 33);
    assert!(matches!(fat.chain(33), Err(Error::CorruptChain(_))));
    assert!(matches!(fat.release_chain(33), Err(Error::CorruptChain(_))));
    assert_eq!(fat.lookup(33), FatEntry::Next(34));
    assert_eq!(fat.lookup(34), FatEntry::Next(33));

    // A link into a free cluster.
    fat.link(35, 36);
    assert_eq!(fat.chain(35), Err(Error::CorruptChain(36)));

    // A link past the device end.
    fat.link(37, 200);
    assert_eq!(fat.next(37), Err(Error::CorruptChain(37)));

    // Reserved clusters never start a chain.
    assert_eq!(fat.next(DIR_CLUSTER), Err(Error::CorruptChain(DIR_CLUSTER)));
    assert_eq!(fat.next(0), Err(Error::CorruptChain(0)));
}

#[test]
fn test_on_disk_encoding() {
    let mut fat = FileAllocTable::new(64);
    fat.link(33, 34);
    fat.mark_chain_end(34);
    let mut bytes = vec![0u8; FAT_ENTRIES * FAT_ENTRY_SIZE];
    fat.write_bytes(&mut bytes);

    assert_eq!(&bytes[0..2], &[3, 0]);
    assert_eq!(&bytes[62..64], &[3, 0]);
    assert_eq!(&bytes[64..66], &[4, 0]);
    assert_eq!(&bytes[66..68], &[34, 0]);
    assert_eq!(&bytes[68..70], &[2, 0]);
    assert_eq!(&bytes[70..72], &[1, 0]);

    let decoded = FileAllocTable::from_bytes(&bytes, 64);
    assert_eq!(decoded.chain(33), Ok(vec![33, 34]));
    assert!(decoded.validate_layout());

    bytes[64] = 1;
    let damaged = FileAllocTable::from_bytes(&bytes, 64);
    assert!(!damaged.validate_layout());
    assert_eq!(damaged.lookup(DIR_CLUSTER), FatEntry::Free);
    // The reserved slot is still never handed out.
    assert_eq!(damaged.find_free(), Some(35));
}

#[test]
fn test_format_resets_everything() {
    let mut fat = FileAllocTable::from_bytes(&vec![0u8; FAT_ENTRIES * FAT_ENTRY_SIZE], 50);
    assert!(!fat.validate_layout());
    assert_eq!(fat.free_count(), 0);
    fat.format();
    assert!(fat.validate_layout());
    assert_eq!(fat.free_count(), 50 - 33);
}
