pub const SECTOR_SIZE: usize = 512;
pub const SECTORS_PER_CLUSTER: usize = 8;
pub const CLUSTER_SIZE: usize = SECTOR_SIZE * SECTORS_PER_CLUSTER;

pub const FAT_ENTRIES: usize = 65536; // One u16 code per addressable cluster
pub const FAT_ENTRY_SIZE: usize = 2;
pub const FAT_CLUSTERS: usize = 32; // Clusters 0..32 hold the table itself
pub const DIR_CLUSTER: u16 = 32;
pub const FIRST_DATA_CLUSTER: u16 = 33;

// Raw on-disk FAT codes. Anything >= FIRST_DATA_CLUSTER is a link.
pub const FAT_FREE: u16 = 1;
pub const FAT_CHAIN_END: u16 = 2;
pub const FAT_RESERVED_TABLE: u16 = 3;
pub const FAT_RESERVED_DIR: u16 = 4;

pub const MAX_DIR_ENTRIES: usize = 128;
pub const MAX_FILE_NAME_LEN: usize = 24;
pub const DIR_NAME_FIELD_LEN: usize = MAX_FILE_NAME_LEN + 1; // Name plus NUL terminator
pub const DIR_ENTRY_SIZE: usize = 32;
pub const NO_CLUSTER: u16 = 0xFFFF; // first_cluster of a formatted, unused record

pub const MAX_OPEN_FILES: usize = 128;
pub const SECTORS_PER_MB: usize = 2048;

const _: () = assert!(CLUSTER_SIZE % SECTOR_SIZE == 0);
const _: () = assert!(FAT_ENTRIES * FAT_ENTRY_SIZE == FAT_CLUSTERS * CLUSTER_SIZE);
const _: () = assert!(MAX_DIR_ENTRIES * DIR_ENTRY_SIZE == CLUSTER_SIZE);
const _: () = assert!(FAT_CLUSTERS == DIR_CLUSTER as usize);
