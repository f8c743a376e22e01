//! CC archive index and data layout
//!
//! A CC archive is a single file holding many resources addressed by 16-bit
//! ID. The file carries no names: IDs are produced from resource names by
//! [`ccvfs_crypto::hash_name`].
//!
//! # Binary Format
//!
//! ```text
//! +-------------------+----------------------------+----------------------+
//! | count: u16 LE     | count * 8 bytes, scrambled | resource data ...    |
//! +-------------------+----------------------------+----------------------+
//! ```
//!
//! Each 8-byte index record, once descrambled:
//!
//! ```text
//! offset 0  id       u16 LE
//! offset 2  offset   u24 LE  (archives are capped at 16 MiB)
//! offset 5  size     u16 LE
//! offset 7  pad      u8, always zero
//! ```
//!
//! The scrambling is the rotate-and-add transform in
//! [`ccvfs_crypto::index_cipher`].
//!
//! # Usage Examples
//!
//! ## Build an archive
//!
//! ```rust
//! use ccvfs_formats::cc::CcArchiveBuilder;
//!
//! let mut builder = CcArchiveBuilder::new();
//! builder.add("maze.pal", vec![0u8; 48])?;
//! builder.add("1A2B", b"numbered".to_vec())?;
//!
//! let bytes = builder.to_bytes()?;
//! assert_eq!(bytes.len(), 2 + 2 * 8 + 48 + 8);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Parse the index
//!
//! ```rust
//! use ccvfs_formats::cc::{ArchiveIndex, CcArchiveBuilder, IndexPolicy};
//! use std::io::Cursor;
//!
//! let mut builder = CcArchiveBuilder::new();
//! builder.add_id(0x1234, b"payload".to_vec())?;
//! let bytes = builder.to_bytes()?;
//!
//! let index = ArchiveIndex::parse(&mut Cursor::new(&bytes), IndexPolicy::Strict)?;
//! let entry = index.find(0x1234).expect("entry present");
//! assert_eq!(entry.offset, 10);
//! assert_eq!(entry.size, 7);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod builder;
mod entry;
mod error;
mod index;

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    mod index_tests;
}

pub use builder::CcArchiveBuilder;
pub use entry::{ArchiveEntry, IndexRecord};
pub use error::{CcError, CcResult};
pub use index::{ArchiveIndex, IndexPolicy};

/// CC archive constants
pub mod constants {
    /// Size of the entry count that prefixes the index block
    pub const COUNT_SIZE: usize = 2;

    /// Size of one index record in bytes
    pub const ENTRY_SIZE: usize = 8;

    /// Largest offset a record can hold (24 bits)
    pub const MAX_OFFSET: u32 = 0x00FF_FFFF;

    /// Largest resource a record can describe
    pub const MAX_SIZE: usize = u16::MAX as usize;

    /// Largest number of records an index can hold
    pub const MAX_ENTRIES: usize = u16::MAX as usize;

    /// Offset of the first data byte for an archive with `count` entries
    pub const fn data_start(count: usize) -> usize {
        COUNT_SIZE + count * ENTRY_SIZE
    }
}
