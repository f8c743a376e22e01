//! CC index record and entry types

use binrw::{BinRead, BinWrite};

/// One descrambled 8-byte index record, exactly as stored.
///
/// Binary layout:
/// ```text
/// id:      u16 LE   Resource ID
/// offset:  u24 LE   Byte offset of the resource in the archive
/// size:    u16 LE   Resource length
/// pad:     u8       Always zero
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead, BinWrite)]
#[br(little)]
#[bw(little)]
pub struct IndexRecord {
    /// Resource ID
    pub id: u16,

    /// Byte offset, 24 significant bits
    #[br(map = |b: [u8; 3]| u32::from_le_bytes([b[0], b[1], b[2], 0]))]
    #[bw(map = |o: &u32| { let b = o.to_le_bytes(); [b[0], b[1], b[2]] })]
    pub offset: u32,

    /// Resource length
    pub size: u16,

    /// Format requires zero
    pub pad: u8,
}

impl IndexRecord {
    /// Check the zero-pad invariant
    pub const fn is_valid(&self) -> bool {
        self.pad == 0
    }
}

/// A resource location within a CC archive.
///
/// `offset` is where the resource was found when the index was read.
/// `write_offset` is where it will be placed when the index is written out
/// again; the two only differ while an archive is being rebuilt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Resource ID
    pub id: u16,
    /// Byte offset of the resource in the backing file
    pub offset: u32,
    /// Resource length in bytes
    pub size: u16,
    /// Offset persisted when the index is encoded
    pub write_offset: u32,
}

impl ArchiveEntry {
    /// Create an entry whose write offset equals its read offset
    pub const fn new(id: u16, offset: u32, size: u16) -> Self {
        Self {
            id,
            offset,
            size,
            write_offset: offset,
        }
    }

    /// First byte past the end of the resource
    pub const fn end(&self) -> u64 {
        self.offset as u64 + self.size as u64
    }

    /// Record to persist for this entry
    pub const fn to_record(&self) -> IndexRecord {
        IndexRecord {
            id: self.id,
            offset: self.write_offset,
            size: self.size,
            pad: 0,
        }
    }
}

impl From<IndexRecord> for ArchiveEntry {
    fn from(record: IndexRecord) -> Self {
        Self::new(record.id, record.offset, record.size)
    }
}
