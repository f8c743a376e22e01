//! Error types for CC archive operations

use thiserror::Error;

/// CC archive operation result type
pub type CcResult<T> = Result<T, CcError>;

/// Errors raised while decoding or encoding a CC archive
#[derive(Debug, Error)]
pub enum CcError {
    /// Index block ended before `count * 8` bytes were read
    #[error("Truncated index: expected {expected} bytes, got {actual}")]
    TruncatedIndex {
        /// Bytes the entry count promised
        expected: usize,
        /// Bytes actually available
        actual: usize,
    },

    /// The pad byte of a decoded record was not zero
    #[error("Corrupt index record {index}: pad byte is {pad:#04x}")]
    CorruptIndexRecord {
        /// Position of the record in the index
        index: usize,
        /// Value found in the pad byte
        pad: u8,
    },

    /// Two resources resolve to the same ID
    #[error("Duplicate resource id {0:#06x}")]
    DuplicateId(u16),

    /// Name cannot address a resource
    #[error("Invalid resource name: {0:?}")]
    InvalidName(String),

    /// Offset does not fit the 24-bit record field
    #[error("Offset {0:#x} exceeds the 24-bit archive limit")]
    OffsetOutOfRange(u64),

    /// Resource does not fit the 16-bit size field
    #[error("Resource {id:#06x} is {size} bytes, larger than the 16-bit limit")]
    EntryTooLarge {
        /// Resource ID
        id: u16,
        /// Resource length in bytes
        size: usize,
    },

    /// Index does not fit the 16-bit entry count
    #[error("Too many entries: {0}")]
    TooManyEntries(usize),

    /// Binary read/write error
    #[error("Binary format error: {0}")]
    BinRead(#[from] binrw::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CcError {
    /// Check if this error means the index data itself is damaged
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Self::TruncatedIndex { .. } | Self::CorruptIndexRecord { .. } | Self::BinRead(_)
        )
    }

    /// Check if this error was raised while laying out a new archive
    pub fn is_layout_error(&self) -> bool {
        matches!(
            self,
            Self::DuplicateId(_)
                | Self::InvalidName(_)
                | Self::OffsetOutOfRange(_)
                | Self::EntryTooLarge { .. }
                | Self::TooManyEntries(_)
        )
    }
}
