//! CC archive builder
//!
//! Lays out a complete archive: the scrambled index block first, then every
//! resource back to back in the order it was added. No padding is inserted.
//!
//! ```text
//! [count][index block: count * 8][resource 0][resource 1]...
//! ```
//!
//! # Example
//!
//! ```rust
//! use ccvfs_formats::cc::CcArchiveBuilder;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut builder = CcArchiveBuilder::new().with_encoding(true);
//! builder.add("roster.dat", vec![1, 2, 3])?;
//!
//! let (bytes, index) = builder.finish(Vec::new())?;
//! assert_eq!(index.len(), 1);
//! // Payload is XORed with 0x35 on disk
//! assert_eq!(&bytes[10..], &[0x34, 0x37, 0x36]);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

use std::collections::HashSet;
use std::io::Write;

use ccvfs_crypto::{XorCipher, hash_name};
use tracing::debug;

use crate::cc::constants::{MAX_ENTRIES, MAX_SIZE};
use crate::cc::entry::ArchiveEntry;
use crate::cc::error::{CcError, CcResult};
use crate::cc::index::ArchiveIndex;

/// Resource queued for writing
#[derive(Debug, Clone)]
struct PendingResource {
    id: u16,
    data: Vec<u8>,
}

/// Builder for CC archive files
///
/// Resources are queued in memory; nothing is written until [`finish`].
///
/// [`finish`]: CcArchiveBuilder::finish
#[derive(Debug, Clone, Default)]
pub struct CcArchiveBuilder {
    /// Resources in insertion order
    resources: Vec<PendingResource>,
    /// IDs already queued
    ids: HashSet<u16>,
    /// XOR payloads with the resource key
    encoded: bool,
}

impl CcArchiveBuilder {
    /// Create a builder for a plain (unencoded) archive
    pub fn new() -> Self {
        Self::default()
    }

    /// Choose whether resource payloads are XOR-encoded on disk
    pub fn with_encoding(mut self, encoded: bool) -> Self {
        self.encoded = encoded;
        self
    }

    /// Whether payloads will be XOR-encoded
    pub const fn is_encoded(&self) -> bool {
        self.encoded
    }

    /// Queue a resource under the ID its name hashes to.
    ///
    /// Returns the ID assigned.
    pub fn add(&mut self, name: &str, data: impl Into<Vec<u8>>) -> CcResult<u16> {
        if name.is_empty() {
            return Err(CcError::InvalidName(name.to_string()));
        }
        let id = hash_name(name);
        self.add_id(id, data)?;
        Ok(id)
    }

    /// Queue a resource under an explicit ID
    pub fn add_id(&mut self, id: u16, data: impl Into<Vec<u8>>) -> CcResult<()> {
        let data = data.into();

        if data.len() > MAX_SIZE {
            return Err(CcError::EntryTooLarge {
                id,
                size: data.len(),
            });
        }
        if self.resources.len() >= MAX_ENTRIES {
            return Err(CcError::TooManyEntries(self.resources.len() + 1));
        }
        if !self.ids.insert(id) {
            return Err(CcError::DuplicateId(id));
        }

        self.resources.push(PendingResource { id, data });
        Ok(())
    }

    /// Number of queued resources
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Check whether nothing has been queued
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Compute the index for the current queue without writing anything
    pub fn build_index(&self) -> CcResult<ArchiveIndex> {
        let mut index = ArchiveIndex::new();
        for resource in &self.resources {
            // Sizes were bounded in add_id
            index.push(ArchiveEntry::new(resource.id, 0, resource.data.len() as u16))?;
        }
        index.relocate_packed()?;

        // A freshly laid out archive reads back from where it was written
        let placed: Vec<ArchiveEntry> = index
            .iter()
            .map(|e| ArchiveEntry::new(e.id, e.write_offset, e.size))
            .collect();
        ArchiveIndex::from_entries(placed)
    }

    /// Write the archive to `writer`.
    ///
    /// Returns the writer and the index that was written.
    pub fn finish<W: Write>(self, mut writer: W) -> CcResult<(W, ArchiveIndex)> {
        let index = self.build_index()?;
        index.write(&mut writer)?;

        let cipher = XorCipher::resource();
        for mut resource in self.resources {
            if self.encoded {
                cipher.apply(&mut resource.data);
            }
            writer.write_all(&resource.data)?;
        }
        writer.flush()?;

        debug!(
            entries = index.len(),
            encoded = self.encoded,
            "Wrote CC archive"
        );
        Ok((writer, index))
    }

    /// Build the archive into a byte vector
    pub fn to_bytes(self) -> CcResult<Vec<u8>> {
        let (bytes, _) = self.finish(Vec::new())?;
        Ok(bytes)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_offsets() {
        let mut builder = CcArchiveBuilder::new();
        builder.add_id(1, vec![0xAA; 10]).unwrap();
        builder.add_id(2, vec![0xBB; 5]).unwrap();
        builder.add_id(3, Vec::new()).unwrap();

        let index = builder.build_index().unwrap();
        let offsets: Vec<u32> = index.iter().map(|e| e.offset).collect();
        // 2 + 3 * 8 = 26
        assert_eq!(offsets, [26, 36, 41]);
        assert!(index.iter().all(|e| e.offset == e.write_offset));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut builder = CcArchiveBuilder::new();
        builder.add("MAZE.PAL", vec![1]).unwrap();
        let err = builder.add("maze.pal", vec![2]).unwrap_err();
        assert!(matches!(err, CcError::DuplicateId(0xC84F)));
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut builder = CcArchiveBuilder::new();
        assert!(matches!(
            builder.add("", vec![1]),
            Err(CcError::InvalidName(_))
        ));
        assert!(builder.is_empty());
    }

    #[test]
    fn test_oversized_resource_rejected() {
        let mut builder = CcArchiveBuilder::new();
        let err = builder.add_id(9, vec![0; MAX_SIZE + 1]).unwrap_err();
        assert!(matches!(err, CcError::EntryTooLarge { id: 9, .. }));
        assert!(err.is_layout_error());
    }

    #[test]
    fn test_archive_over_16_mib_rejected() {
        let mut builder = CcArchiveBuilder::new();
        for id in 0..300u16 {
            builder.add_id(id, vec![0; MAX_SIZE]).unwrap();
        }
        let err = builder.build_index().unwrap_err();
        assert!(matches!(err, CcError::OffsetOutOfRange(_)));
    }

    #[test]
    fn test_encoded_payload() {
        let mut builder = CcArchiveBuilder::new().with_encoding(true);
        builder.add_id(0x0001, vec![0x00, 0x35]).unwrap();
        let bytes = builder.to_bytes().unwrap();
        assert_eq!(&bytes[10..], &[0x35, 0x00]);
    }

    #[test]
    fn test_empty_archive() {
        let bytes = CcArchiveBuilder::new().to_bytes().unwrap();
        assert_eq!(bytes, [0x00, 0x00]);
    }
}
