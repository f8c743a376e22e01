//! CC archive index decoding and encoding
//!
//! The index block is `count * 8` scrambled bytes following a little-endian
//! `u16` count. Decoding runs the whole block through [`IndexCipher`] before
//! splitting it into records; encoding serializes the records and applies
//! the inverse transform with the same seed progression.

use crate::CcFormat;
use crate::cc::constants::{COUNT_SIZE, ENTRY_SIZE, MAX_ENTRIES, MAX_OFFSET, data_start};
use crate::cc::entry::{ArchiveEntry, IndexRecord};
use crate::cc::error::{CcError, CcResult};
use binrw::{BinRead, BinWrite};
use ccvfs_crypto::IndexCipher;
use std::collections::HashMap;
use std::io::{Cursor, ErrorKind, Read, Write};
use tracing::{debug, warn};

/// How to treat a record whose pad byte is not zero
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum IndexPolicy {
    /// Fail the whole decode
    #[default]
    Strict,
    /// Drop the record, log a warning, and keep decoding
    SkipCorrupt,
}

/// Decoded CC archive index.
///
/// Entries are kept in on-disk order. Lookups go through an ID map; when
/// an archive stores the same ID twice, the first record wins.
#[derive(Debug, Clone, Default)]
pub struct ArchiveIndex {
    entries: Vec<ArchiveEntry>,
    by_id: HashMap<u16, usize>,
}

impl ArchiveIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from entries, rejecting duplicate IDs
    pub fn from_entries(entries: impl IntoIterator<Item = ArchiveEntry>) -> CcResult<Self> {
        let mut index = Self::new();
        for entry in entries {
            index.push(entry)?;
        }
        Ok(index)
    }

    /// Append an entry, rejecting duplicate IDs
    pub fn push(&mut self, entry: ArchiveEntry) -> CcResult<()> {
        if self.by_id.contains_key(&entry.id) {
            return Err(CcError::DuplicateId(entry.id));
        }
        if self.entries.len() >= MAX_ENTRIES {
            return Err(CcError::TooManyEntries(self.entries.len() + 1));
        }
        self.by_id.insert(entry.id, self.entries.len());
        self.entries.push(entry);
        Ok(())
    }

    /// Read the entry count and index block from the start of `reader`.
    ///
    /// The reader is left positioned just past the index block.
    pub fn parse<R: Read>(reader: &mut R, policy: IndexPolicy) -> CcResult<Self> {
        let mut block = Self::read_block(reader)?;
        Self::decode_block(&mut block, policy)
    }

    /// Read the count prefix and return the index block still scrambled,
    /// exactly as stored.
    pub fn read_block<R: Read>(reader: &mut R) -> CcResult<Vec<u8>> {
        let mut count_bytes = [0u8; COUNT_SIZE];
        let read = read_full(reader, &mut count_bytes)?;
        if read < COUNT_SIZE {
            return Err(CcError::TruncatedIndex {
                expected: COUNT_SIZE,
                actual: read,
            });
        }
        let count = u16::from_le_bytes(count_bytes);

        let expected = usize::from(count) * ENTRY_SIZE;
        let mut block = vec![0u8; expected];
        let actual = read_full(reader, &mut block)?;
        if actual < expected {
            return Err(CcError::TruncatedIndex { expected, actual });
        }
        Ok(block)
    }

    /// Descramble a copy of `block` and return every record in stored
    /// order, corrupt ones included.
    pub fn decode_records(block: &[u8]) -> CcResult<Vec<IndexRecord>> {
        let plain = IndexCipher::new().decrypt(block);
        read_records(&plain)
    }

    /// Descramble and parse a raw index block (without the count prefix).
    ///
    /// The block is descrambled in place.
    pub fn decode_block(block: &mut [u8], policy: IndexPolicy) -> CcResult<Self> {
        IndexCipher::new().decrypt_in_place(block);
        let records = read_records(block)?;

        let mut index = Self {
            entries: Vec::with_capacity(records.len()),
            by_id: HashMap::with_capacity(records.len()),
        };

        for (position, record) in records.into_iter().enumerate() {
            if !record.is_valid() {
                match policy {
                    IndexPolicy::Strict => {
                        return Err(CcError::CorruptIndexRecord {
                            index: position,
                            pad: record.pad,
                        });
                    }
                    IndexPolicy::SkipCorrupt => {
                        warn!(
                            record = position,
                            id = record.id,
                            pad = record.pad,
                            "Skipping corrupt CC index record"
                        );
                        continue;
                    }
                }
            }

            if index.by_id.contains_key(&record.id) {
                debug!(
                    record = position,
                    id = record.id,
                    "Duplicate CC resource id, keeping first"
                );
            } else {
                index.by_id.insert(record.id, index.entries.len());
            }
            index.entries.push(ArchiveEntry::from(record));
        }

        debug!(entries = index.entries.len(), "Decoded CC index");
        Ok(index)
    }

    /// Serialize and scramble the index, including the count prefix.
    ///
    /// Each record persists the entry's `write_offset`.
    pub fn encode(&self) -> CcResult<Vec<u8>> {
        let count = u16::try_from(self.entries.len())
            .map_err(|_| CcError::TooManyEntries(self.entries.len()))?;

        let mut cursor = Cursor::new(Vec::with_capacity(self.entries.len() * ENTRY_SIZE));
        for entry in &self.entries {
            if entry.write_offset > MAX_OFFSET {
                return Err(CcError::OffsetOutOfRange(u64::from(entry.write_offset)));
            }
            entry.to_record().write(&mut cursor)?;
        }

        let mut block = cursor.into_inner();
        IndexCipher::new().encrypt_in_place(&mut block);

        let mut out = Vec::with_capacity(COUNT_SIZE + block.len());
        out.extend_from_slice(&count.to_le_bytes());
        out.extend_from_slice(&block);
        Ok(out)
    }

    /// Write the encoded index to `writer`
    pub fn write<W: Write>(&self, writer: &mut W) -> CcResult<()> {
        writer.write_all(&self.encode()?)?;
        Ok(())
    }

    /// Assign contiguous write offsets in index order, starting at `base`.
    ///
    /// Returns the offset just past the last resource.
    pub fn relocate(&mut self, base: u64) -> CcResult<u64> {
        let mut position = base;
        for entry in &mut self.entries {
            let offset =
                u32::try_from(position).map_err(|_| CcError::OffsetOutOfRange(position))?;
            if offset > MAX_OFFSET {
                return Err(CcError::OffsetOutOfRange(position));
            }
            entry.write_offset = offset;
            position += u64::from(entry.size);
        }
        Ok(position)
    }

    /// Relocate so that data starts right after this index's own block
    pub fn relocate_packed(&mut self) -> CcResult<u64> {
        self.relocate(data_start(self.entries.len()) as u64)
    }

    /// Find the entry for `id`
    pub fn find(&self, id: u16) -> Option<&ArchiveEntry> {
        self.by_id.get(&id).map(|&i| &self.entries[i])
    }

    /// Check whether `id` has an entry
    pub fn contains(&self, id: u16) -> bool {
        self.by_id.contains_key(&id)
    }

    /// Entries in on-disk order
    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    /// Iterate entries in on-disk order
    pub fn iter(&self) -> std::slice::Iter<'_, ArchiveEntry> {
        self.entries.iter()
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the index has no records
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Size of the encoded index including the count prefix
    pub fn encoded_len(&self) -> usize {
        data_start(self.entries.len())
    }
}

impl<'a> IntoIterator for &'a ArchiveIndex {
    type Item = &'a ArchiveEntry;
    type IntoIter = std::slice::Iter<'a, ArchiveEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl CcFormat for ArchiveIndex {
    fn parse(data: &[u8]) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self::parse(&mut Cursor::new(data), IndexPolicy::Strict)?)
    }

    fn build(&self) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
        Ok(self.encode()?)
    }
}

/// Parse whole descrambled records; a trailing partial record is ignored
fn read_records(plain: &[u8]) -> CcResult<Vec<IndexRecord>> {
    let count = plain.len() / ENTRY_SIZE;
    let mut cursor = Cursor::new(&plain[..count * ENTRY_SIZE]);
    (0..count)
        .map(|_| IndexRecord::read(&mut cursor).map_err(CcError::from))
        .collect()
}

/// Read until `buf` is full or the reader is exhausted; returns bytes read
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> CcResult<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}
