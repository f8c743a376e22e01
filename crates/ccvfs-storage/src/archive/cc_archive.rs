//! CC archive reader
//!
//! The index is decoded once when the archive is opened. Each read reopens
//! the backing file, seeks to the entry and reads exactly its size, so a
//! truncated entry fails on its own without affecting other lookups.
//!
//! CC files keep only numeric IDs, never the original names, so the archive
//! cannot enumerate its members: [`CcArchive::list_entries`] and
//! [`Archive::list_members`] are always empty.

use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use ccvfs_crypto::{XorCipher, hash_name};
use ccvfs_formats::cc::{ArchiveEntry, ArchiveIndex, IndexPolicy};
use tracing::{debug, trace};

use super::Archive;
use crate::node::ReadStream;
use crate::{Result, StorageError};

/// Options applied when opening a [`CcArchive`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CcArchiveOptions {
    /// XOR every resource byte with the resource key on read
    pub encoded: bool,
    /// Require names of the form `prefix|name`
    pub prefix: Option<String>,
    /// Handling of corrupt index records
    pub policy: IndexPolicy,
}

impl CcArchiveOptions {
    /// Set whether resources are XOR-encoded
    #[must_use]
    pub const fn with_encoding(mut self, encoded: bool) -> Self {
        self.encoded = encoded;
        self
    }

    /// Set the required name prefix
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Set the corrupt record policy
    #[must_use]
    pub const fn with_policy(mut self, policy: IndexPolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// Read-only CC archive over a single backing file
#[derive(Debug)]
pub struct CcArchive {
    path: PathBuf,
    index: ArchiveIndex,
    encoded: bool,
    prefix: Option<String>,
}

impl CcArchive {
    /// Open a plain archive with strict index decoding
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, CcArchiveOptions::default())
    }

    /// Open an archive and decode its index.
    ///
    /// Failing to open the file or decode the index is fatal for this
    /// archive.
    pub fn open_with(path: impl AsRef<Path>, options: CcArchiveOptions) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|source| StorageError::ArchiveOpen {
            path: path.clone(),
            source,
        })?;

        let index = ArchiveIndex::parse(&mut BufReader::new(file), options.policy)?;
        debug!(
            path = %path.display(),
            entries = index.len(),
            encoded = options.encoded,
            "Opened CC archive"
        );

        Ok(Self {
            path,
            index,
            encoded: options.encoded,
            prefix: options.prefix.map(|p| p.to_ascii_lowercase()),
        })
    }

    /// Backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Decoded index
    pub fn index(&self) -> &ArchiveIndex {
        &self.index
    }

    /// Whether resources are XOR-encoded
    pub const fn is_encoded(&self) -> bool {
        self.encoded
    }

    /// Required name prefix, lowercased
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Map a name to the ID it is stored under.
    ///
    /// With a prefix configured the name must carry a matching `prefix|`
    /// segment; otherwise nothing matches.
    fn resolve(&self, name: &str) -> Option<u16> {
        let name = match &self.prefix {
            Some(prefix) => {
                let (head, rest) = name.split_once('|')?;
                if !head.eq_ignore_ascii_case(prefix) {
                    return None;
                }
                rest
            }
            None => name,
        };
        if name.is_empty() {
            return None;
        }
        Some(hash_name(name))
    }

    fn lookup(&self, name: &str) -> Option<&ArchiveEntry> {
        self.resolve(name).and_then(|id| self.index.find(id))
    }

    /// Check whether `name` resolves to an entry
    pub fn has_entry(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Check whether an entry with the raw `id` exists
    pub fn has_id(&self, id: u16) -> bool {
        self.index.contains(id)
    }

    /// Read the resource `name` into memory
    pub fn read(&self, name: &str) -> Result<Vec<u8>> {
        let Some(entry) = self.lookup(name) else {
            trace!(name, archive = %self.path.display(), "CC entry not found");
            return Err(StorageError::EntryNotFound(name.to_string()));
        };
        self.read_entry(name, entry)
    }

    /// Open the resource `name` as an in-memory stream
    pub fn open_for_read(&self, name: &str) -> Result<Cursor<Vec<u8>>> {
        self.read(name).map(Cursor::new)
    }

    /// Read the resource stored under the raw `id`
    pub fn read_by_id(&self, id: u16) -> Result<Vec<u8>> {
        let label = format!("{id:#06x}");
        let Some(entry) = self.index.find(id) else {
            trace!(id, archive = %self.path.display(), "CC entry not found");
            return Err(StorageError::EntryNotFound(label));
        };
        self.read_entry(&label, entry)
    }

    /// Open the resource stored under the raw `id`
    pub fn open_by_id(&self, id: u16) -> Result<Cursor<Vec<u8>>> {
        self.read_by_id(id).map(Cursor::new)
    }

    /// Always empty; CC files do not store names
    pub fn list_entries(&self) -> Vec<String> {
        Vec::new()
    }

    fn read_entry(&self, name: &str, entry: &ArchiveEntry) -> Result<Vec<u8>> {
        let expected = usize::from(entry.size);

        let mut file = File::open(&self.path)?;
        file.seek(SeekFrom::Start(u64::from(entry.offset)))?;

        let mut data = Vec::with_capacity(expected);
        file.take(u64::from(entry.size)).read_to_end(&mut data)?;
        if data.len() < expected {
            return Err(StorageError::ArchiveRead {
                name: name.to_string(),
                expected,
                actual: data.len(),
            });
        }

        if self.encoded {
            XorCipher::resource().apply(&mut data);
        }
        trace!(name, id = entry.id, size = expected, "Read CC entry");
        Ok(data)
    }
}

impl Archive for CcArchive {
    fn has_member(&self, name: &str) -> bool {
        self.has_entry(name)
    }

    fn open_member(&self, name: &str) -> Result<Box<dyn ReadStream>> {
        Ok(Box::new(self.open_for_read(name)?))
    }

    fn list_members(&self) -> Vec<String> {
        self.list_entries()
    }
}
