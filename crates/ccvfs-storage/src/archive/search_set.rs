//! Priority-ordered collection of archives

use tracing::{debug, trace};

use super::Archive;
use crate::node::ReadStream;
use crate::{Result, StorageError};

#[derive(Debug)]
struct Member {
    name: String,
    priority: i32,
    archive: Box<dyn Archive>,
}

/// Registry of named archives searched from highest to lowest priority.
///
/// Archives with equal priority are searched in the order they were added.
/// A search set is itself an [`Archive`], so sets can be nested.
///
/// ```rust
/// use ccvfs_storage::SearchSet;
///
/// let search = SearchSet::new();
/// assert!(search.is_empty());
/// assert!(!search.has("XEEN.CC"));
/// ```
#[derive(Debug, Default)]
pub struct SearchSet {
    members: Vec<Member>,
}

impl SearchSet {
    /// Create an empty search set
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `archive` under `name`.
    ///
    /// Returns `false` and drops `archive` if `name` is already registered.
    pub fn add(&mut self, name: impl Into<String>, archive: Box<dyn Archive>, priority: i32) -> bool {
        let name = name.into();
        if self.has(&name) {
            debug!(name = %name, "Archive already in search set");
            return false;
        }

        let position = self
            .members
            .iter()
            .position(|m| m.priority < priority)
            .unwrap_or(self.members.len());
        debug!(name = %name, priority, position, "Adding archive to search set");
        self.members.insert(
            position,
            Member {
                name,
                priority,
                archive,
            },
        );
        true
    }

    /// Unregister and return the archive named `name`
    pub fn remove(&mut self, name: &str) -> Option<Box<dyn Archive>> {
        let position = self.members.iter().position(|m| m.name == name)?;
        Some(self.members.remove(position).archive)
    }

    /// Check whether an archive named `name` is registered
    pub fn has(&self, name: &str) -> bool {
        self.members.iter().any(|m| m.name == name)
    }

    /// Archive registered under `name`
    pub fn get(&self, name: &str) -> Option<&dyn Archive> {
        self.members
            .iter()
            .find(|m| m.name == name)
            .map(|m| m.archive.as_ref())
    }

    /// Registered names in search order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|m| m.name.as_str())
    }

    /// Number of registered archives
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Check whether no archives are registered
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Unregister everything
    pub fn clear(&mut self) {
        self.members.clear();
    }
}

impl Archive for SearchSet {
    fn has_member(&self, name: &str) -> bool {
        self.members.iter().any(|m| m.archive.has_member(name))
    }

    fn open_member(&self, name: &str) -> Result<Box<dyn ReadStream>> {
        for member in &self.members {
            if !member.archive.has_member(name) {
                continue;
            }
            match member.archive.open_member(name) {
                Ok(stream) => {
                    trace!(name, archive = %member.name, "Resolved member");
                    return Ok(stream);
                }
                Err(e) if e.is_not_found() => {}
                Err(e) => return Err(e),
            }
        }
        Err(StorageError::EntryNotFound(name.to_string()))
    }

    fn list_members(&self) -> Vec<String> {
        self.members
            .iter()
            .flat_map(|m| m.archive.list_members())
            .collect()
    }

    fn member_count(&self) -> usize {
        self.members.iter().map(|m| m.archive.member_count()).sum()
    }
}
