//! Named-member archives
//!
//! An [`Archive`] answers "do you have this member?" and hands out read
//! streams for members it has. Three implementations are provided:
//!
//! - [`CcArchive`]: resources addressed by hashed name inside a CC file
//! - [`DirectoryArchive`]: loose files in a directory
//! - [`SearchSet`]: a priority-ordered collection of other archives

use std::fmt;

use crate::Result;
use crate::node::ReadStream;

mod cc_archive;
mod directory;
mod search_set;

pub use cc_archive::{CcArchive, CcArchiveOptions};
pub use directory::DirectoryArchive;
pub use search_set::SearchSet;

/// Read-only container of named members
pub trait Archive: fmt::Debug + Send {
    /// Check whether `name` resolves to a member
    fn has_member(&self, name: &str) -> bool;

    /// Open `name` for reading.
    ///
    /// Fails with [`StorageError::EntryNotFound`](crate::StorageError::EntryNotFound)
    /// when there is no such member.
    fn open_member(&self, name: &str) -> Result<Box<dyn ReadStream>>;

    /// Names of all enumerable members
    fn list_members(&self) -> Vec<String>;

    /// Number of enumerable members
    fn member_count(&self) -> usize {
        self.list_members().len()
    }
}
