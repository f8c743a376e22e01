//! Confined virtual filesystem and archive access for CC game data.
//!
//! This crate provides the file access layer a game engine sits on:
//!
//! - **Filesystem nodes**: a [`FilesystemNode`] trait with a native backend
//!   ([`NativeNode`]) and a decorator ([`ChrootNode`]) that confines every
//!   path beneath a fixed root directory
//! - **Factories**: [`NativeFactory`] and [`ChrootFactory`] hand out nodes
//!   for absolute paths
//! - **Archives**: an [`Archive`] trait implemented by [`CcArchive`] (the
//!   hashed-ID resource container), [`DirectoryArchive`] (loose files) and
//!   [`SearchSet`] (a priority-ordered registry of other archives)
//! - **Configuration**: [`StorageConfig`] describes a root directory and the
//!   archives to mount from it
//!
//! # Example
//!
//! ```rust,no_run
//! use ccvfs_storage::{Archive, StorageConfig};
//! use std::io::Read;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = StorageConfig::load("ccvfs.json")?;
//! let search = config.mount()?;
//!
//! if search.has_member("MAZE.PAL") {
//!     let mut palette = Vec::new();
//!     search.open_member("MAZE.PAL")?.read_to_end(&mut palette)?;
//!     println!("palette: {} bytes", palette.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Known limitation
//!
//! Confinement is purely lexical. A symbolic link inside the root that points
//! outside it is followed by the operating system; no symlink resolution is
//! performed.

#![warn(missing_docs)]
#![allow(clippy::must_use_candidate)]

use std::path::PathBuf;

use ccvfs_formats::cc::CcError;
use thiserror::Error;

// Archive implementations
pub mod archive;

// Mount configuration
pub mod config;

// Node factories
pub mod factory;

// Filesystem node backends
pub mod node;

// Path string helpers
pub mod path;

pub use archive::{Archive, CcArchive, CcArchiveOptions, DirectoryArchive, SearchSet};
pub use config::{ArchiveConfig, StorageConfig};
pub use factory::{ChrootFactory, FilesystemFactory, NativeFactory};
pub use node::{ChrootNode, FilesystemNode, ListMode, NativeNode, ReadStream, WriteStream};

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Archive backing file could not be opened.
    #[error("Cannot open archive {}: {source}", path.display())]
    ArchiveOpen {
        /// Path that failed to open
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// A resource's declared size could not be fully read.
    #[error("Short read for {name}: expected {expected} bytes, got {actual}")]
    ArchiveRead {
        /// Resource name or ID
        name: String,
        /// Size recorded in the index
        expected: usize,
        /// Bytes available in the file
        actual: usize,
    },

    /// No archive member matches the request.
    #[error("Entry not found: {0}")]
    EntryNotFound(String),

    /// Archive index could not be decoded.
    #[error("Corrupt archive index: {0}")]
    CorruptIndex(#[from] CcError),

    /// I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Operation needs a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(String),

    /// Path has no parent directory.
    #[error("No parent directory: {0}")]
    NoParent(String),

    /// Path component is not a plain name.
    #[error("Invalid path component: {0}")]
    InvalidPath(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl StorageError {
    /// Check whether this is the ordinary "no such member" outcome
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::EntryNotFound(_) => true,
            Self::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }

    /// Check whether the error leaves the archive or mount unusable.
    ///
    /// Per-entry failures are not fatal; later lookups still work.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ArchiveOpen { .. } | Self::CorruptIndex(_) | Self::Config(_)
        )
    }
}

/// Version information for the storage system.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let missing = StorageError::EntryNotFound("NOPE".to_string());
        assert!(missing.is_not_found());
        assert!(!missing.is_fatal());

        let short = StorageError::ArchiveRead {
            name: "MAZE.PAL".to_string(),
            expected: 50,
            actual: 10,
        };
        assert!(!short.is_not_found());
        assert!(!short.is_fatal());

        let open = StorageError::ArchiveOpen {
            path: PathBuf::from("/nowhere/XEEN.CC"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(open.is_fatal());
        assert!(!open.is_not_found());
        assert!(open.to_string().contains("/nowhere/XEEN.CC"));
    }

    #[test]
    fn test_io_not_found() {
        let err = StorageError::from(std::io::Error::from(std::io::ErrorKind::NotFound));
        assert!(err.is_not_found());
    }
}
