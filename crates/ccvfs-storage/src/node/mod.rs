//! Filesystem node abstraction
//!
//! A [`FilesystemNode`] names one path on some backend and answers queries
//! about it. Navigation (`child`, `children`, `parent`) always produces new
//! nodes; nodes hold no open handles.
//!
//! Backends:
//! - [`NativeNode`]: the host filesystem
//! - [`ChrootNode`]: wraps another node and confines it beneath a root

use std::fmt;
use std::io::{Read, Seek};

use crate::Result;

mod chroot;
mod native;
mod stream;

pub use chroot::ChrootNode;
pub use native::NativeNode;
pub use stream::WriteStream;

/// Which kinds of entries a directory listing returns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListMode {
    /// Regular files only
    FilesOnly,
    /// Directories only
    DirectoriesOnly,
    /// Everything
    #[default]
    All,
}

impl ListMode {
    /// Check whether an entry of the given kind is listed
    pub const fn accepts(self, is_directory: bool) -> bool {
        match self {
            Self::FilesOnly => !is_directory,
            Self::DirectoriesOnly => is_directory,
            Self::All => true,
        }
    }
}

/// Readable, seekable byte stream
pub trait ReadStream: Read + Seek + Send + fmt::Debug {}

impl<T: Read + Seek + Send + fmt::Debug> ReadStream for T {}

/// A single path on a filesystem backend
pub trait FilesystemNode: fmt::Debug + Send {
    /// Last path component
    fn name(&self) -> String;

    /// Human readable name, defaults to [`name`](Self::name)
    fn display_name(&self) -> String {
        self.name()
    }

    /// Path as seen by callers of this backend
    fn path(&self) -> String;

    /// Check whether the path exists
    fn exists(&self) -> bool;

    /// Check whether the path is an existing directory
    fn is_directory(&self) -> bool;

    /// Check whether the path can be read
    fn is_readable(&self) -> bool;

    /// Check whether the path can be written
    fn is_writable(&self) -> bool;

    /// Node for the entry `name` inside this directory.
    ///
    /// `name` must be a single component; the child need not exist.
    fn child(&self, name: &str) -> Result<Box<dyn FilesystemNode>>;

    /// Entries of this directory, sorted by name.
    ///
    /// Names starting with `.` are skipped unless `hidden` is set.
    fn children(&self, mode: ListMode, hidden: bool) -> Result<Vec<Box<dyn FilesystemNode>>>;

    /// Containing directory, or `None` at the top
    fn parent(&self) -> Option<Box<dyn FilesystemNode>>;

    /// Open the file for reading
    fn create_read_stream(&self) -> Result<Box<dyn ReadStream>>;

    /// Open the file for writing, truncating it.
    ///
    /// With `atomic`, data goes to a temporary sibling that replaces the
    /// file on [`WriteStream::commit`].
    fn create_write_stream(&self, atomic: bool) -> Result<WriteStream>;

    /// Create this path as a directory; succeeds if it already is one
    fn create_directory(&self) -> Result<()>;
}
