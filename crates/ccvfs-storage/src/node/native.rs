//! Host filesystem node

use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::Path;

use tracing::trace;

use super::{FilesystemNode, ListMode, ReadStream, WriteStream};
use crate::path::{SEPARATOR, add_path_component, last_path_component, normalize_path};
use crate::{Result, StorageError};

/// Node on the host filesystem.
///
/// The path is stored normalized with `/` separators and is not
/// canonicalized; symbolic links are left to the operating system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeNode {
    path: String,
    display_name: String,
}

impl NativeNode {
    /// Create a node for `path`
    pub fn new(path: impl AsRef<str>) -> Self {
        let path = normalize_path(path.as_ref(), SEPARATOR);
        let display_name = last_path_component(&path, SEPARATOR).to_string();
        Self { path, display_name }
    }

    /// Path as understood by the operating system
    pub fn system_path(&self) -> &Path {
        Path::new(&self.path)
    }

    fn metadata(&self) -> Option<fs::Metadata> {
        fs::metadata(self.system_path()).ok()
    }
}

impl FilesystemNode for NativeNode {
    fn name(&self) -> String {
        self.display_name.clone()
    }

    fn path(&self) -> String {
        self.path.clone()
    }

    fn exists(&self) -> bool {
        self.metadata().is_some()
    }

    fn is_directory(&self) -> bool {
        self.metadata().is_some_and(|m| m.is_dir())
    }

    fn is_readable(&self) -> bool {
        match self.metadata() {
            Some(m) if m.is_dir() => fs::read_dir(self.system_path()).is_ok(),
            Some(_) => File::open(self.system_path()).is_ok(),
            None => false,
        }
    }

    fn is_writable(&self) -> bool {
        self.metadata().is_some_and(|m| !m.permissions().readonly())
    }

    fn child(&self, name: &str) -> Result<Box<dyn FilesystemNode>> {
        if name.is_empty() || name == "." || name == ".." || name.contains(SEPARATOR) {
            return Err(StorageError::InvalidPath(name.to_string()));
        }
        if self.exists() && !self.is_directory() {
            return Err(StorageError::NotADirectory(self.path.clone()));
        }
        Ok(Box::new(Self::new(add_path_component(&self.path, name))))
    }

    fn children(&self, mode: ListMode, hidden: bool) -> Result<Vec<Box<dyn FilesystemNode>>> {
        if !self.is_directory() {
            return Err(StorageError::NotADirectory(self.path.clone()));
        }

        let mut found: Vec<(String, Self)> = Vec::new();
        for entry in fs::read_dir(self.system_path())? {
            let entry = entry?;
            let Ok(name) = entry.file_name().into_string() else {
                trace!(parent = %self.path, "Skipping non UTF-8 directory entry");
                continue;
            };
            if !hidden && name.starts_with('.') {
                continue;
            }

            // Follow symlinks so a link to a directory lists as a directory
            let Ok(metadata) = fs::metadata(entry.path()) else {
                trace!(parent = %self.path, name = %name, "Skipping unreadable entry");
                continue;
            };
            if !mode.accepts(metadata.is_dir()) {
                continue;
            }

            let node = Self::new(add_path_component(&self.path, &name));
            found.push((name, node));
        }

        found.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(found
            .into_iter()
            .map(|(_, node)| Box::new(node) as Box<dyn FilesystemNode>)
            .collect())
    }

    fn parent(&self) -> Option<Box<dyn FilesystemNode>> {
        if self.path == "/" {
            return None;
        }
        // A relative single-component path has no parent
        let cut = self.path.rfind(SEPARATOR)?;
        let parent = if cut == 0 { "/" } else { &self.path[..cut] };
        Some(Box::new(Self::new(parent)))
    }

    fn create_read_stream(&self) -> Result<Box<dyn ReadStream>> {
        if self.is_directory() {
            return Err(StorageError::Io(io::Error::new(
                io::ErrorKind::IsADirectory,
                self.path.clone(),
            )));
        }
        let file = File::open(self.system_path())?;
        Ok(Box::new(BufReader::new(file)))
    }

    fn create_write_stream(&self, atomic: bool) -> Result<WriteStream> {
        WriteStream::create(self.system_path(), atomic)
    }

    fn create_directory(&self) -> Result<()> {
        match fs::create_dir(self.system_path()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists && self.is_directory() => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
