//! Loose-file archive over a directory node

use tracing::{trace, warn};

use super::Archive;
use crate::node::{FilesystemNode, ListMode, ReadStream};
use crate::{Result, StorageError};

/// Archive whose members are the files of a directory.
///
/// Names match case-insensitively. With a depth above zero, files in
/// subdirectories are members too, named `sub/file`.
#[derive(Debug)]
pub struct DirectoryArchive {
    root: Box<dyn FilesystemNode>,
    depth: usize,
}

impl DirectoryArchive {
    /// Wrap `root`, which must be an existing directory
    pub fn new(root: Box<dyn FilesystemNode>) -> Result<Self> {
        if !root.is_directory() {
            return Err(StorageError::NotADirectory(root.path()));
        }
        Ok(Self { root, depth: 0 })
    }

    /// Also search this many levels of subdirectories
    #[must_use]
    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    /// Directory backing this archive
    pub fn root(&self) -> &dyn FilesystemNode {
        self.root.as_ref()
    }

    fn members(&self) -> Result<Vec<(String, Box<dyn FilesystemNode>)>> {
        let mut found = Vec::new();
        collect(self.root.as_ref(), "", self.depth, &mut found)?;
        Ok(found)
    }

    fn find(&self, name: &str) -> Result<Option<Box<dyn FilesystemNode>>> {
        Ok(self
            .members()?
            .into_iter()
            .find(|(member, _)| member.eq_ignore_ascii_case(name))
            .map(|(_, node)| node))
    }
}

fn collect(
    dir: &dyn FilesystemNode,
    prefix: &str,
    depth: usize,
    found: &mut Vec<(String, Box<dyn FilesystemNode>)>,
) -> Result<()> {
    for child in dir.children(ListMode::All, false)? {
        let name = format!("{prefix}{}", child.name());
        if child.is_directory() {
            if depth > 0 {
                collect(child.as_ref(), &format!("{name}/"), depth - 1, found)?;
            }
        } else {
            found.push((name, child));
        }
    }
    Ok(())
}

impl Archive for DirectoryArchive {
    fn has_member(&self, name: &str) -> bool {
        match self.find(name) {
            Ok(found) => found.is_some(),
            Err(e) => {
                warn!(dir = %self.root.path(), error = %e, "Failed to list directory archive");
                false
            }
        }
    }

    fn open_member(&self, name: &str) -> Result<Box<dyn ReadStream>> {
        match self.find(name)? {
            Some(node) => node.create_read_stream(),
            None => {
                trace!(name, dir = %self.root.path(), "Directory member not found");
                Err(StorageError::EntryNotFound(name.to_string()))
            }
        }
    }

    fn list_members(&self) -> Vec<String> {
        match self.members() {
            Ok(members) => members.into_iter().map(|(name, _)| name).collect(),
            Err(e) => {
                warn!(dir = %self.root.path(), error = %e, "Failed to list directory archive");
                Vec::new()
            }
        }
    }
}
