//! Filesystem node factories

use std::fmt;
use std::path::PathBuf;

use crate::node::{ChrootNode, FilesystemNode, NativeNode};
use crate::path::{absolute_root, add_path_component, confine_path};
use crate::{Result, StorageError};

/// Source of filesystem nodes for one backend
pub trait FilesystemFactory: fmt::Debug + Send {
    /// Top of the backend's namespace
    fn root_node(&self) -> Box<dyn FilesystemNode>;

    /// Node for the process working directory
    fn current_directory_node(&self) -> Result<Box<dyn FilesystemNode>>;

    /// Node for an absolute path in this backend's namespace
    fn node_for_path(&self, path: &str) -> Box<dyn FilesystemNode>;
}

/// Factory for unconfined host filesystem nodes
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeFactory;

impl FilesystemFactory for NativeFactory {
    fn root_node(&self) -> Box<dyn FilesystemNode> {
        Box::new(NativeNode::new("/"))
    }

    fn current_directory_node(&self) -> Result<Box<dyn FilesystemNode>> {
        let cwd = std::env::current_dir()?;
        let path = cwd
            .to_str()
            .ok_or_else(|| StorageError::InvalidPath(cwd.display().to_string()))?;
        Ok(Box::new(NativeNode::new(path)))
    }

    fn node_for_path(&self, path: &str) -> Box<dyn FilesystemNode> {
        Box::new(NativeNode::new(path))
    }
}

/// Factory whose nodes are all confined beneath `root`.
///
/// ```rust
/// use ccvfs_storage::{ChrootFactory, FilesystemFactory};
///
/// let factory = ChrootFactory::new("/games/foo")?;
/// let node = factory.node_for_path("/bar.txt");
/// assert_eq!(node.path(), "/bar.txt");
/// assert_eq!(factory.system_full_path("/bar.txt").to_str(), Some("/games/foo/bar.txt"));
/// # Ok::<(), ccvfs_storage::StorageError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChrootFactory {
    root: String,
}

impl ChrootFactory {
    /// Create a factory confined to `root`, resolving a relative root
    /// against the working directory
    pub fn new(root: impl AsRef<str>) -> Result<Self> {
        Ok(Self {
            root: absolute_root(root.as_ref())?,
        })
    }

    /// Confinement root
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Host path that a confined `path` maps to
    pub fn system_full_path(&self, path: &str) -> PathBuf {
        PathBuf::from(add_path_component(&self.root, &confine_path(path)))
    }
}

impl FilesystemFactory for ChrootFactory {
    fn root_node(&self) -> Box<dyn FilesystemNode> {
        Box::new(ChrootNode::confined(self.root.clone(), "/"))
    }

    fn current_directory_node(&self) -> Result<Box<dyn FilesystemNode>> {
        // The host working directory is outside the namespace
        Ok(self.root_node())
    }

    fn node_for_path(&self, path: &str) -> Box<dyn FilesystemNode> {
        Box::new(ChrootNode::confined(self.root.clone(), path))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_chroot_factory_paths() {
        let factory = ChrootFactory::new("/games/foo/").unwrap();
        assert_eq!(factory.root(), "/games/foo");
        assert_eq!(factory.root_node().path(), "/");
        assert_eq!(factory.current_directory_node().unwrap().path(), "/");
        assert_eq!(factory.node_for_path("/maps/a.dat").path(), "/maps/a.dat");
        assert_eq!(
            factory.system_full_path("../../etc"),
            Path::new("/games/foo/etc")
        );
    }

    #[test]
    fn test_relative_root_is_anchored() {
        let cwd = std::env::current_dir().unwrap();
        let cwd = confine_path(cwd.to_str().unwrap());

        for root in [".", "games/.."] {
            let factory = ChrootFactory::new(root).unwrap();
            assert_eq!(factory.root(), cwd);
            assert_eq!(
                factory.system_full_path("/etc/passwd"),
                Path::new(&add_path_component(&cwd, "etc/passwd"))
            );
        }
        assert!(ChrootFactory::new("").is_err());
    }

    #[test]
    fn test_native_factory() {
        let factory = NativeFactory;
        assert_eq!(factory.root_node().path(), "/");
        assert!(factory.root_node().parent().is_none());
        assert_eq!(factory.node_for_path("/tmp//x").path(), "/tmp/x");
        assert!(factory.current_directory_node().unwrap().exists());
    }
}
