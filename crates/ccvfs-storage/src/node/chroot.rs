//! Root-confined filesystem node

use super::{FilesystemNode, ListMode, NativeNode, ReadStream, WriteStream};
use crate::Result;
use crate::path::{SEPARATOR, absolute_root, add_path_component, confine_path};

/// Node confined beneath a fixed root directory.
///
/// Wraps another node whose real path always begins with `root`. Callers
/// only ever see the part of the path after `root`, and navigation stops at
/// `/`. Every path supplied from outside is confined before it is joined
/// onto `root`, so no real path above the root can be constructed.
///
/// Confinement is lexical: a symbolic link inside the root is still
/// followed by the wrapped node.
#[derive(Debug)]
pub struct ChrootNode {
    root: String,
    real: Box<dyn FilesystemNode>,
}

impl ChrootNode {
    /// Node for the confined `path` under `root` on the host filesystem.
    ///
    /// A relative `root` is resolved against the working directory; an
    /// empty one is rejected.
    pub fn new(root: &str, path: &str) -> Result<Self> {
        Ok(Self::confined(absolute_root(root)?, path))
    }

    /// `root` must already be absolute and normalized
    pub(crate) fn confined(root: String, path: &str) -> Self {
        let real = NativeNode::new(add_path_component(&root, &confine_path(path)));
        Self {
            root,
            real: Box::new(real),
        }
    }

    /// Wrap an existing real node that lies under `root`
    pub fn wrap(root: impl Into<String>, real: Box<dyn FilesystemNode>) -> Self {
        Self {
            root: root.into(),
            real,
        }
    }

    /// Confinement root
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Path of the wrapped node on its own backend
    pub fn real_path(&self) -> String {
        self.real.path()
    }

    fn rewrap(&self, real: Box<dyn FilesystemNode>) -> Box<dyn FilesystemNode> {
        Box::new(Self::wrap(self.root.clone(), real))
    }
}

impl FilesystemNode for ChrootNode {
    fn name(&self) -> String {
        self.real.name()
    }

    fn display_name(&self) -> String {
        self.real.display_name()
    }

    fn path(&self) -> String {
        let real = self.real.path();
        if real.len() <= self.root.len() {
            return "/".to_string();
        }
        match real.strip_prefix(self.root.as_str()) {
            Some(rest) if rest.starts_with(SEPARATOR) => rest.to_string(),
            // Root of "/" leaves the suffix without its separator
            Some(rest) => format!("{SEPARATOR}{rest}"),
            None => "/".to_string(),
        }
    }

    fn exists(&self) -> bool {
        self.real.exists()
    }

    fn is_directory(&self) -> bool {
        self.real.is_directory()
    }

    fn is_readable(&self) -> bool {
        self.real.is_readable()
    }

    fn is_writable(&self) -> bool {
        self.real.is_writable()
    }

    fn child(&self, name: &str) -> Result<Box<dyn FilesystemNode>> {
        Ok(self.rewrap(self.real.child(name)?))
    }

    fn children(&self, mode: ListMode, hidden: bool) -> Result<Vec<Box<dyn FilesystemNode>>> {
        Ok(self
            .real
            .children(mode, hidden)?
            .into_iter()
            .map(|node| self.rewrap(node))
            .collect())
    }

    fn parent(&self) -> Option<Box<dyn FilesystemNode>> {
        if self.path() == "/" {
            return None;
        }
        self.real.parent().map(|node| self.rewrap(node))
    }

    fn create_read_stream(&self) -> Result<Box<dyn ReadStream>> {
        self.real.create_read_stream()
    }

    fn create_write_stream(&self, atomic: bool) -> Result<WriteStream> {
        self.real.create_write_stream(atomic)
    }

    fn create_directory(&self) -> Result<()> {
        self.real.create_directory()
    }
}
