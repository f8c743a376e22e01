//! Mount configuration
//!
//! A [`StorageConfig`] names a root directory and the archives to mount from
//! beneath it. It is stored as JSON:
//!
//! ```json
//! {
//!   "root": "/games/xeen",
//!   "index_policy": "strict",
//!   "archives": [
//!     { "path": "/DARK.CC", "prefix": "dark", "priority": 10 },
//!     { "path": "/XEEN.CC", "encoded": true },
//!     { "path": "/extras" }
//!   ]
//! }
//! ```
//!
//! Archive paths are confined to `root`. A path naming a directory mounts a
//! [`DirectoryArchive`]; anything else is opened as a [`CcArchive`].

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use ccvfs_formats::cc::IndexPolicy;
use tracing::info;

use crate::archive::{Archive, CcArchive, CcArchiveOptions, DirectoryArchive, SearchSet};
use crate::factory::{ChrootFactory, FilesystemFactory};
use crate::path::confine_path;
use crate::{Result, StorageError};

/// One archive to mount
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Path of the archive inside the root
    pub path: String,

    /// Resources are XOR-encoded
    #[serde(default)]
    pub encoded: bool,

    /// Required `prefix|` on member names
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,

    /// Search priority; higher is searched first
    #[serde(default)]
    pub priority: i32,
}

impl ArchiveConfig {
    /// Create a plain archive entry for `path`
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            encoded: false,
            prefix: None,
            priority: 0,
        }
    }

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

    /// Set the search priority
    #[must_use]
    pub const fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

/// Configuration for a confined set of archives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory every archive path is confined to
    pub root: PathBuf,

    /// Archives to mount
    #[serde(default)]
    pub archives: Vec<ArchiveConfig>,

    /// Handling of corrupt CC index records
    #[serde(default)]
    pub index_policy: IndexPolicy,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            archives: Vec::new(),
            index_policy: IndexPolicy::Strict,
        }
    }
}

impl StorageConfig {
    /// Create a configuration rooted at `root`
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    /// Set the root directory
    #[must_use]
    pub fn with_root<P: AsRef<Path>>(mut self, root: P) -> Self {
        self.root = root.as_ref().to_path_buf();
        self
    }

    /// Add an archive to mount
    #[must_use]
    pub fn with_archive(mut self, archive: ArchiveConfig) -> Self {
        self.archives.push(archive);
        self
    }

    /// Set the corrupt record policy
    #[must_use]
    pub const fn with_index_policy(mut self, policy: IndexPolicy) -> Self {
        self.index_policy = policy;
        self
    }

    /// Load and validate a JSON configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            StorageError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|e| {
            StorageError::Config(format!("invalid JSON in {}: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let text = serde_json::to_string_pretty(self)
            .map_err(|e| StorageError::Config(format!("cannot serialize: {e}")))?;
        std::fs::write(path, text)?;
        Ok(())
    }

    /// Check the configuration for consistency
    pub fn validate(&self) -> Result<()> {
        let root = self.root_str()?;
        if root.is_empty() {
            return Err(StorageError::Config("root must not be empty".to_string()));
        }

        let mut seen = HashSet::new();
        for archive in &self.archives {
            if archive.path.trim().is_empty() {
                return Err(StorageError::Config(
                    "archive path must not be empty".to_string(),
                ));
            }
            if !seen.insert(confine_path(&archive.path)) {
                return Err(StorageError::Config(format!(
                    "archive {} listed twice",
                    archive.path
                )));
            }
            if let Some(prefix) = &archive.prefix
                && (prefix.is_empty() || prefix.contains('|'))
            {
                return Err(StorageError::Config(format!(
                    "archive {} has invalid prefix {prefix:?}",
                    archive.path
                )));
            }
        }
        Ok(())
    }

    /// Factory confining paths to the configured root
    pub fn factory(&self) -> Result<ChrootFactory> {
        ChrootFactory::new(self.root_str()?)
    }

    /// Open every configured archive and register it in a search set.
    ///
    /// Archives are registered under their confined path. Any archive
    /// that fails to open, or that lands on an already mounted path, aborts
    /// the mount.
    pub fn mount(&self) -> Result<SearchSet> {
        self.validate()?;
        let factory = self.factory()?;
        let mut search = SearchSet::new();

        for archive in &self.archives {
            let node = factory.node_for_path(&archive.path);
            let name = node.path();
            let opened: Box<dyn Archive> = if node.is_directory() {
                Box::new(DirectoryArchive::new(node)?)
            } else {
                let mut options = CcArchiveOptions::default()
                    .with_encoding(archive.encoded)
                    .with_policy(self.index_policy);
                if let Some(prefix) = &archive.prefix {
                    options = options.with_prefix(prefix.clone());
                }
                Box::new(CcArchive::open_with(
                    factory.system_full_path(&archive.path),
                    options,
                )?)
            };

            if !search.add(name.clone(), opened, archive.priority) {
                return Err(StorageError::Config(format!(
                    "archive {} mounted twice as {name}",
                    archive.path
                )));
            }
        }

        info!(
            root = %self.root.display(),
            archives = search.len(),
            "Mounted storage"
        );
        Ok(search)
    }

    fn root_str(&self) -> Result<&str> {
        self.root.to_str().ok_or_else(|| {
            StorageError::Config(format!("root {} is not UTF-8", self.root.display()))
        })
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::archive::Archive;
    use ccvfs_formats::cc::CcArchiveBuilder;
    use std::fs;
    use std::io::Read;
    use tempfile::TempDir;

    #[test]
    fn test_parse_json_defaults() {
        let config: StorageConfig = serde_json::from_str(
            r#"{ "root": "/games/xeen", "archives": [ { "path": "/XEEN.CC" } ] }"#,
        )
        .unwrap();

        assert_eq!(config.root, PathBuf::from("/games/xeen"));
        assert_eq!(config.index_policy, IndexPolicy::Strict);
        assert_eq!(config.archives, [ArchiveConfig::new("/XEEN.CC")]);
    }

    #[test]
    fn test_parse_policy() {
        let config: StorageConfig =
            serde_json::from_str(r#"{ "root": "/g", "index_policy": "skip_corrupt" }"#).unwrap();
        assert_eq!(config.index_policy, IndexPolicy::SkipCorrupt);
    }

    #[test]
    fn test_validate() {
        let ok = StorageConfig::new("/games")
            .with_archive(ArchiveConfig::new("/A.CC").with_prefix("dark"));
        assert!(ok.validate().is_ok());

        let dup = StorageConfig::new("/games")
            .with_archive(ArchiveConfig::new("/A.CC"))
            .with_archive(ArchiveConfig::new("/A.CC"));
        assert!(matches!(dup.validate(), Err(StorageError::Config(_))));

        let same_after_confining = StorageConfig::new("/games")
            .with_archive(ArchiveConfig::new("/A.CC"))
            .with_archive(ArchiveConfig::new("A.CC").with_prefix("x").with_priority(5));
        assert!(matches!(
            same_after_confining.validate(),
            Err(StorageError::Config(_))
        ));

        let bad_prefix =
            StorageConfig::new("/games").with_archive(ArchiveConfig::new("/A.CC").with_prefix("a|b"));
        assert!(bad_prefix.validate().is_err());

        let empty_path = StorageConfig::new("/games").with_archive(ArchiveConfig::new(" "));
        assert!(empty_path.validate().is_err());

        assert!(StorageConfig::new("").validate().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("ccvfs.json");
        let config = StorageConfig::new("/games/xeen")
            .with_archive(ArchiveConfig::new("/XEEN.CC").with_encoding(true).with_priority(3))
            .with_index_policy(IndexPolicy::SkipCorrupt);

        config.save(&file).unwrap();
        assert_eq!(StorageConfig::load(&file).unwrap(), config);
    }

    #[test]
    fn test_load_errors_are_config_errors() {
        let dir = TempDir::new().unwrap();
        let missing = StorageConfig::load(dir.path().join("none.json")).unwrap_err();
        assert!(matches!(missing, StorageError::Config(_)));
        assert!(missing.is_fatal());

        let garbage = dir.path().join("bad.json");
        fs::write(&garbage, "{ not json").unwrap();
        assert!(matches!(
            StorageConfig::load(&garbage),
            Err(StorageError::Config(_))
        ));
    }

    #[test]
    fn test_mount() {
        let dir = TempDir::new().unwrap();
        let mut builder = CcArchiveBuilder::new().with_encoding(true);
        builder.add("MAZE.PAL", b"pal".to_vec()).unwrap();
        fs::write(dir.path().join("XEEN.CC"), builder.to_bytes().unwrap()).unwrap();
        fs::create_dir(dir.path().join("extras")).unwrap();
        fs::write(dir.path().join("extras").join("notes.txt"), b"hi").unwrap();

        let config = StorageConfig::new(dir.path())
            .with_archive(ArchiveConfig::new("/XEEN.CC").with_encoding(true))
            .with_archive(ArchiveConfig::new("/extras").with_priority(1));
        let search = config.mount().unwrap();

        assert_eq!(search.names().collect::<Vec<_>>(), ["/extras", "/XEEN.CC"]);
        assert!(search.has_member("maze.pal"));
        assert!(search.has_member("NOTES.TXT"));

        let mut data = Vec::new();
        search
            .open_member("MAZE.PAL")
            .unwrap()
            .read_to_end(&mut data)
            .unwrap();
        assert_eq!(data, b"pal");

        // CC members are not enumerable
        assert_eq!(search.list_members(), ["notes.txt"]);
    }

    #[test]
    fn test_mount_missing_archive_is_fatal() {
        let dir = TempDir::new().unwrap();
        let config = StorageConfig::new(dir.path()).with_archive(ArchiveConfig::new("/GONE.CC"));
        let err = config.mount().unwrap_err();
        assert!(matches!(err, StorageError::ArchiveOpen { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_mount_rejects_aliased_archives() {
        let dir = TempDir::new().unwrap();
        let mut builder = CcArchiveBuilder::new();
        builder.add("MAZE.PAL", b"pal".to_vec()).unwrap();
        fs::write(dir.path().join("A.CC"), builder.to_bytes().unwrap()).unwrap();

        let config = StorageConfig::new(dir.path())
            .with_archive(ArchiveConfig::new("/A.CC"))
            .with_archive(ArchiveConfig::new("/../A.CC").with_prefix("x").with_priority(5));
        let err = config.mount().unwrap_err();
        assert!(matches!(err, StorageError::Config(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_default_root_is_working_directory() {
        let cwd = std::env::current_dir().unwrap();
        let cwd = confine_path(cwd.to_str().unwrap());

        let config = StorageConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.factory().unwrap().root(), cwd);

        let escaping = config.with_archive(ArchiveConfig::new("/etc/passwd"));
        let err = escaping.mount().unwrap_err();
        assert!(matches!(
            &err,
            StorageError::ArchiveOpen { path, .. } if path.starts_with(&cwd)
        ));
    }
}
