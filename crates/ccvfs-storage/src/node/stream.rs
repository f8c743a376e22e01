//! Write stream with optional temp-file-and-rename commit

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{Result, StorageError};

/// File being written through a [`FilesystemNode`](super::FilesystemNode).
///
/// Call [`commit`](Self::commit) when done. An atomic stream dropped without
/// committing removes its temporary file and leaves the target untouched.
#[derive(Debug)]
pub struct WriteStream {
    writer: Option<BufWriter<File>>,
    target: PathBuf,
    temp: Option<PathBuf>,
}

impl WriteStream {
    /// Open `target` for writing
    pub(crate) fn create(target: &Path, atomic: bool) -> Result<Self> {
        let temp = if atomic {
            let parent = target
                .parent()
                .ok_or_else(|| StorageError::NoParent(target.display().to_string()))?;
            let name = target
                .file_name()
                .ok_or_else(|| StorageError::InvalidPath(target.display().to_string()))?;
            let mut temp_name = name.to_os_string();
            temp_name.push(".tmp");
            Some(parent.join(temp_name))
        } else {
            None
        };

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(temp.as_deref().unwrap_or(target))?;

        Ok(Self {
            writer: Some(BufWriter::new(file)),
            target: target.to_path_buf(),
            temp,
        })
    }

    /// Path that receives the data on commit
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Flush everything to disk and, for atomic streams, move the data
    /// into place.
    pub fn commit(mut self) -> Result<()> {
        if let Some(writer) = self.writer.take() {
            let file = writer.into_inner().map_err(io::IntoInnerError::into_error)?;
            file.sync_all()?;
        }

        if let Some(temp) = self.temp.as_deref() {
            fs::rename(temp, &self.target)?;
            debug!(path = %self.target.display(), "Committed atomic write");
        }
        self.temp = None;
        Ok(())
    }

    fn writer(&mut self) -> io::Result<&mut BufWriter<File>> {
        self.writer
            .as_mut()
            .ok_or_else(|| io::Error::other("write stream already closed"))
    }
}

impl Write for WriteStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer()?.flush()
    }
}

impl Drop for WriteStream {
    fn drop(&mut self) {
        if let Some(temp) = self.temp.take() {
            drop(self.writer.take());
            if let Err(e) = fs::remove_file(&temp) {
                warn!(path = %temp.display(), error = %e, "Failed to remove uncommitted temp file");
            }
        }
    }
}
