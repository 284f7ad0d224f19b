//! Artifact file lifecycle.
//!
//! A body is streamed into `<artifact>.part` and renamed to the final name only
//! once the transfer completed, so an interrupted write never looks like a
//! finished artifact to the next resume scan.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `a.pdf` → `a.pdf.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Filesystem failure while persisting an artifact. Always fatal for the sweep.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to create {}: {source}", .path.display())]
    Create { path: PathBuf, source: io::Error },
    #[error("failed to write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("failed to finalize {}: {source}", .path.display())]
    Finalize { path: PathBuf, source: io::Error },
}

/// Sequential writer for one artifact. Dropping it without [`finalize`](Self::finalize)
/// removes the temp file.
#[derive(Debug)]
pub struct ArtifactWriter {
    file: Option<File>,
    temp_path: PathBuf,
    final_path: PathBuf,
    written: u64,
    finalized: bool,
}

impl ArtifactWriter {
    /// Create (or truncate) the temp file for `final_path`.
    pub fn create(final_path: &Path) -> Result<Self, StorageError> {
        let temp_path = temp_path(final_path);
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(|source| StorageError::Create {
                path: temp_path.clone(),
                source,
            })?;
        Ok(Self {
            file: Some(file),
            temp_path,
            final_path: final_path.to_path_buf(),
            written: 0,
            finalized: false,
        })
    }

    pub fn write_chunk(&mut self, data: &[u8]) -> Result<(), StorageError> {
        let Some(file) = self.file.as_mut() else {
            return Ok(());
        };
        file.write_all(data).map_err(|source| StorageError::Write {
            path: self.temp_path.clone(),
            source,
        })?;
        self.written += data.len() as u64;
        Ok(())
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    /// Flush to disk and rename to the final name. Returns the number of bytes written.
    pub fn finalize(mut self) -> Result<u64, StorageError> {
        if let Some(file) = self.file.take() {
            file.sync_all().map_err(|source| StorageError::Write {
                path: self.temp_path.clone(),
                source,
            })?;
        }
        std::fs::rename(&self.temp_path, &self.final_path).map_err(|source| {
            StorageError::Finalize {
                path: self.final_path.clone(),
                source,
            }
        })?;
        self.finalized = true;
        Ok(self.written)
    }
}

impl Drop for ArtifactWriter {
    fn drop(&mut self) {
        if self.finalized {
            return;
        }
        self.file.take();
        if let Err(e) = std::fs::remove_file(&self.temp_path) {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::debug!(path = %self.temp_path.display(), "could not remove temp file: {}", e);
            }
        }
    }
}
