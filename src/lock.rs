//! Single-instance guard over the artifact directory.

use crate::errors::SearchError;
use fs2::FileExt;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// Advisory exclusive lock, held until dropped.
#[derive(Debug)]
pub struct InstanceLock {
    path: PathBuf,
    file: File,
}

impl InstanceLock {
    /// Take the lock or fail immediately if another process holds it.
    pub fn acquire(path: impl AsRef<Path>) -> Result<Self, SearchError> {
        let path = path.as_ref().to_path_buf();
        let file = fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(|e| {
                SearchError::Other(anyhow::anyhow!(
                    "Failed to open lock file {}: {}",
                    path.display(),
                    e
                ))
            })?;

        if file.try_lock_exclusive().is_err() {
            return Err(SearchError::AlreadyRunning { path });
        }
        tracing::debug!(path = %path.display(), "instance lock acquired");
        Ok(Self { path, file })
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "failed to release instance lock"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_second_acquire_fails_while_held() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".seedsearch.lock");
        let first = InstanceLock::acquire(&path).unwrap();

        let err = InstanceLock::acquire(&path).unwrap_err();
        assert!(matches!(err, SearchError::AlreadyRunning { .. }));

        drop(first);
        assert!(InstanceLock::acquire(&path).is_ok());
    }

    #[test]
    fn test_missing_directory_is_error() {
        let dir = tempdir().unwrap();
        let err = InstanceLock::acquire(dir.path().join("nope").join("x.lock")).unwrap_err();
        assert!(matches!(err, SearchError::Other(_)));
    }
}
