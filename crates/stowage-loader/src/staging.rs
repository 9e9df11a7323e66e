//! Transient on-disk copies of fetched objects.

use std::path::{Component, Path, PathBuf};

use stowage_core::{Error, Result};
use tempfile::TempDir;

use crate::TRACING_TARGET_STAGING;

/// An object written to its own temporary directory.
///
/// The directory and everything in it are removed when the value is dropped.
#[derive(Debug)]
pub struct StagedObject {
    dir: Option<TempDir>,
    path: PathBuf,
}

impl StagedObject {
    /// Writes `data` under a fresh temporary directory, recreating the
    /// directories of `object_name`.
    pub async fn write(object_name: &str, data: &[u8]) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("stowage-")
            .tempdir()
            .map_err(|e| Error::staging("cannot create staging directory").with_source(e))?;

        let path = dir.path().join(relative_path(object_name));
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                Error::staging(format!("cannot create '{}'", parent.display())).with_source(e)
            })?;
        }
        tokio::fs::write(&path, data).await.map_err(|e| {
            Error::staging(format!("cannot write '{}'", path.display())).with_source(e)
        })?;

        tracing::trace!(
            target: TRACING_TARGET_STAGING,
            path = %path.display(),
            size = data.len(),
            "Staged object"
        );

        Ok(Self {
            dir: Some(dir),
            path,
        })
    }

    /// Returns the staged file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the temporary directory holding the file.
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_ref().map(TempDir::path)
    }
}

impl Drop for StagedObject {
    fn drop(&mut self) {
        let Some(dir) = self.dir.take() else {
            return;
        };
        let path = dir.path().to_path_buf();

        if let Err(err) = dir.close() {
            tracing::warn!(
                target: TRACING_TARGET_STAGING,
                path = %path.display(),
                error = %err,
                "Failed to clean up staging directory"
            );
        } else {
            tracing::trace!(
                target: TRACING_TARGET_STAGING,
                path = %path.display(),
                "Cleaned up staging directory"
            );
        }
    }
}

/// Maps an object name to a path that stays inside the staging directory.
///
/// Root, `.` and `..` components are dropped. A name with nothing left
/// stages as `object`.
fn relative_path(object_name: &str) -> PathBuf {
    let relative: PathBuf = Path::new(object_name)
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part),
            _ => None,
        })
        .collect();

    if relative.as_os_str().is_empty() {
        PathBuf::from("object")
    } else {
        relative
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_stay_inside() {
        assert_eq!(relative_path("a/b/c.pdf"), PathBuf::from("a/b/c.pdf"));
        assert_eq!(relative_path("/etc/passwd"), PathBuf::from("etc/passwd"));
        assert_eq!(relative_path("../../x.txt"), PathBuf::from("x.txt"));
        assert_eq!(relative_path("a/./b/../c"), PathBuf::from("a/b/c"));
        assert_eq!(relative_path("dir/"), PathBuf::from("dir"));
        assert_eq!(relative_path(".."), PathBuf::from("object"));
    }

    #[tokio::test]
    async fn writes_nested_file_and_cleans_up() {
        let staged = StagedObject::write("reports/2024/q1.txt", b"quarterly")
            .await
            .unwrap();
        let path = staged.path().to_path_buf();
        let dir = staged.dir().unwrap().to_path_buf();

        assert!(path.ends_with("reports/2024/q1.txt"));
        assert_eq!(std::fs::read(&path).unwrap(), b"quarterly");

        drop(staged);
        assert!(!path.exists());
        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn each_object_gets_its_own_directory() {
        let a = StagedObject::write("same.txt", b"a").await.unwrap();
        let b = StagedObject::write("same.txt", b"b").await.unwrap();
        assert_ne!(a.dir(), b.dir());
    }
}
