use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use super::error::ObjectError;
use super::ObjectStorage;

/// Filesystem-backed object storage rooted at a data directory.
///
/// Object paths are slash-separated keys (`diagrams/<file>`); the returned
/// URL is the absolute path of the stored file.
pub struct FsObjectStorage {
    root: PathBuf,
}

impl FsObjectStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn object_path(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }

    async fn ensure_parent(&self, target: &Path) -> Result<(), ObjectError> {
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ObjectError::io(parent, e))?;
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStorage for FsObjectStorage {
    async fn put(&self, path: &str, bytes: &[u8]) -> Result<String, ObjectError> {
        let target = self.object_path(path);
        self.ensure_parent(&target).await?;
        fs::write(&target, bytes)
            .await
            .map_err(|e| ObjectError::io(&target, e))?;
        Ok(self.url(path))
    }

    async fn delete(&self, path: &str) -> Result<(), ObjectError> {
        let target = self.object_path(path);
        match fs::remove_file(&target).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(ObjectError::NotFound(path.to_string()))
            }
            Err(e) => Err(ObjectError::io(&target, e)),
        }
    }

    fn url(&self, path: &str) -> String {
        self.object_path(path).display().to_string()
    }
}
