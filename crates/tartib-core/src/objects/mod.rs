//! Object-storage abstraction for binary assets (diagram images,
//! template PDFs).

mod error;
mod fs;

pub use error::ObjectError;
pub use fs::FsObjectStorage;

use async_trait::async_trait;

/// The object-storage contract: content-addressed puts and deletes plus
/// URL resolution for stored objects.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Stores the bytes at the given key and returns the object's URL.
    async fn put(&self, path: &str, bytes: &[u8]) -> Result<String, ObjectError>;

    /// Removes the object; [`ObjectError::NotFound`] when it is already
    /// gone.
    async fn delete(&self, path: &str) -> Result<(), ObjectError>;

    /// URL under which the object at `path` is served.
    fn url(&self, path: &str) -> String;
}
