use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during object-storage operations.
#[derive(Debug, Error)]
pub enum ObjectError {
    /// The object does not exist. Callers deleting assets best-effort
    /// match on this to log-and-continue.
    #[error("Object not found: {0}")]
    NotFound(String),

    /// IO error.
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ObjectError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ObjectError::Io {
            path: path.into(),
            source,
        }
    }
}
