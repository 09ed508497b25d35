use thiserror::Error;

/// Errors that can occur during document-store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The addressed document does not exist.
    #[error("Document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    /// A transaction kept colliding with concurrent writes and gave up.
    ///
    /// Recoverable: the operator may simply retry the action.
    #[error("Transaction aborted after {attempts} conflicting attempts")]
    Conflict { attempts: u32 },

    /// Document (de)serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Underlying storage engine error.
    #[error("Store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn not_found(collection: impl Into<String>, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            collection: collection.into(),
            id: id.into(),
        }
    }
}
