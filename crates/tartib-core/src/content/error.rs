use thiserror::Error;

use crate::objects::ObjectError;
use crate::store::StoreError;

/// Errors surfaced by the content services.
///
/// Nothing is swallowed: store and object-storage failures propagate to the
/// caller, which owns user-visible messaging.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Object(#[from] ObjectError),

    /// Malformed input, rejected before any store call.
    #[error("Validation failed: {0}")]
    Validation(String),
}
