//! Document-store abstraction consumed by the content services.
//!
//! The trait mirrors what the hosted document database is used for:
//! one-shot filtered reads, realtime snapshot subscriptions, single-document
//! writes, atomic multi-document batches, and transactional
//! read-modify-write with automatic retry on conflicting concurrent writes.
//!
//! Two backends are provided: [`MemoryStore`] for tests and embedding, and
//! [`SurrealStore`] over embedded SurrealDB with RocksDB persistence.

mod document;
mod error;
mod filter;
mod memory;
mod surreal;
mod tx;
mod watch;

pub use document::{Document, Fields, CREATED_AT_FIELD, ORDER_FIELD, UPDATED_AT_FIELD};
pub use error::StoreError;
pub use filter::{Direction, Filter, Sort};
pub use memory::MemoryStore;
pub use surreal::SurrealStore;
pub use tx::TransactionCtx;
pub use watch::SubscriptionStream;

use async_trait::async_trait;

/// Bounded optimistic-concurrency retries before a transaction surfaces
/// [`StoreError::Conflict`].
pub const MAX_TRANSACTION_ATTEMPTS: u32 = 5;

/// One operation of an atomic multi-document batch.
#[derive(Debug, Clone)]
pub enum WriteOp {
    Insert {
        collection: String,
        fields: Fields,
    },
    Update {
        collection: String,
        id: String,
        patch: Fields,
    },
    Delete {
        collection: String,
        id: String,
    },
}

impl WriteOp {
    pub fn delete(collection: impl Into<String>, id: impl Into<String>) -> Self {
        WriteOp::Delete {
            collection: collection.into(),
            id: id.into(),
        }
    }
}

/// Transaction body: runs against a [`TransactionCtx`] snapshot, staging
/// writes that commit atomically. Re-invoked from a fresh snapshot when the
/// commit loses a conflict race.
pub type TransactionBody<'a> =
    &'a mut (dyn FnMut(&mut TransactionCtx) -> Result<(), StoreError> + Send);

/// The document-database contract.
///
/// Ids are store-assigned UUIDs. The store stamps `createdAt` on insert and
/// refreshes `updatedAt` on every mutation, pure reorders included.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// One-shot filtered read, optionally sorted by the store.
    async fn query(
        &self,
        collection: &str,
        filter: Filter,
        sort: Option<Sort>,
    ) -> Result<Vec<Document>, StoreError>;

    /// Single-document read; `Ok(None)` when absent.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Creates a document and returns its id.
    async fn insert(&self, collection: &str, fields: Fields) -> Result<String, StoreError>;

    /// Merge-patches an existing document; [`StoreError::NotFound`] when
    /// absent.
    async fn update(&self, collection: &str, id: &str, patch: Fields) -> Result<(), StoreError>;

    /// Deletes a document; [`StoreError::NotFound`] when absent.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    /// Atomic multi-document, cross-collection write. Deletes inside a
    /// batch are delete-if-present; update targets are validated before
    /// anything is applied.
    async fn batch_write(&self, ops: Vec<WriteOp>) -> Result<(), StoreError>;

    /// Transactional read-modify-write over one collection with bounded
    /// optimistic retry; all staged writes commit or none do.
    async fn run_transaction(
        &self,
        collection: &str,
        body: TransactionBody<'_>,
    ) -> Result<(), StoreError>;

    /// Realtime read: the full matching snapshot now, then again after
    /// every committed change touching the collection.
    async fn subscribe(
        &self,
        collection: &str,
        filter: Filter,
        sort: Option<Sort>,
    ) -> Result<SubscriptionStream, StoreError>;
}
