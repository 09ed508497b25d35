//! Generic ordering behavior shared by every entity family.
//!
//! One [`OrderedCollection`] instance per family replaces the original
//! console's four near-duplicate copies of the assign/swap/watch pattern.
//! All order mutations run inside the store's transactional
//! read-modify-write: creation reads the sibling maximum and inserts in the
//! same transaction (two concurrent creations cannot double-book an order
//! value), and moves re-derive the subject's current order from a fresh
//! read instead of trusting a caller-supplied one.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;

use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::store::{
    Document, DocumentStore, Fields, StoreError, TransactionCtx, ORDER_FIELD,
};

use super::entities::OrderedEntity;
use super::error::ContentError;
use super::scope::SiblingScope;

#[derive(Clone, Copy)]
enum MoveDirection {
    Up,
    Down,
}

/// Ordered view of one entity family.
pub struct OrderedCollection<E: OrderedEntity> {
    store: Arc<dyn DocumentStore>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: OrderedEntity> OrderedCollection<E> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    /// Inserts a new entity at the end of its sibling scope.
    ///
    /// The assigned order is `max(sibling orders) + 1` (1 for an empty
    /// scope); gaps left by deletions are never reused or compacted.
    pub async fn create(&self, fields: Fields) -> Result<String, ContentError> {
        let scope = E::scope_of(&fields);
        let filter = scope.filter();

        let mut created = String::new();
        let mut body = |tx: &mut TransactionCtx| -> Result<(), StoreError> {
            let siblings = tx.find(&filter);
            let next = siblings.iter().map(Document::order).max().unwrap_or(0) + 1;
            let mut fields = fields.clone();
            fields.insert(ORDER_FIELD.to_string(), Value::from(next));
            created = tx.insert(fields);
            Ok(())
        };
        self.store.run_transaction(E::COLLECTION, &mut body).await?;

        debug!(kind = E::KIND, id = %created, "created");
        Ok(created)
    }

    /// Reads one entity; a missing id is an error here, unlike the silent
    /// no-op for a missing move neighbor.
    pub async fn get(&self, id: &str) -> Result<E, ContentError> {
        let doc = self
            .store
            .get(E::COLLECTION, id)
            .await?
            .ok_or_else(|| StoreError::not_found(E::COLLECTION, id))?;
        Ok(doc.decode()?)
    }

    /// Merge-patches content fields; `order` is only ever touched by the
    /// swap mover.
    pub async fn update(&self, id: &str, patch: Fields) -> Result<(), ContentError> {
        if patch.is_empty() {
            return Ok(());
        }
        self.store.update(E::COLLECTION, id, patch).await?;
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<(), ContentError> {
        self.store.delete(E::COLLECTION, id).await?;
        debug!(kind = E::KIND, id, "deleted");
        Ok(())
    }

    /// Swaps the entity with the sibling immediately above it.
    ///
    /// No-op when the entity is already first, or when no sibling holds
    /// exactly `order - 1` (a gap left by a deletion).
    pub async fn move_up(&self, id: &str) -> Result<(), ContentError> {
        self.swap_move(id, MoveDirection::Up).await
    }

    /// Swaps the entity with the sibling immediately below it; the
    /// symmetric no-ops apply at the bottom and across gaps.
    pub async fn move_down(&self, id: &str) -> Result<(), ContentError> {
        self.swap_move(id, MoveDirection::Down).await
    }

    async fn swap_move(&self, id: &str, direction: MoveDirection) -> Result<(), ContentError> {
        let mut body = |tx: &mut TransactionCtx| -> Result<(), StoreError> {
            let subject = tx
                .get(id)
                .ok_or_else(|| StoreError::not_found(E::COLLECTION, id))?;
            let current = subject.order();

            let target = match direction {
                MoveDirection::Up => {
                    if current <= 1 {
                        return Ok(());
                    }
                    current - 1
                }
                MoveDirection::Down => current + 1,
            };

            // The scope comes from the subject's own fields, so the filter
            // can never disagree with the one used at creation time.
            let scope = E::scope_of(&subject.fields);
            let neighbor = tx
                .find(&scope.filter().and(ORDER_FIELD, target))
                .into_iter()
                .find(|doc| doc.id != id);

            let Some(neighbor) = neighbor else {
                // Already at the boundary, or facing a gap.
                return Ok(());
            };

            tx.update(&neighbor.id, order_patch(current));
            tx.update(id, order_patch(target));
            Ok(())
        };
        self.store.run_transaction(E::COLLECTION, &mut body).await?;

        debug!(kind = E::KIND, id, "move committed");
        Ok(())
    }

    /// All siblings in a scope, ascending by order.
    pub async fn list(&self, scope: &SiblingScope) -> Result<Vec<E>, ContentError> {
        let docs = self
            .store
            .query(E::COLLECTION, scope.filter(), scope.server_sort())
            .await?;
        let mut items = decode_all::<E>(&docs)?;
        sort_siblings(&mut items);
        Ok(items)
    }

    /// Invokes `callback` with the full, order-sorted sibling list — once
    /// immediately, then after every committed change in scope. An atomic
    /// swap arrives as a single refresh.
    pub async fn subscribe<F>(
        &self,
        scope: &SiblingScope,
        callback: F,
    ) -> Result<Subscription, ContentError>
    where
        F: Fn(Vec<E>) + Send + 'static,
    {
        let mut stream = self
            .store
            .subscribe(E::COLLECTION, scope.filter(), scope.server_sort())
            .await?;

        let task = tokio::spawn(async move {
            while let Some(docs) = stream.recv().await {
                match decode_all::<E>(&docs) {
                    Ok(mut items) => {
                        sort_siblings(&mut items);
                        callback(items);
                    }
                    Err(err) => {
                        warn!(kind = E::KIND, %err, "skipping undecodable snapshot");
                    }
                }
            }
        });

        Ok(Subscription {
            task,
            cancelled: AtomicBool::new(false),
        })
    }
}

/// Live subscription handle.
///
/// Delivery stops when [`Subscription::unsubscribe`] is called (idempotent)
/// or the handle is dropped.
pub struct Subscription {
    task: JoinHandle<()>,
    cancelled: AtomicBool,
}

impl Subscription {
    pub fn unsubscribe(&self) {
        if !self.cancelled.swap(true, AtomicOrdering::SeqCst) {
            self.task.abort();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

fn order_patch(order: i64) -> Fields {
    let mut patch = Fields::new();
    patch.insert(ORDER_FIELD.to_string(), Value::from(order));
    patch
}

fn decode_all<E: OrderedEntity>(docs: &[Document]) -> Result<Vec<E>, StoreError> {
    docs.iter().map(Document::decode).collect()
}

/// Ascending by order; ties (which the swap protocol never produces, but a
/// concurrent-create race could) break deterministically by
/// case-insensitive display name so the projection stays stable.
pub fn sort_siblings<E: OrderedEntity>(items: &mut [E]) {
    items.sort_by(|a, b| {
        a.order()
            .cmp(&b.order())
            .then_with(|| {
                a.display_name()
                    .to_lowercase()
                    .cmp(&b.display_name().to_lowercase())
            })
    });
}
