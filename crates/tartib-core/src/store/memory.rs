use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use super::document::{apply_patch, stamp_new, Document, Fields};
use super::error::StoreError;
use super::filter::{snapshot, Filter, Sort};
use super::tx::{StagedOp, TransactionCtx};
use super::watch::{ChangeHub, SubscriptionStream};
use super::{DocumentStore, TransactionBody, WriteOp, MAX_TRANSACTION_ATTEMPTS};

#[derive(Clone)]
struct VersionedDoc {
    fields: Fields,
    version: u64,
}

type Collection = HashMap<String, VersionedDoc>;

/// In-process reference implementation of [`DocumentStore`].
///
/// Documents carry a version counter used for optimistic-concurrency
/// validation of transaction commits. Subscribers receive a full
/// filtered/sorted snapshot after every committed write touching their
/// collection, so an atomic swap produces exactly one refresh.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<HashMap<String, Collection>>,
    hub: ChangeHub,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn documents(collection: &Collection) -> Vec<Document> {
        collection
            .iter()
            .map(|(id, doc)| Document {
                id: id.clone(),
                fields: doc.fields.clone(),
            })
            .collect()
    }

    fn versioned(collection: &Collection) -> Vec<(Document, u64)> {
        collection
            .iter()
            .map(|(id, doc)| {
                (
                    Document {
                        id: id.clone(),
                        fields: doc.fields.clone(),
                    },
                    doc.version,
                )
            })
            .collect()
    }

    /// Pushes fresh snapshots to every listener on the collection.
    ///
    /// Called while the state lock is held so deliveries observe commits in
    /// order.
    fn notify(&self, state: &HashMap<String, Collection>, collection: &str) {
        let docs = state.get(collection).map(Self::documents).unwrap_or_default();
        for target in self.hub.targets(collection) {
            let view = snapshot(docs.clone(), &target.filter, target.sort.as_ref());
            target.deliver(view);
        }
    }

    fn apply_staged(
        name: &str,
        collection: &mut Collection,
        staged: &[StagedOp],
    ) -> Result<(), StoreError> {
        for op in staged {
            match op {
                StagedOp::Insert { id, fields } => {
                    let mut fields = fields.clone();
                    stamp_new(&mut fields);
                    collection.insert(id.clone(), VersionedDoc { fields, version: 1 });
                }
                StagedOp::Update { id, patch } => {
                    let doc = collection
                        .get_mut(id)
                        .ok_or_else(|| StoreError::not_found(name, id.clone()))?;
                    apply_patch(&mut doc.fields, patch);
                    doc.version += 1;
                }
                StagedOp::Delete { id } => {
                    collection.remove(id);
                }
            }
        }
        Ok(())
    }

    fn lock_read(
        &self,
    ) -> std::sync::RwLockReadGuard<'_, HashMap<String, Collection>> {
        self.state.read().expect("store state poisoned")
    }

    fn lock_write(
        &self,
    ) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Collection>> {
        self.state.write().expect("store state poisoned")
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn query(
        &self,
        collection: &str,
        filter: Filter,
        sort: Option<Sort>,
    ) -> Result<Vec<Document>, StoreError> {
        let state = self.lock_read();
        let docs = state.get(collection).map(Self::documents).unwrap_or_default();
        Ok(snapshot(docs, &filter, sort.as_ref()))
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let state = self.lock_read();
        Ok(state.get(collection).and_then(|docs| {
            docs.get(id).map(|doc| Document {
                id: id.to_string(),
                fields: doc.fields.clone(),
            })
        }))
    }

    async fn insert(&self, collection: &str, mut fields: Fields) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        stamp_new(&mut fields);

        let mut state = self.lock_write();
        state
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), VersionedDoc { fields, version: 1 });
        self.notify(&state, collection);
        Ok(id)
    }

    async fn update(&self, collection: &str, id: &str, patch: Fields) -> Result<(), StoreError> {
        let mut state = self.lock_write();
        let doc = state
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::not_found(collection, id))?;
        apply_patch(&mut doc.fields, &patch);
        doc.version += 1;
        self.notify(&state, collection);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let mut state = self.lock_write();
        let removed = state
            .get_mut(collection)
            .and_then(|docs| docs.remove(id))
            .is_some();
        if !removed {
            return Err(StoreError::not_found(collection, id));
        }
        self.notify(&state, collection);
        Ok(())
    }

    async fn batch_write(&self, ops: Vec<WriteOp>) -> Result<(), StoreError> {
        let mut state = self.lock_write();

        // Validate before touching anything so the batch is all-or-nothing.
        for op in &ops {
            if let WriteOp::Update { collection, id, .. } = op {
                let exists = state
                    .get(collection.as_str())
                    .is_some_and(|docs| docs.contains_key(id));
                if !exists {
                    return Err(StoreError::not_found(collection.clone(), id.clone()));
                }
            }
        }

        let mut touched: Vec<String> = Vec::new();
        for op in ops {
            match op {
                WriteOp::Insert { collection, mut fields } => {
                    stamp_new(&mut fields);
                    state.entry(collection.clone()).or_default().insert(
                        Uuid::new_v4().to_string(),
                        VersionedDoc { fields, version: 1 },
                    );
                    touched.push(collection);
                }
                WriteOp::Update {
                    collection,
                    id,
                    patch,
                } => {
                    if let Some(doc) = state
                        .get_mut(collection.as_str())
                        .and_then(|docs| docs.get_mut(&id))
                    {
                        apply_patch(&mut doc.fields, &patch);
                        doc.version += 1;
                    }
                    touched.push(collection);
                }
                WriteOp::Delete { collection, id } => {
                    // Batch deletes are delete-if-present: a document that
                    // vanished between the caller's pre-query and the batch
                    // must not fail the whole write.
                    if let Some(docs) = state.get_mut(collection.as_str()) {
                        docs.remove(&id);
                    }
                    touched.push(collection);
                }
            }
        }

        touched.sort();
        touched.dedup();
        for collection in &touched {
            self.notify(&state, collection);
        }
        Ok(())
    }

    async fn run_transaction(
        &self,
        collection: &str,
        body: TransactionBody<'_>,
    ) -> Result<(), StoreError> {
        for attempt in 1..=MAX_TRANSACTION_ATTEMPTS {
            let snapshot = {
                let state = self.lock_read();
                state.get(collection).map(Self::versioned).unwrap_or_default()
            };

            let mut ctx = TransactionCtx::new(snapshot);
            body(&mut ctx)?;

            if !ctx.has_writes() {
                return Ok(());
            }

            {
                let mut state = self.lock_write();
                let current = state.get(collection).map(Self::versioned).unwrap_or_default();
                if ctx.validate(&current) {
                    let docs = state.entry(collection.to_string()).or_default();
                    Self::apply_staged(collection, docs, ctx.staged())?;
                    self.notify(&state, collection);
                    return Ok(());
                }
            }

            debug!(collection, attempt, "transaction conflict, retrying");
            tokio::task::yield_now().await;
        }

        Err(StoreError::Conflict {
            attempts: MAX_TRANSACTION_ATTEMPTS,
        })
    }

    async fn subscribe(
        &self,
        collection: &str,
        filter: Filter,
        sort: Option<Sort>,
    ) -> Result<SubscriptionStream, StoreError> {
        // Registered and primed under the read lock so no commit can slip
        // between the initial snapshot and the first change delivery.
        let state = self.lock_read();
        let (target, stream) = self.hub.register(collection, filter, sort);
        let docs = state.get(collection).map(Self::documents).unwrap_or_default();
        let initial = snapshot(docs, &target.filter, target.sort.as_ref());
        target.deliver(initial);
        Ok(stream)
    }
}
