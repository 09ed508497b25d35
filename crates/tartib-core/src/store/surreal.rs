//! Embedded SurrealDB backend for the document store.
//!
//! Documents carry their own `docId` and `version` fields inside the
//! record; SurrealDB record ids are never read back (`OMIT id` on selects,
//! `RETURN NONE` on writes), which keeps every row a plain JSON object.
//!
//! The RocksDB engine is single-process (it holds the directory lock), so
//! writes serialize on an in-process commit lock. Transaction snapshots are
//! re-validated against a fresh read under that lock before anything is
//! applied; multi-document writes are issued as one
//! `BEGIN TRANSACTION; ...; COMMIT TRANSACTION;` statement. Predicates and
//! sorting are evaluated client-side — collections here are admin-scale,
//! and it keeps the query surface to a handful of statements.

use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;
use surrealdb::engine::local::{Db, RocksDb};
use surrealdb::Surreal;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use super::document::{apply_patch, stamp_new, Document, Fields};
use super::error::StoreError;
use super::filter::{snapshot, Filter, Sort};
use super::tx::{StagedOp, TransactionCtx};
use super::watch::{ChangeHub, SubscriptionStream};
use super::{DocumentStore, TransactionBody, WriteOp, MAX_TRANSACTION_ATTEMPTS};

/// Record field holding the store-assigned document id.
const DOC_ID_FIELD: &str = "docId";

/// Record field holding the conflict-detection version counter.
const VERSION_FIELD: &str = "version";

/// [`DocumentStore`] over embedded SurrealDB with RocksDB persistence.
pub struct SurrealStore {
    db: Surreal<Db>,
    commit_lock: Mutex<()>,
    hub: ChangeHub,
}

impl From<surrealdb::Error> for StoreError {
    fn from(err: surrealdb::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

impl SurrealStore {
    /// Opens (or creates) the database at the given path.
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        let db = Surreal::new::<RocksDb>(path).await?;
        db.use_ns("tartib").use_db("content").await?;

        Ok(Self {
            db,
            commit_lock: Mutex::new(()),
            hub: ChangeHub::default(),
        })
    }

    /// Every raw record of a collection, including `docId`/`version`.
    async fn load_raw(&self, collection: &str) -> Result<Vec<Fields>, StoreError> {
        let mut response = self
            .db
            .query("SELECT * OMIT id FROM type::table($tb)")
            .bind(("tb", collection.to_string()))
            .await?;
        let rows: Vec<Value> = response.take(0)?;

        let mut raw = Vec::with_capacity(rows.len());
        for row in rows {
            match row {
                Value::Object(map) => raw.push(map),
                other => {
                    return Err(StoreError::Backend(format!(
                        "unexpected row shape in {collection}: {other}"
                    )))
                }
            }
        }
        Ok(raw)
    }

    async fn load_raw_by_id(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Fields>, StoreError> {
        let mut response = self
            .db
            .query("SELECT * OMIT id FROM type::table($tb) WHERE docId = $id")
            .bind(("tb", collection.to_string()))
            .bind(("id", id.to_string()))
            .await?;
        let rows: Vec<Value> = response.take(0)?;
        match rows.into_iter().next() {
            Some(Value::Object(map)) => Ok(Some(map)),
            Some(other) => Err(StoreError::Backend(format!(
                "unexpected row shape in {collection}: {other}"
            ))),
            None => Ok(None),
        }
    }

    async fn load_versioned(
        &self,
        collection: &str,
    ) -> Result<Vec<(Document, u64)>, StoreError> {
        let raw = self.load_raw(collection).await?;
        Ok(raw.into_iter().filter_map(split_raw).collect())
    }

    async fn load_documents(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        Ok(self
            .load_versioned(collection)
            .await?
            .into_iter()
            .map(|(doc, _)| doc)
            .collect())
    }

    /// Runs one or more write statements; more than one is wrapped in a
    /// storage-level transaction so the batch is all-or-nothing.
    async fn execute(&self, statements: Vec<String>) -> Result<(), StoreError> {
        if statements.is_empty() {
            return Ok(());
        }
        let script = if statements.len() == 1 {
            statements.into_iter().collect::<String>()
        } else {
            format!(
                "BEGIN TRANSACTION; {} COMMIT TRANSACTION;",
                statements.join(" ")
            )
        };
        let response = self.db.query(script).await?;
        response.check()?;
        Ok(())
    }

    /// Pushes fresh snapshots to every listener on the collection. Called
    /// with the commit lock held so deliveries observe commits in order.
    async fn notify(&self, collection: &str) -> Result<(), StoreError> {
        let targets = self.hub.targets(collection);
        if targets.is_empty() {
            return Ok(());
        }
        let docs = self.load_documents(collection).await?;
        for target in targets {
            let view = snapshot(docs.clone(), &target.filter, target.sort.as_ref());
            target.deliver(view);
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for SurrealStore {
    async fn query(
        &self,
        collection: &str,
        filter: Filter,
        sort: Option<Sort>,
    ) -> Result<Vec<Document>, StoreError> {
        let docs = self.load_documents(collection).await?;
        Ok(snapshot(docs, &filter, sort.as_ref()))
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        Ok(self
            .load_raw_by_id(collection, id)
            .await?
            .and_then(split_raw)
            .map(|(doc, _)| doc))
    }

    async fn insert(&self, collection: &str, mut fields: Fields) -> Result<String, StoreError> {
        let _guard = self.commit_lock.lock().await;

        let id = Uuid::new_v4().to_string();
        stamp_new(&mut fields);
        fields.insert(DOC_ID_FIELD.to_string(), Value::String(id.clone()));
        fields.insert(VERSION_FIELD.to_string(), Value::from(1_u64));

        self.db
            .query("CREATE type::table($tb) CONTENT $data RETURN NONE")
            .bind(("tb", collection.to_string()))
            .bind(("data", Value::Object(fields)))
            .await?
            .check()?;

        self.notify(collection).await?;
        Ok(id)
    }

    async fn update(&self, collection: &str, id: &str, patch: Fields) -> Result<(), StoreError> {
        let _guard = self.commit_lock.lock().await;

        let mut raw = self
            .load_raw_by_id(collection, id)
            .await?
            .ok_or_else(|| StoreError::not_found(collection, id))?;
        apply_patch(&mut raw, &patch);
        bump_version(&mut raw);

        self.db
            .query("UPDATE type::table($tb) CONTENT $data WHERE docId = $id RETURN NONE")
            .bind(("tb", collection.to_string()))
            .bind(("id", id.to_string()))
            .bind(("data", Value::Object(raw)))
            .await?
            .check()?;

        self.notify(collection).await?;
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let _guard = self.commit_lock.lock().await;

        if self.load_raw_by_id(collection, id).await?.is_none() {
            return Err(StoreError::not_found(collection, id));
        }

        self.db
            .query("DELETE type::table($tb) WHERE docId = $id")
            .bind(("tb", collection.to_string()))
            .bind(("id", id.to_string()))
            .await?
            .check()?;

        self.notify(collection).await?;
        Ok(())
    }

    async fn batch_write(&self, ops: Vec<WriteOp>) -> Result<(), StoreError> {
        let _guard = self.commit_lock.lock().await;

        // Validate update targets up front so the batch never half-applies.
        let mut statements = Vec::with_capacity(ops.len());
        let mut touched: Vec<String> = Vec::new();
        for op in ops {
            match op {
                WriteOp::Insert {
                    collection,
                    mut fields,
                } => {
                    stamp_new(&mut fields);
                    fields.insert(
                        DOC_ID_FIELD.to_string(),
                        Value::String(Uuid::new_v4().to_string()),
                    );
                    fields.insert(VERSION_FIELD.to_string(), Value::from(1_u64));
                    statements.push(create_statement(&collection, &fields)?);
                    touched.push(collection);
                }
                WriteOp::Update {
                    collection,
                    id,
                    patch,
                } => {
                    let mut raw = self
                        .load_raw_by_id(&collection, &id)
                        .await?
                        .ok_or_else(|| StoreError::not_found(collection.clone(), id.clone()))?;
                    apply_patch(&mut raw, &patch);
                    bump_version(&mut raw);
                    statements.push(update_statement(&collection, &id, &raw)?);
                    touched.push(collection);
                }
                WriteOp::Delete { collection, id } => {
                    statements.push(delete_statement(&collection, &id));
                    touched.push(collection);
                }
            }
        }

        self.execute(statements).await?;

        touched.sort();
        touched.dedup();
        for collection in &touched {
            self.notify(collection).await?;
        }
        Ok(())
    }

    async fn run_transaction(
        &self,
        collection: &str,
        body: TransactionBody<'_>,
    ) -> Result<(), StoreError> {
        for attempt in 1..=MAX_TRANSACTION_ATTEMPTS {
            let snapshot = self.load_versioned(collection).await?;

            let mut ctx = TransactionCtx::new(snapshot);
            body(&mut ctx)?;

            if !ctx.has_writes() {
                return Ok(());
            }

            {
                let _guard = self.commit_lock.lock().await;
                let current_raw = self.load_raw(collection).await?;
                let current: Vec<(Document, u64)> = current_raw
                    .iter()
                    .cloned()
                    .filter_map(split_raw)
                    .collect();

                if ctx.validate(&current) {
                    let statements =
                        staged_statements(collection, ctx.staged(), &current_raw)?;
                    self.execute(statements).await?;
                    self.notify(collection).await?;
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
        // Serialized with commits so the initial snapshot is consistent.
        let _guard = self.commit_lock.lock().await;
        let (target, stream) = self.hub.register(collection, filter, sort);
        let docs = self.load_documents(collection).await?;
        let initial = snapshot(docs, &target.filter, target.sort.as_ref());
        target.deliver(initial);
        Ok(stream)
    }
}

/// Splits a raw record into the public document plus its version; records
/// without a `docId` (never written by this store) are skipped.
fn split_raw(mut raw: Fields) -> Option<(Document, u64)> {
    let id = match raw.remove(DOC_ID_FIELD) {
        Some(Value::String(id)) => id,
        _ => return None,
    };
    let version = raw
        .remove(VERSION_FIELD)
        .and_then(|v| v.as_u64())
        .unwrap_or(1);
    Some((Document { id, fields: raw }, version))
}

fn bump_version(raw: &mut Fields) {
    let version = raw
        .get(VERSION_FIELD)
        .and_then(Value::as_u64)
        .unwrap_or(1);
    raw.insert(VERSION_FIELD.to_string(), Value::from(version + 1));
}

/// Builds the commit statements for a validated transaction. Update patches
/// merge against the live records read under the commit lock.
fn staged_statements(
    collection: &str,
    staged: &[StagedOp],
    current_raw: &[Fields],
) -> Result<Vec<String>, StoreError> {
    let mut statements = Vec::with_capacity(staged.len());
    for op in staged {
        match op {
            StagedOp::Insert { id, fields } => {
                let mut fields = fields.clone();
                stamp_new(&mut fields);
                fields.insert(DOC_ID_FIELD.to_string(), Value::String(id.clone()));
                fields.insert(VERSION_FIELD.to_string(), Value::from(1_u64));
                statements.push(create_statement(collection, &fields)?);
            }
            StagedOp::Update { id, patch } => {
                let mut raw = current_raw
                    .iter()
                    .find(|raw| raw.get(DOC_ID_FIELD).and_then(Value::as_str) == Some(id.as_str()))
                    .cloned()
                    .ok_or_else(|| StoreError::not_found(collection, id.clone()))?;
                apply_patch(&mut raw, patch);
                bump_version(&mut raw);
                statements.push(update_statement(collection, id, &raw)?);
            }
            StagedOp::Delete { id } => {
                statements.push(delete_statement(collection, id));
            }
        }
    }
    Ok(statements)
}

// Batch statements inline their values: ids are store-generated UUIDs,
// collection names are crate constants, and record content is JSON, which
// SurrealQL accepts as an object literal.

fn create_statement(collection: &str, fields: &Fields) -> Result<String, StoreError> {
    let content = serde_json::to_string(&Value::Object(fields.clone()))?;
    Ok(format!(
        "CREATE type::table('{collection}') CONTENT {content} RETURN NONE;"
    ))
}

fn update_statement(collection: &str, id: &str, raw: &Fields) -> Result<String, StoreError> {
    let content = serde_json::to_string(&Value::Object(raw.clone()))?;
    Ok(format!(
        "UPDATE type::table('{collection}') CONTENT {content} WHERE docId = '{id}' RETURN NONE;"
    ))
}

fn delete_statement(collection: &str, id: &str) -> String {
    format!("DELETE type::table('{collection}') WHERE docId = '{id}';")
}
