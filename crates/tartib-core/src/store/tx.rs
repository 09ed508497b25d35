use std::collections::HashMap;

use uuid::Uuid;

use super::document::{Document, Fields};
use super::filter::Filter;

/// A write staged inside a transaction, applied only at commit.
#[derive(Debug, Clone)]
pub(crate) enum StagedOp {
    Insert { id: String, fields: Fields },
    Update { id: String, patch: Fields },
    Delete { id: String },
}

/// Snapshot view handed to a transaction body.
///
/// Reads are served from the snapshot taken when the attempt started; staged
/// writes are not visible to subsequent reads within the same body. The
/// store validates the recorded read set against live state at commit time
/// and re-runs the body on conflict.
pub struct TransactionCtx {
    snapshot: Vec<(Document, u64)>,
    versions: HashMap<String, u64>,
    reads: HashMap<String, Option<u64>>,
    scans: Vec<(Filter, Vec<String>)>,
    staged: Vec<StagedOp>,
}

impl TransactionCtx {
    pub(crate) fn new(snapshot: Vec<(Document, u64)>) -> Self {
        let versions = snapshot
            .iter()
            .map(|(doc, version)| (doc.id.clone(), *version))
            .collect();
        Self {
            snapshot,
            versions,
            reads: HashMap::new(),
            scans: Vec::new(),
            staged: Vec::new(),
        }
    }

    /// Reads a single document; a miss is recorded so a concurrent insert of
    /// the same id still invalidates the commit.
    pub fn get(&mut self, id: &str) -> Option<Document> {
        let found = self
            .snapshot
            .iter()
            .find(|(doc, _)| doc.id == id)
            .map(|(doc, _)| doc.clone());
        self.reads
            .insert(id.to_string(), self.versions.get(id).copied());
        found
    }

    /// Reads every document matching the filter. The matched id set is
    /// recorded: a concurrent write that adds or removes a match
    /// invalidates the commit.
    pub fn find(&mut self, filter: &Filter) -> Vec<Document> {
        let matched: Vec<Document> = self
            .snapshot
            .iter()
            .filter(|(doc, _)| filter.matches(&doc.fields))
            .map(|(doc, _)| doc.clone())
            .collect();
        for doc in &matched {
            self.reads
                .insert(doc.id.clone(), self.versions.get(&doc.id).copied());
        }
        self.scans.push((
            filter.clone(),
            matched.iter().map(|doc| doc.id.clone()).collect(),
        ));
        matched
    }

    /// Stages an insert and returns the id the document will receive.
    pub fn insert(&mut self, fields: Fields) -> String {
        let id = Uuid::new_v4().to_string();
        self.staged.push(StagedOp::Insert {
            id: id.clone(),
            fields,
        });
        id
    }

    /// Stages a merge-patch of an existing document.
    pub fn update(&mut self, id: &str, patch: Fields) {
        self.staged.push(StagedOp::Update {
            id: id.to_string(),
            patch,
        });
    }

    /// Stages a delete.
    pub fn delete(&mut self, id: &str) {
        self.staged.push(StagedOp::Delete { id: id.to_string() });
    }

    pub(crate) fn has_writes(&self) -> bool {
        !self.staged.is_empty()
    }

    pub(crate) fn staged(&self) -> &[StagedOp] {
        &self.staged
    }

    /// Checks the recorded read set against the live collection state.
    pub(crate) fn validate(&self, current: &[(Document, u64)]) -> bool {
        let live: HashMap<&str, (&Document, u64)> = current
            .iter()
            .map(|(doc, version)| (doc.id.as_str(), (doc, *version)))
            .collect();

        for (id, seen) in &self.reads {
            let now = live.get(id.as_str()).map(|(_, version)| *version);
            if now != *seen {
                return false;
            }
        }

        for (filter, matched_ids) in &self.scans {
            let mut now: Vec<&str> = live
                .values()
                .filter(|(doc, _)| filter.matches(&doc.fields))
                .map(|(doc, _)| doc.id.as_str())
                .collect();
            now.sort_unstable();
            let mut seen: Vec<&str> = matched_ids.iter().map(String::as_str).collect();
            seen.sort_unstable();
            if now != seen {
                return false;
            }
        }

        true
    }
}
