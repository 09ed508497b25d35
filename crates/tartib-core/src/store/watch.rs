use std::sync::Mutex;

use tokio::sync::mpsc;

use super::document::Document;
use super::filter::{Filter, Sort};

/// Realtime read handle returned by
/// [`DocumentStore::subscribe`](super::DocumentStore::subscribe).
///
/// Yields the full, consistent snapshot of matching documents: once
/// immediately on subscribe, then again after every committed change
/// touching the collection. Dropping the stream releases the underlying
/// listener.
pub struct SubscriptionStream {
    receiver: mpsc::UnboundedReceiver<Vec<Document>>,
}

impl SubscriptionStream {
    /// Waits for the next snapshot; `None` once the store is gone.
    pub async fn recv(&mut self) -> Option<Vec<Document>> {
        self.receiver.recv().await
    }
}

struct Listener {
    collection: String,
    filter: Filter,
    sort: Option<Sort>,
    sender: mpsc::UnboundedSender<Vec<Document>>,
}

/// Registry of collection listeners shared by the store backends.
///
/// Backends call [`ChangeHub::targets`] after each committed write and push
/// a freshly computed snapshot to every listener on the touched collection.
/// Listeners whose stream was dropped are pruned on the next sweep.
#[derive(Default)]
pub(crate) struct ChangeHub {
    listeners: Mutex<Vec<Listener>>,
}

pub(crate) struct Target {
    pub filter: Filter,
    pub sort: Option<Sort>,
    sender: mpsc::UnboundedSender<Vec<Document>>,
}

impl Target {
    /// Delivers a snapshot; a closed receiver just means the subscriber
    /// went away and will be pruned on the next sweep.
    pub fn deliver(&self, docs: Vec<Document>) {
        let _ = self.sender.send(docs);
    }
}

impl ChangeHub {
    /// Registers a listener; the returned [`Target`] lets the caller push
    /// the initial snapshot to just this subscriber.
    pub fn register(
        &self,
        collection: &str,
        filter: Filter,
        sort: Option<Sort>,
    ) -> (Target, SubscriptionStream) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let target = Target {
            filter: filter.clone(),
            sort: sort.clone(),
            sender: sender.clone(),
        };
        let mut listeners = self.listeners.lock().expect("listener registry poisoned");
        listeners.push(Listener {
            collection: collection.to_string(),
            filter,
            sort,
            sender,
        });
        (target, SubscriptionStream { receiver })
    }

    /// Active listeners on a collection; closed ones are dropped here.
    pub fn targets(&self, collection: &str) -> Vec<Target> {
        let mut listeners = self.listeners.lock().expect("listener registry poisoned");
        listeners.retain(|listener| !listener.sender.is_closed());
        listeners
            .iter()
            .filter(|listener| listener.collection == collection)
            .map(|listener| Target {
                filter: listener.filter.clone(),
                sort: listener.sort.clone(),
                sender: listener.sender.clone(),
            })
            .collect()
    }
}
