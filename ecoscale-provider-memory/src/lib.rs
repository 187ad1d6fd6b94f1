//! In-process record source. Every write pushes a fresh snapshot to all live queries.
//!
//! Writes never wait for subscribers. Each live query is fed by its own task
//! that forwards the newest snapshot; a subscriber that falls behind skips
//! straight to the latest state.

use std::collections::HashMap;

use async_trait::async_trait;
use ecoscale_core::{
    decode::{Document, document_timestamp},
    ports::{RecordQuery, RecordSource, SnapshotEvent, SnapshotSender, SourceError, Subscription},
};
use tokio::sync::{Mutex, watch};
use tracing::debug;

struct Subscriber {
    query: RecordQuery,
    latest: watch::Sender<SnapshotEvent>,
    sender: SnapshotSender,
}

impl Subscriber {
    fn is_cancelled(&self) -> bool {
        self.sender.is_closed() || self.latest.is_closed()
    }
}

#[derive(Default)]
struct State {
    collections: HashMap<String, Vec<Document>>,
    subscribers: Vec<Subscriber>,
}

impl State {
    fn snapshot(&self, query: &RecordQuery) -> Vec<Document> {
        self.collections
            .get(&query.collection)
            .map(|documents| {
                documents
                    .iter()
                    .filter(|document| {
                        document_timestamp(document).is_some_and(|at| at >= query.since)
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn prune(&mut self) {
        self.subscribers.retain(|subscriber| {
            let cancelled = subscriber.is_cancelled();
            if cancelled {
                debug!(collection = %subscriber.query.collection, "dropping cancelled memory subscription");
            }
            !cancelled
        });
    }

    fn notify(&mut self, collection: &str) {
        self.prune();
        for subscriber in &self.subscribers {
            if subscriber.query.collection == collection {
                subscriber
                    .latest
                    .send_replace(Ok(self.snapshot(&subscriber.query)));
            }
        }
    }
}

/// Record collections held in memory.
#[derive(Default)]
pub struct MemoryRecordSource {
    state: Mutex<State>,
}

impl MemoryRecordSource {
    /// Create an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a document to `collection` and notify live queries on it.
    pub async fn insert(&self, collection: &str, document: Document) {
        let mut state = self.state.lock().await;
        state
            .collections
            .entry(collection.to_owned())
            .or_default()
            .push(document);
        state.notify(collection);
    }

    /// Replace the whole content of `collection` and notify live queries on it.
    pub async fn replace(&self, collection: &str, documents: Vec<Document>) {
        let mut state = self.state.lock().await;
        state.collections.insert(collection.to_owned(), documents);
        state.notify(collection);
    }

    /// Deliver `error` to every live query on `collection`, as a backend outage would.
    pub async fn fail(&self, collection: &str, error: SourceError) {
        let mut state = self.state.lock().await;
        state.prune();
        for subscriber in &state.subscribers {
            if subscriber.query.collection == collection {
                subscriber.latest.send_replace(Err(error.clone()));
            }
        }
    }

    /// Number of documents stored in `collection`.
    pub async fn len(&self, collection: &str) -> usize {
        self.state
            .lock()
            .await
            .collections
            .get(collection)
            .map_or(0, Vec::len)
    }

    /// Number of live queries that have not been cancelled.
    pub async fn subscriber_count(&self) -> usize {
        let mut state = self.state.lock().await;
        state.prune();
        state.subscribers.len()
    }
}

#[async_trait]
impl RecordSource for MemoryRecordSource {
    async fn subscribe(&self, query: &RecordQuery) -> Result<Subscription, SourceError> {
        let (sender, subscription) = Subscription::channel(1);
        let mut state = self.state.lock().await;

        // Live queries start with the current content.
        let (latest, pending) = watch::channel(Ok(state.snapshot(query)));
        tokio::spawn(forward(pending, sender.clone()));

        state.subscribers.push(Subscriber {
            query: query.clone(),
            latest,
            sender,
        });
        debug!(collection = %query.collection, "memory subscription registered");
        Ok(subscription)
    }
}

async fn forward(mut pending: watch::Receiver<SnapshotEvent>, sender: SnapshotSender) {
    loop {
        let event = pending.borrow_and_update().clone();
        let delivered = match event {
            Ok(documents) => sender.snapshot(documents).await,
            Err(error) => sender.error(error).await,
        };
        if !delivered {
            break;
        }

        tokio::select! {
            () = sender.closed() => break,
            changed = pending.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }
    debug!("memory subscription cancelled");
}
