//! Traits describing record sources and the subscription handles they hand out.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use crate::decode::Document;

/// Collection the weighing stations write to.
pub const DEFAULT_COLLECTION: &str = "sampah";

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
/// Errors reported by a record source.
pub enum SourceError {
    /// The backend could not be reached or answered with garbage.
    #[error("Transport error: {0}")]
    Transport(String),
    /// The backend refused the query.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    /// The source has shut down and will deliver nothing more.
    #[error("Source closed")]
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Live query over a collection: every document with `timestamp >= since`.
pub struct RecordQuery {
    /// Collection to watch.
    pub collection: String,
    /// Inclusive lower bound on the record timestamp.
    pub since: DateTime<Utc>,
}

impl RecordQuery {
    /// Construct a new query.
    #[must_use]
    pub fn new<S: Into<String>>(collection: S, since: DateTime<Utc>) -> Self {
        Self {
            collection: collection.into(),
            since,
        }
    }
}

/// One delivery on a subscription: a full snapshot or a failure.
pub type SnapshotEvent = Result<Vec<Document>, SourceError>;

/// Receiving end of a live query. Dropping it cancels the subscription.
#[derive(Debug)]
pub struct Subscription {
    events: mpsc::Receiver<SnapshotEvent>,
}

impl Subscription {
    /// Create a connected sender/subscription pair buffering up to `capacity` events.
    #[must_use]
    pub fn channel(capacity: usize) -> (SnapshotSender, Subscription) {
        let (sender, events) = mpsc::channel(capacity.max(1));
        (SnapshotSender { sender }, Subscription { events })
    }

    /// Wait for the next event. `None` once the source has hung up.
    pub async fn recv(&mut self) -> Option<SnapshotEvent> {
        self.events.recv().await
    }
}

/// Sending end held by a source for one subscriber.
#[derive(Debug, Clone)]
pub struct SnapshotSender {
    sender: mpsc::Sender<SnapshotEvent>,
}

impl SnapshotSender {
    /// Deliver a snapshot. Returns `false` when the subscriber is gone.
    pub async fn snapshot(&self, documents: Vec<Document>) -> bool {
        self.sender.send(Ok(documents)).await.is_ok()
    }

    /// Deliver a failure. Returns `false` when the subscriber is gone.
    pub async fn error(&self, error: SourceError) -> bool {
        self.sender.send(Err(error)).await.is_ok()
    }

    /// Whether the subscriber dropped its [`Subscription`].
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Resolves once the subscriber dropped its [`Subscription`].
    pub async fn closed(&self) {
        self.sender.closed().await;
    }
}

#[async_trait]
/// Trait for backends that push live query results.
pub trait RecordSource: Send + Sync {
    /// Start a live query. Every matching document is delivered on each snapshot.
    ///
    /// # Errors
    ///
    /// Returns a [`SourceError`] when the query cannot be registered.
    async fn subscribe(&self, query: &RecordQuery) -> Result<Subscription, SourceError>;
}
