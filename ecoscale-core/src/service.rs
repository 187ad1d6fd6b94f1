//! Live aggregator that keeps the dashboard totals in sync with a record source.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::aggregate::aggregate;
use crate::clock::{Clock, query_window_start};
use crate::decode::{Document, decode_record};
use crate::model::{DailyTotals, DashboardTotals, WasteRecord, WeeklyTotals};
use crate::ports::{DEFAULT_COLLECTION, RecordQuery, RecordSource, SourceError, Subscription};

#[derive(thiserror::Error, Debug)]
/// Errors returned when starting the aggregator.
pub enum AggregatorError {
    /// `start` was called while a subscription is active.
    #[error("Aggregator is already running")]
    AlreadyRunning,
    /// The source refused the live query.
    #[error("Subscribe failed: {0}")]
    Subscribe(#[from] SourceError),
}

/// Subscribes to a record source and republishes the dashboard totals after every snapshot.
///
/// Snapshots are processed one at a time by a single task, so every published
/// [`DashboardTotals`] holds the daily and weekly values of the same pass.
pub struct LiveAggregator<C: Clock + 'static> {
    source: Arc<dyn RecordSource>,
    clock: Arc<C>,
    query: RecordQuery,
    published: Arc<watch::Sender<DashboardTotals>>,
    task: Option<JoinHandle<()>>,
}

impl<C: Clock + 'static> LiveAggregator<C> {
    /// Create an idle aggregator watching the default collection.
    ///
    /// The query window is fixed here, from the clock's current time.
    #[must_use]
    pub fn new(source: Arc<dyn RecordSource>, clock: C) -> Self {
        Self::with_collection(source, clock, DEFAULT_COLLECTION)
    }

    /// Create an idle aggregator watching `collection`.
    #[must_use]
    pub fn with_collection<S: Into<String>>(
        source: Arc<dyn RecordSource>,
        clock: C,
        collection: S,
    ) -> Self {
        let since = query_window_start(&clock.now());
        let (published, _) = watch::channel(DashboardTotals::default());
        Self {
            source,
            clock: Arc::new(clock),
            query: RecordQuery::new(collection, since),
            published: Arc::new(published),
            task: None,
        }
    }

    /// Lower bound of the live query.
    #[must_use]
    pub fn since(&self) -> DateTime<Utc> {
        self.query.since
    }

    /// The live query this aggregator registers on `start`.
    #[must_use]
    pub fn query(&self) -> &RecordQuery {
        &self.query
    }

    /// Observe published totals. The receiver sees the latest value immediately.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<DashboardTotals> {
        self.published.subscribe()
    }

    /// Latest published totals.
    #[must_use]
    pub fn current(&self) -> DashboardTotals {
        *self.published.borrow()
    }

    /// Whether a subscription is being processed.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Register the live query and start processing snapshots.
    ///
    /// # Errors
    ///
    /// Returns [`AggregatorError::AlreadyRunning`] if a subscription is active,
    /// or [`AggregatorError::Subscribe`] when the source refuses the query.
    pub async fn start(&mut self) -> Result<(), AggregatorError> {
        if self.is_running() {
            return Err(AggregatorError::AlreadyRunning);
        }

        let subscription = self.source.subscribe(&self.query).await?;
        info!(
            collection = %self.query.collection,
            since = %self.query.since,
            "listening for waste records"
        );

        let clock = Arc::clone(&self.clock);
        let published = Arc::clone(&self.published);
        self.task = Some(tokio::spawn(run(subscription, clock, published)));
        Ok(())
    }

    /// Cancel the subscription. Once this returns no further pass runs and
    /// the last published totals stay as they are.
    pub async fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            // Cancellation is the expected outcome; a finished task is fine too.
            if let Err(error) = task.await
                && error.is_panic()
            {
                warn!(%error, "aggregation task panicked");
            }
            info!(collection = %self.query.collection, "stopped listening for waste records");
        }
    }
}

impl<C: Clock + 'static> Drop for LiveAggregator<C> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn run<C: Clock>(
    mut subscription: Subscription,
    clock: Arc<C>,
    published: Arc<watch::Sender<DashboardTotals>>,
) {
    while let Some(event) = subscription.recv().await {
        match event {
            Ok(documents) => {
                let (daily, weekly) = recompute(clock.as_ref(), &documents);
                published.send_modify(|current| {
                    *current = DashboardTotals {
                        daily,
                        weekly,
                        revision: current.revision + 1,
                    };
                });
            }
            Err(error) => {
                warn!(%error, "record subscription failed, keeping last totals");
            }
        }
    }
    info!("record subscription ended");
}

fn recompute<C: Clock>(clock: &C, documents: &[Document]) -> (DailyTotals, WeeklyTotals) {
    let mut skipped = 0_usize;
    let records: Vec<WasteRecord> = documents
        .iter()
        .filter_map(|document| match decode_record(document) {
            Ok(record) => Some(record),
            Err(error) => {
                skipped += 1;
                debug!(%error, "skipping record");
                None
            }
        })
        .collect();

    let totals = aggregate(&records, &clock.now());
    debug!(
        documents = documents.len(),
        skipped,
        today_kg = totals.0.total(),
        "aggregation pass complete"
    );
    totals
}
