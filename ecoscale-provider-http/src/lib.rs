//! Record source that polls a JSON document endpoint.
//!
//! The endpoint answers `GET {base_url}/{collection}?since={rfc3339}` with
//! `{ "documents": [ ... ] }`. A snapshot is pushed whenever the returned set
//! differs from the previous one.

use std::time::Duration;

use async_trait::async_trait;
use chrono::SecondsFormat;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, warn};

use ecoscale_core::{
    decode::Document,
    ports::{RecordQuery, RecordSource, SnapshotSender, SourceError, Subscription},
};

/// Poll interval used when none is configured.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Response body of the documents endpoint.
#[derive(Debug, Deserialize)]
struct DocumentsResponse {
    #[serde(default)]
    documents: Vec<Document>,
}

/// Live queries backed by periodic HTTP requests.
pub struct HttpRecordSource {
    client: Client,
    base_url: String,
    poll_interval: Duration,
}

impl HttpRecordSource {
    /// Create a source for the endpoint at `base_url`.
    #[must_use]
    pub fn new<S: Into<String>>(client: Client, base_url: S) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Override the poll interval. Zero is raised to one millisecond.
    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval.max(Duration::from_millis(1));
        self
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/{collection}", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl RecordSource for HttpRecordSource {
    async fn subscribe(&self, query: &RecordQuery) -> Result<Subscription, SourceError> {
        if query.collection.trim().is_empty() {
            return Err(SourceError::Transport("empty collection name".into()));
        }

        let url = self.collection_url(&query.collection);
        let since = query.since.to_rfc3339_opts(SecondsFormat::Millis, true);
        let request = self.client.get(url).query(&[("since", since)]);

        let (sender, subscription) = Subscription::channel(1);
        tokio::spawn(poll(request, sender, self.poll_interval));
        Ok(subscription)
    }
}

async fn poll(request: RequestBuilder, sender: SnapshotSender, poll_interval: Duration) {
    let mut ticker = time::interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_delivered: Option<Vec<Document>> = None;

    loop {
        tokio::select! {
            () = sender.closed() => break,
            _ = ticker.tick() => {}
        }

        let Some(attempt) = request.try_clone() else {
            warn!("documents request cannot be repeated");
            let _delivered = sender
                .error(SourceError::Transport("request cannot be repeated".into()))
                .await;
            break;
        };

        let delivered = match fetch_documents(attempt).await {
            Ok(documents) if last_delivered.as_ref() == Some(&documents) => {
                debug!(documents = documents.len(), "documents unchanged");
                true
            }
            Ok(documents) => {
                let alive = sender.snapshot(documents.clone()).await;
                last_delivered = Some(documents);
                alive
            }
            Err(error) => {
                warn!(%error, "polling documents failed");
                sender.error(error).await
            }
        };

        if !delivered {
            break;
        }
    }

    debug!("http subscription cancelled");
}

async fn fetch_documents(request: RequestBuilder) -> Result<Vec<Document>, SourceError> {
    let response = request.send().await.map_err(transport_error)?;

    match response.status() {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            return Err(SourceError::PermissionDenied(response.status().to_string()));
        }
        status if !status.is_success() => {
            return Err(SourceError::Transport(format!("unexpected status {status}")));
        }
        _ => {}
    }

    let body: DocumentsResponse = response.json().await.map_err(transport_error)?;
    Ok(body.documents)
}

fn transport_error(error: reqwest::Error) -> SourceError {
    SourceError::Transport(error.to_string())
}
