//! Command-line dashboard that prints live waste totals from an EcoScale endpoint.

mod config;
mod report;

use std::{io, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use ecoscale_core::{
    clock::{Clock, SystemClock},
    label::DateLabel,
    model::DashboardTotals,
    service::LiveAggregator,
};
use ecoscale_provider_http::HttpRecordSource;
use reqwest::Client;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::Args;

const DEFAULT_LOG_DIRECTIVES: &str = "info";

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging()?;

    // HTTP + source setup
    let client = Client::builder().user_agent("ecoscale/0.1").build()?;
    let source = Arc::new(
        HttpRecordSource::new(client, args.endpoint.clone()).with_poll_interval(args.poll_interval()),
    );

    let clock = SystemClock;
    let label = DateLabel::new(&clock.now(), Some(args.location.as_str()), args.locale.into());
    report::write_header(&mut io::stdout().lock(), &label)?;

    let mut aggregator = LiveAggregator::with_collection(source, clock, args.collection.clone());
    let mut totals = aggregator.subscribe();
    aggregator
        .start()
        .await
        .with_context(|| format!("subscribing to {}", args.endpoint))?;

    let res = run(&mut totals).await;

    aggregator.stop().await;
    res
}

async fn run(totals: &mut watch::Receiver<DashboardTotals>) -> Result<()> {
    loop {
        let changed = tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal?;
                info!("interrupted, shutting down");
                return Ok(());
            }
            changed = totals.changed() => changed,
        };

        // The aggregator dropped its sender; nothing more will arrive.
        if changed.is_err() {
            return Ok(());
        }

        let current = *totals.borrow_and_update();
        report::write_totals(&mut io::stdout().lock(), &current)?;
    }
}

fn init_logging() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_LOG_DIRECTIVES))
        .context("parsing log directives")?;

    fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|error| anyhow::anyhow!("installing log subscriber: {error}"))
}
