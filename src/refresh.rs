//! Scheduled bulk refresh of every registered pair.

use crate::core::{Pair, Quote, QuoteError};
use crate::quotation::QuoteService;
use futures::future::join_all;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// Outcome of one refresh run.
#[derive(Debug, Default)]
pub struct RefreshReport {
    pub refreshed: Vec<Quote>,
    pub failed: Vec<(Pair, QuoteError)>,
    /// Set when the pair list itself could not be read.
    pub listing_error: Option<QuoteError>,
}

impl RefreshReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.listing_error.is_none()
    }
}

/// Fetches and stores a new quote for every registered pair, ignoring
/// freshness. A failing pair is logged and skipped; the rest still refresh.
pub async fn refresh_all(service: &QuoteService) -> RefreshReport {
    let pairs = match service.registered_pairs().await {
        Ok(pairs) => pairs,
        Err(e) => {
            error!(error = %e, "Failed to list registered pairs");
            return RefreshReport {
                listing_error: Some(e),
                ..Default::default()
            };
        }
    };

    if pairs.is_empty() {
        info!("No registered pairs to refresh");
        return RefreshReport::default();
    }

    debug!(count = pairs.len(), "Refreshing registered pairs");
    let results = join_all(pairs.into_iter().map(|pair| async move {
        let result = service.refresh_pair(&pair).await;
        (pair, result)
    }))
    .await;

    let mut report = RefreshReport::default();
    for (pair, result) in results {
        match result {
            Ok(quote) => report.refreshed.push(quote),
            Err(e) => {
                warn!(%pair, error = %e, "Failed to refresh pair");
                report.failed.push((pair, e));
            }
        }
    }

    info!(
        refreshed = report.refreshed.len(),
        failed = report.failed.len(),
        "Refresh run finished"
    );
    report
}

/// Runs [`refresh_all`] every `period`, starting immediately, until
/// `shutdown` turns `true` or its sender is dropped. A run in progress is
/// abandoned on shutdown.
pub async fn run_scheduler(
    service: &QuoteService,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(period_secs = period.as_secs(), "Refresh scheduler started");
    loop {
        if *shutdown.borrow() {
            break;
        }
        tokio::select! {
            _ = interval.tick() => {
                tokio::select! {
                    _ = refresh_all(service) => {}
                    _ = shutdown.changed() => {
                        warn!("Shutdown requested during refresh run");
                        break;
                    }
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }
    info!("Refresh scheduler stopped");
}
