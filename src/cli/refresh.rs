use super::ui;
use crate::quotation::QuoteService;
use crate::refresh::{RefreshReport, refresh_all, run_scheduler};
use anyhow::Result;
use comfy_table::Cell;
use std::time::Duration;
use tokio::signal;
use tokio::sync::watch;
use tracing::info;

fn display_report(report: &RefreshReport) -> String {
    if let Some(e) = &report.listing_error {
        return ui::style_text(&format!("Refresh failed: {e}"), ui::StyleType::Error);
    }
    if report.refreshed.is_empty() && report.failed.is_empty() {
        return ui::style_text("No registered pairs to refresh", ui::StyleType::Subtle);
    }

    let mut output = ui::quotes_table(&report.refreshed);
    if !report.failed.is_empty() {
        let mut failures = ui::new_styled_table();
        failures.set_header(vec![ui::header_cell("Pair"), ui::header_cell("Error")]);
        for (pair, e) in &report.failed {
            failures.add_row(vec![Cell::new(pair.to_string()), ui::error_cell(&e.to_string())]);
        }
        output.push_str("\n\n");
        output.push_str(&ui::style_text("Failed", ui::StyleType::Error));
        output.push('\n');
        output.push_str(&failures.to_string());
    }
    output
}

/// Runs one refresh over every registered pair.
pub async fn once(service: &QuoteService) -> Result<()> {
    let report = refresh_all(service).await;
    println!("{}", display_report(&report));

    if report.is_success() {
        return Ok(());
    }
    match report.listing_error {
        Some(e) => Err(e.into()),
        None => Err(anyhow::anyhow!(
            "{} of {} pairs failed to refresh",
            report.failed.len(),
            report.failed.len() + report.refreshed.len()
        )),
    }
}

/// Refreshes on a fixed period until Ctrl-C.
pub async fn periodic(service: &QuoteService, period: Duration) -> Result<()> {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received, stopping");
        }
        let _ = shutdown_tx.send(true);
    });

    run_scheduler(service, period, shutdown_rx).await;
    Ok(())
}
