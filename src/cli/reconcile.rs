use chrono::Utc;
use tabled::Table;
use tokio_util::sync::CancellationToken;

use super::context::Context;
use crate::{error, info, types::OutcomeTableRow, warning};

/// Reconciles until Ctrl-C is pressed or a pass fails fatally.
pub async fn run() {
    let reconciler = match Context::load().await.and_then(|ctx| ctx.reconciler()) {
        Ok(reconciler) => reconciler,
        Err(e) => error!("Cannot start reconciliation. Err: {}", e),
    };

    if reconciler.source_count() == 0 {
        warning!("No station is configured, set SOURCE_<STATION>_BASE_URL to poll one.");
    }

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown requested, stopping after the current step");
            on_signal.cancel();
        }
    });

    if let Err(e) = reconciler.run(cancel).await {
        error!("Reconciliation failed. Err: {}", e);
    }
}

/// Runs a single pass and prints what happened per station.
pub async fn tick() {
    let reconciler = match Context::load().await.and_then(|ctx| ctx.reconciler()) {
        Ok(reconciler) => reconciler,
        Err(e) => error!("Cannot start reconciliation. Err: {}", e),
    };

    let outcomes = match reconciler.tick(Utc::now()).await {
        Ok(outcomes) => outcomes,
        Err(e) => error!("Reconciliation pass failed. Err: {}", e),
    };

    if outcomes.is_empty() {
        warning!("No station is configured.");
        return;
    }

    let rows: Vec<OutcomeTableRow> = outcomes
        .into_iter()
        .map(|o| OutcomeTableRow {
            station: o.label,
            song: o.song.map(|s| s.to_string()).unwrap_or_default(),
            outcome: o.outcome.to_string(),
        })
        .collect();
    println!("{}", Table::new(rows));
}
