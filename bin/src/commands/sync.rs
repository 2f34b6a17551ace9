//! Sync command implementation.
//!
//! Symbols are processed one after the other. A fatal error stops the
//! current symbol only; the command fails at the end if any symbol failed.

use crate::display::{hour_progress, summary_line};
use anyhow::{Context, Result, bail};
use chrono::{DateTime, Timelike, Utc};
use fxarchive_lib::prelude::*;
use tracing::{error, warn};

/// Synchronise the given symbols, or the whole catalog if none are given.
pub(crate) async fn sync(names: &[String], config: SyncConfig, quiet: bool) -> Result<()> {
    let catalog = SymbolCatalog::global();
    let symbols: Vec<&Symbol> = if names.is_empty() {
        catalog.all()
    } else {
        names
            .iter()
            .map(|name| {
                catalog
                    .get(name)
                    .with_context(|| format!("Unknown symbol: {name}"))
            })
            .collect::<Result<_>>()?
    };

    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, stopping after the current hour");
            token.cancel();
        }
    });

    let client = DownloadClient::with_defaults().context("Failed to create HTTP client")?;
    let data_root = config.data_root.clone();
    let reconciler = HourReconciler::new(config, client)
        .with_context(|| format!("Cannot use archive at {}", data_root.display()))?;
    let mut driver = SymbolDriver::new(reconciler, cancel.clone());

    let now = Utc::now();
    let mut failed = Vec::new();
    for symbol in &symbols {
        if cancel.is_cancelled() {
            break;
        }
        match sync_symbol(&mut driver, symbol, now, quiet).await {
            Ok(summary) => {
                if !quiet {
                    println!("{}", summary_line(&summary));
                }
            }
            Err(e) => {
                error!(symbol = %symbol, error = %e, "synchronisation failed");
                failed.push(symbol.name());
            }
        }
    }

    if !failed.is_empty() {
        bail!(
            "{} of {} symbols failed: {}",
            failed.len(),
            symbols.len(),
            failed.join(", ")
        );
    }
    if cancel.is_cancelled() {
        bail!("Interrupted");
    }
    Ok(())
}

async fn sync_symbol<T: Transport>(
    driver: &mut SymbolDriver<T>,
    symbol: &Symbol,
    now: DateTime<Utc>,
    quiet: bool,
) -> Result<SymbolSummary> {
    let Some(plan) = driver.plan(symbol, now).await? else {
        return Ok(SymbolSummary {
            symbol: symbol.name().to_string(),
            skipped: true,
            ..SymbolSummary::default()
        });
    };

    let progress = hour_progress(plan.total_hours() as u64, quiet)?;
    progress.set_message(symbol.name().to_string());

    let result = driver
        .execute(symbol, &plan, |window, _| {
            if window.fxt().hour() == 0 {
                progress.set_message(format!("{} {}", symbol.name(), window.fxt().date()));
            }
            progress.inc(1);
        })
        .await;

    progress.finish_and_clear();
    Ok(result?)
}
