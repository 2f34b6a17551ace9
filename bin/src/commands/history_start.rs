//! History-start command implementation.

use crate::display::{format_fxt, format_gmt};
use anyhow::{Context, Result};
use fxarchive_lib::prelude::*;
use fxarchive_lib::{HistoryStarts, PathResolver};

/// Show the provider's first available data for one symbol or for all symbols.
pub(crate) async fn history_start(symbol: Option<&str>, config: &SyncConfig) -> Result<()> {
    let client = DownloadClient::with_defaults().context("Failed to create HTTP client")?;
    let fetcher = Fetcher::new(client);
    let mut paths = PathResolver::new(
        &config.data_root,
        config.base_url.clone(),
        config.path_cache_capacity,
    )?;

    let Some(name) = symbol else {
        let all = fetcher
            .fetch_all_history_starts(&paths)
            .await
            .context("Failed to fetch combined history start")?;
        println!("{:<16} {:<20} {:<20}", "SYMBOL", "TICKS (GMT)", "TICKS (FXT)");
        println!("{}", "-".repeat(58));
        for (name, starts) in &all {
            let (gmt, fxt) = tick_start(starts);
            println!("{name:<16} {gmt:<20} {fxt:<20}");
        }
        println!("\nTotal: {} symbols", all.len());
        return Ok(());
    };

    let symbol = SymbolCatalog::global()
        .get(name)
        .with_context(|| format!("Unknown symbol: {name}"))?;
    let Some(starts) = fetcher
        .fetch_history_start(&mut paths, symbol)
        .await
        .with_context(|| format!("Failed to fetch history start of {name}"))?
    else {
        println!("No history-start metadata for {}", symbol.name());
        return Ok(());
    };

    println!("{:<10} {:<20} {:<20}", "TIMEFRAME", "START (GMT)", "START (FXT)");
    println!("{}", "-".repeat(52));
    for (id, start) in &starts {
        let timeframe =
            Timeframe::from_id(*id).map_or_else(|| format!("{id}m"), |tf| tf.to_string());
        let (gmt, fxt) = start.map_or_else(
            || ("no data".to_string(), String::new()),
            |gmt| (format_gmt(gmt), format_fxt(gmt_to_fxt(gmt))),
        );
        println!("{timeframe:<10} {gmt:<20} {fxt:<20}");
    }

    if let Some(start) = symbol.tick_history_start() {
        println!("\nCatalog tick start (FXT): {}", format_fxt(start));
    }
    Ok(())
}

fn tick_start(starts: &HistoryStarts) -> (String, String) {
    match starts.get(&Timeframe::Tick.id()).copied().flatten() {
        Some(gmt) => (format_gmt(gmt), format_fxt(gmt_to_fxt(gmt))),
        None => ("-".to_string(), "-".to_string()),
    }
}
