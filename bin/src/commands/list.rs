//! List command implementation.

use crate::display::{format_fxt, parse_instrument_type};
use anyhow::Result;
use fxarchive_lib::prelude::*;

/// List catalog symbols with optional type filter or search pattern.
pub(crate) fn list_symbols(instrument_type: Option<&str>, search: Option<&str>) -> Result<()> {
    let catalog = SymbolCatalog::global();

    let symbols = match (instrument_type, search) {
        (Some(t), _) => catalog.by_type(parse_instrument_type(t)?),
        (_, Some(pattern)) => catalog.search(pattern),
        (None, None) => catalog.all(),
    };

    if symbols.is_empty() {
        println!("No symbols found.");
        return Ok(());
    }

    println!(
        "{:<10} {:<14} {:<10} {:<7} {:<20}",
        "NAME", "PROVIDER", "TYPE", "DIGITS", "TICKS SINCE (FXT)"
    );
    println!("{}", "-".repeat(65));

    for symbol in &symbols {
        let start = symbol
            .tick_history_start()
            .map_or_else(|| "-".to_string(), format_fxt);
        println!(
            "{:<10} {:<14} {:<10} {:<7} {:<20}",
            symbol.name(),
            symbol.provider_name(),
            symbol.instrument_type(),
            symbol.digits(),
            start
        );
    }

    println!("\nTotal: {} symbols", symbols.len());
    Ok(())
}
