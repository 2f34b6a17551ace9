//! Display utilities for the fxarchive CLI.

use anyhow::{Result, bail};
use chrono::{DateTime, NaiveDateTime, Utc};
use fxarchive_lib::prelude::*;
use indicatif::{ProgressBar, ProgressStyle};

/// Creates the per-symbol hour progress bar, hidden in quiet mode.
pub(crate) fn hour_progress(total_hours: u64, quiet: bool) -> Result<ProgressBar> {
    if quiet {
        return Ok(ProgressBar::hidden());
    }
    let pb = ProgressBar::new(total_hours);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} hours ({percent}%) {msg}",
        )?
        .progress_chars("=>-"),
    );
    Ok(pb)
}

/// Formats the outcome counters of a symbol run on one line.
pub(crate) fn summary_line(summary: &SymbolSummary) -> String {
    if summary.skipped {
        return format!("{}: skipped, no tick history start", summary.symbol);
    }
    let mut line = format!(
        "{}: {} hours, {} stored ({} ticks), {} present, {} weekend, {} missing, {} pending",
        summary.symbol,
        summary.hours,
        summary.persisted,
        summary.ticks,
        summary.satisfied,
        summary.non_trading,
        summary.absent,
        summary.transient
    );
    if summary.interrupted {
        line.push_str(" [interrupted]");
    }
    line
}

/// Formats a GMT instant.
pub(crate) fn format_gmt(time: DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Formats an FXT wall-clock time.
pub(crate) fn format_fxt(time: NaiveDateTime) -> String {
    time.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Parse an instrument type string into an [`InstrumentType`].
pub(crate) fn parse_instrument_type(s: &str) -> Result<InstrumentType> {
    match s.to_lowercase().as_str() {
        "forex" => Ok(InstrumentType::Forex),
        "metals" => Ok(InstrumentType::Metals),
        "index" => Ok(InstrumentType::Index),
        "commodity" => Ok(InstrumentType::Commodity),
        "crypto" => Ok(InstrumentType::Crypto),
        _ => bail!(
            "Unknown instrument type: {}. Valid options: forex, metals, index, commodity, crypto",
            s
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_instrument_type() {
        assert_eq!(parse_instrument_type("Forex").unwrap(), InstrumentType::Forex);
        assert_eq!(parse_instrument_type("metals").unwrap(), InstrumentType::Metals);
        assert!(parse_instrument_type("bond").is_err());
    }

    #[test]
    fn test_summary_line() {
        let summary = SymbolSummary {
            symbol: "EURUSD".to_string(),
            hours: 10,
            persisted: 2,
            ticks: 500,
            satisfied: 3,
            non_trading: 4,
            absent: 1,
            transient: 0,
            interrupted: true,
            skipped: false,
        };
        let line = summary_line(&summary);
        assert!(line.starts_with("EURUSD: 10 hours, 2 stored (500 ticks)"));
        assert!(line.ends_with("[interrupted]"));
    }
}
