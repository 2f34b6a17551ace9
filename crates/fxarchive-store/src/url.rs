//! Dukascopy URL construction.

use chrono::{DateTime, Datelike, Timelike, Utc};

/// Base URL for Dukascopy data feed.
pub const BASE_URL: &str = "https://datafeed.dukascopy.com/datafeed";

/// Builds the URL for a specific hour's tick data.
///
/// URL format: `{base}/{SYMBOL}/{YEAR}/{MONTH}/{DAY}/{HOUR}h_ticks.bi5`
///
/// Note: Dukascopy uses 0-indexed months (January = 00).
///
/// # Example
///
/// ```
/// use fxarchive_store::url::{BASE_URL, tick_url};
/// use chrono::{TimeZone, Utc};
///
/// let hour = Utc.with_ymd_and_hms(2013, 1, 6, 0, 0, 0).unwrap();
/// let url = tick_url(BASE_URL, "eurusd", hour);
/// assert_eq!(url, "https://datafeed.dukascopy.com/datafeed/EURUSD/2013/00/06/00h_ticks.bi5");
/// ```
#[must_use]
pub fn tick_url(base: &str, symbol: &str, hour: DateTime<Utc>) -> String {
    format!(
        "{}/{}/{}/{:02}/{:02}/{:02}h_ticks.bi5",
        base,
        symbol.to_uppercase(),
        hour.year(),
        hour.month0(),
        hour.day(),
        hour.hour()
    )
}

/// Builds the URL of a symbol's history-start metadata.
#[must_use]
pub fn history_start_url(base: &str, symbol: &str) -> String {
    format!("{}/{}/metadata/HistoryStart.bi5", base, symbol.to_uppercase())
}

/// Builds the URL of the history-start metadata covering all symbols.
#[must_use]
pub fn all_history_start_url(base: &str) -> String {
    format!("{base}/metadata/HistoryStart.bi5")
}
