//! Trading sessions on the FXT clock.

use chrono::{Datelike, NaiveDateTime, NaiveTime, TimeDelta, Weekday};
use fxarchive_types::{ArchiveError, HourWindow};

use crate::fxt_to_gmt;

/// Returns true if the FXT time falls into the weekend.
///
/// The FX week opens on FXT Monday 00:00 (Sunday 17:00 in New York), so all
/// of Saturday and Sunday on the FXT clock are non-trading.
#[must_use]
pub fn is_non_trading(fxt: NaiveDateTime) -> bool {
    matches!(fxt.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Rounds an FXT time forward to the next FXT day boundary.
///
/// Times already on a day boundary are returned unchanged.
#[must_use]
pub fn next_day_boundary(fxt: NaiveDateTime) -> NaiveDateTime {
    let midnight = fxt.date().and_time(NaiveTime::MIN);
    if midnight == fxt {
        fxt
    } else {
        midnight + TimeDelta::days(1)
    }
}

/// Returns the first hour to synchronize for a tick history starting at `start_fxt`.
///
/// The start is rounded forward to the next FXT day boundary and converted
/// back to GMT with the offset of the rounded instant.
///
/// # Errors
///
/// Returns [`ArchiveError::Argument`] if the rounded time cannot be converted.
pub fn first_trading_hour(start_fxt: NaiveDateTime) -> Result<HourWindow, ArchiveError> {
    let fxt = next_day_boundary(start_fxt);
    let gmt = fxt_to_gmt(fxt)?;
    HourWindow::new(gmt, fxt)
}
