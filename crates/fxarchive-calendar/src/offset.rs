//! GMT to FXT offset resolution.
//!
//! FXT follows America/New_York shifted by seven hours, so that the New York
//! close at 17:00 falls on FXT midnight. The offset to GMT is +2h in winter
//! and +3h while US daylight saving is in effect, changing twice a year.

use chrono::{DateTime, NaiveDateTime, Offset, TimeDelta, Utc};
use chrono_tz::America::New_York;
use fxarchive_types::{ArchiveError, HourWindow};
use tracing::debug;

/// Shift of FXT against New York wall-clock time.
pub const FXT_SHIFT: TimeDelta = TimeDelta::hours(7);

/// Days searched in either direction for an offset transition.
const SEARCH_DAYS: i64 = 400;

/// Attempts of the FXT to GMT inverse before giving up.
const MAX_INVERSE_PASSES: usize = 4;

/// An instant at which the FXT offset changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// First GMT instant with the new offset.
    pub time: DateTime<Utc>,
    /// Offset in effect before the transition.
    pub offset_before: TimeDelta,
    /// Offset in effect from the transition on.
    pub offset_after: TimeDelta,
}

/// The FXT offset valid at some GMT time, with the transitions bounding it.
///
/// The offset is constant on `[prev.time, next.time)`; callers keep the value
/// and only resolve again once their time leaves that interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FxtOffset {
    /// Offset of FXT against GMT.
    pub offset: TimeDelta,
    /// Last transition at or before the resolved time.
    pub prev: Option<Transition>,
    /// First transition after the resolved time.
    pub next: Option<Transition>,
}

impl FxtOffset {
    /// Returns true if this offset is valid for the given GMT time.
    #[must_use]
    pub fn covers(&self, gmt: DateTime<Utc>) -> bool {
        self.prev.is_none_or(|prev| prev.time <= gmt) && self.next.is_none_or(|next| gmt < next.time)
    }

    /// Converts a GMT time covered by this offset to FXT.
    #[must_use]
    pub fn to_fxt(&self, gmt: DateTime<Utc>) -> NaiveDateTime {
        gmt.naive_utc() + self.offset
    }
}

/// Returns the FXT offset in effect at a GMT time.
#[must_use]
pub fn fxt_offset(gmt: DateTime<Utc>) -> TimeDelta {
    let new_york = gmt.with_timezone(&New_York).offset().fix();
    TimeDelta::seconds(i64::from(new_york.local_minus_utc())) + FXT_SHIFT
}

/// Resolves the FXT offset at a GMT time together with its bounding transitions.
#[must_use]
pub fn offset_at(gmt: DateTime<Utc>) -> FxtOffset {
    FxtOffset {
        offset: fxt_offset(gmt),
        prev: prev_transition(gmt),
        next: next_transition(gmt),
    }
}

/// Converts a GMT time to FXT.
#[must_use]
pub fn gmt_to_fxt(gmt: DateTime<Utc>) -> NaiveDateTime {
    gmt.naive_utc() + fxt_offset(gmt)
}

/// Converts an FXT time to GMT.
///
/// The offset depends on the GMT time being solved for, so the conversion is
/// repeated until the offset no longer changes.
///
/// # Errors
///
/// Returns [`ArchiveError::Argument`] if the FXT time falls into the gap of a
/// forward transition and therefore has no GMT counterpart.
pub fn fxt_to_gmt(fxt: NaiveDateTime) -> Result<DateTime<Utc>, ArchiveError> {
    let mut offset = fxt_offset(fxt.and_utc());
    for _ in 0..MAX_INVERSE_PASSES {
        let gmt = (fxt - offset).and_utc();
        let actual = fxt_offset(gmt);
        if actual == offset {
            return Ok(gmt);
        }
        offset = actual;
    }
    Err(ArchiveError::argument(format!(
        "FXT time {fxt} does not exist"
    )))
}

/// Returns the first transition strictly after `gmt`.
#[must_use]
pub fn next_transition(gmt: DateTime<Utc>) -> Option<Transition> {
    let base = fxt_offset(gmt);
    let mut before = gmt;
    for day in 1..=SEARCH_DAYS {
        let probe = gmt + TimeDelta::days(day);
        if fxt_offset(probe) != base {
            return Some(bisect(before, probe, base));
        }
        before = probe;
    }
    None
}

/// Returns the last transition at or before `gmt`.
#[must_use]
pub fn prev_transition(gmt: DateTime<Utc>) -> Option<Transition> {
    let base = fxt_offset(gmt);
    let mut after = gmt;
    for day in 1..=SEARCH_DAYS {
        let probe = gmt - TimeDelta::days(day);
        let offset = fxt_offset(probe);
        if offset != base {
            return Some(bisect(probe, after, offset));
        }
        after = probe;
    }
    None
}

/// Returns all transitions within a calendar year (GMT).
#[must_use]
pub fn transitions_in_year(year: i32) -> Vec<Transition> {
    let Some(start) = chrono::NaiveDate::from_ymd_opt(year, 1, 1) else {
        return Vec::new();
    };
    let Some(end) = chrono::NaiveDate::from_ymd_opt(year + 1, 1, 1) else {
        return Vec::new();
    };
    let mut cursor = start.and_time(chrono::NaiveTime::MIN).and_utc();
    let end = end.and_time(chrono::NaiveTime::MIN).and_utc();

    let mut transitions = Vec::new();
    while let Some(transition) = next_transition(cursor) {
        if transition.time >= end {
            break;
        }
        transitions.push(transition);
        cursor = transition.time;
    }
    transitions
}

/// Narrows `[low, high]` down to the first second with a different offset.
///
/// `low` must carry `offset_before`, `high` must not.
fn bisect(mut low: DateTime<Utc>, mut high: DateTime<Utc>, offset_before: TimeDelta) -> Transition {
    while high - low > TimeDelta::seconds(1) {
        let mid = low + (high - low) / 2;
        if fxt_offset(mid) == offset_before {
            low = mid;
        } else {
            high = mid;
        }
    }
    Transition {
        time: high,
        offset_before,
        offset_after: fxt_offset(high),
    }
}

/// Hour-by-hour GMT to FXT conversion with a cached offset.
///
/// The offset is only resolved again when the converted hour leaves the
/// interval between the cached transitions.
#[derive(Debug, Clone)]
pub struct FxtClock {
    current: FxtOffset,
    resolutions: usize,
}

impl FxtClock {
    /// Creates a clock with the offset resolved at `gmt`.
    #[must_use]
    pub fn new(gmt: DateTime<Utc>) -> Self {
        Self {
            current: offset_at(gmt),
            resolutions: 1,
        }
    }

    /// Returns the hour window of a GMT hour.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::Argument`] if `gmt` is not hour-aligned.
    pub fn window(&mut self, gmt: DateTime<Utc>) -> Result<HourWindow, ArchiveError> {
        if !self.current.covers(gmt) {
            self.current = offset_at(gmt);
            self.resolutions += 1;
            debug!(
                %gmt,
                offset_hours = self.current.offset.num_hours(),
                "FXT offset changed"
            );
        }
        HourWindow::new(gmt, self.current.to_fxt(gmt))
    }

    /// Returns the currently cached offset.
    #[must_use]
    pub const fn current(&self) -> &FxtOffset {
        &self.current
    }

    /// Returns how many times the offset has been resolved.
    #[must_use]
    pub const fn resolutions(&self) -> usize {
        self.resolutions
    }
}
