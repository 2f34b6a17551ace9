//! Hour windows and hour iteration.

use chrono::{DateTime, NaiveDateTime, TimeDelta, Timelike, Utc};

use crate::ArchiveError;

/// One trading hour, carried as both its GMT and its FXT start.
///
/// The FXT value is a wall-clock time without zone: it only has meaning
/// together with the GMT value it was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HourWindow {
    gmt: DateTime<Utc>,
    fxt: NaiveDateTime,
}

impl HourWindow {
    /// Creates a window from a GMT hour and its FXT counterpart.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::Argument`] if either value is not hour-aligned.
    pub fn new(gmt: DateTime<Utc>, fxt: NaiveDateTime) -> Result<Self, ArchiveError> {
        if !is_hour_aligned(&gmt.naive_utc()) {
            return Err(ArchiveError::argument(format!(
                "GMT time {gmt} is not hour-aligned"
            )));
        }
        if !is_hour_aligned(&fxt) {
            return Err(ArchiveError::argument(format!(
                "FXT time {fxt} is not hour-aligned"
            )));
        }
        Ok(Self { gmt, fxt })
    }

    /// Returns the GMT start of the hour.
    #[must_use]
    pub const fn gmt(&self) -> DateTime<Utc> {
        self.gmt
    }

    /// Returns the FXT start of the hour.
    #[must_use]
    pub const fn fxt(&self) -> NaiveDateTime {
        self.fxt
    }

    /// Returns the FXT offset of this hour (`fxt - gmt`).
    #[must_use]
    pub fn offset(&self) -> TimeDelta {
        self.fxt - self.gmt.naive_utc()
    }
}

impl std::fmt::Display for HourWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} GMT ({} FXT)",
            self.gmt.format("%Y-%m-%d %H:%M"),
            self.fxt.format("%Y-%m-%d %H:%M")
        )
    }
}

/// Returns true if the timestamp sits exactly on an hour boundary.
#[must_use]
pub fn is_hour_aligned(time: &NaiveDateTime) -> bool {
    time.minute() == 0 && time.second() == 0 && time.nanosecond() == 0
}

/// Truncates a wall-clock time to the start of its hour.
#[must_use]
pub fn floor_hour(time: NaiveDateTime) -> NaiveDateTime {
    time.date()
        .and_hms_opt(time.hour(), 0, 0)
        .unwrap_or(time)
}

/// Truncates a GMT time to the start of its hour.
#[must_use]
pub fn floor_hour_utc(time: DateTime<Utc>) -> DateTime<Utc> {
    floor_hour(time.naive_utc()).and_utc()
}

/// Iterator over GMT hours in a half-open range `[start, end)`.
#[derive(Debug, Clone)]
pub struct GmtHours {
    current: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl GmtHours {
    /// Creates an iterator over all hours from `start` (inclusive) to `end` (exclusive).
    #[must_use]
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            current: floor_hour_utc(start),
            end,
        }
    }
}

impl Iterator for GmtHours {
    type Item = DateTime<Utc>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current >= self.end {
            return None;
        }

        let result = self.current;
        self.current += TimeDelta::hours(1);
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.current >= self.end {
            return (0, Some(0));
        }
        let span = self.end - self.current;
        let mut hours = span.num_hours() as usize;
        if span > TimeDelta::hours(hours as i64) {
            hours += 1;
        }
        (hours, Some(hours))
    }
}

impl ExactSizeIterator for GmtHours {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn naive(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_window_offset() {
        let gmt = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        let window = HourWindow::new(gmt, naive(2024, 1, 15, 14, 0)).unwrap();
        assert_eq!(window.offset(), TimeDelta::hours(2));
    }

    #[test]
    fn test_window_rejects_unaligned() {
        let gmt = Utc.with_ymd_and_hms(2024, 1, 15, 12, 30, 0).unwrap();
        let result = HourWindow::new(gmt, naive(2024, 1, 15, 14, 0));
        assert!(matches!(result, Err(ArchiveError::Argument(_))));

        let gmt = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        let result = HourWindow::new(gmt, naive(2024, 1, 15, 14, 1));
        assert!(matches!(result, Err(ArchiveError::Argument(_))));
    }

    #[test]
    fn test_floor_hour() {
        assert_eq!(floor_hour(naive(2024, 3, 1, 7, 59)), naive(2024, 3, 1, 7, 0));
    }

    #[test]
    fn test_gmt_hours_half_open() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let hours: Vec<_> = GmtHours::new(start, end).collect();

        assert_eq!(hours.len(), 24);
        assert_eq!(hours[0], start);
        assert_eq!(hours[23].hour(), 23);
        assert_eq!(GmtHours::new(start, end).len(), 24);
    }

    #[test]
    fn test_gmt_hours_empty() {
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        assert_eq!(GmtHours::new(start, start).count(), 0);
    }
}
