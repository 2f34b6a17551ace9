//! Provider timeframes and history-start records.

use chrono::{DateTime, Utc};

/// Timeframe granularity as used in the provider's metadata files.
///
/// The numeric id is the period in minutes, ticks use id 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Timeframe {
    /// Tick-by-tick.
    Tick,
    /// 1-minute bars.
    Minute1,
    /// 1-hour bars.
    Hour1,
    /// Daily bars.
    Day1,
}

impl Timeframe {
    /// Returns the timeframe id (period in minutes).
    #[must_use]
    pub const fn id(&self) -> i64 {
        match self {
            Self::Tick => 0,
            Self::Minute1 => 1,
            Self::Hour1 => 60,
            Self::Day1 => 1440,
        }
    }

    /// Looks up a timeframe by its id.
    #[must_use]
    pub const fn from_id(id: i64) -> Option<Self> {
        match id {
            0 => Some(Self::Tick),
            1 => Some(Self::Minute1),
            60 => Some(Self::Hour1),
            1440 => Some(Self::Day1),
            _ => None,
        }
    }

    /// Returns the timeframe as a string identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Tick => "tick",
            Self::Minute1 => "m1",
            Self::Hour1 => "h1",
            Self::Day1 => "d1",
        }
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One record of a provider `HistoryStart.bi5` file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryStart {
    /// Timeframe id in minutes.
    pub timeframe_id: i64,
    /// First available data, `None` if the provider has none.
    pub start: Option<DateTime<Utc>>,
}

impl HistoryStart {
    /// Size in bytes of a history-start record.
    pub const SIZE: usize = 16;

    /// Start-time value meaning "no history available".
    pub const NO_HISTORY: i64 = i64::MAX;

    /// Builds a record from the raw period (milliseconds) and start time
    /// (milliseconds since the epoch).
    #[must_use]
    pub fn from_raw(period_ms: i64, start_ms: i64) -> Self {
        let start = if start_ms == Self::NO_HISTORY {
            None
        } else {
            DateTime::from_timestamp_millis(start_ms)
        };
        Self {
            timeframe_id: period_ms / 60_000,
            start,
        }
    }

    /// Returns the known timeframe of this record, if any.
    #[must_use]
    pub const fn timeframe(&self) -> Option<Timeframe> {
        Timeframe::from_id(self.timeframe_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timeframe_ids() {
        for tf in [Timeframe::Tick, Timeframe::Minute1, Timeframe::Hour1, Timeframe::Day1] {
            assert_eq!(Timeframe::from_id(tf.id()), Some(tf));
        }
        assert_eq!(Timeframe::from_id(5), None);
    }

    #[test]
    fn test_history_start_from_raw() {
        let start = Utc.with_ymd_and_hms(2003, 5, 4, 21, 0, 0).unwrap();
        let record = HistoryStart::from_raw(3_600_000, start.timestamp_millis());
        assert_eq!(record.timeframe_id, 60);
        assert_eq!(record.timeframe(), Some(Timeframe::Hour1));
        assert_eq!(record.start, Some(start));
    }

    #[test]
    fn test_history_start_sentinel() {
        let record = HistoryStart::from_raw(60_000, HistoryStart::NO_HISTORY);
        assert_eq!(record.timeframe_id, 1);
        assert_eq!(record.start, None);
    }
}
