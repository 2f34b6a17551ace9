//! Tick data representation.

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};

use crate::HourWindow;

/// Raw tick as read from a bi5 file.
///
/// The bi5 format stores ticks as 20 bytes in big-endian order:
/// - `u32`: milliseconds offset from hour start
/// - `u32`: ask price in points
/// - `u32`: bid price in points
/// - `f32`: ask size
/// - `f32`: bid size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawTick {
    /// Milliseconds offset from the hour start.
    pub time_delta: u32,
    /// Ask price in points.
    pub ask: u32,
    /// Bid price in points.
    pub bid: u32,
    /// Size available at the ask.
    pub ask_size: f32,
    /// Size available at the bid.
    pub bid_size: f32,
}

impl RawTick {
    /// Size in bytes of a raw tick record.
    pub const SIZE: usize = 20;

    /// Creates a new raw tick.
    #[must_use]
    pub const fn new(time_delta: u32, ask: u32, bid: u32, ask_size: f32, bid_size: f32) -> Self {
        Self {
            time_delta,
            ask,
            bid,
            ask_size,
            bid_size,
        }
    }

    /// Places the raw tick into the hour window it was downloaded for.
    ///
    /// The sizes are dropped: the local archive does not keep them.
    #[must_use]
    pub fn locate(self, window: &HourWindow) -> Tick {
        Tick::new(window, self.time_delta, self.bid, self.ask)
    }
}

/// A normalized tick bound to its hour window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// Milliseconds offset from the hour start.
    pub time_delta: u32,
    /// Tick time (GMT), truncated to seconds.
    pub time_gmt: DateTime<Utc>,
    /// Tick time (FXT), truncated to seconds.
    pub time_fxt: NaiveDateTime,
    /// Millisecond part of the tick time.
    pub time_millis: u32,
    /// Bid price in points.
    pub bid: u32,
    /// Ask price in points.
    pub ask: u32,
}

impl Tick {
    /// Size in bytes of a tick record in the local archive format.
    pub const LOCAL_SIZE: usize = 12;

    /// Creates a tick at `time_delta` milliseconds after the start of `window`.
    #[must_use]
    pub fn new(window: &HourWindow, time_delta: u32, bid: u32, ask: u32) -> Self {
        let seconds = TimeDelta::seconds(i64::from(time_delta / 1000));
        Self {
            time_delta,
            time_gmt: window.gmt() + seconds,
            time_fxt: window.fxt() + seconds,
            time_millis: time_delta % 1000,
            bid,
            ask,
        }
    }
}
