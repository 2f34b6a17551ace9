//! Bar (candle) records of the provider's auxiliary files.

/// Raw bar as read from a bi5 candle file.
///
/// Layout: 24 bytes in big-endian order:
/// - `u32`: seconds offset from the period start
/// - `u32`: open, `u32`: close, `u32`: low, `u32`: high (points)
/// - `f32`: volume
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawBar {
    /// Offset from the period start.
    pub time_delta: u32,
    /// Open price in points.
    pub open: u32,
    /// Close price in points.
    pub close: u32,
    /// Low price in points.
    pub low: u32,
    /// High price in points.
    pub high: u32,
    /// Traded volume.
    pub volume: f32,
}

impl RawBar {
    /// Size in bytes of a raw bar record.
    pub const SIZE: usize = 24;

    /// Creates a new raw bar.
    #[must_use]
    pub const fn new(time_delta: u32, open: u32, close: u32, low: u32, high: u32, volume: f32) -> Self {
        Self {
            time_delta,
            open,
            close,
            low,
            high,
            volume,
        }
    }

    /// Returns true if `low <= open, close <= high`.
    #[must_use]
    pub const fn is_consistent(&self) -> bool {
        self.low <= self.open
            && self.low <= self.close
            && self.open <= self.high
            && self.close <= self.high
    }

    /// Returns the bar with high and low widened to cover open and close.
    #[must_use]
    pub fn repaired(self) -> Self {
        let prices = [self.open, self.close, self.low, self.high];
        Self {
            low: prices.into_iter().min().unwrap_or(self.low),
            high: prices.into_iter().max().unwrap_or(self.high),
            ..self
        }
    }
}
