//! Binary record parsing for the bi5 family of formats.
//!
//! All provider records are big-endian, including the trailing `f32` fields.
//! Floats are read as their big-endian bit pattern, independent of host order.

use std::collections::BTreeMap;

use byteorder::{BigEndian, ByteOrder};
use chrono::{DateTime, NaiveDateTime, Utc};
use fxarchive_types::{
    ArchiveError, HistoryStart, HourWindow, RawBar, RawTick, Tick, floor_hour, point_value,
};
use thiserror::Error;
use tracing::warn;

/// Start times of one symbol, keyed by timeframe id.
pub type HistoryStarts = BTreeMap<i64, Option<DateTime<Utc>>>;

/// Errors that can occur during record parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Invalid data length (not a positive multiple of the record size).
    #[error("Invalid data length: {0} bytes (expected positive multiple of {1})")]
    InvalidLength(usize, usize),

    /// A decoded tick lies outside the requested hour.
    #[error("Tick at {tick} FXT does not belong to hour {hour} FXT")]
    HourMismatch {
        /// FXT time of the offending tick.
        tick: NaiveDateTime,
        /// Requested FXT hour.
        hour: NaiveDateTime,
    },

    /// A record ended before its declared length.
    #[error("Truncated record at offset {0}")]
    Truncated(usize),

    /// A symbol name is not valid UTF-8.
    #[error("Invalid symbol name at offset {0}")]
    InvalidName(usize),
}

impl From<ParseError> for ArchiveError {
    fn from(e: ParseError) -> Self {
        Self::Decode(e.to_string())
    }
}

fn check_length(data: &[u8], size: usize) -> Result<(), ParseError> {
    if data.is_empty() || !data.len().is_multiple_of(size) {
        return Err(ParseError::InvalidLength(data.len(), size));
    }
    Ok(())
}

/// Parses raw ticks from decompressed bi5 data.
///
/// The bi5 format stores ticks as 20 bytes in big-endian order:
/// - `u32`: milliseconds offset from hour start (bytes 0-3)
/// - `u32`: ask price in points (bytes 4-7)
/// - `u32`: bid price in points (bytes 8-11)
/// - `f32`: ask size (bytes 12-15)
/// - `f32`: bid size (bytes 16-19)
///
/// # Errors
///
/// Returns an error if the data length is not a positive multiple of 20.
pub fn parse_raw_ticks(data: &[u8]) -> Result<impl Iterator<Item = RawTick> + '_, ParseError> {
    check_length(data, RawTick::SIZE)?;
    Ok(data.chunks_exact(RawTick::SIZE).map(parse_single_tick))
}

/// Parses a single tick from a 20-byte chunk.
#[inline]
fn parse_single_tick(data: &[u8]) -> RawTick {
    RawTick::new(
        BigEndian::read_u32(&data[0..4]),
        BigEndian::read_u32(&data[4..8]),
        BigEndian::read_u32(&data[8..12]),
        BigEndian::read_f32(&data[12..16]),
        BigEndian::read_f32(&data[16..20]),
    )
}

/// Parses the ticks of one hour and checks that they belong to it.
///
/// # Errors
///
/// Returns an error if the data length is invalid or if the first or last
/// tick falls outside the window's FXT hour.
pub fn parse_ticks(data: &[u8], window: &HourWindow) -> Result<Vec<Tick>, ParseError> {
    let ticks: Vec<Tick> = parse_raw_ticks(data)?
        .map(|raw| raw.locate(window))
        .collect();

    for tick in [ticks.first(), ticks.last()].into_iter().flatten() {
        if floor_hour(tick.time_fxt) != window.fxt() {
            return Err(ParseError::HourMismatch {
                tick: tick.time_fxt,
                hour: window.fxt(),
            });
        }
    }
    Ok(ticks)
}

/// Encodes raw ticks into the bi5 record format.
#[must_use]
pub fn encode_ticks(ticks: &[RawTick]) -> Vec<u8> {
    let mut bytes = vec![0u8; ticks.len() * RawTick::SIZE];
    for (chunk, tick) in bytes.chunks_exact_mut(RawTick::SIZE).zip(ticks) {
        BigEndian::write_u32(&mut chunk[0..4], tick.time_delta);
        BigEndian::write_u32(&mut chunk[4..8], tick.ask);
        BigEndian::write_u32(&mut chunk[8..12], tick.bid);
        BigEndian::write_f32(&mut chunk[12..16], tick.ask_size);
        BigEndian::write_f32(&mut chunk[16..20], tick.bid_size);
    }
    bytes
}

/// Parses bars from decompressed bi5 candle data.
///
/// Bars violating `low <= open, close <= high` are logged and repaired
/// rather than rejected; the provider's history contains such records.
///
/// # Errors
///
/// Returns an error if the data length is not a positive multiple of 24.
pub fn parse_bars(data: &[u8], digits: u32) -> Result<Vec<RawBar>, ParseError> {
    check_length(data, RawBar::SIZE)?;
    let point = point_value(digits);
    let precision = digits as usize;

    Ok(data
        .chunks_exact(RawBar::SIZE)
        .map(|chunk| {
            let bar = RawBar::new(
                BigEndian::read_u32(&chunk[0..4]),
                BigEndian::read_u32(&chunk[4..8]),
                BigEndian::read_u32(&chunk[8..12]),
                BigEndian::read_u32(&chunk[12..16]),
                BigEndian::read_u32(&chunk[16..20]),
                BigEndian::read_f32(&chunk[20..24]),
            );
            if bar.is_consistent() {
                return bar;
            }
            let price = |points: u32| format!("{:.precision$}", f64::from(points) * point);
            warn!(
                time_delta = bar.time_delta,
                open = %price(bar.open),
                high = %price(bar.high),
                low = %price(bar.low),
                close = %price(bar.close),
                "inconsistent bar, widening high/low"
            );
            bar.repaired()
        })
        .collect())
}

/// Parses a symbol's `HistoryStart.bi5` file.
///
/// Each 16-byte record holds the timeframe period in milliseconds and the
/// first available time in milliseconds since the epoch, both `i64`.
///
/// # Errors
///
/// Returns an error if the data length is not a positive multiple of 16.
pub fn parse_history_start(data: &[u8]) -> Result<HistoryStarts, ParseError> {
    check_length(data, HistoryStart::SIZE)?;
    Ok(data
        .chunks_exact(HistoryStart::SIZE)
        .map(parse_history_record)
        .map(|record| (record.timeframe_id, record.start))
        .collect())
}

fn parse_history_record(chunk: &[u8]) -> HistoryStart {
    HistoryStart::from_raw(
        BigEndian::read_i64(&chunk[0..8]),
        BigEndian::read_i64(&chunk[8..16]),
    )
}

/// Parses the provider's combined `HistoryStart.bi5` covering all symbols.
///
/// The file repeats `{name_len: u16, name: utf-8, count: i64, count x 16-byte records}`.
///
/// # Errors
///
/// Returns an error if a section is truncated or a name is not valid UTF-8.
pub fn parse_history_start_all(data: &[u8]) -> Result<BTreeMap<String, HistoryStarts>, ParseError> {
    let mut symbols = BTreeMap::new();
    let mut offset = 0;

    while offset < data.len() {
        let section = offset;
        let name_len = usize::from(BigEndian::read_u16(take(data, &mut offset, 2)?));
        let name = std::str::from_utf8(take(data, &mut offset, name_len)?)
            .map_err(|_| ParseError::InvalidName(section))?
            .to_string();
        let count = BigEndian::read_i64(take(data, &mut offset, 8)?);
        let count = usize::try_from(count).map_err(|_| ParseError::Truncated(section))?;
        let len = count
            .checked_mul(HistoryStart::SIZE)
            .ok_or(ParseError::Truncated(section))?;

        let starts = take(data, &mut offset, len)?
            .chunks_exact(HistoryStart::SIZE)
            .map(parse_history_record)
            .map(|record| (record.timeframe_id, record.start))
            .collect();
        symbols.insert(name, starts);
    }
    Ok(symbols)
}

fn take<'a>(data: &'a [u8], offset: &mut usize, len: usize) -> Result<&'a [u8], ParseError> {
    let end = offset
        .checked_add(len)
        .filter(|end| *end <= data.len())
        .ok_or(ParseError::Truncated(*offset))?;
    let slice = &data[*offset..end];
    *offset = end;
    Ok(slice)
}
