//! Local tick file format.
//!
//! A local tick file is a concatenation of 12-byte little-endian records:
//! - `u32`: milliseconds offset from the hour start
//! - `u32`: bid price in points
//! - `u32`: ask price in points
//!
//! The compressed variant is the same payload as an LZMA stream.

use std::io::{BufReader, Cursor};

use byteorder::{ByteOrder, LittleEndian};
use fxarchive_types::{ArchiveError, HourWindow, Result, Tick};

/// Encodes ticks into the local record format.
#[must_use]
pub fn encode_local_ticks(ticks: &[Tick]) -> Vec<u8> {
    let mut bytes = vec![0u8; ticks.len() * Tick::LOCAL_SIZE];
    for (chunk, tick) in bytes.chunks_exact_mut(Tick::LOCAL_SIZE).zip(ticks) {
        LittleEndian::write_u32(&mut chunk[0..4], tick.time_delta);
        LittleEndian::write_u32(&mut chunk[4..8], tick.bid);
        LittleEndian::write_u32(&mut chunk[8..12], tick.ask);
    }
    bytes
}

/// Decodes local records into ticks of the given hour.
///
/// # Errors
///
/// Returns [`ArchiveError::Decode`] if the length is not a multiple of the
/// record size.
pub fn decode_local_ticks(bytes: &[u8], window: &HourWindow) -> Result<Vec<Tick>> {
    if !bytes.len().is_multiple_of(Tick::LOCAL_SIZE) {
        return Err(ArchiveError::decode(format!(
            "local tick data of {} bytes is not a multiple of {}",
            bytes.len(),
            Tick::LOCAL_SIZE
        )));
    }
    Ok(bytes
        .chunks_exact(Tick::LOCAL_SIZE)
        .map(|chunk| {
            Tick::new(
                window,
                LittleEndian::read_u32(&chunk[0..4]),
                LittleEndian::read_u32(&chunk[4..8]),
                LittleEndian::read_u32(&chunk[8..12]),
            )
        })
        .collect())
}

/// Compresses a local payload.
///
/// # Errors
///
/// Returns [`ArchiveError::Io`] if the encoder fails.
pub fn compress_local(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut compressed = Vec::new();
    lzma_rs::lzma_compress(&mut BufReader::new(Cursor::new(bytes)), &mut compressed)?;
    Ok(compressed)
}

/// Decompresses a compressed local payload.
///
/// # Errors
///
/// Returns [`ArchiveError::Decompress`] if the data is not a valid LZMA stream.
pub fn decompress_local(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut decompressed = Vec::new();
    lzma_rs::lzma_decompress(&mut BufReader::new(Cursor::new(bytes)), &mut decompressed)
        .map_err(|e| ArchiveError::Decompress(e.to_string()))?;
    Ok(decompressed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn window() -> HourWindow {
        let gmt = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        let fxt = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(14, 0, 0)
            .unwrap();
        HourWindow::new(gmt, fxt).unwrap()
    }

    #[test]
    fn test_local_layout() {
        let ticks = [Tick::new(&window(), 1_500, 110_000, 110_012)];
        let bytes = encode_local_ticks(&ticks);

        assert_eq!(bytes.len(), 12);
        assert_eq!(&bytes[0..4], &1_500u32.to_le_bytes());
        assert_eq!(&bytes[4..8], &110_000u32.to_le_bytes());
        assert_eq!(&bytes[8..12], &110_012u32.to_le_bytes());
        assert_eq!(decode_local_ticks(&bytes, &window()).unwrap(), ticks);
    }

    #[test]
    fn test_decode_rejects_partial_record() {
        let result = decode_local_ticks(&[0u8; 13], &window());
        assert!(matches!(result, Err(ArchiveError::Decode(_))));
    }

    #[test]
    fn test_compressed_payload() {
        let ticks: Vec<_> = (0..100)
            .map(|i| Tick::new(&window(), i * 1_000, 110_000 + i, 110_010 + i))
            .collect();
        let plain = encode_local_ticks(&ticks);
        let packed = compress_local(&plain).unwrap();

        assert_eq!(decompress_local(&packed).unwrap(), plain);
    }
}
