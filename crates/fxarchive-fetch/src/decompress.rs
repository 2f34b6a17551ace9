//! LZMA decompression for bi5 files.

use fxarchive_store::persist::atomic_replace;
use fxarchive_types::ArchiveError;
use lzma_rs::lzma_decompress;
use std::io::{BufReader, Cursor};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during decompression.
#[derive(Error, Debug)]
pub enum DecompressError {
    /// LZMA decompression failed.
    #[error("LZMA decompression failed: {0}")]
    LzmaError(String),

    /// Empty input data.
    #[error("Empty input data")]
    EmptyInput,
}

impl From<DecompressError> for ArchiveError {
    fn from(e: DecompressError) -> Self {
        Self::Decompress(e.to_string())
    }
}

/// Decompresses LZMA-compressed bi5 data.
///
/// Dukascopy bi5 files are LZMA-compressed binary data containing tick records.
///
/// # Errors
///
/// Returns an error if decompression fails.
pub fn decompress_bi5(compressed: &[u8]) -> Result<Vec<u8>, DecompressError> {
    if compressed.is_empty() {
        return Err(DecompressError::EmptyInput);
    }

    let mut decompressed = Vec::new();
    let mut reader = BufReader::new(Cursor::new(compressed));

    lzma_decompress(&mut reader, &mut decompressed)
        .map_err(|e| DecompressError::LzmaError(e.to_string()))?;

    Ok(decompressed)
}

/// Decompresses bi5 data and stores the result atomically at `path`.
///
/// # Errors
///
/// Returns an error if decompression or the write fails.
pub fn decompress_bi5_to(compressed: &[u8], path: &Path) -> Result<Vec<u8>, ArchiveError> {
    let decompressed = decompress_bi5(compressed)?;
    atomic_replace(path, &decompressed)?;
    Ok(decompressed)
}
