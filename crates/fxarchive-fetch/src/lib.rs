//! HTTP transport, bi5 codec and fetcher for the fxarchive tick archive.
//!
//! This crate provides the download side of the pipeline:
//!
//! - [`DownloadClient`] - HTTP client with provider headers and retries
//! - [`Fetcher`] - Fetches one hour and records permanent or transient absence
//! - [`decompress::decompress_bi5`] - LZMA decompression
//! - [`parse::parse_ticks`] - Binary tick parsing with hour validation
//! - [`parse::parse_bars`] / [`parse::parse_history_start`] - Auxiliary formats

#![doc(issue_tracker_base_url = "https://github.com/factordynamics/fxarchive/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
pub mod decompress;
mod fetcher;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod parse;

pub use client::{
    BROWSER_USER_AGENT, ClientConfig, DownloadClient, DownloadError, HttpResponse, REFERER_URL,
    Transport,
};
pub use decompress::{DecompressError, decompress_bi5, decompress_bi5_to};
pub use fetcher::{FetchOptions, FetchOutcome, Fetcher};
pub use parse::{
    HistoryStarts, ParseError, encode_ticks, parse_bars, parse_history_start,
    parse_history_start_all, parse_raw_ticks, parse_ticks,
};
