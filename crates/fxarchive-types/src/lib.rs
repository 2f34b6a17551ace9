//! Core types for the fxarchive tick archive.
//!
//! This crate provides the fundamental data structures used throughout fxarchive:
//!
//! - [`Symbol`] - Read-only symbol handle with provider name and history start
//! - [`HourWindow`] - One hour carried as its GMT and FXT start
//! - [`RawTick`] / [`Tick`] - Wire tick record and its normalized form
//! - [`RawBar`] - Candle record of the provider's auxiliary files
//! - [`HistoryStart`] - Record of a provider history-start file
//! - [`ArchiveError`] - Errors that abort the processing of a symbol

#![doc(issue_tracker_base_url = "https://github.com/factordynamics/fxarchive/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod bar;
mod error;
mod hour;
mod symbol;
mod tick;
mod timeframe;

pub use bar::RawBar;
pub use error::{ArchiveError, Result};
pub use hour::{GmtHours, HourWindow, floor_hour, floor_hour_utc, is_hour_aligned};
pub use symbol::{InstrumentType, Symbol, point_value};
pub use tick::{RawTick, Tick};
pub use timeframe::{HistoryStart, Timeframe};
