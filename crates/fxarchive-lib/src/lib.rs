//! Local FXT tick archive of the Dukascopy datafeed.
//!
//! This is a facade crate that re-exports functionality from the fxarchive
//! workspace crates for convenient access.
//!
//! # Quick Start
//!
//! ```ignore
//! use fxarchive_lib::prelude::*;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let symbol = SymbolCatalog::global().get("eurusd").unwrap();
//!     let client = DownloadClient::with_defaults()?;
//!     let reconciler = HourReconciler::new(SyncConfig::default(), client)?;
//!     let mut driver = SymbolDriver::new(reconciler, CancellationToken::new());
//!
//!     let summary = driver.run(symbol, chrono::Utc::now()).await?;
//!     println!("{} hours stored, {} ticks", summary.persisted, summary.ticks);
//!
//!     Ok(())
//! }
//! ```

#![doc(issue_tracker_base_url = "https://github.com/factordynamics/fxarchive/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use fxarchive_types::*;

// Re-export the FXT calendar
pub use fxarchive_calendar::{
    FxtClock, FxtOffset, Transition, first_trading_hour, fxt_to_gmt, gmt_to_fxt, is_non_trading,
    offset_at, transitions_in_year,
};

// Re-export storage
pub use fxarchive_store::{Compression, PathKind, PathResolver, local, persist, url};

// Re-export the symbol catalog
pub use fxarchive_instruments::SymbolCatalog;

// Re-export fetch functionality
#[cfg(feature = "fetch")]
pub use fxarchive_fetch::{
    ClientConfig, DecompressError, DownloadClient, DownloadError, FetchOptions, FetchOutcome,
    Fetcher, HistoryStarts, HttpResponse, ParseError, Transport,
};

// Re-export synchronisation
#[cfg(feature = "sync")]
pub use fxarchive_sync::{
    CancellationToken, HourOutcome, HourReconciler, SymbolDriver, SymbolSummary, SyncConfig,
    SyncPlan,
};

/// Prelude module for convenient imports.
///
/// ```
/// use fxarchive_lib::prelude::*;
/// ```
pub mod prelude {
    pub use fxarchive_types::{
        ArchiveError, HourWindow, InstrumentType, Result, Symbol, Tick, Timeframe,
    };

    pub use fxarchive_calendar::{FxtClock, fxt_to_gmt, gmt_to_fxt};

    pub use fxarchive_instruments::SymbolCatalog;

    #[cfg(feature = "fetch")]
    pub use fxarchive_fetch::{ClientConfig, DownloadClient, Fetcher, Transport};

    #[cfg(feature = "sync")]
    pub use fxarchive_sync::{
        CancellationToken, HourOutcome, HourReconciler, SymbolDriver, SymbolSummary, SyncConfig,
    };
}
