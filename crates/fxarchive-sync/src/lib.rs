//! Synchronisation of a local FXT tick archive with the Dukascopy datafeed.
//!
//! [`HourReconciler`] brings one hour into its final state: a stored tick
//! file, a recorded absence or a skipped weekend hour. [`SymbolDriver`] walks
//! every hour of a symbol's history through the reconciler.
//!
//! ```no_run
//! use fxarchive_fetch::DownloadClient;
//! use fxarchive_sync::{CancellationToken, HourReconciler, SymbolDriver, SyncConfig};
//! # use fxarchive_types::{InstrumentType, Symbol};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let symbol = Symbol::new("EURUSD", "EURUSD", InstrumentType::Forex, 5, None);
//! let reconciler = HourReconciler::new(SyncConfig::default(), DownloadClient::with_defaults()?)?;
//! let mut driver = SymbolDriver::new(reconciler, CancellationToken::new());
//! let summary = driver.run(&symbol, chrono::Utc::now()).await?;
//! println!("{} hours stored", summary.persisted);
//! # Ok(())
//! # }
//! ```

#![doc(issue_tracker_base_url = "https://github.com/factordynamics/fxarchive/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod driver;
mod reconcile;

pub use config::{SyncConfig, default_data_root};
pub use driver::{SymbolDriver, SymbolSummary, SyncPlan, sync_end};
pub use reconcile::{HourOutcome, HourReconciler};
pub use tokio_util::sync::CancellationToken;
