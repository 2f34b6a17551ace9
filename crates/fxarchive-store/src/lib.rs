//! Artifact storage for the fxarchive tick archive.
//!
//! - [`PathResolver`] - Derives every path and URL of a `(symbol, hour)` pair
//! - [`BoundedCache`] - Size-bounded memo used by the resolver
//! - [`persist`] - Atomic writes, marker files and cleanup
//! - [`local`] - The local 12-byte tick record format
//! - [`url`] - Provider URL contract

#![doc(issue_tracker_base_url = "https://github.com/factordynamics/fxarchive/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod cache;
pub mod local;
mod paths;
pub mod persist;
pub mod url;

pub use cache::BoundedCache;
pub use paths::{Compression, DEFAULT_PATH_CACHE_CAPACITY, PathKind, PathResolver};
