//! Artifact path and URL resolution.
//!
//! Every file and URL the pipeline touches for a `(symbol, hour)` pair is
//! derived here. Local artifacts live under the FXT date of the hour, provider
//! caches under its GMT date:
//!
//! ```text
//! {root}/history/{type}/{SYMBOL}/{yyyy}/{mm}/{dd}/{HH}h_ticks.{bin|rar|404|na}   (FXT)
//! {root}/history/dukascopy/{SYMBOL}/{yyyy}/{mm}/{dd}/{HH}h_ticks.{bi5|bin}       (GMT)
//! ```
//!
//! Months are 1-based locally; the remote URL uses 0-based months.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, NaiveDateTime, Timelike, Utc};
use fxarchive_types::{ArchiveError, InstrumentType, Result, Symbol, is_hour_aligned};

use crate::BoundedCache;
use crate::url::{history_start_url, tick_url};

/// Directory name of the provider cache tree.
const PROVIDER_DIR: &str = "dukascopy";

/// Default number of memoized resolutions.
pub const DEFAULT_PATH_CACHE_CAPACITY: usize = 128;

/// Whether an artifact holds compressed or plain data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Compression {
    /// Plain records.
    Uncompressed,
    /// LZMA-compressed records.
    Compressed,
}

/// Everything the resolver can derive, each kind carrying the hour it needs.
///
/// Local kinds take the FXT hour, provider kinds the GMT hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathKind {
    /// Local directory of an FXT date.
    LocalDir(NaiveDateTime),
    /// Normalized local tick file (`.bin` / `.rar`).
    LocalTicks(NaiveDateTime, Compression),
    /// Marker of a permanently missing hour (`.404`).
    NotFoundMarker(NaiveDateTime),
    /// Marker of an empty provider response (`.na`).
    EmptyMarker(NaiveDateTime),
    /// Provider cache directory of a GMT date.
    ProviderDir(DateTime<Utc>),
    /// Provider cache file (`.bi5` compressed, `.bin` decompressed).
    ProviderTicks(DateTime<Utc>, Compression),
    /// Remote URL of an hour's tick file.
    TickUrl(DateTime<Utc>),
    /// Remote URL of the symbol's history-start metadata.
    HistoryStartUrl,
}

/// Resolves artifact paths and URLs, memoizing the results.
///
/// The memo is owned by the resolver instance; independent pipelines use
/// independent resolvers.
#[derive(Debug)]
pub struct PathResolver {
    data_root: String,
    base_url: String,
    cache: BoundedCache<MemoKey, String>,
}

/// Every symbol field a resolution depends on, plus the kind.
type MemoKey = (String, String, InstrumentType, PathKind);

impl PathResolver {
    /// Creates a resolver for the given data root and provider base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::Argument`] if the data root is not valid UTF-8.
    pub fn new(data_root: &Path, base_url: impl Into<String>, capacity: usize) -> Result<Self> {
        let data_root = data_root
            .to_str()
            .ok_or_else(|| {
                ArchiveError::argument(format!(
                    "data root '{}' is not valid UTF-8",
                    data_root.display()
                ))
            })?
            .trim_end_matches(['/', '\\'])
            .to_string();
        let base_url: String = base_url.into();
        Ok(Self {
            data_root,
            base_url: base_url.trim_end_matches('/').to_string(),
            cache: BoundedCache::new(capacity),
        })
    }

    /// Returns the data root.
    #[must_use]
    pub fn data_root(&self) -> &Path {
        Path::new(&self.data_root)
    }

    /// Returns the provider base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the number of memoized resolutions.
    #[must_use]
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    /// Resolves a path or URL for a symbol.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::Argument`] if the symbol has no name or the
    /// hour carried by `kind` is not hour-aligned.
    pub fn resolve(&mut self, symbol: &Symbol, kind: PathKind) -> Result<String> {
        let key = (
            symbol.name().to_string(),
            symbol.provider_name().to_string(),
            symbol.instrument_type(),
            kind,
        );
        if let Some(resolved) = self.cache.get(&key) {
            return Ok(resolved.clone());
        }
        let resolved = self.compute(symbol, kind)?;
        self.cache.insert(key, resolved.clone());
        Ok(resolved)
    }

    /// Resolves a filesystem path for a symbol.
    ///
    /// # Errors
    ///
    /// See [`PathResolver::resolve`].
    pub fn path(&mut self, symbol: &Symbol, kind: PathKind) -> Result<PathBuf> {
        self.resolve(symbol, kind).map(PathBuf::from)
    }

    fn compute(&self, symbol: &Symbol, kind: PathKind) -> Result<String> {
        if symbol.name().is_empty() || symbol.provider_name().is_empty() {
            return Err(ArchiveError::argument("symbol name must not be empty"));
        }

        let resolved = match kind {
            PathKind::LocalDir(fxt) => self.local_dir(symbol, checked_fxt(fxt)?),
            PathKind::LocalTicks(fxt, compression) => {
                let ext = match compression {
                    Compression::Uncompressed => "bin",
                    Compression::Compressed => "rar",
                };
                self.local_file(symbol, checked_fxt(fxt)?, ext)
            }
            PathKind::NotFoundMarker(fxt) => self.local_file(symbol, checked_fxt(fxt)?, "404"),
            PathKind::EmptyMarker(fxt) => self.local_file(symbol, checked_fxt(fxt)?, "na"),
            PathKind::ProviderDir(gmt) => self.provider_dir(symbol, checked_gmt(gmt)?),
            PathKind::ProviderTicks(gmt, compression) => {
                let gmt = checked_gmt(gmt)?;
                let ext = match compression {
                    Compression::Uncompressed => "bin",
                    Compression::Compressed => "bi5",
                };
                format!(
                    "{}/{:02}h_ticks.{ext}",
                    self.provider_dir(symbol, gmt),
                    gmt.hour()
                )
            }
            PathKind::TickUrl(gmt) => {
                tick_url(&self.base_url, symbol.provider_name(), checked_gmt(gmt)?)
            }
            PathKind::HistoryStartUrl => history_start_url(&self.base_url, symbol.provider_name()),
        };
        Ok(resolved)
    }

    fn local_dir(&self, symbol: &Symbol, fxt: NaiveDateTime) -> String {
        format!(
            "{}/history/{}/{}/{}/{:02}/{:02}",
            self.data_root,
            symbol.instrument_type(),
            symbol.name(),
            fxt.year(),
            fxt.month(),
            fxt.day()
        )
    }

    fn local_file(&self, symbol: &Symbol, fxt: NaiveDateTime, ext: &str) -> String {
        format!(
            "{}/{:02}h_ticks.{ext}",
            self.local_dir(symbol, fxt),
            fxt.hour()
        )
    }

    fn provider_dir(&self, symbol: &Symbol, gmt: DateTime<Utc>) -> String {
        format!(
            "{}/history/{PROVIDER_DIR}/{}/{}/{:02}/{:02}",
            self.data_root,
            symbol.provider_name().to_uppercase(),
            gmt.year(),
            gmt.month(),
            gmt.day()
        )
    }
}

fn checked_fxt(fxt: NaiveDateTime) -> Result<NaiveDateTime> {
    if is_hour_aligned(&fxt) {
        Ok(fxt)
    } else {
        Err(ArchiveError::argument(format!(
            "FXT time {fxt} is not hour-aligned"
        )))
    }
}

fn checked_gmt(gmt: DateTime<Utc>) -> Result<DateTime<Utc>> {
    if is_hour_aligned(&gmt.naive_utc()) {
        Ok(gmt)
    } else {
        Err(ArchiveError::argument(format!(
            "GMT time {gmt} is not hour-aligned"
        )))
    }
}
