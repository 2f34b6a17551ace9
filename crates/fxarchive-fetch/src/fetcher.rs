//! Per-hour fetching with recorded absences.

use std::collections::BTreeMap;

use bytes::Bytes;
use fxarchive_store::persist::{atomic_replace, remove_file_if_exists, touch_marker};
use fxarchive_store::url::all_history_start_url;
use fxarchive_store::{Compression, PathKind, PathResolver};
use fxarchive_types::{ArchiveError, HourWindow, Result, Symbol};
use tracing::{debug, info, warn};

use crate::parse::{HistoryStarts, parse_history_start, parse_history_start_all};
use crate::{HttpResponse, Transport};

/// What the fetcher stores besides returning the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    /// Store the compressed response at the provider cache path.
    pub persist_raw: bool,
    /// Record 404 and empty responses as marker files.
    pub persist_errors: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            persist_raw: false,
            persist_errors: true,
        }
    }
}

/// Result of fetching one hour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Status 200 with a non-empty, still compressed body.
    Ok(Bytes),
    /// Status 404: the provider has no data for this hour, now or later.
    NotFound,
    /// Status 200 with an empty body: the hour may be available on a later run.
    EmptyTransient,
}

/// Fetches hour files through a [`Transport`].
#[derive(Debug, Clone)]
pub struct Fetcher<T> {
    transport: T,
}

impl<T: Transport> Fetcher<T> {
    /// Creates a fetcher on top of a transport.
    #[must_use]
    pub const fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Returns the underlying transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetches the tick file of one hour.
    ///
    /// On success previously recorded markers of the hour are deleted before
    /// the data is returned.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::Transport`] for any status other than 200 or
    /// 404, [`ArchiveError::Http`] if the request itself fails, and
    /// [`ArchiveError::Io`] if an artifact cannot be written.
    pub async fn fetch(
        &self,
        paths: &mut PathResolver,
        symbol: &Symbol,
        window: &HourWindow,
        options: FetchOptions,
    ) -> Result<FetchOutcome> {
        let url = paths.resolve(symbol, PathKind::TickUrl(window.gmt()))?;
        debug!(symbol = %symbol, hour = %window, %url, "fetching");
        let response = self.get(&url).await?;

        match response.status {
            200 if !response.body.is_empty() => {
                for kind in [
                    PathKind::NotFoundMarker(window.fxt()),
                    PathKind::EmptyMarker(window.fxt()),
                ] {
                    remove_file_if_exists(&paths.path(symbol, kind)?)?;
                }
                if options.persist_raw {
                    let cache = paths.path(
                        symbol,
                        PathKind::ProviderTicks(window.gmt(), Compression::Compressed),
                    )?;
                    atomic_replace(&cache, &response.body)?;
                }
                Ok(FetchOutcome::Ok(response.body))
            }
            200 => {
                warn!(symbol = %symbol, hour = %window, "empty response");
                if options.persist_errors {
                    touch_marker(&paths.path(symbol, PathKind::EmptyMarker(window.fxt()))?)?;
                }
                Ok(FetchOutcome::EmptyTransient)
            }
            404 => {
                info!(symbol = %symbol, hour = %window, "no data (404)");
                remove_file_if_exists(&paths.path(symbol, PathKind::EmptyMarker(window.fxt()))?)?;
                if options.persist_errors {
                    touch_marker(&paths.path(symbol, PathKind::NotFoundMarker(window.fxt()))?)?;
                }
                Ok(FetchOutcome::NotFound)
            }
            status => Err(ArchiveError::Transport { url, status }),
        }
    }

    /// Fetches and parses the history-start metadata of one symbol.
    ///
    /// Returns `None` if the provider has no such file.
    ///
    /// # Errors
    ///
    /// Returns an error on unexpected statuses or malformed data.
    pub async fn fetch_history_start(
        &self,
        paths: &mut PathResolver,
        symbol: &Symbol,
    ) -> Result<Option<HistoryStarts>> {
        let url = paths.resolve(symbol, PathKind::HistoryStartUrl)?;
        let response = self.get(&url).await?;
        match response.status {
            200 if !response.body.is_empty() => Ok(Some(parse_history_start(&response.body)?)),
            200 | 404 => Ok(None),
            status => Err(ArchiveError::Transport { url, status }),
        }
    }

    /// Fetches and parses the combined history-start metadata of all symbols.
    ///
    /// # Errors
    ///
    /// Returns an error on any status other than 200 or on malformed data.
    pub async fn fetch_all_history_starts(
        &self,
        paths: &PathResolver,
    ) -> Result<BTreeMap<String, HistoryStarts>> {
        let url = all_history_start_url(paths.base_url());
        let response = self.get(&url).await?;
        match response.status {
            200 => Ok(parse_history_start_all(&response.body)?),
            status => Err(ArchiveError::Transport { url, status }),
        }
    }

    async fn get(&self, url: &str) -> Result<HttpResponse> {
        self.transport
            .get(url)
            .await
            .map_err(|e| ArchiveError::Http(e.to_string()))
    }
}
