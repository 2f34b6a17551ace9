//! Per-hour reconciliation of the local archive with the provider.
//!
//! An hour moves through `unchecked → satisfied | needs fetch → fetched →
//! decoded → validated → persisted`. Cleanup of provider caches runs after
//! every hour, whatever the outcome.

use std::fs;

use fxarchive_calendar::is_non_trading;
use fxarchive_fetch::decompress::decompress_bi5;
use fxarchive_fetch::parse::{HistoryStarts, parse_ticks};
use fxarchive_fetch::{FetchOutcome, Fetcher, Transport, decompress_bi5_to};
use fxarchive_store::local::{compress_local, encode_local_ticks};
use fxarchive_store::persist::{atomic_write, remove_dir_if_empty, remove_file_if_exists};
use fxarchive_store::{Compression, PathKind, PathResolver};
use fxarchive_types::{HourWindow, Result, Symbol, Tick};
use tracing::{debug, trace};

use crate::SyncConfig;

/// Result of reconciling one hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HourOutcome {
    /// The normalized artifact already existed.
    Satisfied,
    /// Ticks were decoded and written.
    Persisted {
        /// Number of ticks written.
        ticks: usize,
    },
    /// Weekend hour, never fetched.
    NonTrading,
    /// The provider has no data for this hour.
    AbsentPermanent,
    /// The provider answered with an empty body; retried on the next run.
    AbsentTransient,
}

enum Payload {
    Ticks(Vec<u8>),
    NotFound,
    Empty,
}

/// Drives single hours of one archive through the pipeline.
#[derive(Debug)]
pub struct HourReconciler<T> {
    config: SyncConfig,
    paths: PathResolver,
    fetcher: Fetcher<T>,
}

impl<T: Transport> HourReconciler<T> {
    /// Creates a reconciler over the archive described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`fxarchive_types::ArchiveError::Argument`] if the configuration is invalid or
    /// the data root is not valid UTF-8.
    pub fn new(config: SyncConfig, transport: T) -> Result<Self> {
        config.validate()?;
        let paths = PathResolver::new(
            &config.data_root,
            config.base_url.clone(),
            config.path_cache_capacity,
        )?;
        Ok(Self {
            config,
            paths,
            fetcher: Fetcher::new(transport),
        })
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Returns the fetcher.
    #[must_use]
    pub const fn fetcher(&self) -> &Fetcher<T> {
        &self.fetcher
    }

    /// Fetches the history-start metadata of `symbol`.
    ///
    /// # Errors
    ///
    /// See [`Fetcher::fetch_history_start`].
    pub async fn history_start(&mut self, symbol: &Symbol) -> Result<Option<HistoryStarts>> {
        self.fetcher
            .fetch_history_start(&mut self.paths, symbol)
            .await
    }

    /// Brings one hour of `symbol` into its final state.
    ///
    /// # Errors
    ///
    /// Returns an error on unexpected HTTP statuses, malformed payloads,
    /// ticks outside the hour and filesystem failures. Absences are outcomes,
    /// not errors.
    pub async fn reconcile(&mut self, symbol: &Symbol, window: &HourWindow) -> Result<HourOutcome> {
        let non_trading = is_non_trading(window.fxt());
        let outcome = if non_trading {
            trace!(symbol = %symbol, hour = %window, "non-trading hour");
            HourOutcome::NonTrading
        } else {
            self.process(symbol, window).await?
        };
        self.cleanup(symbol, window, non_trading)?;
        Ok(outcome)
    }

    async fn process(&mut self, symbol: &Symbol, window: &HourWindow) -> Result<HourOutcome> {
        if self.is_satisfied(symbol, window)? {
            trace!(symbol = %symbol, hour = %window, "already stored");
            return Ok(HourOutcome::Satisfied);
        }
        if self.exists(symbol, PathKind::NotFoundMarker(window.fxt()))? {
            debug!(symbol = %symbol, hour = %window, "recorded as missing");
            return Ok(HourOutcome::AbsentPermanent);
        }

        let data = match self.load(symbol, window).await? {
            Payload::Ticks(data) => data,
            Payload::NotFound => return Ok(HourOutcome::AbsentPermanent),
            Payload::Empty => {
                debug!(symbol = %symbol, hour = %window, "left for the next run");
                return Ok(HourOutcome::AbsentTransient);
            }
        };

        let ticks = parse_ticks(&data, window)?;
        self.persist(symbol, window, &ticks)?;
        debug!(symbol = %symbol, hour = %window, ticks = ticks.len(), "stored");
        Ok(HourOutcome::Persisted { ticks: ticks.len() })
    }

    fn is_satisfied(&mut self, symbol: &Symbol, window: &HourWindow) -> Result<bool> {
        if self.exists(
            symbol,
            PathKind::LocalTicks(window.fxt(), Compression::Compressed),
        )? {
            return Ok(true);
        }
        Ok(self.config.store_uncompressed
            && self.exists(
                symbol,
                PathKind::LocalTicks(window.fxt(), Compression::Uncompressed),
            )?)
    }

    /// Loads the decompressed provider payload from the first source that has it.
    async fn load(&mut self, symbol: &Symbol, window: &HourWindow) -> Result<Payload> {
        let decompressed = self.paths.path(
            symbol,
            PathKind::ProviderTicks(window.gmt(), Compression::Uncompressed),
        )?;
        if decompressed.exists() {
            debug!(symbol = %symbol, path = %decompressed.display(), "using decompressed cache");
            return Ok(Payload::Ticks(fs::read(&decompressed)?));
        }

        let compressed = self.paths.path(
            symbol,
            PathKind::ProviderTicks(window.gmt(), Compression::Compressed),
        )?;
        if compressed.exists() {
            debug!(symbol = %symbol, path = %compressed.display(), "using compressed cache");
            let bytes = fs::read(&compressed)?;
            return self.decompress(symbol, window, &bytes).map(Payload::Ticks);
        }

        let options = self.config.fetch_options();
        let fetched = self
            .fetcher
            .fetch(&mut self.paths, symbol, window, options)
            .await?;
        match fetched {
            FetchOutcome::Ok(bytes) => self.decompress(symbol, window, &bytes).map(Payload::Ticks),
            FetchOutcome::NotFound => Ok(Payload::NotFound),
            FetchOutcome::EmptyTransient => Ok(Payload::Empty),
        }
    }

    fn decompress(&mut self, symbol: &Symbol, window: &HourWindow, bytes: &[u8]) -> Result<Vec<u8>> {
        if self.config.keep_decompressed_cache {
            let path = self.paths.path(
                symbol,
                PathKind::ProviderTicks(window.gmt(), Compression::Uncompressed),
            )?;
            decompress_bi5_to(bytes, &path)
        } else {
            Ok(decompress_bi5(bytes)?)
        }
    }

    fn persist(&mut self, symbol: &Symbol, window: &HourWindow, ticks: &[Tick]) -> Result<()> {
        let payload = encode_local_ticks(ticks);

        if self.config.store_uncompressed {
            let path = self.paths.path(
                symbol,
                PathKind::LocalTicks(window.fxt(), Compression::Uncompressed),
            )?;
            atomic_write(&path, &payload)?;
        }

        if self.config.store_compressed {
            let path = self.paths.path(
                symbol,
                PathKind::LocalTicks(window.fxt(), Compression::Compressed),
            )?;
            atomic_write(&path, &compress_local(&payload)?)?;
        }
        Ok(())
    }

    fn cleanup(&mut self, symbol: &Symbol, window: &HourWindow, non_trading: bool) -> Result<()> {
        if !self.config.keep_compressed_cache {
            remove_file_if_exists(&self.paths.path(
                symbol,
                PathKind::ProviderTicks(window.gmt(), Compression::Compressed),
            )?)?;
        }
        if !self.config.keep_decompressed_cache {
            remove_file_if_exists(&self.paths.path(
                symbol,
                PathKind::ProviderTicks(window.gmt(), Compression::Uncompressed),
            )?)?;
        }
        remove_dir_if_empty(&self.paths.path(symbol, PathKind::ProviderDir(window.gmt()))?)?;
        if non_trading {
            remove_dir_if_empty(&self.paths.path(symbol, PathKind::LocalDir(window.fxt()))?)?;
        }
        Ok(())
    }

    fn exists(&mut self, symbol: &Symbol, kind: PathKind) -> Result<bool> {
        Ok(self.paths.path(symbol, kind)?.exists())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use fxarchive_fetch::mock::MockTransport;
    use fxarchive_fetch::{FetchOptions, HttpResponse};
    use fxarchive_store::url::BASE_URL;
    use fxarchive_fetch::parse::encode_ticks;
    use fxarchive_store::local::{decode_local_ticks, decompress_local};
    use fxarchive_types::{ArchiveError, InstrumentType, RawTick};
    use std::sync::Arc;
    use tempfile::TempDir;

    const URL: &str = "https://datafeed.dukascopy.com/datafeed/EURUSD/2013/00/07/10h_ticks.bi5";

    fn eurusd() -> Symbol {
        Symbol::new("EURUSD", "EURUSD", InstrumentType::Forex, 5, None)
    }

    fn window() -> HourWindow {
        let gmt = Utc.with_ymd_and_hms(2013, 1, 7, 10, 0, 0).unwrap();
        let fxt = NaiveDate::from_ymd_opt(2013, 1, 7)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        HourWindow::new(gmt, fxt).unwrap()
    }

    fn raw_ticks() -> Vec<RawTick> {
        vec![
            RawTick::new(0, 130_512, 130_510, 1.5, 2.25),
            RawTick::new(1_250, 130_515, 130_511, 1.0, 1.0),
            RawTick::new(3_599_000, 130_520, 130_518, 0.75, 3.0),
        ]
    }

    fn body() -> Vec<u8> {
        compress_local(&encode_ticks(&raw_ticks())).unwrap()
    }

    fn reconciler(
        dir: &TempDir,
        transport: &Arc<MockTransport>,
    ) -> HourReconciler<Arc<MockTransport>> {
        HourReconciler::new(SyncConfig::with_data_root(dir.path()), Arc::clone(transport)).unwrap()
    }

    #[tokio::test]
    async fn test_fetches_and_persists() {
        let dir = TempDir::new().unwrap();
        let transport = Arc::new(MockTransport::new());
        transport.respond(URL, HttpResponse::new(200, body()));
        let mut reconciler = reconciler(&dir, &transport);

        let outcome = reconciler.reconcile(&eurusd(), &window()).await.unwrap();
        assert_eq!(outcome, HourOutcome::Persisted { ticks: 3 });

        let stored = dir
            .path()
            .join("history/forex/EURUSD/2013/01/07/12h_ticks.rar");
        let payload = decompress_local(&fs::read(stored).unwrap()).unwrap();
        let ticks = decode_local_ticks(&payload, &window()).unwrap();
        assert_eq!(ticks.len(), 3);
        assert_eq!(ticks[1].time_delta, 1_250);
        assert_eq!(ticks[1].bid, 130_511);
        assert_eq!(ticks[1].ask, 130_515);
        assert!(
            !dir.path()
                .join("history/forex/EURUSD/2013/01/07/12h_ticks.bin")
                .exists()
        );
        // provider cache directory is gone
        assert!(!dir.path().join("history/dukascopy/EURUSD").join("2013/01/07").exists());
    }

    #[tokio::test]
    async fn test_second_run_is_satisfied_without_requests() {
        let dir = TempDir::new().unwrap();
        let transport = Arc::new(MockTransport::new());
        transport.respond(URL, HttpResponse::new(200, body()));

        let mut first = reconciler(&dir, &transport);
        first.reconcile(&eurusd(), &window()).await.unwrap();
        assert_eq!(transport.request_count(), 1);

        let mut second = reconciler(&dir, &transport);
        let outcome = second.reconcile(&eurusd(), &window()).await.unwrap();
        assert_eq!(outcome, HourOutcome::Satisfied);
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_not_found_is_remembered() {
        let dir = TempDir::new().unwrap();
        let transport = Arc::new(MockTransport::new());

        let mut first = reconciler(&dir, &transport);
        let outcome = first.reconcile(&eurusd(), &window()).await.unwrap();
        assert_eq!(outcome, HourOutcome::AbsentPermanent);
        assert!(
            dir.path()
                .join("history/forex/EURUSD/2013/01/07/12h_ticks.404")
                .exists()
        );

        let mut second = reconciler(&dir, &transport);
        let outcome = second.reconcile(&eurusd(), &window()).await.unwrap();
        assert_eq!(outcome, HourOutcome::AbsentPermanent);
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_absence_recorded_by_fetcher_skips_network() {
        let dir = TempDir::new().unwrap();
        let transport = Arc::new(MockTransport::new());
        let mut reconciler = reconciler(&dir, &transport);
        let mut paths = PathResolver::new(dir.path(), BASE_URL, 16).unwrap();

        let outcome = reconciler
            .fetcher()
            .fetch(&mut paths, &eurusd(), &window(), FetchOptions::default())
            .await
            .unwrap();
        assert_eq!(outcome, FetchOutcome::NotFound);
        assert_eq!(transport.requests(), vec![URL]);
        assert!(
            dir.path()
                .join("history/forex/EURUSD/2013/01/07/12h_ticks.404")
                .exists()
        );

        let outcome = reconciler.reconcile(&eurusd(), &window()).await.unwrap();
        assert_eq!(outcome, HourOutcome::AbsentPermanent);
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_sunday_hour_is_non_trading_despite_marker() {
        let dir = TempDir::new().unwrap();
        let transport = Arc::new(MockTransport::new());
        let mut reconciler = reconciler(&dir, &transport);

        // Sunday 2013-01-06 00:00 GMT is 02:00 FXT
        let gmt = Utc.with_ymd_and_hms(2013, 1, 6, 0, 0, 0).unwrap();
        let fxt = NaiveDate::from_ymd_opt(2013, 1, 6)
            .unwrap()
            .and_hms_opt(2, 0, 0)
            .unwrap();
        let sunday = HourWindow::new(gmt, fxt).unwrap();
        let marker = dir
            .path()
            .join("history/forex/EURUSD/2013/01/06/02h_ticks.404");
        fs::create_dir_all(marker.parent().unwrap()).unwrap();
        fs::write(&marker, b"").unwrap();

        let outcome = reconciler.reconcile(&eurusd(), &sunday).await.unwrap();
        assert_eq!(outcome, HourOutcome::NonTrading);
        assert_eq!(transport.request_count(), 0);
        assert!(marker.exists());
    }

    #[tokio::test]
    async fn test_empty_response_is_retried() {
        let dir = TempDir::new().unwrap();
        let transport = Arc::new(MockTransport::new());
        transport.respond(URL, HttpResponse::new(200, Vec::new()));

        let mut first = reconciler(&dir, &transport);
        let outcome = first.reconcile(&eurusd(), &window()).await.unwrap();
        assert_eq!(outcome, HourOutcome::AbsentTransient);

        transport.respond(URL, HttpResponse::new(200, body()));
        let mut second = reconciler(&dir, &transport);
        let outcome = second.reconcile(&eurusd(), &window()).await.unwrap();
        assert_eq!(outcome, HourOutcome::Persisted { ticks: 3 });
        assert!(
            !dir.path()
                .join("history/forex/EURUSD/2013/01/07/12h_ticks.na")
                .exists()
        );
        assert_eq!(transport.request_count(), 2);
    }

    #[tokio::test]
    async fn test_weekend_hour_is_never_fetched() {
        let dir = TempDir::new().unwrap();
        let transport = Arc::new(MockTransport::new());
        let mut reconciler = reconciler(&dir, &transport);

        // Saturday 2013-01-05 00:00 GMT is 02:00 FXT
        let gmt = Utc.with_ymd_and_hms(2013, 1, 5, 0, 0, 0).unwrap();
        let fxt = NaiveDate::from_ymd_opt(2013, 1, 5)
            .unwrap()
            .and_hms_opt(2, 0, 0)
            .unwrap();
        let saturday = HourWindow::new(gmt, fxt).unwrap();
        fs::create_dir_all(dir.path().join("history/forex/EURUSD/2013/01/05")).unwrap();

        let outcome = reconciler.reconcile(&eurusd(), &saturday).await.unwrap();
        assert_eq!(outcome, HourOutcome::NonTrading);
        assert_eq!(transport.request_count(), 0);
        assert!(!dir.path().join("history/forex/EURUSD/2013/01/05").exists());
    }

    #[tokio::test]
    async fn test_truncated_payload_is_fatal() {
        let dir = TempDir::new().unwrap();
        let transport = Arc::new(MockTransport::new());
        transport.respond(URL, HttpResponse::new(200, compress_local(&[0u8; 19]).unwrap()));
        let mut reconciler = reconciler(&dir, &transport);

        let result = reconciler.reconcile(&eurusd(), &window()).await;
        assert!(matches!(result, Err(ArchiveError::Decode(_))));
        assert!(
            !dir.path()
                .join("history/forex/EURUSD/2013/01/07/12h_ticks.rar")
                .exists()
        );
    }

    #[tokio::test]
    async fn test_tick_outside_hour_is_fatal() {
        let dir = TempDir::new().unwrap();
        let transport = Arc::new(MockTransport::new());
        let late = [RawTick::new(3_600_500, 1, 1, 1.0, 1.0)];
        transport.respond(
            URL,
            HttpResponse::new(200, compress_local(&encode_ticks(&late)).unwrap()),
        );
        let mut reconciler = reconciler(&dir, &transport);

        let result = reconciler.reconcile(&eurusd(), &window()).await;
        assert!(matches!(result, Err(ArchiveError::Decode(_))));
    }

    #[tokio::test]
    async fn test_uses_compressed_cache_before_remote() {
        let dir = TempDir::new().unwrap();
        let transport = Arc::new(MockTransport::new());
        let config = SyncConfig {
            keep_compressed_cache: true,
            keep_decompressed_cache: true,
            store_uncompressed: true,
            ..SyncConfig::with_data_root(dir.path())
        };
        let mut reconciler = HourReconciler::new(config, Arc::clone(&transport)).unwrap();

        let cache = dir
            .path()
            .join("history/dukascopy/EURUSD/2013/01/07/10h_ticks.bi5");
        fs::create_dir_all(cache.parent().unwrap()).unwrap();
        fs::write(&cache, body()).unwrap();

        let outcome = reconciler.reconcile(&eurusd(), &window()).await.unwrap();
        assert_eq!(outcome, HourOutcome::Persisted { ticks: 3 });
        assert_eq!(transport.request_count(), 0);
        assert!(cache.exists());
        assert_eq!(
            fs::read(cache.with_extension("bin")).unwrap(),
            encode_ticks(&raw_ticks())
        );
        let plain = fs::read(
            dir.path()
                .join("history/forex/EURUSD/2013/01/07/12h_ticks.bin"),
        )
        .unwrap();
        assert_eq!(plain.len(), 3 * Tick::LOCAL_SIZE);
    }

    #[tokio::test]
    async fn test_stale_caches_are_removed() {
        let dir = TempDir::new().unwrap();
        let transport = Arc::new(MockTransport::new());
        let mut reconciler = reconciler(&dir, &transport);

        let stored = dir
            .path()
            .join("history/forex/EURUSD/2013/01/07/12h_ticks.rar");
        fs::create_dir_all(stored.parent().unwrap()).unwrap();
        fs::write(&stored, b"x").unwrap();
        let cache = dir
            .path()
            .join("history/dukascopy/EURUSD/2013/01/07/10h_ticks.bi5");
        fs::create_dir_all(cache.parent().unwrap()).unwrap();
        fs::write(&cache, body()).unwrap();

        let outcome = reconciler.reconcile(&eurusd(), &window()).await.unwrap();
        assert_eq!(outcome, HourOutcome::Satisfied);
        assert!(!cache.exists());
        assert!(!cache.parent().unwrap().exists());
    }

    #[tokio::test]
    async fn test_existing_uncompressed_file_satisfies_hour() {
        let dir = TempDir::new().unwrap();
        let transport = Arc::new(MockTransport::new());
        transport.respond(URL, HttpResponse::new(200, body()));
        let config = SyncConfig {
            store_uncompressed: true,
            ..SyncConfig::with_data_root(dir.path())
        };
        let mut reconciler = HourReconciler::new(config, Arc::clone(&transport)).unwrap();

        let plain = dir
            .path()
            .join("history/forex/EURUSD/2013/01/07/12h_ticks.bin");
        fs::create_dir_all(plain.parent().unwrap()).unwrap();
        fs::write(&plain, b"kept").unwrap();

        let outcome = reconciler.reconcile(&eurusd(), &window()).await.unwrap();
        assert_eq!(outcome, HourOutcome::Satisfied);
        assert_eq!(transport.request_count(), 0);
        assert_eq!(fs::read(&plain).unwrap(), b"kept");
        assert!(!plain.with_extension("rar").exists());
    }

    #[tokio::test]
    async fn test_decompressed_cache_wins_over_compressed_cache() {
        let dir = TempDir::new().unwrap();
        let transport = Arc::new(MockTransport::new());
        let mut reconciler = reconciler(&dir, &transport);

        let provider = dir.path().join("history/dukascopy/EURUSD/2013/01/07");
        fs::create_dir_all(&provider).unwrap();
        fs::write(provider.join("10h_ticks.bin"), encode_ticks(&raw_ticks())).unwrap();
        let other = [RawTick::new(500, 140_000, 139_990, 1.0, 1.0)];
        fs::write(
            provider.join("10h_ticks.bi5"),
            compress_local(&encode_ticks(&other)).unwrap(),
        )
        .unwrap();

        let outcome = reconciler.reconcile(&eurusd(), &window()).await.unwrap();
        assert_eq!(outcome, HourOutcome::Persisted { ticks: 3 });
        assert_eq!(transport.request_count(), 0);

        let stored = dir
            .path()
            .join("history/forex/EURUSD/2013/01/07/12h_ticks.rar");
        let payload = decompress_local(&fs::read(stored).unwrap()).unwrap();
        let ticks = decode_local_ticks(&payload, &window()).unwrap();
        assert_eq!(ticks.len(), 3);
        assert_eq!(ticks[0].ask, 130_512);
        assert_eq!(ticks[2].time_delta, 3_599_000);
        assert!(!provider.exists());
    }
}
