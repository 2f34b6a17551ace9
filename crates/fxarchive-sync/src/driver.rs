//! Walks the hours of a symbol's history.

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use fxarchive_calendar::{FxtClock, first_trading_hour, gmt_to_fxt};
use fxarchive_fetch::Transport;
use fxarchive_types::{GmtHours, HourWindow, Result, Symbol, Timeframe, floor_hour_utc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{HourOutcome, HourReconciler};

/// Counters of one symbol run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolSummary {
    /// Symbol name.
    pub symbol: String,
    /// Hours visited.
    pub hours: usize,
    /// Hours written in this run.
    pub persisted: usize,
    /// Ticks written in this run.
    pub ticks: usize,
    /// Hours already stored.
    pub satisfied: usize,
    /// Weekend hours.
    pub non_trading: usize,
    /// Hours the provider has no data for.
    pub absent: usize,
    /// Hours left for a later run.
    pub transient: usize,
    /// The run stopped on cancellation.
    pub interrupted: bool,
    /// No history start was available, nothing was visited.
    pub skipped: bool,
}

impl SymbolSummary {
    fn new(symbol: &Symbol) -> Self {
        Self {
            symbol: symbol.name().to_string(),
            ..Self::default()
        }
    }

    fn record(&mut self, outcome: HourOutcome) {
        self.hours += 1;
        match outcome {
            HourOutcome::Satisfied => self.satisfied += 1,
            HourOutcome::Persisted { ticks } => {
                self.persisted += 1;
                self.ticks += ticks;
            }
            HourOutcome::NonTrading => self.non_trading += 1,
            HourOutcome::AbsentPermanent => self.absent += 1,
            HourOutcome::AbsentTransient => self.transient += 1,
        }
    }
}

/// Hours a symbol run will visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncPlan {
    /// First hour, on an FXT day boundary.
    pub start: HourWindow,
    /// Exclusive GMT end.
    pub end: DateTime<Utc>,
}

impl SyncPlan {
    /// Returns the GMT hours of the plan.
    #[must_use]
    pub fn hours(&self) -> GmtHours {
        GmtHours::new(self.start.gmt(), self.end)
    }

    /// Returns the number of hours of the plan.
    #[must_use]
    pub fn total_hours(&self) -> usize {
        self.hours().len()
    }
}

/// Returns the exclusive end of a run started at `now`.
///
/// The hour before the current one may still be incomplete on the provider
/// side, so it is left out as well.
#[must_use]
pub fn sync_end(now: DateTime<Utc>) -> DateTime<Utc> {
    floor_hour_utc(now) - TimeDelta::hours(1)
}

/// Synchronises whole symbols, one hour at a time.
#[derive(Debug)]
pub struct SymbolDriver<T> {
    reconciler: HourReconciler<T>,
    cancel: CancellationToken,
}

impl<T: Transport> SymbolDriver<T> {
    /// Creates a driver.
    #[must_use]
    pub const fn new(reconciler: HourReconciler<T>, cancel: CancellationToken) -> Self {
        Self { reconciler, cancel }
    }

    /// Returns the reconciler.
    #[must_use]
    pub const fn reconciler(&self) -> &HourReconciler<T> {
        &self.reconciler
    }

    /// Returns the FXT start of the symbol's tick history.
    ///
    /// Falls back to the provider's history-start metadata when the symbol
    /// carries no start.
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata request fails or is malformed.
    pub async fn history_start(&mut self, symbol: &Symbol) -> Result<Option<NaiveDateTime>> {
        if let Some(start) = symbol.tick_history_start() {
            return Ok(Some(start));
        }
        debug!(symbol = %symbol, "no known start, asking the provider");
        let start = self
            .reconciler
            .history_start(symbol)
            .await?
            .and_then(|starts| starts.get(&Timeframe::Tick.id()).copied().flatten());
        Ok(start.map(gmt_to_fxt))
    }

    /// Plans a run of `symbol` ending before the hour preceding `now`.
    ///
    /// Returns `None` if the symbol has no known history.
    ///
    /// # Errors
    ///
    /// Returns an error if the history start cannot be determined.
    pub async fn plan(&mut self, symbol: &Symbol, now: DateTime<Utc>) -> Result<Option<SyncPlan>> {
        let Some(start) = self.history_start(symbol).await? else {
            warn!(symbol = %symbol, "no tick history start available, skipping");
            return Ok(None);
        };
        let start = first_trading_hour(start)?;
        Ok(Some(SyncPlan {
            start,
            end: sync_end(now),
        }))
    }

    /// Visits every hour of `plan`, reporting each outcome to `on_hour`.
    ///
    /// Cancellation is checked before each hour.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error; hours after it are not visited.
    pub async fn execute<F>(
        &mut self,
        symbol: &Symbol,
        plan: &SyncPlan,
        mut on_hour: F,
    ) -> Result<SymbolSummary>
    where
        F: FnMut(&HourWindow, HourOutcome),
    {
        let mut summary = SymbolSummary::new(symbol);
        let mut clock = FxtClock::new(plan.start.gmt());
        info!(
            symbol = %symbol,
            from = %plan.start,
            to = %plan.end,
            hours = plan.total_hours(),
            "synchronising"
        );

        for gmt in plan.hours() {
            if self.cancel.is_cancelled() {
                info!(symbol = %symbol, %gmt, "cancelled");
                summary.interrupted = true;
                break;
            }
            let window = clock.window(gmt)?;
            let outcome = self.reconciler.reconcile(symbol, &window).await?;
            summary.record(outcome);
            on_hour(&window, outcome);
        }

        debug!(
            symbol = %symbol,
            offset_resolutions = clock.resolutions(),
            "run finished"
        );
        Ok(summary)
    }

    /// Plans and executes a run of `symbol`.
    ///
    /// # Errors
    ///
    /// See [`SymbolDriver::plan`] and [`SymbolDriver::execute`].
    pub async fn run(&mut self, symbol: &Symbol, now: DateTime<Utc>) -> Result<SymbolSummary> {
        match self.plan(symbol, now).await? {
            Some(plan) => self.execute(symbol, &plan, |_, _| {}).await,
            None => Ok(SymbolSummary {
                skipped: true,
                ..SymbolSummary::new(symbol)
            }),
        }
    }
}
