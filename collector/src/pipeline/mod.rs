//! Run orchestration
//!
//! One run ranks the market, then walks every ranked symbol through each
//! per-symbol dataset: fetch, normalize, append. Ranking failures abort the
//! run. Anything after that is isolated to its symbol × dataset unit and
//! recorded in the [`RunManifest`].

pub mod manifest;

pub use manifest::{RunManifest, UnitOutcome, UnitStatus};

use chrono::Utc;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::coerce;
use crate::error::CollectorError;
use crate::model::{Dataset, RankedSymbol, RowBatch, SymbolContext};
use crate::normalize::{self, ticker};
use crate::persist::{Persister, RowCount};
use crate::ranking::{self, Selection, SelectionRules};
use crate::source::{MarketDataSource, RawTicker};

/// Where a run currently is. Exposed for logging only.
#[derive(Debug, Clone, PartialEq)]
pub enum RunPhase {
    Idle,
    SelectingRanking,
    Collecting { symbol: String, dataset: Dataset },
    Done,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunPhase::Idle => f.write_str("idle"),
            RunPhase::SelectingRanking => f.write_str("selecting_ranking"),
            RunPhase::Collecting { symbol, dataset } => {
                write!(f, "collecting {} {}", symbol, dataset)
            }
            RunPhase::Done => f.write_str("done"),
        }
    }
}

pub struct Pipeline {
    source: Arc<dyn MarketDataSource>,
    store: Arc<dyn Persister>,
    rules: SelectionRules,
}

impl Pipeline {
    pub fn new(source: Arc<dyn MarketDataSource>, store: Arc<dyn Persister>) -> Self {
        Self {
            source,
            store,
            rules: SelectionRules::default(),
        }
    }

    pub fn with_rules(mut self, rules: SelectionRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn rules(&self) -> &SelectionRules {
        &self.rules
    }

    /// Execute one collection run.
    ///
    /// Returns `Err` only when no ranking could be produced; per-unit failures
    /// are logged and reported through the manifest.
    pub async fn run(&self) -> Result<RunManifest, CollectorError> {
        let run_id = Uuid::new_v4();
        let span = info_span!("collection_run", %run_id);
        self.run_inner(run_id).instrument(span).await
    }

    async fn run_inner(&self, run_id: Uuid) -> Result<RunManifest, CollectorError> {
        let collected_at = coerce::collection_epoch(Utc::now());
        let mut phase = RunPhase::Idle;
        advance(&mut phase, RunPhase::SelectingRanking);

        let selection =
            match ranking::select_top5(self.source.as_ref(), &self.rules, collected_at).await {
                Ok(selection) => selection,
                Err(e) => {
                    error!("Ranking failed, aborting run: {}", e);
                    return Err(e);
                }
            };
        let Selection { tickers, ranked } = selection;

        let mut manifest = RunManifest::new(run_id, collected_at, ranked.clone());
        self.collect_tickers(tickers, &ranked, &mut manifest).await;

        for entry in &ranked {
            let ctx = SymbolContext::from(entry);
            for dataset in Dataset::PER_SYMBOL {
                advance(
                    &mut phase,
                    RunPhase::Collecting {
                        symbol: ctx.symbol.clone(),
                        dataset,
                    },
                );
                let status = self.collect_unit(dataset, &ctx).await;
                manifest.record(&ctx.symbol, ctx.rank, dataset, status);
            }
        }

        advance(&mut phase, RunPhase::Done);
        info!(
            "Run finished: {} succeeded, {} skipped, {} failed, {} rows written",
            manifest.succeeded(),
            manifest.skipped(),
            manifest.failed(),
            manifest.rows_written()
        );
        Ok(manifest)
    }

    /// Run on every tick of `period` until `shutdown` resolves.
    ///
    /// `shutdown` is watched during a run as well as between runs; a run in
    /// progress is dropped at its current await point. Rows already appended
    /// stay written. Returns the number of runs that produced a manifest.
    pub async fn run_every<F>(
        &self,
        period: Duration,
        shutdown: F,
        mut on_manifest: impl FnMut(RunManifest),
    ) -> usize
    where
        F: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);
        let mut completed = 0;

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = ticker.tick() => {}
            }

            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    warn!("Shutdown requested, abandoning run in progress");
                    break;
                }
                result = self.run() => match result {
                    Ok(manifest) => {
                        completed += 1;
                        on_manifest(manifest);
                    }
                    // A failed ranking only loses this tick.
                    Err(e) => error!("Collection run aborted ({}): {}", e.kind(), e),
                },
            }
        }

        completed
    }

    /// Persist the ranked tickers already fetched for selection.
    ///
    /// Each ticker normalizes independently; the good ones go out in one append.
    async fn collect_tickers(
        &self,
        tickers: Vec<RawTicker>,
        ranked: &[RankedSymbol],
        manifest: &mut RunManifest,
    ) {
        let mut rows = Vec::with_capacity(ranked.len());
        let mut good: Vec<&RankedSymbol> = Vec::with_capacity(ranked.len());

        for (row, (raw, ranked)) in tickers.into_iter().zip(ranked).enumerate() {
            let payload = Value::from(raw);
            match ticker::normalize_one(&payload, &SymbolContext::from(ranked), row) {
                Ok(normalized) => {
                    rows.push(normalized);
                    good.push(ranked);
                }
                Err(violation) => {
                    warn!(
                        "Skipping {} for {} (rank {}): {}",
                        Dataset::Ticker24hr,
                        ranked.symbol,
                        ranked.rank,
                        violation
                    );
                    let status = failed(&CollectorError::from(violation));
                    manifest.record(&ranked.symbol, ranked.rank, Dataset::Ticker24hr, status);
                }
            }
        }

        if rows.is_empty() {
            return;
        }

        let status = match self.store.append(&RowBatch::Ticker24hr(rows)).await {
            Ok(_) => UnitStatus::Succeeded { rows: 1 },
            Err(e) => {
                error!("Failed to persist {} batch: {}", Dataset::Ticker24hr, e);
                failed(&CollectorError::from(e))
            }
        };
        for ranked in good {
            manifest.record(&ranked.symbol, ranked.rank, Dataset::Ticker24hr, status.clone());
        }
    }

    async fn collect_unit(&self, dataset: Dataset, ctx: &SymbolContext) -> UnitStatus {
        match self.fetch_normalize_append(dataset, ctx).await {
            Ok(Some(rows)) => {
                info!("Stored {} {} rows for {} (rank {})", rows, dataset, ctx.symbol, ctx.rank);
                UnitStatus::Succeeded { rows }
            }
            Ok(None) => {
                warn!("Empty {} payload for {} (rank {})", dataset, ctx.symbol, ctx.rank);
                UnitStatus::Skipped {
                    reason: "empty payload".to_string(),
                }
            }
            Err(e) => {
                error!(
                    "Failed to collect {} for {} (rank {}) at {}: {}",
                    dataset,
                    ctx.symbol,
                    ctx.rank,
                    e.kind(),
                    e
                );
                failed(&e)
            }
        }
    }

    /// `Ok(None)` when upstream had nothing for this symbol.
    async fn fetch_normalize_append(
        &self,
        dataset: Dataset,
        ctx: &SymbolContext,
    ) -> Result<Option<RowCount>, CollectorError> {
        let payload = self.source.fetch(dataset, &ctx.symbol).await?;
        let batch = normalize::normalize(dataset, &payload, ctx)?;
        if batch.is_empty() {
            return Ok(None);
        }
        let rows = self.store.append(&batch).await?;
        Ok(Some(rows))
    }
}

fn advance(phase: &mut RunPhase, next: RunPhase) {
    tracing::trace!("Phase {} -> {}", phase, next);
    *phase = next;
}

fn failed(e: &CollectorError) -> UnitStatus {
    UnitStatus::Failed {
        stage: e.kind().to_string(),
        error: e.to_string(),
    }
}
