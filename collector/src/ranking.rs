//! Top-mover selection
//!
//! Picks the symbols to collect this run: liquid pairs in the configured quote
//! asset, ordered by 24h percent price change.

use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use tracing::{debug, info, warn};

use crate::coerce;
use crate::error::{CollectorError, SchemaViolation};
use crate::model::RankedSymbol;
use crate::source::{MarketDataSource, RawTicker};

#[derive(Debug, Clone, PartialEq)]
pub struct SelectionRules {
    pub quote_suffix: String,
    /// Exclusive lower bound on 24h quote volume
    pub min_quote_volume: f64,
    /// Exclusive lower bound on best ask quantity; zero filters delisted pairs
    pub min_ask_qty: f64,
    pub top_n: usize,
}

impl Default for SelectionRules {
    fn default() -> Self {
        Self {
            quote_suffix: "USDT".to_string(),
            min_quote_volume: 1_000_000.0,
            min_ask_qty: 0.0,
            top_n: 5,
        }
    }
}

/// Result of a ranking pass. `tickers[i]` is the raw ticker for `ranked[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub tickers: Vec<RawTicker>,
    pub ranked: Vec<RankedSymbol>,
}

impl Selection {
    pub fn symbols(&self) -> Vec<&str> {
        self.ranked.iter().map(|r| r.symbol.as_str()).collect()
    }
}

struct Candidate {
    ticker: RawTicker,
    symbol: String,
    change_percent: f64,
}

/// Fetch the 24h ticker list and rank it.
pub async fn select_top5(
    source: &dyn MarketDataSource,
    rules: &SelectionRules,
    snapshot_time: DateTime<Utc>,
) -> Result<Selection, CollectorError> {
    let tickers = source.ticker_24hr().await?;
    info!("Fetched {} tickers for ranking", tickers.len());
    rank_tickers(tickers, rules, snapshot_time)
}

/// Filter and rank an already fetched ticker list.
pub fn rank_tickers(
    tickers: Vec<RawTicker>,
    rules: &SelectionRules,
    snapshot_time: DateTime<Utc>,
) -> Result<Selection, CollectorError> {
    let mut candidates = Vec::new();

    for (row, ticker) in tickers.into_iter().enumerate() {
        match eligibility(&ticker, rules, row) {
            Ok(Some(change_percent)) => {
                let symbol = ticker.symbol().unwrap_or_default().to_string();
                candidates.push(Candidate {
                    ticker,
                    symbol,
                    change_percent,
                });
            }
            Ok(None) => {}
            Err(violation) => {
                warn!(
                    "Ignoring ticker {:?} for ranking: {}",
                    ticker.symbol().unwrap_or("<unknown>"),
                    violation
                );
            }
        }
    }

    if candidates.len() < rules.top_n {
        return Err(CollectorError::InsufficientCandidates {
            found: candidates.len(),
            required: rules.top_n,
        });
    }

    // Vec::sort_by is stable, so equal changes keep exchange order.
    // Values are finite, and partial_cmp treats -0.0 and 0.0 as equal.
    candidates.sort_by(|a, b| {
        b.change_percent
            .partial_cmp(&a.change_percent)
            .unwrap_or(Ordering::Equal)
    });
    candidates.truncate(rules.top_n);

    let mut selection = Selection {
        tickers: Vec::with_capacity(rules.top_n),
        ranked: Vec::with_capacity(rules.top_n),
    };
    for (idx, candidate) in candidates.into_iter().enumerate() {
        debug!(
            "Rank {}: {} ({:+.2}%)",
            idx + 1,
            candidate.symbol,
            candidate.change_percent
        );
        selection.ranked.push(RankedSymbol {
            symbol: candidate.symbol,
            rank: idx as i32 + 1,
            snapshot_time,
        });
        selection.tickers.push(candidate.ticker);
    }

    info!("Selected top movers: {:?}", selection.symbols());
    Ok(selection)
}

/// `Some(percent change)` when the ticker passes every filter.
fn eligibility(
    ticker: &RawTicker,
    rules: &SelectionRules,
    row: usize,
) -> Result<Option<f64>, SchemaViolation> {
    let symbol = coerce::text(ticker.get("symbol"), "symbol", row)?;
    if !symbol.ends_with(&rules.quote_suffix) {
        return Ok(None);
    }

    let quote_volume = coerce::float(ticker.get("quoteVolume"), "quote_volume", row)?;
    let ask_qty = coerce::float(ticker.get("askQty"), "ask_qty", row)?;
    if quote_volume <= rules.min_quote_volume || ask_qty <= rules.min_ask_qty {
        return Ok(None);
    }

    let change_percent =
        coerce::float(ticker.get("priceChangePercent"), "price_change_percent", row)?;
    Ok(Some(change_percent))
}
