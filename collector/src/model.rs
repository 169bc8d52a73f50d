//! Canonical row types and the per-symbol tagging context.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// The four datasets collected each run, one table each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dataset {
    Ticker24hr,
    Kline,
    OrderBook,
    Trades,
}

impl Dataset {
    /// Per-symbol datasets in the order they are collected.
    pub const PER_SYMBOL: [Dataset; 3] = [Dataset::Kline, Dataset::OrderBook, Dataset::Trades];

    pub fn table_name(&self) -> &'static str {
        match self {
            Dataset::Ticker24hr => "top_24hr",
            Dataset::Kline => "kline_data",
            Dataset::OrderBook => "order_book",
            Dataset::Trades => "recent_trades",
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dataset::Ticker24hr => "ticker_24hr",
            Dataset::Kline => "kline",
            Dataset::OrderBook => "order_book",
            Dataset::Trades => "trades",
        };
        f.write_str(name)
    }
}

/// A symbol picked by the ranking step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedSymbol {
    pub symbol: String,
    /// 1-based position after sorting by 24h percent change
    pub rank: i32,
    pub snapshot_time: DateTime<Utc>,
}

/// Symbol, rank and collection instant stamped onto every row of one unit of work.
///
/// Built once per ranked symbol and passed down unchanged so all four datasets
/// for a symbol agree on rank and `time_collected`.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolContext {
    pub symbol: String,
    pub rank: i32,
    pub collected_at: DateTime<Utc>,
}

impl From<&RankedSymbol> for SymbolContext {
    fn from(ranked: &RankedSymbol) -> Self {
        Self {
            symbol: ranked.symbol.clone(),
            rank: ranked.rank,
            collected_at: ranked.snapshot_time,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ticker24hrRow {
    pub symbol: String,
    pub rank: i32,
    pub time_collected: DateTime<Utc>,
    pub price_change: f64,
    pub price_change_percent: f64,
    pub weighted_avg_price: f64,
    pub prev_close_price: f64,
    pub last_price: f64,
    pub last_qty: f64,
    pub bid_price: f64,
    pub bid_qty: f64,
    pub ask_price: f64,
    pub ask_qty: f64,
    pub open_price: f64,
    pub high_price: f64,
    pub low_price: f64,
    pub volume: f64,
    pub quote_volume: f64,
    pub open_time: DateTime<Utc>,
    pub close_time: DateTime<Utc>,
    pub first_id: i64,
    pub last_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KlineRow {
    pub symbol: String,
    pub k_open_time: DateTime<Utc>,
    pub k_close_time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub quote_asset_volume: f64,
    pub number_of_trades: i64,
    pub tb_base_volume: f64,
    pub tb_quote_volume: f64,
    pub rank: i32,
    pub time_collected: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Bids,
    Asks,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Bids => "bids",
            Side::Asks => "asks",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderBookLevelRow {
    pub symbol: String,
    pub side: Side,
    pub time_collected: DateTime<Utc>,
    pub price: f64,
    pub quantity: f64,
    pub rank: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeRow {
    pub symbol: String,
    pub trade_time: DateTime<Utc>,
    pub trade_id: i64,
    pub price: f64,
    pub qty: f64,
    pub quote_qty: f64,
    pub is_buyer_maker: bool,
    pub is_best_match: bool,
    pub rank: i32,
    pub time_collected: DateTime<Utc>,
}

/// Normalized rows of a single dataset, ready to append to its table.
#[derive(Debug, Clone, PartialEq)]
pub enum RowBatch {
    Ticker24hr(Vec<Ticker24hrRow>),
    Kline(Vec<KlineRow>),
    OrderBook(Vec<OrderBookLevelRow>),
    Trades(Vec<TradeRow>),
}

impl RowBatch {
    pub fn dataset(&self) -> Dataset {
        match self {
            RowBatch::Ticker24hr(_) => Dataset::Ticker24hr,
            RowBatch::Kline(_) => Dataset::Kline,
            RowBatch::OrderBook(_) => Dataset::OrderBook,
            RowBatch::Trades(_) => Dataset::Trades,
        }
    }

    pub fn table_name(&self) -> &'static str {
        self.dataset().table_name()
    }

    pub fn len(&self) -> usize {
        match self {
            RowBatch::Ticker24hr(rows) => rows.len(),
            RowBatch::Kline(rows) => rows.len(),
            RowBatch::OrderBook(rows) => rows.len(),
            RowBatch::Trades(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
