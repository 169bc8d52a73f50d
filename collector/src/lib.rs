//! Collector: Binance top-mover market snapshots
//!
//! Each run ranks USDT pairs by 24h percent change and, for the top five,
//! appends the ticker, 5m klines, order book and recent trades to an
//! append-only store, every row tagged with the symbol's rank and the run's
//! collection instant.
//!
//! # Layout
//!
//! - **source**: exchange REST access returning raw JSON
//! - **ranking**: eligibility filters and top-N ordering
//! - **normalize**: payload shape checks and type coercion into rows
//! - **persist**: append-only stores (SeaORM, in-memory)
//! - **pipeline**: run orchestration and the per-run manifest
//!
//! # Example
//!
//! ```no_run
//! use collector::prelude::*;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let source = BinanceRestClient::new("https://api.binance.com", Duration::from_secs(30))?;
//!     let pipeline = Pipeline::new(Arc::new(source), Arc::new(MemoryStore::new()));
//!     let manifest = pipeline.run().await?;
//!     println!("{} rows", manifest.rows_written());
//!     Ok(())
//! }
//! ```

pub mod coerce;
pub mod error;
pub mod logging;
pub mod model;
pub mod normalize;
pub mod persist;
pub mod pipeline;
pub mod ranking;
pub mod source;

pub mod prelude {
    pub use crate::error::*;
    pub use crate::model::*;
    pub use crate::persist::{MemoryStore, Persister, RowCount, SeaOrmStore};
    pub use crate::pipeline::{Pipeline, RunManifest, UnitOutcome, UnitStatus};
    pub use crate::ranking::{Selection, SelectionRules};
    pub use crate::source::{BinanceRestClient, MarketDataSource, RawTicker};
}

/// Result type alias
pub type Result<T> = std::result::Result<T, error::CollectorError>;
