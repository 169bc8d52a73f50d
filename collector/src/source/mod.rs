//! Upstream market data access
//!
//! Payloads are returned undecoded (`serde_json::Value`); shape checks and type
//! coercion belong to the normalizers.

pub mod binance;

pub use binance::*;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::FetchError;
use crate::model::Dataset;

/// One element of the `/api/v3/ticker/24hr` list, kept as the raw JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawTicker(Map<String, Value>);

impl RawTicker {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn symbol(&self) -> Option<&str> {
        self.get("symbol").and_then(Value::as_str)
    }

}

impl From<RawTicker> for Value {
    fn from(ticker: RawTicker) -> Self {
        Value::Object(ticker.0)
    }
}

#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// 24h statistics for every symbol on the exchange.
    async fn ticker_24hr(&self) -> Result<Vec<RawTicker>, FetchError>;

    /// Raw payload of one dataset for one symbol.
    async fn fetch(&self, dataset: Dataset, symbol: &str) -> Result<Value, FetchError>;
}
