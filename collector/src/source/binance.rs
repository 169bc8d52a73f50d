//! Binance spot public REST client

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::error::FetchError;
use crate::model::Dataset;
use crate::source::{MarketDataSource, RawTicker};

pub const KLINE_INTERVAL: &str = "5m";
pub const FETCH_LIMIT: u16 = 300;

const MAX_ERROR_BODY: usize = 256;

#[derive(Debug, Clone)]
pub struct BinanceRestClient {
    base_url: String,
    kline_interval: String,
    limit: u16,
    client: reqwest::Client,
}

impl BinanceRestClient {
    /// Create a client against `base_url` with a per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            kline_interval: KLINE_INTERVAL.to_string(),
            limit: FETCH_LIMIT,
            client,
        })
    }

    pub fn with_limit(mut self, limit: u16) -> Self {
        self.limit = limit;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Path and query parameters for a dataset request.
    ///
    /// Without a symbol the ticker endpoint returns every pair on the exchange.
    pub fn endpoint(
        &self,
        dataset: Dataset,
        symbol: Option<&str>,
    ) -> (&'static str, Vec<(&'static str, String)>) {
        let mut query: Vec<(&'static str, String)> = symbol
            .map(|symbol| ("symbol", symbol.to_uppercase()))
            .into_iter()
            .collect();

        let path = match dataset {
            Dataset::Ticker24hr => "/api/v3/ticker/24hr",
            Dataset::Kline => {
                query.push(("interval", self.kline_interval.clone()));
                query.push(("limit", self.limit.to_string()));
                "/api/v3/klines"
            }
            Dataset::OrderBook => {
                query.push(("limit", self.limit.to_string()));
                "/api/v3/depth"
            }
            Dataset::Trades => {
                query.push(("limit", self.limit.to_string()));
                "/api/v3/trades"
            }
        };
        (path, query)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<T, FetchError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {} {:?}", url, query);

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|source| FetchError::Request {
                endpoint: path.to_string(),
                source,
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|source| FetchError::Request {
            endpoint: path.to_string(),
            source,
        })?;

        if !status.is_success() {
            return Err(FetchError::Status {
                endpoint: path.to_string(),
                status: status.as_u16(),
                body: truncate(&body, MAX_ERROR_BODY),
            });
        }

        serde_json::from_str(&body).map_err(|e| FetchError::Decode {
            endpoint: path.to_string(),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl MarketDataSource for BinanceRestClient {
    async fn ticker_24hr(&self) -> Result<Vec<RawTicker>, FetchError> {
        let (path, query) = self.endpoint(Dataset::Ticker24hr, None);
        self.get_json(path, &query).await
    }

    async fn fetch(&self, dataset: Dataset, symbol: &str) -> Result<Value, FetchError> {
        let (path, query) = self.endpoint(dataset, Some(symbol));
        self.get_json(path, &query).await
    }
}

fn truncate(body: &str, max: usize) -> String {
    match body.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
