//! Per-run record of what was collected

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::model::{Dataset, RankedSymbol};
use crate::persist::RowCount;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UnitStatus {
    Succeeded { rows: RowCount },
    /// Upstream returned an empty payload; nothing to append.
    Skipped { reason: String },
    Failed { stage: String, error: String },
}

/// Outcome of one symbol × dataset unit of work.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitOutcome {
    pub symbol: String,
    pub rank: i32,
    pub dataset: Dataset,
    #[serde(flatten)]
    pub status: UnitStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunManifest {
    pub run_id: Uuid,
    pub collected_at: DateTime<Utc>,
    pub ranked: Vec<RankedSymbol>,
    pub units: Vec<UnitOutcome>,
}

impl RunManifest {
    pub fn new(run_id: Uuid, collected_at: DateTime<Utc>, ranked: Vec<RankedSymbol>) -> Self {
        Self {
            run_id,
            collected_at,
            ranked,
            units: Vec::new(),
        }
    }

    pub fn record(&mut self, symbol: &str, rank: i32, dataset: Dataset, status: UnitStatus) {
        self.units.push(UnitOutcome {
            symbol: symbol.to_string(),
            rank,
            dataset,
            status,
        });
    }

    pub fn outcome(&self, symbol: &str, dataset: Dataset) -> Option<&UnitOutcome> {
        self.units
            .iter()
            .find(|unit| unit.symbol == symbol && unit.dataset == dataset)
    }

    pub fn succeeded(&self) -> usize {
        self.count(|status| matches!(status, UnitStatus::Succeeded { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|status| matches!(status, UnitStatus::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|status| matches!(status, UnitStatus::Failed { .. }))
    }

    pub fn rows_written(&self) -> RowCount {
        self.units
            .iter()
            .map(|unit| match unit.status {
                UnitStatus::Succeeded { rows } => rows,
                _ => 0,
            })
            .sum()
    }

    /// True once every ranked symbol has an outcome for every dataset.
    pub fn is_complete(&self) -> bool {
        self.ranked.iter().all(|ranked| {
            [Dataset::Ticker24hr]
                .iter()
                .chain(Dataset::PER_SYMBOL.iter())
                .all(|dataset| self.outcome(&ranked.symbol, *dataset).is_some())
        })
    }

    fn count(&self, predicate: impl Fn(&UnitStatus) -> bool) -> usize {
        self.units.iter().filter(|unit| predicate(&unit.status)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn manifest() -> RunManifest {
        let now = Utc::now();
        RunManifest::new(
            Uuid::nil(),
            now,
            vec![RankedSymbol {
                symbol: "BTCUSDT".to_string(),
                rank: 1,
                snapshot_time: now,
            }],
        )
    }

    #[test]
    fn test_counts_and_completion() {
        let mut manifest = manifest();
        manifest.record("BTCUSDT", 1, Dataset::Ticker24hr, UnitStatus::Succeeded { rows: 1 });
        manifest.record("BTCUSDT", 1, Dataset::Kline, UnitStatus::Succeeded { rows: 300 });
        manifest.record(
            "BTCUSDT",
            1,
            Dataset::OrderBook,
            UnitStatus::Failed {
                stage: "fetch".to_string(),
                error: "HTTP 429".to_string(),
            },
        );
        assert!(!manifest.is_complete());

        manifest.record(
            "BTCUSDT",
            1,
            Dataset::Trades,
            UnitStatus::Skipped {
                reason: "empty payload".to_string(),
            },
        );

        assert!(manifest.is_complete());
        assert_eq!(manifest.succeeded(), 2);
        assert_eq!(manifest.failed(), 1);
        assert_eq!(manifest.skipped(), 1);
        assert_eq!(manifest.rows_written(), 301);
    }

    #[test]
    fn test_unit_serializes_flat() {
        let unit = UnitOutcome {
            symbol: "ETHUSDT".to_string(),
            rank: 2,
            dataset: Dataset::OrderBook,
            status: UnitStatus::Succeeded { rows: 600 },
        };
        assert_eq!(
            serde_json::to_value(&unit).unwrap(),
            json!({
                "symbol": "ETHUSDT",
                "rank": 2,
                "dataset": "order_book",
                "status": "succeeded",
                "rows": 600
            })
        );
    }
}
