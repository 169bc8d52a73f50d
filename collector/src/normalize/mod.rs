//! Payload normalization
//!
//! Each dataset has its own module mapping the exchange's payload shape onto
//! canonical rows stamped from a [`SymbolContext`](crate::model::SymbolContext).

pub mod kline;
pub mod order_book;
pub mod ticker;
pub mod trade;

use serde_json::Value;

use crate::error::SchemaViolation;
use crate::model::{Dataset, RowBatch, SymbolContext};

/// Normalize one symbol's payload for `dataset`.
pub fn normalize(
    dataset: Dataset,
    payload: &Value,
    ctx: &SymbolContext,
) -> Result<RowBatch, SchemaViolation> {
    match dataset {
        Dataset::Ticker24hr => {
            ticker::normalize_one(payload, ctx, 0).map(|row| RowBatch::Ticker24hr(vec![row]))
        }
        Dataset::Kline => kline::normalize(payload, ctx).map(RowBatch::Kline),
        Dataset::OrderBook => order_book::normalize(payload, ctx).map(RowBatch::OrderBook),
        Dataset::Trades => trade::normalize(payload, ctx).map(RowBatch::Trades),
    }
}

/// Top-level array of a list payload, or a violation naming `container`.
pub(crate) fn as_list<'a>(
    payload: &'a Value,
    container: &'static str,
) -> Result<&'a Vec<Value>, SchemaViolation> {
    payload.as_array().ok_or_else(|| {
        SchemaViolation::new(0, container, format!("expected array, found {}", kind(payload)))
    })
}

pub(crate) fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
