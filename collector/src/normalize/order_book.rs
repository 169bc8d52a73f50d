//! Depth snapshot → [`OrderBookLevelRow`]

use serde_json::Value;

use super::kind;
use crate::coerce;
use crate::error::SchemaViolation;
use crate::model::{OrderBookLevelRow, Side, SymbolContext};

/// Flatten `{bids, asks}` into one row per level, asks first then bids.
///
/// Row indexes in violations count across the flattened output, so a bad bid
/// level is reported after all ask rows.
pub fn normalize(
    payload: &Value,
    ctx: &SymbolContext,
) -> Result<Vec<OrderBookLevelRow>, SchemaViolation> {
    let asks = side_levels(payload, "asks")?;
    let bids = side_levels(payload, "bids")?;

    let mut rows = Vec::with_capacity(asks.len() + bids.len());
    for (side, levels) in [(Side::Asks, asks), (Side::Bids, bids)] {
        for level in levels {
            let row = rows.len();
            rows.push(normalize_level(level, side, ctx, row)?);
        }
    }
    Ok(rows)
}

fn side_levels<'a>(
    payload: &'a Value,
    side: &'static str,
) -> Result<&'a Vec<Value>, SchemaViolation> {
    match payload.get(side) {
        Some(Value::Array(levels)) => Ok(levels),
        Some(other) => Err(SchemaViolation::new(
            0,
            side,
            format!("expected array, found {}", kind(other)),
        )),
        None => Err(SchemaViolation::new(0, side, "missing")),
    }
}

fn normalize_level(
    level: &Value,
    side: Side,
    ctx: &SymbolContext,
    row: usize,
) -> Result<OrderBookLevelRow, SchemaViolation> {
    let pair = match level.as_array() {
        Some(pair) if pair.len() == 2 => pair,
        _ => {
            return Err(SchemaViolation::new(
                row,
                side.as_str(),
                "expected [price, quantity] pair",
            ))
        }
    };

    Ok(OrderBookLevelRow {
        symbol: ctx.symbol.clone(),
        side,
        time_collected: ctx.collected_at,
        price: coerce::float(pair.first(), "price", row)?,
        quantity: coerce::float(pair.get(1), "quantity", row)?,
        rank: ctx.rank,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn ctx() -> SymbolContext {
        SymbolContext {
            symbol: "ETHUSDT".to_string(),
            rank: 4,
            collected_at: coerce::collection_epoch(Utc::now()),
        }
    }

    #[test]
    fn test_depth_example_gives_one_row_per_side() {
        let depth = json!({"bids": [["100.5", "2.0"]], "asks": [["101.0", "1.5"]]});
        let ctx = ctx();
        let rows = normalize(&depth, &ctx).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].side, Side::Asks);
        assert_eq!(rows[0].price, 101.0);
        assert_eq!(rows[0].quantity, 1.5);
        assert_eq!(rows[1].side, Side::Bids);
        assert_eq!(rows[1].price, 100.5);
        assert_eq!(rows[1].quantity, 2.0);
        assert!(rows.iter().all(|r| r.time_collected == ctx.collected_at));
        assert!(rows.iter().all(|r| r.rank == 4 && r.symbol == "ETHUSDT"));
    }

    #[test]
    fn test_within_side_order_is_preserved() {
        let depth = json!({
            "lastUpdateId": 1027024,
            "bids": [["100.5", "2.0"], ["100.4", "3.0"], ["100.1", "0.5"]],
            "asks": [["101.0", "1.5"], ["101.2", "4.0"]]
        });
        let rows = normalize(&depth, &ctx()).unwrap();

        let prices = |side: Side| -> Vec<f64> {
            rows.iter().filter(|r| r.side == side).map(|r| r.price).collect()
        };
        let asks = prices(Side::Asks);
        let bids = prices(Side::Bids);
        assert_eq!(asks, vec![101.0, 101.2]);
        assert_eq!(bids, vec![100.5, 100.4, 100.1]);
        assert!(rows[..2].iter().all(|r| r.side == Side::Asks));
    }

    #[test]
    fn test_empty_book() {
        let rows = normalize(&json!({"bids": [], "asks": []}), &ctx()).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_missing_side() {
        let err = normalize(&json!({"bids": []}), &ctx()).unwrap_err();
        assert_eq!(err.field, "asks");
        assert_eq!(err.reason, "missing");
    }

    #[test]
    fn test_bad_bid_row_index_counts_past_asks() {
        let depth = json!({
            "bids": [["100.5", "2.0"], ["oops", "1.0"]],
            "asks": [["101.0", "1.5"]]
        });
        let err = normalize(&depth, &ctx()).unwrap_err();
        assert_eq!(err.row, 2);
        assert_eq!(err.field, "price");
    }

    #[test]
    fn test_malformed_level() {
        let depth = json!({"bids": [["100.5"]], "asks": []});
        let err = normalize(&depth, &ctx()).unwrap_err();
        assert_eq!(err.field, "bids");
    }
}
