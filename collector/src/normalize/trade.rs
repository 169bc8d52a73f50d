//! Recent trades → [`TradeRow`]

use serde_json::Value;

use super::{as_list, kind};
use crate::coerce;
use crate::error::SchemaViolation;
use crate::model::{SymbolContext, TradeRow};

pub fn normalize(payload: &Value, ctx: &SymbolContext) -> Result<Vec<TradeRow>, SchemaViolation> {
    as_list(payload, "trades")?
        .iter()
        .enumerate()
        .map(|(row, trade)| normalize_trade(trade, ctx, row))
        .collect()
}

fn normalize_trade(
    trade: &Value,
    ctx: &SymbolContext,
    row: usize,
) -> Result<TradeRow, SchemaViolation> {
    if !trade.is_object() {
        return Err(SchemaViolation::new(
            row,
            "trade",
            format!("expected object, found {}", kind(trade)),
        ));
    }

    Ok(TradeRow {
        symbol: ctx.symbol.clone(),
        trade_time: coerce::instant_ms(trade.get("time"), "trade_time", row)?,
        trade_id: coerce::integer(trade.get("id"), "trade_id", row)?,
        price: coerce::float(trade.get("price"), "price", row)?,
        qty: coerce::float(trade.get("qty"), "qty", row)?,
        quote_qty: coerce::float(trade.get("quoteQty"), "quote_qty", row)?,
        is_buyer_maker: coerce::boolean(trade.get("isBuyerMaker"), "is_buyer_maker", row)?,
        is_best_match: coerce::boolean(trade.get("isBestMatch"), "is_best_match", row)?,
        rank: ctx.rank,
        time_collected: ctx.collected_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn ctx() -> SymbolContext {
        SymbolContext {
            symbol: "SOLUSDT".to_string(),
            rank: 5,
            collected_at: coerce::collection_epoch(Utc::now()),
        }
    }

    fn trade(id: i64, time: i64) -> Value {
        json!({
            "id": id,
            "price": "4.00000100",
            "qty": "12.00000000",
            "quoteQty": "48.000012",
            "time": time,
            "isBuyerMaker": true,
            "isBestMatch": false
        })
    }

    #[test]
    fn test_renames_and_coerces() {
        let rows = normalize(&json!([trade(28457, 1_499_865_549_590)]), &ctx()).unwrap();
        let row = &rows[0];

        assert_eq!(row.trade_id, 28457);
        assert_eq!(row.price, 4.000001);
        assert_eq!(row.qty, 12.0);
        assert_eq!(row.quote_qty, 48.000012);
        assert!(row.is_buyer_maker);
        assert!(!row.is_best_match);
        assert_eq!(row.trade_time.timestamp_millis(), 1_499_865_549_590);
        assert_eq!(row.rank, 5);
        assert_eq!(row.symbol, "SOLUSDT");
    }

    #[test]
    fn test_rows_share_collection_time() {
        let ctx = ctx();
        let payload = json!([trade(1, 1_700_000_000_001), trade(2, 1_700_000_000_002)]);
        let rows = normalize(&payload, &ctx).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.time_collected == ctx.collected_at));
        assert_eq!(rows[1].trade_id, 2);
    }

    #[test]
    fn test_missing_quote_qty_is_not_nulled() {
        let mut broken = trade(3, 1_700_000_000_003);
        broken.as_object_mut().unwrap().remove("quoteQty");
        let err = normalize(&json!([trade(1, 1), broken]), &ctx()).unwrap_err();
        assert_eq!(err.row, 1);
        assert_eq!(err.field, "quote_qty");
        assert_eq!(err.reason, "missing");
    }

    #[test]
    fn test_non_object_trade() {
        let err = normalize(&json!([42]), &ctx()).unwrap_err();
        assert_eq!(err.field, "trade");
    }
}
