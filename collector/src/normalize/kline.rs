//! Kline arrays → [`KlineRow`]
//!
//! Binance returns each candle as a positional array:
//! `[open_time, open, high, low, close, volume, close_time, quote_volume,
//!   trade_count, taker_buy_base, taker_buy_quote, ignore]`.

use serde_json::Value;

use super::{as_list, kind};
use crate::coerce;
use crate::error::SchemaViolation;
use crate::model::{KlineRow, SymbolContext};

pub const KLINE_FIELDS: usize = 12;

pub fn normalize(payload: &Value, ctx: &SymbolContext) -> Result<Vec<KlineRow>, SchemaViolation> {
    as_list(payload, "klines")?
        .iter()
        .enumerate()
        .map(|(row, candle)| normalize_candle(candle, ctx, row))
        .collect()
}

fn normalize_candle(
    candle: &Value,
    ctx: &SymbolContext,
    row: usize,
) -> Result<KlineRow, SchemaViolation> {
    let fields = candle.as_array().ok_or_else(|| {
        SchemaViolation::new(row, "kline", format!("expected array, found {}", kind(candle)))
    })?;

    if fields.len() != KLINE_FIELDS {
        return Err(SchemaViolation::new(
            row,
            "kline",
            format!("expected {} fields, found {}", KLINE_FIELDS, fields.len()),
        ));
    }

    let at = |idx: usize| fields.get(idx);

    // index 11 is Binance's unused "ignore" field
    Ok(KlineRow {
        symbol: ctx.symbol.clone(),
        k_open_time: coerce::instant_ms(at(0), "k_open_time", row)?,
        open: coerce::float(at(1), "open", row)?,
        high: coerce::float(at(2), "high", row)?,
        low: coerce::float(at(3), "low", row)?,
        close: coerce::float(at(4), "close", row)?,
        volume: coerce::float(at(5), "volume", row)?,
        k_close_time: coerce::instant_ms(at(6), "k_close_time", row)?,
        quote_asset_volume: coerce::float(at(7), "quote_asset_volume", row)?,
        number_of_trades: coerce::integer(at(8), "number_of_trades", row)?,
        tb_base_volume: coerce::float(at(9), "tb_base_volume", row)?,
        tb_quote_volume: coerce::float(at(10), "tb_quote_volume", row)?,
        rank: ctx.rank,
        time_collected: ctx.collected_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn ctx() -> SymbolContext {
        SymbolContext {
            symbol: "BTCUSDT".to_string(),
            rank: 3,
            collected_at: Utc.timestamp_millis_opt(1_700_000_400_123).unwrap(),
        }
    }

    fn sample() -> Value {
        json!([
            "1700000000000", "100.0", "110.0", "95.0", "105.0", "1000.0",
            "1700000300000", "105000.0", "50", "400.0", "42000.0", "0"
        ])
    }

    #[test]
    fn test_kline_example_row() {
        let rows = normalize(&json!([sample()]), &ctx()).unwrap();
        assert_eq!(rows.len(), 1);

        let row = &rows[0];
        assert_eq!(row.open, 100.0);
        assert_eq!(row.high, 110.0);
        assert_eq!(row.low, 95.0);
        assert_eq!(row.close, 105.0);
        assert_eq!(row.volume, 1000.0);
        assert_eq!(row.quote_asset_volume, 105000.0);
        assert_eq!(row.number_of_trades, 50);
        assert_eq!(row.tb_base_volume, 400.0);
        assert_eq!(row.tb_quote_volume, 42000.0);
        assert_eq!(row.k_open_time.to_rfc3339(), "2023-11-14T22:13:20+00:00");
        assert_eq!(row.k_close_time.timestamp_millis(), 1_700_000_300_000);
        assert_eq!(row.symbol, "BTCUSDT");
        assert_eq!(row.rank, 3);
        assert_eq!(row.time_collected, ctx().collected_at);
    }

    #[test]
    fn test_native_binance_types() {
        // Real responses carry times and trade counts as JSON numbers.
        let candle = json!([
            1700000000000_i64, "100.0", "110.0", "95.0", "105.0", "1000.0",
            1700000299999_i64, "105000.0", 50, "400.0", "42000.0", "0"
        ]);
        let rows = normalize(&json!([candle]), &ctx()).unwrap();
        assert_eq!(rows[0].k_open_time.timestamp_millis(), 1_700_000_000_000);
        assert_eq!(rows[0].k_close_time.timestamp_millis(), 1_700_000_299_999);
        assert_eq!(rows[0].number_of_trades, 50);
    }

    #[test]
    fn test_preserves_source_order() {
        let mut second = sample();
        second[0] = json!("1700000300000");
        let rows = normalize(&json!([sample(), second]), &ctx()).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].k_open_time < rows[1].k_open_time);
    }

    #[test]
    fn test_bad_field_reports_row_and_field() {
        let mut broken = sample();
        broken[4] = json!("n/a");
        let err = normalize(&json!([sample(), broken]), &ctx()).unwrap_err();
        assert_eq!(err.row, 1);
        assert_eq!(err.field, "close");
    }

    #[test]
    fn test_wrong_arity_is_a_violation() {
        let short = json!(["1700000000000", "100.0"]);
        let err = normalize(&json!([short]), &ctx()).unwrap_err();
        assert_eq!(err.field, "kline");
        assert!(err.reason.contains("expected 12 fields, found 2"));
    }
}
