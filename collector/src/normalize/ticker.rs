//! 24h ticker objects → [`Ticker24hrRow`]

use serde_json::Value;

use super::kind;
use crate::coerce;
use crate::error::SchemaViolation;
use crate::model::{SymbolContext, Ticker24hrRow};

/// Normalize one 24h ticker object, taken from the bulk list or a
/// `?symbol=` request. `row` is the ticker's position in its source list.
pub fn normalize_one(
    payload: &Value,
    ctx: &SymbolContext,
    row: usize,
) -> Result<Ticker24hrRow, SchemaViolation> {
    if !payload.is_object() {
        return Err(SchemaViolation::new(
            row,
            "ticker",
            format!("expected object, found {}", kind(payload)),
        ));
    }
    let field = |key: &str| payload.get(key);

    let symbol = coerce::text(field("symbol"), "symbol", row)?;
    if symbol != ctx.symbol {
        return Err(SchemaViolation::new(
            row,
            "symbol",
            format!(
                "ticker is for {} but rank {} belongs to {}",
                symbol, ctx.rank, ctx.symbol
            ),
        ));
    }

    Ok(Ticker24hrRow {
        symbol: ctx.symbol.clone(),
        rank: ctx.rank,
        time_collected: ctx.collected_at,
        price_change: coerce::float(field("priceChange"), "price_change", row)?,
        price_change_percent: coerce::float(
            field("priceChangePercent"),
            "price_change_percent",
            row,
        )?,
        weighted_avg_price: coerce::float(field("weightedAvgPrice"), "weighted_avg_price", row)?,
        prev_close_price: coerce::float(field("prevClosePrice"), "prev_close_price", row)?,
        last_price: coerce::float(field("lastPrice"), "last_price", row)?,
        last_qty: coerce::float(field("lastQty"), "last_qty", row)?,
        bid_price: coerce::float(field("bidPrice"), "bid_price", row)?,
        bid_qty: coerce::float(field("bidQty"), "bid_qty", row)?,
        ask_price: coerce::float(field("askPrice"), "ask_price", row)?,
        ask_qty: coerce::float(field("askQty"), "ask_qty", row)?,
        open_price: coerce::float(field("openPrice"), "open_price", row)?,
        high_price: coerce::float(field("highPrice"), "high_price", row)?,
        low_price: coerce::float(field("lowPrice"), "low_price", row)?,
        volume: coerce::float(field("volume"), "volume", row)?,
        quote_volume: coerce::float(field("quoteVolume"), "quote_volume", row)?,
        open_time: coerce::instant_ms(field("openTime"), "open_time", row)?,
        close_time: coerce::instant_ms(field("closeTime"), "close_time", row)?,
        first_id: coerce::integer(field("firstId"), "first_id", row)?,
        last_id: coerce::integer(field("lastId"), "last_id", row)?,
    })
}
