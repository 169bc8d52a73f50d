//! SeaORM-backed store

use async_trait::async_trait;
use sea_orm::{ActiveValue, DatabaseConnection, DbErr, EntityTrait};
use shared::entity::{kline_data, order_book, recent_trades, top_24hr};
use tracing::debug;

use crate::error::PersistenceError;
use crate::model::{KlineRow, OrderBookLevelRow, RowBatch, Ticker24hrRow, TradeRow};
use crate::persist::{Persister, RowCount};

/// Appends batches with one multi-row `INSERT` per call over a single shared connection.
///
/// Not `Clone`: share it as `Arc<dyn Persister>`.
#[derive(Debug)]
pub struct SeaOrmStore {
    db: DatabaseConnection,
}

impl SeaOrmStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn insert(&self, batch: &RowBatch) -> Result<RowCount, DbErr> {
        match batch {
            RowBatch::Ticker24hr(rows) => {
                top_24hr::Entity::insert_many(rows.iter().map(ticker_model))
                    .exec_without_returning(&self.db)
                    .await
            }
            RowBatch::Kline(rows) => {
                kline_data::Entity::insert_many(rows.iter().map(kline_model))
                    .exec_without_returning(&self.db)
                    .await
            }
            RowBatch::OrderBook(rows) => {
                order_book::Entity::insert_many(rows.iter().map(order_book_model))
                    .exec_without_returning(&self.db)
                    .await
            }
            RowBatch::Trades(rows) => {
                recent_trades::Entity::insert_many(rows.iter().map(trade_model))
                    .exec_without_returning(&self.db)
                    .await
            }
        }
    }
}

#[async_trait]
impl Persister for SeaOrmStore {
    async fn append(&self, batch: &RowBatch) -> Result<RowCount, PersistenceError> {
        if batch.is_empty() {
            return Ok(0);
        }

        let written = self.insert(batch).await.map_err(|source| PersistenceError {
            table: batch.table_name(),
            rows: batch.len(),
            source,
        })?;

        debug!("Appended {} rows to {}", written, batch.table_name());
        Ok(written)
    }
}

fn ticker_model(row: &Ticker24hrRow) -> top_24hr::ActiveModel {
    top_24hr::ActiveModel {
        symbol: ActiveValue::Set(row.symbol.clone()),
        time_collected: ActiveValue::Set(row.time_collected),
        ranking: ActiveValue::Set(row.rank),
        price_change: ActiveValue::Set(row.price_change),
        price_change_percent: ActiveValue::Set(row.price_change_percent),
        weighted_avg_price: ActiveValue::Set(row.weighted_avg_price),
        prev_close_price: ActiveValue::Set(row.prev_close_price),
        last_price: ActiveValue::Set(row.last_price),
        last_qty: ActiveValue::Set(row.last_qty),
        bid_price: ActiveValue::Set(row.bid_price),
        bid_qty: ActiveValue::Set(row.bid_qty),
        ask_price: ActiveValue::Set(row.ask_price),
        ask_qty: ActiveValue::Set(row.ask_qty),
        open_price: ActiveValue::Set(row.open_price),
        high_price: ActiveValue::Set(row.high_price),
        low_price: ActiveValue::Set(row.low_price),
        volume: ActiveValue::Set(row.volume),
        quote_volume: ActiveValue::Set(row.quote_volume),
        open_time: ActiveValue::Set(row.open_time),
        close_time: ActiveValue::Set(row.close_time),
        first_id: ActiveValue::Set(row.first_id),
        last_id: ActiveValue::Set(row.last_id),
        ..Default::default()
    }
}

fn kline_model(row: &KlineRow) -> kline_data::ActiveModel {
    kline_data::ActiveModel {
        symbol: ActiveValue::Set(row.symbol.clone()),
        k_open_time: ActiveValue::Set(row.k_open_time),
        k_close_time: ActiveValue::Set(row.k_close_time),
        open: ActiveValue::Set(row.open),
        high: ActiveValue::Set(row.high),
        low: ActiveValue::Set(row.low),
        close: ActiveValue::Set(row.close),
        volume: ActiveValue::Set(row.volume),
        quote_asset_volume: ActiveValue::Set(row.quote_asset_volume),
        number_of_trades: ActiveValue::Set(row.number_of_trades),
        tb_base_volume: ActiveValue::Set(row.tb_base_volume),
        tb_quote_volume: ActiveValue::Set(row.tb_quote_volume),
        ranking: ActiveValue::Set(row.rank),
        time_collected: ActiveValue::Set(row.time_collected),
        ..Default::default()
    }
}

fn order_book_model(row: &OrderBookLevelRow) -> order_book::ActiveModel {
    order_book::ActiveModel {
        symbol: ActiveValue::Set(row.symbol.clone()),
        side: ActiveValue::Set(row.side.as_str().to_string()),
        time_collected: ActiveValue::Set(row.time_collected),
        price: ActiveValue::Set(row.price),
        quantity: ActiveValue::Set(row.quantity),
        ranking: ActiveValue::Set(row.rank),
        ..Default::default()
    }
}

fn trade_model(row: &TradeRow) -> recent_trades::ActiveModel {
    recent_trades::ActiveModel {
        symbol: ActiveValue::Set(row.symbol.clone()),
        trade_time: ActiveValue::Set(row.trade_time),
        trade_id: ActiveValue::Set(row.trade_id),
        price: ActiveValue::Set(row.price),
        qty: ActiveValue::Set(row.qty),
        quote_qty: ActiveValue::Set(row.quote_qty),
        is_buyer_maker: ActiveValue::Set(row.is_buyer_maker),
        is_best_match: ActiveValue::Set(row.is_best_match),
        ranking: ActiveValue::Set(row.rank),
        time_collected: ActiveValue::Set(row.time_collected),
        ..Default::default()
    }
}
