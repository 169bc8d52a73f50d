//! `SeaORM` entities for the four collection tables.
//!
//! Every table is append-only. The surrogate `id` is the only unique key; the
//! natural keys are covered by non-unique indexes created in the migrations.

pub mod kline_data;
pub mod order_book;
pub mod recent_trades;
pub mod top_24hr;

pub mod prelude {
    pub use super::kline_data::Entity as KlineData;
    pub use super::order_book::Entity as OrderBook;
    pub use super::recent_trades::Entity as RecentTrades;
    pub use super::top_24hr::Entity as Top24hr;
}
