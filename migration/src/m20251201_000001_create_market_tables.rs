use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::DatabaseBackend;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        for table in tables(backend) {
            manager.create_table(table).await?;
        }
        for index in indexes() {
            manager.create_index(index).await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RecentTrades::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(OrderBook::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(KlineData::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Top24hr::Table).to_owned())
            .await
    }
}

/// Millisecond-precision UTC instant column.
///
/// MySQL `TIMESTAMP` has no fractional seconds by default and ends in 2038,
/// so MySQL gets `DATETIME(3)` holding UTC values.
fn instant<T: IntoIden>(column: T, backend: DatabaseBackend) -> ColumnDef {
    let mut def = ColumnDef::new(column);
    match backend {
        DatabaseBackend::MySql => def.custom(Alias::new("datetime(3)")),
        _ => def.timestamp_with_time_zone(),
    };
    def.not_null().to_owned()
}

fn id<T: IntoIden>(column: T) -> ColumnDef {
    ColumnDef::new(column)
        .big_integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

fn tables(backend: DatabaseBackend) -> Vec<TableCreateStatement> {
    vec![
        // 24h ticker stats, one row per ranked symbol per run
        Table::create()
            .table(Top24hr::Table)
            .if_not_exists()
            .col(id(Top24hr::Id))
            .col(ColumnDef::new(Top24hr::Symbol).string_len(32).not_null())
            .col(instant(Top24hr::TimeCollected, backend))
            .col(ColumnDef::new(Top24hr::Ranking).integer().not_null())
            .col(ColumnDef::new(Top24hr::PriceChange).double().not_null())
            .col(ColumnDef::new(Top24hr::PriceChangePercent).double().not_null())
            .col(ColumnDef::new(Top24hr::WeightedAvgPrice).double().not_null())
            .col(ColumnDef::new(Top24hr::PrevClosePrice).double().not_null())
            .col(ColumnDef::new(Top24hr::LastPrice).double().not_null())
            .col(ColumnDef::new(Top24hr::LastQty).double().not_null())
            .col(ColumnDef::new(Top24hr::BidPrice).double().not_null())
            .col(ColumnDef::new(Top24hr::BidQty).double().not_null())
            .col(ColumnDef::new(Top24hr::AskPrice).double().not_null())
            .col(ColumnDef::new(Top24hr::AskQty).double().not_null())
            .col(ColumnDef::new(Top24hr::OpenPrice).double().not_null())
            .col(ColumnDef::new(Top24hr::HighPrice).double().not_null())
            .col(ColumnDef::new(Top24hr::LowPrice).double().not_null())
            .col(ColumnDef::new(Top24hr::Volume).double().not_null())
            .col(ColumnDef::new(Top24hr::QuoteVolume).double().not_null())
            .col(instant(Top24hr::OpenTime, backend))
            .col(instant(Top24hr::CloseTime, backend))
            .col(ColumnDef::new(Top24hr::FirstId).big_integer().not_null())
            .col(ColumnDef::new(Top24hr::LastId).big_integer().not_null())
            .to_owned(),
        // 5m candles
        Table::create()
            .table(KlineData::Table)
            .if_not_exists()
            .col(id(KlineData::Id))
            .col(ColumnDef::new(KlineData::Symbol).string_len(32).not_null())
            .col(instant(KlineData::KOpenTime, backend))
            .col(instant(KlineData::KCloseTime, backend))
            .col(ColumnDef::new(KlineData::Open).double().not_null())
            .col(ColumnDef::new(KlineData::High).double().not_null())
            .col(ColumnDef::new(KlineData::Low).double().not_null())
            .col(ColumnDef::new(KlineData::Close).double().not_null())
            .col(ColumnDef::new(KlineData::Volume).double().not_null())
            .col(ColumnDef::new(KlineData::QuoteAssetVolume).double().not_null())
            .col(ColumnDef::new(KlineData::NumberOfTrades).big_integer().not_null())
            .col(ColumnDef::new(KlineData::TbBaseVolume).double().not_null())
            .col(ColumnDef::new(KlineData::TbQuoteVolume).double().not_null())
            .col(ColumnDef::new(KlineData::Ranking).integer().not_null())
            .col(instant(KlineData::TimeCollected, backend))
            .to_owned(),
        // Depth snapshot levels, grouped by (symbol, side, time_collected)
        Table::create()
            .table(OrderBook::Table)
            .if_not_exists()
            .col(id(OrderBook::Id))
            .col(ColumnDef::new(OrderBook::Symbol).string_len(32).not_null())
            .col(ColumnDef::new(OrderBook::Side).string_len(4).not_null()) // "bids" or "asks"
            .col(instant(OrderBook::TimeCollected, backend))
            .col(ColumnDef::new(OrderBook::Price).double().not_null())
            .col(ColumnDef::new(OrderBook::Quantity).double().not_null())
            .col(ColumnDef::new(OrderBook::Ranking).integer().not_null())
            .to_owned(),
        // Recent trade prints
        Table::create()
            .table(RecentTrades::Table)
            .if_not_exists()
            .col(id(RecentTrades::Id))
            .col(ColumnDef::new(RecentTrades::Symbol).string_len(32).not_null())
            .col(instant(RecentTrades::TradeTime, backend))
            .col(ColumnDef::new(RecentTrades::TradeId).big_integer().not_null())
            .col(ColumnDef::new(RecentTrades::Price).double().not_null())
            .col(ColumnDef::new(RecentTrades::Qty).double().not_null())
            .col(ColumnDef::new(RecentTrades::QuoteQty).double().not_null())
            .col(ColumnDef::new(RecentTrades::IsBuyerMaker).boolean().not_null())
            .col(ColumnDef::new(RecentTrades::IsBestMatch).boolean().not_null())
            .col(ColumnDef::new(RecentTrades::Ranking).integer().not_null())
            .col(instant(RecentTrades::TimeCollected, backend))
            .to_owned(),
    ]
}

fn indexes() -> Vec<IndexCreateStatement> {
    vec![
        Index::create()
            .name("idx_top_24hr_symbol_time")
            .table(Top24hr::Table)
            .col(Top24hr::Symbol)
            .col((Top24hr::TimeCollected, IndexOrder::Desc))
            .to_owned(),
        Index::create()
            .name("idx_kline_data_symbol_open_time")
            .table(KlineData::Table)
            .col(KlineData::Symbol)
            .col((KlineData::KOpenTime, IndexOrder::Desc))
            .to_owned(),
        Index::create()
            .name("idx_order_book_snapshot_price")
            .table(OrderBook::Table)
            .col(OrderBook::Symbol)
            .col(OrderBook::Side)
            .col(OrderBook::TimeCollected)
            .col((OrderBook::Price, IndexOrder::Desc))
            .to_owned(),
        Index::create()
            .name("idx_recent_trades_symbol_time_id")
            .table(RecentTrades::Table)
            .col(RecentTrades::Symbol)
            .col((RecentTrades::TradeTime, IndexOrder::Desc))
            .col((RecentTrades::TradeId, IndexOrder::Desc))
            .to_owned(),
    ]
}

#[derive(DeriveIden)]
enum Top24hr {
    #[sea_orm(iden = "top_24hr")]
    Table,
    Id,
    Symbol,
    TimeCollected,
    Ranking,
    PriceChange,
    PriceChangePercent,
    WeightedAvgPrice,
    PrevClosePrice,
    LastPrice,
    LastQty,
    BidPrice,
    BidQty,
    AskPrice,
    AskQty,
    OpenPrice,
    HighPrice,
    LowPrice,
    Volume,
    QuoteVolume,
    OpenTime,
    CloseTime,
    FirstId,
    LastId,
}

#[derive(DeriveIden)]
enum KlineData {
    Table,
    Id,
    Symbol,
    KOpenTime,
    KCloseTime,
    Open,
    High,
    Low,
    Close,
    Volume,
    QuoteAssetVolume,
    NumberOfTrades,
    TbBaseVolume,
    TbQuoteVolume,
    Ranking,
    TimeCollected,
}

#[derive(DeriveIden)]
enum OrderBook {
    Table,
    Id,
    Symbol,
    Side,
    TimeCollected,
    Price,
    Quantity,
    Ranking,
}

#[derive(DeriveIden)]
enum RecentTrades {
    Table,
    Id,
    Symbol,
    TradeTime,
    TradeId,
    Price,
    Qty,
    QuoteQty,
    IsBuyerMaker,
    IsBestMatch,
    Ranking,
    TimeCollected,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ddl(backend: DatabaseBackend) -> String {
        tables(backend)
            .iter()
            .map(|table| match backend {
                DatabaseBackend::MySql => table.to_string(MysqlQueryBuilder),
                _ => table.to_string(PostgresQueryBuilder),
            })
            .collect::<Vec<_>>()
            .join(";\n")
    }

    #[test]
    fn test_mysql_instants_keep_milliseconds() {
        let sql = ddl(DatabaseBackend::MySql);

        assert!(sql.contains("`trade_time` datetime(3) NOT NULL"), "{}", sql);
        assert!(sql.contains("`k_close_time` datetime(3) NOT NULL"), "{}", sql);
        assert!(sql.contains("`time_collected` datetime(3) NOT NULL"), "{}", sql);
        assert!(!sql.contains(" timestamp "), "{}", sql);
    }

    #[test]
    fn test_postgres_instants_use_timestamptz() {
        let sql = ddl(DatabaseBackend::Postgres);

        assert!(
            sql.contains("\"trade_time\" timestamp with time zone NOT NULL"),
            "{}",
            sql
        );
        assert!(!sql.contains("datetime"), "{}", sql);
    }

    #[test]
    fn test_every_table_has_a_key_index() {
        let statements: Vec<String> = indexes()
            .iter()
            .map(|index| index.to_string(MysqlQueryBuilder))
            .collect();
        assert_eq!(statements.len(), 4);
        assert!(statements[2].contains("`price` DESC"), "{}", statements[2]);
    }
}
