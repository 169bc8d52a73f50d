//! `SeaORM` Entity, @generated manually

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "recent_trades")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub symbol: String,
    pub trade_time: DateTimeUtc,
    pub trade_id: i64,
    pub price: f64,
    pub qty: f64,
    pub quote_qty: f64,
    pub is_buyer_maker: bool,
    pub is_best_match: bool,
    pub ranking: i32,
    pub time_collected: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
