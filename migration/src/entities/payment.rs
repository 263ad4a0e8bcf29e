//! 付款/捐赠记录实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub payment_recorder_id: String,
    #[sea_orm(column_type = "Double")]
    pub amount: f64,
    pub date: Date,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    /// pending | completed | cancelled
    pub status: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
