//! Finance record entity - a single signed ledger entry of a club.
//!
//! Positive amounts are income, negative amounts are expenses; there is no
//! separate direction column.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Finance record database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "finance_records")]
pub struct Model {
    /// Unique identifier for the record
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning club
    #[sea_orm(indexed)]
    pub club_id: i64,
    /// Signed amount in cents precision (positive for income, negative for spending)
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub amount: Decimal,
    /// Human-readable description of the entry
    pub description: String,
    /// Booking date
    pub date: Date,
}

/// Defines relationships between `FinanceRecord` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each record belongs to one club
    #[sea_orm(
        belongs_to = "super::club::Entity",
        from = "Column::ClubId",
        to = "super::club::Column::Id",
        on_delete = "Cascade"
    )]
    Club,
}

impl Related<super::club::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Club.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
