//! Finance records - a club's signed ledger, managed by its managers.

use crate::{
    core::{
        access::{Action, Actor, Resource, authorize},
        club::require_club,
    },
    entities::{FinanceRecord, FinanceRecordColumn, finance_record},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::info;

/// Fields of a new ledger entry.
#[derive(Debug, Clone, Deserialize)]
pub struct NewFinanceRecord {
    /// Signed amount, negative for expenses
    pub amount: Decimal,
    /// Description
    #[serde(default)]
    pub description: String,
    /// Booking date, today when omitted
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

/// Editable ledger fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FinanceRecordUpdate {
    /// New amount
    #[serde(default)]
    pub amount: Option<Decimal>,
    /// New description
    #[serde(default)]
    pub description: Option<String>,
    /// New date
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

/// Ledger amounts are kept to the cent.
const AMOUNT_SCALE: u32 = 2;

/// Largest magnitude that fits ten digits at cent precision.
const MAX_AMOUNT: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

/// Rounds to the cent, half away from zero, and rejects out-of-range amounts.
pub fn normalize_amount(amount: Decimal) -> Result<Decimal> {
    let mut rounded =
        amount.round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointAwayFromZero);
    if rounded.abs() > MAX_AMOUNT {
        return Err(Error::validation("amount must be within ±99999999.99"));
    }
    rounded.rescale(AMOUNT_SCALE);
    Ok(rounded)
}

async fn authorize_manager(db: &DatabaseConnection, actor: &Actor, club_id: i64) -> Result<()> {
    require_club(db, club_id).await?;
    authorize(actor, Action::ManageFinances, Resource::Club { club_id })
}

async fn require_record(
    db: &DatabaseConnection,
    club_id: i64,
    record_id: i64,
) -> Result<finance_record::Model> {
    FinanceRecord::find_by_id(record_id)
        .one(db)
        .await?
        .filter(|r| r.club_id == club_id)
        .ok_or(Error::NotFound {
            resource: "finance record",
            id: record_id,
        })
}

/// A club's ledger, newest first.
pub async fn list_finance_records(
    db: &DatabaseConnection,
    actor: &Actor,
    club_id: i64,
) -> Result<Vec<finance_record::Model>> {
    authorize_manager(db, actor, club_id).await?;
    FinanceRecord::find()
        .filter(FinanceRecordColumn::ClubId.eq(club_id))
        .order_by_desc(FinanceRecordColumn::Date)
        .order_by_desc(FinanceRecordColumn::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// One ledger entry of the club.
pub async fn get_finance_record(
    db: &DatabaseConnection,
    actor: &Actor,
    club_id: i64,
    record_id: i64,
) -> Result<finance_record::Model> {
    authorize_manager(db, actor, club_id).await?;
    require_record(db, club_id, record_id).await
}

/// Books a new entry.
pub async fn record_finance(
    db: &DatabaseConnection,
    actor: &Actor,
    club_id: i64,
    new_record: NewFinanceRecord,
) -> Result<finance_record::Model> {
    authorize_manager(db, actor, club_id).await?;
    let amount = normalize_amount(new_record.amount)?;

    let created = finance_record::ActiveModel {
        club_id: Set(club_id),
        amount: Set(amount),
        description: Set(new_record.description),
        date: Set(new_record
            .date
            .unwrap_or_else(|| chrono::Utc::now().date_naive())),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(record_id = created.id, club_id, %amount, "finance record booked");
    Ok(created)
}

/// Edits an entry.
pub async fn update_finance_record(
    db: &DatabaseConnection,
    actor: &Actor,
    club_id: i64,
    record_id: i64,
    update: FinanceRecordUpdate,
) -> Result<finance_record::Model> {
    authorize_manager(db, actor, club_id).await?;
    let existing = require_record(db, club_id, record_id).await?;

    let mut model: finance_record::ActiveModel = existing.into();
    if let Some(amount) = update.amount {
        model.amount = Set(normalize_amount(amount)?);
    }
    if let Some(description) = update.description {
        model.description = Set(description);
    }
    if let Some(date) = update.date {
        model.date = Set(date);
    }
    model.update(db).await.map_err(Into::into)
}

/// Removes an entry.
pub async fn delete_finance_record(
    db: &DatabaseConnection,
    actor: &Actor,
    club_id: i64,
    record_id: i64,
) -> Result<()> {
    authorize_manager(db, actor, club_id).await?;
    require_record(db, club_id, record_id).await?;
    FinanceRecord::delete_by_id(record_id).exec(db).await?;
    info!(record_id, club_id, "finance record deleted");
    Ok(())
}
