use diesel::prelude::*;
use diesel::SqliteConnection;
use log::debug;
use rust_decimal::Decimal;

use super::model::{CreditMovementDB, MemberCreditDB};
use crate::errors::StorageError;
use crate::schema::{credit_movements, member_credits};
use crate::utils::{parse_decimal, timestamp};
use dues_core::credits::{adjusted_balance, apply_credit_to_settlement, NewCreditMovement};
use dues_core::obligations::Settleable;
use dues_core::Result;

/// Current balance; members without a row have none.
pub(crate) fn load_balance(conn: &mut SqliteConnection, member_id: &str) -> Result<Decimal> {
    let stored: Option<String> = member_credits::table
        .find(member_id)
        .select(member_credits::balance)
        .first(conn)
        .optional()
        .map_err(StorageError::from)?;
    match stored {
        Some(balance) => parse_decimal(&balance, "balance"),
        None => Ok(Decimal::ZERO),
    }
}

/// Appends a movement and moves the balance by its amount.
///
/// Fails with `Precondition` when the balance would go negative.
pub(crate) fn book_movement(
    conn: &mut SqliteConnection,
    movement: NewCreditMovement,
) -> Result<MemberCreditDB> {
    let current = load_balance(conn, &movement.member_id)?;
    let next = adjusted_balance(current, movement.amount)?;

    let row = CreditMovementDB::from(movement);
    diesel::insert_into(credit_movements::table)
        .values(&row)
        .execute(conn)
        .map_err(StorageError::from)?;

    let credit = MemberCreditDB {
        member_id: row.member_id,
        balance: next.to_string(),
        updated_at: timestamp(),
    };
    diesel::insert_into(member_credits::table)
        .values(&credit)
        .on_conflict(member_credits::member_id)
        .do_update()
        .set((
            member_credits::balance.eq(&credit.balance),
            member_credits::updated_at.eq(credit.updated_at),
        ))
        .execute(conn)
        .map_err(StorageError::from)?;
    Ok(credit)
}

/// Settles as much of `target` as the owner's credit covers and books the
/// consumption. Returns the amount consumed.
pub(crate) fn settle_from_credit<T: Settleable>(
    conn: &mut SqliteConnection,
    target: &mut T,
) -> Result<Decimal> {
    let member_id = target.owner_id().to_string();
    let balance = load_balance(conn, &member_id)?;
    if balance <= Decimal::ZERO {
        return Ok(Decimal::ZERO);
    }

    let mut settlement = target.settlement();
    let application = apply_credit_to_settlement(balance, &mut settlement);
    if application.consumed.is_zero() {
        return Ok(Decimal::ZERO);
    }
    target.set_settlement(settlement);

    let reference = target.obligation_ref();
    debug!(
        "Consuming {} of credit from {} for {} {}",
        application.consumed, member_id, reference.kind, reference.id
    );
    book_movement(
        conn,
        NewCreditMovement::consumption(&member_id, application.consumed, Some(reference)),
    )?;
    Ok(application.consumed)
}
