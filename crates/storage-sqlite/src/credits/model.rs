//! Database models for member credit.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::utils::{new_id, parse_decimal, parse_enum, timestamp};
use dues_core::credits::{CreditMovement, MemberCredit, NewCreditMovement};
use dues_core::obligations::ObligationRef;
use dues_core::Error;

#[derive(Queryable, Identifiable, Insertable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::member_credits)]
#[diesel(primary_key(member_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MemberCreditDB {
    pub member_id: String,
    pub balance: String,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<MemberCreditDB> for MemberCredit {
    type Error = Error;

    fn try_from(db: MemberCreditDB) -> Result<Self, Self::Error> {
        Ok(MemberCredit {
            balance: parse_decimal(&db.balance, "balance")?,
            member_id: db.member_id,
            updated_at: Some(db.updated_at),
        })
    }
}

#[derive(Queryable, Identifiable, Insertable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::credit_movements)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CreditMovementDB {
    pub id: String,
    pub member_id: String,
    pub amount: String,
    pub kind: String,
    pub obligation_kind: Option<String>,
    pub obligation_id: Option<String>,
    pub payment_id: Option<String>,
    pub note: Option<String>,
    pub created_at: NaiveDateTime,
}

impl TryFrom<CreditMovementDB> for CreditMovement {
    type Error = Error;

    fn try_from(db: CreditMovementDB) -> Result<Self, Self::Error> {
        let obligation = match (db.obligation_kind, db.obligation_id) {
            (Some(kind), Some(id)) => Some(ObligationRef::new(
                parse_enum(&kind, "obligation_kind")?,
                id,
            )),
            _ => None,
        };
        Ok(CreditMovement {
            amount: parse_decimal(&db.amount, "amount")?,
            kind: parse_enum(&db.kind, "kind")?,
            id: db.id,
            member_id: db.member_id,
            obligation,
            payment_id: db.payment_id,
            note: db.note,
            created_at: db.created_at,
        })
    }
}

impl From<NewCreditMovement> for CreditMovementDB {
    fn from(domain: NewCreditMovement) -> Self {
        let (obligation_kind, obligation_id) = match domain.obligation {
            Some(obligation) => (
                Some(obligation.kind.as_str().to_string()),
                Some(obligation.id),
            ),
            None => (None, None),
        };
        Self {
            id: new_id(),
            member_id: domain.member_id,
            amount: domain.amount.to_string(),
            kind: domain.kind.as_str().to_string(),
            obligation_kind,
            obligation_id,
            payment_id: domain.payment_id,
            note: domain.note,
            created_at: timestamp(),
        }
    }
}
