//! Repository tests against a real SQLite file with migrations applied.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use diesel::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tempfile::TempDir;

use dues_core::credits::{CreditAdjustment, CreditMovementKind, CreditRepositoryTrait};
use dues_core::debts::{DebtRepositoryTrait, NewInitialDebt};
use dues_core::due_types::{DueTypeRepositoryTrait, NewDueType};
use dues_core::members::{Member, MemberDirectoryTrait};
use dues_core::obligations::{
    NewMemberObligation, ObligationBatch, ObligationPatch, ObligationRepositoryTrait,
    ObligationStatus,
};
use dues_core::payments::{NewPayment, PaymentMethod, PaymentRepositoryTrait};
use dues_core::period_dues::{NewPeriodDue, PeriodDueRepositoryTrait};
use dues_core::settings::OverpaymentPolicy;
use dues_core::errors::DatabaseError;
use dues_core::{Error, Period, Role};
use dues_storage_sqlite::audit::AuditRepository;
use dues_storage_sqlite::schema::member_obligations;
use dues_storage_sqlite::{
    create_pool, get_connection, init, run_migrations, spawn_writer, CreditRepository,
    DbPool, DebtRepository, DueTypeRepository, MemberRepository, ObligationRepository,
    PaymentRepository, PeriodDueRepository, WriteHandle,
};

struct Fixture {
    _dir: TempDir,
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl Fixture {
    fn new() -> Self {
        Self::with_timeout(Duration::from_secs(5))
    }

    fn with_timeout(timeout: Duration) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("dues.db");
        let db_path = init(db_path.to_str().unwrap()).unwrap();
        let pool = create_pool(&db_path).unwrap();
        run_migrations(&pool).unwrap();
        let writer = spawn_writer(pool.as_ref().clone(), timeout);
        Self {
            _dir: dir,
            pool,
            writer,
        }
    }

    fn members(&self) -> MemberRepository {
        MemberRepository::new(self.pool.clone(), self.writer.clone())
    }

    fn obligations(&self) -> ObligationRepository {
        ObligationRepository::new(self.pool.clone(), self.writer.clone())
    }

    fn credits(&self) -> CreditRepository {
        CreditRepository::new(self.pool.clone(), self.writer.clone())
    }

    fn payments(&self) -> PaymentRepository {
        PaymentRepository::new(self.pool.clone(), self.writer.clone())
    }

    fn debts(&self) -> DebtRepository {
        DebtRepository::new(self.pool.clone(), self.writer.clone())
    }

    fn period_dues(&self) -> PeriodDueRepository {
        PeriodDueRepository::new(self.pool.clone(), self.writer.clone())
    }

    async fn add_member(&self, id: &str, name: &str) {
        self.members()
            .upsert_member(Member {
                id: id.to_string(),
                display_name: name.to_string(),
                role: Role::Member,
                is_active: true,
            })
            .await
            .unwrap();
    }

    /// Members m1..m3, a flat fee of 15.00 opened for March 2024.
    async fn seeded() -> (Self, String) {
        let fixture = Self::new();
        for (id, name) in [("m1", "Awa"), ("m2", "Binta"), ("m3", "Coumba")] {
            fixture.add_member(id, name).await;
        }
        let fee = DueTypeRepository::new(fixture.pool.clone(), fixture.writer.clone())
            .create(NewDueType {
                name: "Monthly Fee".to_string(),
                description: None,
                unit_amount: dec!(15.00),
                mandatory: true,
                active: true,
                display_order: 0,
                requires_beneficiary: false,
            })
            .await
            .unwrap();
        let period_due = fixture
            .period_dues()
            .create(NewPeriodDue {
                period: march(),
                due_type_id: fee.id,
                base_amount: dec!(15.00),
                beneficiary_member_id: None,
                due_date: NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
            })
            .await
            .unwrap();
        (fixture, period_due.id)
    }
}

fn march() -> Period {
    Period::new(2024, 3).unwrap()
}

fn batch(period_due_id: &str, member_ids: &[&str], allow_existing: bool) -> ObligationBatch {
    let period = march();
    ObligationBatch {
        period,
        allow_existing,
        obligations: member_ids
            .iter()
            .map(|member_id| NewMemberObligation {
                period,
                due_type_id: "ignored".to_string(),
                member_id: member_id.to_string(),
                amount_expected: dec!(15.00),
                due_date: NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
                description: "Monthly Fee: 15.00\nTotal 2024-03: 15.00".to_string(),
                source_period_due_id: period_due_id.to_string(),
                created_by: "admin".to_string(),
            })
            .collect(),
    }
}

/// Batches reference the real due type of the flat fee.
async fn fee_batch(
    fixture: &Fixture,
    period_due_id: &str,
    member_ids: &[&str],
    allow_existing: bool,
) -> ObligationBatch {
    let due_type_id = fixture
        .period_dues()
        .get_by_id(period_due_id)
        .unwrap()
        .due_type_id;
    let mut batch = batch(period_due_id, member_ids, allow_existing);
    for obligation in &mut batch.obligations {
        obligation.due_type_id = due_type_id.clone();
    }
    batch
}

fn count_rows(pool: &DbPool) -> i64 {
    let mut conn = get_connection(pool).unwrap();
    member_obligations::table
        .count()
        .get_result(&mut conn)
        .unwrap()
}

#[tokio::test]
async fn test_second_active_flat_fee_is_rejected_by_the_index() {
    let (fixture, first_id) = Fixture::seeded().await;
    let fee = fixture.period_dues().get_by_id(&first_id).unwrap();

    let duplicate = fixture
        .period_dues()
        .create(NewPeriodDue {
            period: march(),
            due_type_id: fee.due_type_id.clone(),
            base_amount: dec!(20.00),
            beneficiary_member_id: None,
            due_date: fee.due_date,
        })
        .await;
    assert!(matches!(
        duplicate,
        Err(Error::Database(DatabaseError::UniqueViolation(_)))
    ));

    let listed = fixture.period_dues().list_for_period(&march()).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].due_type_name, "Monthly Fee");
}

#[tokio::test]
async fn test_batch_consumes_credit_and_books_movements() {
    let (fixture, period_due_id) = Fixture::seeded().await;
    fixture
        .credits()
        .adjust_balance(
            "m1",
            CreditAdjustment {
                amount: dec!(20.00),
                note: Some("prepaid".to_string()),
            },
        )
        .await
        .unwrap();

    let outcome = fixture
        .obligations()
        .insert_period_batch(fee_batch(&fixture, &period_due_id, &["m1", "m2"], false).await)
        .await
        .unwrap();
    assert_eq!(outcome.created.len(), 2);
    assert_eq!(outcome.credit_applied_count, 1);

    let settled = outcome.created.iter().find(|o| o.member_id == "m1").unwrap();
    assert_eq!(settled.amount_paid, dec!(15.00));
    assert_eq!(settled.amount_remaining, Decimal::ZERO);
    assert_eq!(settled.status, ObligationStatus::Paid);

    assert_eq!(fixture.credits().get_balance("m1").unwrap().balance, dec!(5.00));
    let movements = fixture.credits().list_movements("m1").unwrap();
    assert_eq!(movements.len(), 2);
    let consumption = movements
        .iter()
        .find(|m| m.kind == CreditMovementKind::Consumption)
        .unwrap();
    assert_eq!(consumption.amount, dec!(-15.00));
    assert_eq!(
        consumption.obligation.as_ref().map(|o| o.id.as_str()),
        Some(settled.id.as_str())
    );
}

#[tokio::test]
async fn test_concurrent_generation_creates_one_set() {
    let (fixture, period_due_id) = Fixture::seeded().await;
    let first = fee_batch(&fixture, &period_due_id, &["m1", "m2", "m3"], false).await;
    let second = first.clone();
    let repository_a = fixture.obligations();
    let repository_b = fixture.obligations();

    let (a, b) = tokio::join!(
        repository_a.insert_period_batch(first),
        repository_b.insert_period_batch(second)
    );
    let conflicts = [&a, &b]
        .iter()
        .filter(|r| matches!(r, Err(Error::Conflict(_))))
        .count();
    assert_eq!(conflicts, 1);
    assert_eq!(count_rows(&fixture.pool), 3);
}

#[tokio::test]
async fn test_resume_skips_existing_rows() {
    let (fixture, period_due_id) = Fixture::seeded().await;
    fixture
        .obligations()
        .insert_period_batch(fee_batch(&fixture, &period_due_id, &["m1", "m2"], false).await)
        .await
        .unwrap();

    let outcome = fixture
        .obligations()
        .insert_period_batch(
            fee_batch(&fixture, &period_due_id, &["m1", "m2", "m3"], true).await,
        )
        .await
        .unwrap();
    assert_eq!(outcome.created.len(), 1);
    assert_eq!(outcome.skipped_duplicates, 2);
    assert_eq!(count_rows(&fixture.pool), 3);
}

#[tokio::test]
async fn test_partial_payment_and_overpayment() {
    let (fixture, period_due_id) = Fixture::seeded().await;
    let outcome = fixture
        .obligations()
        .insert_period_batch(fee_batch(&fixture, &period_due_id, &["m1"], false).await)
        .await
        .unwrap();
    let obligation_id = outcome.created[0].id.clone();

    let payment = |amount: Decimal| NewPayment {
        member_id: "m1".to_string(),
        amount,
        payment_date: NaiveDate::from_ymd_opt(2024, 3, 12).unwrap(),
        method: PaymentMethod::Cash,
        reference: None,
        description: None,
        member_obligation_id: Some(obligation_id.clone()),
        initial_debt_id: None,
        assistance_id: None,
    };

    fixture
        .payments()
        .record(payment(dec!(10.00)), "admin", OverpaymentPolicy::ConvertToCredit)
        .await
        .unwrap();
    let partial = fixture.obligations().get_by_id(&obligation_id).unwrap();
    assert_eq!(partial.amount_paid, dec!(10.00));
    assert_eq!(partial.amount_remaining, dec!(5.00));
    assert_eq!(partial.status, ObligationStatus::PartiallyPaid);

    let rejected = fixture
        .payments()
        .record(payment(dec!(8.00)), "admin", OverpaymentPolicy::Reject)
        .await;
    assert!(matches!(rejected, Err(Error::InvalidArgument(_))));

    let over = fixture
        .payments()
        .record(payment(dec!(8.00)), "admin", OverpaymentPolicy::ConvertToCredit)
        .await
        .unwrap();
    assert_eq!(over.credited_amount, dec!(3.00));
    assert_eq!(fixture.credits().get_balance("m1").unwrap().balance, dec!(3.00));
    assert_eq!(fixture.payments().list_for_member("m1").unwrap().len(), 2);

    let paid = fixture.obligations().get_by_id(&obligation_id).unwrap();
    assert_eq!(paid.status, ObligationStatus::Paid);
    assert_eq!(paid.amount_paid + paid.amount_remaining, paid.amount_expected);

    let again = fixture
        .payments()
        .record(payment(dec!(1.00)), "admin", OverpaymentPolicy::ConvertToCredit)
        .await;
    assert!(matches!(again, Err(Error::Precondition(_))));
}

#[tokio::test]
async fn test_reprice_refunds_and_cancel_rules() {
    let (fixture, period_due_id) = Fixture::seeded().await;
    let outcome = fixture
        .obligations()
        .insert_period_batch(fee_batch(&fixture, &period_due_id, &["m1", "m2"], false).await)
        .await
        .unwrap();
    let m1 = outcome.created.iter().find(|o| o.member_id == "m1").unwrap();
    let m2 = outcome.created.iter().find(|o| o.member_id == "m2").unwrap();

    fixture
        .payments()
        .record(
            NewPayment {
                member_id: "m1".to_string(),
                amount: dec!(15.00),
                payment_date: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
                method: PaymentMethod::Transfer,
                reference: Some("TX-1".to_string()),
                description: None,
                member_obligation_id: Some(m1.id.clone()),
                initial_debt_id: None,
                assistance_id: None,
            },
            "admin",
            OverpaymentPolicy::ConvertToCredit,
        )
        .await
        .unwrap();

    let repriced = fixture
        .obligations()
        .update_with_patch(
            &m1.id,
            ObligationPatch {
                amount_expected: Some(dec!(12.00)),
                ..Default::default()
            },
            OverpaymentPolicy::ConvertToCredit,
        )
        .await
        .unwrap();
    assert_eq!(repriced.amount_paid, dec!(12.00));
    assert_eq!(repriced.status, ObligationStatus::Paid);
    assert_eq!(fixture.credits().get_balance("m1").unwrap().balance, dec!(3.00));

    let paid_cancel = fixture.obligations().cancel(&m1.id).await;
    assert!(matches!(paid_cancel, Err(Error::Precondition(_))));

    let cancelled = fixture.obligations().cancel(&m2.id).await.unwrap();
    assert_eq!(cancelled.status, ObligationStatus::Cancelled);
    assert!(fixture.obligations().list_open_for_member("m2").unwrap().is_empty());
}

#[tokio::test]
async fn test_initial_debt_settles_from_credit() {
    let fixture = Fixture::new();
    fixture.add_member("m1", "Awa").await;
    fixture
        .credits()
        .adjust_balance(
            "m1",
            CreditAdjustment {
                amount: dec!(4.00),
                note: None,
            },
        )
        .await
        .unwrap();

    let debt = fixture
        .debts()
        .create_initial_debt(
            NewInitialDebt {
                member_id: "m1".to_string(),
                description: "Balance carried over".to_string(),
                amount: dec!(10.00),
            },
            "admin",
        )
        .await
        .unwrap();
    assert_eq!(debt.amount_paid, dec!(4.00));
    assert_eq!(debt.status, ObligationStatus::PartiallyPaid);
    assert_eq!(fixture.debts().list_initial_debts("m1", true).unwrap().len(), 1);

    let overdraw = fixture
        .credits()
        .adjust_balance(
            "m1",
            CreditAdjustment {
                amount: dec!(-1.00),
                note: None,
            },
        )
        .await;
    assert!(matches!(overdraw, Err(Error::Precondition(_))));
}

#[tokio::test]
async fn test_audit_entries_are_persisted() {
    use dues_core::audit::{AuditSinkTrait, NewAuditEntry};
    use dues_core::Caller;

    let fixture = Fixture::new();
    let audit = AuditRepository::new(fixture.pool.clone(), fixture.writer.clone());
    audit
        .record(
            NewAuditEntry::new(&Caller::admin("a1"), "adjust", "member_credit", "m1")
                .with_details("20.00"),
        )
        .await
        .unwrap();
    let entries = audit.list_for_entity("member_credit", "m1").unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].details.as_deref(), Some("20.00"));
}

#[tokio::test]
async fn test_expired_write_is_not_applied() {
    let fixture = Fixture::with_timeout(Duration::ZERO);
    let result = fixture
        .members()
        .upsert_member(Member {
            id: "m1".to_string(),
            display_name: "Awa".to_string(),
            role: Role::Member,
            is_active: true,
        })
        .await;
    assert!(matches!(
        result,
        Err(Error::Database(DatabaseError::Timeout(_)))
    ));

    // Let the writer drain the expired job.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(matches!(
        fixture.members().get_member("m1"),
        Err(Error::NotFound(_))
    ));
}

#[tokio::test]
async fn due_type_in_use_cannot_be_deleted() {
    let (fixture, period_due_id) = Fixture::seeded().await;
    let due_types = DueTypeRepository::new(fixture.pool.clone(), fixture.writer.clone());
    let fee_id = fixture
        .period_dues()
        .get_by_id(&period_due_id)
        .unwrap()
        .due_type_id;

    match due_types.delete(&fee_id).await {
        Err(Error::Conflict(message)) => assert!(message.contains("used by 1 ")),
        other => panic!("Expected Conflict, got {:?}", other),
    }

    let unused = due_types
        .create(NewDueType {
            name: "Burial Fund".to_string(),
            description: None,
            unit_amount: dec!(5.00),
            mandatory: false,
            active: true,
            display_order: 1,
            requires_beneficiary: true,
        })
        .await
        .unwrap();
    assert_eq!(due_types.delete(&unused.id).await.unwrap(), 1);
    assert_eq!(due_types.list().unwrap().len(), 1);
}

#[tokio::test]
async fn slow_write_past_timeout_reports_its_outcome() {
    use chrono::Utc;
    use dues_storage_sqlite::schema::members;

    let fixture = Fixture::with_timeout(Duration::from_millis(200));
    let inserted = fixture
        .writer
        .exec(|conn: &mut SqliteConnection| -> dues_core::Result<usize> {
            std::thread::sleep(Duration::from_millis(400));
            let now = Utc::now().naive_utc();
            diesel::insert_into(members::table)
                .values((
                    members::id.eq("late"),
                    members::display_name.eq("Late Writer"),
                    members::role.eq("MEMBER"),
                    members::is_active.eq(true),
                    members::created_at.eq(now),
                    members::updated_at.eq(now),
                ))
                .execute(conn)
                .map_err(|e| Error::Database(DatabaseError::Internal(e.to_string())))
        })
        .await;
    assert_eq!(inserted.unwrap(), 1);
    assert_eq!(
        fixture.members().get_member("late").unwrap().display_name,
        "Late Writer"
    );
}

#[tokio::test]
async fn period_catalog_orders_ties_by_due_type_name() {
    let (fixture, _) = Fixture::seeded().await;
    let due_types = DueTypeRepository::new(fixture.pool.clone(), fixture.writer.clone());

    for (name, beneficiary) in [("Zakat Fund", "m1"), ("Burial Fund", "m2")] {
        let due_type = due_types
            .create(NewDueType {
                name: name.to_string(),
                description: None,
                unit_amount: dec!(5.00),
                mandatory: false,
                active: true,
                display_order: 1,
                requires_beneficiary: true,
            })
            .await
            .unwrap();
        fixture
            .period_dues()
            .create(NewPeriodDue {
                period: march(),
                due_type_id: due_type.id,
                base_amount: dec!(5.00),
                beneficiary_member_id: Some(beneficiary.to_string()),
                due_date: NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
            })
            .await
            .unwrap();
    }

    let names: Vec<String> = fixture
        .period_dues()
        .list_for_period(&march())
        .unwrap()
        .into_iter()
        .map(|d| d.due_type_name)
        .collect();
    assert_eq!(names, ["Monthly Fee", "Burial Fund", "Zakat Fund"]);
}

#[tokio::test]
async fn explicit_status_survives_credit_settlement() {
    let (fixture, period_due_id) = Fixture::seeded().await;
    let outcome = fixture
        .obligations()
        .insert_period_batch(fee_batch(&fixture, &period_due_id, &["m1"], false).await)
        .await
        .unwrap();
    let obligation = &outcome.created[0];
    fixture
        .credits()
        .adjust_balance(
            "m1",
            CreditAdjustment {
                amount: dec!(4.00),
                note: None,
            },
        )
        .await
        .unwrap();

    let patched = fixture
        .obligations()
        .update_with_patch(
            &obligation.id,
            ObligationPatch {
                amount_expected: Some(dec!(20.00)),
                status: Some(ObligationStatus::Overdue),
                ..Default::default()
            },
            OverpaymentPolicy::ConvertToCredit,
        )
        .await
        .unwrap();
    assert_eq!(patched.amount_paid, dec!(4.00));
    assert_eq!(patched.amount_remaining, dec!(16.00));
    assert_eq!(patched.status, ObligationStatus::Overdue);
    assert_eq!(fixture.credits().get_balance("m1").unwrap().balance, Decimal::ZERO);
}
