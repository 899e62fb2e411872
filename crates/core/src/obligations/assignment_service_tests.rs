#[cfg(test)]
mod tests {
    use crate::access::{Caller, Role};
    use crate::audit::LogAuditSink;
    use crate::credits::apply_credit_to_settlement;
    use crate::errors::{Error, Result};
    use crate::events::{DomainEvent, RecordingEventSink};
    use crate::members::{Member, MemberDirectoryTrait};
    use crate::obligations::{
        BatchInsertOutcome, DueAssignmentService, DueAssignmentServiceTrait, GenerationRequest,
        MemberObligation, ObligationBatch, ObligationPatch, ObligationRepositoryTrait,
        ObligationStatus, Settleable, StandardDueCalculator,
    };
    use crate::period_dues::{
        NewPeriodDue, PeriodDue, PeriodDueDetails, PeriodDueRepositoryTrait, PeriodDueStatus,
    };
    use crate::settings::{AssistancePolicy, OverpaymentPolicy};
    use crate::utils::period::Period;
    use async_trait::async_trait;
    use chrono::{NaiveDate, NaiveDateTime};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    // --- Mock PeriodDueRepository (fixed catalog) ---
    #[derive(Clone, Default)]
    struct MockPeriodDueRepository {
        catalog: Arc<Mutex<Vec<PeriodDueDetails>>>,
    }

    impl MockPeriodDueRepository {
        fn add(&self, id: &str, name: &str, amount: Decimal, beneficiary: Option<(&str, &str)>) {
            let mut catalog = self.catalog.lock().unwrap();
            let order = catalog.len() as i32;
            catalog.push(PeriodDueDetails {
                period_due: PeriodDue {
                    id: id.to_string(),
                    period: march(),
                    due_type_id: format!("type-{}", id),
                    base_amount: amount,
                    beneficiary_member_id: beneficiary.map(|(id, _)| id.to_string()),
                    due_date: NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
                    status: PeriodDueStatus::Active,
                    created_at: NaiveDateTime::default(),
                    updated_at: NaiveDateTime::default(),
                },
                due_type_name: name.to_string(),
                display_order: order,
                requires_beneficiary: beneficiary.is_some(),
                beneficiary_name: beneficiary.map(|(_, name)| name.to_string()),
            });
        }
    }

    #[async_trait]
    impl PeriodDueRepositoryTrait for MockPeriodDueRepository {
        fn get_by_id(&self, period_due_id: &str) -> Result<PeriodDue> {
            Err(Error::not_found("Period due", period_due_id))
        }

        fn list_for_period(&self, period: &Period) -> Result<Vec<PeriodDueDetails>> {
            Ok(self
                .catalog
                .lock()
                .unwrap()
                .iter()
                .filter(|d| &d.period_due.period == period)
                .cloned()
                .collect())
        }

        async fn create(&self, _new_period_due: NewPeriodDue) -> Result<PeriodDue> {
            unimplemented!()
        }

        async fn cancel(&self, _period_due_id: &str) -> Result<PeriodDue> {
            unimplemented!()
        }
    }

    // --- Mock MemberDirectory ---
    #[derive(Clone, Default)]
    struct MockMemberDirectory {
        members: Arc<Mutex<Vec<Member>>>,
    }

    impl MockMemberDirectory {
        fn add(&self, id: &str, name: &str, role: Role, is_active: bool) {
            self.members.lock().unwrap().push(Member {
                id: id.to_string(),
                display_name: name.to_string(),
                role,
                is_active,
            });
        }
    }

    #[async_trait]
    impl MemberDirectoryTrait for MockMemberDirectory {
        fn get_member(&self, member_id: &str) -> Result<Member> {
            self.members
                .lock()
                .unwrap()
                .iter()
                .find(|m| m.id == member_id)
                .cloned()
                .ok_or_else(|| Error::not_found("Member", member_id))
        }

        fn list_members(&self, active_only: bool) -> Result<Vec<Member>> {
            let mut members: Vec<Member> = self
                .members
                .lock()
                .unwrap()
                .iter()
                .filter(|m| !active_only || m.is_active)
                .cloned()
                .collect();
            members.sort_by(|a, b| a.display_name.cmp(&b.display_name));
            Ok(members)
        }

        async fn upsert_member(&self, member: Member) -> Result<Member> {
            Ok(member)
        }
    }

    // --- Mock ObligationRepository with member credit ---
    #[derive(Clone, Default)]
    struct MockObligationRepository {
        obligations: Arc<Mutex<Vec<MemberObligation>>>,
        credits: Arc<Mutex<HashMap<String, Decimal>>>,
    }

    impl MockObligationRepository {
        fn credit_of(&self, member_id: &str) -> Decimal {
            self.credits
                .lock()
                .unwrap()
                .get(member_id)
                .copied()
                .unwrap_or_default()
        }

        fn for_member(&self, member_id: &str) -> MemberObligation {
            self.obligations
                .lock()
                .unwrap()
                .iter()
                .find(|o| o.member_id == member_id)
                .cloned()
                .unwrap()
        }

        fn count(&self) -> usize {
            self.obligations.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ObligationRepositoryTrait for MockObligationRepository {
        fn get_by_id(&self, obligation_id: &str) -> Result<MemberObligation> {
            self.obligations
                .lock()
                .unwrap()
                .iter()
                .find(|o| o.id == obligation_id)
                .cloned()
                .ok_or_else(|| Error::not_found("Obligation", obligation_id))
        }

        fn list_for_period(&self, period: &Period) -> Result<Vec<MemberObligation>> {
            Ok(self
                .obligations
                .lock()
                .unwrap()
                .iter()
                .filter(|o| &o.period == period)
                .cloned()
                .collect())
        }

        fn list_for_member(&self, member_id: &str) -> Result<Vec<MemberObligation>> {
            Ok(self
                .obligations
                .lock()
                .unwrap()
                .iter()
                .filter(|o| o.member_id == member_id)
                .cloned()
                .collect())
        }

        fn list_open_for_member(&self, member_id: &str) -> Result<Vec<MemberObligation>> {
            Ok(self
                .list_for_member(member_id)?
                .into_iter()
                .filter(|o| o.is_open())
                .collect())
        }

        async fn insert_period_batch(&self, batch: ObligationBatch) -> Result<BatchInsertOutcome> {
            let mut obligations = self.obligations.lock().unwrap();
            let mut credits = self.credits.lock().unwrap();

            let existing = obligations
                .iter()
                .filter(|o| o.period == batch.period && o.status != ObligationStatus::Cancelled)
                .count();
            if existing > 0 && !batch.allow_existing {
                return Err(Error::Conflict(format!(
                    "Period {} already has {} obligations",
                    batch.period, existing
                )));
            }

            let mut outcome = BatchInsertOutcome::default();
            for new in batch.obligations {
                let duplicate = obligations
                    .iter()
                    .any(|o| o.member_id == new.member_id && o.period == new.period);
                if duplicate {
                    outcome.skipped_duplicates += 1;
                    continue;
                }
                let mut settlement = new.settlement();
                let balance = credits.get(&new.member_id).copied().unwrap_or_default();
                let application = apply_credit_to_settlement(balance, &mut settlement);
                if application.consumed > Decimal::ZERO {
                    credits.insert(new.member_id.clone(), application.balance_after);
                    outcome.credit_applied_count += 1;
                }
                let mut obligation = MemberObligation {
                    id: format!("ob-{}", obligations.len() + 1),
                    period: new.period,
                    year: new.period.year(),
                    month: new.period.month(),
                    due_type_id: new.due_type_id,
                    member_id: new.member_id,
                    amount_expected: Decimal::ZERO,
                    amount_paid: Decimal::ZERO,
                    amount_remaining: Decimal::ZERO,
                    due_date: new.due_date,
                    status: ObligationStatus::Pending,
                    description: new.description,
                    source_period_due_id: new.source_period_due_id,
                    created_by: new.created_by,
                    created_at: NaiveDateTime::default(),
                    updated_at: NaiveDateTime::default(),
                };
                obligation.set_settlement(settlement);
                obligations.push(obligation.clone());
                outcome.created.push(obligation);
            }
            Ok(outcome)
        }

        async fn update_with_patch(
            &self,
            _obligation_id: &str,
            _patch: ObligationPatch,
            _policy: OverpaymentPolicy,
        ) -> Result<MemberObligation> {
            unimplemented!()
        }

        async fn cancel(&self, _obligation_id: &str) -> Result<MemberObligation> {
            unimplemented!()
        }

        async fn apply_member_credit(&self, _obligation_id: &str) -> Result<MemberObligation> {
            unimplemented!()
        }
    }

    struct Fixture {
        service: DueAssignmentService,
        catalog: MockPeriodDueRepository,
        members: MockMemberDirectory,
        obligations: MockObligationRepository,
        sink: RecordingEventSink,
    }

    fn march() -> Period {
        Period::new(2024, 3).unwrap()
    }

    fn setup(policy: AssistancePolicy) -> Fixture {
        let catalog = MockPeriodDueRepository::default();
        catalog.add("fee", "Monthly Fee", dec!(15.00), None);
        catalog.add("assist", "Assistance for X", dec!(5.00), Some(("x", "Xavier N.")));

        let members = MockMemberDirectory::default();
        members.add("m-bob", "Bob", Role::Member, true);
        members.add("m-alice", "Alice", Role::Member, true);
        members.add("x", "Xavier N.", Role::Member, true);
        members.add("m-old", "Olga", Role::Member, false);
        members.add("admin", "Treasurer", Role::Admin, true);

        let obligations = MockObligationRepository::default();
        let sink = RecordingEventSink::new();
        let service = DueAssignmentService::new(
            Arc::new(catalog.clone()),
            Arc::new(obligations.clone()),
            Arc::new(members.clone()),
            Arc::new(StandardDueCalculator::new(policy)),
            Arc::new(sink.clone()),
            Arc::new(LogAuditSink),
        );
        Fixture {
            service,
            catalog,
            members,
            obligations,
            sink,
        }
    }

    fn request() -> GenerationRequest {
        GenerationRequest {
            year: 2024,
            month: 3,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_generates_one_obligation_per_eligible_member() {
        let f = setup(AssistancePolicy::Pooled);
        let summary = f
            .service
            .generate_for_period(&Caller::admin("admin"), request())
            .await
            .unwrap();

        assert_eq!(summary.created_count, 3);
        assert_eq!(summary.skipped_duplicates, 0);
        assert!(summary.errors.is_empty());

        for member in ["m-alice", "m-bob", "x"] {
            let obligation = f.obligations.for_member(member);
            assert_eq!(obligation.amount_expected, dec!(20.00));
            assert_eq!(obligation.amount_paid, dec!(0));
            assert_eq!(obligation.amount_remaining, dec!(20.00));
            assert_eq!(obligation.status, ObligationStatus::Pending);
            assert_eq!(obligation.due_type_id, "type-fee");
            assert_eq!(obligation.source_period_due_id, "fee");
            assert!(obligation.description.contains("Monthly Fee: 15.00"));
            assert!(obligation.description.contains("Xavier N."));
        }

        // Created in display-name order.
        let ids: Vec<String> = f
            .obligations
            .list_for_period(&march())
            .unwrap()
            .into_iter()
            .map(|o| o.member_id)
            .collect();
        assert_eq!(ids, vec!["m-alice", "m-bob", "x"]);

        assert_eq!(
            f.sink.events()[0],
            DomainEvent::obligations_changed(
                vec!["m-alice".to_string(), "m-bob".to_string(), "x".to_string()],
                vec!["2024-03".to_string()]
            )
        );
    }

    #[tokio::test]
    async fn test_excluding_beneficiary_policy_charges_beneficiary_less() {
        let f = setup(AssistancePolicy::PooledExcludingBeneficiary);
        f.service
            .generate_for_period(&Caller::admin("admin"), request())
            .await
            .unwrap();
        assert_eq!(f.obligations.for_member("x").amount_expected, dec!(15.00));
        assert_eq!(f.obligations.for_member("m-bob").amount_expected, dec!(20.00));
    }

    #[tokio::test]
    async fn test_second_run_conflicts_without_resume() {
        let f = setup(AssistancePolicy::Pooled);
        let admin = Caller::admin("admin");
        f.service.generate_for_period(&admin, request()).await.unwrap();

        let result = f.service.generate_for_period(&admin, request()).await;
        assert!(matches!(result, Err(Error::Conflict(_))));
        assert_eq!(f.obligations.count(), 3);
    }

    #[tokio::test]
    async fn test_resume_partial_creates_only_missing_rows() {
        let f = setup(AssistancePolicy::Pooled);
        let admin = Caller::admin("admin");
        f.service
            .generate_for_period(
                &admin,
                GenerationRequest {
                    member_ids: Some(vec!["m-alice".to_string(), "m-bob".to_string()]),
                    ..request()
                },
            )
            .await
            .unwrap();
        assert_eq!(f.obligations.count(), 2);

        let summary = f
            .service
            .generate_for_period(
                &admin,
                GenerationRequest {
                    resume_partial: true,
                    ..request()
                },
            )
            .await
            .unwrap();
        assert_eq!(summary.created_count, 1);
        assert_eq!(summary.skipped_duplicates, 2);
        assert_eq!(f.obligations.count(), 3);
    }

    #[tokio::test]
    async fn test_credit_is_consumed_on_generation() {
        let f = setup(AssistancePolicy::Pooled);
        f.catalog.catalog.lock().unwrap().remove(1);
        f.obligations
            .credits
            .lock()
            .unwrap()
            .insert("m-alice".to_string(), dec!(20.00));

        let summary = f
            .service
            .generate_for_period(&Caller::admin("admin"), request())
            .await
            .unwrap();
        assert_eq!(summary.credit_applied_count, 1);

        let obligation = f.obligations.for_member("m-alice");
        assert_eq!(obligation.amount_paid, dec!(15.00));
        assert_eq!(obligation.amount_remaining, dec!(0.00));
        assert_eq!(obligation.status, ObligationStatus::Paid);
        assert_eq!(f.obligations.credit_of("m-alice"), dec!(5.00));
        assert!(f
            .sink
            .events()
            .contains(&DomainEvent::credit_changed(vec![
                "m-alice".to_string(),
                "m-bob".to_string(),
                "x".to_string()
            ])));
    }

    #[tokio::test]
    async fn test_unknown_member_ids_are_reported_not_fatal() {
        let f = setup(AssistancePolicy::Pooled);
        let summary = f
            .service
            .generate_for_period(
                &Caller::admin("admin"),
                GenerationRequest {
                    member_ids: Some(vec![
                        "m-bob".to_string(),
                        "ghost".to_string(),
                        "admin".to_string(),
                    ]),
                    ..request()
                },
            )
            .await
            .unwrap();
        assert_eq!(summary.created_count, 1);
        assert_eq!(summary.errors.len(), 2);
        assert_eq!(summary.errors[0].member_id.as_deref(), Some("ghost"));
    }

    #[tokio::test]
    async fn test_generation_preconditions() {
        let f = setup(AssistancePolicy::Pooled);
        let admin = Caller::admin("admin");

        let as_member = f
            .service
            .generate_for_period(&Caller::member("m-bob"), request())
            .await;
        assert!(matches!(as_member, Err(Error::Unauthorized(_))));

        let bad_month = f
            .service
            .generate_for_period(
                &admin,
                GenerationRequest {
                    month: 13,
                    ..request()
                },
            )
            .await;
        assert!(matches!(bad_month, Err(Error::InvalidArgument(_))));

        let empty_period = f
            .service
            .generate_for_period(
                &admin,
                GenerationRequest {
                    month: 4,
                    ..request()
                },
            )
            .await;
        assert!(matches!(empty_period, Err(Error::NotFound(_))));

        let assistance_only = f
            .service
            .generate_for_period(
                &admin,
                GenerationRequest {
                    due_type_ids: vec!["type-assist".to_string()],
                    ..request()
                },
            )
            .await;
        assert!(matches!(assistance_only, Err(Error::Precondition(_))));

        f.members.members.lock().unwrap().retain(|m| m.role == Role::Admin);
        let nobody = f.service.generate_for_period(&admin, request()).await;
        assert!(matches!(nobody, Err(Error::Precondition(_))));
        assert_eq!(f.obligations.count(), 0);
    }
}
