#[cfg(test)]
mod tests {
    use crate::access::{Caller, Role};
    use crate::audit::LogAuditSink;
    use crate::due_types::{DueType, DueTypeRepositoryTrait, DueTypeUpdate, NewDueType};
    use crate::errors::{Error, Result};
    use crate::events::{DomainEvent, RecordingEventSink};
    use crate::members::{Member, MemberDirectoryTrait};
    use crate::period_dues::{
        NewPeriodDue, PeriodDue, PeriodDueDetails, PeriodDueRepositoryTrait, PeriodDueService,
        PeriodDueServiceTrait, PeriodDueStatus,
    };
    use crate::utils::period::Period;
    use async_trait::async_trait;
    use chrono::{NaiveDate, NaiveDateTime};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::{Arc, Mutex};

    // --- Mock DueTypeRepository (read side only) ---
    #[derive(Clone, Default)]
    struct MockDueTypeRepository {
        due_types: Arc<Mutex<Vec<DueType>>>,
    }

    impl MockDueTypeRepository {
        fn add(&self, id: &str, name: &str, requires_beneficiary: bool, active: bool) {
            self.due_types.lock().unwrap().push(DueType {
                id: id.to_string(),
                name: name.to_string(),
                description: None,
                unit_amount: dec!(15.00),
                mandatory: true,
                active,
                display_order: if requires_beneficiary { 1 } else { 0 },
                requires_beneficiary,
                created_at: NaiveDateTime::default(),
                updated_at: NaiveDateTime::default(),
            });
        }
    }

    #[async_trait]
    impl DueTypeRepositoryTrait for MockDueTypeRepository {
        fn list(&self) -> Result<Vec<DueType>> {
            Ok(self.due_types.lock().unwrap().clone())
        }

        fn get_by_id(&self, due_type_id: &str) -> Result<DueType> {
            self.due_types
                .lock()
                .unwrap()
                .iter()
                .find(|d| d.id == due_type_id)
                .cloned()
                .ok_or_else(|| Error::not_found("Due type", due_type_id))
        }

        async fn create(&self, _new_due_type: NewDueType) -> Result<DueType> {
            unimplemented!()
        }

        async fn update(&self, _due_type_id: &str, _update: DueTypeUpdate) -> Result<DueType> {
            unimplemented!()
        }

        async fn delete(&self, _due_type_id: &str) -> Result<usize> {
            unimplemented!()
        }
    }

    // --- Mock MemberDirectory ---
    #[derive(Clone, Default)]
    struct MockMemberDirectory {
        members: Arc<Mutex<Vec<Member>>>,
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
            Ok(self
                .members
                .lock()
                .unwrap()
                .iter()
                .filter(|m| !active_only || m.is_active)
                .cloned()
                .collect())
        }

        async fn upsert_member(&self, member: Member) -> Result<Member> {
            self.members.lock().unwrap().push(member.clone());
            Ok(member)
        }
    }

    // --- Mock PeriodDueRepository ---
    #[derive(Clone)]
    struct MockPeriodDueRepository {
        entries: Arc<Mutex<Vec<PeriodDue>>>,
        due_types: MockDueTypeRepository,
    }

    #[async_trait]
    impl PeriodDueRepositoryTrait for MockPeriodDueRepository {
        fn get_by_id(&self, period_due_id: &str) -> Result<PeriodDue> {
            self.entries
                .lock()
                .unwrap()
                .iter()
                .find(|e| e.id == period_due_id)
                .cloned()
                .ok_or_else(|| Error::not_found("Period due", period_due_id))
        }

        fn list_for_period(&self, period: &Period) -> Result<Vec<PeriodDueDetails>> {
            let entries = self.entries.lock().unwrap().clone();
            entries
                .into_iter()
                .filter(|e| &e.period == period)
                .map(|e| {
                    let due_type = self.due_types.get_by_id(&e.due_type_id)?;
                    Ok(PeriodDueDetails {
                        period_due: e,
                        due_type_name: due_type.name,
                        display_order: due_type.display_order,
                        requires_beneficiary: due_type.requires_beneficiary,
                        beneficiary_name: None,
                    })
                })
                .collect()
        }

        async fn create(&self, new_period_due: NewPeriodDue) -> Result<PeriodDue> {
            let mut entries = self.entries.lock().unwrap();
            let duplicate = entries.iter().any(|e| {
                e.period == new_period_due.period
                    && e.due_type_id == new_period_due.due_type_id
                    && e.beneficiary_member_id == new_period_due.beneficiary_member_id
            });
            if duplicate {
                return Err(Error::Conflict("Duplicate period due".to_string()));
            }
            let entry = PeriodDue {
                id: format!("pd-{}", entries.len() + 1),
                period: new_period_due.period,
                due_type_id: new_period_due.due_type_id,
                base_amount: new_period_due.base_amount,
                beneficiary_member_id: new_period_due.beneficiary_member_id,
                due_date: new_period_due.due_date,
                status: PeriodDueStatus::Active,
                created_at: NaiveDateTime::default(),
                updated_at: NaiveDateTime::default(),
            };
            entries.push(entry.clone());
            Ok(entry)
        }

        async fn cancel(&self, period_due_id: &str) -> Result<PeriodDue> {
            let mut entries = self.entries.lock().unwrap();
            let entry = entries
                .iter_mut()
                .find(|e| e.id == period_due_id)
                .ok_or_else(|| Error::not_found("Period due", period_due_id))?;
            entry.status = PeriodDueStatus::Cancelled;
            Ok(entry.clone())
        }
    }

    struct Fixture {
        service: PeriodDueService,
        sink: RecordingEventSink,
    }

    fn setup() -> Fixture {
        let due_types = MockDueTypeRepository::default();
        due_types.add("fee", "Monthly Fee", false, true);
        due_types.add("fee-2", "Second Fee", false, true);
        due_types.add("assist", "Assistance", true, true);
        due_types.add("retired", "Retired Fee", false, false);

        let members = MockMemberDirectory::default();
        members.members.lock().unwrap().push(Member {
            id: "x".to_string(),
            display_name: "Xavier N.".to_string(),
            role: Role::Member,
            is_active: true,
        });

        let repository = MockPeriodDueRepository {
            entries: Arc::new(Mutex::new(Vec::new())),
            due_types: due_types.clone(),
        };
        let sink = RecordingEventSink::new();
        let service = PeriodDueService::new(
            Arc::new(repository),
            Arc::new(due_types),
            Arc::new(members),
            Arc::new(sink.clone()),
            Arc::new(LogAuditSink),
        );
        Fixture { service, sink }
    }

    fn march() -> Period {
        Period::new(2024, 3).unwrap()
    }

    fn new_entry(due_type_id: &str, amount: Decimal, beneficiary: Option<&str>) -> NewPeriodDue {
        NewPeriodDue {
            period: march(),
            due_type_id: due_type_id.to_string(),
            base_amount: amount,
            beneficiary_member_id: beneficiary.map(str::to_string),
            due_date: NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_create_requires_admin() {
        let f = setup();
        let result = f
            .service
            .create_period_due(&Caller::member("m1"), new_entry("fee", dec!(15), None))
            .await;
        assert!(matches!(result, Err(Error::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_assistance_without_beneficiary_is_invalid() {
        let f = setup();
        let result = f
            .service
            .create_period_due(&Caller::admin("a1"), new_entry("assist", dec!(5), None))
            .await;
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_flat_fee_with_beneficiary_is_invalid() {
        let f = setup();
        let result = f
            .service
            .create_period_due(&Caller::admin("a1"), new_entry("fee", dec!(15), Some("x")))
            .await;
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_unknown_beneficiary_is_not_found() {
        let f = setup();
        let result = f
            .service
            .create_period_due(
                &Caller::admin("a1"),
                new_entry("assist", dec!(5), Some("ghost")),
            )
            .await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_unknown_and_inactive_due_types() {
        let f = setup();
        let admin = Caller::admin("a1");
        let missing = f
            .service
            .create_period_due(&admin, new_entry("nope", dec!(1), None))
            .await;
        assert!(matches!(missing, Err(Error::NotFound(_))));

        let inactive = f
            .service
            .create_period_due(&admin, new_entry("retired", dec!(1), None))
            .await;
        assert!(matches!(inactive, Err(Error::Precondition(_))));
    }

    #[tokio::test]
    async fn test_second_active_flat_fee_conflicts() {
        let f = setup();
        let admin = Caller::admin("a1");
        f.service
            .create_period_due(&admin, new_entry("fee", dec!(15), None))
            .await
            .unwrap();

        let result = f
            .service
            .create_period_due(&admin, new_entry("fee-2", dec!(10), None))
            .await;
        assert!(matches!(result, Err(Error::Conflict(_))));
    }

    #[tokio::test]
    async fn test_flat_fee_can_be_replaced_after_cancel() {
        let f = setup();
        let admin = Caller::admin("a1");
        let first = f
            .service
            .create_period_due(&admin, new_entry("fee", dec!(15), None))
            .await
            .unwrap();
        f.service.cancel_period_due(&admin, &first.id).await.unwrap();

        let replacement = f
            .service
            .create_period_due(&admin, new_entry("fee-2", dec!(12), None))
            .await
            .unwrap();
        assert_eq!(replacement.due_type_id, "fee-2");
    }

    #[tokio::test]
    async fn test_cancel_is_idempotent_and_hides_entry() {
        let f = setup();
        let admin = Caller::admin("a1");
        f.service
            .create_period_due(&admin, new_entry("fee", dec!(15), None))
            .await
            .unwrap();
        let assistance = f
            .service
            .create_period_due(&admin, new_entry("assist", dec!(5), Some("x")))
            .await
            .unwrap();

        let cancelled = f
            .service
            .cancel_period_due(&admin, &assistance.id)
            .await
            .unwrap();
        assert_eq!(cancelled.status, PeriodDueStatus::Cancelled);
        let again = f
            .service
            .cancel_period_due(&admin, &assistance.id)
            .await
            .unwrap();
        assert_eq!(again.status, PeriodDueStatus::Cancelled);

        let active = f.service.list_active_period_dues(&march()).unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].due_type_name, "Monthly Fee");
        assert_eq!(f.service.list_period_dues(&march(), true).unwrap().len(), 2);

        // Two creates and one effective cancel.
        assert_eq!(f.sink.len(), 3);
        assert_eq!(
            f.sink.events().last().unwrap(),
            &DomainEvent::period_catalog_changed(vec!["2024-03".to_string()])
        );
    }
}
