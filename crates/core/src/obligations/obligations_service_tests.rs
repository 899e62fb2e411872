#[cfg(test)]
mod tests {
    use crate::access::Caller;
    use crate::audit::LogAuditSink;
    use crate::credits::apply_credit_to_settlement;
    use crate::errors::{Error, Result};
    use crate::events::RecordingEventSink;
    use crate::obligations::{
        BatchInsertOutcome, MemberObligation, ObligationBatch, ObligationPatch,
        ObligationRepositoryTrait, ObligationService, ObligationServiceTrait, ObligationStatus,
        Settleable, Settlement,
    };
    use crate::settings::{EngineSettings, OverpaymentPolicy};
    use crate::utils::period::Period;
    use crate::utils::time_utils::FixedClock;
    use async_trait::async_trait;
    use chrono::{NaiveDate, NaiveDateTime};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::{Arc, Mutex};

    // --- Mock ObligationRepository with one member's credit ---
    #[derive(Clone, Default)]
    struct MockObligationRepository {
        obligations: Arc<Mutex<Vec<MemberObligation>>>,
        credit: Arc<Mutex<Decimal>>,
    }

    impl MockObligationRepository {
        fn add(&self, id: &str, period: Period, expected: Decimal, paid: Decimal) {
            let mut settlement = Settlement::new(expected);
            settlement.settle(paid);
            let mut obligation = MemberObligation {
                id: id.to_string(),
                period,
                year: period.year(),
                month: period.month(),
                due_type_id: "fee".to_string(),
                member_id: "m1".to_string(),
                amount_expected: Decimal::ZERO,
                amount_paid: Decimal::ZERO,
                amount_remaining: Decimal::ZERO,
                due_date: period.first_day(),
                status: ObligationStatus::Pending,
                description: "Monthly Fee: 20.00".to_string(),
                source_period_due_id: "pd1".to_string(),
                created_by: "a1".to_string(),
                created_at: NaiveDateTime::default(),
                updated_at: NaiveDateTime::default(),
            };
            obligation.set_settlement(settlement);
            self.obligations.lock().unwrap().push(obligation);
        }

        fn with_obligation<T>(
            &self,
            obligation_id: &str,
            f: impl FnOnce(&mut MemberObligation, &mut Decimal) -> Result<T>,
        ) -> Result<T> {
            let mut obligations = self.obligations.lock().unwrap();
            let mut credit = self.credit.lock().unwrap();
            let obligation = obligations
                .iter_mut()
                .find(|o| o.id == obligation_id)
                .ok_or_else(|| Error::not_found("Obligation", obligation_id))?;
            f(obligation, &mut credit)
        }
    }

    fn settle_from_credit(obligation: &mut MemberObligation, credit: &mut Decimal) {
        let mut settlement = obligation.settlement();
        let application = apply_credit_to_settlement(*credit, &mut settlement);
        *credit = application.balance_after;
        obligation.set_settlement(settlement);
    }

    #[async_trait]
    impl ObligationRepositoryTrait for MockObligationRepository {
        fn get_by_id(&self, obligation_id: &str) -> Result<MemberObligation> {
            self.with_obligation(obligation_id, |o, _| Ok(o.clone()))
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

        async fn insert_period_batch(&self, _batch: ObligationBatch) -> Result<BatchInsertOutcome> {
            unimplemented!()
        }

        async fn update_with_patch(
            &self,
            obligation_id: &str,
            patch: ObligationPatch,
            policy: OverpaymentPolicy,
        ) -> Result<MemberObligation> {
            self.with_obligation(obligation_id, |obligation, credit| {
                let outcome = patch.apply_to(obligation, policy)?;
                *credit += outcome.refund_to_credit;
                if outcome.amount_increased {
                    settle_from_credit(obligation, credit);
                }
                if let Some(status) = patch.status {
                    obligation.status = status;
                }
                Ok(obligation.clone())
            })
        }

        async fn cancel(&self, obligation_id: &str) -> Result<MemberObligation> {
            self.with_obligation(obligation_id, |obligation, _| {
                obligation.status = ObligationStatus::Cancelled;
                Ok(obligation.clone())
            })
        }

        async fn apply_member_credit(&self, obligation_id: &str) -> Result<MemberObligation> {
            self.with_obligation(obligation_id, |obligation, credit| {
                settle_from_credit(obligation, credit);
                Ok(obligation.clone())
            })
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    fn setup(policy: OverpaymentPolicy) -> (ObligationService, MockObligationRepository, RecordingEventSink) {
        let repository = MockObligationRepository::default();
        repository.add("feb", Period::new(2024, 2).unwrap(), dec!(20.00), dec!(0));
        repository.add("mar", Period::new(2024, 3).unwrap(), dec!(20.00), dec!(15.00));
        repository.add("apr", Period::new(2024, 4).unwrap(), dec!(20.00), dec!(0));
        repository.add("may", Period::new(2024, 5).unwrap(), dec!(20.00), dec!(0));
        let sink = RecordingEventSink::new();
        let service = ObligationService::new(
            Arc::new(repository.clone()),
            Arc::new(FixedClock(today())),
            EngineSettings {
                overpayment_policy: policy,
                ..Default::default()
            },
            Arc::new(sink.clone()),
            Arc::new(LogAuditSink),
        );
        (service, repository, sink)
    }

    fn reprice(amount: Decimal) -> ObligationPatch {
        ObligationPatch {
            amount_expected: Some(amount),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_edits_outside_window_are_forbidden() {
        let (service, _, sink) = setup(OverpaymentPolicy::ConvertToCredit);
        let admin = Caller::admin("a1");
        for id in ["feb", "may"] {
            let result = service.update_obligation(&admin, id, reprice(dec!(18))).await;
            assert!(matches!(result, Err(Error::Forbidden(_))), "{}", id);
        }
        for id in ["mar", "apr"] {
            assert!(service.update_obligation(&admin, id, reprice(dec!(25))).await.is_ok());
        }
        assert!(!sink.is_empty());
    }

    #[tokio::test]
    async fn test_edit_requires_admin() {
        let (service, _, _) = setup(OverpaymentPolicy::ConvertToCredit);
        let result = service
            .update_obligation(&Caller::member("m1"), "mar", reprice(dec!(18)))
            .await;
        assert!(matches!(result, Err(Error::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_reprice_below_paid_refunds_credit() {
        let (service, repository, _) = setup(OverpaymentPolicy::ConvertToCredit);
        let updated = service
            .update_obligation(&Caller::admin("a1"), "mar", reprice(dec!(12.00)))
            .await
            .unwrap();
        assert_eq!(updated.amount_expected, dec!(12.00));
        assert_eq!(updated.amount_paid, dec!(12.00));
        assert_eq!(updated.amount_remaining, dec!(0));
        assert_eq!(updated.status, ObligationStatus::Paid);
        assert_eq!(*repository.credit.lock().unwrap(), dec!(3.00));
    }

    #[tokio::test]
    async fn test_reprice_below_paid_rejected_by_policy() {
        let (service, _, _) = setup(OverpaymentPolicy::Reject);
        let result = service
            .update_obligation(&Caller::admin("a1"), "mar", reprice(dec!(12.00)))
            .await;
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_reprice_up_consumes_credit() {
        let (service, repository, _) = setup(OverpaymentPolicy::ConvertToCredit);
        *repository.credit.lock().unwrap() = dec!(4.00);
        let updated = service
            .update_obligation(&Caller::admin("a1"), "apr", reprice(dec!(22.00)))
            .await
            .unwrap();
        assert_eq!(updated.amount_paid, dec!(4.00));
        assert_eq!(updated.amount_remaining, dec!(18.00));
        assert_eq!(updated.status, ObligationStatus::PartiallyPaid);
        assert_eq!(*repository.credit.lock().unwrap(), dec!(0));
    }

    #[tokio::test]
    async fn test_cancel_only_unpaid_obligations() {
        let (service, _, _) = setup(OverpaymentPolicy::ConvertToCredit);
        let admin = Caller::admin("a1");

        let paid = service.cancel_obligation(&admin, "mar").await;
        assert!(matches!(paid, Err(Error::Precondition(_))));

        let cancelled = service.cancel_obligation(&admin, "apr").await.unwrap();
        assert_eq!(cancelled.status, ObligationStatus::Cancelled);

        let edit = service
            .update_obligation(&admin, "apr", reprice(dec!(10)))
            .await;
        assert!(matches!(edit, Err(Error::Precondition(_))));
    }

    #[tokio::test]
    async fn test_apply_credit_to_open_obligation() {
        let (service, repository, _) = setup(OverpaymentPolicy::ConvertToCredit);
        *repository.credit.lock().unwrap() = dec!(50.00);
        let updated = service
            .apply_credit_to_obligation(&Caller::admin("a1"), "mar")
            .await
            .unwrap();
        assert_eq!(updated.status, ObligationStatus::Paid);
        assert_eq!(*repository.credit.lock().unwrap(), dec!(45.00));

        let again = service
            .apply_credit_to_obligation(&Caller::admin("a1"), "mar")
            .await;
        assert!(matches!(again, Err(Error::Precondition(_))));
    }

    #[tokio::test]
    async fn test_member_reads_only_own_obligations() {
        let (service, _, _) = setup(OverpaymentPolicy::ConvertToCredit);
        assert_eq!(
            service
                .list_member_obligations(&Caller::member("m1"), "m1")
                .unwrap()
                .len(),
            4
        );
        assert!(service.get_obligation(&Caller::member("m1"), "mar").is_ok());
        assert!(matches!(
            service.get_obligation(&Caller::member("m2"), "mar"),
            Err(Error::Unauthorized(_))
        ));
        assert!(matches!(
            service.list_period_obligations(&Caller::member("m1"), &Period::new(2024, 3).unwrap()),
            Err(Error::Unauthorized(_))
        ));
    }
}
