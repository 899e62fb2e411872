use std::sync::Arc;

use crate::{
    config::Config,
    events::{BusDomainEventSink, EventBus},
};
use dues_core::{
    audit::AuditSinkTrait,
    credits::{CreditService, CreditServiceTrait},
    debts::{DebtService, DebtServiceTrait},
    due_types::{DueTypeService, DueTypeServiceTrait},
    events::DomainEventSink,
    members::{MemberService, MemberServiceTrait},
    obligations::{
        DueAssignmentService, DueAssignmentServiceTrait, ObligationService,
        ObligationServiceTrait, StandardDueCalculator,
    },
    payments::{PaymentService, PaymentServiceTrait},
    period_dues::{PeriodDueService, PeriodDueServiceTrait},
    utils::time_utils::SystemClock,
};
use dues_storage_sqlite::{
    db, AuditRepository, CreditRepository, DebtRepository, DueTypeRepository, MemberRepository,
    ObligationRepository, PaymentRepository, PeriodDueRepository,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub due_type_service: Arc<dyn DueTypeServiceTrait>,
    pub period_due_service: Arc<dyn PeriodDueServiceTrait>,
    pub assignment_service: Arc<dyn DueAssignmentServiceTrait>,
    pub obligation_service: Arc<dyn ObligationServiceTrait>,
    pub credit_service: Arc<dyn CreditServiceTrait>,
    pub debt_service: Arc<dyn DebtServiceTrait>,
    pub payment_service: Arc<dyn PaymentServiceTrait>,
    pub member_service: Arc<dyn MemberServiceTrait>,
    pub audit_repository: Arc<AuditRepository>,
    pub event_bus: EventBus,
}

/// Installs the global subscriber. `log` records from the library crates are
/// bridged into it.
pub fn init_tracing(log_format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = db::spawn_writer((*pool).clone(), config.write_timeout);
    tracing::info!(
        "Engine policies: assistance={}, overpayment={}",
        config.settings.assistance_policy,
        config.settings.overpayment_policy
    );

    let event_bus = EventBus::new(256);
    let event_sink: Arc<dyn DomainEventSink> = Arc::new(BusDomainEventSink::new(event_bus.clone()));
    let audit_repository = Arc::new(AuditRepository::new(pool.clone(), writer.clone()));
    let audit_sink: Arc<dyn AuditSinkTrait> = audit_repository.clone();

    let member_repository = Arc::new(MemberRepository::new(pool.clone(), writer.clone()));
    let due_type_repository = Arc::new(DueTypeRepository::new(pool.clone(), writer.clone()));
    let period_due_repository = Arc::new(PeriodDueRepository::new(pool.clone(), writer.clone()));
    let obligation_repository = Arc::new(ObligationRepository::new(pool.clone(), writer.clone()));
    let credit_repository = Arc::new(CreditRepository::new(pool.clone(), writer.clone()));
    let debt_repository = Arc::new(DebtRepository::new(pool.clone(), writer.clone()));
    let payment_repository = Arc::new(PaymentRepository::new(pool.clone(), writer.clone()));

    let member_service = Arc::new(MemberService::new(
        member_repository.clone(),
        audit_sink.clone(),
    ));
    let due_type_service = Arc::new(DueTypeService::new(
        due_type_repository.clone(),
        event_sink.clone(),
        audit_sink.clone(),
    ));
    let period_due_service = Arc::new(PeriodDueService::new(
        period_due_repository.clone(),
        due_type_repository.clone(),
        member_repository.clone(),
        event_sink.clone(),
        audit_sink.clone(),
    ));
    let assignment_service = Arc::new(DueAssignmentService::new(
        period_due_repository.clone(),
        obligation_repository.clone(),
        member_repository.clone(),
        Arc::new(StandardDueCalculator::new(
            config.settings.assistance_policy,
        )),
        event_sink.clone(),
        audit_sink.clone(),
    ));
    let obligation_service = Arc::new(ObligationService::new(
        obligation_repository.clone(),
        Arc::new(SystemClock),
        config.settings,
        event_sink.clone(),
        audit_sink.clone(),
    ));
    let credit_service = Arc::new(CreditService::new(
        credit_repository.clone(),
        member_repository.clone(),
        event_sink.clone(),
        audit_sink.clone(),
    ));
    let debt_service = Arc::new(DebtService::new(
        debt_repository.clone(),
        member_repository.clone(),
        event_sink.clone(),
        audit_sink.clone(),
    ));
    let payment_service = Arc::new(PaymentService::new(
        payment_repository,
        obligation_repository,
        debt_repository,
        member_repository,
        config.settings,
        event_sink,
        audit_sink,
    ));

    Ok(Arc::new(AppState {
        due_type_service,
        period_due_service,
        assignment_service,
        obligation_service,
        credit_service,
        debt_service,
        payment_service,
        member_service,
        audit_repository,
        event_bus,
    }))
}
