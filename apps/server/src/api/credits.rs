use std::sync::Arc;

use crate::{api::CallerIdentity, error::ApiResult, main_lib::AppState};
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use dues_core::credits::{CreditAdjustment, CreditApplication, CreditSummary, MemberCredit};
use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Deserialize)]
struct ApplyCreditBody {
    outstanding: Decimal,
}

async fn get_credit(
    State(state): State<Arc<AppState>>,
    CallerIdentity(caller): CallerIdentity,
    Path(id): Path<String>,
) -> ApiResult<Json<CreditSummary>> {
    let summary = state.credit_service.get_credit(&caller, &id)?;
    Ok(Json(summary))
}

async fn adjust_credit(
    State(state): State<Arc<AppState>>,
    CallerIdentity(caller): CallerIdentity,
    Path(id): Path<String>,
    Json(adjustment): Json<CreditAdjustment>,
) -> ApiResult<Json<MemberCredit>> {
    let credit = state
        .credit_service
        .adjust_credit(&caller, &id, adjustment)
        .await?;
    Ok(Json(credit))
}

/// Consumes credit against an amount settled outside the obligation ledger.
async fn apply_credit(
    State(state): State<Arc<AppState>>,
    CallerIdentity(caller): CallerIdentity,
    Path(id): Path<String>,
    Json(body): Json<ApplyCreditBody>,
) -> ApiResult<Json<CreditApplication>> {
    let application = state
        .credit_service
        .apply_credit(&caller, &id, body.outstanding)
        .await?;
    Ok(Json(application))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/members/{id}/credit", get(get_credit).post(adjust_credit))
        .route("/members/{id}/credit/apply", post(apply_credit))
}
