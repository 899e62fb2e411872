use std::sync::Arc;

use crate::{api::CallerIdentity, error::ApiResult, main_lib::AppState};
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use dues_core::obligations::{
    GenerationRequest, GenerationSummary, MemberObligation, ObligationPatch,
};
use dues_core::Period;
use serde::Deserialize;

#[derive(Deserialize)]
struct PeriodQuery {
    period: String,
}

async fn generate_obligations(
    State(state): State<Arc<AppState>>,
    CallerIdentity(caller): CallerIdentity,
    Json(request): Json<GenerationRequest>,
) -> ApiResult<Json<GenerationSummary>> {
    let summary = state
        .assignment_service
        .generate_for_period(&caller, request)
        .await?;
    Ok(Json(summary))
}

async fn list_period_obligations(
    State(state): State<Arc<AppState>>,
    CallerIdentity(caller): CallerIdentity,
    Query(q): Query<PeriodQuery>,
) -> ApiResult<Json<Vec<MemberObligation>>> {
    let period: Period = q.period.parse()?;
    let obligations = state
        .obligation_service
        .list_period_obligations(&caller, &period)?;
    Ok(Json(obligations))
}

async fn get_obligation(
    State(state): State<Arc<AppState>>,
    CallerIdentity(caller): CallerIdentity,
    Path(id): Path<String>,
) -> ApiResult<Json<MemberObligation>> {
    let obligation = state.obligation_service.get_obligation(&caller, &id)?;
    Ok(Json(obligation))
}

async fn update_obligation(
    State(state): State<Arc<AppState>>,
    CallerIdentity(caller): CallerIdentity,
    Path(id): Path<String>,
    Json(patch): Json<ObligationPatch>,
) -> ApiResult<Json<MemberObligation>> {
    let obligation = state
        .obligation_service
        .update_obligation(&caller, &id, patch)
        .await?;
    Ok(Json(obligation))
}

async fn cancel_obligation(
    State(state): State<Arc<AppState>>,
    CallerIdentity(caller): CallerIdentity,
    Path(id): Path<String>,
) -> ApiResult<Json<MemberObligation>> {
    let obligation = state
        .obligation_service
        .cancel_obligation(&caller, &id)
        .await?;
    Ok(Json(obligation))
}

async fn apply_credit(
    State(state): State<Arc<AppState>>,
    CallerIdentity(caller): CallerIdentity,
    Path(id): Path<String>,
) -> ApiResult<Json<MemberObligation>> {
    let obligation = state
        .obligation_service
        .apply_credit_to_obligation(&caller, &id)
        .await?;
    Ok(Json(obligation))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/obligations/generate", post(generate_obligations))
        .route("/obligations", get(list_period_obligations))
        .route(
            "/obligations/{id}",
            get(get_obligation).put(update_obligation),
        )
        .route("/obligations/{id}/cancel", post(cancel_obligation))
        .route("/obligations/{id}/apply-credit", post(apply_credit))
}
