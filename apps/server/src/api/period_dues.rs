use std::sync::Arc;

use crate::{api::CallerIdentity, error::ApiResult, main_lib::AppState};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use dues_core::period_dues::{NewPeriodDue, PeriodDue, PeriodDueDetails};
use dues_core::Period;
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PeriodDueQuery {
    period: String,
    #[serde(default)]
    include_cancelled: bool,
}

async fn list_period_dues(
    State(state): State<Arc<AppState>>,
    Query(q): Query<PeriodDueQuery>,
) -> ApiResult<Json<Vec<PeriodDueDetails>>> {
    let period: Period = q.period.parse()?;
    let dues = state
        .period_due_service
        .list_period_dues(&period, q.include_cancelled)?;
    Ok(Json(dues))
}

async fn create_period_due(
    State(state): State<Arc<AppState>>,
    CallerIdentity(caller): CallerIdentity,
    Json(new_period_due): Json<NewPeriodDue>,
) -> ApiResult<(StatusCode, Json<PeriodDue>)> {
    let period_due = state
        .period_due_service
        .create_period_due(&caller, new_period_due)
        .await?;
    Ok((StatusCode::CREATED, Json(period_due)))
}

async fn cancel_period_due(
    State(state): State<Arc<AppState>>,
    CallerIdentity(caller): CallerIdentity,
    Path(id): Path<String>,
) -> ApiResult<Json<PeriodDue>> {
    let period_due = state
        .period_due_service
        .cancel_period_due(&caller, &id)
        .await?;
    Ok(Json(period_due))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/period-dues", get(list_period_dues).post(create_period_due))
        .route("/period-dues/{id}/cancel", post(cancel_period_due))
}
