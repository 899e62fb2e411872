use std::sync::Arc;

use crate::{api::CallerIdentity, error::ApiResult, main_lib::AppState};
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use dues_core::debts::{AssistanceDue, InitialDebt, NewAssistanceDue, NewInitialDebt};

async fn create_initial_debt(
    State(state): State<Arc<AppState>>,
    CallerIdentity(caller): CallerIdentity,
    Json(new_debt): Json<NewInitialDebt>,
) -> ApiResult<(StatusCode, Json<InitialDebt>)> {
    let debt = state
        .debt_service
        .create_initial_debt(&caller, new_debt)
        .await?;
    Ok((StatusCode::CREATED, Json(debt)))
}

async fn create_assistance_due(
    State(state): State<Arc<AppState>>,
    CallerIdentity(caller): CallerIdentity,
    Json(new_assistance): Json<NewAssistanceDue>,
) -> ApiResult<(StatusCode, Json<AssistanceDue>)> {
    let assistance = state
        .debt_service
        .create_assistance_due(&caller, new_assistance)
        .await?;
    Ok((StatusCode::CREATED, Json(assistance)))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/initial-debts", post(create_initial_debt))
        .route("/assistance-dues", post(create_assistance_due))
}
