use std::sync::Arc;

use crate::{api::CallerIdentity, error::ApiResult, main_lib::AppState};
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use dues_core::payments::{NewPayment, Payment};

async fn record_payment(
    State(state): State<Arc<AppState>>,
    CallerIdentity(caller): CallerIdentity,
    Json(new_payment): Json<NewPayment>,
) -> ApiResult<(StatusCode, Json<Payment>)> {
    let payment = state
        .payment_service
        .record_payment(&caller, new_payment)
        .await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/payments", post(record_payment))
}
