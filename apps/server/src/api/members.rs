use std::sync::Arc;

use crate::{
    api::CallerIdentity,
    error::{ApiError, ApiResult},
    main_lib::AppState,
};
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use dues_core::{
    debts::MemberDebts, members::Member, obligations::MemberObligation,
    payments::{OpenObligations, Payment},
};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MemberListQuery {
    #[serde(default)]
    active_only: bool,
}

async fn list_members(
    State(state): State<Arc<AppState>>,
    CallerIdentity(caller): CallerIdentity,
    Query(q): Query<MemberListQuery>,
) -> ApiResult<Json<Vec<Member>>> {
    let members = state.member_service.list_members(&caller, q.active_only)?;
    Ok(Json(members))
}

async fn get_member(
    State(state): State<Arc<AppState>>,
    CallerIdentity(caller): CallerIdentity,
    Path(id): Path<String>,
) -> ApiResult<Json<Member>> {
    let member = state.member_service.get_member(&caller, &id)?;
    Ok(Json(member))
}

async fn upsert_member(
    State(state): State<Arc<AppState>>,
    CallerIdentity(caller): CallerIdentity,
    Path(id): Path<String>,
    Json(member): Json<Member>,
) -> ApiResult<Json<Member>> {
    if member.id != id {
        return Err(ApiError::BadRequest(format!(
            "Body id '{}' does not match path id '{}'",
            member.id, id
        )));
    }
    let saved = state.member_service.upsert_member(&caller, member).await?;
    Ok(Json(saved))
}

async fn list_member_obligations(
    State(state): State<Arc<AppState>>,
    CallerIdentity(caller): CallerIdentity,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<MemberObligation>>> {
    let obligations = state
        .obligation_service
        .list_member_obligations(&caller, &id)?;
    Ok(Json(obligations))
}

async fn list_open_obligations(
    State(state): State<Arc<AppState>>,
    CallerIdentity(caller): CallerIdentity,
    Path(id): Path<String>,
) -> ApiResult<Json<OpenObligations>> {
    let open = state.payment_service.list_open_obligations(&caller, &id)?;
    Ok(Json(open))
}

async fn list_member_payments(
    State(state): State<Arc<AppState>>,
    CallerIdentity(caller): CallerIdentity,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<Payment>>> {
    let payments = state.payment_service.list_member_payments(&caller, &id)?;
    Ok(Json(payments))
}

async fn list_member_debts(
    State(state): State<Arc<AppState>>,
    CallerIdentity(caller): CallerIdentity,
    Path(id): Path<String>,
) -> ApiResult<Json<MemberDebts>> {
    let debts = state.debt_service.list_member_debts(&caller, &id)?;
    Ok(Json(debts))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/members", get(list_members))
        .route("/members/{id}", get(get_member).put(upsert_member))
        .route("/members/{id}/obligations", get(list_member_obligations))
        .route("/members/{id}/open-obligations", get(list_open_obligations))
        .route("/members/{id}/payments", get(list_member_payments))
        .route("/members/{id}/debts", get(list_member_debts))
}
