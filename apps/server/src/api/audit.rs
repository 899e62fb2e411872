use std::sync::Arc;

use crate::{api::CallerIdentity, error::ApiResult, main_lib::AppState};
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use dues_core::audit::AuditEntry;

/// Audit history of one entity, administrators only.
async fn list_entity_audit(
    State(state): State<Arc<AppState>>,
    CallerIdentity(caller): CallerIdentity,
    Path((entity, id)): Path<(String, String)>,
) -> ApiResult<Json<Vec<AuditEntry>>> {
    caller.ensure_admin()?;
    let entries = state.audit_repository.list_for_entity(&entity, &id)?;
    Ok(Json(entries))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/audit/{entity}/{id}", get(list_entity_audit))
}
