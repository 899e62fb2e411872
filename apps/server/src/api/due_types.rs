use std::sync::Arc;

use crate::{api::CallerIdentity, error::ApiResult, main_lib::AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use dues_core::due_types::{DueType, DueTypeUpdate, NewDueType};

async fn list_due_types(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<DueType>>> {
    let due_types = state.due_type_service.list_due_types()?;
    Ok(Json(due_types))
}

async fn create_due_type(
    State(state): State<Arc<AppState>>,
    CallerIdentity(caller): CallerIdentity,
    Json(new_due_type): Json<NewDueType>,
) -> ApiResult<(StatusCode, Json<DueType>)> {
    let due_type = state
        .due_type_service
        .create_due_type(&caller, new_due_type)
        .await?;
    Ok((StatusCode::CREATED, Json(due_type)))
}

async fn update_due_type(
    State(state): State<Arc<AppState>>,
    CallerIdentity(caller): CallerIdentity,
    Path(id): Path<String>,
    Json(update): Json<DueTypeUpdate>,
) -> ApiResult<Json<DueType>> {
    let due_type = state
        .due_type_service
        .update_due_type(&caller, &id, update)
        .await?;
    Ok(Json(due_type))
}

async fn delete_due_type(
    State(state): State<Arc<AppState>>,
    CallerIdentity(caller): CallerIdentity,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.due_type_service.delete_due_type(&caller, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/due-types", get(list_due_types).post(create_due_type))
        .route("/due-types/{id}", put(update_due_type).delete(delete_due_type))
}
