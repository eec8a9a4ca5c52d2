//! Break type management handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::services::break_type::{BreakType, CreateBreakTypeInput};
use crate::services::{AuthorizationService, BreakTypeService};
use crate::AppState;
use shared::permission_names;

/// Response for list of break types
#[derive(Serialize)]
pub struct BreakTypesResponse {
    pub break_types: Vec<BreakType>,
}

/// Query parameters for listing break types
#[derive(Debug, Deserialize)]
pub struct ListBreakTypesParams {
    #[serde(default)]
    pub include_inactive: bool,
}

/// Create a break type
pub async fn create_break_type(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateBreakTypeInput>,
) -> Result<(StatusCode, Json<BreakType>), AppError> {
    AuthorizationService::new(state.db.clone())
        .require(&user, permission_names::BREAK_TYPES)
        .await?;

    let service = BreakTypeService::new(state.db.clone());
    let break_type = service.create_break_type(user.employee_id, input).await?;

    Ok((StatusCode::CREATED, Json(break_type)))
}

/// List break types (active only by default)
pub async fn list_break_types(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(params): Query<ListBreakTypesParams>,
) -> Result<Json<BreakTypesResponse>, AppError> {
    AuthorizationService::new(state.db.clone())
        .require(&user, permission_names::TIME_SHEET)
        .await?;

    let service = BreakTypeService::new(state.db.clone());
    let break_types = service.list_break_types(!params.include_inactive).await?;

    Ok(Json(BreakTypesResponse { break_types }))
}

/// Get a break type
pub async fn get_break_type(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(break_type_id): Path<Uuid>,
) -> Result<Json<BreakType>, AppError> {
    AuthorizationService::new(state.db.clone())
        .require(&user, permission_names::TIME_SHEET)
        .await?;

    let service = BreakTypeService::new(state.db.clone());
    let break_type = service.get_break_type(break_type_id).await?;

    Ok(Json(break_type))
}

/// Soft-disable a break type
pub async fn deactivate_break_type(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(break_type_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    AuthorizationService::new(state.db.clone())
        .require(&user, permission_names::BREAK_TYPES)
        .await?;

    let service = BreakTypeService::new(state.db.clone());
    service.deactivate_break_type(break_type_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
