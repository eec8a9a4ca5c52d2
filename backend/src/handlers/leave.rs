//! Leave tracker handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::leave::{LeaveTracker, RequestLeaveInput, SetLeaveStatusInput};
use crate::services::{AuthorizationService, LeaveTrackerService};
use crate::AppState;
use shared::{permission_names, LeaveStatus};

/// Response for list of leave requests
#[derive(Serialize)]
pub struct LeavesResponse {
    pub leaves: Vec<LeaveTracker>,
}

/// Query parameters for listing leave requests
#[derive(Debug, Deserialize)]
pub struct ListLeavesParams {
    pub status: Option<String>,
}

/// Request leave for the current employee
pub async fn request_leave(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<RequestLeaveInput>,
) -> Result<(StatusCode, Json<LeaveTracker>), AppError> {
    let service = LeaveTrackerService::new(state.db.clone());
    let leave = service.request_leave(user.employee_id, input).await?;

    Ok((StatusCode::CREATED, Json(leave)))
}

/// Set the status of a leave request (approve/reject/cancel/expire)
pub async fn set_leave_status(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(leave_id): Path<Uuid>,
    Json(input): Json<SetLeaveStatusInput>,
) -> Result<Json<LeaveTracker>, AppError> {
    AuthorizationService::new(state.db.clone())
        .require(&user, permission_names::LEAVE_TRACKERS)
        .await?;

    let service = LeaveTrackerService::new(state.db.clone());
    let leave = service
        .set_status(leave_id, input.status, user.employee_id)
        .await?;

    Ok(Json(leave))
}

/// Get a leave request
pub async fn get_leave(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(leave_id): Path<Uuid>,
) -> Result<Json<LeaveTracker>, AppError> {
    let service = LeaveTrackerService::new(state.db.clone());
    let leave = service.get_leave(leave_id).await?;

    // Own requests are always visible; other employees' requests need the
    // leave tracker permission
    if leave.employee_id != user.employee_id {
        AuthorizationService::new(state.db.clone())
            .require(&user, permission_names::LEAVE_TRACKERS)
            .await?;
    }

    Ok(Json(leave))
}

/// List the current employee's leave requests
pub async fn list_my_leaves(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<LeavesResponse>, AppError> {
    let service = LeaveTrackerService::new(state.db.clone());
    let leaves = service.list_for_employee(user.employee_id).await?;

    Ok(Json(LeavesResponse { leaves }))
}

/// List leave requests across all employees
pub async fn list_leaves(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(params): Query<ListLeavesParams>,
) -> Result<Json<LeavesResponse>, AppError> {
    AuthorizationService::new(state.db.clone())
        .require(&user, permission_names::LEAVE_TRACKERS)
        .await?;

    let status = parse_status_filter(params.status.as_deref())?;

    let service = LeaveTrackerService::new(state.db.clone());
    let leaves = service.list_leaves(status).await?;

    Ok(Json(LeavesResponse { leaves }))
}

fn parse_status_filter(status: Option<&str>) -> AppResult<Option<LeaveStatus>> {
    match status {
        None => Ok(None),
        Some(s) => LeaveStatus::parse(s).map(Some).ok_or_else(|| {
            AppError::Validation {
                field: "status".to_string(),
                message: format!("Unknown leave status '{}'", s),
            }
        }),
    }
}
