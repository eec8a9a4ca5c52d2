//! Timesheet punch handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::services::timesheet::{PunchInInput, SessionStatus, TimeSheet};
use crate::services::{AuthorizationService, BreakTypeService, TimesheetService};
use crate::AppState;
use shared::permission_names;

/// Request body for confirming a break type password
#[derive(Debug, Deserialize)]
pub struct VerifyBreakPasswordRequest {
    pub password: String,
}

/// Result of a break type password confirmation
#[derive(Debug, Serialize)]
pub struct VerifyBreakPasswordResponse {
    pub verified: bool,
}

/// Punch in: open a new session for the current employee
pub async fn punch_in(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<PunchInInput>,
) -> Result<(StatusCode, Json<TimeSheet>), AppError> {
    AuthorizationService::new(state.db.clone())
        .require(&user, permission_names::TIME_SHEET)
        .await?;

    let service = TimesheetService::new(state.db.clone());
    let session = service.punch_in(user.employee_id, input).await?;

    Ok((StatusCode::CREATED, Json(session)))
}

/// Punch out: close the current employee's active session
pub async fn punch_out(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<TimeSheet>, AppError> {
    AuthorizationService::new(state.db.clone())
        .require(&user, permission_names::TIME_SHEET)
        .await?;

    let service = TimesheetService::new(state.db.clone());
    let session = service.punch_out(user.employee_id).await?;

    Ok(Json(session))
}

/// The current employee's active session with live elapsed time,
/// or 404 if nothing is open
pub async fn get_session_status(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<SessionStatus>, AppError> {
    AuthorizationService::new(state.db.clone())
        .require(&user, permission_names::TIME_SHEET)
        .await?;

    let service = TimesheetService::new(state.db.clone());
    let status = service
        .session_status(user.employee_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Active session".to_string()))?;

    Ok(Json(status))
}

/// Confirm a break type password ahead of punch-in
pub async fn verify_break_password(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(break_type_id): Path<Uuid>,
    Json(request): Json<VerifyBreakPasswordRequest>,
) -> Result<Json<VerifyBreakPasswordResponse>, AppError> {
    AuthorizationService::new(state.db.clone())
        .require(&user, permission_names::TIME_SHEET)
        .await?;

    let service = BreakTypeService::new(state.db.clone());
    let verified = service
        .verify_break_type_password(break_type_id, &request.password)
        .await?;

    Ok(Json(VerifyBreakPasswordResponse { verified }))
}

/// Close a specific session by id (admin)
pub async fn close_session(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(session_id): Path<Uuid>,
) -> Result<Json<TimeSheet>, AppError> {
    AuthorizationService::new(state.db.clone())
        .require(&user, permission_names::REPORTS)
        .await?;

    let service = TimesheetService::new(state.db.clone());
    let session = service.close_session(session_id).await?;

    Ok(Json(session))
}
