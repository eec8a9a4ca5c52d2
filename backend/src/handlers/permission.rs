//! Role and permission administration handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::services::authorization::{
    EffectivePermission, GrantOverrideInput, Permission, Role,
};
use crate::services::AuthorizationService;
use crate::AppState;
use shared::permission_names;

/// Response for list of roles
#[derive(Serialize)]
pub struct RolesResponse {
    pub roles: Vec<Role>,
}

/// Response for list of permissions
#[derive(Serialize)]
pub struct PermissionsResponse {
    pub permissions: Vec<Permission>,
}

/// Response for an employee's effective permission set
#[derive(Serialize)]
pub struct EffectivePermissionsResponse {
    pub employee_id: Uuid,
    pub permissions: Vec<EffectivePermission>,
}

/// Response for the check-authorization query: `reason` is absent when the
/// principal is fully authorized
#[derive(Serialize)]
pub struct CheckAuthorizationResponse {
    pub authorized: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Get all roles
pub async fn list_roles(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<RolesResponse>, AppError> {
    let authz = AuthorizationService::new(state.db.clone());
    authz.require(&user, permission_names::PERMISSIONS).await?;

    let roles = authz.get_roles().await?;

    Ok(Json(RolesResponse { roles }))
}

/// Get all available permissions
pub async fn list_permissions(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<PermissionsResponse>, AppError> {
    let authz = AuthorizationService::new(state.db.clone());
    authz.require(&user, permission_names::PERMISSIONS).await?;

    let permissions = authz.get_all_permissions().await?;

    Ok(Json(PermissionsResponse { permissions }))
}

/// Grant a per-employee permission override (idempotent)
pub async fn grant_override(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<GrantOverrideInput>,
) -> Result<StatusCode, AppError> {
    let authz = AuthorizationService::new(state.db.clone());
    authz.require(&user, permission_names::PERMISSIONS).await?;

    authz.grant_override(input).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Revoke a per-employee permission override
pub async fn revoke_override(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((employee_id, permission_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    let authz = AuthorizationService::new(state.db.clone());
    authz.require(&user, permission_names::PERMISSIONS).await?;

    authz.revoke_override(employee_id, permission_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// List an employee's effective permissions
pub async fn list_effective_permissions(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(employee_id): Path<Uuid>,
) -> Result<Json<EffectivePermissionsResponse>, AppError> {
    let authz = AuthorizationService::new(state.db.clone());
    authz.require(&user, permission_names::PERMISSIONS).await?;

    let permissions = authz.list_effective_permissions(employee_id).await?;

    Ok(Json(EffectivePermissionsResponse {
        employee_id,
        permissions,
    }))
}

/// Check whether the calling principal is still fully authorized.
/// Open to any authenticated caller; the UI uses it to decide whether to
/// show the restricted view.
pub async fn check_authorization(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<CheckAuthorizationResponse>, AppError> {
    let authz = AuthorizationService::new(state.db.clone());
    let reason = authz.check_authorization(&user).await?;

    Ok(Json(CheckAuthorizationResponse {
        authorized: reason.is_none(),
        reason,
    }))
}
