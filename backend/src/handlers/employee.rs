//! Employee directory handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::services::employee::{CreateEmployeeInput, Employee};
use crate::services::{AuthorizationService, EmployeeService};
use crate::AppState;
use shared::{permission_names, PaginatedResponse, Pagination};

/// Query parameters for listing employees
#[derive(Debug, Deserialize)]
pub struct ListEmployeesParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ListEmployeesParams {
    fn pagination(&self) -> Pagination {
        let default = Pagination::default();
        Pagination {
            page: self.page.unwrap_or(default.page),
            per_page: self.per_page.unwrap_or(default.per_page),
        }
    }
}

/// Create an employee
pub async fn create_employee(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateEmployeeInput>,
) -> Result<(StatusCode, Json<Employee>), AppError> {
    AuthorizationService::new(state.db.clone())
        .require(&user, permission_names::EMPLOYEES)
        .await?;

    let service = EmployeeService::new(state.db.clone());
    let employee = service.create_employee(input).await?;

    Ok((StatusCode::CREATED, Json(employee)))
}

/// Get an employee by id
pub async fn get_employee(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(employee_id): Path<Uuid>,
) -> Result<Json<Employee>, AppError> {
    // Own record is always visible
    if employee_id != user.employee_id {
        AuthorizationService::new(state.db.clone())
            .require(&user, permission_names::EMPLOYEES)
            .await?;
    }

    let service = EmployeeService::new(state.db.clone());
    let employee = service.get_employee(employee_id).await?;

    Ok(Json(employee))
}

/// List employees, paginated
pub async fn list_employees(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(params): Query<ListEmployeesParams>,
) -> Result<Json<PaginatedResponse<Employee>>, AppError> {
    AuthorizationService::new(state.db.clone())
        .require(&user, permission_names::EMPLOYEES)
        .await?;

    let service = EmployeeService::new(state.db.clone());
    let page = service.list_employees(&params.pagination()).await?;

    Ok(Json(page))
}

/// Disable an employee account
pub async fn deactivate_employee(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(employee_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    AuthorizationService::new(state.db.clone())
        .require(&user, permission_names::EMPLOYEES)
        .await?;

    let service = EmployeeService::new(state.db.clone());
    service.deactivate_employee(employee_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
