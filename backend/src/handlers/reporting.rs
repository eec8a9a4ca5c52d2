//! Timesheet reporting handlers

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::services::reporting::TimesheetFilter;
use crate::services::{AuthorizationService, ReportingService};
use crate::AppState;
use shared::{permission_names, Pagination};

/// Query parameters shared by the report endpoints
#[derive(Debug, Deserialize)]
pub struct ReportParams {
    pub employee_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ReportParams {
    fn filter(&self) -> TimesheetFilter {
        TimesheetFilter {
            employee_id: self.employee_id,
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }

    fn pagination(&self) -> Pagination {
        let default = Pagination::default();
        Pagination {
            page: self.page.unwrap_or(default.page),
            per_page: self.per_page.unwrap_or(default.per_page),
        }
    }
}

/// Paginated raw timesheet rows for an optional employee and date range
pub async fn list_timesheets(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(params): Query<ReportParams>,
) -> Result<impl IntoResponse, AppError> {
    AuthorizationService::new(state.db.clone())
        .require(&user, permission_names::REPORTS)
        .await?;

    let service = ReportingService::new(state.db.clone());
    let page = service
        .query_timesheets(&params.filter(), &params.pagination())
        .await?;

    Ok(Json(page))
}

/// Per-employee hour totals, broken out by break type
pub async fn hours_summary(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(params): Query<ReportParams>,
) -> Result<impl IntoResponse, AppError> {
    AuthorizationService::new(state.db.clone())
        .require(&user, permission_names::REPORTS)
        .await?;

    let service = ReportingService::new(state.db.clone());
    let page = service
        .hours_summary(&params.filter(), &params.pagination())
        .await?;

    Ok(Json(page))
}

/// Export one page of hour summaries as CSV
pub async fn export_summary_csv(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(params): Query<ReportParams>,
) -> Result<impl IntoResponse, AppError> {
    AuthorizationService::new(state.db.clone())
        .require(&user, permission_names::REPORTS)
        .await?;

    let service = ReportingService::new(state.db.clone());
    let csv = service
        .export_summary_csv(&params.filter(), &params.pagination())
        .await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"hours-summary.csv\"",
            ),
        ],
        csv,
    ))
}
