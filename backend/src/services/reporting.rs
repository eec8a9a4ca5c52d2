//! Timesheet reporting service
//!
//! Read-side aggregation over raw punch rows. Hour totals are always
//! computed at query time from punch_in/punch_out; nothing derived is
//! stored. Open sessions inside the queried range count as ongoing,
//! elapsed against the database clock. All listings are paginated
//! server-side.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::timesheet::format_elapsed;
use shared::{PaginatedResponse, Pagination, PaginationMeta};

/// Reporting service
#[derive(Clone)]
pub struct ReportingService {
    db: PgPool,
}

/// Filter for timesheet queries: both sides optional
#[derive(Debug, Default, Deserialize)]
pub struct TimesheetFilter {
    pub employee_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// One timesheet row enriched with employee and break type names
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct TimesheetEntry {
    pub id: Uuid,
    pub employee_id: Option<Uuid>,
    pub employee_code: Option<String>,
    pub employee_name: Option<String>,
    pub break_type_id: Uuid,
    pub break_type_name: String,
    pub punch_in: DateTime<Utc>,
    pub punch_out: Option<DateTime<Utc>>,
    pub work_date: NaiveDate,
    pub is_active: bool,
    pub elapsed_seconds: i64,
}

/// Hours for one break type within an employee's summary
#[derive(Debug, Serialize)]
pub struct BreakTypeHours {
    pub break_type_id: Uuid,
    pub break_type_name: String,
    pub total_seconds: i64,
    pub total_hours: Decimal,
    pub elapsed: String,
}

/// Per-employee hour totals for a date range, broken out by break type
#[derive(Debug, Serialize)]
pub struct EmployeeHoursSummary {
    pub employee_id: Uuid,
    pub employee_code: String,
    pub employee_name: String,
    pub by_break_type: Vec<BreakTypeHours>,
    pub total_seconds: i64,
    pub total_hours: Decimal,
    pub elapsed: String,
}

/// CSV row shape for exported summaries
#[derive(Debug, Serialize)]
pub struct SummaryCsvRow {
    pub employee_code: String,
    pub employee_name: String,
    pub break_type: String,
    pub total_hours: Decimal,
    pub elapsed: String,
}

#[derive(Debug, sqlx::FromRow)]
struct SummaryRow {
    employee_id: Uuid,
    employee_code: String,
    employee_name: String,
    break_type_id: Uuid,
    break_type_name: String,
    total_seconds: i64,
}

/// Whole seconds as decimal hours, rounded to two places
pub fn seconds_to_hours(total_seconds: i64) -> Decimal {
    let mut hours = (Decimal::from(total_seconds) / Decimal::from(3600)).round_dp(2);
    // Pin the scale so whole hours render as "2.00" rather than "2"
    hours.rescale(2);
    hours
}

impl ReportingService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Paginated timesheet rows for an optional employee and date range.
    /// Open sessions report elapsed time against the database clock.
    pub async fn query_timesheets(
        &self,
        filter: &TimesheetFilter,
        pagination: &Pagination,
    ) -> AppResult<PaginatedResponse<TimesheetEntry>> {
        let total_items = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM time_sheets ts
            WHERE ($1::uuid IS NULL OR ts.employee_id = $1)
              AND ($2::date IS NULL OR ts.work_date >= $2)
              AND ($3::date IS NULL OR ts.work_date <= $3)
            "#,
        )
        .bind(filter.employee_id)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .fetch_one(&self.db)
        .await?;

        let entries = sqlx::query_as::<_, TimesheetEntry>(
            r#"
            SELECT ts.id, ts.employee_id, e.employee_code, e.name AS employee_name,
                   ts.break_type_id, bt.name AS break_type_name,
                   ts.punch_in, ts.punch_out, ts.work_date, ts.is_active,
                   EXTRACT(EPOCH FROM (COALESCE(ts.punch_out, NOW()) - ts.punch_in))::BIGINT
                       AS elapsed_seconds
            FROM time_sheets ts
            LEFT JOIN employees e ON e.id = ts.employee_id
            JOIN break_types bt ON bt.id = ts.break_type_id
            WHERE ($1::uuid IS NULL OR ts.employee_id = $1)
              AND ($2::date IS NULL OR ts.work_date >= $2)
              AND ($3::date IS NULL OR ts.work_date <= $3)
            ORDER BY ts.punch_in DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(filter.employee_id)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse {
            data: entries,
            pagination: PaginationMeta::new(pagination, total_items as u64),
        })
    }

    /// Per-employee hour summaries for a date range, paginated over
    /// employees. Multiple rows per day and per break type sum up; open
    /// sessions count elapsed-to-now; a missing employee filter aggregates
    /// across all employees.
    pub async fn hours_summary(
        &self,
        filter: &TimesheetFilter,
        pagination: &Pagination,
    ) -> AppResult<PaginatedResponse<EmployeeHoursSummary>> {
        let total_items = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(DISTINCT ts.employee_id)
            FROM time_sheets ts
            WHERE ts.employee_id IS NOT NULL
              AND ($1::uuid IS NULL OR ts.employee_id = $1)
              AND ($2::date IS NULL OR ts.work_date >= $2)
              AND ($3::date IS NULL OR ts.work_date <= $3)
            "#,
        )
        .bind(filter.employee_id)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .fetch_one(&self.db)
        .await?;

        // Page over employees first, then aggregate only the page's rows
        let page_employee_ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT e.id
            FROM employees e
            JOIN time_sheets ts ON ts.employee_id = e.id
            WHERE ($1::uuid IS NULL OR e.id = $1)
              AND ($2::date IS NULL OR ts.work_date >= $2)
              AND ($3::date IS NULL OR ts.work_date <= $3)
            GROUP BY e.id, e.employee_code
            ORDER BY e.employee_code ASC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(filter.employee_id)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        let rows = sqlx::query_as::<_, SummaryRow>(
            r#"
            SELECT e.id AS employee_id, e.employee_code, e.name AS employee_name,
                   bt.id AS break_type_id, bt.name AS break_type_name,
                   SUM(EXTRACT(EPOCH FROM (COALESCE(ts.punch_out, NOW()) - ts.punch_in)))::BIGINT
                       AS total_seconds
            FROM time_sheets ts
            JOIN employees e ON e.id = ts.employee_id
            JOIN break_types bt ON bt.id = ts.break_type_id
            WHERE e.id = ANY($1)
              AND ($2::date IS NULL OR ts.work_date >= $2)
              AND ($3::date IS NULL OR ts.work_date <= $3)
            GROUP BY e.id, e.employee_code, e.name, bt.id, bt.name
            ORDER BY e.employee_code ASC, bt.name ASC
            "#,
        )
        .bind(&page_employee_ids)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .fetch_all(&self.db)
        .await?;

        let summaries = fold_summaries(rows);

        Ok(PaginatedResponse {
            data: summaries,
            pagination: PaginationMeta::new(pagination, total_items as u64),
        })
    }

    /// Export one page of hour summaries as CSV
    pub async fn export_summary_csv(
        &self,
        filter: &TimesheetFilter,
        pagination: &Pagination,
    ) -> AppResult<String> {
        let page = self.hours_summary(filter, pagination).await?;

        let rows: Vec<SummaryCsvRow> = page
            .data
            .iter()
            .flat_map(|summary| {
                summary.by_break_type.iter().map(|bt| SummaryCsvRow {
                    employee_code: summary.employee_code.clone(),
                    employee_name: summary.employee_name.clone(),
                    break_type: bt.break_type_name.clone(),
                    total_hours: bt.total_hours,
                    elapsed: bt.elapsed.clone(),
                })
            })
            .collect();

        Self::export_to_csv(&rows)
    }

    /// Serialize report rows as CSV
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }
        let csv_data = String::from_utf8(
            wtr.into_inner()
                .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?,
        )
        .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))?;
        Ok(csv_data)
    }
}

/// Fold flat (employee, break type, seconds) rows into per-employee
/// summaries, keeping the incoming employee_code ordering
fn fold_summaries(rows: Vec<SummaryRow>) -> Vec<EmployeeHoursSummary> {
    let mut summaries: Vec<EmployeeHoursSummary> = Vec::new();

    for row in rows {
        let hours = BreakTypeHours {
            break_type_id: row.break_type_id,
            break_type_name: row.break_type_name,
            total_seconds: row.total_seconds,
            total_hours: seconds_to_hours(row.total_seconds),
            elapsed: format_elapsed(row.total_seconds),
        };

        match summaries.last_mut() {
            Some(current) if current.employee_id == row.employee_id => {
                current.total_seconds += row.total_seconds;
                current.by_break_type.push(hours);
            }
            _ => summaries.push(EmployeeHoursSummary {
                employee_id: row.employee_id,
                employee_code: row.employee_code,
                employee_name: row.employee_name,
                by_break_type: vec![hours],
                total_seconds: row.total_seconds,
                total_hours: Decimal::ZERO,
                elapsed: String::new(),
            }),
        }
    }

    for summary in &mut summaries {
        summary.total_hours = seconds_to_hours(summary.total_seconds);
        summary.elapsed = format_elapsed(summary.total_seconds);
    }

    summaries
}
