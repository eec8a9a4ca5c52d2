//! Leave tracker service
//!
//! Leave requests carry an approval status that any permitted caller may
//! overwrite directly (Pending/Approved/Rejected/Cancelled/Expired); there
//! is no guarded transition graph and no concurrency invariant here.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::{validate_date_range, LeaveStatus};

/// Leave tracker service
#[derive(Clone)]
pub struct LeaveTrackerService {
    db: PgPool,
}

/// A leave request
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct LeaveTracker {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
    pub status: String,
    pub decided_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for requesting leave
#[derive(Debug, Deserialize)]
pub struct RequestLeaveInput {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
}

/// Input for setting a leave request's status
#[derive(Debug, Deserialize)]
pub struct SetLeaveStatusInput {
    pub status: LeaveStatus,
}

impl LeaveTrackerService {
    /// Create a new LeaveTrackerService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Request leave for an employee; starts Pending
    pub async fn request_leave(
        &self,
        employee_id: Uuid,
        input: RequestLeaveInput,
    ) -> AppResult<LeaveTracker> {
        validate_date_range(input.start_date, input.end_date).map_err(|msg| {
            AppError::Validation {
                field: "end_date".to_string(),
                message: msg.to_string(),
            }
        })?;

        let leave = sqlx::query_as::<_, LeaveTracker>(
            r#"
            INSERT INTO leave_trackers (employee_id, start_date, end_date, reason, status)
            VALUES ($1, $2, $3, $4, 'pending')
            RETURNING id, employee_id, start_date, end_date, reason, status,
                      decided_by, created_at, updated_at
            "#,
        )
        .bind(employee_id)
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(&input.reason)
        .fetch_one(&self.db)
        .await?;

        Ok(leave)
    }

    /// Overwrite a leave request's status. Any status can be set to any
    /// other status by a permitted caller.
    pub async fn set_status(
        &self,
        leave_id: Uuid,
        status: LeaveStatus,
        decided_by: Uuid,
    ) -> AppResult<LeaveTracker> {
        sqlx::query_as::<_, LeaveTracker>(
            r#"
            UPDATE leave_trackers
            SET status = $2, decided_by = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING id, employee_id, start_date, end_date, reason, status,
                      decided_by, created_at, updated_at
            "#,
        )
        .bind(leave_id)
        .bind(status.as_str())
        .bind(decided_by)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Leave request".to_string()))
    }

    /// Get a leave request by id
    pub async fn get_leave(&self, leave_id: Uuid) -> AppResult<LeaveTracker> {
        sqlx::query_as::<_, LeaveTracker>(
            r#"
            SELECT id, employee_id, start_date, end_date, reason, status,
                   decided_by, created_at, updated_at
            FROM leave_trackers
            WHERE id = $1
            "#,
        )
        .bind(leave_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Leave request".to_string()))
    }

    /// List an employee's leave requests, newest first
    pub async fn list_for_employee(&self, employee_id: Uuid) -> AppResult<Vec<LeaveTracker>> {
        let leaves = sqlx::query_as::<_, LeaveTracker>(
            r#"
            SELECT id, employee_id, start_date, end_date, reason, status,
                   decided_by, created_at, updated_at
            FROM leave_trackers
            WHERE employee_id = $1
            ORDER BY start_date DESC
            "#,
        )
        .bind(employee_id)
        .fetch_all(&self.db)
        .await?;

        Ok(leaves)
    }

    /// List leave requests, optionally filtered by status
    pub async fn list_leaves(&self, status: Option<LeaveStatus>) -> AppResult<Vec<LeaveTracker>> {
        let leaves = sqlx::query_as::<_, LeaveTracker>(
            r#"
            SELECT id, employee_id, start_date, end_date, reason, status,
                   decided_by, created_at, updated_at
            FROM leave_trackers
            WHERE ($1::text IS NULL OR status = $1)
            ORDER BY start_date DESC
            "#,
        )
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.db)
        .await?;

        Ok(leaves)
    }
}
