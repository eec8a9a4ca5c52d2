//! Timesheet punch state machine
//!
//! Governs the lifecycle of a single work-day punch session:
//! NoActiveSession -> Active (punch-in) -> Closed (punch-out). A new
//! session may open immediately after one closes, but an employee can
//! never hold two Active rows at once. That invariant is enforced twice:
//! an in-transaction existence check under a row lock, and a partial
//! unique index on time_sheets (employee_id) WHERE is_active as the
//! storage-level backstop against concurrent punch-ins.
//!
//! Elapsed time is always computed on read, never stored.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use super::break_type::{verify_break_password, BreakTypeService};

/// Timesheet service
#[derive(Clone)]
pub struct TimesheetService {
    db: PgPool,
}

/// One punch session for an employee
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TimeSheet {
    pub id: Uuid,
    pub employee_id: Option<Uuid>,
    pub break_type_id: Uuid,
    pub punch_in: DateTime<Utc>,
    pub punch_out: Option<DateTime<Utc>>,
    pub work_date: NaiveDate,
    pub is_active: bool,
}

/// Input for punching in
#[derive(Debug, Deserialize)]
pub struct PunchInInput {
    pub break_type_id: Uuid,
    /// Required when the break type is password-gated
    pub password: Option<String>,
}

/// An active session with its live elapsed time
#[derive(Debug, Serialize)]
pub struct SessionStatus {
    #[serde(flatten)]
    pub session: TimeSheet,
    /// HH:MM:SS, recomputed against the wall clock while the session is open
    pub elapsed: String,
}

/// Elapsed whole seconds of a session: (punch_out ?? now) - punch_in.
/// Negative clock skew clamps to zero rather than rendering garbage.
pub fn elapsed_seconds(
    punch_in: DateTime<Utc>,
    punch_out: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> i64 {
    let end = punch_out.unwrap_or(now);
    (end - punch_in).num_seconds().max(0)
}

/// Format a duration in whole seconds as HH:MM:SS (hours may exceed 24)
pub fn format_elapsed(total_seconds: i64) -> String {
    let total_seconds = total_seconds.max(0);
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// Map a unique-violation database error to a punch-in conflict.
/// This is what surfaces when two concurrent punch-ins race past the
/// existence check and hit the partial unique index.
fn map_punch_in_error(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.code().as_deref() == Some("23505") {
            return AppError::Conflict {
                resource: "time_sheet".to_string(),
                message: "Employee already has an active session".to_string(),
            };
        }
    }
    AppError::DatabaseError(err)
}

impl TimesheetService {
    /// Create a new TimesheetService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Punch in: open a new Active session for an employee.
    ///
    /// Rejected with a Conflict if the employee already has an Active row,
    /// and with an authorization error if the break type is password-gated
    /// and the submitted password does not match.
    pub async fn punch_in(
        &self,
        employee_id: Uuid,
        input: PunchInInput,
    ) -> AppResult<TimeSheet> {
        let break_type = BreakTypeService::new(self.db.clone())
            .fetch_row(input.break_type_id)
            .await?;

        if !break_type.is_active {
            return Err(AppError::Validation {
                field: "break_type_id".to_string(),
                message: format!("Break type '{}' is disabled", break_type.name),
            });
        }

        // Password gate: the state machine refuses to transition without a
        // confirmed secret for gated break types.
        if let Some(ref stored) = break_type.password_sha256 {
            let submitted = input.password.as_deref().unwrap_or("");
            if !verify_break_password(stored, submitted) {
                return Err(AppError::Unauthorized(format!(
                    "Break type '{}' requires a valid password",
                    break_type.name
                )));
            }
        }

        let now = Utc::now();

        let mut tx = self.db.begin().await?;

        // Existence check under a row lock scoped to this employee. The
        // partial unique index still backstops the race if two transactions
        // pass this point simultaneously.
        let active = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM time_sheets WHERE employee_id = $1 AND is_active = true FOR UPDATE",
        )
        .bind(employee_id)
        .fetch_optional(&mut *tx)
        .await?;

        if active.is_some() {
            return Err(AppError::Conflict {
                resource: "time_sheet".to_string(),
                message: "Employee already has an active session".to_string(),
            });
        }

        let session = sqlx::query_as::<_, TimeSheet>(
            r#"
            INSERT INTO time_sheets (employee_id, break_type_id, punch_in, work_date, is_active)
            VALUES ($1, $2, $3, $4, true)
            RETURNING id, employee_id, break_type_id, punch_in, punch_out, work_date, is_active
            "#,
        )
        .bind(employee_id)
        .bind(input.break_type_id)
        .bind(now)
        .bind(now.date_naive())
        .fetch_one(&mut *tx)
        .await
        .map_err(map_punch_in_error)?;

        tx.commit().await?;

        tracing::info!(
            employee_id = %employee_id,
            session_id = %session.id,
            "Punch-in recorded"
        );

        Ok(session)
    }

    /// Punch out: close the employee's Active session.
    ///
    /// punch_out and is_active are written in one UPDATE so the transition
    /// is atomic; with no Active row this is a NotFound ("nothing to punch
    /// out"), distinct from the punch-in Conflict.
    pub async fn punch_out(&self, employee_id: Uuid) -> AppResult<TimeSheet> {
        let now = Utc::now();

        let session = sqlx::query_as::<_, TimeSheet>(
            r#"
            UPDATE time_sheets
            SET punch_out = $2, is_active = false
            WHERE employee_id = $1 AND is_active = true
            RETURNING id, employee_id, break_type_id, punch_in, punch_out, work_date, is_active
            "#,
        )
        .bind(employee_id)
        .bind(now)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Active session".to_string()))?;

        tracing::info!(
            employee_id = %employee_id,
            session_id = %session.id,
            "Punch-out recorded"
        );

        Ok(session)
    }

    /// Close a specific session by id (admin path). Fails with NotFound if
    /// the session does not exist or is already Closed.
    pub async fn close_session(&self, session_id: Uuid) -> AppResult<TimeSheet> {
        let now = Utc::now();

        sqlx::query_as::<_, TimeSheet>(
            r#"
            UPDATE time_sheets
            SET punch_out = $2, is_active = false
            WHERE id = $1 AND is_active = true
            RETURNING id, employee_id, break_type_id, punch_in, punch_out, work_date, is_active
            "#,
        )
        .bind(session_id)
        .bind(now)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Active session".to_string()))
    }

    /// The employee's Active session, if any
    pub async fn active_session(&self, employee_id: Uuid) -> AppResult<Option<TimeSheet>> {
        let session = sqlx::query_as::<_, TimeSheet>(
            r#"
            SELECT id, employee_id, break_type_id, punch_in, punch_out, work_date, is_active
            FROM time_sheets
            WHERE employee_id = $1 AND is_active = true
            "#,
        )
        .bind(employee_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(session)
    }

    /// The employee's Active session with its live elapsed time
    pub async fn session_status(&self, employee_id: Uuid) -> AppResult<Option<SessionStatus>> {
        let now = Utc::now();
        Ok(self.active_session(employee_id).await?.map(|session| {
            let elapsed = format_elapsed(elapsed_seconds(session.punch_in, session.punch_out, now));
            SessionStatus { session, elapsed }
        }))
    }
}
