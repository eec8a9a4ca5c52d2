//! Employee directory service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use shared::{validate_employee_code, PaginatedResponse, Pagination, PaginationMeta};

/// Employee service
#[derive(Clone)]
pub struct EmployeeService {
    db: PgPool,
}

/// Employee information
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct Employee {
    pub id: Uuid,
    pub employee_code: String,
    pub name: String,
    pub email: String,
    pub role_id: Uuid,
    pub role_name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Input for creating an employee
#[derive(Debug, Deserialize, Validate)]
pub struct CreateEmployeeInput {
    pub employee_code: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    pub role_name: String,
}

impl EmployeeService {
    /// Create a new EmployeeService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create an employee with a role assigned by name
    pub async fn create_employee(&self, input: CreateEmployeeInput) -> AppResult<Employee> {
        input.validate().map_err(|e| AppError::Validation {
            field: "input".to_string(),
            message: e.to_string(),
        })?;

        validate_employee_code(&input.employee_code).map_err(|msg| AppError::Validation {
            field: "employee_code".to_string(),
            message: msg.to_string(),
        })?;

        let role_id = sqlx::query_scalar::<_, Uuid>("SELECT id FROM roles WHERE name = $1")
            .bind(&input.role_name)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Role".to_string()))?;

        let existing = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM employees WHERE employee_code = $1 OR email = $2",
        )
        .bind(&input.employee_code)
        .bind(&input.email)
        .fetch_one(&self.db)
        .await?;

        if existing > 0 {
            return Err(AppError::Conflict {
                resource: "employee".to_string(),
                message: "Employee code or email already in use".to_string(),
            });
        }

        let password_hash = bcrypt::hash(&input.password, bcrypt::DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        let employee = sqlx::query_as::<_, Employee>(
            r#"
            WITH inserted AS (
                INSERT INTO employees (employee_code, name, email, password_hash, role_id)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id, employee_code, name, email, role_id, is_active, created_at
            )
            SELECT i.id, i.employee_code, i.name, i.email, i.role_id, r.name AS role_name,
                   i.is_active, i.created_at
            FROM inserted i
            JOIN roles r ON r.id = i.role_id
            "#,
        )
        .bind(&input.employee_code)
        .bind(&input.name)
        .bind(&input.email)
        .bind(&password_hash)
        .bind(role_id)
        .fetch_one(&self.db)
        .await?;

        Ok(employee)
    }

    /// Get an employee by id
    pub async fn get_employee(&self, employee_id: Uuid) -> AppResult<Employee> {
        sqlx::query_as::<_, Employee>(
            r#"
            SELECT e.id, e.employee_code, e.name, e.email, e.role_id, r.name AS role_name,
                   e.is_active, e.created_at
            FROM employees e
            JOIN roles r ON r.id = e.role_id
            WHERE e.id = $1
            "#,
        )
        .bind(employee_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Employee".to_string()))
    }

    /// List employees, paginated, ordered by employee code
    pub async fn list_employees(
        &self,
        pagination: &Pagination,
    ) -> AppResult<PaginatedResponse<Employee>> {
        let total_items =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM employees")
                .fetch_one(&self.db)
                .await?;

        let employees = sqlx::query_as::<_, Employee>(
            r#"
            SELECT e.id, e.employee_code, e.name, e.email, e.role_id, r.name AS role_name,
                   e.is_active, e.created_at
            FROM employees e
            JOIN roles r ON r.id = e.role_id
            ORDER BY e.employee_code ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse {
            data: employees,
            pagination: PaginationMeta::new(pagination, total_items as u64),
        })
    }

    /// Disable an employee account (soft, reversible)
    pub async fn deactivate_employee(&self, employee_id: Uuid) -> AppResult<()> {
        let updated = sqlx::query("UPDATE employees SET is_active = false WHERE id = $1")
            .bind(employee_id)
            .execute(&self.db)
            .await?;

        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound("Employee".to_string()));
        }

        Ok(())
    }
}
