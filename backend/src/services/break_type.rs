//! Break type management service
//!
//! Break types categorize punch sessions (e.g. "Clock-In", "Lunch").
//! A break type may carry a password; punch-in against a gated type is
//! refused until the caller confirms the secret. Secrets are stored as
//! SHA-256 digests and compared in constant time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::validate_break_type_name;

/// Break type service
#[derive(Clone)]
pub struct BreakTypeService {
    db: PgPool,
}

/// Break type information
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct BreakType {
    pub id: Uuid,
    pub name: String,
    /// Whether punch-in against this type requires a password
    pub has_password: bool,
    pub is_active: bool,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Database row including the stored secret digest
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct BreakTypeRow {
    pub id: Uuid,
    pub name: String,
    pub password_sha256: Option<String>,
    pub is_active: bool,
}

/// Input for creating a break type
#[derive(Debug, Deserialize)]
pub struct CreateBreakTypeInput {
    pub name: String,
    /// Optional gating password; omitted means the type is ungated
    pub password: Option<String>,
}

/// Hex-encoded SHA-256 digest of a break type password
pub fn hash_break_password(password: &str) -> String {
    let digest = Sha256::digest(password.as_bytes());
    format!("{:x}", digest)
}

/// Constant-time comparison of a submitted password against a stored digest
pub fn verify_break_password(stored_hex: &str, submitted: &str) -> bool {
    let submitted_hex = hash_break_password(submitted);
    let a = stored_hex.as_bytes();
    let b = submitted_hex.as_bytes();
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

impl BreakTypeService {
    /// Create a new BreakTypeService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a break type
    pub async fn create_break_type(
        &self,
        created_by: Uuid,
        input: CreateBreakTypeInput,
    ) -> AppResult<BreakType> {
        validate_break_type_name(&input.name).map_err(|msg| AppError::Validation {
            field: "name".to_string(),
            message: msg.to_string(),
        })?;

        let name = input.name.trim().to_string();

        let existing = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM break_types WHERE LOWER(name) = LOWER($1) AND is_active = true",
        )
        .bind(&name)
        .fetch_one(&self.db)
        .await?;

        if existing > 0 {
            return Err(AppError::Conflict {
                resource: "break_type".to_string(),
                message: "Break type with this name already exists".to_string(),
            });
        }

        if let Some(ref password) = input.password {
            if password.is_empty() {
                return Err(AppError::Validation {
                    field: "password".to_string(),
                    message: "Break type password must not be empty".to_string(),
                });
            }
        }

        let password_sha256 = input.password.as_deref().map(hash_break_password);

        let break_type = sqlx::query_as::<_, BreakType>(
            r#"
            INSERT INTO break_types (name, password_sha256, created_by)
            VALUES ($1, $2, $3)
            RETURNING id, name, password_sha256 IS NOT NULL AS has_password,
                      is_active, created_by, created_at
            "#,
        )
        .bind(&name)
        .bind(&password_sha256)
        .bind(created_by)
        .fetch_one(&self.db)
        .await?;

        Ok(break_type)
    }

    /// Get a break type by id
    pub async fn get_break_type(&self, break_type_id: Uuid) -> AppResult<BreakType> {
        sqlx::query_as::<_, BreakType>(
            r#"
            SELECT id, name, password_sha256 IS NOT NULL AS has_password,
                   is_active, created_by, created_at
            FROM break_types
            WHERE id = $1
            "#,
        )
        .bind(break_type_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Break type".to_string()))
    }

    /// List break types, optionally restricted to active ones
    pub async fn list_break_types(&self, active_only: bool) -> AppResult<Vec<BreakType>> {
        let break_types = sqlx::query_as::<_, BreakType>(
            r#"
            SELECT id, name, password_sha256 IS NOT NULL AS has_password,
                   is_active, created_by, created_at
            FROM break_types
            WHERE is_active = true OR $1 = false
            ORDER BY name ASC
            "#,
        )
        .bind(active_only)
        .fetch_all(&self.db)
        .await?;

        Ok(break_types)
    }

    /// Soft-disable a break type. Historical timesheets keep referencing it,
    /// so rows are never hard-deleted.
    pub async fn deactivate_break_type(&self, break_type_id: Uuid) -> AppResult<()> {
        let updated = sqlx::query(
            "UPDATE break_types SET is_active = false WHERE id = $1",
        )
        .bind(break_type_id)
        .execute(&self.db)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound("Break type".to_string()));
        }

        Ok(())
    }

    /// Verify a submitted password against a break type's stored secret.
    ///
    /// An ungated break type accepts any submission; an unknown id is a
    /// NotFound, not a silent deny.
    pub async fn verify_break_type_password(
        &self,
        break_type_id: Uuid,
        submitted: &str,
    ) -> AppResult<bool> {
        let row = self.fetch_row(break_type_id).await?;

        Ok(match row.password_sha256 {
            Some(ref stored) => verify_break_password(stored, submitted),
            None => true,
        })
    }

    pub(crate) async fn fetch_row(&self, break_type_id: Uuid) -> AppResult<BreakTypeRow> {
        sqlx::query_as::<_, BreakTypeRow>(
            "SELECT id, name, password_sha256, is_active FROM break_types WHERE id = $1",
        )
        .bind(break_type_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Break type".to_string()))
    }
}
