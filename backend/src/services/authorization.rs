//! Authorization resolver
//!
//! Decides, for a given principal and a named protected resource, whether
//! access is granted. The effective permission set is the union of the
//! permissions attached to the principal's role and the per-employee
//! override grants. Overrides are additive only; there is no deny override.
//!
//! Every decision is recomputed from persisted data on each call, so a
//! revoked grant takes effect on the next request without cache
//! invalidation.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;

/// Authorization service
#[derive(Clone)]
pub struct AuthorizationService {
    db: PgPool,
}

/// Role information
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
}

/// Permission information
#[derive(Debug, Serialize, Clone, sqlx::FromRow)]
pub struct Permission {
    pub id: Uuid,
    pub name: String,
}

/// A permission in an employee's effective set, with where it came from
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct EffectivePermission {
    pub id: Uuid,
    pub name: String,
    pub auth_level: i16,
    pub from_override: bool,
}

/// Input for granting a per-employee permission override
#[derive(Debug, Deserialize)]
pub struct GrantOverrideInput {
    pub employee_id: Uuid,
    pub permission_id: Uuid,
    pub auth_level: i16,
}

/// Union of role-derived permission ids and per-employee overrides.
///
/// Kept as a standalone function so the resolution semantics can be tested
/// without a database: the result is exactly the set union, and empty
/// inputs produce an empty (deny-all) set.
pub fn effective_permission_set(
    role_permissions: &[Uuid],
    override_permissions: &[Uuid],
) -> HashSet<Uuid> {
    role_permissions
        .iter()
        .chain(override_permissions.iter())
        .copied()
        .collect()
}

impl AuthorizationService {
    /// Create a new AuthorizationService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Resolve the effective permission ids for a principal.
    ///
    /// An unknown role name or employee id simply contributes nothing,
    /// so unresolvable principals fail safe to deny-all.
    pub async fn effective_permission_ids(
        &self,
        role_name: &str,
        employee_id: Uuid,
    ) -> AppResult<HashSet<Uuid>> {
        let role_permissions = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT rp.permission_id
            FROM role_permissions rp
            JOIN roles r ON r.id = rp.role_id
            WHERE r.name = $1
            "#,
        )
        .bind(role_name)
        .fetch_all(&self.db)
        .await?;

        let override_permissions = sqlx::query_scalar::<_, Uuid>(
            "SELECT permission_id FROM employee_permissions WHERE employee_id = $1",
        )
        .bind(employee_id)
        .fetch_all(&self.db)
        .await?;

        Ok(effective_permission_set(
            &role_permissions,
            &override_permissions,
        ))
    }

    /// Check whether a principal holds a named permission.
    ///
    /// Returns `Ok(false)` both for a missing permission name and for a
    /// plain deny, so callers cannot distinguish "does not exist" from
    /// "not granted".
    pub async fn is_authorized(
        &self,
        principal: &AuthUser,
        permission_name: &str,
    ) -> AppResult<bool> {
        let permission_id = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM permissions WHERE name = $1",
        )
        .bind(permission_name)
        .fetch_optional(&self.db)
        .await?;

        let Some(permission_id) = permission_id else {
            return Ok(false);
        };

        let effective = self
            .effective_permission_ids(&principal.role, principal.employee_id)
            .await?;

        Ok(effective.contains(&permission_id))
    }

    /// Guard a handler on a named permission, mapping deny to a 403 error.
    pub async fn require(&self, principal: &AuthUser, permission_name: &str) -> AppResult<()> {
        if self.is_authorized(principal, permission_name).await? {
            Ok(())
        } else {
            Err(AppError::InsufficientPermissions)
        }
    }

    /// Check that a raw claims-bearing principal still maps to a valid
    /// employee record.
    ///
    /// Returns `None` when fully authorized and `Some(reason)` when the
    /// principal should be treated as restricted. Callers treat any
    /// non-`None` result as a deny with that diagnostic.
    pub async fn check_authorization(&self, principal: &AuthUser) -> AppResult<Option<String>> {
        let row = sqlx::query_as::<_, (String, bool, Option<String>)>(
            r#"
            SELECT e.employee_code, e.is_active, r.name
            FROM employees e
            LEFT JOIN roles r ON r.id = e.role_id
            WHERE e.id = $1
            "#,
        )
        .bind(principal.employee_id)
        .fetch_optional(&self.db)
        .await?;

        let Some((employee_code, is_active, role_name)) = row else {
            return Ok(Some("No employee record for this account".to_string()));
        };

        if !is_active {
            return Ok(Some("Employee account is disabled".to_string()));
        }

        if employee_code != principal.employee_code {
            return Ok(Some("Employee code no longer matches".to_string()));
        }

        match role_name {
            Some(name) if name == principal.role => Ok(None),
            _ => Ok(Some(
                "Role assignment has changed, please sign in again".to_string(),
            )),
        }
    }

    /// Grant a per-employee permission override.
    ///
    /// Inserts are idempotent: granting the same
    /// (employee, permission, auth_level) twice leaves one row and both
    /// calls succeed.
    pub async fn grant_override(&self, input: GrantOverrideInput) -> AppResult<()> {
        // Validate both sides exist so a typo'd grant fails loudly as a
        // NotFound rather than a foreign-key violation
        let permission_exists = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM permissions WHERE id = $1",
        )
        .bind(input.permission_id)
        .fetch_one(&self.db)
        .await?;

        if permission_exists == 0 {
            return Err(AppError::NotFound("Permission".to_string()));
        }

        let employee_exists = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM employees WHERE id = $1",
        )
        .bind(input.employee_id)
        .fetch_one(&self.db)
        .await?;

        if employee_exists == 0 {
            return Err(AppError::NotFound("Employee".to_string()));
        }

        sqlx::query(
            r#"
            INSERT INTO employee_permissions (employee_id, permission_id, auth_level)
            VALUES ($1, $2, $3)
            ON CONFLICT (employee_id, permission_id, auth_level) DO NOTHING
            "#,
        )
        .bind(input.employee_id)
        .bind(input.permission_id)
        .bind(input.auth_level)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    /// Revoke a per-employee override (removing it leaves only role-derived
    /// permissions; role grants are never affected)
    pub async fn revoke_override(
        &self,
        employee_id: Uuid,
        permission_id: Uuid,
    ) -> AppResult<()> {
        sqlx::query(
            "DELETE FROM employee_permissions WHERE employee_id = $1 AND permission_id = $2",
        )
        .bind(employee_id)
        .bind(permission_id)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    /// Get all roles
    pub async fn get_roles(&self) -> AppResult<Vec<Role>> {
        let roles = sqlx::query_as::<_, Role>("SELECT id, name FROM roles ORDER BY name ASC")
            .fetch_all(&self.db)
            .await?;

        Ok(roles)
    }

    /// Get all available permissions
    pub async fn get_all_permissions(&self) -> AppResult<Vec<Permission>> {
        let permissions =
            sqlx::query_as::<_, Permission>("SELECT id, name FROM permissions ORDER BY name ASC")
                .fetch_all(&self.db)
                .await?;

        Ok(permissions)
    }

    /// List an employee's effective permissions with names and levels,
    /// for the admin console
    pub async fn list_effective_permissions(
        &self,
        employee_id: Uuid,
    ) -> AppResult<Vec<EffectivePermission>> {
        let permissions = sqlx::query_as::<_, EffectivePermission>(
            r#"
            SELECT p.id, p.name, rp.auth_level, false AS from_override
            FROM employees e
            JOIN role_permissions rp ON rp.role_id = e.role_id
            JOIN permissions p ON p.id = rp.permission_id
            WHERE e.id = $1
            UNION
            SELECT p.id, p.name, ep.auth_level, true AS from_override
            FROM employee_permissions ep
            JOIN permissions p ON p.id = ep.permission_id
            WHERE ep.employee_id = $1
            ORDER BY name ASC
            "#,
        )
        .bind(employee_id)
        .fetch_all(&self.db)
        .await?;

        Ok(permissions)
    }
}
