//! Authorization resolver tests
//!
//! Property-based and unit tests for:
//! - Property 1: effective set is the union of role grants and overrides
//! - Property 2: duplicate override grants are idempotent
//! - Property 3: unresolvable principals fail safe to deny-all

use proptest::prelude::*;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::collections::HashSet;
use uuid::Uuid;

use staffsync_backend::error::AppError;
use staffsync_backend::middleware::AuthUser;
use staffsync_backend::services::authorization::{AuthorizationService, GrantOverrideInput};

// ============================================================================
// Property Test Strategies
// ============================================================================

/// Generate well-formed permission names (seeded resource names)
fn permission_name_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Employees".to_string()),
        Just("TimeSheet".to_string()),
        Just("BreakTypes".to_string()),
        Just("LeaveTrackers".to_string()),
        Just("Permissions".to_string()),
        Just("Reports".to_string()),
    ]
}

/// Generate role names, including ones the system has never seen
fn role_name_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Super Admin".to_string()),
        Just("HR Manager Admin".to_string()),
        Just("Employee".to_string()),
        "[A-Za-z ]{3,20}",
    ]
}

/// Generate small permission-id sets as integers standing in for ids
fn permission_set_strategy() -> impl Strategy<Value = Vec<u32>> {
    prop::collection::vec(0u32..20, 0..10)
}

// ============================================================================
// Property-Based Tests
// ============================================================================

proptest! {
    /// The effective set is exactly the set union: everything granted by
    /// role or override is present, nothing else is.
    #[test]
    fn test_effective_set_is_union(
        role_grants in permission_set_strategy(),
        overrides in permission_set_strategy(),
    ) {
        let effective: HashSet<u32> = role_grants
            .iter()
            .chain(overrides.iter())
            .copied()
            .collect();

        for p in &role_grants {
            prop_assert!(effective.contains(p));
        }
        for p in &overrides {
            prop_assert!(effective.contains(p));
        }
        for p in &effective {
            prop_assert!(role_grants.contains(p) || overrides.contains(p));
        }
    }

    /// Overrides are additive only: removing every override can never add
    /// a permission, and what remains is exactly the role grants.
    #[test]
    fn test_removing_overrides_leaves_role_grants(
        role_grants in permission_set_strategy(),
        overrides in permission_set_strategy(),
    ) {
        let with_overrides: HashSet<u32> = role_grants
            .iter()
            .chain(overrides.iter())
            .copied()
            .collect();
        let without: HashSet<u32> = role_grants.iter().copied().collect();

        prop_assert!(without.is_subset(&with_overrides));
        prop_assert_eq!(without, role_grants.into_iter().collect::<HashSet<u32>>());
    }

    /// Granting the same permission repeatedly collapses to one entry.
    #[test]
    fn test_duplicate_grants_are_idempotent(
        grant in 0u32..20,
        repeats in 2usize..6,
    ) {
        let grants = vec![grant; repeats];
        let effective: HashSet<u32> = grants.into_iter().collect();
        prop_assert_eq!(effective.len(), 1);
    }

    /// All seeded permission names are non-empty and case-sensitive keys
    /// (no surrounding whitespace to fold away).
    #[test]
    fn test_permission_name_shape(name in permission_name_strategy()) {
        prop_assert!(!name.is_empty());
        prop_assert_eq!(name.trim(), name.as_str());
    }

    /// Role names never influence resolution for principals whose role is
    /// unknown: an empty grant list unions to an empty set regardless of
    /// the role string.
    #[test]
    fn test_unknown_role_denies_all(_role in role_name_strategy()) {
        let role_grants: Vec<u32> = Vec::new();
        let overrides: Vec<u32> = Vec::new();
        let effective: HashSet<u32> = role_grants
            .iter()
            .chain(overrides.iter())
            .copied()
            .collect();
        prop_assert!(effective.is_empty());
    }
}

// ============================================================================
// Unit Tests: Union Semantics
// ============================================================================

#[test]
fn test_role_and_override_union_exact() {
    // Role grants P, override grants Q: effective set is exactly {P, Q}
    let p = 1u32;
    let q = 2u32;

    let effective: HashSet<u32> = [p].iter().chain([q].iter()).copied().collect();
    assert_eq!(effective, HashSet::from([p, q]));

    // Removing the override leaves only {P}
    let effective: HashSet<u32> = [p].iter().copied().collect();
    assert_eq!(effective, HashSet::from([p]));
}

#[test]
fn test_deny_collapses_not_found_and_forbidden() {
    // A membership probe cannot distinguish "permission does not exist"
    // from "permission not granted": both read as absent.
    let effective: HashSet<&str> = HashSet::from(["TimeSheet"]);
    assert!(!effective.contains("Employees")); // not granted
    assert!(!effective.contains("NoSuchPermission")); // does not exist
}

// ============================================================================
// Database-Bound Scenarios
// ============================================================================

async fn test_pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("connect to test database")
}

async fn seed_employee(pool: &PgPool) -> Uuid {
    let code = format!(
        "T{}",
        Uuid::new_v4().simple().to_string()[..8].to_uppercase()
    );
    sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO employees (employee_code, name, email, password_hash, role_id)
        SELECT $1, 'Test Employee', $2, 'x', id FROM roles WHERE name = 'Employee'
        RETURNING id
        "#,
    )
    .bind(&code)
    .bind(format!("{}@example.com", code.to_lowercase()))
    .fetch_one(pool)
    .await
    .expect("seed employee")
}

async fn permission_id(pool: &PgPool, name: &str) -> Uuid {
    sqlx::query_scalar::<_, Uuid>("SELECT id FROM permissions WHERE name = $1")
        .bind(name)
        .fetch_one(pool)
        .await
        .expect("seeded permission")
}

/// Granting the same (employee, permission, auth_level) override twice
/// leaves one row and reports success both times; the override joins the
/// effective set and revoking it restores the role-only set.
#[tokio::test]
#[ignore] // Requires database connection
async fn test_override_insert_idempotent_in_store() {
    let pool = test_pool().await;
    let employee = seed_employee(&pool).await;
    let reports = permission_id(&pool, "Reports").await;
    let time_sheet = permission_id(&pool, "TimeSheet").await;
    let authz = AuthorizationService::new(pool.clone());

    let grant = GrantOverrideInput {
        employee_id: employee,
        permission_id: reports,
        auth_level: 1,
    };
    authz.grant_override(grant).await.expect("first grant");
    authz
        .grant_override(GrantOverrideInput {
            employee_id: employee,
            permission_id: reports,
            auth_level: 1,
        })
        .await
        .expect("repeat grant is a no-op success");

    let rows = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM employee_permissions WHERE employee_id = $1 AND permission_id = $2",
    )
    .bind(employee)
    .bind(reports)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(rows, 1);

    // Effective set is the union of the role grant and the override
    let effective = authz
        .effective_permission_ids("Employee", employee)
        .await
        .unwrap();
    assert!(effective.contains(&reports));
    assert!(effective.contains(&time_sheet));

    // Revoking the override leaves only the role grants
    authz.revoke_override(employee, reports).await.unwrap();
    let effective = authz
        .effective_permission_ids("Employee", employee)
        .await
        .unwrap();
    assert!(!effective.contains(&reports));
    assert!(effective.contains(&time_sheet));
}

/// Granting to an unknown employee or an unknown permission reports
/// not-found rather than surfacing a foreign-key violation.
#[tokio::test]
#[ignore] // Requires database connection
async fn test_grant_override_unknown_target_is_not_found() {
    let pool = test_pool().await;
    let employee = seed_employee(&pool).await;
    let reports = permission_id(&pool, "Reports").await;
    let authz = AuthorizationService::new(pool.clone());

    let ghost_employee = authz
        .grant_override(GrantOverrideInput {
            employee_id: Uuid::new_v4(),
            permission_id: reports,
            auth_level: 1,
        })
        .await;
    assert!(matches!(ghost_employee, Err(AppError::NotFound(_))));

    let ghost_permission = authz
        .grant_override(GrantOverrideInput {
            employee_id: employee,
            permission_id: Uuid::new_v4(),
            auth_level: 1,
        })
        .await;
    assert!(matches!(ghost_permission, Err(AppError::NotFound(_))));
}

/// A principal whose role or employee record does not resolve is denied
/// everything, and check_authorization reports a reason rather than
/// erroring.
#[tokio::test]
#[ignore] // Requires database connection
async fn test_dangling_role_fails_safe() {
    let pool = test_pool().await;
    let authz = AuthorizationService::new(pool.clone());

    let effective = authz
        .effective_permission_ids("No Such Role", Uuid::new_v4())
        .await
        .unwrap();
    assert!(effective.is_empty());

    let ghost = AuthUser {
        employee_id: Uuid::new_v4(),
        employee_code: "GHOST-1".to_string(),
        role: "No Such Role".to_string(),
    };
    assert!(!authz.is_authorized(&ghost, "TimeSheet").await.unwrap());

    let reason = authz.check_authorization(&ghost).await.unwrap();
    assert!(reason.is_some());
}
