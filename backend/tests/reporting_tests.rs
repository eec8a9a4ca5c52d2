//! Reporting and pagination tests
//!
//! Property-based and unit tests for:
//! - Property 7: pagination math (limits, offsets, page counts)
//! - Property 8: per-break-type seconds sum to the employee total
//! - Property 9: hour totals are derived, never stored

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{Pagination, PaginationMeta};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::collections::BTreeMap;
use uuid::Uuid;

use staffsync_backend::services::reporting::{ReportingService, TimesheetFilter};

// ============================================================================
// Aggregation model
// ============================================================================

fn seconds_to_hours(total_seconds: i64) -> Decimal {
    let mut hours = Decimal::from(total_seconds) / Decimal::from(3600);
    hours = hours.round_dp(2);
    hours.rescale(2);
    hours
}

/// Fold (break type, seconds) rows into per-type subtotals and a total,
/// mirroring the read-side summary aggregation.
fn fold_rows(rows: &[(String, i64)]) -> (BTreeMap<String, i64>, i64) {
    let mut by_type: BTreeMap<String, i64> = BTreeMap::new();
    let mut total = 0i64;
    for (break_type, seconds) in rows {
        *by_type.entry(break_type.clone()).or_insert(0) += seconds;
        total += seconds;
    }
    (by_type, total)
}

// ============================================================================
// Property Test Strategies
// ============================================================================

fn row_strategy() -> impl Strategy<Value = (String, i64)> {
    (
        prop_oneof![
            Just("Standard".to_string()),
            Just("Lunch".to_string()),
            Just("Overtime".to_string()),
        ],
        0i64..86_400,
    )
}

// ============================================================================
// Property-Based Tests
// ============================================================================

proptest! {
    /// Per-break-type subtotals always sum to the overall total.
    #[test]
    fn test_subtotals_sum_to_total(rows in prop::collection::vec(row_strategy(), 0..30)) {
        let (by_type, total) = fold_rows(&rows);
        let summed: i64 = by_type.values().sum();
        prop_assert_eq!(summed, total);
    }

    /// Page limits and offsets never overlap and never skip rows.
    #[test]
    fn test_pages_tile_the_result_set(
        total_items in 0u64..10_000,
        per_page in 1u32..100,
    ) {
        let mut covered = 0u64;
        let mut page = 1u32;
        loop {
            let p = Pagination { page, per_page }.clamped();
            prop_assert_eq!(p.offset(), covered as i64);
            let remaining = total_items - covered;
            let on_page = remaining.min(p.limit() as u64);
            covered += on_page;
            if on_page < p.limit() as u64 {
                break;
            }
            page += 1;
        }
        prop_assert_eq!(covered, total_items);
    }

    /// total_pages is the ceiling of items / page size; an empty result
    /// has zero pages.
    #[test]
    fn test_total_pages_is_ceiling(
        total_items in 0u64..10_000,
        per_page in 1u32..100,
    ) {
        let p = Pagination { page: 1, per_page }.clamped();
        let meta = PaginationMeta::new(&p, total_items);
        let expected = total_items.div_ceil(u64::from(per_page)) as u32;
        prop_assert_eq!(meta.total_pages, expected);
    }

    /// Hour conversion is monotone: more seconds never reads as fewer hours.
    #[test]
    fn test_hours_monotone(a in 0i64..1_000_000, b in 0i64..1_000_000) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(seconds_to_hours(lo) <= seconds_to_hours(hi));
    }
}

// ============================================================================
// Unit Tests: Pagination and Rounding
// ============================================================================

#[test]
fn test_page_window_of_twenty_five() {
    // 25 employees at 10 per page: pages hold 10, 10, 5
    let p1 = Pagination { page: 1, per_page: 10 }.clamped();
    let p3 = Pagination { page: 3, per_page: 10 }.clamped();
    assert_eq!(p1.offset(), 0);
    assert_eq!(p3.offset(), 20);

    let meta = PaginationMeta::new(&p1, 25);
    assert_eq!(meta.total_pages, 3);
    assert_eq!(meta.total_items, 25);
}

#[test]
fn test_hours_keep_two_decimal_places() {
    assert_eq!(seconds_to_hours(7200).to_string(), "2.00");
    assert_eq!(seconds_to_hours(5400).to_string(), "1.50");
    assert_eq!(seconds_to_hours(0).to_string(), "0.00");
    // 1234 seconds = 0.34277... hours, rounds to 0.34
    assert_eq!(seconds_to_hours(1234).to_string(), "0.34");
}

#[test]
fn test_fold_separates_break_types() {
    let rows = vec![
        ("Standard".to_string(), 3600),
        ("Lunch".to_string(), 1800),
        ("Standard".to_string(), 1800),
    ];
    let (by_type, total) = fold_rows(&rows);
    assert_eq!(by_type["Standard"], 5400);
    assert_eq!(by_type["Lunch"], 1800);
    assert_eq!(total, 7200);
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

/// Pick a work date far in the past and unlikely to collide with other
/// test runs, so the date-range filter isolates this test's rows.
fn isolated_work_date() -> NaiveDate {
    let offset = (Uuid::new_v4().as_u128() % 9000) as i64;
    NaiveDate::from_ymd_opt(1900, 1, 1).unwrap() + chrono::Duration::days(offset)
}

/// Raw timesheet listings page over sessions (25 rows -> 10/10/5) while
/// the hours summary pages over employees: five employees with five
/// one-hour sessions each collapse to five summary rows of 5.00 hours,
/// recomputed from punch timestamps on every request.
#[tokio::test]
#[ignore] // Requires database connection
async fn test_summary_pages_over_employees() {
    let pool = test_pool().await;
    let day = isolated_work_date();

    let break_type = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO break_types (name) VALUES ($1) RETURNING id",
    )
    .bind(format!("Break {}", Uuid::new_v4().simple()))
    .fetch_one(&pool)
    .await
    .expect("seed break type");

    for _ in 0..5 {
        let employee = seed_employee(&pool).await;
        for session in 0..5i64 {
            let punch_in = day
                .and_hms_opt(8 + session as u32, 0, 0)
                .unwrap()
                .and_utc();
            sqlx::query(
                r#"
                INSERT INTO time_sheets
                    (employee_id, break_type_id, punch_in, punch_out, work_date, is_active)
                VALUES ($1, $2, $3, $4, $5, false)
                "#,
            )
            .bind(employee)
            .bind(break_type)
            .bind(punch_in)
            .bind(punch_in + chrono::Duration::hours(1))
            .bind(day)
            .execute(&pool)
            .await
            .expect("seed session");
        }
    }

    let service = ReportingService::new(pool.clone());
    let filter = TimesheetFilter {
        employee_id: None,
        start_date: Some(day),
        end_date: Some(day),
    };

    // Raw listing pages over sessions
    let page1 = service
        .query_timesheets(&filter, &Pagination { page: 1, per_page: 10 })
        .await
        .unwrap();
    assert_eq!(page1.data.len(), 10);
    assert_eq!(page1.pagination.total_items, 25);
    assert_eq!(page1.pagination.total_pages, 3);

    let page3 = service
        .query_timesheets(&filter, &Pagination { page: 3, per_page: 10 })
        .await
        .unwrap();
    assert_eq!(page3.data.len(), 5);

    // Summary pages over employees: one row per employee
    let summary = service
        .hours_summary(&filter, &Pagination { page: 1, per_page: 2 })
        .await
        .unwrap();
    assert_eq!(summary.data.len(), 2);
    assert_eq!(summary.pagination.total_items, 5);
    assert_eq!(summary.pagination.total_pages, 3);

    for employee in &summary.data {
        assert_eq!(employee.total_seconds, 5 * 3600);
        assert_eq!(employee.total_hours.to_string(), "5.00");
        assert_eq!(employee.by_break_type.len(), 1);
        assert_eq!(employee.elapsed, "05:00:00");
    }
}
