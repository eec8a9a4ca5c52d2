//! Route definitions for the StaffSync backend

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (public)
        .nest("/auth", auth_routes())
        // Protected routes - employee directory
        .nest("/employees", employee_routes(state.clone()))
        // Protected routes - time punching
        .nest("/timesheets", timesheet_routes(state.clone()))
        // Protected routes - break type management
        .nest("/break-types", break_type_routes(state.clone()))
        // Protected routes - roles, permissions and overrides
        .nest("/permissions", permission_routes(state.clone()))
        // Protected routes - leave tracking
        .nest("/leaves", leave_routes(state.clone()))
        // Protected routes - reporting
        .nest("/reports", report_routes(state))
}

/// Authentication routes (public)
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(handlers::login))
        .route("/refresh", post(handlers::refresh))
}

/// Employee directory routes (protected)
fn employee_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_employees).post(handlers::create_employee),
        )
        .route(
            "/:employee_id",
            get(handlers::get_employee).delete(handlers::deactivate_employee),
        )
        .route(
            "/:employee_id/permissions",
            get(handlers::list_effective_permissions),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Time punching routes (protected)
fn timesheet_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/punch-in", post(handlers::punch_in))
        .route("/punch-out", post(handlers::punch_out))
        .route("/active", get(handlers::get_session_status))
        .route("/:session_id/close", post(handlers::close_session))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Break type routes (protected)
fn break_type_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_break_types).post(handlers::create_break_type),
        )
        .route(
            "/:break_type_id",
            get(handlers::get_break_type).delete(handlers::deactivate_break_type),
        )
        .route(
            "/:break_type_id/verify-password",
            post(handlers::verify_break_password),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Role/permission administration routes (protected)
fn permission_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_permissions))
        .route("/roles", get(handlers::list_roles))
        .route("/overrides", post(handlers::grant_override))
        .route(
            "/overrides/:employee_id/:permission_id",
            delete(handlers::revoke_override),
        )
        .route("/check", get(handlers::check_authorization))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Leave tracking routes (protected)
fn leave_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_leaves).post(handlers::request_leave))
        .route("/mine", get(handlers::list_my_leaves))
        .route("/:leave_id", get(handlers::get_leave))
        .route("/:leave_id/status", put(handlers::set_leave_status))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Reporting routes (protected)
fn report_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/timesheets", get(handlers::list_timesheets))
        .route("/hours", get(handlers::hours_summary))
        .route("/hours/export", get(handlers::export_summary_csv))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
