//! Business logic services

pub mod auth;
pub mod authorization;
pub mod break_type;
pub mod employee;
pub mod leave;
pub mod reporting;
pub mod timesheet;

pub use auth::AuthService;
pub use authorization::AuthorizationService;
pub use break_type::BreakTypeService;
pub use employee::EmployeeService;
pub use leave::LeaveTrackerService;
pub use reporting::ReportingService;
pub use timesheet::TimesheetService;
