//! HTTP handlers

pub mod auth;
pub mod break_type;
pub mod employee;
pub mod health;
pub mod leave;
pub mod permission;
pub mod reporting;
pub mod timesheet;

pub use auth::*;
pub use break_type::*;
pub use employee::*;
pub use health::*;
pub use leave::*;
pub use permission::*;
pub use reporting::*;
pub use timesheet::*;
