//! Domain models shared across StaffSync components

use serde::{Deserialize, Serialize};

/// Well-known permission names gating protected resources.
///
/// These are seeded into the `permissions` table and matched
/// case-sensitively by the authorization resolver.
pub mod permission_names {
    pub const EMPLOYEES: &str = "Employees";
    pub const TIME_SHEET: &str = "TimeSheet";
    pub const BREAK_TYPES: &str = "BreakTypes";
    pub const LEAVE_TRACKERS: &str = "LeaveTrackers";
    pub const PERMISSIONS: &str = "Permissions";
    pub const REPORTS: &str = "Reports";
}

/// Approval status of a leave request.
///
/// Any status may be set to any other status by a permitted caller;
/// there is no guarded transition graph.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
    Expired,
}

impl LeaveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaveStatus::Pending => "pending",
            LeaveStatus::Approved => "approved",
            LeaveStatus::Rejected => "rejected",
            LeaveStatus::Cancelled => "cancelled",
            LeaveStatus::Expired => "expired",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(LeaveStatus::Pending),
            "approved" => Some(LeaveStatus::Approved),
            "rejected" => Some(LeaveStatus::Rejected),
            "cancelled" => Some(LeaveStatus::Cancelled),
            "expired" => Some(LeaveStatus::Expired),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leave_status_round_trip() {
        for status in [
            LeaveStatus::Pending,
            LeaveStatus::Approved,
            LeaveStatus::Rejected,
            LeaveStatus::Cancelled,
            LeaveStatus::Expired,
        ] {
            assert_eq!(LeaveStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(LeaveStatus::parse("unknown"), None);
    }
}
