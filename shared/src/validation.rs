//! Validation utilities for StaffSync

use chrono::NaiveDate;

/// Validate employee code format (3-16 chars, uppercase alphanumeric with dashes)
pub fn validate_employee_code(code: &str) -> Result<(), &'static str> {
    if code.len() < 3 || code.len() > 16 {
        return Err("Employee code must be 3-16 characters");
    }
    if !code
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-')
    {
        return Err("Employee code may only contain uppercase letters, digits and dashes");
    }
    if code.starts_with('-') || code.ends_with('-') {
        return Err("Employee code may not start or end with a dash");
    }
    Ok(())
}

/// Validate that a date range is ordered (start <= end)
pub fn validate_date_range(start: NaiveDate, end: NaiveDate) -> Result<(), &'static str> {
    if start > end {
        return Err("Start date must not be after end date");
    }
    Ok(())
}

/// Validate a break type name (non-empty, at most 64 chars)
pub fn validate_break_type_name(name: &str) -> Result<(), &'static str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("Break type name must not be empty");
    }
    if trimmed.len() > 64 {
        return Err("Break type name must be at most 64 characters");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_employee_codes() {
        assert!(validate_employee_code("EMP-001").is_ok());
        assert!(validate_employee_code("HR1").is_ok());
        assert!(validate_employee_code("A1B2C3D4E5F6G7H8").is_ok());
    }

    #[test]
    fn test_invalid_employee_codes() {
        assert!(validate_employee_code("AB").is_err()); // Too short
        assert!(validate_employee_code("A1B2C3D4E5F6G7H8X").is_err()); // Too long
        assert!(validate_employee_code("emp-001").is_err()); // Lowercase
        assert!(validate_employee_code("EMP_001").is_err()); // Underscore
        assert!(validate_employee_code("-EMP001").is_err()); // Leading dash
    }

    #[test]
    fn test_date_range_validation() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert!(validate_date_range(start, end).is_ok());
        assert!(validate_date_range(end, start).is_err());
        assert!(validate_date_range(start, start).is_ok());
    }

    #[test]
    fn test_break_type_names() {
        assert!(validate_break_type_name("Lunch").is_ok());
        assert!(validate_break_type_name("  ").is_err());
        assert!(validate_break_type_name(&"x".repeat(65)).is_err());
    }
}
