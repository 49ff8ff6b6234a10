//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

use crate::error::{ServiceError, ServiceResult};
use crate::models::{AttendanceStatus, NewEmployee, NewUser};

/// Maximum length of a department name
pub const DEPARTMENT_NAME_MAX_LEN: usize = 191;

fn invalid(message: &str) -> ServiceError {
    ServiceError::Validation(message.to_string())
}

/// Validate username
pub fn validate_username(username: &str) -> ServiceResult<()> {
    if username.is_empty() {
        return Err(invalid("Username is required"));
    }

    if username.len() < 3 {
        return Err(invalid("Username must be at least 3 characters long"));
    }

    if username.len() > 32 {
        return Err(invalid("Username must be at most 32 characters long"));
    }

    static USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = USERNAME_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9_.-]+$").expect("Failed to compile username regex")
    });

    if !regex.is_match(username) {
        return Err(invalid(
            "Username can only contain letters, numbers, dots, hyphens and underscores",
        ));
    }

    Ok(())
}

/// Validate email
pub fn validate_email(email: &str) -> ServiceResult<()> {
    if email.is_empty() {
        return Err(invalid("Email is required"));
    }

    if email.len() > 254 {
        return Err(invalid("Email must be at most 254 characters long"));
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err(invalid("Invalid email format"));
    }

    Ok(())
}

/// Validate password length, counted in characters
pub fn validate_password(password: &str) -> ServiceResult<()> {
    let length = password.chars().count();

    if length < 6 {
        return Err(invalid("Password must be at least 6 characters long"));
    }

    if length > 72 {
        return Err(invalid("Password must be at most 72 characters long"));
    }

    Ok(())
}

/// Validate that a required text field is present and not blank
pub fn validate_required(field: &str, value: &str) -> ServiceResult<()> {
    if value.trim().is_empty() {
        return Err(ServiceError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

/// Validate department name
pub fn validate_department_name(name: &str) -> ServiceResult<()> {
    validate_required("Department name", name)?;

    if name.chars().count() > DEPARTMENT_NAME_MAX_LEN {
        return Err(ServiceError::Validation(format!(
            "Department name must be at most {} characters long",
            DEPARTMENT_NAME_MAX_LEN
        )));
    }

    Ok(())
}

/// Parse an attendance status, which must be exactly `Present` or `Absent`
pub fn parse_attendance_status(status: &str) -> ServiceResult<AttendanceStatus> {
    status.parse().map_err(ServiceError::Validation)
}

/// Validate a registration payload
pub fn validate_new_user(new_user: &NewUser) -> ServiceResult<()> {
    validate_username(&new_user.username)?;
    validate_email(&new_user.email)?;
    validate_password(&new_user.password)
}

/// Validate an employee creation payload
pub fn validate_new_employee(employee: &NewEmployee) -> ServiceResult<()> {
    validate_required("Employee ID", &employee.employee_id)?;
    validate_required("First name", &employee.first_name)?;
    validate_required("Department", &employee.department)?;
    validate_email(&employee.email)?;
    validate_password(&employee.password)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username() {
        assert!(validate_username("admin").is_ok());
        assert!(validate_username("jane.doe-1").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("ab").is_err());
        assert!(validate_username(&"a".repeat(33)).is_err());
        assert!(validate_username("no spaces").is_err());
        assert!(validate_username("at@sign").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("ada@example.com").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("missing@tld").is_err());
    }

    #[test]
    fn test_validate_password_bounds() {
        assert!(validate_password("12345").is_err());
        assert!(validate_password("123456").is_ok());
        assert!(validate_password(&"x".repeat(72)).is_ok());
        assert!(validate_password(&"x".repeat(73)).is_err());
        // Multi-byte characters count once each.
        assert!(validate_password("ééééééé").is_ok());
    }

    #[test]
    fn test_validate_department_name() {
        assert!(validate_department_name("Engineering").is_ok());
        assert!(validate_department_name("   ").is_err());
        assert!(validate_department_name(&"d".repeat(191)).is_ok());
        assert!(validate_department_name(&"d".repeat(192)).is_err());
    }

    #[test]
    fn test_parse_attendance_status() {
        assert_eq!(
            parse_attendance_status("Present").unwrap(),
            AttendanceStatus::Present
        );
        match parse_attendance_status("Late") {
            Err(ServiceError::Validation(msg)) => {
                assert_eq!(msg, "Status must be 'Present' or 'Absent'.")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_validate_new_employee_requires_fields() {
        let employee = NewEmployee {
            employee_id: " ".into(),
            first_name: "Ada".into(),
            last_name: None,
            email: "ada@example.com".into(),
            department: "Engineering".into(),
            password: "secret1".into(),
            gender: None,
            address: None,
            pin: None,
            city: None,
        };
        assert!(matches!(
            validate_new_employee(&employee),
            Err(ServiceError::Validation(_))
        ));
    }
}
