use regex::Regex;
use std::sync::OnceLock;

use super::ApiError;
use crate::constants::limits;

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid regex"))
}

pub fn validate_name(name: &str) -> Result<&str, ApiError> {
    let trimmed = name.trim();
    let len = trimmed.chars().count();

    if len < limits::NAME_MIN_LEN || len > limits::NAME_MAX_LEN {
        return Err(ApiError::validation(format!(
            "Name must be between {} and {} characters",
            limits::NAME_MIN_LEN,
            limits::NAME_MAX_LEN
        )));
    }
    Ok(trimmed)
}

pub fn validate_email(email: &str) -> Result<String, ApiError> {
    let normalized = email.trim().to_lowercase();
    if !email_regex().is_match(&normalized) {
        return Err(ApiError::validation("Please include a valid email"));
    }
    Ok(normalized)
}

pub fn validate_password(password: &str) -> Result<&str, ApiError> {
    if password.chars().count() < limits::PASSWORD_MIN_LEN {
        return Err(ApiError::validation(format!(
            "Please enter a password with {} or more characters",
            limits::PASSWORD_MIN_LEN
        )));
    }
    Ok(password)
}

pub fn require_password(password: &str) -> Result<&str, ApiError> {
    if password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }
    Ok(password)
}

pub fn validate_phone(phone: &str) -> Result<&str, ApiError> {
    let trimmed = phone.trim();
    if trimmed.len() != limits::PHONE_DIGITS || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(ApiError::validation(format!(
            "Phone number must be {} digits",
            limits::PHONE_DIGITS
        )));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("  Sam  ").unwrap(), "Sam");
        assert!(validate_name("A").is_err());
        assert!(validate_name(&"x".repeat(51)).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert_eq!(
            validate_email(" Member@Gym.COM ").unwrap(),
            "member@gym.com"
        );
        assert!(validate_email("member@gym").is_err());
        assert!(validate_email("not an email").is_err());
        assert!(validate_email("").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("secret").is_ok());
        assert!(validate_password("12345").is_err());
        assert!(require_password("").is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert_eq!(validate_phone("0123456789").unwrap(), "0123456789");
        assert!(validate_phone("012345678").is_err());
        assert!(validate_phone("01234abcde").is_err());
    }
}
