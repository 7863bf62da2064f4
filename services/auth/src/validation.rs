//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email must be at most 254 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.len() < 8 {
        return Err("Password must be at least 8 characters long".to_string());
    }

    if password.len() > 128 {
        return Err("Password must be at most 128 characters long".to_string());
    }

    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if !has_upper {
        return Err("Password must contain at least one uppercase letter".to_string());
    }

    if !has_lower {
        return Err("Password must contain at least one lowercase letter".to_string());
    }

    if !has_digit {
        return Err("Password must contain at least one digit".to_string());
    }

    Ok(())
}

/// Validate the profile fields a help seeker must supply at registration
pub fn validate_profile(full_name: &str, description: &str, phone_number: &str) -> Result<(), String> {
    if full_name.trim().is_empty() {
        return Err("Full name is required".to_string());
    }

    if full_name.len() > 200 {
        return Err("Full name must be at most 200 characters long".to_string());
    }

    if description.trim().is_empty() {
        return Err("Description is required".to_string());
    }

    validate_phone_number(phone_number)
}

/// Validate phone number: optional leading `+`, digits, spaces, dashes, parentheses
pub fn validate_phone_number(phone_number: &str) -> Result<(), String> {
    let trimmed = phone_number.trim();
    if trimmed.is_empty() {
        return Err("Phone number is required".to_string());
    }

    static PHONE_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = PHONE_REGEX
        .get_or_init(|| Regex::new(r"^\+?[0-9 ()-]{6,20}$").expect("Failed to compile phone regex"));

    if !regex.is_match(trimmed) {
        return Err("Invalid phone number format".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_rules() {
        assert!(validate_email("seeker@example.com").is_ok());
        assert_eq!(validate_email("").unwrap_err(), "Email is required");
        assert_eq!(validate_email("no-at-sign").unwrap_err(), "Invalid email format");
        let long = format!("{}@example.com", "a".repeat(250));
        assert!(validate_email(&long).is_err());
    }

    #[test]
    fn password_rules() {
        assert!(validate_password("Str0ngPass").is_ok());
        assert!(validate_password("short1A").is_err());
        assert!(validate_password("alllowercase1").is_err());
        assert!(validate_password("ALLUPPERCASE1").is_err());
        assert!(validate_password("NoDigitsHere").is_err());
    }

    #[test]
    fn description_and_phone_are_mandatory() {
        assert!(validate_profile("Ada", "needs a wheelchair", "+1 555-0100").is_ok());
        assert_eq!(
            validate_profile("Ada", "   ", "+15550100").unwrap_err(),
            "Description is required"
        );
        assert_eq!(
            validate_profile("Ada", "story", "").unwrap_err(),
            "Phone number is required"
        );
        assert_eq!(
            validate_profile("", "story", "+15550100").unwrap_err(),
            "Full name is required"
        );
    }

    #[test]
    fn phone_format() {
        assert!(validate_phone_number("(555) 010-0100").is_ok());
        assert!(validate_phone_number("call me maybe").is_err());
        assert!(validate_phone_number("123").is_err());
    }
}
