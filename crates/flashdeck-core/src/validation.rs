//! Client-side form validation
//!
//! Checked before any request is sent, so the user sees problems inline.

use std::sync::OnceLock;

use regex::Regex;

/// Characters accepted as the "special character" of a password
pub const PASSWORD_SPECIALS: &str = "!@#$%^&*(),.?\":{}|<>";

pub const MIN_PASSWORD_LEN: usize = 8;

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .unwrap_or_else(|e| panic!("email pattern is invalid: {}", e))
    })
}

/// Whether `email` looks like an address
pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email.trim())
}

/// Every password rule `password` breaks, in a fixed order
pub fn password_errors(password: &str) -> Vec<&'static str> {
    let mut errors = Vec::new();

    if password.chars().count() < MIN_PASSWORD_LEN {
        errors.push("Password must be at least 8 characters long");
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        errors.push("Password must contain at least one uppercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        errors.push("Password must contain at least one lowercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push("Password must contain at least one number");
    }
    if !password.chars().any(|c| PASSWORD_SPECIALS.contains(c)) {
        errors.push("Password must contain at least one special character");
    }

    errors
}

pub fn is_valid_password(password: &str) -> bool {
    password_errors(password).is_empty()
}

/// Registration (and password reset) form input
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegistrationForm {
    pub fn new(email: &str, password: &str, confirm_password: &str) -> Self {
        Self {
            email: email.to_string(),
            password: password.to_string(),
            confirm_password: confirm_password.to_string(),
        }
    }

    /// All problems with the form, or `Ok` if it can be submitted
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if !is_valid_email(&self.email) {
            errors.push("Please enter a valid email address".to_string());
        }
        errors.extend(password_errors(&self.password).into_iter().map(String::from));
        if self.password != self.confirm_password {
            errors.push("Passwords do not match".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
