//! Login credentials.

use crate::validation::{Validate, ValidationErrors};
use serde::Serialize;
use std::fmt;

/// `POST /auth/login {email, password}`
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct LoginCredentials {
    /// Account email
    pub email: String,
    /// Account password
    pub password: String,
}

impl LoginCredentials {
    /// New credentials
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Validate for LoginCredentials {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(!self.email.trim().is_empty(), "email", "Email is required");
        errors.check(!self.password.is_empty(), "password", "Password is required");
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_the_password() {
        let credentials = LoginCredentials::new("admin@example.com", "hunter2");
        let rendered = format!("{credentials:?}");

        assert!(rendered.contains("admin@example.com"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn blank_fields_are_rejected() {
        assert!(LoginCredentials::new(" ", "").validate().is_err());
        assert!(LoginCredentials::new("a@b.c", "pw").validate().is_ok());
    }
}
