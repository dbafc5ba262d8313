use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize)]
pub struct SignupPayload {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// A single schema-level validation failure. The boundary layer decides how
/// many of these to surface; handlers currently show the first message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: &str) -> Self {
        FieldError {
            field,
            message: message.to_string(),
        }
    }
}

pub const MIN_PASSWORD_LENGTH: usize = 6;

impl SignupPayload {
    /// Collects every field-level problem instead of stopping at the first.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push(FieldError::new("name", "Name is required"));
        }

        let email = self.email.trim();
        if email.is_empty() {
            errors.push(FieldError::new("email", "Email is required"));
        } else if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
            errors.push(FieldError::new("email", "Email is not valid"));
        }

        if self.password.len() < MIN_PASSWORD_LENGTH {
            errors.push(FieldError::new(
                "password",
                "Password must be at least 6 characters long",
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
