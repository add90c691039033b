use crate::models::account::AccountResponse;
use chrono::{DateTime, Utc};
use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub account_id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Debug, JsonSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub account_id: Uuid,
    pub name: String,
    pub email: String,
}

/// Sign-up creates the tenant account and its first user together.
#[derive(Deserialize, Debug, Validate, JsonSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 2, max = 120))]
    pub organization_name: String,
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    #[validate(custom(function = "crate::models::user::validate_password_strength"))]
    pub password: String,
}

#[derive(Deserialize, Debug, Validate, JsonSchema)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Serialize, Debug, JsonSchema)]
pub struct UserAccountResponse {
    pub user: UserResponse,
    pub account: AccountResponse,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            account_id: user.account_id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

/// Rejects passwords zxcvbn scores below "safely unguessable" (3).
pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let entropy = zxcvbn::zxcvbn(password, &[]);
    if entropy.score() < zxcvbn::Score::Three {
        let mut error = ValidationError::new("password_strength");
        error.message = Some("Password is too weak".into());
        return Err(error);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weak_password_is_rejected() {
        assert!(validate_password_strength("password").is_err());
        assert!(validate_password_strength("12345678").is_err());
    }

    #[test]
    fn strong_password_is_accepted() {
        assert!(validate_password_strength("correct-horse-battery-staple-91").is_ok());
    }

    #[test]
    fn register_request_validates_email_and_length() {
        let request = RegisterRequest {
            organization_name: "Acme Hiring".to_string(),
            name: "Robin".to_string(),
            email: "not-an-email".to_string(),
            password: "short".to_string(),
        };
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }
}
