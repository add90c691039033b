use chrono::{DateTime, Utc};
use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use uuid::Uuid;
use validator::Validate;

/// Password reset record stored in the database. Only the SHA-256 of the token is kept.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PasswordReset {
    pub id: Uuid,
    pub user_id: Uuid,
    pub email: String,
    pub token_hash: String,
    pub expires: DateTime<Utc>,
    pub used: bool,
    pub created_at: DateTime<Utc>,
}

/// Request to initiate password reset (sent by user)
#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct PasswordResetRequest {
    #[validate(email)]
    pub email: String,
}

/// Request to validate a password reset token
#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct PasswordResetValidateRequest {
    #[validate(length(equal = 64))]
    pub token: String,
}

/// Request to confirm password reset with new password
#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct PasswordResetConfirmRequest {
    #[validate(length(equal = 64))]
    pub token: String,
    #[validate(length(min = 8))]
    #[validate(custom(function = "crate::models::user::validate_password_strength"))]
    pub new_password: String,
}

/// Response for password reset request (always the same to prevent email enumeration)
#[derive(Debug, Serialize, JsonSchema)]
pub struct PasswordResetResponse {
    pub message: String,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct PasswordResetValidateResponse {
    pub valid: bool,
    pub email: Option<String>,
}

impl PasswordReset {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires <= now
    }

    /// A token may be consumed iff it is unused and `expires > now`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.used && !self.is_expired_at(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn reset(expires: DateTime<Utc>, used: bool) -> PasswordReset {
        PasswordReset {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            email: "robin@example.com".to_string(),
            token_hash: "0".repeat(64),
            expires,
            used,
            created_at: expires - Duration::hours(1),
        }
    }

    #[test]
    fn valid_only_when_unused_and_unexpired() {
        let now = Utc.with_ymd_and_hms(2026, 5, 4, 12, 0, 0).unwrap();
        assert!(reset(now + Duration::minutes(5), false).is_valid_at(now));
        assert!(!reset(now + Duration::minutes(5), true).is_valid_at(now));
        assert!(!reset(now, false).is_valid_at(now));
        assert!(!reset(now - Duration::minutes(1), false).is_valid_at(now));
    }
}
