use crate::config::PasswordResetConfig;
use crate::database::password_reset::{PasswordResetRepository, generate_reset_token, hash_reset_token};
use crate::database::session::SessionRepository;
use crate::database::user::{UserRepository, dummy_verify};
use crate::error::app_error::AppError;
use crate::models::password_reset::{PasswordReset, PasswordResetValidateResponse};
use crate::service::clock::Clock;
use crate::service::email::EmailService;
use chrono::Duration;

pub const RESET_REQUESTED_MESSAGE: &str = "If your email address exists in our system, you will receive a password reset link shortly.";
const INVALID_TOKEN_MESSAGE: &str = "Invalid or expired reset token";

pub struct PasswordResetService<'a, R, C> {
    repository: &'a R,
    config: &'a PasswordResetConfig,
    clock: C,
}

impl<'a, R, C> PasswordResetService<'a, R, C>
where
    R: UserRepository + PasswordResetRepository + SessionRepository,
    C: Clock,
{
    pub fn new(repository: &'a R, config: &'a PasswordResetConfig, clock: C) -> Self {
        Self { repository, config, clock }
    }

    /// Stores a fresh token and mails the link. Unknown emails and throttled users
    /// get the same outcome as a successful request.
    pub async fn request_reset(&self, email: &str, email_service: &EmailService) -> Result<(), AppError> {
        let Some(user) = self.repository.get_user_by_email(email).await? else {
            dummy_verify("not-a-real-password");
            tracing::info!("password reset requested for unknown email");
            return Ok(());
        };

        let now = self.clock.now();
        let attempts = self.repository.count_password_reset_attempts(&user.id, now - Duration::hours(1)).await?;
        if attempts >= i64::from(self.config.max_attempts_per_hour) {
            tracing::warn!(user_id = %user.id, attempts, "password reset throttled");
            return Ok(());
        }

        let (plain_token, token_hash) = generate_reset_token();
        let expires = now + Duration::seconds(self.config.token_ttl_seconds);
        self.repository.create_password_reset(&user.id, &user.email, &token_hash, expires).await?;
        tracing::info!(user_id = %user.id, %expires, "password reset requested");

        let valid_minutes = self.config.token_ttl_seconds / 60;
        if let Err(e) = email_service
            .send_password_reset_email(&user.email, &user.name, &plain_token, &self.config.frontend_reset_url, valid_minutes)
            .await
        {
            tracing::error!(user_id = %user.id, error = %e, "failed to send password reset email");
        }

        Ok(())
    }

    pub async fn validate_token(&self, token: &str) -> Result<PasswordResetValidateResponse, AppError> {
        match self.find_valid_reset(token).await? {
            Some(reset) => Ok(PasswordResetValidateResponse {
                valid: true,
                email: Some(reset.email),
            }),
            None => Ok(PasswordResetValidateResponse { valid: false, email: None }),
        }
    }

    /// Consumes the token exactly once, sets the new password and signs the user out everywhere.
    pub async fn confirm_reset(&self, token: &str, new_password: &str) -> Result<(), AppError> {
        let reset = self
            .find_valid_reset(token)
            .await?
            .ok_or_else(|| AppError::BadRequest(INVALID_TOKEN_MESSAGE.to_string()))?;

        // Concurrent confirmations race here; only one flips `used`.
        if !self
            .repository
            .consume_password_reset(&reset.id, &reset.user_id, new_password)
            .await?
        {
            tracing::warn!(user_id = %reset.user_id, "password reset token already consumed");
            return Err(AppError::BadRequest(INVALID_TOKEN_MESSAGE.to_string()));
        }

        let sessions_invalidated = self.repository.invalidate_all_user_sessions(&reset.user_id).await?;

        tracing::info!(user_id = %reset.user_id, sessions_invalidated, "password reset completed");
        Ok(())
    }

    async fn find_valid_reset(&self, token: &str) -> Result<Option<PasswordReset>, AppError> {
        let reset = self.repository.get_password_reset_by_token_hash(&hash_reset_token(token)).await?;
        Ok(reset.filter(|r| r.is_valid_at(self.clock.now())))
    }
}
