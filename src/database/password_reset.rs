use crate::database::postgres_repository::PostgresRepository;
use crate::database::user::password_hash;
use crate::error::app_error::AppError;
use crate::models::password_reset::PasswordReset;
use chrono::{DateTime, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Generate a password reset token.
/// Returns: (plain_token, token_hash)
pub fn generate_reset_token() -> (String, String) {
    let mut token_bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut token_bytes);
    let token = hex::encode(token_bytes);
    let token_hash = hash_reset_token(&token);

    (token, token_hash)
}

pub fn hash_reset_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

#[async_trait::async_trait]
pub trait PasswordResetRepository: Send + Sync {
    async fn create_password_reset(&self, user_id: &Uuid, email: &str, token_hash: &str, expires: DateTime<Utc>) -> Result<PasswordReset, AppError>;
    async fn get_password_reset_by_token_hash(&self, token_hash: &str) -> Result<Option<PasswordReset>, AppError>;
    /// Marks the token used and stores the new password in one transaction.
    /// Returns `false` without touching the password when the token was already used.
    async fn consume_password_reset(&self, reset_id: &Uuid, user_id: &Uuid, new_password: &str) -> Result<bool, AppError>;
    async fn count_password_reset_attempts(&self, user_id: &Uuid, since: DateTime<Utc>) -> Result<i64, AppError>;
    async fn cleanup_expired_password_resets(&self) -> Result<u64, AppError>;
}

#[async_trait::async_trait]
impl PasswordResetRepository for PostgresRepository {
    async fn create_password_reset(&self, user_id: &Uuid, email: &str, token_hash: &str, expires: DateTime<Utc>) -> Result<PasswordReset, AppError> {
        let reset = sqlx::query_as::<_, PasswordReset>(
            r#"
            INSERT INTO password_resets (user_id, email, token_hash, expires)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, email, token_hash, expires, used, created_at
            "#,
        )
        .bind(user_id)
        .bind(email)
        .bind(token_hash)
        .bind(expires)
        .fetch_one(&self.pool)
        .await?;

        Ok(reset)
    }

    async fn get_password_reset_by_token_hash(&self, token_hash: &str) -> Result<Option<PasswordReset>, AppError> {
        let reset = sqlx::query_as::<_, PasswordReset>(
            r#"
            SELECT id, user_id, email, token_hash, expires, used, created_at
            FROM password_resets
            WHERE token_hash = $1
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(reset)
    }

    async fn consume_password_reset(&self, reset_id: &Uuid, user_id: &Uuid, new_password: &str) -> Result<bool, AppError> {
        // Hash before opening the transaction so no row lock is held during Argon2.
        let (salt, password_hash) = password_hash(new_password)?;
        let mut tx = self.pool.begin().await?;

        let consumed = sqlx::query(
            r#"
            UPDATE password_resets
            SET used = true
            WHERE id = $1
              AND used = false
            "#,
        )
        .bind(reset_id)
        .execute(&mut *tx)
        .await?;

        if consumed.rows_affected() != 1 {
            tx.rollback().await?;
            return Ok(false);
        }

        let updated = sqlx::query("UPDATE users SET salt = $1, password_hash = $2 WHERE id = $3")
            .bind(&salt)
            .bind(&password_hash)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        // Dropping `tx` on the error paths rolls the token back to unused.
        if updated.rows_affected() != 1 {
            return Err(AppError::UserNotFound);
        }

        tx.commit().await?;
        Ok(true)
    }

    async fn count_password_reset_attempts(&self, user_id: &Uuid, since: DateTime<Utc>) -> Result<i64, AppError> {
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM password_resets
            WHERE user_id = $1
              AND created_at >= $2
            "#,
        )
        .bind(user_id)
        .bind(since)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }

    async fn cleanup_expired_password_resets(&self) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            DELETE FROM password_resets
            WHERE expires <= now()
               OR used = true
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_reset_token() {
        let (token, token_hash) = generate_reset_token();

        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(token_hash.len(), 64);
        assert!(token_hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, token_hash);
        assert_eq!(token_hash, hash_reset_token(&token));
    }

    #[test]
    fn test_generate_reset_token_unique() {
        let (token1, hash1) = generate_reset_token();
        let (token2, hash2) = generate_reset_token();

        assert_ne!(token1, token2);
        assert_ne!(hash1, hash2);
    }
}
