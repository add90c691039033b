use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::session_access::{NewSessionAccess, SessionAccess};
use uuid::Uuid;

#[async_trait::async_trait]
pub trait SessionAccessRepository: Send + Sync {
    /// Single insert. A duplicate `(access_code, pin)` pair surfaces as `AppError::Conflict`.
    async fn create_session_access(&self, new: &NewSessionAccess) -> Result<SessionAccess, AppError>;
    async fn list_session_access_for_interview(&self, interview_id: &Uuid, account_id: &Uuid) -> Result<Vec<SessionAccess>, AppError>;
    async fn find_session_access_by_code(&self, access_code: &str, pin: &str) -> Result<Option<SessionAccess>, AppError>;
}

#[async_trait::async_trait]
impl SessionAccessRepository for PostgresRepository {
    async fn create_session_access(&self, new: &NewSessionAccess) -> Result<SessionAccess, AppError> {
        let grant = sqlx::query_as::<_, SessionAccess>(
            r#"
            INSERT INTO session_access (interview_id, account_id, access_code, pin, expiration, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, interview_id, account_id, access_code, pin, expiration, created_at
            "#,
        )
        .bind(new.interview_id)
        .bind(new.account_id)
        .bind(&new.access_code)
        .bind(&new.pin)
        .bind(new.expiration)
        .bind(new.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(grant)
    }

    async fn list_session_access_for_interview(&self, interview_id: &Uuid, account_id: &Uuid) -> Result<Vec<SessionAccess>, AppError> {
        let grants = sqlx::query_as::<_, SessionAccess>(
            r#"
            SELECT id, interview_id, account_id, access_code, pin, expiration, created_at
            FROM session_access
            WHERE interview_id = $1 AND account_id = $2
            ORDER BY created_at DESC
            "#,
        )
        .bind(interview_id)
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(grants)
    }

    async fn find_session_access_by_code(&self, access_code: &str, pin: &str) -> Result<Option<SessionAccess>, AppError> {
        let grant = sqlx::query_as::<_, SessionAccess>(
            r#"
            SELECT id, interview_id, account_id, access_code, pin, expiration, created_at
            FROM session_access
            WHERE access_code = $1 AND pin = $2
            "#,
        )
        .bind(access_code)
        .bind(pin)
        .fetch_optional(&self.pool)
        .await?;

        Ok(grant)
    }
}
