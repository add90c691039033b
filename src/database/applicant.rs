use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::applicant::{Applicant, NewApplicant};
use crate::models::pagination::PaginationParams;
use uuid::Uuid;

#[async_trait::async_trait]
pub trait ApplicantRepository: Send + Sync {
    async fn create_applicant(&self, new: &NewApplicant) -> Result<Applicant, AppError>;
    async fn get_applicant_by_id(&self, id: &Uuid, account_id: &Uuid) -> Result<Option<Applicant>, AppError>;
    async fn list_applicants(&self, params: &PaginationParams, interview_id: Option<&Uuid>, account_id: &Uuid) -> Result<(Vec<Applicant>, i64), AppError>;
    async fn delete_applicant(&self, id: &Uuid, account_id: &Uuid) -> Result<(), AppError>;
}

#[async_trait::async_trait]
impl ApplicantRepository for PostgresRepository {
    async fn create_applicant(&self, new: &NewApplicant) -> Result<Applicant, AppError> {
        let applicant = sqlx::query_as::<_, Applicant>(
            r#"
            INSERT INTO applicant (account_id, interview_id, name, email, session_access_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, account_id, interview_id, name, email, session_access_id, created_at
            "#,
        )
        .bind(new.account_id)
        .bind(new.interview_id)
        .bind(&new.name)
        .bind(&new.email)
        .bind(new.session_access_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(applicant)
    }

    async fn get_applicant_by_id(&self, id: &Uuid, account_id: &Uuid) -> Result<Option<Applicant>, AppError> {
        let applicant = sqlx::query_as::<_, Applicant>(
            r#"
            SELECT id, account_id, interview_id, name, email, session_access_id, created_at
            FROM applicant
            WHERE id = $1 AND account_id = $2
            "#,
        )
        .bind(id)
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(applicant)
    }

    async fn list_applicants(&self, params: &PaginationParams, interview_id: Option<&Uuid>, account_id: &Uuid) -> Result<(Vec<Applicant>, i64), AppError> {
        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM applicant WHERE account_id = $1 AND ($2::uuid IS NULL OR interview_id = $2)")
            .bind(account_id)
            .bind(interview_id)
            .fetch_one(&self.pool)
            .await?;

        let query = format!(
            r#"
            SELECT id, account_id, interview_id, name, email, session_access_id, created_at
            FROM applicant
            WHERE account_id = $1
              AND ($2::uuid IS NULL OR interview_id = $2)
            ORDER BY created_at DESC
            {}
            "#,
            params.sql_suffix()
        );

        let applicants = sqlx::query_as::<_, Applicant>(&query)
            .bind(account_id)
            .bind(interview_id)
            .fetch_all(&self.pool)
            .await?;

        Ok((applicants, total))
    }

    async fn delete_applicant(&self, id: &Uuid, account_id: &Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM applicant WHERE id = $1 AND account_id = $2")
            .bind(id)
            .bind(account_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Applicant not found".to_string()));
        }
        Ok(())
    }
}
