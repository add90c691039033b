use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::interview::{Interview, InterviewRequest, InterviewStatus};
use crate::models::pagination::PaginationParams;
use uuid::Uuid;

const INTERVIEW_COLUMNS: &str = "id, account_id, company_id, job_id, title, company_name, job_title, job_description, \
     focus_areas, interviewer_style, max_duration_minutes, status, created_at, updated_at";

#[async_trait::async_trait]
pub trait InterviewRepository: Send + Sync {
    async fn create_interview(&self, request: &InterviewRequest, account_id: &Uuid) -> Result<Interview, AppError>;
    /// Soft-deleted interviews are reported as missing.
    async fn get_interview_by_id(&self, id: &Uuid, account_id: &Uuid) -> Result<Option<Interview>, AppError>;
    async fn list_interviews(&self, params: &PaginationParams, account_id: &Uuid) -> Result<(Vec<Interview>, i64), AppError>;
    async fn update_interview(&self, id: &Uuid, request: &InterviewRequest, account_id: &Uuid) -> Result<Interview, AppError>;
    async fn set_interview_status(&self, id: &Uuid, status: InterviewStatus, account_id: &Uuid) -> Result<Interview, AppError>;
    async fn delete_interview(&self, id: &Uuid, account_id: &Uuid) -> Result<(), AppError>;
}

#[async_trait::async_trait]
impl InterviewRepository for PostgresRepository {
    async fn create_interview(&self, request: &InterviewRequest, account_id: &Uuid) -> Result<Interview, AppError> {
        let query = format!(
            r#"
            INSERT INTO interview (account_id, company_id, job_id, title, company_name, job_title,
                                   job_description, focus_areas, interviewer_style, max_duration_minutes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {INTERVIEW_COLUMNS}
            "#
        );

        let interview = sqlx::query_as::<_, Interview>(&query)
            .bind(account_id)
            .bind(request.company_id)
            .bind(request.job_id)
            .bind(&request.title)
            .bind(&request.company_name)
            .bind(&request.job_title)
            .bind(&request.job_description)
            .bind(&request.focus_areas)
            .bind(&request.interviewer_style)
            .bind(request.max_duration_minutes)
            .fetch_one(&self.pool)
            .await?;

        Ok(interview)
    }

    async fn get_interview_by_id(&self, id: &Uuid, account_id: &Uuid) -> Result<Option<Interview>, AppError> {
        let query = format!(
            r#"
            SELECT {INTERVIEW_COLUMNS}
            FROM interview
            WHERE id = $1 AND account_id = $2 AND status <> 'Deleted'
            "#
        );

        let interview = sqlx::query_as::<_, Interview>(&query)
            .bind(id)
            .bind(account_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(interview)
    }

    async fn list_interviews(&self, params: &PaginationParams, account_id: &Uuid) -> Result<(Vec<Interview>, i64), AppError> {
        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM interview WHERE account_id = $1 AND status <> 'Deleted'")
            .bind(account_id)
            .fetch_one(&self.pool)
            .await?;

        let query = format!(
            r#"
            SELECT {INTERVIEW_COLUMNS}
            FROM interview
            WHERE account_id = $1 AND status <> 'Deleted'
            ORDER BY created_at DESC
            {}
            "#,
            params.sql_suffix()
        );

        let interviews = sqlx::query_as::<_, Interview>(&query).bind(account_id).fetch_all(&self.pool).await?;

        Ok((interviews, total))
    }

    async fn update_interview(&self, id: &Uuid, request: &InterviewRequest, account_id: &Uuid) -> Result<Interview, AppError> {
        let query = format!(
            r#"
            UPDATE interview
            SET company_id = $1,
                job_id = $2,
                title = $3,
                company_name = $4,
                job_title = $5,
                job_description = $6,
                focus_areas = $7,
                interviewer_style = $8,
                max_duration_minutes = $9,
                updated_at = now()
            WHERE id = $10 AND account_id = $11 AND status <> 'Deleted'
            RETURNING {INTERVIEW_COLUMNS}
            "#
        );

        let interview = sqlx::query_as::<_, Interview>(&query)
            .bind(request.company_id)
            .bind(request.job_id)
            .bind(&request.title)
            .bind(&request.company_name)
            .bind(&request.job_title)
            .bind(&request.job_description)
            .bind(&request.focus_areas)
            .bind(&request.interviewer_style)
            .bind(request.max_duration_minutes)
            .bind(id)
            .bind(account_id)
            .fetch_optional(&self.pool)
            .await?;

        interview.ok_or_else(|| AppError::NotFound("Interview not found".to_string()))
    }

    async fn set_interview_status(&self, id: &Uuid, status: InterviewStatus, account_id: &Uuid) -> Result<Interview, AppError> {
        let query = format!(
            r#"
            UPDATE interview
            SET status = $1, updated_at = now()
            WHERE id = $2 AND account_id = $3 AND status <> 'Deleted'
            RETURNING {INTERVIEW_COLUMNS}
            "#
        );

        let interview = sqlx::query_as::<_, Interview>(&query)
            .bind(status)
            .bind(id)
            .bind(account_id)
            .fetch_optional(&self.pool)
            .await?;

        interview.ok_or_else(|| AppError::NotFound("Interview not found".to_string()))
    }

    async fn delete_interview(&self, id: &Uuid, account_id: &Uuid) -> Result<(), AppError> {
        self.set_interview_status(id, InterviewStatus::Deleted, account_id).await?;
        Ok(())
    }
}
