use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::job::{Job, JobRequest};
use crate::models::pagination::PaginationParams;
use uuid::Uuid;

#[async_trait::async_trait]
pub trait JobRepository: Send + Sync {
    async fn create_job(&self, request: &JobRequest, account_id: &Uuid) -> Result<Job, AppError>;
    async fn get_job_by_id(&self, id: &Uuid, account_id: &Uuid) -> Result<Option<Job>, AppError>;
    async fn list_jobs(&self, params: &PaginationParams, company_id: Option<&Uuid>, account_id: &Uuid) -> Result<(Vec<Job>, i64), AppError>;
    async fn update_job(&self, id: &Uuid, request: &JobRequest, account_id: &Uuid) -> Result<Job, AppError>;
    async fn delete_job(&self, id: &Uuid, account_id: &Uuid) -> Result<(), AppError>;
}

// The composite (company_id, account_id) foreign key rejects companies owned by another tenant.
#[async_trait::async_trait]
impl JobRepository for PostgresRepository {
    async fn create_job(&self, request: &JobRequest, account_id: &Uuid) -> Result<Job, AppError> {
        let job = sqlx::query_as::<_, Job>(
            r#"
            INSERT INTO job (account_id, company_id, title, description, location)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, account_id, company_id, title, description, location, created_at
            "#,
        )
        .bind(account_id)
        .bind(request.company_id)
        .bind(&request.title)
        .bind(&request.description)
        .bind(&request.location)
        .fetch_one(&self.pool)
        .await?;

        Ok(job)
    }

    async fn get_job_by_id(&self, id: &Uuid, account_id: &Uuid) -> Result<Option<Job>, AppError> {
        let job = sqlx::query_as::<_, Job>(
            r#"
            SELECT id, account_id, company_id, title, description, location, created_at
            FROM job
            WHERE id = $1 AND account_id = $2
            "#,
        )
        .bind(id)
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(job)
    }

    async fn list_jobs(&self, params: &PaginationParams, company_id: Option<&Uuid>, account_id: &Uuid) -> Result<(Vec<Job>, i64), AppError> {
        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM job WHERE account_id = $1 AND ($2::uuid IS NULL OR company_id = $2)")
            .bind(account_id)
            .bind(company_id)
            .fetch_one(&self.pool)
            .await?;

        let query = format!(
            r#"
            SELECT id, account_id, company_id, title, description, location, created_at
            FROM job
            WHERE account_id = $1
              AND ($2::uuid IS NULL OR company_id = $2)
            ORDER BY created_at DESC
            {}
            "#,
            params.sql_suffix()
        );

        let jobs = sqlx::query_as::<_, Job>(&query)
            .bind(account_id)
            .bind(company_id)
            .fetch_all(&self.pool)
            .await?;

        Ok((jobs, total))
    }

    async fn update_job(&self, id: &Uuid, request: &JobRequest, account_id: &Uuid) -> Result<Job, AppError> {
        let job = sqlx::query_as::<_, Job>(
            r#"
            UPDATE job
            SET company_id = $1, title = $2, description = $3, location = $4
            WHERE id = $5 AND account_id = $6
            RETURNING id, account_id, company_id, title, description, location, created_at
            "#,
        )
        .bind(request.company_id)
        .bind(&request.title)
        .bind(&request.description)
        .bind(&request.location)
        .bind(id)
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await?;

        job.ok_or_else(|| AppError::NotFound("Job not found".to_string()))
    }

    async fn delete_job(&self, id: &Uuid, account_id: &Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM job WHERE id = $1 AND account_id = $2")
            .bind(id)
            .bind(account_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Job not found".to_string()));
        }
        Ok(())
    }
}
