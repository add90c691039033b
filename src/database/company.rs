use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::company::{Company, CompanyRequest};
use crate::models::pagination::PaginationParams;
use uuid::Uuid;

#[async_trait::async_trait]
pub trait CompanyRepository: Send + Sync {
    async fn create_company(&self, request: &CompanyRequest, account_id: &Uuid) -> Result<Company, AppError>;
    async fn get_company_by_id(&self, id: &Uuid, account_id: &Uuid) -> Result<Option<Company>, AppError>;
    async fn list_companies(&self, params: &PaginationParams, account_id: &Uuid) -> Result<(Vec<Company>, i64), AppError>;
    async fn update_company(&self, id: &Uuid, request: &CompanyRequest, account_id: &Uuid) -> Result<Company, AppError>;
    async fn delete_company(&self, id: &Uuid, account_id: &Uuid) -> Result<(), AppError>;
}

#[async_trait::async_trait]
impl CompanyRepository for PostgresRepository {
    async fn create_company(&self, request: &CompanyRequest, account_id: &Uuid) -> Result<Company, AppError> {
        let company = sqlx::query_as::<_, Company>(
            r#"
            INSERT INTO company (account_id, name, description, website)
            VALUES ($1, $2, $3, $4)
            RETURNING id, account_id, name, description, website, created_at
            "#,
        )
        .bind(account_id)
        .bind(&request.name)
        .bind(&request.description)
        .bind(&request.website)
        .fetch_one(&self.pool)
        .await?;

        Ok(company)
    }

    async fn get_company_by_id(&self, id: &Uuid, account_id: &Uuid) -> Result<Option<Company>, AppError> {
        let company = sqlx::query_as::<_, Company>(
            r#"
            SELECT id, account_id, name, description, website, created_at
            FROM company
            WHERE id = $1 AND account_id = $2
            "#,
        )
        .bind(id)
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(company)
    }

    async fn list_companies(&self, params: &PaginationParams, account_id: &Uuid) -> Result<(Vec<Company>, i64), AppError> {
        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM company WHERE account_id = $1")
            .bind(account_id)
            .fetch_one(&self.pool)
            .await?;

        let query = format!(
            r#"
            SELECT id, account_id, name, description, website, created_at
            FROM company
            WHERE account_id = $1
            ORDER BY name ASC, created_at DESC
            {}
            "#,
            params.sql_suffix()
        );

        let companies = sqlx::query_as::<_, Company>(&query).bind(account_id).fetch_all(&self.pool).await?;

        Ok((companies, total))
    }

    async fn update_company(&self, id: &Uuid, request: &CompanyRequest, account_id: &Uuid) -> Result<Company, AppError> {
        let company = sqlx::query_as::<_, Company>(
            r#"
            UPDATE company
            SET name = $1, description = $2, website = $3
            WHERE id = $4 AND account_id = $5
            RETURNING id, account_id, name, description, website, created_at
            "#,
        )
        .bind(&request.name)
        .bind(&request.description)
        .bind(&request.website)
        .bind(id)
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await?;

        company.ok_or_else(|| AppError::NotFound("Company not found".to_string()))
    }

    async fn delete_company(&self, id: &Uuid, account_id: &Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM company WHERE id = $1 AND account_id = $2")
            .bind(id)
            .bind(account_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Company not found".to_string()));
        }
        Ok(())
    }
}
