use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::account::Account;
use uuid::Uuid;

#[async_trait::async_trait]
pub trait AccountRepository: Send + Sync {
    async fn get_account_by_id(&self, id: &Uuid) -> Result<Option<Account>, AppError>;
}

#[async_trait::async_trait]
impl AccountRepository for PostgresRepository {
    async fn get_account_by_id(&self, id: &Uuid) -> Result<Option<Account>, AppError> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, name, created_at
            FROM account
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }
}
