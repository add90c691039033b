use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::pagination::PaginationParams;
use crate::models::topic::{Topic, TopicRequest};
use uuid::Uuid;

#[async_trait::async_trait]
pub trait TopicRepository: Send + Sync {
    async fn create_topic(&self, request: &TopicRequest, account_id: &Uuid) -> Result<Topic, AppError>;
    async fn get_topic_by_id(&self, id: &Uuid, account_id: &Uuid) -> Result<Option<Topic>, AppError>;
    async fn list_topics(&self, params: &PaginationParams, account_id: &Uuid) -> Result<(Vec<Topic>, i64), AppError>;
    async fn update_topic(&self, id: &Uuid, request: &TopicRequest, account_id: &Uuid) -> Result<Topic, AppError>;
    async fn delete_topic(&self, id: &Uuid, account_id: &Uuid) -> Result<(), AppError>;
}

#[async_trait::async_trait]
impl TopicRepository for PostgresRepository {
    async fn create_topic(&self, request: &TopicRequest, account_id: &Uuid) -> Result<Topic, AppError> {
        let topic = sqlx::query_as::<_, Topic>(
            r#"
            INSERT INTO topic (account_id, name, description)
            VALUES ($1, $2, $3)
            RETURNING id, account_id, name, description, created_at
            "#,
        )
        .bind(account_id)
        .bind(&request.name)
        .bind(&request.description)
        .fetch_one(&self.pool)
        .await?;

        Ok(topic)
    }

    async fn get_topic_by_id(&self, id: &Uuid, account_id: &Uuid) -> Result<Option<Topic>, AppError> {
        let topic = sqlx::query_as::<_, Topic>(
            r#"
            SELECT id, account_id, name, description, created_at
            FROM topic
            WHERE id = $1 AND account_id = $2
            "#,
        )
        .bind(id)
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(topic)
    }

    async fn list_topics(&self, params: &PaginationParams, account_id: &Uuid) -> Result<(Vec<Topic>, i64), AppError> {
        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM topic WHERE account_id = $1")
            .bind(account_id)
            .fetch_one(&self.pool)
            .await?;

        let query = format!(
            r#"
            SELECT id, account_id, name, description, created_at
            FROM topic
            WHERE account_id = $1
            ORDER BY name ASC
            {}
            "#,
            params.sql_suffix()
        );

        let topics = sqlx::query_as::<_, Topic>(&query).bind(account_id).fetch_all(&self.pool).await?;

        Ok((topics, total))
    }

    async fn update_topic(&self, id: &Uuid, request: &TopicRequest, account_id: &Uuid) -> Result<Topic, AppError> {
        let topic = sqlx::query_as::<_, Topic>(
            r#"
            UPDATE topic
            SET name = $1, description = $2
            WHERE id = $3 AND account_id = $4
            RETURNING id, account_id, name, description, created_at
            "#,
        )
        .bind(&request.name)
        .bind(&request.description)
        .bind(id)
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await?;

        topic.ok_or_else(|| AppError::NotFound("Topic not found".to_string()))
    }

    async fn delete_topic(&self, id: &Uuid, account_id: &Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM topic WHERE id = $1 AND account_id = $2")
            .bind(id)
            .bind(account_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Topic not found".to_string()));
        }
        Ok(())
    }
}
