use crate::auth::CurrentUser;
use crate::database::postgres_repository::PostgresRepository;
use crate::database::topic::TopicRepository;
use crate::error::app_error::AppError;
use crate::middleware::rate_limit::RateLimit;
use crate::models::pagination::{PaginatedResponse, PaginationParams};
use crate::models::topic::{TopicRequest, TopicResponse};
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{State, delete, get, post, put};
use rocket_okapi::openapi;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// Topic names are unique per account; a duplicate is a 409.
#[openapi(tag = "Topics")]
#[post("/", data = "<payload>")]
pub async fn create_topic(
    pool: &State<PgPool>,
    current_user: CurrentUser,
    _rate_limit: RateLimit,
    payload: Json<TopicRequest>,
) -> Result<(Status, Json<TopicResponse>), AppError> {
    payload.validate()?;

    let repo = PostgresRepository { pool: pool.inner().clone() };
    let topic = repo.create_topic(&payload, &current_user.account_id).await?;
    Ok((Status::Created, Json(TopicResponse::from(&topic))))
}

#[openapi(tag = "Topics")]
#[get("/?<page>&<limit>")]
pub async fn list_topics(
    pool: &State<PgPool>,
    current_user: CurrentUser,
    _rate_limit: RateLimit,
    page: Option<i64>,
    limit: Option<i64>,
) -> Result<Json<PaginatedResponse<TopicResponse>>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let params = PaginationParams::new(page, limit);
    let (topics, total) = repo.list_topics(&params, &current_user.account_id).await?;

    let responses = topics.iter().map(TopicResponse::from).collect();
    Ok(Json(PaginatedResponse::from_params(responses, &params, total)))
}

#[openapi(tag = "Topics")]
#[get("/<id>")]
pub async fn get_topic(pool: &State<PgPool>, current_user: CurrentUser, _rate_limit: RateLimit, id: &str) -> Result<Json<TopicResponse>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let uuid = Uuid::parse_str(id)?;
    repo.get_topic_by_id(&uuid, &current_user.account_id)
        .await?
        .map(|topic| Json(TopicResponse::from(&topic)))
        .ok_or_else(|| AppError::NotFound("Topic not found".to_string()))
}

#[openapi(tag = "Topics")]
#[put("/<id>", data = "<payload>")]
pub async fn put_topic(
    pool: &State<PgPool>,
    current_user: CurrentUser,
    _rate_limit: RateLimit,
    id: &str,
    payload: Json<TopicRequest>,
) -> Result<Json<TopicResponse>, AppError> {
    payload.validate()?;

    let repo = PostgresRepository { pool: pool.inner().clone() };
    let uuid = Uuid::parse_str(id)?;
    let topic = repo.update_topic(&uuid, &payload, &current_user.account_id).await?;
    Ok(Json(TopicResponse::from(&topic)))
}

#[openapi(tag = "Topics")]
#[delete("/<id>")]
pub async fn delete_topic(pool: &State<PgPool>, current_user: CurrentUser, _rate_limit: RateLimit, id: &str) -> Result<Status, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let uuid = Uuid::parse_str(id)?;
    repo.delete_topic(&uuid, &current_user.account_id).await?;
    Ok(Status::Ok)
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![create_topic, list_topics, get_topic, put_topic, delete_topic]
}
