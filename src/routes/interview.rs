use crate::auth::CurrentUser;
use crate::config::Config;
use crate::database::interview::InterviewRepository;
use crate::database::postgres_repository::PostgresRepository;
use crate::database::session_access::SessionAccessRepository;
use crate::error::app_error::AppError;
use crate::middleware::rate_limit::RateLimit;
use crate::models::interview::{InterviewRequest, InterviewResponse, InterviewStatus, PublishInterviewRequest, PublishInterviewResponse};
use crate::models::pagination::{PaginatedResponse, PaginationParams};
use crate::models::session_access::{IssueGrantRequest, SessionAccessResponse};
use crate::service::access_grant::AccessGrantIssuer;
use crate::service::interview_publishing::InterviewPublishingService;
use chrono::Utc;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{State, delete, get, post, put};
use rocket_okapi::openapi;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

#[openapi(tag = "Interviews")]
#[post("/", data = "<payload>")]
pub async fn create_interview(
    pool: &State<PgPool>,
    current_user: CurrentUser,
    _rate_limit: RateLimit,
    payload: Json<InterviewRequest>,
) -> Result<(Status, Json<InterviewResponse>), AppError> {
    payload.validate()?;

    let repo = PostgresRepository { pool: pool.inner().clone() };
    let interview = repo.create_interview(&payload, &current_user.account_id).await?;
    Ok((Status::Created, Json(InterviewResponse::from(&interview))))
}

#[openapi(tag = "Interviews")]
#[get("/?<page>&<limit>")]
pub async fn list_interviews(
    pool: &State<PgPool>,
    current_user: CurrentUser,
    _rate_limit: RateLimit,
    page: Option<i64>,
    limit: Option<i64>,
) -> Result<Json<PaginatedResponse<InterviewResponse>>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let params = PaginationParams::new(page, limit);
    let (interviews, total) = repo.list_interviews(&params, &current_user.account_id).await?;

    let responses = interviews.iter().map(InterviewResponse::from).collect();
    Ok(Json(PaginatedResponse::from_params(responses, &params, total)))
}

#[openapi(tag = "Interviews")]
#[get("/<id>")]
pub async fn get_interview(pool: &State<PgPool>, current_user: CurrentUser, _rate_limit: RateLimit, id: &str) -> Result<Json<InterviewResponse>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let uuid = Uuid::parse_str(id)?;
    match repo.get_interview_by_id(&uuid, &current_user.account_id).await? {
        Some(interview) => Ok(Json(InterviewResponse::from(&interview))),
        None => Err(AppError::NotFound("Interview not found".to_string())),
    }
}

#[openapi(tag = "Interviews")]
#[put("/<id>", data = "<payload>")]
pub async fn put_interview(
    pool: &State<PgPool>,
    current_user: CurrentUser,
    _rate_limit: RateLimit,
    id: &str,
    payload: Json<InterviewRequest>,
) -> Result<Json<InterviewResponse>, AppError> {
    payload.validate()?;

    let repo = PostgresRepository { pool: pool.inner().clone() };
    let uuid = Uuid::parse_str(id)?;
    let interview = repo.update_interview(&uuid, &payload, &current_user.account_id).await?;
    Ok(Json(InterviewResponse::from(&interview)))
}

/// Soft delete: the interview disappears from every listing but its grants and applicants stay on record.
#[openapi(tag = "Interviews")]
#[delete("/<id>")]
pub async fn delete_interview(pool: &State<PgPool>, current_user: CurrentUser, _rate_limit: RateLimit, id: &str) -> Result<Status, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let uuid = Uuid::parse_str(id)?;
    repo.delete_interview(&uuid, &current_user.account_id).await?;
    tracing::info!(interview_id = %uuid, account_id = %current_user.account_id, "interview deleted");
    Ok(Status::Ok)
}

/// Issues an access grant, then marks the interview `Published`.
#[openapi(tag = "Interviews")]
#[post("/<id>/publish", data = "<payload>")]
pub async fn publish_interview(
    pool: &State<PgPool>,
    config: &State<Config>,
    current_user: CurrentUser,
    _rate_limit: RateLimit,
    id: &str,
    payload: Json<PublishInterviewRequest>,
) -> Result<Json<PublishInterviewResponse>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let uuid = Uuid::parse_str(id)?;
    let expiration_days = payload.expiration_days.unwrap_or(config.access_grant.default_expiration_days);

    let (interview, grant) = InterviewPublishingService::from_config(&repo, &config.access_grant)
        .publish(&uuid, &current_user.account_id, expiration_days)
        .await?;

    Ok(Json(PublishInterviewResponse {
        interview: InterviewResponse::from(&interview),
        access: SessionAccessResponse::at(&grant, Utc::now()),
    }))
}

#[openapi(tag = "Interviews")]
#[post("/<id>/archive")]
pub async fn archive_interview(pool: &State<PgPool>, current_user: CurrentUser, _rate_limit: RateLimit, id: &str) -> Result<Json<InterviewResponse>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let uuid = Uuid::parse_str(id)?;
    let interview = repo.set_interview_status(&uuid, InterviewStatus::Archived, &current_user.account_id).await?;
    Ok(Json(InterviewResponse::from(&interview)))
}

#[openapi(tag = "Interviews")]
#[get("/<id>/access")]
pub async fn list_interview_access(
    pool: &State<PgPool>,
    current_user: CurrentUser,
    _rate_limit: RateLimit,
    id: &str,
) -> Result<Json<Vec<SessionAccessResponse>>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let uuid = Uuid::parse_str(id)?;
    if repo.get_interview_by_id(&uuid, &current_user.account_id).await?.is_none() {
        return Err(AppError::NotFound("Interview not found".to_string()));
    }

    let now = Utc::now();
    let grants = repo.list_session_access_for_interview(&uuid, &current_user.account_id).await?;
    Ok(Json(grants.iter().map(|grant| SessionAccessResponse::at(grant, now)).collect()))
}

/// Issues an additional grant without touching the interview status.
#[openapi(tag = "Interviews")]
#[post("/<id>/access", data = "<payload>")]
pub async fn issue_interview_access(
    pool: &State<PgPool>,
    config: &State<Config>,
    current_user: CurrentUser,
    _rate_limit: RateLimit,
    id: &str,
    payload: Json<IssueGrantRequest>,
) -> Result<(Status, Json<SessionAccessResponse>), AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let uuid = Uuid::parse_str(id)?;
    let expiration_days = payload.expiration_days.unwrap_or(config.access_grant.default_expiration_days);

    let grant = AccessGrantIssuer::from_config(&repo, &config.access_grant)
        .issue_grant(&uuid, &current_user.account_id, expiration_days)
        .await?;

    Ok((Status::Created, Json(SessionAccessResponse::at(&grant, Utc::now()))))
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![
        create_interview,
        list_interviews,
        get_interview,
        put_interview,
        delete_interview,
        publish_interview,
        archive_interview,
        list_interview_access,
        issue_interview_access
    ]
}
