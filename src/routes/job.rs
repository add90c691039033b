use crate::auth::CurrentUser;
use crate::database::job::JobRepository;
use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::middleware::rate_limit::RateLimit;
use crate::models::job::{JobRequest, JobResponse};
use crate::models::pagination::{PaginatedResponse, PaginationParams};
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{State, delete, get, post, put};
use rocket_okapi::openapi;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// A `company_id` from another account fails the composite foreign key and is a 400.
#[openapi(tag = "Jobs")]
#[post("/", data = "<payload>")]
pub async fn create_job(pool: &State<PgPool>, current_user: CurrentUser, _rate_limit: RateLimit, payload: Json<JobRequest>) -> Result<(Status, Json<JobResponse>), AppError> {
    payload.validate()?;

    let repo = PostgresRepository { pool: pool.inner().clone() };
    let job = repo.create_job(&payload, &current_user.account_id).await?;
    Ok((Status::Created, Json(JobResponse::from(&job))))
}

#[openapi(tag = "Jobs")]
#[get("/?<company_id>&<page>&<limit>")]
pub async fn list_jobs(
    pool: &State<PgPool>,
    current_user: CurrentUser,
    _rate_limit: RateLimit,
    company_id: Option<&str>,
    page: Option<i64>,
    limit: Option<i64>,
) -> Result<Json<PaginatedResponse<JobResponse>>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let company_id = company_id.map(Uuid::parse_str).transpose()?;
    let params = PaginationParams::new(page, limit);
    let (jobs, total) = repo.list_jobs(&params, company_id.as_ref(), &current_user.account_id).await?;

    let responses = jobs.iter().map(JobResponse::from).collect();
    Ok(Json(PaginatedResponse::from_params(responses, &params, total)))
}

#[openapi(tag = "Jobs")]
#[get("/<id>")]
pub async fn get_job(pool: &State<PgPool>, current_user: CurrentUser, _rate_limit: RateLimit, id: &str) -> Result<Json<JobResponse>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let uuid = Uuid::parse_str(id)?;
    match repo.get_job_by_id(&uuid, &current_user.account_id).await? {
        Some(job) => Ok(Json(JobResponse::from(&job))),
        None => Err(AppError::NotFound("Job not found".to_string())),
    }
}

#[openapi(tag = "Jobs")]
#[put("/<id>", data = "<payload>")]
pub async fn put_job(pool: &State<PgPool>, current_user: CurrentUser, _rate_limit: RateLimit, id: &str, payload: Json<JobRequest>) -> Result<Json<JobResponse>, AppError> {
    payload.validate()?;

    let repo = PostgresRepository { pool: pool.inner().clone() };
    let uuid = Uuid::parse_str(id)?;
    let job = repo.update_job(&uuid, &payload, &current_user.account_id).await?;
    Ok(Json(JobResponse::from(&job)))
}

#[openapi(tag = "Jobs")]
#[delete("/<id>")]
pub async fn delete_job(pool: &State<PgPool>, current_user: CurrentUser, _rate_limit: RateLimit, id: &str) -> Result<Status, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let uuid = Uuid::parse_str(id)?;
    repo.delete_job(&uuid, &current_user.account_id).await?;
    Ok(Status::Ok)
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![create_job, list_jobs, get_job, put_job, delete_job]
}
