use crate::auth::CurrentUser;
use crate::database::applicant::ApplicantRepository;
use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::middleware::rate_limit::RateLimit;
use crate::models::applicant::ApplicantResponse;
use crate::models::pagination::{PaginatedResponse, PaginationParams};
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{State, delete, get};
use rocket_okapi::openapi;
use sqlx::PgPool;
use uuid::Uuid;

/// Applicants of the caller's account, optionally narrowed to one interview.
#[openapi(tag = "Applicants")]
#[get("/?<interview_id>&<page>&<limit>")]
pub async fn list_applicants(
    pool: &State<PgPool>,
    current_user: CurrentUser,
    _rate_limit: RateLimit,
    interview_id: Option<&str>,
    page: Option<i64>,
    limit: Option<i64>,
) -> Result<Json<PaginatedResponse<ApplicantResponse>>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let interview_id = interview_id.map(Uuid::parse_str).transpose()?;
    let params = PaginationParams::new(page, limit);
    let (applicants, total) = repo.list_applicants(&params, interview_id.as_ref(), &current_user.account_id).await?;

    let responses = applicants.iter().map(ApplicantResponse::from).collect();
    Ok(Json(PaginatedResponse::from_params(responses, &params, total)))
}

#[openapi(tag = "Applicants")]
#[get("/<id>")]
pub async fn get_applicant(pool: &State<PgPool>, current_user: CurrentUser, _rate_limit: RateLimit, id: &str) -> Result<Json<ApplicantResponse>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let uuid = Uuid::parse_str(id)?;
    match repo.get_applicant_by_id(&uuid, &current_user.account_id).await? {
        Some(applicant) => Ok(Json(ApplicantResponse::from(&applicant))),
        None => Err(AppError::NotFound("Applicant not found".to_string())),
    }
}

#[openapi(tag = "Applicants")]
#[delete("/<id>")]
pub async fn delete_applicant(pool: &State<PgPool>, current_user: CurrentUser, _rate_limit: RateLimit, id: &str) -> Result<Status, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let uuid = Uuid::parse_str(id)?;
    repo.delete_applicant(&uuid, &current_user.account_id).await?;
    Ok(Status::Ok)
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![list_applicants, get_applicant, delete_applicant]
}
