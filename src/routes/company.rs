use crate::auth::CurrentUser;
use crate::database::company::CompanyRepository;
use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::middleware::rate_limit::RateLimit;
use crate::models::company::{CompanyRequest, CompanyResponse};
use crate::models::pagination::{PaginatedResponse, PaginationParams};
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{State, delete, get, post, put};
use rocket_okapi::openapi;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

#[openapi(tag = "Companies")]
#[post("/", data = "<payload>")]
pub async fn create_company(
    pool: &State<PgPool>,
    current_user: CurrentUser,
    _rate_limit: RateLimit,
    payload: Json<CompanyRequest>,
) -> Result<(Status, Json<CompanyResponse>), AppError> {
    payload.validate()?;

    let repo = PostgresRepository { pool: pool.inner().clone() };
    let company = repo.create_company(&payload, &current_user.account_id).await?;
    Ok((Status::Created, Json(CompanyResponse::from(&company))))
}

#[openapi(tag = "Companies")]
#[get("/?<page>&<limit>")]
pub async fn list_companies(
    pool: &State<PgPool>,
    current_user: CurrentUser,
    _rate_limit: RateLimit,
    page: Option<i64>,
    limit: Option<i64>,
) -> Result<Json<PaginatedResponse<CompanyResponse>>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let params = PaginationParams::new(page, limit);
    let (companies, total) = repo.list_companies(&params, &current_user.account_id).await?;

    let responses = companies.iter().map(CompanyResponse::from).collect();
    Ok(Json(PaginatedResponse::from_params(responses, &params, total)))
}

#[openapi(tag = "Companies")]
#[get("/<id>")]
pub async fn get_company(pool: &State<PgPool>, current_user: CurrentUser, _rate_limit: RateLimit, id: &str) -> Result<Json<CompanyResponse>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let uuid = Uuid::parse_str(id)?;
    match repo.get_company_by_id(&uuid, &current_user.account_id).await? {
        Some(company) => Ok(Json(CompanyResponse::from(&company))),
        None => Err(AppError::NotFound("Company not found".to_string())),
    }
}

#[openapi(tag = "Companies")]
#[put("/<id>", data = "<payload>")]
pub async fn put_company(
    pool: &State<PgPool>,
    current_user: CurrentUser,
    _rate_limit: RateLimit,
    id: &str,
    payload: Json<CompanyRequest>,
) -> Result<Json<CompanyResponse>, AppError> {
    payload.validate()?;

    let repo = PostgresRepository { pool: pool.inner().clone() };
    let uuid = Uuid::parse_str(id)?;
    let company = repo.update_company(&uuid, &payload, &current_user.account_id).await?;
    Ok(Json(CompanyResponse::from(&company)))
}

#[openapi(tag = "Companies")]
#[delete("/<id>")]
pub async fn delete_company(pool: &State<PgPool>, current_user: CurrentUser, _rate_limit: RateLimit, id: &str) -> Result<Status, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let uuid = Uuid::parse_str(id)?;
    repo.delete_company(&uuid, &current_user.account_id).await?;
    Ok(Status::Ok)
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![create_company, list_companies, get_company, put_company, delete_company]
}
