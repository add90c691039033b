use crate::auth::{CurrentUser, SESSION_COOKIE, parse_session_cookie_value, session_cookie_value};
use crate::config::Config;
use crate::database::account::AccountRepository;
use crate::database::postgres_repository::PostgresRepository;
use crate::database::session::SessionRepository;
use crate::database::user::{UserRepository, dummy_verify, verify_password};
use crate::error::app_error::AppError;
use crate::middleware::rate_limit::{AuthRateLimit, RateLimit};
use crate::models::account::AccountResponse;
use crate::models::user::{LoginRequest, RegisterRequest, UserAccountResponse, UserResponse};
use chrono::{Duration, Utc};
use rocket::http::{Cookie, CookieJar, SameSite, Status};
use rocket::serde::json::Json;
use rocket::{State, get, post};
use rocket_okapi::openapi;
use sqlx::PgPool;
use validator::Validate;

/// Sign up: creates the organization's account and its first user.
#[openapi(tag = "Users")]
#[post("/register", data = "<payload>")]
pub async fn register(pool: &State<PgPool>, _rate_limit: AuthRateLimit, payload: Json<RegisterRequest>) -> Result<(Status, Json<UserAccountResponse>), AppError> {
    payload.validate()?;

    let repo = PostgresRepository { pool: pool.inner().clone() };
    let (account, user) = repo
        .register_account_owner(payload.organization_name.trim(), payload.name.trim(), payload.email.trim(), &payload.password)
        .await?;

    tracing::info!(user_id = %user.id, account_id = %account.id, "account registered");

    Ok((
        Status::Created,
        Json(UserAccountResponse {
            user: UserResponse::from(&user),
            account: AccountResponse::from(&account),
        }),
    ))
}

#[openapi(tag = "Users")]
#[post("/login", data = "<payload>")]
pub async fn login(
    pool: &State<PgPool>,
    config: &State<Config>,
    cookies: &CookieJar<'_>,
    _rate_limit: AuthRateLimit,
    payload: Json<LoginRequest>,
) -> Result<Json<UserResponse>, AppError> {
    payload.validate()?;

    let repo = PostgresRepository { pool: pool.inner().clone() };
    let Some(user) = repo.get_user_by_email(&payload.email).await? else {
        dummy_verify(&payload.password);
        tracing::warn!("login attempt for unknown email");
        return Err(AppError::InvalidCredentials);
    };

    if let Err(e) = verify_password(&user, &payload.password) {
        tracing::warn!(user_id = %user.id, "login attempt with wrong password");
        return Err(e);
    }

    let ttl_seconds = config.session.ttl_seconds;
    let session = repo.create_session(&user.id, Utc::now() + Duration::seconds(ttl_seconds)).await?;

    cookies.add_private(
        Cookie::build((SESSION_COOKIE, session_cookie_value(&session.id, &user.id)))
            .path("/")
            .http_only(true)
            .secure(config.session.cookie_secure)
            .same_site(SameSite::Lax)
            .max_age(rocket::time::Duration::seconds(ttl_seconds)),
    );

    tracing::info!(user_id = %user.id, account_id = %user.account_id, "user logged in");
    Ok(Json(UserResponse::from(&user)))
}

#[openapi(tag = "Users")]
#[post("/logout")]
pub async fn logout(pool: &State<PgPool>, cookies: &CookieJar<'_>, _rate_limit: RateLimit) -> Result<Status, AppError> {
    if let Some((session_id, _)) = cookies.get_private(SESSION_COOKIE).and_then(|c| parse_session_cookie_value(c.value())) {
        let repo = PostgresRepository { pool: pool.inner().clone() };
        repo.delete_session(&session_id).await?;
    }

    cookies.remove_private(Cookie::build(SESSION_COOKIE).path("/"));
    Ok(Status::Ok)
}

/// The signed-in user together with the account they belong to.
#[openapi(tag = "Users")]
#[get("/me")]
pub async fn me(pool: &State<PgPool>, current_user: CurrentUser, _rate_limit: RateLimit) -> Result<Json<UserAccountResponse>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let user = repo.get_user_by_id(&current_user.id).await?.ok_or(AppError::UserNotFound)?;
    let account = repo
        .get_account_by_id(&current_user.account_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Account not found".to_string()))?;

    Ok(Json(UserAccountResponse {
        user: UserResponse::from(&user),
        account: AccountResponse::from(&account),
    }))
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![register, login, logout, me]
}
