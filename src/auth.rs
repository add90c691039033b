use crate::database::postgres_repository::PostgresRepository;
use crate::database::session::SessionRepository;
use crate::error::app_error::AppError;
use rocket::http::Status;
use rocket::outcome::Outcome;
use rocket::request::{FromRequest, Outcome as RequestOutcome, Request};
use rocket_okapi::r#gen::OpenApiGenerator;
use rocket_okapi::okapi::openapi3::{Object, Responses, SecurityRequirement, SecurityScheme, SecuritySchemeData};
use rocket_okapi::request::{OpenApiFromRequest, RequestHeaderInput};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "user";

/// The signed-in recruiter. `account_id` is the tenant every scoped query filters on;
/// it is read from the session row, never from anything the client sends.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
    pub id: Uuid,
    pub account_id: Uuid,
    pub email: String,
}

pub(crate) fn session_cookie_value(session_id: &Uuid, user_id: &Uuid) -> String {
    format!("{}:{}", session_id, user_id)
}

/// Inverse of [`session_cookie_value`]: `(session_id, user_id)`.
pub(crate) fn parse_session_cookie_value(value: &str) -> Option<(Uuid, Uuid)> {
    let (session_id, user_id) = value.split_once(':')?;
    Some((Uuid::parse_str(session_id).ok()?, Uuid::parse_str(user_id).ok()?))
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for CurrentUser {
    type Error = AppError;

    async fn from_request(req: &'r Request<'_>) -> RequestOutcome<Self, Self::Error> {
        // Private cookies are encrypted and authenticated with the Rocket secret key.
        let Some((session_id, user_id)) = req
            .cookies()
            .get_private(SESSION_COOKIE)
            .and_then(|cookie| parse_session_cookie_value(cookie.value()))
        else {
            return Outcome::Error((Status::Unauthorized, AppError::Unauthorized));
        };

        let Some(pool) = req.rocket().state::<PgPool>() else {
            return Outcome::Error((Status::InternalServerError, AppError::Unauthorized));
        };
        let repo = PostgresRepository { pool: pool.clone() };

        match repo.get_active_session_user(&session_id, &user_id).await {
            Ok(Some(user)) => {
                let current_user = CurrentUser {
                    id: user.id,
                    account_id: user.account_id,
                    email: user.email,
                };
                req.local_cache(|| Some(current_user.clone()));
                Outcome::Success(current_user)
            }
            Ok(None) => {
                let _ = repo.delete_session_if_expired(&session_id).await;
                Outcome::Error((Status::Unauthorized, AppError::Unauthorized))
            }
            Err(err) => Outcome::Error((Status::InternalServerError, err)),
        }
    }
}

impl<'a> OpenApiFromRequest<'a> for CurrentUser {
    fn from_request_input(_gen: &mut OpenApiGenerator, _name: String, _required: bool) -> rocket_okapi::Result<RequestHeaderInput> {
        let security_scheme = SecurityScheme {
            description: Some("Session cookie set by POST /users/login.".to_string()),
            data: SecuritySchemeData::ApiKey {
                name: SESSION_COOKIE.to_string(),
                location: "cookie".to_string(),
            },
            extensions: Object::default(),
        };

        let mut security_req = SecurityRequirement::new();
        security_req.insert("cookieAuth".to_string(), Vec::new());

        Ok(RequestHeaderInput::Security("cookieAuth".to_string(), security_scheme, security_req))
    }

    fn get_responses(_gen: &mut OpenApiGenerator) -> rocket_okapi::Result<Responses> {
        use rocket_okapi::okapi::openapi3::{RefOr, Response};
        let mut responses = Responses::default();
        responses.responses.insert(
            "401".to_string(),
            RefOr::Object(Response {
                description: "Not signed in or session expired".to_string(),
                ..Default::default()
            }),
        );
        Ok(responses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_value_round_trips() {
        let session_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();
        let value = session_cookie_value(&session_id, &user_id);
        assert_eq!(parse_session_cookie_value(&value), Some((session_id, user_id)));
    }

    #[test]
    fn account_id_cannot_be_smuggled_in_the_cookie() {
        let value = format!("{}:{}:robin@example.com", Uuid::new_v4(), Uuid::new_v4());
        assert!(parse_session_cookie_value(&value).is_none());
    }

    #[test]
    fn malformed_values_are_rejected() {
        assert!(parse_session_cookie_value("not-a-uuid:robin@example.com").is_none());
        assert!(parse_session_cookie_value("missing-delimiter").is_none());
        assert!(parse_session_cookie_value("").is_none());
    }
}
