use crate::middleware::rate_limit::RateLimitRetryAfter;
use rocket::http::{Header, Status};
use rocket::response::{self, Responder, Response};
use rocket::serde::Serialize;
use rocket::serde::json::Json;
use rocket::{Request, catch};

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct Error {
    pub message: String,
}

fn error(message: &str) -> Json<Error> {
    Json(Error { message: message.to_string() })
}

#[catch(400)]
pub fn bad_request(_: &Request) -> Json<Error> {
    error("Bad request")
}

#[catch(401)]
pub fn unauthorized(_: &Request) -> Json<Error> {
    error("Unauthorized")
}

#[catch(404)]
pub fn not_found(_: &Request) -> Json<Error> {
    error("Not found")
}

#[catch(409)]
pub fn conflict(_: &Request) -> Json<Error> {
    error("Conflict")
}

/// Malformed JSON bodies end up here.
#[catch(422)]
pub fn unprocessable_entity(_: &Request) -> Json<Error> {
    error("Unprocessable entity")
}

pub struct TooManyRequests {
    retry_after: Option<u64>,
}

impl<'r> Responder<'r, 'static> for TooManyRequests {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        let mut response = Response::build_from(error("Too many requests").respond_to(req)?);
        response.status(Status::TooManyRequests);
        if let Some(retry_after) = self.retry_after {
            response.header(Header::new("Retry-After", retry_after.to_string()));
        }
        response.ok()
    }
}

#[catch(429)]
pub fn too_many_requests(req: &Request) -> TooManyRequests {
    TooManyRequests {
        retry_after: req.local_cache(|| None::<RateLimitRetryAfter>).as_ref().map(|r| r.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rocket::catchers;
    use rocket::http::ContentType;
    use rocket::local::asynchronous::Client;

    #[rocket::async_test]
    async fn unknown_route_returns_json_message() {
        let rocket = rocket::build().register("/", catchers![not_found]);
        let client = Client::tracked(rocket).await.expect("valid rocket instance");

        let response = client.get("/nowhere").dispatch().await;

        assert_eq!(response.status(), Status::NotFound);
        assert_eq!(response.content_type(), Some(ContentType::JSON));
        assert_eq!(response.into_string().await.as_deref(), Some(r#"{"message":"Not found"}"#));
    }
}
