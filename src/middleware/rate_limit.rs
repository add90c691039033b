use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::auth::{SESSION_COOKIE, parse_session_cookie_value};
use crate::config::RateLimitConfig;
use crate::middleware::RequestId;
use rocket::http::{Method, Status};
use rocket::request::{FromRequest, Outcome, Request};
use rocket_okapi::r#gen::OpenApiGenerator;
use rocket_okapi::okapi::openapi3::{RefOr, Response as OpenApiResponse, Responses};
use rocket_okapi::request::{OpenApiFromRequest, RequestHeaderInput};
use tokio::sync::Mutex;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum RateLimitBucket {
    Read,
    Mutation,
    /// Login, sign-up and password reset.
    Auth,
    /// Access code + PIN redemption.
    Redeem,
}

impl RateLimitBucket {
    fn from_method(method: Method) -> Self {
        match method {
            Method::Post | Method::Put | Method::Patch | Method::Delete => RateLimitBucket::Mutation,
            _ => RateLimitBucket::Read,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum RateLimitIdentity {
    Ip(String),
    User(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RateLimitKey {
    identity: RateLimitIdentity,
    bucket: RateLimitBucket,
}

#[derive(Debug, Clone)]
struct Counter {
    window_start: Instant,
    count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RateLimitDecision {
    Allow,
    Limited { retry_after: Duration },
}

/// Fixed-window counters shared by every rate-limit guard.
#[derive(Debug)]
pub(crate) struct RateLimiter {
    config: RateLimitConfig,
    window: Duration,
    cleanup_interval: Duration,
    counters: Mutex<HashMap<RateLimitKey, Counter>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        let window = Duration::from_secs(config.window_seconds.max(1));
        let cleanup_interval = Duration::from_secs(config.cleanup_interval_seconds.max(1));

        Self {
            config,
            window,
            cleanup_interval,
            counters: Mutex::new(HashMap::new()),
        }
    }

    pub fn spawn_cleanup_task(self: Arc<Self>) {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.cleanup_interval);
            loop {
                ticker.tick().await;
                let now = Instant::now();
                self.counters
                    .lock()
                    .await
                    .retain(|_, counter| now.duration_since(counter.window_start) < self.window);
            }
        });
    }

    fn limit_for(&self, bucket: RateLimitBucket) -> u32 {
        match bucket {
            RateLimitBucket::Read => self.config.read_limit,
            RateLimitBucket::Mutation => self.config.mutation_limit,
            RateLimitBucket::Auth => self.config.auth_limit,
            RateLimitBucket::Redeem => self.config.redeem_limit,
        }
    }

    /// Every identity must be under the limit; only then are all of them charged.
    async fn check(&self, identities: &[RateLimitIdentity], bucket: RateLimitBucket) -> RateLimitDecision {
        let limit = self.limit_for(bucket);
        let now = Instant::now();
        let mut counters = self.counters.lock().await;

        let mut retry_after: Option<Duration> = None;
        for identity in identities {
            let counter = counters
                .entry(RateLimitKey {
                    identity: identity.clone(),
                    bucket,
                })
                .or_insert(Counter { window_start: now, count: 0 });

            if now.duration_since(counter.window_start) >= self.window {
                *counter = Counter { window_start: now, count: 0 };
            }

            if counter.count >= limit {
                let remaining = self.window.saturating_sub(now.duration_since(counter.window_start));
                retry_after = Some(retry_after.map_or(remaining, |current| current.max(remaining)));
            }
        }

        if let Some(retry_after) = retry_after {
            return RateLimitDecision::Limited { retry_after };
        }

        for identity in identities {
            if let Some(counter) = counters.get_mut(&RateLimitKey {
                identity: identity.clone(),
                bucket,
            }) {
                counter.count += 1;
            }
        }

        RateLimitDecision::Allow
    }
}

/// Seconds a limited client should wait, stashed for the 429 catcher.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RateLimitRetryAfter(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RateLimitError {
    TooManyRequests,
    MissingClientIp,
}

impl RateLimitError {
    fn status(self) -> Status {
        match self {
            RateLimitError::TooManyRequests => Status::TooManyRequests,
            RateLimitError::MissingClientIp => Status::BadRequest,
        }
    }
}

fn request_identities(request: &Request<'_>, require_client_ip: bool) -> Result<Vec<RateLimitIdentity>, RateLimitError> {
    let mut identities = Vec::with_capacity(2);

    match request.client_ip() {
        Some(ip) => identities.push(RateLimitIdentity::Ip(ip.to_string())),
        None => warn!(
            request_id = %RequestId::of(request),
            method = %request.method(),
            uri = %request.uri(),
            "client ip unavailable for rate limiting"
        ),
    }

    if let Some((_, user_id)) = request
        .cookies()
        .get_private(SESSION_COOKIE)
        .and_then(|cookie| parse_session_cookie_value(cookie.value()))
    {
        identities.push(RateLimitIdentity::User(user_id.to_string()));
    }

    if identities.is_empty() {
        if require_client_ip {
            return Err(RateLimitError::MissingClientIp);
        }
        identities.push(RateLimitIdentity::Ip("missing-ip".to_string()));
    }

    Ok(identities)
}

async fn rate_limit_request(request: &Request<'_>, bucket: RateLimitBucket) -> Outcome<(), RateLimitError> {
    let Some(limiter) = request.rocket().state::<Arc<RateLimiter>>() else {
        return Outcome::Success(());
    };

    let identities = match request_identities(request, limiter.config.require_client_ip) {
        Ok(identities) => identities,
        Err(error) => return Outcome::Error((error.status(), error)),
    };

    match limiter.check(&identities, bucket).await {
        RateLimitDecision::Allow => Outcome::Success(()),
        RateLimitDecision::Limited { retry_after } => {
            let retry_after_secs = retry_after_seconds(retry_after);
            request.local_cache(|| Some(RateLimitRetryAfter(retry_after_secs)));
            warn!(
                request_id = %RequestId::of(request),
                method = %request.method(),
                uri = %request.uri(),
                bucket = ?bucket,
                retry_after_secs,
                "rate limit exceeded"
            );
            Outcome::Error((RateLimitError::TooManyRequests.status(), RateLimitError::TooManyRequests))
        }
    }
}

/// Whole seconds, rounded up so clients never retry early.
fn retry_after_seconds(remaining: Duration) -> u64 {
    let secs = remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0);
    secs.max(1)
}

fn too_many_requests_response() -> rocket_okapi::Result<Responses> {
    let mut responses = Responses::default();
    responses.responses.insert(
        "429".to_string(),
        RefOr::Object(OpenApiResponse {
            description: "Too Many Requests".to_string(),
            ..Default::default()
        }),
    );
    Ok(responses)
}

/// Declares a request guard that charges the given bucket (or the method's bucket).
macro_rules! rate_limit_guard {
    ($(#[$meta:meta])* $name:ident, $bucket:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy)]
        pub(crate) struct $name;

        #[rocket::async_trait]
        impl<'r> FromRequest<'r> for $name {
            type Error = RateLimitError;

            async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
                let bucket: fn(&Request<'_>) -> RateLimitBucket = $bucket;
                rate_limit_request(request, bucket(request)).await.map(|_| $name)
            }
        }

        impl<'a> OpenApiFromRequest<'a> for $name {
            fn from_request_input(_gen: &mut OpenApiGenerator, _name: String, _required: bool) -> rocket_okapi::Result<RequestHeaderInput> {
                Ok(RequestHeaderInput::None)
            }

            fn get_responses(_gen: &mut OpenApiGenerator) -> rocket_okapi::Result<Responses> {
                too_many_requests_response()
            }
        }
    };
}

rate_limit_guard!(
    /// Read or mutation bucket depending on the HTTP method.
    RateLimit,
    |request| RateLimitBucket::from_method(request.method())
);
rate_limit_guard!(AuthRateLimit, |_| RateLimitBucket::Auth);
rate_limit_guard!(
    /// Guards the public code + PIN endpoint, the only brute-force target for grants.
    RedeemRateLimit,
    |_| RateLimitBucket::Redeem
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::error::too_many_requests;
    use rocket::http::ContentType;
    use rocket::local::asynchronous::Client;
    use rocket::{catchers, get, post, routes};

    fn limiter(read_limit: u32, redeem_limit: u32, window_seconds: u64) -> RateLimiter {
        RateLimiter::new(RateLimitConfig {
            read_limit,
            mutation_limit: 1,
            auth_limit: 1,
            redeem_limit,
            window_seconds,
            cleanup_interval_seconds: 60,
            require_client_ip: false,
        })
    }

    fn ip(addr: &str) -> Vec<RateLimitIdentity> {
        vec![RateLimitIdentity::Ip(addr.to_string())]
    }

    impl RateLimiter {
        async fn count_for(&self, identity: RateLimitIdentity, bucket: RateLimitBucket) -> u32 {
            let counters = self.counters.lock().await;
            counters.get(&RateLimitKey { identity, bucket }).map(|counter| counter.count).unwrap_or(0)
        }
    }

    #[get("/limited")]
    async fn limited(_rate_limit: RateLimit) -> Status {
        Status::Ok
    }

    #[post("/redeem")]
    async fn redeem(_rate_limit: RedeemRateLimit) -> Status {
        Status::Ok
    }

    #[rocket::async_test]
    async fn blocks_after_limit() {
        let limiter = limiter(2, 1, 60);
        let identities = ip("127.0.0.1");

        assert_eq!(limiter.check(&identities, RateLimitBucket::Read).await, RateLimitDecision::Allow);
        assert_eq!(limiter.check(&identities, RateLimitBucket::Read).await, RateLimitDecision::Allow);
        assert!(matches!(
            limiter.check(&identities, RateLimitBucket::Read).await,
            RateLimitDecision::Limited { .. }
        ));
    }

    #[rocket::async_test]
    async fn resets_after_window() {
        let limiter = limiter(1, 1, 1);
        let identities = ip("127.0.0.1");

        assert_eq!(limiter.check(&identities, RateLimitBucket::Read).await, RateLimitDecision::Allow);
        assert!(matches!(
            limiter.check(&identities, RateLimitBucket::Read).await,
            RateLimitDecision::Limited { .. }
        ));

        tokio::time::sleep(Duration::from_millis(1100)).await;

        assert_eq!(limiter.check(&identities, RateLimitBucket::Read).await, RateLimitDecision::Allow);
    }

    #[rocket::async_test]
    async fn buckets_are_independent() {
        let limiter = limiter(10, 2, 60);
        let identities = ip("10.1.1.1");

        for _ in 0..2 {
            assert_eq!(limiter.check(&identities, RateLimitBucket::Redeem).await, RateLimitDecision::Allow);
        }
        assert!(matches!(
            limiter.check(&identities, RateLimitBucket::Redeem).await,
            RateLimitDecision::Limited { .. }
        ));
        assert_eq!(limiter.check(&identities, RateLimitBucket::Read).await, RateLimitDecision::Allow);
        assert_eq!(limiter.check(&ip("10.1.1.2"), RateLimitBucket::Redeem).await, RateLimitDecision::Allow);
    }

    #[rocket::async_test]
    async fn limited_requests_are_not_charged() {
        let limiter = limiter(1, 1, 60);
        let ip = RateLimitIdentity::Ip("10.0.0.1".to_string());
        let user = RateLimitIdentity::User("user-1".to_string());
        let identities = vec![ip.clone(), user.clone()];

        assert_eq!(limiter.check(&identities, RateLimitBucket::Read).await, RateLimitDecision::Allow);
        assert!(matches!(
            limiter.check(&identities, RateLimitBucket::Read).await,
            RateLimitDecision::Limited { .. }
        ));

        assert_eq!(limiter.count_for(ip, RateLimitBucket::Read).await, 1);
        assert_eq!(limiter.count_for(user, RateLimitBucket::Read).await, 1);
    }

    #[test]
    fn retry_after_rounds_up() {
        assert_eq!(retry_after_seconds(Duration::from_millis(59_999)), 60);
        assert_eq!(retry_after_seconds(Duration::from_secs(60)), 60);
        assert_eq!(retry_after_seconds(Duration::ZERO), 1);
    }

    #[test]
    fn bucket_from_method() {
        for method in [Method::Get, Method::Head, Method::Options] {
            assert_eq!(RateLimitBucket::from_method(method), RateLimitBucket::Read);
        }
        for method in [Method::Post, Method::Put, Method::Patch, Method::Delete] {
            assert_eq!(RateLimitBucket::from_method(method), RateLimitBucket::Mutation);
        }
    }

    #[rocket::async_test]
    async fn limited_response_has_retry_after() {
        let rocket = rocket::build()
            .manage(Arc::new(limiter(0, 0, 60)))
            .mount("/", routes![limited])
            .register("/", catchers![too_many_requests]);
        let client = Client::tracked(rocket).await.expect("valid rocket instance");

        let response = client.get("/limited").dispatch().await;

        assert_eq!(response.status(), Status::TooManyRequests);
        assert_eq!(response.headers().get_one("Retry-After"), Some("60"));
        assert_eq!(response.content_type(), Some(ContentType::JSON));
    }

    #[rocket::async_test]
    async fn redeem_guard_uses_its_own_limit() {
        let rocket = rocket::build()
            .manage(Arc::new(limiter(100, 1, 60)))
            .mount("/", routes![redeem])
            .register("/", catchers![too_many_requests]);
        let client = Client::tracked(rocket).await.expect("valid rocket instance");

        assert_eq!(client.post("/redeem").dispatch().await.status(), Status::Ok);
        assert_eq!(client.post("/redeem").dispatch().await.status(), Status::TooManyRequests);
    }
}
