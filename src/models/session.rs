use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A login session for an account user. The id travels in the private `user` cookie.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SessionUser {
    pub id: Uuid,
    pub account_id: Uuid,
    pub email: String,
}
