use chrono::{DateTime, Utc};
use rocket::serde::Serialize;
use schemars::JsonSchema;
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Applicant {
    pub id: Uuid,
    pub account_id: Uuid,
    pub interview_id: Uuid,
    pub name: String,
    pub email: String,
    pub session_access_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewApplicant {
    pub account_id: Uuid,
    pub interview_id: Uuid,
    pub name: String,
    pub email: String,
    pub session_access_id: Option<Uuid>,
}

#[derive(Serialize, Debug, JsonSchema)]
pub struct ApplicantResponse {
    pub id: Uuid,
    pub interview_id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Applicant> for ApplicantResponse {
    fn from(applicant: &Applicant) -> Self {
        Self {
            id: applicant.id,
            interview_id: applicant.interview_id,
            name: applicant.name.clone(),
            email: applicant.email.clone(),
            created_at: applicant.created_at,
        }
    }
}
