use crate::models::session_access::SessionAccessResponse;
use chrono::{DateTime, Utc};
use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq, Default, JsonSchema, sqlx::Type)]
#[sqlx(type_name = "interview_status")]
pub enum InterviewStatus {
    #[default]
    Draft,
    Published,
    Archived,
    Deleted,
}

impl InterviewStatus {
    /// Applicants may only register for interviews that are live.
    pub fn accepts_applicants(self) -> bool {
        matches!(self, InterviewStatus::Published)
    }
}

#[derive(Debug, Clone, Default, sqlx::FromRow)]
pub struct Interview {
    pub id: Uuid,
    pub account_id: Uuid,
    pub company_id: Option<Uuid>,
    pub job_id: Option<Uuid>,
    pub title: String,
    pub company_name: String,
    pub job_title: String,
    pub job_description: Option<String>,
    pub focus_areas: Vec<String>,
    pub interviewer_style: String,
    pub max_duration_minutes: i32,
    pub status: InterviewStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize, Debug, Clone, Validate, JsonSchema)]
pub struct InterviewRequest {
    pub company_id: Option<Uuid>,
    pub job_id: Option<Uuid>,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 200))]
    pub company_name: String,
    #[validate(length(min = 1, max = 200))]
    pub job_title: String,
    #[validate(length(max = 20000))]
    pub job_description: Option<String>,
    #[validate(length(max = 20))]
    #[serde(default)]
    pub focus_areas: Vec<String>,
    #[validate(length(min = 1, max = 500))]
    pub interviewer_style: String,
    #[validate(range(min = 5, max = 240))]
    pub max_duration_minutes: i32,
}

/// Publishing optionally names how long the generated access grant stays valid.
#[derive(Deserialize, Debug, Default, JsonSchema)]
pub struct PublishInterviewRequest {
    pub expiration_days: Option<i64>,
}

#[derive(Serialize, Debug, JsonSchema)]
pub struct InterviewResponse {
    pub id: Uuid,
    pub company_id: Option<Uuid>,
    pub job_id: Option<Uuid>,
    pub title: String,
    pub company_name: String,
    pub job_title: String,
    pub job_description: Option<String>,
    pub focus_areas: Vec<String>,
    pub interviewer_style: String,
    pub max_duration_minutes: i32,
    pub status: InterviewStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Interview> for InterviewResponse {
    fn from(interview: &Interview) -> Self {
        Self {
            id: interview.id,
            company_id: interview.company_id,
            job_id: interview.job_id,
            title: interview.title.clone(),
            company_name: interview.company_name.clone(),
            job_title: interview.job_title.clone(),
            job_description: interview.job_description.clone(),
            focus_areas: interview.focus_areas.clone(),
            interviewer_style: interview.interviewer_style.clone(),
            max_duration_minutes: interview.max_duration_minutes,
            status: interview.status,
            created_at: interview.created_at,
            updated_at: interview.updated_at,
        }
    }
}

/// A published interview together with the grant applicants use to join it.
#[derive(Serialize, Debug, JsonSchema)]
pub struct PublishInterviewResponse {
    pub interview: InterviewResponse,
    pub access: SessionAccessResponse,
}

/// What an applicant sees about the interview they registered for.
#[derive(Serialize, Debug, JsonSchema)]
pub struct InterviewSummaryResponse {
    pub id: Uuid,
    pub title: String,
    pub company_name: String,
    pub job_title: String,
    pub max_duration_minutes: i32,
}

impl From<&Interview> for InterviewSummaryResponse {
    fn from(interview: &Interview) -> Self {
        Self {
            id: interview.id,
            title: interview.title.clone(),
            company_name: interview.company_name.clone(),
            job_title: interview.job_title.clone(),
            max_duration_minutes: interview.max_duration_minutes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_published_interviews_accept_applicants() {
        assert!(InterviewStatus::Published.accepts_applicants());
        assert!(!InterviewStatus::Draft.accepts_applicants());
        assert!(!InterviewStatus::Archived.accepts_applicants());
        assert!(!InterviewStatus::Deleted.accepts_applicants());
    }

    #[test]
    fn status_serializes_as_variant_name() {
        assert_eq!(serde_json::to_string(&InterviewStatus::Published).unwrap(), "\"Published\"");
    }

    #[test]
    fn interview_request_enforces_duration_bounds() {
        let request = InterviewRequest {
            company_id: None,
            job_id: None,
            title: "Backend screen".to_string(),
            company_name: "Acme".to_string(),
            job_title: "Engineer".to_string(),
            job_description: None,
            focus_areas: vec!["Rust".to_string()],
            interviewer_style: "Friendly".to_string(),
            max_duration_minutes: 600,
        };
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("max_duration_minutes"));
    }
}
