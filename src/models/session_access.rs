use crate::models::applicant::ApplicantResponse;
use crate::models::interview::InterviewSummaryResponse;
use chrono::{DateTime, Utc};
use regex::Regex;
use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use std::sync::LazyLock;
use uuid::Uuid;
use validator::Validate;

pub static ACCESS_CODE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[ABCDEFGHJKLMNPQRSTUVWXYZ23456789]{6}$").expect("valid access code regex"));
pub static PIN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{6}$").expect("valid pin regex"));

/// A credential pair letting an applicant join one interview. Rows are never updated;
/// whether a grant is still usable is decided by comparing `expiration` to the
/// verification instant.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct SessionAccess {
    pub id: Uuid,
    pub interview_id: Uuid,
    pub account_id: Uuid,
    pub access_code: String,
    pub pin: String,
    pub expiration: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl SessionAccess {
    /// A grant whose expiration equals `now` is already expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiration <= now
    }
}

/// Values handed to the persistence layer for a single insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSessionAccess {
    pub interview_id: Uuid,
    pub account_id: Uuid,
    pub access_code: String,
    pub pin: String,
    pub expiration: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize, Debug, Default, JsonSchema)]
pub struct IssueGrantRequest {
    pub expiration_days: Option<i64>,
}

#[derive(Serialize, Debug, JsonSchema)]
pub struct SessionAccessResponse {
    pub id: Uuid,
    pub interview_id: Uuid,
    pub access_code: String,
    pub pin: String,
    pub expiration: DateTime<Utc>,
    pub expired: bool,
    pub created_at: DateTime<Utc>,
}

impl SessionAccessResponse {
    pub fn at(grant: &SessionAccess, now: DateTime<Utc>) -> Self {
        Self {
            id: grant.id,
            interview_id: grant.interview_id,
            access_code: grant.access_code.clone(),
            pin: grant.pin.clone(),
            expiration: grant.expiration,
            expired: grant.is_expired_at(now),
            created_at: grant.created_at,
        }
    }
}

/// Public applicant sign-up with the code and PIN shared by the interviewer.
/// The code is normalized (trimmed, uppercased) before it is checked against the alphabet.
#[derive(Deserialize, Debug, Clone, Validate, JsonSchema)]
pub struct ApplicantRegistrationRequest {
    #[validate(length(min = 1, max = 16))]
    pub access_code: String,
    #[validate(length(min = 1, max = 16))]
    pub pin: String,
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(email)]
    pub email: String,
}

#[derive(Serialize, Debug, JsonSchema)]
pub struct ApplicantRegistrationResponse {
    pub applicant: ApplicantResponse,
    pub interview: InterviewSummaryResponse,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn grant(expiration: DateTime<Utc>) -> SessionAccess {
        SessionAccess {
            id: Uuid::new_v4(),
            interview_id: Uuid::new_v4(),
            account_id: Uuid::new_v4(),
            access_code: "ABCDEF".to_string(),
            pin: "123456".to_string(),
            expiration,
            created_at: expiration,
        }
    }

    #[test]
    fn expiration_equal_to_now_is_expired() {
        let t0 = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        assert!(grant(t0).is_expired_at(t0));
        assert!(grant(t0 - Duration::seconds(1)).is_expired_at(t0));
        assert!(!grant(t0 + Duration::seconds(1)).is_expired_at(t0));
    }

    #[test]
    fn response_reports_expiry_relative_to_now() {
        let t0 = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        let g = grant(t0 + Duration::days(7));
        assert!(!SessionAccessResponse::at(&g, t0).expired);
        assert!(SessionAccessResponse::at(&g, t0 + Duration::days(7)).expired);
    }

    #[test]
    fn code_patterns_exclude_ambiguous_symbols() {
        assert!(ACCESS_CODE_RE.is_match("ABC234"));
        assert!(!ACCESS_CODE_RE.is_match("ABCO12"));
        assert!(!ACCESS_CODE_RE.is_match("abc234"));
        assert!(PIN_RE.is_match("000000"));
        assert!(!PIN_RE.is_match("12345"));
    }
}
