use crate::database::applicant::ApplicantRepository;
use crate::database::interview::InterviewRepository;
use crate::database::session_access::SessionAccessRepository;
use crate::error::app_error::AppError;
use crate::models::applicant::{Applicant, NewApplicant};
use crate::models::interview::Interview;
use crate::models::session_access::{ACCESS_CODE_RE, ApplicantRegistrationRequest, PIN_RE};
use crate::service::clock::Clock;

/// Trim and uppercase so codes typed as `abc234 ` still match.
pub fn normalize_access_code(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}

/// Redeems an access grant: an applicant presenting a live code + PIN is attached to the grant's interview.
pub struct ApplicantRegistrationService<'a, R, C> {
    repository: &'a R,
    clock: C,
}

impl<'a, R, C> ApplicantRegistrationService<'a, R, C>
where
    R: SessionAccessRepository + InterviewRepository + ApplicantRepository,
    C: Clock,
{
    pub fn new(repository: &'a R, clock: C) -> Self {
        Self { repository, clock }
    }

    pub async fn register_applicant(&self, request: &ApplicantRegistrationRequest) -> Result<(Applicant, Interview), AppError> {
        let access_code = normalize_access_code(&request.access_code);
        let pin = request.pin.trim();
        if !ACCESS_CODE_RE.is_match(&access_code) || !PIN_RE.is_match(pin) {
            return Err(AppError::BadRequest("Malformed access code or PIN".to_string()));
        }

        let Some(grant) = self.repository.find_session_access_by_code(&access_code, pin).await? else {
            tracing::warn!("applicant registration with unknown access code");
            return Err(AppError::InvalidCredentials);
        };

        let now = self.clock.now();
        if grant.is_expired_at(now) {
            tracing::warn!(grant_id = %grant.id, expiration = %grant.expiration, "applicant registration with expired access code");
            return Err(AppError::BadRequest("Access code has expired".to_string()));
        }

        let interview = self
            .repository
            .get_interview_by_id(&grant.interview_id, &grant.account_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Interview not found".to_string()))?;

        if !interview.status.accepts_applicants() {
            return Err(AppError::BadRequest("Interview is not open for registration".to_string()));
        }

        let applicant = self
            .repository
            .create_applicant(&NewApplicant {
                account_id: grant.account_id,
                interview_id: grant.interview_id,
                name: request.name.trim().to_string(),
                email: request.email.trim().to_string(),
                session_access_id: Some(grant.id),
            })
            .await?;

        tracing::info!(
            applicant_id = %applicant.id,
            interview_id = %interview.id,
            grant_id = %grant.id,
            "applicant registered"
        );

        Ok((applicant, interview))
    }
}
