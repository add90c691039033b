use crate::database::applicant::ApplicantRepository;
use crate::database::interview::InterviewRepository;
use crate::database::password_reset::PasswordResetRepository;
use crate::database::session::SessionRepository;
use crate::database::session_access::SessionAccessRepository;
use crate::database::user::UserRepository;
use crate::error::app_error::AppError;
use crate::models::applicant::{Applicant, NewApplicant};
use crate::models::interview::{Interview, InterviewRequest, InterviewStatus};
use crate::models::pagination::PaginationParams;
use crate::models::password_reset::PasswordReset;
use crate::models::session::{Session, SessionUser};
use crate::models::session_access::{NewSessionAccess, SessionAccess};
use crate::models::user::User;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

/// Storage failures a test can queue for the next session-access inserts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectedFailure {
    Conflict,
    ForeignKey,
    Unavailable,
}

impl From<InjectedFailure> for AppError {
    fn from(failure: InjectedFailure) -> Self {
        match failure {
            InjectedFailure::Conflict => AppError::Conflict("session_access_access_code_pin_key".to_string()),
            InjectedFailure::ForeignKey => AppError::BadRequest("Referenced resource does not exist".to_string()),
            InjectedFailure::Unavailable => AppError::from(sqlx::Error::PoolTimedOut),
        }
    }
}

#[derive(Default)]
struct MockState {
    interviews: Vec<Interview>,
    grants: Vec<SessionAccess>,
    grant_insert_attempts: usize,
    grant_insert_failures: VecDeque<InjectedFailure>,
    applicants: Vec<Applicant>,
    users: Vec<User>,
    passwords: HashMap<Uuid, String>,
    fail_next_password_write: bool,
    resets: Vec<PasswordReset>,
    sessions: Vec<(Session, Uuid)>,
}

/// In-memory stand-in for `PostgresRepository` that keeps the same tenant
/// scoping, foreign-key and uniqueness rules as the schema.
#[derive(Default)]
pub struct MockRepository {
    state: Mutex<MockState>,
}

impl MockRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().expect("mock state poisoned")
    }

    pub fn add_interview(&self, account_id: &Uuid, status: InterviewStatus) -> Interview {
        let now = Utc::now();
        let interview = Interview {
            id: Uuid::new_v4(),
            account_id: *account_id,
            title: "Backend engineer screen".to_string(),
            company_name: "Acme".to_string(),
            job_title: "Backend engineer".to_string(),
            focus_areas: vec!["Rust".to_string(), "SQL".to_string()],
            interviewer_style: "Conversational".to_string(),
            max_duration_minutes: 45,
            status,
            created_at: now,
            updated_at: now,
            ..Interview::default()
        };
        self.state().interviews.push(interview.clone());
        interview
    }

    pub fn add_grant(&self, interview_id: &Uuid, account_id: &Uuid, access_code: &str, pin: &str, expiration: DateTime<Utc>) -> SessionAccess {
        let grant = SessionAccess {
            id: Uuid::new_v4(),
            interview_id: *interview_id,
            account_id: *account_id,
            access_code: access_code.to_string(),
            pin: pin.to_string(),
            expiration,
            created_at: Utc::now(),
        };
        self.state().grants.push(grant.clone());
        grant
    }

    pub fn fail_grant_inserts(&self, failures: impl IntoIterator<Item = InjectedFailure>) {
        self.state().grant_insert_failures.extend(failures);
    }

    pub fn grants(&self) -> Vec<SessionAccess> {
        self.state().grants.clone()
    }

    pub fn grant_insert_attempts(&self) -> usize {
        self.state().grant_insert_attempts
    }

    pub fn applicants(&self) -> Vec<Applicant> {
        self.state().applicants.clone()
    }

    pub fn add_user(&self, account_id: &Uuid, email: &str) -> User {
        let user = User {
            id: Uuid::new_v4(),
            account_id: *account_id,
            name: "Robin".to_string(),
            email: email.to_string(),
            password_hash: String::new(),
            created_at: Utc::now(),
        };
        self.state().users.push(user.clone());
        user
    }

    pub fn password_of(&self, user_id: &Uuid) -> Option<String> {
        self.state().passwords.get(user_id).cloned()
    }

    /// The next reset confirmation fails as if the database went away mid-transaction.
    pub fn fail_next_password_write(&self) {
        self.state().fail_next_password_write = true;
    }

    pub fn add_reset(&self, reset: PasswordReset) {
        self.state().resets.push(reset);
    }

    pub fn resets(&self) -> Vec<PasswordReset> {
        self.state().resets.clone()
    }

    pub fn session_count(&self, user_id: &Uuid) -> usize {
        self.state().sessions.iter().filter(|(session, _)| session.user_id == *user_id).count()
    }
}

#[async_trait::async_trait]
impl InterviewRepository for MockRepository {
    async fn create_interview(&self, request: &InterviewRequest, account_id: &Uuid) -> Result<Interview, AppError> {
        let now = Utc::now();
        let interview = Interview {
            id: Uuid::new_v4(),
            account_id: *account_id,
            company_id: request.company_id,
            job_id: request.job_id,
            title: request.title.clone(),
            company_name: request.company_name.clone(),
            job_title: request.job_title.clone(),
            job_description: request.job_description.clone(),
            focus_areas: request.focus_areas.clone(),
            interviewer_style: request.interviewer_style.clone(),
            max_duration_minutes: request.max_duration_minutes,
            status: InterviewStatus::Draft,
            created_at: now,
            updated_at: now,
        };
        self.state().interviews.push(interview.clone());
        Ok(interview)
    }

    async fn get_interview_by_id(&self, id: &Uuid, account_id: &Uuid) -> Result<Option<Interview>, AppError> {
        Ok(self
            .state()
            .interviews
            .iter()
            .find(|i| i.id == *id && i.account_id == *account_id && i.status != InterviewStatus::Deleted)
            .cloned())
    }

    async fn list_interviews(&self, _params: &PaginationParams, account_id: &Uuid) -> Result<(Vec<Interview>, i64), AppError> {
        let interviews: Vec<Interview> = self
            .state()
            .interviews
            .iter()
            .filter(|i| i.account_id == *account_id && i.status != InterviewStatus::Deleted)
            .cloned()
            .collect();
        let total = interviews.len() as i64;
        Ok((interviews, total))
    }

    async fn update_interview(&self, id: &Uuid, request: &InterviewRequest, account_id: &Uuid) -> Result<Interview, AppError> {
        let mut state = self.state();
        let interview = state
            .interviews
            .iter_mut()
            .find(|i| i.id == *id && i.account_id == *account_id && i.status != InterviewStatus::Deleted)
            .ok_or_else(|| AppError::NotFound("Interview not found".to_string()))?;
        interview.title = request.title.clone();
        interview.company_name = request.company_name.clone();
        interview.job_title = request.job_title.clone();
        interview.job_description = request.job_description.clone();
        interview.focus_areas = request.focus_areas.clone();
        interview.interviewer_style = request.interviewer_style.clone();
        interview.max_duration_minutes = request.max_duration_minutes;
        interview.updated_at = Utc::now();
        Ok(interview.clone())
    }

    async fn set_interview_status(&self, id: &Uuid, status: InterviewStatus, account_id: &Uuid) -> Result<Interview, AppError> {
        let mut state = self.state();
        let interview = state
            .interviews
            .iter_mut()
            .find(|i| i.id == *id && i.account_id == *account_id && i.status != InterviewStatus::Deleted)
            .ok_or_else(|| AppError::NotFound("Interview not found".to_string()))?;
        interview.status = status;
        interview.updated_at = Utc::now();
        Ok(interview.clone())
    }

    async fn delete_interview(&self, id: &Uuid, account_id: &Uuid) -> Result<(), AppError> {
        self.set_interview_status(id, InterviewStatus::Deleted, account_id).await.map(|_| ())
    }
}

#[async_trait::async_trait]
impl SessionAccessRepository for MockRepository {
    async fn create_session_access(&self, new: &NewSessionAccess) -> Result<SessionAccess, AppError> {
        let mut state = self.state();
        state.grant_insert_attempts += 1;

        if let Some(failure) = state.grant_insert_failures.pop_front() {
            return Err(failure.into());
        }

        // (interview_id, account_id) references interview (id, account_id)
        if !state.interviews.iter().any(|i| i.id == new.interview_id && i.account_id == new.account_id) {
            return Err(InjectedFailure::ForeignKey.into());
        }
        if state.grants.iter().any(|g| g.access_code == new.access_code && g.pin == new.pin) {
            return Err(InjectedFailure::Conflict.into());
        }

        let grant = SessionAccess {
            id: Uuid::new_v4(),
            interview_id: new.interview_id,
            account_id: new.account_id,
            access_code: new.access_code.clone(),
            pin: new.pin.clone(),
            expiration: new.expiration,
            created_at: new.created_at,
        };
        state.grants.push(grant.clone());
        Ok(grant)
    }

    async fn list_session_access_for_interview(&self, interview_id: &Uuid, account_id: &Uuid) -> Result<Vec<SessionAccess>, AppError> {
        Ok(self
            .state()
            .grants
            .iter()
            .filter(|g| g.interview_id == *interview_id && g.account_id == *account_id)
            .cloned()
            .collect())
    }

    async fn find_session_access_by_code(&self, access_code: &str, pin: &str) -> Result<Option<SessionAccess>, AppError> {
        Ok(self.state().grants.iter().find(|g| g.access_code == access_code && g.pin == pin).cloned())
    }
}

#[async_trait::async_trait]
impl ApplicantRepository for MockRepository {
    async fn create_applicant(&self, new: &NewApplicant) -> Result<Applicant, AppError> {
        let applicant = Applicant {
            id: Uuid::new_v4(),
            account_id: new.account_id,
            interview_id: new.interview_id,
            name: new.name.clone(),
            email: new.email.clone(),
            session_access_id: new.session_access_id,
            created_at: Utc::now(),
        };
        self.state().applicants.push(applicant.clone());
        Ok(applicant)
    }

    async fn get_applicant_by_id(&self, id: &Uuid, account_id: &Uuid) -> Result<Option<Applicant>, AppError> {
        Ok(self.state().applicants.iter().find(|a| a.id == *id && a.account_id == *account_id).cloned())
    }

    async fn list_applicants(&self, _params: &PaginationParams, interview_id: Option<&Uuid>, account_id: &Uuid) -> Result<(Vec<Applicant>, i64), AppError> {
        let applicants: Vec<Applicant> = self
            .state()
            .applicants
            .iter()
            .filter(|a| a.account_id == *account_id && interview_id.is_none_or(|id| a.interview_id == *id))
            .cloned()
            .collect();
        let total = applicants.len() as i64;
        Ok((applicants, total))
    }

    async fn delete_applicant(&self, id: &Uuid, account_id: &Uuid) -> Result<(), AppError> {
        let mut state = self.state();
        let before = state.applicants.len();
        state.applicants.retain(|a| !(a.id == *id && a.account_id == *account_id));
        if state.applicants.len() == before {
            return Err(AppError::NotFound("Applicant not found".to_string()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl UserRepository for MockRepository {
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self.state().users.iter().find(|u| u.email.eq_ignore_ascii_case(email)).cloned())
    }

    async fn get_user_by_id(&self, id: &Uuid) -> Result<Option<User>, AppError> {
        Ok(self.state().users.iter().find(|u| u.id == *id).cloned())
    }
}

#[async_trait::async_trait]
impl PasswordResetRepository for MockRepository {
    async fn create_password_reset(&self, user_id: &Uuid, email: &str, token_hash: &str, expires: DateTime<Utc>) -> Result<PasswordReset, AppError> {
        let reset = PasswordReset {
            id: Uuid::new_v4(),
            user_id: *user_id,
            email: email.to_string(),
            token_hash: token_hash.to_string(),
            expires,
            used: false,
            created_at: Utc::now(),
        };
        self.state().resets.push(reset.clone());
        Ok(reset)
    }

    async fn get_password_reset_by_token_hash(&self, token_hash: &str) -> Result<Option<PasswordReset>, AppError> {
        Ok(self.state().resets.iter().find(|r| r.token_hash == token_hash).cloned())
    }

    async fn consume_password_reset(&self, reset_id: &Uuid, user_id: &Uuid, new_password: &str) -> Result<bool, AppError> {
        let mut state = self.state();
        let Some(index) = state.resets.iter().position(|r| r.id == *reset_id && !r.used) else {
            return Ok(false);
        };
        // All or nothing, like the transaction it stands in for.
        if std::mem::take(&mut state.fail_next_password_write) {
            return Err(InjectedFailure::Unavailable.into());
        }
        state.resets[index].used = true;
        state.passwords.insert(*user_id, new_password.to_string());
        Ok(true)
    }

    async fn count_password_reset_attempts(&self, user_id: &Uuid, since: DateTime<Utc>) -> Result<i64, AppError> {
        Ok(self.state().resets.iter().filter(|r| r.user_id == *user_id && r.created_at >= since).count() as i64)
    }

    async fn cleanup_expired_password_resets(&self) -> Result<u64, AppError> {
        let now = Utc::now();
        let mut state = self.state();
        let before = state.resets.len();
        state.resets.retain(|r| !r.used && r.expires > now);
        Ok((before - state.resets.len()) as u64)
    }
}

#[async_trait::async_trait]
impl SessionRepository for MockRepository {
    async fn create_session(&self, user_id: &Uuid, expires_at: DateTime<Utc>) -> Result<Session, AppError> {
        let mut state = self.state();
        let account_id = state
            .users
            .iter()
            .find(|u| u.id == *user_id)
            .map(|u| u.account_id)
            .ok_or_else(|| AppError::BadRequest("Referenced resource does not exist".to_string()))?;
        let session = Session {
            id: Uuid::new_v4(),
            user_id: *user_id,
            expires_at,
        };
        state.sessions.push((session.clone(), account_id));
        Ok(session)
    }

    async fn get_active_session_user(&self, session_id: &Uuid, user_id: &Uuid) -> Result<Option<SessionUser>, AppError> {
        let now = Utc::now();
        let state = self.state();
        let Some((session, account_id)) = state
            .sessions
            .iter()
            .find(|(s, _)| s.id == *session_id && s.user_id == *user_id && s.expires_at > now)
        else {
            return Ok(None);
        };
        let email = state.users.iter().find(|u| u.id == session.user_id).map(|u| u.email.clone()).unwrap_or_default();
        Ok(Some(SessionUser {
            id: session.user_id,
            account_id: *account_id,
            email,
        }))
    }

    async fn delete_session(&self, session_id: &Uuid) -> Result<(), AppError> {
        self.state().sessions.retain(|(s, _)| s.id != *session_id);
        Ok(())
    }

    async fn delete_session_if_expired(&self, session_id: &Uuid) -> Result<(), AppError> {
        let now = Utc::now();
        self.state().sessions.retain(|(s, _)| !(s.id == *session_id && s.expires_at <= now));
        Ok(())
    }

    async fn invalidate_all_user_sessions(&self, user_id: &Uuid) -> Result<u64, AppError> {
        let mut state = self.state();
        let before = state.sessions.len();
        state.sessions.retain(|(s, _)| s.user_id != *user_id);
        Ok((before - state.sessions.len()) as u64)
    }

    async fn cleanup_expired_sessions(&self) -> Result<u64, AppError> {
        let now = Utc::now();
        let mut state = self.state();
        let before = state.sessions.len();
        state.sessions.retain(|(s, _)| s.expires_at > now);
        Ok((before - state.sessions.len()) as u64)
    }
}
