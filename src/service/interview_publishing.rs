use crate::config::AccessGrantConfig;
use crate::database::interview::InterviewRepository;
use crate::database::session_access::SessionAccessRepository;
use crate::error::app_error::AppError;
use crate::models::interview::{Interview, InterviewStatus};
use crate::models::session_access::SessionAccess;
use crate::service::access_grant::AccessGrantIssuer;
use crate::service::clock::{Clock, SystemClock};
use rand::Rng;
use rand::rngs::StdRng;
use uuid::Uuid;

/// Opens an interview to applicants: a grant is issued first, and only once it is
/// stored does the interview become `Published`. A failed issuance leaves the
/// status untouched.
pub struct InterviewPublishingService<'a, R, G, C = SystemClock> {
    repository: &'a R,
    issuer: AccessGrantIssuer<'a, R, G, C>,
}

impl<'a, R> InterviewPublishingService<'a, R, StdRng, SystemClock>
where
    R: InterviewRepository + SessionAccessRepository,
{
    pub fn from_config(repository: &'a R, config: &AccessGrantConfig) -> Self {
        Self {
            repository,
            issuer: AccessGrantIssuer::from_config(repository, config),
        }
    }
}

impl<'a, R, G, C> InterviewPublishingService<'a, R, G, C>
where
    R: InterviewRepository + SessionAccessRepository,
    G: Rng,
    C: Clock,
{
    pub fn new(repository: &'a R, issuer: AccessGrantIssuer<'a, R, G, C>) -> Self {
        Self { repository, issuer }
    }

    pub async fn publish(&mut self, interview_id: &Uuid, account_id: &Uuid, expiration_days: i64) -> Result<(Interview, SessionAccess), AppError> {
        let grant = self.issuer.issue_grant(interview_id, account_id, expiration_days).await?;
        let interview = self
            .repository
            .set_interview_status(interview_id, InterviewStatus::Published, account_id)
            .await?;

        tracing::info!(%interview_id, %account_id, grant_id = %grant.id, "interview published");
        Ok((interview, grant))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::clock::FixedClock;
    use crate::test_utils::{InjectedFailure, MockRepository};
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use rand::SeedableRng;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 4, 10, 0, 0).unwrap()
    }

    fn service(repo: &MockRepository) -> InterviewPublishingService<'_, MockRepository, StdRng, FixedClock> {
        InterviewPublishingService::new(repo, AccessGrantIssuer::new(repo, StdRng::seed_from_u64(3), FixedClock(t0()), 5))
    }

    async fn status_of(repo: &MockRepository, interview: &Interview) -> InterviewStatus {
        repo.get_interview_by_id(&interview.id, &interview.account_id)
            .await
            .unwrap()
            .map(|i| i.status)
            .unwrap()
    }

    #[tokio::test]
    async fn publish_issues_grant_then_opens_interview() {
        let repo = MockRepository::new();
        let account_id = Uuid::new_v4();
        let interview = repo.add_interview(&account_id, InterviewStatus::Draft);

        let (published, grant) = service(&repo).publish(&interview.id, &account_id, 7).await.unwrap();

        assert_eq!(published.status, InterviewStatus::Published);
        assert_eq!(status_of(&repo, &interview).await, InterviewStatus::Published);
        assert_eq!(grant.interview_id, interview.id);
        assert_eq!(grant.account_id, account_id);
        assert_eq!(grant.expiration, t0() + Duration::days(7));
        assert_eq!(repo.grants(), vec![grant]);
    }

    #[tokio::test]
    async fn storage_outage_leaves_interview_in_draft() {
        let repo = MockRepository::new();
        let account_id = Uuid::new_v4();
        let interview = repo.add_interview(&account_id, InterviewStatus::Draft);
        repo.fail_grant_inserts([InjectedFailure::Unavailable]);

        let result = service(&repo).publish(&interview.id, &account_id, 7).await;

        assert!(matches!(result, Err(AppError::Db { .. })));
        assert_eq!(status_of(&repo, &interview).await, InterviewStatus::Draft);
        assert!(repo.grants().is_empty());
    }

    #[tokio::test]
    async fn out_of_range_expiration_leaves_interview_in_draft() {
        let repo = MockRepository::new();
        let account_id = Uuid::new_v4();
        let interview = repo.add_interview(&account_id, InterviewStatus::Draft);

        let result = service(&repo).publish(&interview.id, &account_id, i64::MAX).await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
        assert_eq!(status_of(&repo, &interview).await, InterviewStatus::Draft);
        assert_eq!(repo.grant_insert_attempts(), 0);
    }

    #[tokio::test]
    async fn foreign_interview_is_not_published() {
        let repo = MockRepository::new();
        let owner = Uuid::new_v4();
        let interview = repo.add_interview(&owner, InterviewStatus::Draft);

        let result = service(&repo).publish(&interview.id, &Uuid::new_v4(), 7).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert_eq!(status_of(&repo, &interview).await, InterviewStatus::Draft);
        assert!(repo.grants().is_empty());
    }

    #[tokio::test]
    async fn issuing_alone_never_changes_status() {
        let repo = MockRepository::new();
        let account_id = Uuid::new_v4();
        let interview = repo.add_interview(&account_id, InterviewStatus::Archived);

        AccessGrantIssuer::new(&repo, StdRng::seed_from_u64(9), FixedClock(t0()), 5)
            .issue_grant(&interview.id, &account_id, 7)
            .await
            .unwrap();

        assert_eq!(status_of(&repo, &interview).await, InterviewStatus::Archived);
        assert_eq!(repo.grants().len(), 1);
    }
}
