use crate::config::AccessGrantConfig;
use crate::database::interview::InterviewRepository;
use crate::database::session_access::SessionAccessRepository;
use crate::error::app_error::AppError;
use crate::models::session_access::{NewSessionAccess, SessionAccess};
use crate::service::clock::{Clock, SystemClock};
use chrono::{DateTime, Datelike, TimeDelta, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

/// Symbols an operator can read aloud without confusion: no `0`, `1`, `I` or `O`.
pub const ACCESS_CODE_ALPHABET: &[u8; 32] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
pub const ACCESS_CODE_LENGTH: usize = 6;
pub const PIN_LENGTH: usize = 6;
/// Earliest year a Postgres `timestamptz` can hold (4713 BC, astronomical numbering).
/// The upper bound (294276 AD) is beyond what chrono represents.
const MIN_STORABLE_YEAR: i32 = -4712;

/// Six independent draws from [`ACCESS_CODE_ALPHABET`], in draw order.
pub fn generate_access_code<G: Rng>(rng: &mut G) -> String {
    (0..ACCESS_CODE_LENGTH)
        .map(|_| ACCESS_CODE_ALPHABET[rng.random_range(0..ACCESS_CODE_ALPHABET.len())] as char)
        .collect()
}

/// Six independent decimal digits, in draw order.
pub fn generate_pin<G: Rng>(rng: &mut G) -> String {
    (0..PIN_LENGTH).map(|_| char::from(b'0' + rng.random_range(0..10u8))).collect()
}

/// `created_at + days`, where zero or negative day counts yield an already-expired instant.
/// Instants the database cannot store are rejected as out of range.
pub fn expiration_after(created_at: DateTime<Utc>, expiration_days: i64) -> Result<DateTime<Utc>, AppError> {
    TimeDelta::try_days(expiration_days)
        .and_then(|delta| created_at.checked_add_signed(delta))
        .filter(|expiration| expiration.year() >= MIN_STORABLE_YEAR)
        .ok_or_else(|| AppError::BadRequest(format!("Expiration of {} days is out of range", expiration_days)))
}

/// Issues access code + PIN pairs that let applicants join one interview.
///
/// The random source and the clock are injected. Each call performs one tenant
/// check, then inserts a single row; a collision on the globally unique
/// `(access_code, pin)` pair regenerates both values, bounded by `max_attempts`.
pub struct AccessGrantIssuer<'a, R, G, C = SystemClock> {
    repository: &'a R,
    rng: G,
    clock: C,
    max_attempts: u32,
}

impl<'a, R> AccessGrantIssuer<'a, R, StdRng, SystemClock>
where
    R: InterviewRepository + SessionAccessRepository,
{
    pub fn from_config(repository: &'a R, config: &AccessGrantConfig) -> Self {
        Self::new(repository, StdRng::from_os_rng(), SystemClock, config.max_issue_attempts)
    }
}

impl<'a, R, G, C> AccessGrantIssuer<'a, R, G, C>
where
    R: InterviewRepository + SessionAccessRepository,
    G: Rng,
    C: Clock,
{
    pub fn new(repository: &'a R, rng: G, clock: C, max_attempts: u32) -> Self {
        Self {
            repository,
            rng,
            clock,
            max_attempts: max_attempts.max(1),
        }
    }

    pub async fn issue_grant(&mut self, interview_id: &Uuid, account_id: &Uuid, expiration_days: i64) -> Result<SessionAccess, AppError> {
        // Unknown and foreign interviews look the same to the caller.
        if self.repository.get_interview_by_id(interview_id, account_id).await?.is_none() {
            tracing::warn!(%interview_id, %account_id, "refusing access grant for interview outside the account");
            return Err(AppError::NotFound("Interview not found".to_string()));
        }

        let created_at = self.clock.now();
        let expiration = expiration_after(created_at, expiration_days)?;

        for attempt in 1..=self.max_attempts {
            let new_grant = NewSessionAccess {
                interview_id: *interview_id,
                account_id: *account_id,
                access_code: generate_access_code(&mut self.rng),
                pin: generate_pin(&mut self.rng),
                expiration,
                created_at,
            };

            match self.repository.create_session_access(&new_grant).await {
                Ok(grant) => {
                    tracing::info!(
                        grant_id = %grant.id,
                        %interview_id,
                        %account_id,
                        expiration = %grant.expiration,
                        attempt,
                        "access grant issued"
                    );
                    return Ok(grant);
                }
                Err(AppError::Conflict(_)) => {
                    tracing::warn!(%interview_id, attempt, "access code collision, regenerating");
                }
                Err(e) => return Err(e),
            }
        }

        tracing::error!(%interview_id, attempts = self.max_attempts, "could not allocate a unique access code");
        Err(AppError::Conflict("Could not allocate a unique access code".to_string()))
    }
}
