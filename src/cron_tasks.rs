use crate::Config;
use crate::database::password_reset::PasswordResetRepository;
use crate::database::postgres_repository::PostgresRepository;
use crate::database::session::SessionRepository;
use crate::db::init_pool;

#[derive(Debug, Clone, Copy)]
pub struct PurgeResult {
    pub sessions_deleted: u64,
    pub resets_deleted: u64,
}

/// Removes expired login sessions and spent or expired password reset tokens.
/// Access grants are kept: an expired grant is still evidence of who joined what.
pub async fn purge_expired(config: &Config) -> Result<PurgeResult, String> {
    let pool = init_pool(&config.database)
        .await
        .map_err(|err| format!("Failed to initialize database pool: {err}"))?;

    let repo = PostgresRepository { pool: pool.clone() };
    let sessions_deleted = repo
        .cleanup_expired_sessions()
        .await
        .map_err(|err| format!("Failed to purge expired sessions: {err:?}"))?;
    let resets_deleted = repo
        .cleanup_expired_password_resets()
        .await
        .map_err(|err| format!("Failed to purge password resets: {err:?}"))?;

    pool.close().await;

    Ok(PurgeResult {
        sessions_deleted,
        resets_deleted,
    })
}
