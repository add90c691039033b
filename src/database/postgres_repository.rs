use sqlx::PgPool;

/// Persistence collaborator backed by Postgres. Each entity module adds a
/// repository trait implementation on top of this pool handle.
#[derive(Clone)]
pub struct PostgresRepository {
    pub pool: PgPool,
}
