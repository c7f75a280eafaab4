use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, Pool, Postgres};

use crate::errors::SourceError;

pub type DbPool = Pool<Postgres>;

/// Read-only pool behind [`crate::source::PgRowSource`]. One export issues at
/// most two queries (manual and pressure rows), so a small pool serves many
/// concurrent point ids.
pub async fn connect(database_url: &str) -> Result<DbPool, SourceError> {
    PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url)
        .await
        .map_err(SourceError::Connect)
}
