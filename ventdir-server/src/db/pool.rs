//! Postgres pool shared by every request handler
//!
//! Handlers borrow the pool from `AppState` for the length of one request.
//! A database that is down fails the request after `ACQUIRE_TIMEOUT`
//! instead of holding the client until it gives up.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Connections when `database.max_connections` is not configured.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Longest a handler waits for a free connection.
pub const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Pool at `database_url` with the default connection limit.
///
/// ```ignore
/// let pool = create_pool("postgres://localhost/ventdir").await?;
/// ```
pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    create_pool_with_options(database_url, DEFAULT_MAX_CONNECTIONS).await
}

/// Pool sized from `[database] max_connections`. Connects eagerly so a bad
/// URL fails at startup.
pub async fn create_pool_with_options(
    database_url: &str,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    tracing::debug!(max_connections, "connecting to database");
    pool_options(max_connections).connect(database_url).await
}

fn pool_options(max_connections: u32) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(max_connections.max(1))
        .acquire_timeout(ACQUIRE_TIMEOUT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_follow_config() {
        let options = pool_options(12);
        assert_eq!(options.get_max_connections(), 12);
        assert_eq!(options.get_acquire_timeout(), ACQUIRE_TIMEOUT);
        assert_eq!(pool_options(0).get_max_connections(), 1);
    }

    // Run with: DATABASE_URL=postgres://... cargo test -p ventdir-server -- --ignored

    #[tokio::test]
    #[ignore = "requires database"]
    async fn pool_acquires_connection() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = create_pool(&url).await.expect("pool creation failed");

        let result: (i32,) = sqlx::query_as("SELECT 1")
            .fetch_one(&pool)
            .await
            .expect("query failed");

        assert_eq!(result.0, 1);
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn radius_function_is_installed() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = create_pool(&url).await.expect("pool creation failed");

        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM pg_proc WHERE proname = 'locations_within_radius')",
        )
        .fetch_one(&pool)
        .await
        .expect("query failed");

        assert!(exists);
    }
}
