use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

use crate::error::ApiResult;

pub type DatabasePool = PgPool;

/// Create the Postgres connection pool.
pub async fn create_pool(database_url: &str, max_connections: u32) -> ApiResult<DatabasePool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url)
        .await?;

    tracing::info!(max_connections, "database pool created");
    Ok(pool)
}

/// Run pending migrations from the `migrations/` directory.
pub async fn run_migrations(pool: &DatabasePool) -> ApiResult<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("database migrations applied");
    Ok(())
}

/// Lightweight connectivity check used by the health endpoint.
pub async fn ping(pool: &DatabasePool) -> bool {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await
        .is_ok()
}
