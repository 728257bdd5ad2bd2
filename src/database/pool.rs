use crate::config::get_config;
use crate::error::Result;
use sqlx::{postgres::PgPoolOptions, PgPool};

/// Connection pool sized from config. The defaults are modest; this service
/// holds sessions in memory and only touches the database on submit and on
/// catalog fallback lookups.
pub async fn create_pool() -> Result<PgPool> {
    let config = get_config();
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(std::time::Duration::from_secs(
            config.db_acquire_timeout_secs,
        ))
        .connect(&config.database_url)
        .await?;
    Ok(pool)
}
