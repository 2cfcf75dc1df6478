use deadpool_redis::Runtime;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::api::error;

pub async fn connect_database(database_url: &str) -> Result<PgPool, error::SystemError> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .min_connections(1)
        .acquire_slow_threshold(std::time::Duration::from_secs(3))
        .connect(database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    log::info!("Database migrations applied");

    Ok(pool)
}

pub fn create_redis_pool(redis_url: &str) -> Result<deadpool_redis::Pool, error::SystemError> {
    let mut cfg = deadpool_redis::Config::from_url(redis_url);
    cfg.pool = Some(deadpool_redis::PoolConfig { max_size: 16, ..Default::default() });
    let pool = cfg.create_pool(Some(Runtime::Tokio1))?;
    Ok(pool)
}
