use std::time::Duration;

use deadpool_redis::redis::AsyncCommands;
use uuid::Uuid;

use crate::{
    api::error,
    modules::jobs::{model::Job, queue::JobQueue},
};

/// Job queue on a Redis list: producers `LPUSH`, consumers `RPOP`.
#[derive(Clone)]
pub struct RedisJobQueue {
    pool: deadpool_redis::Pool,
    key: String,
}

impl RedisJobQueue {
    pub fn new(pool: deadpool_redis::Pool, key: impl Into<String>) -> Self {
        Self { pool, key: key.into() }
    }
}

#[async_trait::async_trait]
impl JobQueue for RedisJobQueue {
    async fn enqueue(&self, job: &Job) -> Result<Uuid, error::SystemError> {
        let mut conn = self.pool.get().await?;

        let serialized = serde_json::to_vec(job)?;

        conn.lpush::<_, _, ()>(&self.key, serialized).await?;

        Ok(job.id)
    }

    async fn dequeue(&self, timeout: Duration) -> Result<Option<Job>, error::SystemError> {
        let value: Option<Vec<u8>> = {
            let mut conn = self.pool.get().await?;
            conn.rpop(&self.key, None).await?
        };

        match value {
            Some(v) => {
                let job = serde_json::from_slice(&v)?;
                Ok(Some(job))
            }
            None => {
                // Empty list: hold the caller for one poll interval.
                tokio::time::sleep(timeout).await;
                Ok(None)
            }
        }
    }
}
