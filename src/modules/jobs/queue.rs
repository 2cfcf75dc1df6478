use std::time::Duration;

use uuid::Uuid;

use crate::{api::error, modules::jobs::model::Job};

#[async_trait::async_trait]
pub trait JobQueue {
    /// Fire-and-forget submission; returns the job id.
    async fn enqueue(&self, job: &Job) -> Result<Uuid, error::SystemError>;

    /// Waits up to `timeout` for the next job.
    async fn dequeue(&self, timeout: Duration) -> Result<Option<Job>, error::SystemError>;
}
