use std::sync::Arc;

use uuid::Uuid;

use crate::{
    api::error,
    modules::jobs::{model::Job, queue::JobQueue},
};

/// Hook run right after an upload row is written.
#[derive(Clone)]
pub struct UploadNotifier {
    queue: Arc<dyn JobQueue + Send + Sync>,
}

impl UploadNotifier {
    pub fn new(queue: Arc<dyn JobQueue + Send + Sync>) -> Self {
        Self { queue }
    }

    /// Enqueues metadata extraction only for newly created rows.
    /// Enqueue errors go straight back to the caller.
    pub async fn file_saved(&self, file_id: &Uuid, created: bool) -> Result<(), error::SystemError> {
        if !created {
            return Ok(());
        }

        let job_id = self.queue.enqueue(&Job::extract_metadata(*file_id)).await?;
        log::info!("Metadata job {} enqueued for file {}", job_id, file_id);
        Ok(())
    }
}
