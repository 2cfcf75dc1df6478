use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::modules::{
    jobs::{
        model::{Job, JobKind, JobOutcome},
        queue::JobQueue,
    },
    metadata::extractor::MetadataExtractor,
    report::service::ReportService,
};

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub concurrency: usize,
    /// Extra attempts for retryable failures. Zero disables requeueing.
    pub max_retries: u32,
    pub poll_interval: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self { concurrency: 4, max_retries: 0, poll_interval: Duration::from_secs(1) }
    }
}

/// Pulls jobs off the queue and runs the matching handler.
#[derive(Clone)]
pub struct Worker {
    queue: Arc<dyn JobQueue + Send + Sync>,
    extractor: Arc<MetadataExtractor>,
    reporter: Arc<ReportService>,
    config: WorkerConfig,
}

impl Worker {
    pub fn new(
        queue: Arc<dyn JobQueue + Send + Sync>,
        extractor: Arc<MetadataExtractor>,
        reporter: Arc<ReportService>,
        config: WorkerConfig,
    ) -> Self {
        Self { queue, extractor, reporter, config }
    }

    /// Runs `concurrency` consumers until `shutdown` flips to true.
    pub async fn run(self, shutdown: watch::Receiver<bool>) {
        let consumers = self.config.concurrency.max(1);
        tracing::info!(
            consumers,
            max_retries = self.config.max_retries,
            "Job worker started"
        );

        let handles: Vec<_> = (0..consumers)
            .map(|index| {
                let worker = self.clone();
                let shutdown = shutdown.clone();
                tokio::spawn(async move { worker.consume(index, shutdown).await })
            })
            .collect();

        for handle in handles {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Job consumer panicked");
            }
        }
        tracing::info!("Job worker stopped");
    }

    async fn consume(&self, index: usize, mut shutdown: watch::Receiver<bool>) {
        tracing::debug!(consumer = index, "Job consumer started");
        loop {
            if *shutdown.borrow() {
                break;
            }

            let next = tokio::select! {
                _ = shutdown.changed() => break,
                next = self.queue.dequeue(self.config.poll_interval) => next,
            };

            match next {
                Ok(Some(job)) => {
                    self.handle(job).await;
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::error!(consumer = index, error = %e, "Failed to fetch job");
                    tokio::time::sleep(self.config.poll_interval).await;
                }
            }
        }
        tracing::debug!(consumer = index, "Job consumer stopped");
    }

    /// Runs one job and settles its outcome. Never panics on job failure.
    pub async fn handle(&self, job: Job) -> JobOutcome {
        tracing::info!(job_id = %job.id, kind = %job.kind, attempt = job.attempt, "Job running");

        let outcome = self.execute(&job).await;
        self.settle(&job, &outcome).await;
        outcome
    }

    async fn execute(&self, job: &Job) -> JobOutcome {
        match &job.kind {
            JobKind::ExtractMetadata { file_id } => {
                self.extractor.process_file_metadata(*file_id).await
            }
            JobKind::SendReport => self.reporter.send_file_report().await,
        }
    }

    async fn settle(&self, job: &Job, outcome: &JobOutcome) {
        if *outcome == JobOutcome::Completed {
            tracing::info!(job_id = %job.id, kind = %job.kind, "Job completed");
            return;
        }

        tracing::error!(
            job_id = %job.id,
            kind = %job.kind,
            attempt = job.attempt,
            outcome = %outcome,
            "Job completed with error"
        );

        if !outcome.is_retryable() || job.attempt >= self.config.max_retries {
            return;
        }

        let retry = job.retry();
        match self.queue.enqueue(&retry).await {
            Ok(_) => tracing::warn!(job_id = %job.id, attempt = retry.attempt, "Job requeued"),
            Err(e) => tracing::error!(job_id = %job.id, error = %e, "Failed to requeue job"),
        }
    }
}
