use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::modules::jobs::{model::Job, queue::JobQueue};

/// Enqueues the report job on a fixed interval.
pub struct ReportScheduler {
    queue: Arc<dyn JobQueue + Send + Sync>,
    interval: Duration,
}

impl ReportScheduler {
    pub fn new(queue: Arc<dyn JobQueue + Send + Sync>, interval: Duration) -> Self {
        Self { queue, interval }
    }

    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(interval_secs = self.interval.as_secs(), "Report scheduler started");

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick fires immediately; the first report is due one interval from now.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = shutdown.changed() => break,
                _ = ticker.tick() => self.trigger().await,
            }
        }
        tracing::info!("Report scheduler stopped");
    }

    /// Enqueues one report job. Failures are logged and the schedule carries on.
    pub async fn trigger(&self) {
        match self.queue.enqueue(&Job::send_report()).await {
            Ok(job_id) => tracing::info!(%job_id, "Report job enqueued"),
            Err(e) => tracing::error!(error = %e, "Failed to enqueue report job"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::jobs::model::JobKind;
    use crate::test::RecordingQueue;

    #[tokio::test]
    async fn trigger_enqueues_a_report_job() {
        let queue = Arc::new(RecordingQueue::default());
        let scheduler = ReportScheduler::new(queue.clone(), Duration::from_secs(60));

        scheduler.trigger().await;

        let jobs = queue.jobs();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].kind, JobKind::SendReport);
    }

    #[tokio::test]
    async fn enqueue_failure_does_not_stop_the_schedule() {
        let queue = Arc::new(RecordingQueue::failing());
        let scheduler = ReportScheduler::new(queue.clone(), Duration::from_secs(60));

        scheduler.trigger().await;
        assert!(queue.jobs().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn fires_once_per_interval_until_shutdown() {
        let queue = Arc::new(RecordingQueue::default());
        let scheduler = ReportScheduler::new(queue.clone(), Duration::from_secs(60));
        let (tx, rx) = watch::channel(false);
        let running = tokio::spawn(scheduler.run(rx));

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(queue.jobs().is_empty(), "nothing before the first interval");

        tokio::time::sleep(Duration::from_secs(95)).await;
        assert_eq!(queue.jobs().len(), 2);

        tx.send(true).unwrap();
        running.await.unwrap();
    }
}
