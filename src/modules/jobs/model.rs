use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JobKind {
    ExtractMetadata { file_id: Uuid },
    SendReport,
}

impl std::fmt::Display for JobKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobKind::ExtractMetadata { file_id } => write!(f, "extract_metadata({file_id})"),
            JobKind::SendReport => f.write_str("send_report"),
        }
    }
}

/// Unit of work carried on the queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub kind: JobKind,
    /// Zero for the first delivery, incremented on every requeue.
    #[serde(default)]
    pub attempt: u32,
    pub enqueued_at: chrono::DateTime<chrono::Utc>,
}

impl Job {
    pub fn new(kind: JobKind) -> Self {
        Self { id: Uuid::now_v7(), kind, attempt: 0, enqueued_at: chrono::Utc::now() }
    }

    pub fn extract_metadata(file_id: Uuid) -> Self {
        Self::new(JobKind::ExtractMetadata { file_id })
    }

    pub fn send_report() -> Self {
        Self::new(JobKind::SendReport)
    }

    /// Same job, queued again for another attempt.
    pub fn retry(&self) -> Self {
        Self { attempt: self.attempt + 1, enqueued_at: chrono::Utc::now(), ..self.clone() }
    }
}

/// How a job run ended, as reported back to the worker loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Completed,
    RecordNotFound(Uuid),
    IoFailure(String),
    TransportFailure(String),
}

impl JobOutcome {
    /// Failures that may go away on another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, JobOutcome::IoFailure(_) | JobOutcome::TransportFailure(_))
    }
}

impl std::fmt::Display for JobOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobOutcome::Completed => f.write_str("completed"),
            JobOutcome::RecordNotFound(id) => write!(f, "record {id} not found"),
            JobOutcome::IoFailure(msg) => write!(f, "io failure: {msg}"),
            JobOutcome::TransportFailure(msg) => write!(f, "transport failure: {msg}"),
        }
    }
}
