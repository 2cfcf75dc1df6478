//! In-memory stand-ins for the repository, queue and mailer used across unit tests.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use sqlx::types::Json;
use uuid::Uuid;

use crate::api::error;
use crate::modules::{
    file_upload::{
        model::NewFile,
        repository::FileRepository,
        schema::{FileEntity, FileMetadata},
    },
    jobs::{model::Job, queue::JobQueue},
    report::mailer::Mailer,
};

/// A loopback port with nothing listening on it.
pub fn closed_local_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

#[derive(Default)]
pub struct InMemoryFileRepository {
    files: Mutex<Vec<FileEntity>>,
    fail_writes: bool,
    fail_reads: bool,
}

impl InMemoryFileRepository {
    pub fn with_files(files: Vec<FileEntity>) -> Self {
        Self { files: Mutex::new(files), ..Default::default() }
    }

    /// Every `create` fails with a database error.
    pub fn failing() -> Self {
        Self { fail_writes: true, ..Default::default() }
    }

    /// Every `list_all` fails with a database error.
    pub fn failing_reads() -> Self {
        Self { fail_reads: true, ..Default::default() }
    }

    /// Writes `content` under `<upload_dir>/<id>/<name>` and inserts the matching row.
    pub async fn insert_stored(&self, upload_dir: &Path, name: &str, content: &[u8]) -> FileEntity {
        let id = Uuid::now_v7();
        let dir = upload_dir.join(id.to_string());
        tokio::fs::create_dir_all(&dir).await.unwrap();
        tokio::fs::write(dir.join(name), content).await.unwrap();

        let new_file = NewFile { id, file: format!("{id}/{name}"), uploaded_at: chrono::Utc::now() };
        self.create(&new_file).await.unwrap()
    }

    pub fn metadata_of(&self, id: &Uuid) -> Option<FileMetadata> {
        let files = self.files.lock().unwrap();
        files.iter().find(|f| f.id == *id).and_then(|f| f.metadata().cloned())
    }
}

#[async_trait::async_trait]
impl FileRepository for InMemoryFileRepository {
    async fn create(&self, file: &NewFile) -> Result<FileEntity, error::SystemError> {
        if self.fail_writes {
            return Err(error::SystemError::DatabaseError("insert rejected".into()));
        }
        let entity = FileEntity {
            id: file.id,
            file: file.file.clone(),
            uploaded_at: file.uploaded_at,
            metadata: None,
        };
        self.files.lock().unwrap().push(entity.clone());
        Ok(entity)
    }

    async fn find_by_id(&self, file_id: &Uuid) -> Result<Option<FileEntity>, error::SystemError> {
        let files = self.files.lock().unwrap();
        Ok(files.iter().find(|f| f.id == *file_id).cloned())
    }

    async fn update_metadata(
        &self,
        file_id: &Uuid,
        metadata: &FileMetadata,
    ) -> Result<(), error::SystemError> {
        let mut files = self.files.lock().unwrap();
        let file = files
            .iter_mut()
            .find(|f| f.id == *file_id)
            .ok_or_else(|| error::SystemError::not_found("File not found"))?;
        file.metadata = Some(Json(metadata.clone()));
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<FileEntity>, error::SystemError> {
        if self.fail_reads {
            return Err(error::SystemError::DatabaseError("connection reset".into()));
        }
        Ok(self.files.lock().unwrap().clone())
    }
}

#[derive(Default)]
pub struct RecordingQueue {
    jobs: Mutex<VecDeque<Job>>,
    fail_enqueue: bool,
}

impl RecordingQueue {
    pub fn failing() -> Self {
        Self { jobs: Mutex::new(VecDeque::new()), fail_enqueue: true }
    }

    pub fn push(&self, job: Job) {
        self.jobs.lock().unwrap().push_back(job);
    }

    /// Jobs still waiting, oldest first.
    pub fn jobs(&self) -> Vec<Job> {
        self.jobs.lock().unwrap().iter().cloned().collect()
    }
}

#[async_trait::async_trait]
impl JobQueue for RecordingQueue {
    async fn enqueue(&self, job: &Job) -> Result<Uuid, error::SystemError> {
        if self.fail_enqueue {
            let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "queue down");
            return Err(error::SystemError::Io(io));
        }
        self.push(job.clone());
        Ok(job.id)
    }

    async fn dequeue(&self, timeout: Duration) -> Result<Option<Job>, error::SystemError> {
        let next = self.jobs.lock().unwrap().pop_front();
        if next.is_none() {
            tokio::time::sleep(timeout).await;
        }
        Ok(next)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SentMail {
    pub subject: String,
    pub body: String,
    pub from: String,
    pub to: Vec<String>,
}

#[derive(Default, Clone, Copy, PartialEq)]
enum MailerFailure {
    #[default]
    None,
    Address,
    Io,
}

#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<SentMail>>,
    failure: MailerFailure,
}

impl RecordingMailer {
    /// Rejects every message with a mail address error.
    pub fn failing() -> Self {
        Self { failure: MailerFailure::Address, ..Default::default() }
    }

    /// Fails with an error outside the mail layer.
    pub fn broken() -> Self {
        Self { failure: MailerFailure::Io, ..Default::default() }
    }

    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Mailer for RecordingMailer {
    async fn send(
        &self,
        subject: &str,
        body: &str,
        from: &str,
        to: &[String],
    ) -> Result<(), error::SystemError> {
        match self.failure {
            MailerFailure::None => {}
            MailerFailure::Address => {
                let err = "unreachable relay".parse::<lettre::Address>().unwrap_err();
                return Err(error::SystemError::MailAddress(err));
            }
            MailerFailure::Io => {
                let io = std::io::Error::other("spool unavailable");
                return Err(error::SystemError::Io(io));
            }
        }
        self.sent.lock().unwrap().push(SentMail {
            subject: subject.to_string(),
            body: body.to_string(),
            from: from.to_string(),
            to: to.to_vec(),
        });
        Ok(())
    }
}
