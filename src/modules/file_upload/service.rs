use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::error;
use crate::modules::file_upload::{
    model::{FileUploadForm, NewFile, UploadConfig},
    notifier::UploadNotifier,
    repository::FileRepository,
    schema::FileEntity,
};
use crate::modules::jobs::{model::Job, queue::JobQueue};

#[derive(Clone)]
pub struct FileUploadService {
    file_repo: Arc<dyn FileRepository + Send + Sync>,
    queue: Arc<dyn JobQueue + Send + Sync>,
    notifier: UploadNotifier,
    config: UploadConfig,
}

impl FileUploadService {
    pub fn new(
        file_repo: Arc<dyn FileRepository + Send + Sync>,
        queue: Arc<dyn JobQueue + Send + Sync>,
        config: UploadConfig,
    ) -> Self {
        log::info!("FileUploadService initialized, storing uploads in {}", config.upload_dir.display());
        let notifier = UploadNotifier::new(queue.clone());
        Self { file_repo, queue, notifier, config }
    }

    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    /// Validate the submitted form and the file size
    fn validate_form(&self, form: &FileUploadForm) -> Result<String, error::SystemError> {
        let mut errors = form.errors();
        if !errors.is_empty() {
            return Err(error::SystemError::Validation(errors));
        }

        if form.content.len() > self.config.max_file_size {
            errors.push(format!(
                "file: File size exceeds maximum allowed size of {} bytes.",
                self.config.max_file_size
            ));
            return Err(error::SystemError::Validation(errors));
        }

        // Browsers may send a full client-side path; keep only the last component.
        let filename = Path::new(&form.filename)
            .file_name()
            .and_then(|name| name.to_str())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| {
                error::SystemError::Validation(vec!["file: Invalid file name.".to_string()])
            })?;

        Ok(filename.to_string())
    }

    /// Save file to `<upload_dir>/<file_id>/<filename>`, returning the relative locator
    async fn save_file(
        &self,
        file_id: &Uuid,
        filename: &str,
        bytes: &[u8],
    ) -> Result<String, error::SystemError> {
        let dir = self.config.upload_dir.join(file_id.to_string());
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join(filename), bytes).await?;

        Ok(format!("{}/{}", file_id, filename))
    }

    /// Store the upload, persist the record and enqueue metadata extraction
    pub async fn upload_file(&self, form: FileUploadForm) -> Result<FileEntity, error::SystemError> {
        let filename = self.validate_form(&form)?;

        let file_id = Uuid::now_v7();
        let file = self.save_file(&file_id, &filename, &form.content).await?;

        let new_file = NewFile { id: file_id, file, uploaded_at: chrono::Utc::now() };
        let file_entity = match self.file_repo.create(&new_file).await {
            Ok(entity) => entity,
            Err(e) => {
                let dir = self.config.upload_dir.join(file_id.to_string());
                tokio::fs::remove_dir_all(&dir).await.ok();
                return Err(e);
            }
        };
        log::info!("Stored upload {} as {}", file_entity.id, file_entity.file);

        self.notifier.file_saved(&file_entity.id, true).await?;

        Ok(file_entity)
    }

    /// Get file record by ID
    pub async fn get_file(&self, file_id: &Uuid) -> Result<Option<FileEntity>, error::SystemError> {
        self.file_repo.find_by_id(file_id).await
    }

    pub async fn list_files(&self) -> Result<Vec<FileEntity>, error::SystemError> {
        self.file_repo.list_all().await
    }

    /// Queue a fresh extraction for an existing record
    pub async fn reprocess_file(&self, file_id: &Uuid) -> Result<Uuid, error::SystemError> {
        let file = self
            .file_repo
            .find_by_id(file_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("File not found"))?;

        let job_id = self.queue.enqueue(&Job::extract_metadata(file.id)).await?;
        log::info!("Metadata job {} re-enqueued for file {}", job_id, file.id);
        Ok(job_id)
    }
}
