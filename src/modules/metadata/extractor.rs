use std::path::{Path, PathBuf};
use std::sync::Arc;

use uuid::Uuid;

use crate::modules::{
    file_upload::{repository::FileRepository, schema::FileMetadata},
    jobs::model::JobOutcome,
    metadata::classifier::MimeClassifier,
};

/// Worker-side job that fills in `metadata` for a stored upload.
#[derive(Clone)]
pub struct MetadataExtractor {
    repo: Arc<dyn FileRepository + Send + Sync>,
    classifier: Arc<dyn MimeClassifier + Send + Sync>,
    upload_dir: PathBuf,
}

impl MetadataExtractor {
    pub fn new(
        repo: Arc<dyn FileRepository + Send + Sync>,
        classifier: Arc<dyn MimeClassifier + Send + Sync>,
        upload_dir: impl Into<PathBuf>,
    ) -> Self {
        Self { repo, classifier, upload_dir: upload_dir.into() }
    }

    pub async fn process_file_metadata(&self, file_id: Uuid) -> JobOutcome {
        log::info!("Uploader: Starting to process metadata for file with id: {}", file_id);

        let file = match self.repo.find_by_id(&file_id).await {
            Ok(Some(file)) => file,
            Ok(None) => {
                log::error!("Uploader: File with id {} does not exist", file_id);
                return JobOutcome::RecordNotFound(file_id);
            }
            Err(e) => {
                log::error!("Uploader: Error processing metadata for file {}: {}", file_id, e);
                return JobOutcome::IoFailure(e.to_string());
            }
        };

        let file_path = self.upload_dir.join(&file.file);
        log::debug!("Processing file: {}", file_path.display());

        let metadata = match self.describe(&file_path).await {
            Ok(metadata) => metadata,
            Err(e) => {
                log::error!("Uploader: Error processing metadata for file {}: {}", file_id, e);
                return JobOutcome::IoFailure(e.to_string());
            }
        };

        match self.repo.update_metadata(&file_id, &metadata).await {
            Ok(()) => {
                log::info!(
                    "Uploader: Successfully processed metadata for file: {}",
                    file_path.display()
                );
                JobOutcome::Completed
            }
            // Deleted between lookup and write.
            Err(crate::api::error::SystemError::NotFound(_)) => {
                log::error!("Uploader: File with id {} does not exist", file_id);
                JobOutcome::RecordNotFound(file_id)
            }
            Err(e) => {
                log::error!("Uploader: Error processing metadata for file {}: {}", file_id, e);
                JobOutcome::IoFailure(e.to_string())
            }
        }
    }

    /// Name, size, sniffed MIME type and extension of a file on disk.
    pub async fn describe(&self, path: &Path) -> std::io::Result<FileMetadata> {
        let size = tokio::fs::metadata(path).await?.len();
        let mime_type = self.classifier.classify(path).await?;

        Ok(FileMetadata {
            name: file_name(path),
            size: i64::try_from(size).unwrap_or(i64::MAX),
            mime_type,
            extension: extension(path),
        })
    }
}

fn file_name(path: &Path) -> String {
    path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
}

/// Suffix with its leading dot; empty for dot-files and extension-less names.
fn extension(path: &Path) -> String {
    path.extension().map(|ext| format!(".{}", ext.to_string_lossy())).unwrap_or_default()
}
