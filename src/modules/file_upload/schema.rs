use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use uuid::Uuid;

/// Attributes computed by the metadata job once the file is on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub name: String,
    pub size: i64,
    pub mime_type: String,
    pub extension: String,
}

/// Uploaded file row. `metadata` stays `None` until extraction has run.
#[derive(Debug, Clone, FromRow)]
pub struct FileEntity {
    pub id: Uuid,
    pub file: String,
    pub uploaded_at: chrono::DateTime<chrono::Utc>,
    pub metadata: Option<Json<FileMetadata>>,
}

impl FileEntity {
    pub fn metadata(&self) -> Option<&FileMetadata> {
        self.metadata.as_ref().map(|m| &m.0)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FileResponse {
    pub id: Uuid,
    pub file: String,
    pub uploaded_at: chrono::DateTime<chrono::Utc>,
    pub metadata: Option<FileMetadata>,
}

impl From<FileEntity> for FileResponse {
    fn from(entity: FileEntity) -> Self {
        FileResponse {
            id: entity.id,
            file: entity.file,
            uploaded_at: entity.uploaded_at,
            metadata: entity.metadata.map(|m| m.0),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReprocessResponse {
    pub file_id: Uuid,
}
