use uuid::Uuid;

use crate::{
    api::error,
    modules::file_upload::{
        model::NewFile,
        schema::{FileEntity, FileMetadata},
    },
};

#[async_trait::async_trait]
pub trait FileRepository {
    async fn create(&self, file: &NewFile) -> Result<FileEntity, error::SystemError>;

    async fn find_by_id(&self, file_id: &Uuid) -> Result<Option<FileEntity>, error::SystemError>;

    /// Overwrites the metadata column. Fails with `NotFound` when the row is gone.
    async fn update_metadata(
        &self,
        file_id: &Uuid,
        metadata: &FileMetadata,
    ) -> Result<(), error::SystemError>;

    /// Every stored upload, oldest first.
    async fn list_all(&self) -> Result<Vec<FileEntity>, error::SystemError>;
}
