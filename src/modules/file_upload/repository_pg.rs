use sqlx::types::Json;
use uuid::Uuid;

use crate::{
    api::error,
    modules::file_upload::{
        model::NewFile,
        repository::FileRepository,
        schema::{FileEntity, FileMetadata},
    },
};

#[derive(Clone)]
pub struct FilePgRepository {
    pool: sqlx::PgPool,
}

impl FilePgRepository {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl FileRepository for FilePgRepository {
    async fn create(&self, file: &NewFile) -> Result<FileEntity, error::SystemError> {
        let entity = sqlx::query_as::<_, FileEntity>(
            r#"
            INSERT INTO uploaded_files (id, file, uploaded_at)
            VALUES ($1, $2, $3)
            RETURNING id, file, uploaded_at, metadata
            "#,
        )
        .bind(file.id)
        .bind(&file.file)
        .bind(file.uploaded_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(entity)
    }

    async fn find_by_id(&self, file_id: &Uuid) -> Result<Option<FileEntity>, error::SystemError> {
        let file = sqlx::query_as::<_, FileEntity>(
            r#"
            SELECT id, file, uploaded_at, metadata FROM uploaded_files WHERE id = $1
            "#,
        )
        .bind(file_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(file)
    }

    async fn update_metadata(
        &self,
        file_id: &Uuid,
        metadata: &FileMetadata,
    ) -> Result<(), error::SystemError> {
        let rows = sqlx::query(
            r#"
            UPDATE uploaded_files SET metadata = $2 WHERE id = $1
            "#,
        )
        .bind(file_id)
        .bind(Json(metadata))
        .execute(&self.pool)
        .await?
        .rows_affected();

        if rows == 0 {
            return Err(error::SystemError::not_found("File not found"));
        }
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<FileEntity>, error::SystemError> {
        let files = sqlx::query_as::<_, FileEntity>(
            r#"
            SELECT id, file, uploaded_at, metadata FROM uploaded_files
            ORDER BY uploaded_at, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(files)
    }
}
