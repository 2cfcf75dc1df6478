use std::path::PathBuf;

use uuid::Uuid;
use validator::Validate;

/// Row to insert for a freshly stored upload
#[derive(Debug, Clone)]
pub struct NewFile {
    pub id: Uuid,
    pub file: String,
    pub uploaded_at: chrono::DateTime<chrono::Utc>,
}

/// File upload configuration
#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub max_file_size: usize,
    pub upload_dir: PathBuf,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size: 10 * 1024 * 1024, // 10MB
            upload_dir: PathBuf::from("./media/uploads"),
        }
    }
}

/// Submitted upload form. A missing `file` part leaves both fields empty.
#[derive(Debug, Default, Validate)]
pub struct FileUploadForm {
    #[validate(length(min = 1, message = "This field is required."))]
    pub filename: String,
    #[validate(length(min = 1, message = "The submitted file is empty."))]
    pub content: Vec<u8>,
}

impl FileUploadForm {
    pub fn new(filename: impl Into<String>, content: Vec<u8>) -> Self {
        Self { filename: filename.into(), content }
    }

    /// Validation messages in a stable order, reported against the `file` form field.
    pub fn errors(&self) -> Vec<String> {
        let Err(errors) = self.validate() else {
            return Vec::new();
        };

        let field_errors = errors.field_errors();
        // A missing part makes the emptiness check redundant.
        let fields: &[&str] =
            if field_errors.contains_key("filename") { &["filename"] } else { &["content"] };

        let mut messages: Vec<String> = fields
            .iter()
            .filter_map(|field| field_errors.get(*field))
            .flat_map(|errs| errs.iter())
            .map(|e| {
                let msg =
                    e.message.as_ref().map(|m| m.to_string()).unwrap_or_else(|| e.code.to_string());
                format!("file: {msg}")
            })
            .collect();
        messages.sort();
        messages
    }
}
