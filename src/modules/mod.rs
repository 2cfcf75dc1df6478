pub mod file_upload;
pub mod jobs;
pub mod metadata;
pub mod report;
