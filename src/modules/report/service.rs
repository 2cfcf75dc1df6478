use std::fmt::Write;
use std::sync::Arc;

use crate::api::error;
use crate::modules::{
    file_upload::{repository::FileRepository, schema::FileEntity},
    jobs::model::JobOutcome,
    report::mailer::Mailer,
};

pub const REPORT_SUBJECT: &str = "File Upload Report";
pub const REPORT_HEADER: &str = "Uploaded Files:\n\n";

/// Plain-text listing of every upload, one block per record in the given order.
/// Metadata is rendered as its JSON object, or `None` before extraction ran.
pub fn build_report(files: &[FileEntity]) -> Result<String, error::SystemError> {
    let mut report = String::from(REPORT_HEADER);
    for file in files {
        let _ = writeln!(report, "File: {}", file.file);
        let _ = writeln!(report, "Uploaded at: {}", file.uploaded_at);
        match file.metadata() {
            Some(metadata) => {
                let _ = writeln!(report, "Metadata: {}", serde_json::to_string(metadata)?);
            }
            None => report.push_str("Metadata: None\n"),
        }
        report.push('\n');
    }
    Ok(report)
}

/// Periodic job mailing the upload report to the configured address.
#[derive(Clone)]
pub struct ReportService {
    repo: Arc<dyn FileRepository + Send + Sync>,
    mailer: Arc<dyn Mailer + Send + Sync>,
    address: String,
}

impl ReportService {
    /// `address` is both sender and sole recipient.
    pub fn new(
        repo: Arc<dyn FileRepository + Send + Sync>,
        mailer: Arc<dyn Mailer + Send + Sync>,
        address: impl Into<String>,
    ) -> Self {
        Self { repo, mailer, address: address.into() }
    }

    pub async fn send_file_report(&self) -> JobOutcome {
        log::info!("Uploader: Starting to send file report");

        let files = match self.repo.list_all().await {
            Ok(files) => files,
            Err(e) => {
                log::error!("Uploader: Error sending file report: {}", e);
                return JobOutcome::IoFailure(e.to_string());
            }
        };

        let report = match build_report(&files) {
            Ok(report) => report,
            Err(e) => {
                log::error!("Uploader: Error sending file report: {}", e);
                return JobOutcome::IoFailure(e.to_string());
            }
        };
        log::info!("Uploader: Sending file report: {} \n {}", self.address, report);

        let recipients = [self.address.clone()];
        match self.mailer.send(REPORT_SUBJECT, &report, &self.address, &recipients).await {
            Ok(()) => {
                log::info!(
                    "Uploader: Successfully sent file report: {} ({} files)",
                    self.address,
                    files.len()
                );
                JobOutcome::Completed
            }
            Err(e) if e.is_mail_failure() => {
                log::error!("Uploader: Error sending file report: {}", e);
                JobOutcome::TransportFailure(e.to_string())
            }
            Err(e) => {
                log::error!("Uploader: Error sending file report: {}", e);
                JobOutcome::IoFailure(e.to_string())
            }
        }
    }
}
