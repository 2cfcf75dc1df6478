pub mod mailer;
pub mod service;

pub use mailer::{MailConfig, SmtpMailer};
pub use service::ReportService;
