use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::api::error;

#[async_trait::async_trait]
pub trait Mailer {
    async fn send(
        &self,
        subject: &str,
        body: &str,
        from: &str,
        to: &[String],
    ) -> Result<(), error::SystemError>;
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub use_tls: bool,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 25,
            user: String::new(),
            password: String::new(),
            use_tls: false,
        }
    }
}

/// Plain-text SMTP delivery.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn from_config(config: &MailConfig) -> Result<Self, error::SystemError> {
        let credentials = (!config.user.is_empty())
            .then(|| Credentials::new(config.user.clone(), config.password.clone()));

        let builder = if config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
        };
        let builder = builder.port(config.port);
        let builder = match credentials {
            Some(c) => builder.credentials(c),
            None => builder,
        };

        log::info!(
            "SMTP mailer configured for {}:{} (starttls: {})",
            config.host,
            config.port,
            config.use_tls
        );
        Ok(Self { transport: builder.build() })
    }
}

#[async_trait::async_trait]
impl Mailer for SmtpMailer {
    async fn send(
        &self,
        subject: &str,
        body: &str,
        from: &str,
        to: &[String],
    ) -> Result<(), error::SystemError> {
        let email = build_message(subject, body, from, to)?;
        self.transport.send(email).await?;
        Ok(())
    }
}

/// Parses a configured address, rejecting empty or malformed values.
pub fn parse_mailbox(address: &str) -> Result<Mailbox, error::SystemError> {
    Ok(address.trim().parse()?)
}

fn build_message(
    subject: &str,
    body: &str,
    from: &str,
    to: &[String],
) -> Result<Message, error::SystemError> {
    let from = parse_mailbox(from)?;

    let mut builder = Message::builder().from(from).subject(subject);
    for address in to {
        builder = builder.to(parse_mailbox(address)?);
    }

    let email = builder.header(ContentType::TEXT_PLAIN).body(body.to_string())?;
    Ok(email)
}
