use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport as _};
use tracing::{debug, info};

use super::{OutboundMail, Transport};
use crate::config::{Credential, RunConfig};
use crate::error::DeliveryError;

/// SMTP submission over TLS from the first byte (SMTPS).
///
/// A fresh connection is opened for every message and closed afterwards.
#[derive(Debug, Clone)]
pub struct SmtpMailer {
    server: String,
    port: u16,
    username: String,
    credential: Credential,
}

impl SmtpMailer {
    pub fn new(
        server: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        credential: Credential,
    ) -> Self {
        Self {
            server: server.into(),
            port,
            username: username.into(),
            credential,
        }
    }

    pub fn from_config(config: &RunConfig) -> Self {
        Self::new(
            config.smtp_server.clone(),
            config.port,
            config.email.clone(),
            config.credential.clone(),
        )
    }

    fn endpoint(&self) -> String {
        format!("{}:{}", self.server, self.port)
    }

    fn classify(&self, err: &lettre::transport::smtp::Error) -> DeliveryError {
        let code = err.status().map(|code| code.to_string());
        match code.as_deref() {
            Some(code) if code.starts_with("53") => DeliveryError::Auth {
                user: self.username.clone(),
                message: err.to_string(),
            },
            _ if err.is_permanent() => DeliveryError::Rejected(err.to_string()),
            _ => DeliveryError::Connection {
                server: self.endpoint(),
                message: err.to_string(),
            },
        }
    }
}

fn mailbox(raw: &str) -> Result<Mailbox, DeliveryError> {
    raw.trim()
        .parse::<Mailbox>()
        .map_err(|e| DeliveryError::Address {
            address: raw.to_string(),
            message: e.to_string(),
        })
}

/// `multipart/alternative` with the plain part first and the HTML part last,
/// so clients that understand HTML prefer it.
pub fn build_message(mail: &OutboundMail) -> Result<Message, DeliveryError> {
    if mail.to.is_empty() {
        return Err(DeliveryError::Message("no recipients".into()));
    }

    let mut builder = Message::builder()
        .from(mailbox(&mail.from)?)
        .subject(mail.subject.clone());
    for recipient in &mail.to {
        builder = builder.to(mailbox(recipient)?);
    }

    builder
        .multipart(MultiPart::alternative_plain_html(
            mail.text.clone(),
            mail.html.clone(),
        ))
        .map_err(|e| DeliveryError::Message(e.to_string()))
}

impl Transport for SmtpMailer {
    fn name(&self) -> &str {
        "smtp"
    }

    fn send(&self, mail: &OutboundMail) -> Result<(), DeliveryError> {
        let message = build_message(mail)?;

        debug!(server = %self.endpoint(), "opening SMTPS connection");
        let transport = SmtpTransport::relay(&self.server)
            .map_err(|e| DeliveryError::Connection {
                server: self.endpoint(),
                message: e.to_string(),
            })?
            .port(self.port)
            .credentials(Credentials::new(
                self.username.clone(),
                self.credential.expose().to_string(),
            ))
            .build();

        transport.send(&message).map_err(|e| self.classify(&e))?;
        info!(
            server = %self.endpoint(),
            recipients = mail.to.len(),
            subject = %mail.subject,
            "notification delivered"
        );
        Ok(())
    }
}
