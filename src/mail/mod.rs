//! Outbound mail: the transport seam and its SMTP and dry-run implementations.

mod log;
mod smtp;

pub use log::LogTransport;
pub use smtp::SmtpMailer;

use crate::config::RunConfig;
use crate::error::DeliveryError;
use crate::template::RenderedMail;

/// A finished notification, ready to hand to a [`Transport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub text: String,
    pub html: String,
}

impl OutboundMail {
    pub fn compose(config: &RunConfig, rendered: RenderedMail) -> Self {
        Self {
            from: config.email.clone(),
            to: config.recipient_list(),
            subject: rendered.subject,
            text: rendered.text,
            html: rendered.html,
        }
    }
}

/// Delivers one message per call, blocking until it is accepted or refused.
pub trait Transport: Send {
    fn name(&self) -> &str;

    fn send(&self, mail: &OutboundMail) -> Result<(), DeliveryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compose_splits_recipients() {
        let mut config = RunConfig::for_sender("bot@example.com");
        config.recipients = "a@example.com, b@example.com".into();

        let mail = OutboundMail::compose(
            &config,
            RenderedMail {
                subject: "s".into(),
                text: "t".into(),
                html: "<p>h</p>".into(),
            },
        );

        assert_eq!(mail.from, "bot@example.com");
        assert_eq!(mail.to, vec!["a@example.com", "b@example.com"]);
        assert_eq!(mail.html, "<p>h</p>");
    }
}
