use tracing::{debug, info};

use super::{OutboundMail, Transport};
use crate::error::DeliveryError;

/// Writes notifications to the log instead of sending them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTransport;

impl Transport for LogTransport {
    fn name(&self) -> &str {
        "log"
    }

    fn send(&self, mail: &OutboundMail) -> Result<(), DeliveryError> {
        info!(
            from = %mail.from,
            to = %mail.to.join(", "),
            subject = %mail.subject,
            "dry run: notification not sent"
        );
        debug!(body = %mail.text, "dry run: text body");
        Ok(())
    }
}
