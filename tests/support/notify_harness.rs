#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use runbell::clock::ManualClock;
use runbell::context::HostFacts;
use runbell::error::DeliveryError;
use runbell::mail::{OutboundMail, Transport};
use runbell::report::ReportRow;
use runbell::{Notifier, RunConfig};

/// Keeps every message handed to it.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    sent: Arc<Mutex<Vec<OutboundMail>>>,
}

impl RecordingTransport {
    pub fn sent(&self) -> Vec<OutboundMail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn subjects(&self) -> Vec<String> {
        self.sent().into_iter().map(|mail| mail.subject).collect()
    }
}

impl Transport for RecordingTransport {
    fn name(&self) -> &str {
        "recording"
    }

    fn send(&self, mail: &OutboundMail) -> Result<(), DeliveryError> {
        self.sent.lock().unwrap().push(mail.clone());
        Ok(())
    }
}

pub fn config() -> RunConfig {
    let mut config = RunConfig::for_sender("bot@example.com");
    config.task_name = "train".into();
    config.recipients = "ops@example.com, dev@example.com".into();
    config
}

pub fn host() -> HostFacts {
    HostFacts {
        hostname: "gpu-01".into(),
        username: "alice".into(),
        pwd: "/srv/train".into(),
    }
}

pub fn notifier(config: RunConfig) -> (Notifier, RecordingTransport, ManualClock) {
    let transport = RecordingTransport::default();
    let clock = ManualClock::default();
    let notifier = Notifier::new(config, Box::new(transport.clone()))
        .with_clock(Arc::new(clock.clone()))
        .with_host_facts(host());
    (notifier, transport, clock)
}

pub fn row(value: serde_json::Value) -> ReportRow {
    serde_json::from_value(value).expect("report row should be a JSON object")
}
