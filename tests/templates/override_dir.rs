use std::fs;

use runbell::clock::ManualClock;
use runbell::template::{Event, TemplateStore, render};
use runbell::{Notifier, RunConfig};
use tempfile::TempDir;

use runbell::context::{ContextBuilder, HostFacts};

fn host() -> HostFacts {
    HostFacts {
        hostname: "box".into(),
        username: "alice".into(),
        pwd: "/work".into(),
    }
}

#[test]
fn override_dir_shadows_single_files() {
    let dir = TempDir::new().expect("temp dir");
    fs::write(
        dir.path().join("start.json"),
        r#"{"model_subject": "custom start for {task_name}", "model_title": "T", "model_body": "B"}"#,
    )
    .unwrap();

    let mut config = RunConfig::for_sender("bot@example.com");
    config.task_name = "etl".into();
    let facts = host();
    let now = chrono::Local::now();
    let context = ContextBuilder::new(&config, &facts, now).build(now, None, None);

    let store = TemplateStore::with_override_dir(dir.path());
    let mail = render(&store, Event::Start, &context).expect("renders");

    assert_eq!(mail.subject, "custom start for etl");
    assert!(mail.text.contains("Hi alice,"));
}

#[test]
fn notifier_uses_configured_template_dir() {
    let dir = TempDir::new().expect("temp dir");
    fs::write(
        dir.path().join("completed.json"),
        r#"{"model_subject": "{task_name} finished in {elapsed}", "model_title": "done", "model_body": []}"#,
    )
    .unwrap();

    let mut config = RunConfig::for_sender("bot@example.com");
    config.task_name = "etl".into();
    config.send_start = false;
    config.template_dir = Some(dir.path().to_path_buf());

    let outbox = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
    struct Capture(std::sync::Arc<std::sync::Mutex<Vec<String>>>);
    impl runbell::Transport for Capture {
        fn name(&self) -> &str {
            "capture"
        }
        fn send(
            &self,
            mail: &runbell::OutboundMail,
        ) -> Result<(), runbell::error::DeliveryError> {
            self.0.lock().unwrap().push(mail.subject.clone());
            Ok(())
        }
    }

    let mut notifier = Notifier::new(config, Box::new(Capture(outbox.clone())))
        .with_clock(std::sync::Arc::new(ManualClock::default()))
        .with_host_facts(host());
    notifier.run(|_| Ok(())).expect("run succeeds");

    assert_eq!(*outbox.lock().unwrap(), vec!["etl finished in a moment"]);
}
