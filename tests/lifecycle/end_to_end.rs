use runbell::{Cancelled, Phase};

use super::notify_harness;

#[test]
fn successful_run_sends_start_then_completed() {
    let (mut notifier, transport, clock) = notify_harness::notifier(notify_harness::config());

    let answer = notifier
        .run(|_| {
            clock.advance_secs(3 * 60 * 60);
            Ok(42)
        })
        .expect("run should succeed");

    assert_eq!(answer, 42);
    assert_eq!(notifier.phase(), Phase::Completed);
    assert_eq!(
        transport.subjects(),
        vec![
            "[train] started on gpu-01".to_string(),
            "[train] completed after 3 hours".to_string(),
        ]
    );

    let completed = &transport.sent()[1];
    assert_eq!(completed.from, "bot@example.com");
    assert_eq!(completed.to, vec!["ops@example.com", "dev@example.com"]);
    assert!(completed.text.contains("Hi alice,"));
    assert!(completed.text.contains("alice@gpu-01"));
    assert!(completed.html.contains("<title>[train] completed after 3 hours</title>"));
    assert!(!completed.text.contains("model_"));
    assert!(!completed.html.contains("model_"));
}

#[test]
fn start_mail_is_sent_before_work_runs() {
    let (mut notifier, transport, _clock) = notify_harness::notifier(notify_harness::config());

    notifier
        .run(|_| {
            assert_eq!(transport.subjects().len(), 1);
            Ok(())
        })
        .expect("run should succeed");
}

#[test]
fn failing_work_sends_interruption_and_returns_fault() {
    let mut config = notify_harness::config();
    config.send_start = false;
    let (mut notifier, transport, _clock) = notify_harness::notifier(config);

    let err = notifier
        .run(|_| -> anyhow::Result<()> { Err(anyhow::anyhow!("boom")) })
        .expect_err("fault should propagate");

    assert_eq!(err.to_string(), "boom");
    assert_eq!(notifier.phase(), Phase::Interrupted);

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].subject.starts_with("[train] interrupted after"));
    assert!(sent[0].text.contains("boom"));
    assert!(sent[0].html.contains("boom"));
}

#[test]
fn wrapped_fault_keeps_its_cause_chain() {
    use anyhow::Context;

    let mut config = notify_harness::config();
    config.send_start = false;
    let (mut notifier, transport, _clock) = notify_harness::notifier(config);

    let err = notifier
        .run(|_| -> anyhow::Result<()> {
            Err(anyhow::anyhow!("disk full")).context("saving checkpoint")
        })
        .expect_err("fault should propagate");

    assert_eq!(format!("{err:#}"), "saving checkpoint: disk full");
    let text = &transport.sent()[0].text;
    assert!(text.contains("saving checkpoint"));
    assert!(text.contains("caused by: disk full"));
}

#[test]
fn cancellation_sends_nothing() {
    let mut config = notify_harness::config();
    config.send_start = false;
    let (mut notifier, transport, _clock) = notify_harness::notifier(config);

    let err = notifier
        .run(|_| -> anyhow::Result<()> { Err(Cancelled.into()) })
        .expect_err("cancellation should propagate");

    assert!(err.is::<Cancelled>());
    assert!(transport.sent().is_empty());
}

#[test]
fn disabled_config_runs_work_without_mail() {
    let mut config = notify_harness::config();
    config.disabled = true;
    let (mut notifier, transport, _clock) = notify_harness::notifier(config);

    let value = notifier
        .run(|notifier| {
            notifier.add_report(vec![notify_harness::row(serde_json::json!({"step": 1}))])?;
            Ok("done")
        })
        .expect("run should succeed");

    assert_eq!(value, "done");
    assert!(!notifier.is_enabled());
    assert!(notifier.report_buffer().is_none());
    assert!(transport.sent().is_empty());
}
