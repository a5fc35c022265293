use runbell::config::TimeoutUnit;
use serde_json::json;

use super::notify_harness::{self, row};

fn quiet_config(timeout_secs: u64) -> runbell::RunConfig {
    let mut config = notify_harness::config();
    config.send_start = false;
    config.report_timeout = timeout_secs;
    config.report_timeout_unit = TimeoutUnit::Seconds;
    config
}

#[test]
fn one_report_after_timeout_elapses() {
    let (mut notifier, transport, clock) = notify_harness::notifier(quiet_config(120));

    notifier
        .run(|notifier| {
            notifier.add_report(vec![row(json!({"epoch": 1, "loss": 0.9}))])?;
            assert!(transport.sent().is_empty());

            clock.advance_secs(150);
            notifier.add_report(vec![row(json!({"epoch": 2, "loss": 0.5}))])?;
            assert_eq!(transport.subjects(), vec!["[train] progress report"]);
            Ok(())
        })
        .expect("run should succeed");

    let sent = transport.sent();
    assert_eq!(sent.len(), 2);

    let report = &sent[0];
    assert!(report.text.contains("| epoch"));
    assert!(report.text.contains("|  1 |"));
    assert!(report.html.contains("<table border=\"1\" class=\"dataframe\">"));
    assert!(report.html.contains("<td>0.5</td>"));
}

#[test]
fn report_window_limits_rows_shown() {
    let mut config = quiet_config(10);
    config.report_window = 2;
    let (mut notifier, transport, clock) = notify_harness::notifier(config);

    notifier
        .run(|notifier| {
            for epoch in 0..4 {
                notifier.add_report(vec![row(json!({ "epoch": epoch }))])?;
            }
            clock.advance_secs(11);
            notifier.add_report(vec![row(json!({ "epoch": 4 }))])?;
            Ok(())
        })
        .expect("run should succeed");

    let report = &transport.sent()[0];
    assert!(report.text.contains("|  3 |"));
    assert!(report.text.contains("|  4 |"));
    assert!(!report.text.contains("|  2 |"));
}

#[test]
fn completion_mail_includes_latest_report_rows() {
    let (mut notifier, transport, _clock) = notify_harness::notifier(quiet_config(3600));

    notifier
        .run(|notifier| {
            notifier.add_report(vec![row(json!({"epoch": 1, "accuracy": 0.8}))])?;
            Ok(())
        })
        .expect("run should succeed");

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].text.contains("accuracy"));
}

#[test]
fn rows_outside_running_scope_are_ignored() {
    let (mut notifier, transport, _clock) = notify_harness::notifier(quiet_config(1));

    notifier
        .add_report(vec![row(json!({"early": true}))])
        .expect("ignored before enter");
    assert!(notifier.report_buffer().is_none());

    notifier.run(|_| Ok(())).expect("run should succeed");
    notifier
        .add_report(vec![row(json!({"late": true}))])
        .expect("ignored after exit");

    assert!(notifier.report_buffer().is_none());
    assert_eq!(transport.sent().len(), 1);
}
