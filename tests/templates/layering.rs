use std::fs;

use runbell::context::Context;
use runbell::error::TemplateError;
use runbell::template::{Event, Format, FragmentValue, TemplateStore, render_set};
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, contents: &str) {
    fs::write(dir.path().join(name), contents).expect("fragment should be written");
}

fn store_with(files: &[(&str, &str)]) -> (TempDir, TemplateStore) {
    let dir = TempDir::new().expect("temp dir");
    for (name, contents) in files {
        write(&dir, name, contents);
    }
    let store = TemplateStore::from_dir(dir.path());
    (dir, store)
}

#[test]
fn event_layer_overrides_common_in_place() {
    let (_dir, store) = store_with(&[
        ("common.json", r#"{"x": "a", "y": "keep"}"#),
        ("report.json", r#"{"x": "b"}"#),
        ("text.json", "{}"),
    ]);

    let set = store.load(Event::Report, Format::Text).expect("set loads");

    assert_eq!(set.get("x"), Some(&FragmentValue::Text("b".into())));
    assert_eq!(set.keys().collect::<Vec<_>>(), vec!["x", "y"]);
}

#[test]
fn format_layer_wins_over_event_layer() {
    let (_dir, store) = store_with(&[
        ("common.json", "{}"),
        ("start.json", r#"{"model_trace": "event"}"#),
        ("html.json", r#"{"model_trace": "format"}"#),
    ]);

    let set = store.load(Event::Start, Format::Html).expect("set loads");

    assert_eq!(
        set.get("model_trace"),
        Some(&FragmentValue::Text("format".into()))
    );
}

#[test]
fn lists_join_per_format() {
    let (_dir, store) = store_with(&[
        ("common.json", r#"{"model_body": ["line one {username}", "line two"]}"#),
        ("completed.json", "{}"),
        ("text.json", "{}"),
        ("html.json", "{}"),
    ]);
    let mut context = Context::new();
    context.insert("username", "alice");

    let text = render_set(
        &store.load(Event::Completed, Format::Text).unwrap(),
        "[model_body]",
        Format::Text,
        &context,
    )
    .unwrap();
    let html = render_set(
        &store.load(Event::Completed, Format::Html).unwrap(),
        "[model_body]",
        Format::Html,
        &context,
    )
    .unwrap();

    assert_eq!(text.body, "[line one alice\nline two]");
    assert_eq!(html.body, "[line one alice<br>line two]");
}

#[test]
fn missing_event_fragment_is_reported() {
    let (_dir, store) = store_with(&[("common.json", "{}")]);

    let err = store
        .load(Event::Interruption, Format::Text)
        .expect_err("interruption.json is absent");

    assert!(matches!(err, TemplateError::Missing { .. }));
}

#[test]
fn undefined_placeholder_fails_render() {
    let (_dir, store) = store_with(&[
        ("common.json", r#"{"model_greeting": "Hello {nobody}"}"#),
        ("start.json", "{}"),
        ("text.json", "{}"),
    ]);

    let err = render_set(
        &store.load(Event::Start, Format::Text).unwrap(),
        "model_greeting",
        Format::Text,
        &Context::new(),
    )
    .expect_err("nobody is undefined");

    assert!(matches!(err, TemplateError::Render(_)));
    assert!(err.to_string().contains("nobody"));
}
