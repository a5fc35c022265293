use anyhow::{Context, Result};
use serde_json::json;
use std::path::Path;

use runbell::clock::{Clock, ManualClock};
use runbell::config::FileConfigSource;
use runbell::context::{ContextBuilder, HostFacts};
use runbell::lifecycle::Interruption;
use runbell::report::{ReportBuffer, ReportRow};
use runbell::template::{self, Event, Format, TemplateStore};

/// Elapsed time shown in previews.
const PREVIEW_ELAPSED_SECS: i64 = 90 * 60;

/// Render `event` with the saved configuration and sample run data.
pub fn preview(config_path: &Path, event: Event, format: Format) -> Result<()> {
    let mut config = FileConfigSource::new(config_path, false).load_saved()?;
    if config.email.trim().is_empty() {
        config.email = "you@example.com".into();
    }
    config.fill_derived_defaults();

    let clock = ManualClock::default();
    let started = clock.now();
    clock.advance_secs(PREVIEW_ELAPSED_SECS);

    let interruption = (event == Event::Interruption)
        .then(|| Interruption::new(Vec::new(), "RuntimeError: example failure"));
    let report = (event == Event::Report).then(sample_report).transpose()?;

    let facts = HostFacts::detect();
    let mut context = ContextBuilder::new(&config, &facts, clock.now()).build(
        started,
        interruption.as_ref(),
        report.as_ref(),
    );
    context.insert("event", event);

    let store = config
        .template_dir
        .clone()
        .map_or_else(TemplateStore::embedded, |dir| TemplateStore::with_override_dir(dir));
    let rendered = template::render(&store, event, &context)
        .with_context(|| format!("Failed to render the {event} notification"))?;

    println!("Subject: {}", rendered.subject);
    println!();
    match format {
        Format::Text => println!("{}", rendered.text),
        Format::Html => println!("{}", rendered.html),
    }
    Ok(())
}

fn sample_report() -> Result<ReportBuffer> {
    let rows: Vec<ReportRow> = serde_json::from_value(json!([
        {"epoch": 1, "loss": 0.92, "accuracy": 0.61},
        {"epoch": 2, "loss": 0.57, "accuracy": 0.78},
        {"epoch": 3, "loss": 0.41, "accuracy": 0.85},
    ]))?;
    let mut buffer = ReportBuffer::new();
    buffer.extend(rows);
    Ok(buffer)
}
