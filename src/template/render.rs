use tracing::debug;

use super::interpolate::interpolate;
use super::{Event, Format, TemplateSet, TemplateStore};
use crate::context::Context;
use crate::error::TemplateError;

/// Fragment key whose resolved value becomes the subject line.
pub const SUBJECT_KEY: &str = "model_subject";

/// Subject plus both alternative bodies of one notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMail {
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// One format's body together with every fragment value as resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedBody {
    pub body: String,
    pub resolved: Vec<(String, String)>,
}

impl RenderedBody {
    pub fn value(&self, key: &str) -> Option<&str> {
        self.resolved
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }
}

/// Render `event` in both formats.
///
/// The subject comes from the text pass so list-valued subjects never carry
/// markup.
pub fn render(
    store: &TemplateStore,
    event: Event,
    context: &Context,
) -> Result<RenderedMail, TemplateError> {
    let text = render_format(store, event, Format::Text, context)?;
    let html = render_format(store, event, Format::Html, context)?;

    let subject = text
        .value(SUBJECT_KEY)
        .ok_or_else(|| TemplateError::Render(format!("{event} templates define no {SUBJECT_KEY}")))?
        .to_string();

    Ok(RenderedMail {
        subject,
        text: text.body,
        html: html.body,
    })
}

fn render_format(
    store: &TemplateStore,
    event: Event,
    format: Format,
    context: &Context,
) -> Result<RenderedBody, TemplateError> {
    let set = store.load(event, format)?;
    let basic = store.basic(format)?;
    render_set(&set, &basic, format, context)
}

/// Two-pass substitution of a merged set into a base body.
///
/// Each value is first interpolated against `context`; the key's literal text
/// is then replaced by the result everywhere in `basic`, in set order.
pub fn render_set(
    set: &TemplateSet,
    basic: &str,
    format: Format,
    context: &Context,
) -> Result<RenderedBody, TemplateError> {
    let mut body = basic.to_string();
    let mut resolved = Vec::with_capacity(set.len());

    for (key, value) in set.iter() {
        let value = interpolate(&value.joined(format), context)
            .map_err(|err| TemplateError::Render(format!("{key} ({format}): {err}")))?;
        if body.contains(key) {
            body = body.replace(key, &value);
        } else {
            debug!(key, %format, "template key has no token in the base body");
        }
        resolved.push((key.to_string(), value));
    }

    Ok(RenderedBody { body, resolved })
}
