//! Email templates: layered fragments, placeholder interpolation and the
//! token-replacing renderer.

mod interpolate;
mod render;
mod store;

pub use interpolate::interpolate;
pub use render::{RenderedBody, RenderedMail, SUBJECT_KEY, render, render_set};
pub use store::TemplateStore;

use serde::Deserialize;
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// A notification occasion, each with its own fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Event {
    Start,
    Completed,
    Interruption,
    Report,
}

/// Output flavour of a rendered body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Format {
    Text,
    Html,
}

impl Format {
    /// File holding the base body that fragment keys are substituted into.
    pub fn basic_file(self) -> &'static str {
        match self {
            Self::Text => "basic.txt",
            Self::Html => "basic.html",
        }
    }

    /// Joiner applied to list-valued fragment entries.
    pub fn line_break(self) -> &'static str {
        match self {
            Self::Text => "\n",
            Self::Html => "<br>",
        }
    }
}

/// A single fragment value: a string or an ordered list of lines.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FragmentValue {
    Text(String),
    Lines(Vec<String>),
}

impl FragmentValue {
    /// Collapse into one string using the format's line break.
    pub fn joined(&self, format: Format) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Lines(lines) => lines.join(format.line_break()),
        }
    }
}

/// Ordered merge of the `common`, event and format fragments.
///
/// Later layers overwrite earlier ones on key collision; an overwritten key
/// keeps the position where it was first inserted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateSet {
    entries: Vec<(String, FragmentValue)>,
}

impl TemplateSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: FragmentValue) {
        let key = key.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Merge another layer on top of this one.
    pub fn merge(&mut self, layer: TemplateSet) {
        for (key, value) in layer.entries {
            self.insert(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&FragmentValue> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FragmentValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, FragmentValue)> for TemplateSet {
    fn from_iter<I: IntoIterator<Item = (K, FragmentValue)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (key, value) in iter {
            set.insert(key, value);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn text(value: &str) -> FragmentValue {
        FragmentValue::Text(value.into())
    }

    #[test]
    fn event_names_round_trip_through_strum() {
        assert_eq!(Event::Interruption.to_string(), "interruption");
        assert_eq!(Event::from_str("report").unwrap(), Event::Report);
        assert!(Event::from_str("finished").is_err());
        assert_eq!(Format::from_str("html").unwrap(), Format::Html);
    }

    #[test]
    fn later_layer_overrides_in_place() {
        let mut set: TemplateSet = [("x", text("a")), ("y", text("keep"))].into_iter().collect();
        set.merge([("z", text("new")), ("x", text("b"))].into_iter().collect());

        assert_eq!(set.get("x"), Some(&text("b")));
        assert_eq!(set.keys().collect::<Vec<_>>(), vec!["x", "y", "z"]);
    }

    #[test]
    fn list_values_join_per_format() {
        let lines = FragmentValue::Lines(vec!["one".into(), "two".into()]);
        assert_eq!(lines.joined(Format::Text), "one\ntwo");
        assert_eq!(lines.joined(Format::Html), "one<br>two");
        assert_eq!(text("solo").joined(Format::Html), "solo");
    }
}
