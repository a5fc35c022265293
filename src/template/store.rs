use std::borrow::Cow;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{Event, Format, FragmentValue, TemplateSet};
use crate::error::TemplateError;

const COMMON: &str = "common";

const EMBEDDED: &[(&str, &str)] = &[
    ("common.json", include_str!("../../templates/common.json")),
    ("start.json", include_str!("../../templates/start.json")),
    ("completed.json", include_str!("../../templates/completed.json")),
    (
        "interruption.json",
        include_str!("../../templates/interruption.json"),
    ),
    ("report.json", include_str!("../../templates/report.json")),
    ("text.json", include_str!("../../templates/text.json")),
    ("html.json", include_str!("../../templates/html.json")),
    ("basic.txt", include_str!("../../templates/basic.txt")),
    ("basic.html", include_str!("../../templates/basic.html")),
];

/// Locates template fragments, either embedded in the binary or in an
/// override directory that shadows the embedded copies file by file.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    dir: Option<PathBuf>,
    embedded: bool,
}

impl Default for TemplateStore {
    fn default() -> Self {
        Self::embedded()
    }
}

impl TemplateStore {
    /// Fragments compiled into the binary.
    pub fn embedded() -> Self {
        Self {
            dir: None,
            embedded: true,
        }
    }

    /// Fragments read from `dir`, falling back to the embedded copies.
    pub fn with_override_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
            embedded: true,
        }
    }

    /// Fragments read from `dir` only; a missing file is a missing fragment.
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
            embedded: false,
        }
    }

    pub fn override_dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Load and merge the `common`, event and format fragments.
    pub fn load(&self, event: Event, format: Format) -> Result<TemplateSet, TemplateError> {
        let mut set = self.fragment(COMMON)?;
        set.merge(self.fragment(event.as_ref())?);
        set.merge(self.fragment(format.as_ref())?);
        debug!(%event, %format, keys = set.len(), "loaded template set");
        Ok(set)
    }

    /// Base body for a format, into which fragment keys are substituted.
    pub fn basic(&self, format: Format) -> Result<String, TemplateError> {
        self.read(format.basic_file()).map(Cow::into_owned)
    }

    fn fragment(&self, name: &str) -> Result<TemplateSet, TemplateError> {
        let file = format!("{name}.json");
        let raw = self.read(&file)?;
        parse_fragment(&file, &raw)
    }

    fn read(&self, file: &str) -> Result<Cow<'static, str>, TemplateError> {
        if let Some(dir) = &self.dir {
            let path = dir.join(file);
            match fs::read_to_string(&path) {
                Ok(contents) => return Ok(Cow::Owned(contents)),
                Err(err) if err.kind() == ErrorKind::NotFound => {}
                Err(err) => {
                    return Err(TemplateError::Malformed {
                        fragment: path.display().to_string(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        if self.embedded {
            if let Some((_, contents)) = EMBEDDED.iter().find(|(name, _)| *name == file) {
                return Ok(Cow::Borrowed(*contents));
            }
        }

        Err(TemplateError::missing(file))
    }
}

fn parse_fragment(file: &str, raw: &str) -> Result<TemplateSet, TemplateError> {
    let malformed = |reason: String| TemplateError::Malformed {
        fragment: file.to_string(),
        reason,
    };

    let object: serde_json::Map<String, serde_json::Value> =
        serde_json::from_str(raw).map_err(|err| malformed(err.to_string()))?;

    object
        .into_iter()
        .map(|(key, value)| {
            serde_json::from_value::<FragmentValue>(value)
                .map(|value| (key.clone(), value))
                .map_err(|_| {
                    malformed(format!(
                        "value of {key:?} must be a string or a list of strings"
                    ))
                })
        })
        .collect()
}
