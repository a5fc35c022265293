use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use strum::{Display, EnumIter, EnumString};
use zeroize::Zeroizing;

/// Default file name of the persisted run configuration.
pub const CONFIG_FILE_NAME: &str = ".runbell.toml";

/// Unit of the periodic report timeout.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
pub enum TimeoutUnit {
    #[default]
    #[serde(rename = "h")]
    #[strum(serialize = "h")]
    Hours,
    #[serde(rename = "m")]
    #[strum(serialize = "m")]
    Minutes,
    #[serde(rename = "s")]
    #[strum(serialize = "s")]
    Seconds,
}

impl TimeoutUnit {
    pub fn seconds(self) -> u64 {
        match self {
            Self::Hours => 60 * 60,
            Self::Minutes => 60,
            Self::Seconds => 1,
        }
    }

    /// Timeout suggested when the unit is picked without an explicit value.
    pub fn default_timeout(self) -> u64 {
        match self {
            Self::Hours => 24,
            Self::Minutes => 30,
            Self::Seconds => 120,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Hours => "hours",
            Self::Minutes => "minutes",
            Self::Seconds => "seconds",
        }
    }

    /// "1 hour", "30 minutes".
    pub fn describe(self, value: u64) -> String {
        let name = self.name();
        if value == 1 {
            format!("1 {}", name.trim_end_matches('s'))
        } else {
            format!("{value} {name}")
        }
    }
}

/// SMTP password. Wiped on drop, redacted in debug output, never serialized.
#[derive(Clone, Default)]
pub struct Credential(Zeroizing<String>);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(Zeroizing::new(secret.into()))
    }

    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            f.write_str("Credential(<unset>)")
        } else {
            f.write_str("Credential(<redacted>)")
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Path to the config file - not serialized
    #[serde(skip)]
    pub config_path: PathBuf,
    /// Sender address, also the SMTP login.
    #[serde(default)]
    pub email: String,
    /// Supplied by the environment or a prompt, never persisted.
    #[serde(skip)]
    pub credential: Credential,
    /// Comma-separated recipient addresses. Empty means the sender.
    #[serde(default)]
    pub recipients: String,
    #[serde(default)]
    pub task_name: String,
    /// Empty means `smtp.` plus the last two labels of the sender domain.
    #[serde(default)]
    pub smtp_server: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Zero means the unit's default timeout.
    #[serde(default)]
    pub report_timeout: u64,
    #[serde(default)]
    pub report_timeout_unit: TimeoutUnit,
    #[serde(default = "default_true")]
    pub send_start: bool,
    /// Rows shown from the tail of the report buffer.
    #[serde(default = "default_report_window")]
    pub report_window: usize,
    #[serde(default)]
    pub template_dir: Option<PathBuf>,
    /// Never send anything, as if running headless.
    #[serde(default)]
    pub disabled: bool,
}

fn default_port() -> u16 {
    465
}

fn default_true() -> bool {
    true
}

fn default_report_window() -> usize {
    5
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from(CONFIG_FILE_NAME),
            email: String::new(),
            credential: Credential::default(),
            recipients: String::new(),
            task_name: String::new(),
            smtp_server: String::new(),
            port: default_port(),
            report_timeout: 0,
            report_timeout_unit: TimeoutUnit::default(),
            send_start: true,
            report_window: default_report_window(),
            template_dir: None,
            disabled: false,
        }
    }
}

/// `smtp.example.com` for `someone@mail.example.com`.
pub fn default_smtp_server(email: &str) -> Option<String> {
    let (_, domain) = email.rsplit_once('@')?;
    let labels: Vec<&str> = domain.split('.').filter(|l| !l.is_empty()).collect();
    if labels.len() < 2 {
        return None;
    }
    Some(format!("smtp.{}", labels[labels.len() - 2..].join(".")))
}

pub fn split_recipients(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|address| !address.is_empty())
        .map(str::to_string)
        .collect()
}

impl RunConfig {
    /// Defaults derived from the sender address, for callers building a
    /// config in code.
    pub fn for_sender(email: impl Into<String>) -> Self {
        let mut config = Self {
            email: email.into(),
            ..Self::default()
        };
        config.fill_derived_defaults();
        config
    }

    pub fn recipient_list(&self) -> Vec<String> {
        split_recipients(&self.recipients)
    }

    pub fn report_timeout_secs(&self) -> u64 {
        self.report_timeout
            .saturating_mul(self.report_timeout_unit.seconds())
    }

    /// "24 hours", "2 minutes".
    pub fn report_interval(&self) -> String {
        self.report_timeout_unit.describe(self.report_timeout)
    }

    /// Fill fields whose defaults depend on other fields.
    pub fn fill_derived_defaults(&mut self) {
        if self.recipients.trim().is_empty() {
            self.recipients.clone_from(&self.email);
        }
        if self.smtp_server.trim().is_empty() {
            if let Some(server) = default_smtp_server(&self.email) {
                self.smtp_server = server;
            }
        }
        if self.report_timeout == 0 {
            self.report_timeout = self.report_timeout_unit.default_timeout();
        }
        if self.task_name.trim().is_empty() {
            self.task_name = "task".into();
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.email.trim().is_empty() {
            return Err(ConfigError::Validation("email is not set".into()));
        }
        if self.recipient_list().is_empty() {
            return Err(ConfigError::Validation("no recipients configured".into()));
        }
        if self.smtp_server.trim().is_empty() {
            return Err(ConfigError::Validation("smtp_server is not set".into()));
        }
        if self.port == 0 {
            return Err(ConfigError::Validation("port must be positive".into()));
        }
        if self.report_timeout == 0 {
            return Err(ConfigError::Validation(
                "report_timeout must be positive".into(),
            ));
        }
        if self.report_window == 0 {
            return Err(ConfigError::Validation(
                "report_window must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Read `path`, or start from defaults when it does not exist yet.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let contents = fs::read_to_string(path)?;
            toml::from_str::<Self>(&contents)
                .map_err(|e| ConfigError::Load(format!("{}: {e}", path.display())))?
        } else {
            Self::default()
        };
        config.config_path = path.to_path_buf();
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Overrides from `RUNBELL_*` variables, looked up through `lookup`.
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(password) = non_empty("RUNBELL_PASSWORD") {
            self.credential = Credential::new(password);
        }
        if let Some(task_name) = non_empty("RUNBELL_TASK_NAME") {
            self.task_name = task_name;
        }
        if let Some(recipients) = non_empty("RUNBELL_RECIPIENTS") {
            self.recipients = recipients;
        }
        if let Some(server) = non_empty("RUNBELL_SMTP_SERVER") {
            self.smtp_server = server;
        }
        if let Some(port) = non_empty("RUNBELL_PORT").and_then(|p| p.trim().parse::<u16>().ok()) {
            self.port = port;
        }
        if let Some(flag) = non_empty("RUNBELL_DISABLED") {
            self.disabled = is_truthy(&flag);
        }
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let toml_str = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Load(format!("failed to serialize config: {e}")))?;
        if let Some(parent) = self.config_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.config_path, toml_str)?;
        Ok(())
    }
}

pub(crate) fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
