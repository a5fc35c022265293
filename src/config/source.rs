use anyhow::{Context, Result, bail};
use std::path::PathBuf;
use tracing::info;

use super::schema::{CONFIG_FILE_NAME, RunConfig};

/// Supplies the run configuration to the notifier.
///
/// Implementations may prompt, read files or environment; the notifier only
/// ever sees the finished [`RunConfig`].
pub trait ConfigSource {
    fn load_or_prompt(&self) -> Result<RunConfig>;

    /// Whether notifications are switched off, answered without prompting
    /// or touching credentials.
    fn is_disabled(&self) -> Result<bool> {
        Ok(false)
    }
}

/// A fixed, already-built configuration.
impl ConfigSource for RunConfig {
    fn load_or_prompt(&self) -> Result<RunConfig> {
        Ok(self.clone())
    }

    fn is_disabled(&self) -> Result<bool> {
        Ok(self.disabled)
    }
}

/// The TOML file next to the task, plus `RUNBELL_*` overrides and, when a
/// terminal is attached, the interactive setup wizard.
#[derive(Debug, Clone)]
pub struct FileConfigSource {
    path: PathBuf,
    interactive: bool,
}

impl FileConfigSource {
    pub fn new(path: impl Into<PathBuf>, interactive: bool) -> Self {
        Self {
            path: path.into(),
            interactive,
        }
    }

    /// `.runbell.toml` in the current directory.
    pub fn in_current_dir(interactive: bool) -> Self {
        Self::new(CONFIG_FILE_NAME, interactive)
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// The persisted values with env overrides, without prompting.
    pub fn load_saved(&self) -> Result<RunConfig> {
        let mut config = RunConfig::load_or_default(&self.path)
            .with_context(|| format!("Failed to load {}", self.path.display()))?;
        config.apply_env_overrides();
        Ok(config)
    }
}

impl ConfigSource for FileConfigSource {
    fn load_or_prompt(&self) -> Result<RunConfig> {
        let mut config = self.load_saved()?;

        if config.disabled {
            info!(path = %self.path.display(), "notifications disabled by configuration");
            return Ok(config);
        }
        if self.interactive {
            return crate::onboard::run_wizard(config);
        }

        config.fill_derived_defaults();
        config
            .validate()
            .with_context(|| format!("Incomplete configuration in {}", self.path.display()))?;
        if config.credential.is_empty() {
            bail!(
                "No SMTP password available: set RUNBELL_PASSWORD or run `runbell setup` in a terminal"
            );
        }
        info!(path = %self.path.display(), "loaded run configuration");
        Ok(config)
    }

    fn is_disabled(&self) -> Result<bool> {
        Ok(self.load_saved()?.disabled)
    }
}
