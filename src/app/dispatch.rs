use anyhow::{Result, bail};
use std::io::IsTerminal;
use tracing::info;

use crate::cli::commands::{Cli, Commands};
use runbell::config::{ConfigSource, FileConfigSource};

pub fn dispatch(cli: Cli) -> Result<()> {
    let config_path = cli.config_path();

    match cli.command {
        Commands::Setup => {
            if !std::io::stdin().is_terminal() {
                bail!("`runbell setup` needs an interactive terminal");
            }
            let config = FileConfigSource::new(&config_path, true).load_or_prompt()?;
            info!(path = %config.config_path.display(), "setup complete");
            Ok(())
        }
        Commands::Run {
            task_name,
            report_prefix,
            dry_run,
            command,
        } => super::run::run_command(
            &config_path,
            task_name,
            &report_prefix,
            dry_run,
            &command,
        ),
        Commands::Preview { event, format } => {
            super::preview::preview(&config_path, event, format)
        }
    }
}
