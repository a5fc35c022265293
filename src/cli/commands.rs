use clap::{Parser, Subcommand};
use runbell::template::{Event, Format};
use std::path::PathBuf;

/// `runbell` - email notifications for long-running tasks.
#[derive(Parser, Debug)]
#[command(name = "runbell")]
#[command(version)]
#[command(about = "Email yourself when a long-running task starts, reports, finishes or fails.", long_about = None)]
pub struct Cli {
    /// Configuration file (default: ./.runbell.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<String>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Answer the setup questions and save the configuration
    Setup,

    /// Run a command and email its lifecycle
    Run {
        /// Task name used in subjects (overrides the configuration)
        #[arg(long)]
        task_name: Option<String>,

        /// Stdout lines starting with this prefix carry JSON report rows
        #[arg(long, default_value = "@report ")]
        report_prefix: String,

        /// Log notifications instead of sending them
        #[arg(long)]
        dry_run: bool,

        /// The command to run, after `--`
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// Render a notification with the saved configuration and print it
    Preview {
        #[arg(value_parser = clap::value_parser!(Event))]
        event: Event,

        #[arg(long, default_value = "text", value_parser = clap::value_parser!(Format))]
        format: Format,
    },
}

impl Cli {
    /// `--config`, tilde-expanded, or the default file in the current directory.
    pub fn config_path(&self) -> PathBuf {
        self.config.as_deref().map_or_else(
            || PathBuf::from(runbell::config::CONFIG_FILE_NAME),
            |raw| PathBuf::from(shellexpand::tilde(raw).as_ref()),
        )
    }
}
