use anyhow::{Context, Result};
use dialoguer::{Confirm, Input, Password, Select};
use tracing::warn;

use crate::config::{Credential, RunConfig, TimeoutUnit, default_smtp_server};
use crate::ui::style as ui;

use super::domain::{
    is_server_reachable, unit_from_index, unit_index, validate_email, validate_port,
    validate_positive, validate_recipients, validate_smtp_host,
};
use super::view::{print_bullet, print_summary, print_welcome_banner};

/// Prompt for every setting, using the saved values as defaults, then
/// persist everything except the password.
pub fn run_wizard(mut config: RunConfig) -> Result<RunConfig> {
    print_welcome_banner();
    print_bullet(&t!("onboard.hint.defaults"));
    println!();

    config.email = prompt_email(&config.email)?;

    if config.credential.is_empty() {
        let password = Password::new()
            .with_prompt(format!("  {}", t!("onboard.prompt.password")))
            .interact()?;
        config.credential = Credential::new(password);
    } else {
        print_bullet(&t!("onboard.hint.password_from_env"));
    }

    let task_default = if config.task_name.trim().is_empty() {
        "task".to_string()
    } else {
        config.task_name.clone()
    };
    config.task_name = Input::new()
        .with_prompt(format!("  {}", t!("onboard.prompt.task_name")))
        .default(task_default)
        .interact_text()?;

    let recipients_default = if config.recipients.trim().is_empty() {
        config.email.clone()
    } else {
        config.recipients.clone()
    };
    let recipients: String = Input::new()
        .with_prompt(format!("  {}", t!("onboard.prompt.recipients")))
        .default(recipients_default)
        .validate_with(|input: &String| -> Result<(), String> {
            validate_recipients(input).map(|_| ()).map_err(|e| e.to_string())
        })
        .interact_text()?;
    config.recipients = validate_recipients(&recipients)?;

    let previous_unit = config.report_timeout_unit;
    config.report_timeout_unit = prompt_unit(previous_unit)?;
    if config.report_timeout == 0 || config.report_timeout_unit != previous_unit {
        config.report_timeout = config.report_timeout_unit.default_timeout();
    }
    config.report_timeout = prompt_positive(
        &t!(
            "onboard.prompt.report_timeout",
            unit = config.report_timeout_unit.name()
        ),
        config.report_timeout,
    )?;

    let port: String = Input::new()
        .with_prompt(format!("  {}", t!("onboard.prompt.port")))
        .default(config.port.to_string())
        .validate_with(|input: &String| -> Result<(), String> {
            validate_port(input).map(|_| ()).map_err(|e| e.to_string())
        })
        .interact_text()?;
    config.port = validate_port(&port)?;

    config.smtp_server = prompt_smtp_server(&config)?;

    config.send_start = Confirm::new()
        .with_prompt(format!("  {}", t!("onboard.prompt.send_start")))
        .default(config.send_start)
        .interact()?;

    config.fill_derived_defaults();
    config
        .save()
        .with_context(|| format!("Failed to save {}", config.config_path.display()))?;
    println!(
        "  {} {}",
        ui::success("✓"),
        t!(
            "onboard.confirm.saved",
            path = ui::value(config.config_path.display())
        )
    );

    print_summary(&config);
    Ok(config)
}

fn prompt_email(current: &str) -> Result<String> {
    let mut input = Input::<String>::new()
        .with_prompt(format!("  {}", t!("onboard.prompt.email")))
        .validate_with(|input: &String| -> Result<(), String> {
            validate_email(input).map(|_| ()).map_err(|e| e.to_string())
        });
    if !current.trim().is_empty() {
        input = input.default(current.to_string());
    }
    validate_email(&input.interact_text()?)
}

fn prompt_unit(current: TimeoutUnit) -> Result<TimeoutUnit> {
    let options = vec![
        t!("onboard.unit.hours").to_string(),
        t!("onboard.unit.minutes").to_string(),
        t!("onboard.unit.seconds").to_string(),
    ];
    let choice = Select::new()
        .with_prompt(format!("  {}", t!("onboard.prompt.report_timeout_unit")))
        .items(&options)
        .default(unit_index(current))
        .interact()?;
    Ok(unit_from_index(choice))
}

fn prompt_positive(prompt: &str, current: u64) -> Result<u64> {
    let value: String = Input::new()
        .with_prompt(format!("  {prompt}"))
        .default(current.to_string())
        .validate_with(|input: &String| -> Result<(), String> {
            validate_positive("value", input)
                .map(|_| ())
                .map_err(|e| e.to_string())
        })
        .interact_text()?;
    validate_positive("value", &value)
}

fn prompt_smtp_server(config: &RunConfig) -> Result<String> {
    let default = if config.smtp_server.trim().is_empty() {
        default_smtp_server(&config.email).unwrap_or_default()
    } else {
        config.smtp_server.clone()
    };
    let port = config.port;

    let mut input = Input::<String>::new()
        .with_prompt(format!("  {}", t!("onboard.prompt.smtp_server")))
        .validate_with(move |input: &String| -> Result<(), String> {
            let server = validate_smtp_host(input).map_err(|e| e.to_string())?;
            if is_server_reachable(&server, port) {
                Ok(())
            } else {
                warn!(%server, "SMTP server did not resolve");
                Err(t!("onboard.error.unreachable", server = server).to_string())
            }
        });
    if !default.is_empty() {
        input = input.default(default);
    }
    validate_smtp_host(&input.interact_text()?)
}
