use chrono::{DateTime, Local};
use std::collections::BTreeMap;
use std::fmt::Display;

use crate::config::RunConfig;
use crate::lifecycle::Interruption;
use crate::report::{DEFAULT_REPORT_WINDOW, ReportBuffer, html_table, pipe_table};
use crate::utils::natural_delta;

/// Substitution values available to templates for one notification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    values: BTreeMap<String, String>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Display) {
        self.values.insert(key.into(), value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Facts about the machine and process the task runs in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostFacts {
    pub hostname: String,
    pub username: String,
    pub pwd: String,
}

impl HostFacts {
    pub fn detect() -> Self {
        let hostname = hostname::get()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|_| "localhost".into());
        let username = std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_else(|_| "unknown".into());
        let pwd = std::env::current_dir()
            .map(|dir| dir.display().to_string())
            .unwrap_or_default();
        Self {
            hostname,
            username,
            pwd,
        }
    }
}

/// Assembles a [`Context`] from configuration, host facts and run state.
pub struct ContextBuilder<'a> {
    config: &'a RunConfig,
    facts: &'a HostFacts,
    now: DateTime<Local>,
}

impl<'a> ContextBuilder<'a> {
    pub fn new(config: &'a RunConfig, facts: &'a HostFacts, now: DateTime<Local>) -> Self {
        Self { config, facts, now }
    }

    pub fn build(
        &self,
        run_start: DateTime<Local>,
        interruption: Option<&Interruption>,
        report: Option<&ReportBuffer>,
    ) -> Context {
        let mut context = Context::new();

        context.insert("hostname", &self.facts.hostname);
        context.insert("username", &self.facts.username);
        context.insert("pwd", &self.facts.pwd);

        let elapsed = (self.now - run_start).num_seconds().max(0);
        context.insert("elapsed", natural_delta(elapsed.unsigned_abs()));
        context.insert("now", self.now.date_naive());

        let (interrupt_txt, interrupt_html) = interruption
            .map(|i| (i.plain(), i.html()))
            .unwrap_or_default();
        context.insert("interrupt_txt", interrupt_txt);
        context.insert("interrupt_html", interrupt_html);

        let (report_txt, report_html) = match report.filter(|buffer| !buffer.is_empty()) {
            Some(buffer) => {
                let window = if self.config.report_window == 0 {
                    DEFAULT_REPORT_WINDOW
                } else {
                    self.config.report_window
                };
                let (start, rows) = buffer.tail(window);
                (pipe_table(rows, start), html_table(rows, start))
            }
            None => (String::new(), String::new()),
        };
        context.insert("report_txt", report_txt);
        context.insert("report_html", report_html);

        self.insert_config(&mut context);
        context
    }

    fn insert_config(&self, context: &mut Context) {
        let config = self.config;
        context.insert("email", &config.email);
        context.insert("recipients", &config.recipients);
        context.insert("task_name", &config.task_name);
        context.insert("smtp_server", &config.smtp_server);
        context.insert("port", config.port);
        context.insert("report_timeout", config.report_timeout);
        context.insert("report_timeout_unit", config.report_timeout_unit);
        context.insert("report_interval", config.report_interval());
        context.insert("report_window", config.report_window);
        context.insert("send_start", config.send_start);
        context.insert("disabled", config.disabled);
    }
}
