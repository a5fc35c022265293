use chrono::{DateTime, Local};
use std::io::IsTerminal;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use strum::{Display, IntoStaticStr};
use tracing::{debug, error, info, warn};

use super::fault::{Interruption, install_panic_recorder, is_cancellation, take_panic_site};
use crate::clock::{Clock, SystemClock};
use crate::config::{ConfigSource, RunConfig};
use crate::context::{Context, ContextBuilder, HostFacts};
use crate::error::{NotifyError, Result};
use crate::mail::{LogTransport, OutboundMail, SmtpMailer, Transport};
use crate::report::{ReportBuffer, ReportRow};
use crate::template::{self, Event, TemplateStore};

/// Position of a run in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum Phase {
    Idle,
    Running,
    Completed,
    Interrupted,
}

/// Whether notifications may be sent from this process at all.
///
/// False when stdout is not a terminal or `RUNBELL_DISABLED` is set.
pub fn notifications_available() -> bool {
    let forced_off = std::env::var("RUNBELL_DISABLED")
        .map(|value| crate::config::schema::is_truthy(&value))
        .unwrap_or(false);
    !forced_off && std::io::stdout().is_terminal()
}

/// Wraps one unit of work and emails its start, progress, completion or
/// interruption.
///
/// A disabled notifier accepts every call and does nothing.
pub struct Notifier {
    armed: Option<Box<Armed>>,
}

struct Armed {
    config: RunConfig,
    transport: Box<dyn Transport>,
    store: TemplateStore,
    clock: Arc<dyn Clock>,
    facts: Option<HostFacts>,
    phase: Phase,
    started_at: Option<DateTime<Local>>,
    last_report: Option<DateTime<Local>>,
    report: Option<ReportBuffer>,
    interruption: Option<Interruption>,
}

impl Notifier {
    /// An enabled notifier, unless `config.disabled` is set.
    ///
    /// Fields left empty or zero get their derived defaults.
    pub fn new(mut config: RunConfig, transport: Box<dyn Transport>) -> Self {
        if config.disabled {
            info!("notifications disabled by configuration");
            return Self::disabled();
        }
        config.fill_derived_defaults();
        if let Err(e) = config.validate() {
            warn!(error = %e, "notifier configuration is incomplete");
        }
        let store = config
            .template_dir
            .as_ref()
            .map_or_else(TemplateStore::embedded, |dir| {
                TemplateStore::with_override_dir(dir.clone())
            });
        Self {
            armed: Some(Box::new(Armed {
                config,
                transport,
                store,
                clock: Arc::new(SystemClock),
                facts: None,
                phase: Phase::Idle,
                started_at: None,
                last_report: None,
                report: None,
                interruption: None,
            })),
        }
    }

    pub fn disabled() -> Self {
        Self { armed: None }
    }

    /// Decide headless and disabled mode first, then load configuration and
    /// pick a transport. The source is never prompted when either holds.
    pub fn from_source<S>(source: &S, dry_run: bool) -> anyhow::Result<Self>
    where
        S: ConfigSource + ?Sized,
    {
        Self::from_source_when(source, dry_run, notifications_available())
    }

    fn from_source_when<S>(source: &S, dry_run: bool, available: bool) -> anyhow::Result<Self>
    where
        S: ConfigSource + ?Sized,
    {
        if !available {
            info!("no interactive stdout; notifications disabled");
            return Ok(Self::disabled());
        }
        if source.is_disabled()? {
            info!("notifications disabled by configuration");
            return Ok(Self::disabled());
        }
        let config = source.load_or_prompt()?;
        let transport: Box<dyn Transport> = if dry_run {
            Box::new(LogTransport)
        } else {
            Box::new(SmtpMailer::from_config(&config))
        };
        Ok(Self::new(config, transport))
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        if let Some(armed) = self.armed.as_mut() {
            armed.clock = clock;
        }
        self
    }

    /// Fixed host facts instead of detecting them per notification.
    pub fn with_host_facts(mut self, facts: HostFacts) -> Self {
        if let Some(armed) = self.armed.as_mut() {
            armed.facts = Some(facts);
        }
        self
    }

    pub fn with_template_store(mut self, store: TemplateStore) -> Self {
        if let Some(armed) = self.armed.as_mut() {
            armed.store = store;
        }
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.armed.is_some()
    }

    /// Current phase; a disabled notifier always reports [`Phase::Idle`].
    pub fn phase(&self) -> Phase {
        self.armed.as_ref().map_or(Phase::Idle, |armed| armed.phase)
    }

    pub fn config(&self) -> Option<&RunConfig> {
        self.armed.as_ref().map(|armed| &armed.config)
    }

    /// Accumulated progress data; unset until the first accepted report.
    pub fn report_buffer(&self) -> Option<&ReportBuffer> {
        self.armed.as_ref().and_then(|armed| armed.report.as_ref())
    }

    /// `Idle → Running`. Sends `start` when enabled in the configuration.
    pub fn enter(&mut self) -> Result<()> {
        let Some(armed) = self.armed.as_mut() else {
            return Ok(());
        };
        armed.expect_phase(Phase::Idle, "enter")?;

        let now = armed.clock.now();
        armed.started_at = Some(now);
        armed.last_report = Some(now);
        armed.phase = Phase::Running;
        info!(task = %armed.config.task_name, "run started");

        if armed.config.send_start {
            armed.notify(Event::Start)?;
        }
        Ok(())
    }

    /// Append progress rows; sends a `report` once the timeout has elapsed
    /// since the last one.
    pub fn add_report(&mut self, rows: Vec<ReportRow>) -> Result<()> {
        let Some(armed) = self.armed.as_mut() else {
            return Ok(());
        };
        if armed.phase != Phase::Running {
            debug!(phase = %armed.phase, "report rows ignored outside a running scope");
            return Ok(());
        }

        armed
            .report
            .get_or_insert_with(ReportBuffer::new)
            .extend(rows);

        let now = armed.clock.now();
        let last = armed.last_report.unwrap_or(now);
        let elapsed_ms = (now - last).num_milliseconds();
        let timeout_ms = i64::try_from(armed.config.report_timeout_secs())
            .map_or(i64::MAX, |secs| secs.saturating_mul(1000));
        if elapsed_ms > timeout_ms {
            armed.last_report = Some(now);
            armed.notify(Event::Report)?;
        }
        Ok(())
    }

    /// `Running → Completed`. Sends `completed`.
    pub fn complete(&mut self) -> Result<()> {
        let Some(armed) = self.armed.as_mut() else {
            return Ok(());
        };
        armed.expect_phase(Phase::Running, "complete")?;
        armed.phase = Phase::Completed;
        info!(task = %armed.config.task_name, "run completed");
        armed.notify(Event::Completed)
    }

    /// `Running → Interrupted`. Cancellation ends silently; any other fault
    /// is captured and sent as `interruption`.
    pub fn interrupt(&mut self, fault: &anyhow::Error) -> Result<()> {
        if is_cancellation(fault) {
            let Some(armed) = self.armed.as_mut() else {
                return Ok(());
            };
            armed.expect_phase(Phase::Running, "interrupt")?;
            armed.phase = Phase::Interrupted;
            info!(task = %armed.config.task_name, "run cancelled; no notification sent");
            return Ok(());
        }
        self.interrupt_with(Interruption::from_error(fault))
    }

    pub fn interrupt_with(&mut self, interruption: Interruption) -> Result<()> {
        let Some(armed) = self.armed.as_mut() else {
            return Ok(());
        };
        armed.expect_phase(Phase::Running, "interrupt")?;
        armed.phase = Phase::Interrupted;
        warn!(
            task = %armed.config.task_name,
            reason = %interruption.message(),
            "run interrupted"
        );
        armed.interruption = Some(interruption);
        armed.notify(Event::Interruption)
    }

    /// Run `work` inside the lifecycle.
    ///
    /// The work's own error, or panic, reaches the caller unchanged. A failed
    /// `completed` notification is returned as the error of an otherwise
    /// successful run; a failed `interruption` notification is only logged.
    pub fn run<T, F>(&mut self, work: F) -> anyhow::Result<T>
    where
        F: FnOnce(&mut Self) -> anyhow::Result<T>,
    {
        self.enter()?;
        if self.is_enabled() {
            install_panic_recorder();
            let _ = take_panic_site();
        }

        match panic::catch_unwind(AssertUnwindSafe(|| work(self))) {
            Ok(Ok(value)) => {
                self.complete()?;
                Ok(value)
            }
            Ok(Err(fault)) => {
                if let Err(secondary) = self.interrupt(&fault) {
                    error!(error = %secondary, "failed to send interruption notification");
                }
                Err(fault)
            }
            Err(payload) => {
                let mut interruption = Interruption::from_panic(payload.as_ref());
                if let Some(site) = take_panic_site() {
                    interruption = interruption.with_panic_site(site);
                }
                if let Err(secondary) = self.interrupt_with(interruption) {
                    error!(error = %secondary, "failed to send interruption notification");
                }
                panic::resume_unwind(payload)
            }
        }
    }

    /// Context for `event` as it would be rendered now.
    pub fn context(&self, event: Event) -> Option<Context> {
        self.armed.as_ref().map(|armed| armed.context(event))
    }
}

impl Armed {
    fn expect_phase(&self, expected: Phase, action: &'static str) -> Result<()> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(NotifyError::Lifecycle {
                action,
                phase: self.phase.into(),
            })
        }
    }

    fn context(&self, event: Event) -> Context {
        let now = self.clock.now();
        let facts = self.facts.clone().unwrap_or_else(HostFacts::detect);
        let mut context = ContextBuilder::new(&self.config, &facts, now).build(
            self.started_at.unwrap_or(now),
            self.interruption.as_ref(),
            self.report.as_ref(),
        );
        context.insert("event", event);
        context
    }

    fn notify(&mut self, event: Event) -> Result<()> {
        let context = self.context(event);
        let rendered = template::render(&self.store, event, &context)?;
        let mail = OutboundMail::compose(&self.config, rendered);
        info!(
            %event,
            transport = self.transport.name(),
            recipients = %mail.to.join(", "),
            "sending notification"
        );
        self.transport.send(&mail)?;
        Ok(())
    }
}
