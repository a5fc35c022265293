use anyhow::{Context, Result, anyhow};
use std::collections::VecDeque;
use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, error, info, warn};

use runbell::config::{ConfigSource, FileConfigSource, RunConfig};
use runbell::lifecycle::{Cancelled, Notifier};
use runbell::report::parse_rows;

/// Stderr lines kept for the failure message.
const STDERR_TAIL: usize = 20;

/// The file source plus overrides given on the command line.
struct RunSource {
    file: FileConfigSource,
    task_name: Option<String>,
}

impl ConfigSource for RunSource {
    fn load_or_prompt(&self) -> Result<RunConfig> {
        let mut config = self.file.load_or_prompt()?;
        if let Some(task_name) = &self.task_name {
            config.task_name.clone_from(task_name);
        }
        Ok(config)
    }

    fn is_disabled(&self) -> Result<bool> {
        self.file.is_disabled()
    }
}

pub fn run_command(
    config_path: &Path,
    task_name: Option<String>,
    report_prefix: &str,
    dry_run: bool,
    command: &[String],
) -> Result<()> {
    let (program, args) = command.split_first().context("No command given")?;

    let interactive =
        std::io::stdin().is_terminal() && std::env::var_os("RUNBELL_PASSWORD").is_none();
    let source = RunSource {
        file: FileConfigSource::new(config_path, interactive),
        task_name,
    };
    let mut notifier = Notifier::from_source(&source, dry_run)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    notifier.run(|notifier| runtime.block_on(supervise(notifier, program, args, report_prefix)))
}

async fn supervise(
    notifier: &mut Notifier,
    program: &str,
    args: &[String],
    report_prefix: &str,
) -> Result<()> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("Failed to start `{program}`"))?;
    info!(program, pid = ?child.id(), "child process started");

    let mut stdout = RawLines::new(child.stdout.take().context("child stdout not piped")?);
    let mut stderr = RawLines::new(child.stderr.take().context("child stderr not piped")?);
    let mut stdout_open = true;
    let mut stderr_open = true;
    let mut tail = VecDeque::with_capacity(STDERR_TAIL);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let status = loop {
        tokio::select! {
            line = stdout.next_line(), if stdout_open => match line? {
                Some(line) => forward_stdout(notifier, &line, report_prefix),
                None => stdout_open = false,
            },
            line = stderr.next_line(), if stderr_open => match line? {
                Some(line) => {
                    pass_through(io::stderr().lock(), &line);
                    push_tail(&mut tail, String::from_utf8_lossy(trim_line(&line)).into_owned());
                }
                None => stderr_open = false,
            },
            status = child.wait(), if !stdout_open && !stderr_open => break status?,
            _ = &mut ctrl_c => {
                warn!(program, "interrupted; stopping child process");
                if let Err(e) = child.kill().await {
                    debug!(error = %e, "child already gone");
                }
                return Err(Cancelled.into());
            }
        }
    };

    if status.success() {
        info!(program, "child process finished");
        return Ok(());
    }
    if killed_by_interrupt(status) {
        return Err(Cancelled.into());
    }
    Err(child_failure(program, status, &tail))
}

/// Newline-delimited reader that hands lines back byte for byte.
///
/// A line interrupted by another `select!` branch stays in `pending` and is
/// completed by the next call.
struct RawLines<R> {
    reader: BufReader<R>,
    pending: Vec<u8>,
}

impl<R: AsyncRead + Unpin> RawLines<R> {
    fn new(inner: R) -> Self {
        Self {
            reader: BufReader::new(inner),
            pending: Vec::new(),
        }
    }

    async fn next_line(&mut self) -> io::Result<Option<Vec<u8>>> {
        let read = self.reader.read_until(b'\n', &mut self.pending).await?;
        if read == 0 && self.pending.is_empty() {
            return Ok(None);
        }
        Ok(Some(std::mem::take(&mut self.pending)))
    }
}

fn trim_line(raw: &[u8]) -> &[u8] {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    raw.strip_suffix(b"\r").unwrap_or(raw)
}

fn pass_through(mut out: impl Write, raw: &[u8]) {
    if let Err(e) = out.write_all(raw).and_then(|()| out.flush()) {
        debug!(error = %e, "could not forward child output");
    }
}

fn forward_stdout(notifier: &mut Notifier, raw: &[u8], report_prefix: &str) {
    let text = String::from_utf8_lossy(trim_line(raw));
    if let Some(payload) = report_payload(&text, report_prefix) {
        match parse_rows(payload) {
            Ok(rows) => {
                debug!(rows = rows.len(), "report rows received");
                if let Err(e) = notifier.add_report(rows) {
                    error!(error = %e, "failed to send progress report");
                }
                return;
            }
            Err(e) => warn!(error = %e, "ignoring malformed report line"),
        }
    }
    pass_through(io::stdout().lock(), raw);
}

fn report_payload<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    if prefix.is_empty() {
        return None;
    }
    line.strip_prefix(prefix)
}

fn push_tail(tail: &mut VecDeque<String>, line: String) {
    if tail.len() == STDERR_TAIL {
        tail.pop_front();
    }
    tail.push_back(line);
}

#[cfg(unix)]
fn killed_by_interrupt(status: ExitStatus) -> bool {
    use std::os::unix::process::ExitStatusExt;
    status.signal() == Some(2)
}

#[cfg(not(unix))]
fn killed_by_interrupt(_status: ExitStatus) -> bool {
    false
}

fn child_failure(program: &str, status: ExitStatus, tail: &VecDeque<String>) -> anyhow::Error {
    if tail.is_empty() {
        return anyhow!("`{program}` failed with {status}");
    }
    let lines: Vec<&str> = tail.iter().map(String::as_str).collect();
    anyhow!(
        "`{program}` failed with {status}\nlast stderr lines:\n{}",
        lines.join("\n")
    )
}
