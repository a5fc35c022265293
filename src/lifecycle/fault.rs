use std::any::Any;
use std::backtrace::{Backtrace, BacktraceStatus};
use std::cell::RefCell;
use std::panic;
use std::sync::Once;
use thiserror::Error;

/// Marker for an intentional, user-requested stop.
///
/// A protected scope that fails with this error (anywhere in its `anyhow`
/// chain) ends silently: no interruption email is sent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Error)]
#[error("cancelled by user")]
pub struct Cancelled;

pub fn is_cancellation(fault: &anyhow::Error) -> bool {
    fault.chain().any(|cause| cause.is::<Cancelled>())
}

/// Failure trace captured when a protected scope ends abnormally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interruption {
    frames: Vec<String>,
    message: String,
}

impl Interruption {
    pub fn new(frames: Vec<String>, message: impl Into<String>) -> Self {
        Self {
            frames,
            message: message.into(),
        }
    }

    /// Backtrace lines (when captured) and the cause chain, then the error's
    /// own message.
    pub fn from_error(fault: &anyhow::Error) -> Self {
        let mut frames = Vec::new();

        let backtrace = fault.backtrace();
        if backtrace.status() == BacktraceStatus::Captured {
            frames.extend(backtrace.to_string().lines().map(str::to_string));
        }
        frames.extend(
            fault
                .chain()
                .skip(1)
                .map(|cause| format!("caused by: {cause}")),
        );

        Self::new(frames, fault.to_string())
    }

    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(text) = payload.downcast_ref::<&str>() {
            (*text).to_string()
        } else if let Some(text) = payload.downcast_ref::<String>() {
            text.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Self::new(Vec::new(), format!("panicked: {message}"))
    }

    /// Append the backtrace and location recorded when the panic was raised.
    pub fn with_panic_site(mut self, site: PanicSite) -> Self {
        self.frames.extend(site.frames);
        self.frames.push(format!("panicked at {}", site.location));
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn frames(&self) -> &[String] {
        &self.frames
    }

    /// Frames joined by newlines, followed by the message.
    pub fn plain(&self) -> String {
        if self.frames.is_empty() {
            self.message.clone()
        } else {
            format!("{}\n{}", self.frames.join("\n"), self.message)
        }
    }

    /// [`Self::plain`] with every newline turned into `<br>`.
    pub fn html(&self) -> String {
        self.plain().replace('\n', "<br>")
    }
}

/// Where a panic was raised on this thread, with a forced backtrace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanicSite {
    pub location: String,
    pub frames: Vec<String>,
}

thread_local! {
    static LAST_PANIC: RefCell<Option<PanicSite>> = const { RefCell::new(None) };
}

/// Chain a hook in front of the current panic hook that records the panic
/// site for the panicking thread. Installed once per process.
pub(crate) fn install_panic_recorder() {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let location = info
                .location()
                .map_or_else(|| "<unknown>".to_string(), ToString::to_string);
            let frames = Backtrace::force_capture()
                .to_string()
                .lines()
                .map(str::to_string)
                .collect();
            LAST_PANIC.with(|slot| *slot.borrow_mut() = Some(PanicSite { location, frames }));
            previous(info);
        }));
    });
}

/// The site of the last panic on this thread, clearing it.
pub(crate) fn take_panic_site() -> Option<PanicSite> {
    LAST_PANIC.with(|slot| slot.borrow_mut().take())
}
