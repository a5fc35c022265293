use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `runbell`.
///
/// Each subsystem defines its own error variant. Library callers can match on
/// these to decide recovery strategy; the binary wraps them in `anyhow` for
/// context chains.
#[derive(Debug, Error)]
pub enum NotifyError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Template ─────────────────────────────────────────────────────────
    #[error("template: {0}")]
    Template(#[from] TemplateError),

    // ── Delivery ─────────────────────────────────────────────────────────
    #[error("delivery: {0}")]
    Delivery(#[from] DeliveryError),

    // ── Lifecycle ────────────────────────────────────────────────────────
    #[error("lifecycle: cannot {action} while {phase}")]
    Lifecycle {
        action: &'static str,
        phase: &'static str,
    },
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Template errors ─────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum TemplateError {
    /// A fragment (`common`, an event, a format or `basic`) could not be located.
    #[error("template fragment not found: {fragment}")]
    Missing { fragment: String },

    #[error("template fragment {fragment} is malformed: {reason}")]
    Malformed { fragment: String, reason: String },

    #[error("template render failed: {0}")]
    Render(String),
}

impl TemplateError {
    pub(crate) fn missing(fragment: impl Into<String>) -> Self {
        Self::Missing {
            fragment: fragment.into(),
        }
    }
}

// ─── Delivery errors ─────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("invalid address {address:?}: {message}")]
    Address { address: String, message: String },

    #[error("failed to build message: {0}")]
    Message(String),

    #[error("connection to {server} failed: {message}")]
    Connection { server: String, message: String },

    #[error("authentication as {user} failed: {message}")]
    Auth { user: String, message: String },

    #[error("server rejected the message: {0}")]
    Rejected(String),
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, NotifyError>;
