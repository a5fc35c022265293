#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::unnecessary_literal_bound,
    clippy::module_name_repetitions,
    clippy::struct_field_names,
    clippy::must_use_candidate,
    clippy::new_without_default,
    clippy::return_self_not_must_use
)]

//! Email notifications around a unit of work: one when it starts, periodic
//! progress reports, and one when it completes or is interrupted.

#[macro_use]
extern crate rust_i18n;

i18n!("locales", fallback = "en");

pub mod clock;
pub mod config;
pub mod context;
pub mod error;
pub mod lifecycle;
pub mod mail;
pub mod onboard;
pub mod report;
pub mod template;
pub mod ui;
pub mod utils;

pub use config::{ConfigSource, FileConfigSource, RunConfig};
pub use error::{NotifyError, Result};
pub use lifecycle::{Cancelled, Notifier, Phase};
pub use mail::{OutboundMail, Transport};
