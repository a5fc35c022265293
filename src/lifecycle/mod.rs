//! Run lifecycle: the notifier state machine and the faults it reports.

mod controller;
mod fault;

pub use controller::{Notifier, Phase, notifications_available};
pub use fault::{Cancelled, Interruption, PanicSite, is_cancellation};
