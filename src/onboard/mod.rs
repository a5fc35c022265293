pub mod domain;
pub mod flow;
pub mod view;

pub use flow::run_wizard;
