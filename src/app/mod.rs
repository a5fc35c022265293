pub mod dispatch;
pub mod preview;
pub mod run;
