//! Progress data supplied by the protected work, and its tabular rendering
//! for periodic reports.

mod buffer;
mod table;

pub use buffer::{ReportBuffer, ReportRow, columns, parse_rows};
pub use table::{html_table, pipe_table};

/// Rows shown in a report when the configuration does not say otherwise.
pub const DEFAULT_REPORT_WINDOW: usize = 5;
