pub mod text;

pub use text::{escape_html, natural_delta};
