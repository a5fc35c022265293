pub mod schema;
pub mod source;

pub use schema::{
    CONFIG_FILE_NAME, Credential, RunConfig, TimeoutUnit, default_smtp_server, split_recipients,
};
pub use source::{ConfigSource, FileConfigSource};
