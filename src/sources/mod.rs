//! Server settings sources: where credential paths and polling cadence come from.

mod config_source;
mod env;
mod file;
mod settings;

pub use config_source::ConfigSource;
pub use env::EnvSource;
pub use file::FileSource;
pub use settings::{SettingsLoader, SslServerSettings};
