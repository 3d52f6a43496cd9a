//! Settings source trait.

use crate::error::Result;
use std::collections::HashMap;

/// A place server settings can be read from.
///
/// Implement this trait to pull TLS settings from somewhere other than files
/// and environment variables.
pub trait ConfigSource: Send + Sync {
    /// Read the source as a flat or nested key-value map.
    ///
    /// The map is merged with other sources according to priority.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read or parsed.
    fn load(&self) -> Result<HashMap<String, config::Value>>;

    /// Human-readable name for logs and error messages.
    fn name(&self) -> String;

    /// Merge priority; higher values override lower ones.
    ///
    /// Defaults: files 100 (+10 per extra file), environment 300.
    fn priority(&self) -> i32 {
        100
    }
}
