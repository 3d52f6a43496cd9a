//! Error types for tls-hotswap.

use std::path::PathBuf;

/// Result type alias for tls-hotswap operations.
pub type Result<T> = std::result::Result<T, TlsReloadError>;

/// Errors that can occur while loading or rotating TLS credentials.
///
/// Every variant is fatal to a single build attempt only. During rotation the
/// watcher logs the error and keeps serving the previously published snapshot.
#[derive(Debug, thiserror::Error)]
pub enum TlsReloadError {
    /// The session-ticket seed file failed structural validation.
    #[error("Malformed ticket seed file: {0}")]
    MalformedSeedFile(String),

    /// A required input (certificate or private key) is missing.
    #[error("Incomplete TLS configuration: {0}")]
    IncompleteConfiguration(String),

    /// Credential bytes were read but do not contain the expected PEM material.
    #[error("Invalid credential in {path}: {reason}")]
    InvalidCredential {
        /// File the credential was read from
        path: PathBuf,
        /// What was wrong with its contents
        reason: String,
    },

    /// Reading a credential file failed.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File that could not be read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to load server settings from a source.
    #[error("Failed to load settings: {0}")]
    LoadError(String),

    /// Failed to deserialize server settings.
    #[error("Failed to deserialize settings: {0}")]
    DeserializationError(String),

    /// Generic error for other cases.
    #[error("TLS reload error: {0}")]
    Other(String),
}

impl TlsReloadError {
    /// Build an [`TlsReloadError::Io`] for `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Build an [`TlsReloadError::InvalidCredential`] for `path`.
    pub fn invalid_credential(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidCredential {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error came from a malformed ticket seed file.
    pub fn is_malformed_seed(&self) -> bool {
        matches!(self, Self::MalformedSeedFile(_))
    }
}
