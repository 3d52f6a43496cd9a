//! Immutable TLS configuration snapshots.

use crate::core::TicketKey;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Client certificate verification mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SslVerification {
    /// Never request a client certificate.
    None,
    /// Request a client certificate but accept connections without one.
    #[default]
    Optional,
    /// Reject clients that do not present a valid certificate.
    Required,
}

/// A credential file together with the bytes read from it.
///
/// Cloning is cheap: the contents are shared.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialFile {
    path: PathBuf,
    contents: Arc<[u8]>,
}

impl CredentialFile {
    /// Wrap already-read file contents.
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<Arc<[u8]>>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
        }
    }

    /// Path the contents were read from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw file contents (PEM).
    pub fn contents(&self) -> &[u8] {
        &self.contents
    }
}

impl fmt::Debug for CredentialFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialFile")
            .field("path", &self.path)
            .field("len", &self.contents.len())
            .finish()
    }
}

/// One generation of TLS server credentials.
///
/// Snapshots are built once by [`TlsConfigBuilder`](crate::core::TlsConfigBuilder)
/// and never modified. Rotation publishes a new snapshot; anyone still holding
/// an `Arc` to an older one keeps a consistent view of it.
#[derive(Debug, Clone)]
pub struct TlsConfigSnapshot {
    pub(crate) allow_plaintext: bool,
    pub(crate) cert: CredentialFile,
    pub(crate) key: CredentialFile,
    pub(crate) client_ca: Option<CredentialFile>,
    pub(crate) verification: SslVerification,
    pub(crate) ticket_keys: Arc<[TicketKey]>,
    pub(crate) generation: u64,
}

impl TlsConfigSnapshot {
    /// Whether plaintext connections are accepted alongside TLS.
    pub fn allow_plaintext(&self) -> bool {
        self.allow_plaintext
    }

    /// Certificate chain file path.
    pub fn cert_path(&self) -> &Path {
        self.cert.path()
    }

    /// Private key file path.
    pub fn key_path(&self) -> &Path {
        self.key.path()
    }

    /// Client CA file path, if client verification uses one.
    pub fn client_ca_path(&self) -> Option<&Path> {
        self.client_ca.as_ref().map(CredentialFile::path)
    }

    /// Certificate chain as read for this generation.
    pub fn cert(&self) -> &CredentialFile {
        &self.cert
    }

    /// Private key as read for this generation.
    pub fn key(&self) -> &CredentialFile {
        &self.key
    }

    /// Client CA bundle as read for this generation.
    pub fn client_ca(&self) -> Option<&CredentialFile> {
        self.client_ca.as_ref()
    }

    /// Client verification mode.
    pub fn verification(&self) -> SslVerification {
        self.verification
    }

    /// Session-ticket keys; the first encrypts, all of them decrypt.
    ///
    /// Empty means the TLS engine should generate its own ephemeral keys.
    pub fn ticket_keys(&self) -> &[TicketKey] {
        &self.ticket_keys
    }

    /// Rebuild generation that produced this snapshot.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
