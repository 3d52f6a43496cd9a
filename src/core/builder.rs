//! Builder for assembling validated TLS configuration snapshots.

use crate::core::{CredentialFile, SslVerification, TicketKey, TicketSeedParser, TlsConfigSnapshot};
use crate::error::{Result, TlsReloadError};
use std::io::BufReader;
use std::sync::Arc;

/// Builder for a [`TlsConfigSnapshot`].
///
/// Assembly is pure: every input arrives as already-read bytes, so a build
/// either yields a complete snapshot or an error and never touches the disk.
///
/// # Examples
///
/// ```rust,no_run
/// use tls_hotswap::prelude::*;
///
/// # fn example(cert_pem: Vec<u8>, key_pem: Vec<u8>, seed: Vec<u8>) -> Result<()> {
/// let snapshot = TlsConfigBuilder::new()
///     .cert(CredentialFile::new("/etc/tls/cert.pem", cert_pem))
///     .key(CredentialFile::new("/etc/tls/key.pem", key_pem))
///     .ssl_verification(SslVerification::Required)
///     .ticket_seed(&seed)
///     .build()?;
///
/// assert!(!snapshot.ticket_keys().is_empty());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TlsConfigBuilder {
    allow_plaintext: bool,
    cert: Option<CredentialFile>,
    key: Option<CredentialFile>,
    client_ca: Option<CredentialFile>,
    verification: SslVerification,
    ticket_keys: TicketKeys,
    generation: u64,
}

#[derive(Debug, Clone)]
enum TicketKeys {
    Keys(Arc<[TicketKey]>),
    Seed(Vec<u8>),
}

impl TlsConfigBuilder {
    /// Create a builder with default settings.
    ///
    /// Plaintext is allowed, client verification is optional and no ticket
    /// keys are supplied.
    pub fn new() -> Self {
        Self {
            allow_plaintext: true,
            cert: None,
            key: None,
            client_ca: None,
            verification: SslVerification::default(),
            ticket_keys: TicketKeys::Keys(Arc::from(Vec::new())),
            generation: 0,
        }
    }

    /// Accept plaintext connections alongside TLS.
    pub fn allow_plaintext(mut self, allow: bool) -> Self {
        self.allow_plaintext = allow;
        self
    }

    /// Set the certificate chain.
    pub fn cert(mut self, cert: CredentialFile) -> Self {
        self.cert = Some(cert);
        self
    }

    /// Set the private key.
    pub fn key(mut self, key: CredentialFile) -> Self {
        self.key = Some(key);
        self
    }

    /// Set the CA bundle used to verify client certificates.
    pub fn client_ca(mut self, ca: Option<CredentialFile>) -> Self {
        self.client_ca = ca;
        self
    }

    /// Set the client verification mode.
    pub fn ssl_verification(mut self, verification: SslVerification) -> Self {
        self.verification = verification;
        self
    }

    /// Use already-parsed ticket keys.
    pub fn ticket_keys(mut self, keys: impl Into<Arc<[TicketKey]>>) -> Self {
        self.ticket_keys = TicketKeys::Keys(keys.into());
        self
    }

    /// Use the raw contents of a ticket seed file; parsed during [`build`](Self::build).
    pub fn ticket_seed(mut self, seed: &[u8]) -> Self {
        self.ticket_keys = TicketKeys::Seed(seed.to_vec());
        self
    }

    /// Tag the snapshot with a rebuild generation.
    pub fn generation(mut self, generation: u64) -> Self {
        self.generation = generation;
        self
    }

    /// Validate the inputs and build the snapshot.
    ///
    /// Validation is structural: the key is not checked against the
    /// certificate's public key. A cert-then-key rewrite that straddles two
    /// polls can therefore publish a mismatched pair until the second poll;
    /// writers should replace both files before the next poll, or rename them
    /// into place together.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the certificate or key is missing, or has an empty path
    ///   ([`TlsReloadError::IncompleteConfiguration`])
    /// - the certificate, key or client CA contents hold no PEM item of the
    ///   expected kind ([`TlsReloadError::InvalidCredential`])
    /// - the ticket seed fails to parse ([`TlsReloadError::MalformedSeedFile`])
    pub fn build(self) -> Result<TlsConfigSnapshot> {
        let cert = require("certificate", self.cert)?;
        let key = require("private key", self.key)?;

        validate_certificates(&cert)?;
        validate_private_key(&key)?;
        if let Some(ca) = &self.client_ca {
            if ca.path().as_os_str().is_empty() {
                return Err(TlsReloadError::IncompleteConfiguration(
                    "client CA file has an empty path".to_string(),
                ));
            }
            validate_certificates(ca)?;
        }

        let ticket_keys = match self.ticket_keys {
            TicketKeys::Keys(keys) => keys,
            TicketKeys::Seed(seed) => Arc::from(TicketSeedParser::parse(&seed)?),
        };

        Ok(TlsConfigSnapshot {
            allow_plaintext: self.allow_plaintext,
            cert,
            key,
            client_ca: self.client_ca,
            verification: self.verification,
            ticket_keys,
            generation: self.generation,
        })
    }
}

impl Default for TlsConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn require(what: &str, file: Option<CredentialFile>) -> Result<CredentialFile> {
    let file = file.ok_or_else(|| {
        TlsReloadError::IncompleteConfiguration(format!("{} file is not configured", what))
    })?;

    if file.path().as_os_str().is_empty() {
        return Err(TlsReloadError::IncompleteConfiguration(format!(
            "{} file has an empty path",
            what
        )));
    }

    Ok(file)
}

fn validate_certificates(file: &CredentialFile) -> Result<()> {
    let mut reader = BufReader::new(file.contents());
    let certs = rustls_pemfile::certs(&mut reader)
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| TlsReloadError::invalid_credential(file.path(), e.to_string()))?;

    if certs.is_empty() {
        return Err(TlsReloadError::invalid_credential(
            file.path(),
            "no certificates found",
        ));
    }
    Ok(())
}

fn validate_private_key(file: &CredentialFile) -> Result<()> {
    let mut reader = BufReader::new(file.contents());
    rustls_pemfile::private_key(&mut reader)
        .map_err(|e| TlsReloadError::invalid_credential(file.path(), e.to_string()))?
        .ok_or_else(|| TlsReloadError::invalid_credential(file.path(), "no private key found"))?;
    Ok(())
}
