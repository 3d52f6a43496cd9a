//! Session-ticket keys and the binary seed file parser.

use crate::error::{Result, TlsReloadError};
use std::collections::HashSet;
use std::fmt;

/// Length of the key name field of a ticket key record.
pub const TICKET_KEY_NAME_LEN: usize = 16;
/// Length of the AES key field of a ticket key record.
pub const TICKET_AES_KEY_LEN: usize = 16;
/// Length of the HMAC key field of a ticket key record.
pub const TICKET_HMAC_KEY_LEN: usize = 16;
/// Size of one record in a ticket seed file.
pub const TICKET_KEY_RECORD_LEN: usize =
    TICKET_KEY_NAME_LEN + TICKET_AES_KEY_LEN + TICKET_HMAC_KEY_LEN;

const AES_OFFSET: usize = TICKET_KEY_NAME_LEN;
const HMAC_OFFSET: usize = AES_OFFSET + TICKET_AES_KEY_LEN;

/// A single session-ticket key: name, AES key and HMAC key.
///
/// The TLS engine uses the first key of a snapshot to encrypt new tickets and
/// the rest to decrypt tickets issued before the last rotation.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TicketKey {
    bytes: [u8; TICKET_KEY_RECORD_LEN],
}

impl TicketKey {
    /// Create a key from its three components.
    pub fn new(
        name: [u8; TICKET_KEY_NAME_LEN],
        aes_key: [u8; TICKET_AES_KEY_LEN],
        hmac_key: [u8; TICKET_HMAC_KEY_LEN],
    ) -> Self {
        let mut bytes = [0u8; TICKET_KEY_RECORD_LEN];
        bytes[..AES_OFFSET].copy_from_slice(&name);
        bytes[AES_OFFSET..HMAC_OFFSET].copy_from_slice(&aes_key);
        bytes[HMAC_OFFSET..].copy_from_slice(&hmac_key);
        Self { bytes }
    }

    /// Key name, sent in the clear inside each ticket.
    pub fn name(&self) -> &[u8] {
        &self.bytes[..AES_OFFSET]
    }

    /// AES key used to encrypt ticket contents.
    pub fn aes_key(&self) -> &[u8] {
        &self.bytes[AES_OFFSET..HMAC_OFFSET]
    }

    /// HMAC key used to authenticate tickets.
    pub fn hmac_key(&self) -> &[u8] {
        &self.bytes[HMAC_OFFSET..]
    }

    /// The full record, in seed file layout.
    pub fn as_bytes(&self) -> &[u8; TICKET_KEY_RECORD_LEN] {
        &self.bytes
    }

    fn from_record(index: usize, record: &[u8]) -> Result<Self> {
        let bytes: [u8; TICKET_KEY_RECORD_LEN] = record.try_into().map_err(|_| {
            TlsReloadError::MalformedSeedFile(format!(
                "record {} is {} bytes, expected {}",
                index,
                record.len(),
                TICKET_KEY_RECORD_LEN
            ))
        })?;
        let key = Self { bytes };

        for (field, value) in [
            ("name", key.name()),
            ("AES key", key.aes_key()),
            ("HMAC key", key.hmac_key()),
        ] {
            if value.iter().all(|b| *b == 0) {
                return Err(TlsReloadError::MalformedSeedFile(format!(
                    "record {} has an all-zero {}",
                    index, field
                )));
            }
        }

        Ok(key)
    }
}

impl fmt::Debug for TicketKey {
    // Key material stays out of logs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name: String = self.name().iter().map(|b| format!("{:02x}", b)).collect();
        f.debug_struct("TicketKey").field("name", &name).finish_non_exhaustive()
    }
}

/// Parser for binary ticket seed files.
///
/// A seed file is a plain concatenation of fixed-size records, each laid out as
/// `name ‖ AES key ‖ HMAC key`. The parser is pure: callers read the file and
/// hand the bytes in.
///
/// # Examples
///
/// ```rust
/// use tls_hotswap::core::{TicketSeedParser, TICKET_KEY_RECORD_LEN};
///
/// let mut seed = vec![0u8; TICKET_KEY_RECORD_LEN];
/// seed.iter_mut().enumerate().for_each(|(i, b)| *b = i as u8 + 1);
///
/// let keys = TicketSeedParser::parse(&seed).unwrap();
/// assert_eq!(keys.len(), 1);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TicketSeedParser;

impl TicketSeedParser {
    /// Parse a seed file into ticket keys, preserving file order.
    ///
    /// # Errors
    ///
    /// An empty input yields no keys, leaving the TLS engine to generate
    /// ephemeral ones.
    ///
    /// Returns [`TlsReloadError::MalformedSeedFile`] if:
    /// - its length is not a multiple of [`TICKET_KEY_RECORD_LEN`]
    /// - any record has an all-zero name, AES key or HMAC key
    /// - two records share a key name
    ///
    /// No partial key list is ever returned.
    pub fn parse(bytes: &[u8]) -> Result<Vec<TicketKey>> {
        if bytes.len() % TICKET_KEY_RECORD_LEN != 0 {
            return Err(TlsReloadError::MalformedSeedFile(format!(
                "length {} is not a multiple of the {}-byte record size",
                bytes.len(),
                TICKET_KEY_RECORD_LEN
            )));
        }

        let mut seen = HashSet::new();
        let mut keys = Vec::with_capacity(bytes.len() / TICKET_KEY_RECORD_LEN);

        for (index, record) in bytes.chunks_exact(TICKET_KEY_RECORD_LEN).enumerate() {
            let key = TicketKey::from_record(index, record)?;
            if !seen.insert(key.name().to_vec()) {
                return Err(TlsReloadError::MalformedSeedFile(format!(
                    "record {} reuses an earlier key name",
                    index
                )));
            }
            keys.push(key);
        }

        Ok(keys)
    }
}
