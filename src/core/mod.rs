//! Core types: ticket keys, snapshots, the snapshot builder and the
//! lock-free handle they are published through.

pub(crate) mod builder;
mod handle;
mod snapshot;
mod ticket;

pub use builder::TlsConfigBuilder;
pub use handle::SnapshotHandle;
pub use snapshot::{CredentialFile, SslVerification, TlsConfigSnapshot};
pub use ticket::{
    TICKET_AES_KEY_LEN, TICKET_HMAC_KEY_LEN, TICKET_KEY_NAME_LEN, TICKET_KEY_RECORD_LEN, TicketKey,
    TicketSeedParser,
};
