//! Cheap file identity snapshots used for change detection.

use std::fs;
use std::io;
use std::path::Path;
use std::time::SystemTime;

/// Comparable summary of a file's metadata.
///
/// Two fingerprints are equal when existence, modification time and size all
/// match. A rewrite that keeps the same bytes but bumps the mtime counts as a
/// change; that only costs a re-parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FileFingerprint {
    /// The file does not exist.
    #[default]
    Absent,
    /// The file exists.
    Present {
        /// Last modification time
        modified: SystemTime,
        /// Size in bytes
        len: u64,
    },
}

impl FileFingerprint {
    /// Fingerprint `path` from its metadata alone.
    ///
    /// Never fails: a missing file yields [`FileFingerprint::Absent`], and so
    /// does any other metadata error. Use [`try_snapshot`](Self::try_snapshot)
    /// to tell the two apart.
    pub fn snapshot(path: &Path) -> Self {
        Self::try_snapshot(path).unwrap_or(Self::Absent)
    }

    /// Fingerprint `path`, reporting metadata errors other than "not found".
    pub fn try_snapshot(path: &Path) -> io::Result<Self> {
        match fs::metadata(path) {
            Ok(meta) => Ok(Self::Present {
                modified: meta.modified()?,
                len: meta.len(),
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::Absent),
            Err(e) => Err(e),
        }
    }

    /// Whether the file existed when fingerprinted.
    pub fn exists(&self) -> bool {
        matches!(self, Self::Present { .. })
    }
}
