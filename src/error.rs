//! Error types for container encryption and decryption.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for core container operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while producing or consuming a container.
///
/// Every variant is terminal for the operation that raised it; nothing is
/// retried internally.
#[derive(Error, Debug)]
pub enum Error {
    /// The encryption input is missing or is not a regular file.
    #[error("not a regular file: {}", .0.display())]
    NotAFile(PathBuf),

    /// Input and output resolve to the same file, which would be truncated
    /// before it was read.
    #[error("input and output are the same file: {}", .0.display())]
    SameFile(PathBuf),

    /// A raw share key did not decode to exactly 32 bytes.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// The passphrase is shorter than the configured minimum.
    #[error("passphrase too short: at least {min} characters required")]
    WeakPassphrase { min: usize },

    /// The input is not a container, or its header is malformed.
    #[error("invalid container: {0}")]
    BadFormat(String),

    /// The container announces a format version this build cannot read.
    #[error("unsupported container version: {0}")]
    UnsupportedVersion(u8),

    /// The container is passphrase protected but no passphrase was given.
    #[error("passphrase required for this container")]
    PassphraseRequired,

    /// The container uses a raw key but no share key was given.
    #[error("share key required for this container")]
    KeyRequired,

    /// The container ended before the header or a chunk frame was complete.
    #[error("truncated container{}: expected {expected} bytes, found {found}", .chunk.map(|c| format!(" at chunk {c}")).unwrap_or_default())]
    TruncatedContainer { chunk: Option<u64>, expected: u64, found: u64 },

    /// A chunk's GCM tag did not verify.
    ///
    /// Wrong keys, wrong passphrases and corrupted bytes are deliberately
    /// indistinguishable.
    #[error("authentication failed at chunk {chunk}: wrong key or passphrase, or corrupted data")]
    AuthenticationFailed { chunk: u64 },

    /// The chunk size is zero.
    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,

    /// The file would need more chunks than the nonce counter can address.
    #[error("too many chunks: {chunks} exceeds the per-container limit")]
    TooManyChunks { chunks: u64 },

    /// Underlying filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns true when the error means "wrong credentials or tampered data".
    ///
    /// Callers use this to prompt for a password again rather than report a
    /// generic failure.
    #[inline]
    #[must_use]
    pub const fn is_authentication_failure(&self) -> bool {
        matches!(self, Self::AuthenticationFailed { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::BadFormat(format!("header json: {e}"))
    }
}
