//! Common type definitions shared by the engines and the CLI.
//!
//! - [`KeyMode`]: how a container's key is obtained
//! - [`Processing`]: which engine is running, for labels and logs
//! - [`Progress`]: per-chunk progress callback
//! - [`EncryptOutcome`] / [`DecryptOutcome`]: what a finished run hands back

use std::fmt::{Display, Formatter, Result};

use serde::{Deserialize, Serialize};
use strum::{Display as StrumDisplay, EnumString};

use crate::header::Header;

/// How the key of a container is obtained.
///
/// Serialized as the header's `keyMode` field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, StrumDisplay, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum KeyMode {
    /// A random 32-byte key distributed out-of-band as a share key.
    #[default]
    Raw,

    /// A key derived from a passphrase with PBKDF2-HMAC-SHA256.
    Passphrase,
}

/// Represents a processing operation in progress.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Processing {
    /// An encryption run.
    Encryption,

    /// A decryption run.
    Decryption,
}

impl Processing {
    /// Returns a progress label for the operation.
    #[inline]
    pub fn label(self) -> &'static str {
        match self {
            Self::Encryption => "Encrypting...",
            Self::Decryption => "Decrypting...",
        }
    }

    /// Lowercase noun for error context.
    #[inline]
    pub fn name(self) -> &'static str {
        match self {
            Self::Encryption => "encryption",
            Self::Decryption => "decryption",
        }
    }

    /// Past-tense verb for completion messages.
    #[inline]
    pub fn done(self) -> &'static str {
        match self {
            Self::Encryption => "encrypted",
            Self::Decryption => "decrypted",
        }
    }
}

impl Display for Processing {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.write_str(self.name())
    }
}

/// Receives plaintext byte counts as chunks complete.
///
/// Engines call it once per chunk, after the chunk has been written.
pub trait Progress {
    fn advance(&self, bytes: u64);
}

impl Progress for () {
    #[inline]
    fn advance(&self, _bytes: u64) {}
}

/// Result of a successful encryption run.
#[derive(Debug, Clone)]
pub struct EncryptOutcome {
    /// Key mode recorded in the container.
    pub key_mode: KeyMode,

    /// The share key, in raw mode only. This, not the container, is the secret.
    pub share_key: Option<String>,

    /// The header written at the start of the container.
    pub header: Header,
}

/// Result of a successful decryption run.
///
/// `name` and `mime` come straight from the header and are informational only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecryptOutcome {
    pub name: String,
    pub mime: String,
    pub file_size: u64,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_key_mode_text() {
        assert_eq!(KeyMode::Raw.to_string(), "raw");
        assert_eq!(KeyMode::from_str("passphrase").unwrap(), KeyMode::Passphrase);
        assert!(KeyMode::from_str("argon").is_err());
    }

    #[test]
    fn test_processing_text() {
        assert_eq!(Processing::Decryption.to_string(), "decryption");
        assert_eq!(Processing::Encryption.label(), "Encrypting...");
    }

    #[test]
    fn test_key_mode_json() {
        assert_eq!(serde_json::to_string(&KeyMode::Passphrase).unwrap(), "\"passphrase\"");
        assert_eq!(serde_json::from_str::<KeyMode>("\"raw\"").unwrap(), KeyMode::Raw);
    }
}
