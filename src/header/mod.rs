//! The container header.
//!
//! On disk the header is a 9-byte prelude followed by a UTF-8 JSON object:
//!
//! ```text
//! "FSZK" | version: u8 | length: u32 BE | {"chunkSize":..., "fileSize":..., ...}
//! ```
//!
//! The JSON is self-describing; readers must not depend on key order. The
//! header is written before any ciphertext so a reader can learn the complete
//! geometry of the container without knowing its length in advance.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_CHUNK_SIZE, DEFAULT_MIME, FORMAT_VERSION, IV_SIZE, MAGIC_STR};
use crate::encoding;
use crate::error::{Error, Result};
use crate::frame::{self, Frames};
use crate::types::KeyMode;

pub mod deserializer;
pub mod parameter;
pub mod serializer;

pub use deserializer::{Deserializer, ParsedHeader};
pub use parameter::KdfParams;

/// Parsed form of the JSON header block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    /// Format version echoed in the JSON. Readers rely on the prelude byte.
    #[serde(rename = "v", default = "default_version")]
    pub version: u8,

    /// Magic echoed in the JSON. Readers rely on the prelude bytes.
    #[serde(default = "default_magic")]
    pub magic: String,

    /// Plaintext bytes per chunk; only the last chunk may be shorter.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: u32,

    /// Exact plaintext length of the original file.
    pub file_size: u64,

    /// Original file name. Informational, never trusted.
    #[serde(default)]
    pub name: String,

    /// Original MIME type. Informational, never trusted.
    #[serde(default = "default_mime")]
    pub mime: String,

    /// Base nonce from which every chunk nonce is derived.
    #[serde(with = "encoding::fixed")]
    pub iv: [u8; IV_SIZE],

    #[serde(default)]
    pub key_mode: KeyMode,

    /// Present (and required) in passphrase mode, `null` in raw mode.
    pub kdf: Option<KdfParams>,

    /// Milliseconds since the Unix epoch. Advisory.
    #[serde(default)]
    pub created_at: u64,
}

impl Header {
    /// Builds the header for a new container.
    pub fn new(file_size: u64, chunk_size: u32, name: impl Into<String>, mime: impl Into<String>, iv: [u8; IV_SIZE], key_mode: KeyMode, kdf: Option<KdfParams>) -> Self {
        Self {
            version: FORMAT_VERSION,
            magic: MAGIC_STR.to_owned(),
            chunk_size,
            file_size,
            name: name.into(),
            mime: mime.into(),
            iv,
            key_mode,
            kdf,
            created_at: now_millis(),
        }
    }

    /// Checks the invariants a decryptor depends on.
    ///
    /// # Errors
    ///
    /// `InvalidChunkSize` / `TooManyChunks` for an unusable geometry,
    /// `BadFormat` when the key mode and `kdf` block disagree.
    pub fn validate(&self) -> Result<()> {
        frame::check_geometry(self.file_size, self.chunk_size)?;

        match (self.key_mode, &self.kdf) {
            (KeyMode::Raw, None) => Ok(()),
            (KeyMode::Raw, Some(_)) => Err(Error::BadFormat("raw container carries kdf parameters".into())),
            (KeyMode::Passphrase, None) => Err(Error::BadFormat("passphrase container without kdf parameters".into())),
            (KeyMode::Passphrase, Some(kdf)) => kdf.validate(),
        }
    }

    /// The chunk plan of this container.
    pub fn frames(&self) -> Result<Frames> {
        Frames::new(self.file_size, self.chunk_size)
    }

    #[must_use]
    pub const fn chunk_count(&self) -> u64 {
        frame::chunk_count(self.file_size, self.chunk_size)
    }

    #[must_use]
    pub const fn requires_passphrase(&self) -> bool {
        matches!(self.key_mode, KeyMode::Passphrase)
    }

    /// The base IV as base64url, as it appears in the JSON.
    #[must_use]
    pub fn iv_text(&self) -> String {
        encoding::encode(self.iv)
    }
}

fn now_millis() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

fn default_version() -> u8 {
    FORMAT_VERSION
}

fn default_magic() -> String {
    MAGIC_STR.to_owned()
}

fn default_chunk_size() -> u32 {
    DEFAULT_CHUNK_SIZE
}

fn default_mime() -> String {
    DEFAULT_MIME.to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{KDF_HASH, SALT_SIZE};

    fn raw_header() -> Header {
        Header::new(1_300_000, DEFAULT_CHUNK_SIZE, "report.pdf", "application/pdf", [3u8; IV_SIZE], KeyMode::Raw, None)
    }

    #[test]
    fn test_json_field_names() {
        let json = serde_json::to_value(raw_header()).unwrap();

        assert_eq!(json["v"], 1);
        assert_eq!(json["magic"], "FSZK");
        assert_eq!(json["chunkSize"], 524_288);
        assert_eq!(json["fileSize"], 1_300_000);
        assert_eq!(json["name"], "report.pdf");
        assert_eq!(json["mime"], "application/pdf");
        assert_eq!(json["iv"], "AwMDAwMDAwMDAwMD");
        assert_eq!(json["keyMode"], "raw");
        assert!(json["kdf"].is_null());
        assert!(json["createdAt"].as_u64().unwrap() > 0);
    }

    #[test]
    fn test_minimal_header_defaults() {
        let header: Header = serde_json::from_str(r#"{"fileSize":10,"iv":"AAAAAAAAAAAAAAAA","kdf":null}"#).unwrap();

        assert_eq!(header.chunk_size, DEFAULT_CHUNK_SIZE);
        assert_eq!(header.key_mode, KeyMode::Raw);
        assert_eq!(header.mime, DEFAULT_MIME);
        assert_eq!(header.created_at, 0);
        assert!(header.validate().is_ok());
    }

    #[test]
    fn test_iv_must_be_twelve_bytes() {
        assert!(serde_json::from_str::<Header>(r#"{"fileSize":10,"iv":"AAAA","kdf":null}"#).is_err());
    }

    #[test]
    fn test_mode_and_kdf_must_agree() {
        let mut header = raw_header();
        header.key_mode = KeyMode::Passphrase;
        assert!(matches!(header.validate(), Err(Error::BadFormat(_))));

        header.kdf = Some(KdfParams { salt: [1u8; SALT_SIZE], iterations: 10, hash: KDF_HASH.to_owned() });
        assert!(header.validate().is_ok());
        assert!(header.requires_passphrase());

        header.key_mode = KeyMode::Raw;
        assert!(matches!(header.validate(), Err(Error::BadFormat(_))));
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let mut header = raw_header();
        header.chunk_size = 0;
        assert!(matches!(header.validate(), Err(Error::InvalidChunkSize)));
    }

    #[test]
    fn test_chunk_count() {
        assert_eq!(raw_header().chunk_count(), 3);
    }
}
