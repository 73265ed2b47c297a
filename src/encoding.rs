//! URL-safe base64 without padding.
//!
//! This is the text form of every binary value the container exposes: the base
//! IV and salt inside the JSON header, and the raw key handed out as a share
//! key (usually as a `#k=...` URL fragment that never reaches a server).

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::{DecodeError, Engine as _};

/// Encodes bytes as unpadded base64url.
#[inline]
#[must_use]
pub fn encode(bytes: impl AsRef<[u8]>) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Decodes base64url, with or without trailing `=` padding.
pub fn decode(text: &str) -> Result<Vec<u8>, DecodeError> {
    URL_SAFE_NO_PAD.decode(text.trim().trim_end_matches('='))
}

/// Serde adapter storing a fixed-size byte array as a base64url string.
pub mod fixed {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer, const N: usize>(bytes: &[u8; N], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>, const N: usize>(deserializer: D) -> Result<[u8; N], D::Error> {
        let text = String::deserialize(deserializer)?;
        let bytes = super::decode(&text).map_err(D::Error::custom)?;
        let len = bytes.len();

        bytes.try_into().map_err(|_| D::Error::custom(format!("expected {N} bytes, got {len}")))
    }
}
