//! Key derivation parameters stored in passphrase-mode headers.

use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_KDF_ITERATIONS, KDF_HASH, SALT_SIZE};
use crate::encoding;
use crate::error::{Error, Result};

/// The header's `kdf` block: `{ salt, iterations, hash }`.
///
/// The salt and iteration count are all a decryptor needs, together with the
/// passphrase, to reproduce the container key. Neither is secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    /// 16 random bytes, base64url encoded.
    #[serde(with = "encoding::fixed")]
    pub salt: [u8; SALT_SIZE],

    /// PBKDF2 iteration count.
    #[serde(default = "default_iterations")]
    pub iterations: u32,

    /// Hash underlying HMAC. Always `"SHA-256"`.
    #[serde(default = "default_hash")]
    pub hash: String,
}

impl KdfParams {
    pub fn validate(&self) -> Result<()> {
        if self.iterations == 0 {
            return Err(Error::BadFormat("kdf iterations must be at least 1".into()));
        }

        if self.hash != KDF_HASH {
            return Err(Error::BadFormat(format!("unsupported kdf hash: {}", self.hash)));
        }

        Ok(())
    }
}

fn default_iterations() -> u32 {
    DEFAULT_KDF_ITERATIONS
}

fn default_hash() -> String {
    KDF_HASH.to_owned()
}
