use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce, Tag};

use crate::cipher::nonce::chunk_nonce;
use crate::config::{IV_SIZE, TAG_SIZE};
use crate::error::{Error, Result};
use crate::secret::SecretKey;

/// AES-256-GCM bound to one container: one key, one base IV.
///
/// Chunks are sealed in place with no associated data; the tag is returned
/// separately so it can be written right after the ciphertext.
pub struct ChunkCipher {
    inner: Aes256Gcm,
    base_iv: [u8; IV_SIZE],
}

impl ChunkCipher {
    #[inline]
    pub fn new(key: &SecretKey, base_iv: [u8; IV_SIZE]) -> Result<Self> {
        let inner = Aes256Gcm::new_from_slice(key.expose_secret()).map_err(|e| Error::InvalidKey(e.to_string()))?;
        Ok(Self { inner, base_iv })
    }

    /// Encrypts chunk `index` in place and returns its tag.
    #[inline]
    pub fn seal(&self, index: u32, buffer: &mut [u8]) -> Result<[u8; TAG_SIZE]> {
        let nonce = chunk_nonce(&self.base_iv, index);
        let tag = self
            .inner
            .encrypt_in_place_detached(Nonce::from_slice(&nonce), b"", buffer)
            .map_err(|_| Error::Io(std::io::Error::other(format!("aes-gcm refused chunk {index}"))))?;

        let mut out = [0u8; TAG_SIZE];
        out.copy_from_slice(&tag);
        Ok(out)
    }

    /// Decrypts chunk `index` in place after verifying its tag.
    ///
    /// On failure the buffer contents are unspecified and must be discarded.
    #[inline]
    pub fn open(&self, index: u32, buffer: &mut [u8], tag: &[u8]) -> Result<()> {
        if tag.len() != TAG_SIZE {
            return Err(Error::AuthenticationFailed { chunk: u64::from(index) });
        }

        let nonce = chunk_nonce(&self.base_iv, index);
        self.inner
            .decrypt_in_place_detached(Nonce::from_slice(&nonce), b"", buffer, Tag::from_slice(tag))
            .map_err(|_| Error::AuthenticationFailed { chunk: u64::from(index) })
    }
}
