//! # Key Derivation
//!
//! A container key comes from one of two regimes:
//!
//! - **Raw**: 32 random bytes, exported as a base64url share key. The share key
//!   is the secret; the container alone is useless without it.
//! - **Passphrase**: PBKDF2-HMAC-SHA256 over the passphrase with a random
//!   16-byte salt. Only the salt and iteration count go into the header.
//!
//! Encryption calls [`resolve`] once per run. Decryption calls [`recover`] with
//! the parsed header, which re-derives from the stored salt and iteration
//! count rather than generating fresh parameters.

use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::Sha256;

use crate::config::{DEFAULT_KDF_ITERATIONS, KDF_HASH, KEY_SIZE, PASSPHRASE_MIN_LENGTH, SALT_SIZE};
use crate::encoding;
use crate::error::{Error, Result};
use crate::header::{Header, KdfParams};
use crate::secret::{Passphrase, SecretKey};
use crate::types::KeyMode;

/// Where an encryption run gets its key from.
#[derive(Debug)]
pub enum KeySource {
    /// Raw mode. `None` generates a fresh random key.
    Raw { share_key: Option<String> },

    /// Passphrase mode.
    Passphrase { passphrase: Passphrase, iterations: u32, min_length: usize },
}

impl KeySource {
    /// Raw mode with a freshly generated key.
    #[must_use]
    pub const fn random() -> Self {
        Self::Raw { share_key: None }
    }

    /// Raw mode reusing an existing share key.
    #[must_use]
    pub fn share_key(share_key: impl Into<String>) -> Self {
        Self::Raw { share_key: Some(share_key.into()) }
    }

    /// Passphrase mode with the default iteration count and strength policy.
    #[must_use]
    pub fn passphrase(passphrase: Passphrase) -> Self {
        Self::Passphrase { passphrase, iterations: DEFAULT_KDF_ITERATIONS, min_length: PASSPHRASE_MIN_LENGTH }
    }
}

/// What a decryption run was handed to unlock a container.
#[derive(Debug)]
pub enum Credential {
    /// A base64url share key, for raw-mode containers.
    ShareKey(String),

    /// A passphrase, for passphrase-mode containers.
    Passphrase(Passphrase),
}

/// The outcome of key resolution: the key plus what the header must record.
#[derive(Debug)]
pub struct ResolvedKey {
    pub key: SecretKey,
    pub key_mode: KeyMode,
    pub share_key: Option<String>,
    pub kdf: Option<KdfParams>,
}

/// Password-based derivation with PBKDF2-HMAC-SHA256.
pub struct Derive<'a> {
    passphrase: &'a Passphrase,
}

impl<'a> Derive<'a> {
    /// Wraps a passphrase supplied at decryption time.
    ///
    /// # Errors
    ///
    /// `PassphraseRequired` when the passphrase is empty.
    pub fn new(passphrase: &'a Passphrase) -> Result<Self> {
        if passphrase.expose_secret().is_empty() {
            return Err(Error::PassphraseRequired);
        }
        Ok(Self { passphrase })
    }

    /// Wraps a passphrase chosen for a new container, enforcing the strength policy.
    ///
    /// # Errors
    ///
    /// `WeakPassphrase` when the trimmed passphrase has fewer than `min_length` characters.
    pub fn with_policy(passphrase: &'a Passphrase, min_length: usize) -> Result<Self> {
        if passphrase.strength_len() < min_length.max(1) {
            return Err(Error::WeakPassphrase { min: min_length.max(1) });
        }
        Self::new(passphrase)
    }

    /// Derives the 32-byte key for `salt` and `iterations`.
    ///
    /// The untrimmed UTF-8 bytes of the passphrase are used.
    pub fn derive_key(&self, salt: &[u8], iterations: u32) -> Result<SecretKey> {
        if iterations == 0 {
            return Err(Error::BadFormat("kdf iterations must be at least 1".into()));
        }

        let mut key = [0u8; KEY_SIZE];
        pbkdf2_hmac::<Sha256>(self.passphrase.expose_secret().as_bytes(), salt, iterations, &mut key);

        Ok(SecretKey::new(key))
    }

    /// Generates a random salt from the OS RNG.
    pub fn generate_salt() -> Result<[u8; SALT_SIZE]> {
        random_bytes()
    }
}

/// Fills an array with bytes from the operating system's CSPRNG.
pub fn random_bytes<const N: usize>() -> Result<[u8; N]> {
    let mut bytes = [0u8; N];
    OsRng.try_fill_bytes(&mut bytes).map_err(|e| Error::Io(std::io::Error::other(e)))?;
    Ok(bytes)
}

/// Generates a random raw key and its share key.
pub fn generate_raw_key() -> Result<(SecretKey, String)> {
    let bytes: [u8; KEY_SIZE] = random_bytes()?;
    let share_key = encoding::encode(bytes);
    Ok((SecretKey::new(bytes), share_key))
}

/// Decodes a share key.
///
/// # Errors
///
/// `InvalidKey` unless the text is base64url for exactly 32 bytes.
pub fn import_share_key(share_key: &str) -> Result<SecretKey> {
    let bytes = encoding::decode(share_key).map_err(|e| Error::InvalidKey(e.to_string()))?;
    let len = bytes.len();
    let bytes: [u8; KEY_SIZE] = bytes.try_into().map_err(|_| Error::InvalidKey(format!("expected {KEY_SIZE} bytes, got {len}")))?;

    Ok(SecretKey::new(bytes))
}

/// Produces the key for a new container and the header fields that reproduce it.
pub fn resolve(source: &KeySource) -> Result<ResolvedKey> {
    match source {
        KeySource::Raw { share_key: None } => {
            let (key, share_key) = generate_raw_key()?;
            Ok(ResolvedKey { key, key_mode: KeyMode::Raw, share_key: Some(share_key), kdf: None })
        }
        KeySource::Raw { share_key: Some(share_key) } => {
            let key = import_share_key(share_key)?;
            Ok(ResolvedKey { key, key_mode: KeyMode::Raw, share_key: Some(share_key.trim().to_owned()), kdf: None })
        }
        KeySource::Passphrase { passphrase, iterations, min_length } => {
            let derive = Derive::with_policy(passphrase, *min_length)?;
            let salt = Derive::generate_salt()?;
            let key = derive.derive_key(&salt, *iterations)?;
            let kdf = KdfParams { salt, iterations: *iterations, hash: KDF_HASH.to_owned() };

            Ok(ResolvedKey { key, key_mode: KeyMode::Passphrase, share_key: None, kdf: Some(kdf) })
        }
    }
}

/// Reconstructs the key of an existing container.
///
/// # Errors
///
/// `PassphraseRequired` / `KeyRequired` when the credential does not match the
/// header's key mode, `InvalidKey` for a malformed share key.
pub fn recover(header: &Header, credential: &Credential) -> Result<SecretKey> {
    match (header.key_mode, credential) {
        (KeyMode::Raw, Credential::ShareKey(share_key)) => import_share_key(share_key),
        (KeyMode::Raw, Credential::Passphrase(_)) => Err(Error::KeyRequired),
        (KeyMode::Passphrase, Credential::ShareKey(_)) => Err(Error::PassphraseRequired),
        (KeyMode::Passphrase, Credential::Passphrase(passphrase)) => {
            let kdf = header.kdf.as_ref().ok_or_else(|| Error::BadFormat("passphrase container without kdf parameters".into()))?;
            Derive::new(passphrase)?.derive_key(&kdf.salt, kdf.iterations)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passphrase_source(text: &str, iterations: u32) -> KeySource {
        KeySource::Passphrase { passphrase: Passphrase::new(text), iterations, min_length: PASSPHRASE_MIN_LENGTH }
    }

    #[test]
    fn test_generated_share_key_round_trips() {
        let resolved = resolve(&KeySource::random()).unwrap();
        let share_key = resolved.share_key.unwrap();

        assert_eq!(share_key.len(), 43);
        assert_eq!(import_share_key(&share_key).unwrap().expose_secret(), resolved.key.expose_secret());
        assert!(resolved.kdf.is_none());
    }

    #[test]
    fn test_supplied_share_key_is_used() {
        let share_key = encoding::encode([5u8; KEY_SIZE]);
        let resolved = resolve(&KeySource::share_key(share_key.clone())).unwrap();

        assert_eq!(resolved.key.expose_secret(), &[5u8; KEY_SIZE]);
        assert_eq!(resolved.share_key, Some(share_key));
    }

    #[test]
    fn test_short_share_key_rejected() {
        let share_key = encoding::encode([5u8; 31]);
        assert!(matches!(resolve(&KeySource::share_key(share_key)), Err(Error::InvalidKey(_))));
        assert!(matches!(import_share_key("not base64!"), Err(Error::InvalidKey(_))));
    }

    #[test]
    fn test_weak_passphrase_rejected() {
        assert!(matches!(resolve(&passphrase_source("abc", 1)), Err(Error::WeakPassphrase { min: 4 })));
        assert!(matches!(resolve(&passphrase_source("  ab  ", 1)), Err(Error::WeakPassphrase { .. })));
        assert!(resolve(&passphrase_source("abcd", 1)).is_ok());
    }

    #[test]
    fn test_policy_knob() {
        let passphrase = Passphrase::new("correct horse");
        assert!(Derive::with_policy(&passphrase, 12).is_ok());
        assert!(matches!(Derive::with_policy(&passphrase, 20), Err(Error::WeakPassphrase { min: 20 })));
    }

    #[test]
    fn test_passphrase_rederivation_is_deterministic() {
        let resolved = resolve(&passphrase_source("open sesame", 1_000)).unwrap();
        let kdf = resolved.kdf.unwrap();

        let passphrase = Passphrase::new("open sesame");
        let again = Derive::new(&passphrase).unwrap().derive_key(&kdf.salt, kdf.iterations).unwrap();
        assert_eq!(again.expose_secret(), resolved.key.expose_secret());
        assert_eq!(kdf.hash, "SHA-256");
        assert_eq!(kdf.iterations, 1_000);
    }

    #[test]
    fn test_pbkdf2_known_answer() {
        // RFC 7914 section 11, PBKDF2-HMAC-SHA256("passwd", "salt", 1), first 32 bytes.
        let passphrase = Passphrase::new("passwd");
        let key = Derive::new(&passphrase).unwrap().derive_key(b"salt", 1).unwrap();
        let expected = [
            0x55, 0xac, 0x04, 0x6e, 0x56, 0xe3, 0x08, 0x9f, 0xec, 0x16, 0x91, 0xc2, 0x25, 0x44, 0xb6, 0x05, 0xf9, 0x41, 0x85, 0x21, 0x6d, 0xde, 0x04, 0x65, 0xe6, 0x8b, 0x9d, 0x57, 0xc2, 0x0d, 0xac, 0xbc,
        ];
        assert_eq!(key.expose_secret(), &expected);
    }

    #[test]
    fn test_empty_passphrase_at_decrypt() {
        let passphrase = Passphrase::new("");
        assert!(matches!(Derive::new(&passphrase), Err(Error::PassphraseRequired)));
    }

    #[test]
    fn test_salts_are_random() {
        assert_ne!(Derive::generate_salt().unwrap(), Derive::generate_salt().unwrap());
    }
}
