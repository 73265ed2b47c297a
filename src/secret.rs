use secrecy::{ExposeSecret, SecretBox, SecretString};

use crate::config::KEY_SIZE;

/// A 256-bit AES key, zeroized on drop.
pub struct SecretKey {
    inner: SecretBox<[u8; KEY_SIZE]>,
}

impl SecretKey {
    pub fn new(bytes: [u8; KEY_SIZE]) -> Self {
        Self { inner: SecretBox::new(Box::new(bytes)) }
    }

    pub fn expose_secret(&self) -> &[u8; KEY_SIZE] {
        self.inner.expose_secret()
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretKey([REDACTED])")
    }
}

/// A user passphrase. Never written to a container, a vault or a log.
pub struct Passphrase {
    inner: SecretString,
}

impl Passphrase {
    pub fn new(passphrase: &str) -> Self {
        Self { inner: SecretString::from(passphrase.to_owned()) }
    }

    pub fn from_string(passphrase: String) -> Self {
        Self { inner: SecretString::from(passphrase) }
    }

    pub fn expose_secret(&self) -> &str {
        self.inner.expose_secret()
    }

    /// Length in characters once surrounding whitespace is ignored.
    pub fn strength_len(&self) -> usize {
        self.expose_secret().trim().chars().count()
    }
}

impl From<SecretString> for Passphrase {
    fn from(secret: SecretString) -> Self {
        Self { inner: secret }
    }
}

impl std::fmt::Debug for Passphrase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Passphrase([REDACTED])")
    }
}
