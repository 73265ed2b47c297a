//! # Cryptographic Operations Module
//!
//! - [`nonce`]: per-chunk nonce derivation from the container's base IV
//! - [`ChunkCipher`]: AES-256-GCM sealing and opening of single chunks
//! - [`derive`]: raw share keys and PBKDF2 passphrase keys
//!
//! Every chunk is an independent AEAD message: its own nonce, its own 16-byte
//! tag, no associated data. Tampering with one chunk never affects whether the
//! others verify.

mod aes_gcm;
pub mod derive;
pub mod nonce;

pub use aes_gcm::ChunkCipher;
pub use derive::{Credential, Derive, KeySource, ResolvedKey, recover, resolve};
pub use nonce::chunk_nonce;
