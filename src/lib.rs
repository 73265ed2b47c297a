//! FSZK - streaming zero-knowledge file containers.
//!
//! A container is a small self-describing JSON header followed by the file's
//! chunks, each sealed independently with AES-256-GCM:
//! - Raw mode: a random 256-bit key shared out-of-band as a base64url share key
//! - Passphrase mode: PBKDF2-HMAC-SHA256 with a per-container salt
//! - Per-chunk nonces derived from one random base IV and the chunk index
//! - Memory bounded by the chunk size, whatever the file size
//!
//! The path-level entry points live in [`processor`]; [`stream`] exposes the
//! same engines over any `Read`/`Write` pair.

pub mod app;
pub mod cipher;
pub mod config;
pub mod encoding;
pub mod error;
pub mod frame;
pub mod header;
pub mod processor;
pub mod secret;
pub mod stream;
pub mod types;
pub mod ui;
pub mod vault;

pub use cipher::{Credential, KeySource};
pub use error::{Error, Result};
pub use header::Header;
pub use processor::{EncryptOptions, decrypt, encrypt, inspect};
pub use types::{DecryptOutcome, EncryptOutcome, KeyMode, Progress};
