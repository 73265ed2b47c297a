//! Global Configuration Constants
//!
//! Every parameter of the FSZK container format lives here, together with the
//! defaults and policy knobs the encryption engine falls back to when a caller
//! does not override them.
//!
//! ## Container layout
//!
//! ```text
//! "FSZK" | version (1 byte) | header length L (u32 BE) | L bytes of JSON | frames...
//! frame i = ciphertext[n_i] || tag[16]
//! ```
//!
//! Changing any of the format constants below breaks interoperability with
//! existing containers and with decryptors in other languages.

/// Application name used in user interfaces.
pub const APP_NAME: &str = "fszk";

/// File extension for containers produced by the CLI.
pub const FILE_EXTENSION: &str = ".fszk";

// === Container Format ===

/// Magic bytes opening every container.
pub const MAGIC_BYTES: [u8; 4] = *b"FSZK";

/// The magic as it is echoed inside the JSON header.
pub const MAGIC_STR: &str = "FSZK";

/// Current (and only) container format version.
pub const FORMAT_VERSION: u8 = 1;

/// Size of the fixed prelude: magic, version byte and header length.
pub const PRELUDE_SIZE: usize = MAGIC_BYTES.len() + 1 + 4;

/// Upper bound on the JSON header block.
///
/// Real headers are a few hundred bytes. The bound stops a hostile prelude from
/// triggering a multi-gigabyte allocation before the JSON is even parsed.
pub const MAX_HEADER_LENGTH: u32 = 1024 * 1024;

// === AES-256-GCM Parameters ===

/// Size of encryption keys in bytes (AES-256).
pub const KEY_SIZE: usize = 32;

/// Size of the base IV stored in the header, and of every derived chunk nonce.
pub const IV_SIZE: usize = 12;

/// Size of the GCM authentication tag appended to every chunk.
pub const TAG_SIZE: usize = 16;

/// Offset of the big-endian chunk counter inside the base IV.
pub const IV_COUNTER_OFFSET: usize = IV_SIZE - 4;

/// Largest number of chunks a single container may hold.
///
/// Chunk nonces are the base IV plus a 32-bit counter, so a container can never
/// have more than `2^32` distinct nonces. One value is kept in reserve.
pub const MAX_CHUNK_COUNT: u64 = u32::MAX as u64;

// === PBKDF2 Parameters ===

/// Length of the random PBKDF2 salt in bytes.
pub const SALT_SIZE: usize = 16;

/// Default PBKDF2-HMAC-SHA256 iteration count for new passphrase containers.
///
/// Also used when a header omits the iteration count.
pub const DEFAULT_KDF_ITERATIONS: u32 = 100_000;

/// Hash name recorded in the header's `kdf` block. The only supported value.
pub const KDF_HASH: &str = "SHA-256";

/// Default minimum passphrase length, in characters after trimming whitespace.
///
/// This is a policy knob, not a security bound: callers should raise it through
/// `EncryptOptions::min_passphrase_length` when their product allows.
pub const PASSPHRASE_MIN_LENGTH: usize = 4;

// === Streaming ===

/// Default plaintext bytes per chunk.
pub const DEFAULT_CHUNK_SIZE: u32 = 512 * 1024;

/// MIME type recorded when the caller does not supply one.
pub const DEFAULT_MIME: &str = "application/octet-stream";

/// Length of the random identifier given to vault records.
pub const VAULT_ID_SIZE: usize = 9;
