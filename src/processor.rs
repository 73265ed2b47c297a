//! High-level container encryption and decryption over file paths.
//!
//! Each call is synchronous, owns its own file handles and buffers, and shares
//! nothing with other calls, so independent files can be processed from
//! separate threads without coordination.
//!
//! On failure the partially written output is left in place. Removing it is
//! the caller's job.

use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use tracing::{debug, info, instrument};

use crate::cipher::{self, Credential, KeySource};
use crate::config::{DEFAULT_CHUNK_SIZE, DEFAULT_MIME};
use crate::error::{Error, Result};
use crate::frame;
use crate::header::{Deserializer, Header};
use crate::stream::{Decryptor, Encryptor};
use crate::types::{DecryptOutcome, EncryptOutcome, Progress};

/// Parameters of an encryption run.
#[derive(Debug)]
pub struct EncryptOptions {
    /// Name recorded in the header. Defaults to the input's file name.
    pub name: Option<String>,

    /// MIME type recorded in the header. Defaults to `application/octet-stream`.
    pub mime: Option<String>,

    /// Key regime and its inputs.
    pub key: KeySource,

    /// Plaintext bytes per chunk.
    pub chunk_size: u32,
}

impl EncryptOptions {
    /// Raw mode with a freshly generated share key.
    #[must_use]
    pub fn raw() -> Self {
        Self::with_key(KeySource::random())
    }

    /// Raw mode reusing an existing share key.
    #[must_use]
    pub fn raw_with_key(share_key: impl Into<String>) -> Self {
        Self::with_key(KeySource::share_key(share_key))
    }

    /// Passphrase mode with default iterations and strength policy.
    #[must_use]
    pub fn passphrase(passphrase: crate::secret::Passphrase) -> Self {
        Self::with_key(KeySource::passphrase(passphrase))
    }

    #[must_use]
    pub fn with_key(key: KeySource) -> Self {
        Self { name: None, mime: None, key, chunk_size: DEFAULT_CHUNK_SIZE }
    }

    #[must_use]
    pub fn chunk_size(mut self, chunk_size: u32) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }

    /// Overrides the PBKDF2 iteration count. No effect in raw mode.
    #[must_use]
    pub fn iterations(mut self, iterations: u32) -> Self {
        if let KeySource::Passphrase { iterations: current, .. } = &mut self.key {
            *current = iterations;
        }
        self
    }

    /// Overrides the minimum passphrase length. No effect in raw mode.
    #[must_use]
    pub fn min_passphrase_length(mut self, min_length: usize) -> Self {
        if let KeySource::Passphrase { min_length: current, .. } = &mut self.key {
            *current = min_length;
        }
        self
    }
}

/// Encrypts `input` into a new container at `output`.
///
/// # Errors
///
/// - `NotAFile` if `input` is not a regular file
/// - `SameFile` if `output` is `input`
/// - `InvalidKey` / `WeakPassphrase` from key resolution
/// - `InvalidChunkSize` / `TooManyChunks` for an unusable chunk size
/// - `Io` for any filesystem failure, including the input shrinking mid-run
#[instrument(skip_all, fields(input = %input.display(), output = %output.display()))]
pub fn encrypt(input: &Path, output: &Path, options: &EncryptOptions, progress: &dyn Progress) -> Result<EncryptOutcome> {
    let metadata = fs::metadata(input).map_err(|_| Error::NotAFile(input.to_path_buf()))?;
    if !metadata.is_file() {
        return Err(Error::NotAFile(input.to_path_buf()));
    }

    ensure_distinct(input, output)?;

    let file_size = metadata.len();
    frame::check_geometry(file_size, options.chunk_size)?;

    let resolved = cipher::resolve(&options.key)?;
    let iv = cipher::derive::random_bytes()?;

    let name = options.name.clone().unwrap_or_else(|| input.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default());
    let mime = options.mime.clone().unwrap_or_else(|| DEFAULT_MIME.to_owned());
    let header = Header::new(file_size, options.chunk_size, name, mime, iv, resolved.key_mode, resolved.kdf);

    let encryptor = Encryptor::new(&resolved.key, header)?;

    let reader = BufReader::new(File::open(input)?);
    let writer = BufWriter::new(create_output(output)?);
    let written = encryptor.run(reader, writer, progress)?;

    info!(key_mode = %resolved.key_mode, file_size, container_size = written, "container written");

    Ok(EncryptOutcome { key_mode: resolved.key_mode, share_key: resolved.share_key, header: encryptor.into_header() })
}

/// Decrypts the container at `input` into `output`.
///
/// # Errors
///
/// - `BadFormat` / `UnsupportedVersion` for a file that is not a readable container
/// - `SameFile` if `output` is `input`
/// - `PassphraseRequired` / `KeyRequired` / `InvalidKey` for an unusable credential
/// - `TruncatedContainer` if the file ends before the last frame, checked
///   against the file length before any output is created
/// - `AuthenticationFailed` on the first chunk whose tag does not verify
/// - `Io` for filesystem failures
#[instrument(skip_all, fields(input = %input.display(), output = %output.display()))]
pub fn decrypt(input: &Path, output: &Path, credential: &Credential, progress: &dyn Progress) -> Result<DecryptOutcome> {
    let mut reader = BufReader::new(File::open(input)?);
    let parsed = Deserializer::deserialize(&mut reader)?;
    let header = parsed.header();

    debug!(key_mode = %header.key_mode, chunks = header.chunk_count(), "header parsed");

    ensure_distinct(input, output)?;
    let available = reader.get_ref().metadata()?.len();
    frame::check_available(parsed.block_len(), header.file_size, header.chunk_size, available)?;

    let key = cipher::recover(header, credential)?;
    let decryptor = Decryptor::new(&key, header)?;

    let writer = BufWriter::new(create_output(output)?);
    let written = decryptor.run(reader, writer, progress)?;

    info!(file_size = written, "container decrypted");

    let header = parsed.into_header();
    Ok(DecryptOutcome { name: header.name, mime: header.mime, file_size: header.file_size })
}

/// Reads and validates the header of a container without decrypting anything.
#[instrument(skip_all, fields(input = %input.display()))]
pub fn inspect(input: &Path) -> Result<Header> {
    let reader = BufReader::new(File::open(input)?);
    Ok(Deserializer::deserialize(reader)?.into_header())
}

/// Rejects an `output` that names the same file as `input`, through any path.
fn ensure_distinct(input: &Path, output: &Path) -> Result<()> {
    if !output.exists() {
        return Ok(());
    }

    if fs::canonicalize(input)? == fs::canonicalize(output)? {
        return Err(Error::SameFile(output.to_path_buf()));
    }

    Ok(())
}

fn create_output(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    Ok(OpenOptions::new().write(true).create(true).truncate(true).open(path)?)
}
