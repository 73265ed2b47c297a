use std::io::{ErrorKind, Read};

use crate::config::{DEFAULT_CHUNK_SIZE, TAG_SIZE};
use crate::error::{Error, Result};
use crate::frame::ChunkSpec;
use crate::header::deserializer::read_full;

/// Reads plaintext chunks or ciphertext frames into one reusable buffer.
///
/// A run never holds more than one chunk in memory. Up to the default chunk
/// size is reserved up front; frames grow the buffer only as bytes actually
/// arrive, so a header announcing huge chunks cannot force a huge allocation.
pub struct ChunkReader<R> {
    inner: R,
    buffer: Vec<u8>,
}

impl<R: Read> ChunkReader<R> {
    pub fn new(inner: R, largest_chunk: usize) -> Self {
        let reserve = largest_chunk.min(DEFAULT_CHUNK_SIZE as usize).saturating_add(TAG_SIZE);
        Self { inner, buffer: Vec::with_capacity(reserve) }
    }

    /// Reads the plaintext of one chunk.
    ///
    /// # Errors
    ///
    /// `Io(UnexpectedEof)` if the input ends early, which means the file
    /// shrank after its size was recorded in the header.
    pub fn read_plaintext(&mut self, spec: ChunkSpec) -> Result<&mut [u8]> {
        self.buffer.resize(spec.plaintext_len, 0);

        let found = read_full(&mut self.inner, &mut self.buffer)?;
        if found < spec.plaintext_len {
            let message = format!("input ended at chunk {}: expected {} bytes, read {found}", spec.index, spec.plaintext_len);
            return Err(Error::Io(std::io::Error::new(ErrorKind::UnexpectedEof, message)));
        }

        Ok(&mut self.buffer)
    }

    /// Reads one frame and splits it into `(ciphertext, tag)`.
    ///
    /// # Errors
    ///
    /// `TruncatedContainer` when fewer than `plaintext_len + 16` bytes remain.
    pub fn read_frame(&mut self, spec: ChunkSpec) -> Result<(&mut [u8], &[u8])> {
        let expected = spec.plaintext_len as u64 + TAG_SIZE as u64;

        self.buffer.clear();
        let found = (&mut self.inner).take(expected).read_to_end(&mut self.buffer)? as u64;
        if found < expected {
            return Err(Error::TruncatedContainer { chunk: Some(u64::from(spec.index)), expected, found });
        }

        let (ciphertext, tag) = self.buffer.split_at_mut(spec.plaintext_len);
        Ok((ciphertext, &*tag))
    }

    /// Returns true if any byte follows the last frame. Consumes at most one byte.
    pub fn has_trailing(&mut self) -> Result<bool> {
        let mut byte = [0u8; 1];
        Ok(read_full(&mut self.inner, &mut byte)? > 0)
    }
}
