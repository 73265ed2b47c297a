//! Chunk framing shared by the encryption and decryption engines.
//!
//! Frames carry no length prefix. Their boundaries follow purely from the
//! header's `fileSize` and `chunkSize`, so both engines must compute them with
//! the same functions:
//!
//! ```text
//! chunks   = ceil(fileSize / chunkSize)
//! len(i)   = chunkSize, except the last chunk which holds the remainder
//! frame(i) = len(i) + 16
//! ```

use crate::config::{MAX_CHUNK_COUNT, TAG_SIZE};
use crate::error::{Error, Result};

/// Number of chunks needed for `file_size` plaintext bytes.
///
/// A zero-byte file has zero chunks.
#[inline]
#[must_use]
pub const fn chunk_count(file_size: u64, chunk_size: u32) -> u64 {
    if chunk_size == 0 {
        return 0;
    }
    file_size.div_ceil(chunk_size as u64)
}

/// Plaintext length of chunk `index`, or zero past the end of the file.
#[inline]
#[must_use]
pub fn chunk_plaintext_len(index: u64, file_size: u64, chunk_size: u32) -> usize {
    let offset = index.saturating_mul(u64::from(chunk_size));
    let remaining = file_size.saturating_sub(offset);

    // Never exceeds chunk_size, which is a u32.
    remaining.min(u64::from(chunk_size)) as usize
}

/// On-disk length of a frame holding `plaintext_len` bytes.
#[inline]
#[must_use]
pub const fn frame_len(plaintext_len: usize) -> usize {
    plaintext_len + TAG_SIZE
}

/// Total container length for a header block of `header_len` bytes.
///
/// Saturates rather than overflowing for hostile geometries.
#[inline]
#[must_use]
pub const fn container_len(header_len: u64, file_size: u64, chunk_size: u32) -> u64 {
    header_len.saturating_add(file_size).saturating_add(chunk_count(file_size, chunk_size).saturating_mul(TAG_SIZE as u64))
}

/// Checks that `available` container bytes can hold every frame the header
/// announces, before any frame buffer is allocated.
///
/// # Errors
///
/// `TruncatedContainer` naming the first frame that cannot be complete, with
/// the same numbers a streaming read would report.
pub fn check_available(header_len: u64, file_size: u64, chunk_size: u32, available: u64) -> Result<()> {
    if available >= container_len(header_len, file_size, chunk_size) {
        return Ok(());
    }

    let full_frame = u64::from(chunk_size) + TAG_SIZE as u64;
    let body = available.saturating_sub(header_len);
    let chunk = body / full_frame;
    let expected = chunk_plaintext_len(chunk, file_size, chunk_size) as u64 + TAG_SIZE as u64;

    Err(Error::TruncatedContainer { chunk: Some(chunk), expected, found: body % full_frame })
}

/// Validates a chunk geometry and returns its chunk count.
pub fn check_geometry(file_size: u64, chunk_size: u32) -> Result<u64> {
    if chunk_size == 0 {
        return Err(Error::InvalidChunkSize);
    }

    let chunks = chunk_count(file_size, chunk_size);
    if chunks > MAX_CHUNK_COUNT {
        return Err(Error::TooManyChunks { chunks });
    }

    Ok(chunks)
}

/// One chunk of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSpec {
    /// Zero-based position, also the nonce counter offset.
    pub index: u32,

    /// Plaintext bytes in this chunk.
    pub plaintext_len: usize,
}

impl ChunkSpec {
    /// Bytes this chunk occupies in the container.
    #[inline]
    #[must_use]
    pub const fn frame_len(&self) -> usize {
        frame_len(self.plaintext_len)
    }
}

/// Iterates over every chunk of a container, in order.
#[derive(Debug, Clone)]
pub struct Frames {
    file_size: u64,
    chunk_size: u32,
    count: u64,
    next: u64,
}

impl Frames {
    /// Plans the chunks of a `file_size`-byte plaintext.
    ///
    /// # Errors
    ///
    /// `InvalidChunkSize` for a zero chunk size, `TooManyChunks` when the chunk
    /// counter would have to wrap.
    pub fn new(file_size: u64, chunk_size: u32) -> Result<Self> {
        let count = check_geometry(file_size, chunk_size)?;
        Ok(Self { file_size, chunk_size, count, next: 0 })
    }

    /// Total number of chunks, independent of how many were already yielded.
    #[inline]
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.count
    }
}

impl Iterator for Frames {
    type Item = ChunkSpec;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.count {
            return None;
        }

        let index = u32::try_from(self.next).ok()?;
        let plaintext_len = chunk_plaintext_len(self.next, self.file_size, self.chunk_size);
        self.next += 1;

        Some(ChunkSpec { index, plaintext_len })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = usize::try_from(self.count - self.next).unwrap_or(usize::MAX);
        (left, Some(left))
    }
}

impl ExactSizeIterator for Frames {}
