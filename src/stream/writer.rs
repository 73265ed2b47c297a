//! Chunk writer for streaming output.

use std::io::Write;

use crate::error::Result;

/// Writes header blocks, frames and plaintext in order, counting bytes.
pub struct ChunkWriter<W: Write> {
    inner: W,
    written: u64,
}

impl<W: Write> ChunkWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, written: 0 }
    }

    /// Writes raw bytes (header block or decrypted plaintext).
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner.write_all(bytes)?;
        self.written += bytes.len() as u64;
        Ok(())
    }

    /// Writes one frame: ciphertext immediately followed by its tag.
    pub fn write_frame(&mut self, ciphertext: &[u8], tag: &[u8]) -> Result<()> {
        self.write_bytes(ciphertext)?;
        self.write_bytes(tag)
    }

    #[inline]
    pub const fn written(&self) -> u64 {
        self.written
    }

    /// Flushes and hands back the inner writer.
    pub fn finish(mut self) -> Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_layout() {
        let mut writer = ChunkWriter::new(Vec::new());
        writer.write_bytes(b"HDR").unwrap();
        writer.write_frame(b"cipher", &[0xaa; 16]).unwrap();

        assert_eq!(writer.written(), 3 + 6 + 16);

        let out = writer.finish().unwrap();
        assert_eq!(&out[..9], b"HDRcipher");
        assert_eq!(&out[9..], &[0xaa; 16]);
    }
}
