use std::io::{Read, Write};

use tracing::{debug, trace, warn};

use crate::cipher::ChunkCipher;
use crate::error::Result;
use crate::frame;
use crate::header::Header;
use crate::secret::SecretKey;
use crate::stream::reader::ChunkReader;
use crate::stream::writer::ChunkWriter;
use crate::types::Progress;

/// Streams container frames back to plaintext.
///
/// Plaintext of a chunk is only written after its tag verified, but earlier
/// chunks may already be on disk when a later one fails. Callers must discard
/// the output of a failed run.
pub struct Decryptor<'h> {
    cipher: ChunkCipher,
    header: &'h Header,
}

impl<'h> Decryptor<'h> {
    pub fn new(key: &SecretKey, header: &'h Header) -> Result<Self> {
        let cipher = ChunkCipher::new(key, header.iv)?;
        Ok(Self { cipher, header })
    }

    /// Decrypts every frame of `input`, which must be positioned just past the
    /// header block. Returns the number of plaintext bytes written.
    pub fn run<R: Read, W: Write>(&self, input: R, output: W, progress: &dyn Progress) -> Result<u64> {
        let mut reader = ChunkReader::new(input, frame::chunk_plaintext_len(0, self.header.file_size, self.header.chunk_size));
        let mut writer = ChunkWriter::new(output);

        let frames = self.header.frames()?;
        debug!(chunks = frames.total(), file_size = self.header.file_size, chunk_size = self.header.chunk_size, "decrypting container");

        for spec in frames {
            let (ciphertext, tag) = reader.read_frame(spec)?;
            self.cipher.open(spec.index, ciphertext, tag)?;
            writer.write_bytes(ciphertext)?;

            trace!(chunk = spec.index, bytes = spec.plaintext_len, "opened chunk");
            progress.advance(spec.plaintext_len as u64);
        }

        if reader.has_trailing()? {
            warn!("ignoring trailing bytes after the last frame");
        }

        let written = writer.written();
        writer.finish()?;

        Ok(written)
    }
}
