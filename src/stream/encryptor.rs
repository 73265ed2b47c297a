use std::io::{Read, Write};

use tracing::{debug, trace};

use crate::cipher::ChunkCipher;
use crate::error::Result;
use crate::frame;
use crate::header::{Header, serializer};
use crate::secret::SecretKey;
use crate::stream::reader::ChunkReader;
use crate::stream::writer::ChunkWriter;
use crate::types::Progress;

/// Streams plaintext into a container.
pub struct Encryptor {
    cipher: ChunkCipher,
    header: Header,
}

impl Encryptor {
    /// Prepares a run for `header`, whose geometry must already be valid.
    pub fn new(key: &SecretKey, header: Header) -> Result<Self> {
        header.validate()?;
        let cipher = ChunkCipher::new(key, header.iv)?;
        Ok(Self { cipher, header })
    }

    /// Writes the header block, then one frame per chunk of `input`.
    ///
    /// Exactly `fileSize` bytes are consumed from `input`. Returns the number
    /// of container bytes written.
    pub fn run<R: Read, W: Write>(&self, input: R, output: W, progress: &dyn Progress) -> Result<u64> {
        let mut reader = ChunkReader::new(input, frame::chunk_plaintext_len(0, self.header.file_size, self.header.chunk_size));
        let mut writer = ChunkWriter::new(output);

        writer.write_bytes(&serializer::serialize(&self.header)?)?;

        let frames = self.header.frames()?;
        debug!(chunks = frames.total(), file_size = self.header.file_size, chunk_size = self.header.chunk_size, "encrypting container");

        for spec in frames {
            let plaintext = reader.read_plaintext(spec)?;
            let tag = self.cipher.seal(spec.index, plaintext)?;
            writer.write_frame(plaintext, &tag)?;

            trace!(chunk = spec.index, bytes = spec.plaintext_len, "sealed chunk");
            progress.advance(spec.plaintext_len as u64);
        }

        let written = writer.written();
        writer.finish()?;

        Ok(written)
    }

    #[inline]
    pub fn into_header(self) -> Header {
        self.header
    }
}
