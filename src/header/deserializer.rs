//! Header deserialization.
//!
//! # Process
//!
//! 1. Read the 9-byte prelude and check magic, version and length bound
//! 2. Read exactly `length` bytes of JSON
//! 3. Parse and validate the header
//!
//! After a successful call the reader is positioned on the first chunk frame.

use std::io::{ErrorKind, Read};

use crate::config::{FORMAT_VERSION, MAGIC_BYTES, MAX_HEADER_LENGTH, PRELUDE_SIZE};
use crate::error::{Error, Result};
use crate::header::Header;

/// A header together with the size of its on-disk block.
#[derive(Debug, Clone)]
pub struct ParsedHeader {
    header: Header,
    block_len: u64,
}

impl ParsedHeader {
    #[inline]
    #[must_use]
    pub const fn header(&self) -> &Header {
        &self.header
    }

    #[inline]
    #[must_use]
    pub fn into_header(self) -> Header {
        self.header
    }

    /// Prelude plus JSON length; the offset of the first frame.
    #[inline]
    #[must_use]
    pub const fn block_len(&self) -> u64 {
        self.block_len
    }
}

/// Reads container headers.
pub struct Deserializer;

impl Deserializer {
    /// Reads and validates a header from the start of a container.
    ///
    /// # Errors
    ///
    /// - `BadFormat`: short prelude, wrong magic, oversized or malformed JSON
    /// - `UnsupportedVersion`: version byte other than 1
    /// - `TruncatedContainer`: the JSON block is cut short
    pub fn deserialize<R: Read>(mut reader: R) -> Result<ParsedHeader> {
        let mut prelude = [0u8; PRELUDE_SIZE];
        let found = read_full(&mut reader, &mut prelude)?;
        if found < MAGIC_BYTES.len() || prelude[..MAGIC_BYTES.len()] != MAGIC_BYTES {
            return Err(Error::BadFormat("bad magic".into()));
        }
        if found < PRELUDE_SIZE {
            return Err(Error::BadFormat(format!("prelude too short: {found} bytes")));
        }

        let version = prelude[4];
        if version != FORMAT_VERSION {
            return Err(Error::UnsupportedVersion(version));
        }

        let length = u32::from_be_bytes([prelude[5], prelude[6], prelude[7], prelude[8]]);
        if length > MAX_HEADER_LENGTH {
            return Err(Error::BadFormat(format!("header length {length} exceeds {MAX_HEADER_LENGTH}")));
        }

        let mut json = vec![0u8; length as usize];
        let found = read_full(&mut reader, &mut json)?;
        if found < json.len() {
            return Err(Error::TruncatedContainer { chunk: None, expected: u64::from(length), found: found as u64 });
        }

        let header: Header = serde_json::from_slice(&json)?;
        header.validate()?;

        Ok(ParsedHeader { header, block_len: PRELUDE_SIZE as u64 + u64::from(length) })
    }
}

/// Reads until `buffer` is full or the input ends, returning the bytes read.
pub(crate) fn read_full<R: Read>(reader: &mut R, buffer: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buffer.len() {
        match reader.read(&mut buffer[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(Error::Io(e)),
        }
    }
    Ok(filled)
}
