use crate::config::{FORMAT_VERSION, MAGIC_BYTES, MAX_HEADER_LENGTH, PRELUDE_SIZE};
use crate::error::{Error, Result};
use crate::header::Header;

/// Serializes a header into its on-disk block: prelude followed by JSON.
///
/// # Errors
///
/// `BadFormat` if the JSON would exceed the header length bound that
/// readers enforce.
pub fn serialize(header: &Header) -> Result<Vec<u8>> {
    let json = serde_json::to_vec(header)?;
    let length = u32::try_from(json.len()).ok().filter(|len| *len <= MAX_HEADER_LENGTH).ok_or_else(|| Error::BadFormat(format!("header too large: {} bytes", json.len())))?;

    let mut block = Vec::with_capacity(PRELUDE_SIZE + json.len());
    block.extend_from_slice(&MAGIC_BYTES);
    block.push(FORMAT_VERSION);
    block.extend_from_slice(&length.to_be_bytes());
    block.extend_from_slice(&json);

    Ok(block)
}
