//! Per-chunk nonce derivation.
//!
//! Nonces are never stored. Chunk `i` uses the header's base IV with its last
//! four bytes, read as a big-endian counter, advanced by `i` modulo `2^32`.
//! The first eight bytes are left untouched. Decryptors in other languages
//! reproduce exactly this arithmetic, so it must not be replaced by anything
//! "equivalent".

use crate::config::{IV_COUNTER_OFFSET, IV_SIZE};

/// Derives the nonce for chunk `index` from the container's base IV.
#[inline]
#[must_use]
pub fn chunk_nonce(base_iv: &[u8; IV_SIZE], index: u32) -> [u8; IV_SIZE] {
    let mut nonce = *base_iv;
    let mut counter = [0u8; 4];
    counter.copy_from_slice(&base_iv[IV_COUNTER_OFFSET..]);

    let counter = u32::from_be_bytes(counter).wrapping_add(index);
    nonce[IV_COUNTER_OFFSET..].copy_from_slice(&counter.to_be_bytes());

    nonce
}
