//! Streaming engines over `Read`/`Write`.
//!
//! Both engines walk the same [`Frames`](crate::frame::Frames) plan and hold a
//! single chunk buffer, so memory use is bounded by the chunk size no matter
//! how large the file is.

pub mod decryptor;
pub mod encryptor;
pub mod reader;
pub mod writer;

pub use decryptor::Decryptor;
pub use encryptor::Encryptor;
