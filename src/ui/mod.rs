//! Terminal output for the CLI.
//!
//! - [`display`]: success messages, share keys, header and vault tables
//! - [`progress`]: byte progress bar driven by the engines
//! - [`prompt`]: passphrase and share key prompts

pub mod display;
pub mod progress;
pub mod prompt;
