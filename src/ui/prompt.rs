//! Interactive prompts.
//!
//! Only reached when a credential was not given on the command line.

use anyhow::{Result, anyhow};
use inquire::validator::Validation;
use inquire::{CustomUserError, Password, PasswordDisplayMode, min_length};

use crate::secret::Passphrase;

pub struct Prompt {
    /// Minimum passphrase length for new containers, after trimming.
    passphrase_min_length: usize,
}

impl Prompt {
    pub const fn new(passphrase_min_length: usize) -> Self {
        Self { passphrase_min_length }
    }

    /// Asks for a new passphrase twice. The strength check mirrors the one the
    /// engine applies, so a weak passphrase is caught before any work starts.
    pub fn prompt_encryption_passphrase(&self) -> Result<Passphrase> {
        let min = self.passphrase_min_length.max(1);

        Password::new("Enter encryption passphrase:")
            .with_display_mode(PasswordDisplayMode::Masked)
            .with_custom_confirmation_message("Confirm passphrase:")
            .with_custom_confirmation_error_message("passphrases do not match")
            .with_validator(move |input: &str| -> std::result::Result<Validation, CustomUserError> {
                if input.trim().chars().count() < min {
                    return Ok(Validation::Invalid(format!("passphrase must be at least {min} characters long").into()));
                }
                Ok(Validation::Valid)
            })
            .prompt()
            .map(Passphrase::from_string)
            .map_err(|e| anyhow!("passphrase input failed: {e}"))
    }

    pub fn prompt_decryption_passphrase(&self) -> Result<Passphrase> {
        Password::new("Enter decryption passphrase:")
            .with_display_mode(PasswordDisplayMode::Masked)
            .without_confirmation()
            .with_validator(min_length!(1, "passphrase cannot be empty"))
            .prompt()
            .map(Passphrase::from_string)
            .map_err(|e| anyhow!("passphrase input failed: {e}"))
    }

    /// Asks for a share key, accepting the bare key or a `#k=` fragment.
    pub fn prompt_share_key(&self) -> Result<String> {
        let input = Password::new("Enter share key:")
            .with_display_mode(PasswordDisplayMode::Masked)
            .without_confirmation()
            .with_validator(min_length!(1, "share key cannot be empty"))
            .prompt()
            .map_err(|e| anyhow!("share key input failed: {e}"))?;

        Ok(strip_fragment(&input).to_owned())
    }
}

/// Accepts `#k=KEY`, `k=KEY` or `KEY`.
pub fn strip_fragment(input: &str) -> &str {
    let input = input.trim();
    let input = input.strip_prefix('#').unwrap_or(input);
    input.strip_prefix("k=").unwrap_or(input)
}
