use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use clap::{ArgAction, Parser, Subcommand};
use tracing::Level;

use crate::cipher::{Credential, KeySource};
use crate::config::{APP_NAME, DEFAULT_CHUNK_SIZE, DEFAULT_KDF_ITERATIONS, FILE_EXTENSION, PASSPHRASE_MIN_LENGTH};
use crate::error::Error;
use crate::header::Header;
use crate::processor::{self, EncryptOptions};
use crate::secret::Passphrase;
use crate::types::{KeyMode, Processing};
use crate::ui::display;
use crate::ui::progress::Bar;
use crate::ui::prompt::{Prompt, strip_fragment};
use crate::vault::{Vault, VaultRecord};

#[derive(Subcommand)]
pub enum Commands {
    /// Encrypt a file into a container.
    Encrypt {
        #[arg(short, long)]
        input: PathBuf,

        /// Defaults to the input path with `.fszk` appended.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Key regime. Defaults to passphrase when `--passphrase` is given, raw otherwise.
        #[arg(short, long)]
        mode: Option<KeyMode>,

        /// Reuse an existing share key instead of generating one.
        #[arg(short, long)]
        key: Option<String>,

        #[arg(short, long)]
        passphrase: Option<String>,

        #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: u32,

        #[arg(long, default_value_t = DEFAULT_KDF_ITERATIONS)]
        iterations: u32,

        #[arg(long, default_value_t = PASSPHRASE_MIN_LENGTH)]
        min_passphrase: usize,

        /// Name recorded in the header. Defaults to the input file name.
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        mime: Option<String>,

        /// Record the new container in this vault file.
        #[arg(long)]
        vault: Option<PathBuf>,

        #[arg(short, long)]
        force: bool,
    },

    /// Decrypt a container.
    Decrypt {
        #[arg(short, long)]
        input: PathBuf,

        /// Defaults to the input path without `.fszk`, or the recorded name next to it.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Share key, bare or as a `#k=` fragment.
        #[arg(short, long)]
        key: Option<String>,

        #[arg(short, long)]
        passphrase: Option<String>,

        #[arg(short, long)]
        force: bool,
    },

    /// Show a container's header without decrypting it.
    Inspect {
        #[arg(short, long)]
        input: PathBuf,
    },

    /// List the containers recorded in a vault.
    Vault {
        #[arg(long)]
        vault: PathBuf,
    },
}

#[derive(Parser)]
#[command(name = APP_NAME, version, about = "Stream files into zero-knowledge containers using chunked AES-256-GCM.")]
pub struct App {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

impl App {
    pub fn init() -> Result<Self> {
        let app = Self::parse();

        let subscriber = tracing_subscriber::fmt().with_max_level(log_level(app.verbose)).with_writer(std::io::stderr).with_file(true).with_line_number(true).finish();
        tracing::subscriber::set_global_default(subscriber)?;

        Ok(app)
    }

    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Encrypt { input, output, mode, key, passphrase, chunk_size, iterations, min_passphrase, name, mime, vault, force } => {
                let output = output.unwrap_or_else(|| encrypted_output_path(&input));
                ensure_writable(&output, force)?;

                let source = key_source(mode, key, passphrase, min_passphrase)?;
                let mut options = EncryptOptions::with_key(source).chunk_size(chunk_size).iterations(iterations).min_passphrase_length(min_passphrase);
                options.name = name;
                options.mime = mime;

                Self::encrypt(input, output, options, vault).await
            }
            Commands::Decrypt { input, output, key, passphrase, force } => {
                let header = processor::inspect(&input).with_context(|| format!("cannot read container: {}", input.display()))?;

                let output = output.unwrap_or_else(|| decrypted_output_path(&input, &header));
                ensure_writable(&output, force)?;

                let credential = credential(&header, key, passphrase)?;
                Self::decrypt(input, output, credential, header.file_size).await
            }
            Commands::Inspect { input } => {
                let header = processor::inspect(&input).with_context(|| format!("cannot read container: {}", input.display()))?;
                display::show_header(&header);
                Ok(())
            }
            Commands::Vault { vault } => {
                let vault = Vault::open(vault)?;
                display::show_vault(&vault.records());
                Ok(())
            }
        }
    }

    async fn encrypt(input: PathBuf, output: PathBuf, options: EncryptOptions, vault: Option<PathBuf>) -> Result<()> {
        let total = fs::metadata(&input).map(|m| m.len()).unwrap_or_default();
        let bar = Bar::new(total, Processing::Encryption.label());
        let task_bar = bar.clone();

        let existed = output.exists();
        let (task_input, task_output) = (input.clone(), output.clone());
        let result = tokio::task::spawn_blocking(move || processor::encrypt(&task_input, &task_output, &options, &task_bar)).await.context("encryption task panicked")?;

        let outcome = finish(result, &bar, &output, existed, Processing::Encryption, &input)?;

        display::show_success(Processing::Encryption, &output);
        if let Some(share_key) = &outcome.share_key {
            display::show_share_key(share_key);
        }

        if let Some(path) = vault {
            let mut vault = Vault::open(path)?;
            vault.insert(VaultRecord::from_outcome(&outcome, &output)?);
            vault.save()?;
            display::show_vault_saved(vault.path());
        }

        Ok(())
    }

    async fn decrypt(input: PathBuf, output: PathBuf, credential: Credential, total: u64) -> Result<()> {
        let bar = Bar::new(total, Processing::Decryption.label());
        let task_bar = bar.clone();

        let existed = output.exists();
        let (task_input, task_output) = (input.clone(), output.clone());
        let result = tokio::task::spawn_blocking(move || processor::decrypt(&task_input, &task_output, &credential, &task_bar)).await.context("decryption task panicked")?;

        finish(result, &bar, &output, existed, Processing::Decryption, &input)?;
        display::show_success(Processing::Decryption, &output);

        Ok(())
    }
}

/// Settles a finished engine run. A failed run's output is removed when
/// [`discard_output`] says so.
fn finish<T>(result: crate::error::Result<T>, bar: &Bar, output: &Path, existed: bool, processing: Processing, input: &Path) -> Result<T> {
    match result {
        Ok(value) => {
            bar.finish();
            Ok(value)
        }
        Err(err) => {
            bar.abandon();
            if discard_output(&err, existed) && output.exists() && fs::remove_file(output).is_ok() {
                display::show_partial_removed(output);
            }
            Err(explain(anyhow::Error::from(err))).with_context(|| format!("{} failed: {}", processing, input.display()))
        }
    }
}

/// A failed run's output is removed if this run created it. A file that was
/// already there is only removed once it holds plaintext from a container that
/// failed to authenticate; any earlier failure leaves it untouched.
fn discard_output(err: &Error, existed: bool) -> bool {
    match err {
        Error::SameFile(_) => false,
        Error::AuthenticationFailed { .. } => true,
        _ => !existed,
    }
}

/// Rewrites authentication failures into the message users can act on.
fn explain(err: anyhow::Error) -> anyhow::Error {
    match err.downcast_ref::<Error>() {
        Some(Error::AuthenticationFailed { chunk }) => anyhow!("wrong key or passphrase, or the container is corrupted (chunk {chunk} failed to authenticate)"),
        _ => err,
    }
}

fn ensure_writable(output: &Path, force: bool) -> Result<()> {
    if output.exists() && !force {
        bail!("output file already exists: {} (use --force to overwrite)", output.display());
    }
    Ok(())
}

fn key_source(mode: Option<KeyMode>, key: Option<String>, passphrase: Option<String>, min_passphrase: usize) -> Result<KeySource> {
    let mode = mode.unwrap_or(if passphrase.is_some() { KeyMode::Passphrase } else { KeyMode::Raw });

    match mode {
        KeyMode::Raw => {
            if passphrase.is_some() {
                bail!("--passphrase cannot be used in raw mode");
            }
            Ok(KeySource::Raw { share_key: key.map(|k| strip_fragment(&k).to_owned()) })
        }
        KeyMode::Passphrase => {
            if key.is_some() {
                bail!("--key cannot be used in passphrase mode");
            }
            let passphrase = match passphrase {
                Some(passphrase) => Passphrase::from_string(passphrase),
                None => Prompt::new(min_passphrase).prompt_encryption_passphrase()?,
            };
            Ok(KeySource::passphrase(passphrase))
        }
    }
}

fn credential(header: &Header, key: Option<String>, passphrase: Option<String>) -> Result<Credential> {
    let prompt = Prompt::new(PASSPHRASE_MIN_LENGTH);

    // A credential of the wrong kind is passed through so the engine reports the mismatch.
    Ok(match (key, passphrase) {
        (Some(key), _) => Credential::ShareKey(strip_fragment(&key).to_owned()),
        (None, Some(passphrase)) => Credential::Passphrase(Passphrase::from_string(passphrase)),
        (None, None) => match header.key_mode {
            KeyMode::Raw => Credential::ShareKey(prompt.prompt_share_key()?),
            KeyMode::Passphrase => Credential::Passphrase(prompt.prompt_decryption_passphrase()?),
        },
    })
}

const fn log_level(verbose: u8) -> Level {
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn encrypted_output_path(input: &Path) -> PathBuf {
    with_suffix(input, FILE_EXTENSION)
}

/// The header's name is untrusted, so only its final component is used and
/// the result always lands next to the container. Never returns `input`.
fn decrypted_output_path(input: &Path, header: &Header) -> PathBuf {
    if let Some(stem) = input.to_str().and_then(|s| s.strip_suffix(FILE_EXTENSION)).filter(|s| !s.is_empty() && !s.ends_with(std::path::MAIN_SEPARATOR)) {
        return PathBuf::from(stem);
    }

    match Path::new(&header.name).file_name() {
        Some(name) if input.file_name() != Some(name) => input.with_file_name(name),
        _ => with_suffix(input, ".out"),
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut path = path.as_os_str().to_owned();
    path.push(suffix);
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    fn header(name: &str) -> Header {
        Header::new(0, 16, name, "application/octet-stream", [0; 12], KeyMode::Raw, None)
    }

    #[test]
    fn test_cli_definition() {
        App::command().debug_assert();
    }

    #[test]
    fn test_parse_encrypt() {
        let app = App::try_parse_from(["fszk", "-vv", "encrypt", "-i", "a.txt", "--chunk-size", "1024", "--vault", "v.json"]).unwrap();
        assert_eq!(app.verbose, 2);

        let Commands::Encrypt { input, chunk_size, vault, mode, .. } = app.command else { panic!("expected encrypt") };
        assert_eq!(input, PathBuf::from("a.txt"));
        assert_eq!(chunk_size, 1024);
        assert_eq!(vault, Some(PathBuf::from("v.json")));
        assert_eq!(mode, None);
    }

    #[test]
    fn test_parse_mode() {
        let app = App::try_parse_from(["fszk", "encrypt", "-i", "a", "--mode", "passphrase"]).unwrap();
        let Commands::Encrypt { mode, .. } = app.command else { panic!("expected encrypt") };
        assert_eq!(mode, Some(KeyMode::Passphrase));

        assert!(App::try_parse_from(["fszk", "encrypt", "-i", "a", "--mode", "argon"]).is_err());
    }

    #[test]
    fn test_log_levels() {
        assert_eq!(log_level(0), Level::WARN);
        assert_eq!(log_level(1), Level::INFO);
        assert_eq!(log_level(9), Level::TRACE);
    }

    #[test]
    fn test_output_paths() {
        assert_eq!(encrypted_output_path(Path::new("dir/a.txt")), PathBuf::from("dir/a.txt.fszk"));
        assert_eq!(decrypted_output_path(Path::new("dir/a.txt.fszk"), &header("ignored")), PathBuf::from("dir/a.txt"));
        assert_eq!(decrypted_output_path(Path::new("dir/blob"), &header("report.pdf")), PathBuf::from("dir/report.pdf"));
        assert_eq!(decrypted_output_path(Path::new("dir/blob"), &header("../../etc/passwd")), PathBuf::from("dir/passwd"));
        assert_eq!(decrypted_output_path(Path::new("dir/blob"), &header("")), PathBuf::from("dir/blob.out"));
    }

    #[test]
    fn test_decrypted_output_never_the_container() {
        let input = Path::new("dir/report.pdf");
        let output = decrypted_output_path(input, &header("report.pdf"));
        assert_ne!(output, input);
        assert_eq!(output, PathBuf::from("dir/report.pdf.out"));

        assert_eq!(decrypted_output_path(Path::new("report.pdf"), &header("../x/report.pdf")), PathBuf::from("report.pdf.out"));
    }

    #[test]
    fn test_discard_output_spares_existing_files() {
        let same = Error::SameFile(PathBuf::from("a"));
        assert!(!discard_output(&same, true));
        assert!(!discard_output(&same, false));

        assert!(!discard_output(&Error::PassphraseRequired, true));
        assert!(!discard_output(&Error::InvalidChunkSize, true));
        assert!(discard_output(&Error::InvalidChunkSize, false));

        assert!(discard_output(&Error::AuthenticationFailed { chunk: 0 }, true));
        assert!(discard_output(&Error::AuthenticationFailed { chunk: 0 }, false));
    }

    #[test]
    fn test_key_source_mode_conflicts() {
        assert!(key_source(Some(KeyMode::Raw), None, Some("secret".into()), 4).is_err());
        assert!(key_source(Some(KeyMode::Passphrase), Some("k".into()), Some("secret".into()), 4).is_err());
        assert!(matches!(key_source(None, None, Some("secret".into()), 4).unwrap(), KeySource::Passphrase { .. }));
        assert!(matches!(key_source(None, Some("#k=abc".into()), None, 4).unwrap(), KeySource::Raw { share_key: Some(k) } if k == "abc"));
    }

    #[test]
    fn test_explain_authentication_failure() {
        let err = explain(anyhow::Error::from(Error::AuthenticationFailed { chunk: 2 }));
        assert!(err.to_string().contains("wrong key or passphrase"));

        let err = explain(anyhow::Error::from(Error::KeyRequired));
        assert!(err.downcast_ref::<Error>().is_some());
    }

    #[test]
    fn test_refuses_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exists");
        fs::write(&path, b"x").unwrap();

        assert!(ensure_writable(&path, false).is_err());
        assert!(ensure_writable(&path, true).is_ok());
        assert!(ensure_writable(&dir.path().join("new"), false).is_ok());
    }
}
