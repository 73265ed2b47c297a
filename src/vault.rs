//! Local inventory of containers this machine has produced.
//!
//! A vault remembers where a container lives and how it was keyed, never the
//! key itself. Losing the share key or passphrase still loses the data.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cipher::derive::random_bytes;
use crate::config::VAULT_ID_SIZE;
use crate::encoding;
use crate::types::{EncryptOutcome, KeyMode};

/// One container entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultRecord {
    pub id: String,
    pub name: String,
    pub original_size: u64,
    pub container: PathBuf,
    pub key_mode: KeyMode,
    pub passphrase_required: bool,
    pub created_at: u64,
}

impl VaultRecord {
    /// Builds a record with a fresh id for a container written to `container`.
    pub fn from_outcome(outcome: &EncryptOutcome, container: &Path) -> Result<Self> {
        let id: [u8; VAULT_ID_SIZE] = random_bytes().context("failed to generate vault id")?;

        Ok(Self {
            id: encoding::encode(id),
            name: outcome.header.name.clone(),
            original_size: outcome.header.file_size,
            container: container.to_path_buf(),
            key_mode: outcome.key_mode,
            passphrase_required: outcome.key_mode == KeyMode::Passphrase,
            created_at: outcome.header.created_at,
        })
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct VaultFile {
    records: Vec<VaultRecord>,
}

/// A JSON file of [`VaultRecord`]s keyed by id.
#[derive(Debug)]
pub struct Vault {
    path: PathBuf,
    records: BTreeMap<String, VaultRecord>,
}

impl Vault {
    /// Loads the vault at `path`. A missing file is an empty vault.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let file = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice::<VaultFile>(&bytes).with_context(|| format!("failed to parse vault: {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => VaultFile::default(),
            Err(e) => return Err(e).with_context(|| format!("failed to read vault: {}", path.display())),
        };

        let records = file.records.into_iter().map(|r| (r.id.clone(), r)).collect();
        Ok(Self { path, records })
    }

    /// Adds `record`, replacing any record with the same id.
    pub fn insert(&mut self, record: VaultRecord) -> Option<VaultRecord> {
        self.records.insert(record.id.clone(), record)
    }

    pub fn get(&self, id: &str) -> Option<&VaultRecord> {
        self.records.get(id)
    }

    pub fn remove(&mut self, id: &str) -> Option<VaultRecord> {
        self.records.remove(id)
    }

    /// Records ordered by creation time, oldest first.
    pub fn records(&self) -> Vec<&VaultRecord> {
        let mut records: Vec<_> = self.records.values().collect();
        records.sort_by_key(|r| (r.created_at, r.id.as_str()));
        records
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the vault to a sibling temp file and renames it into place.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| format!("failed to create directory: {}", parent.display()))?;
        }

        let file = VaultFile { records: self.records().into_iter().cloned().collect() };
        let json = serde_json::to_vec_pretty(&file).context("failed to serialize vault")?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, json).with_context(|| format!("failed to write vault: {}", tmp.display()))?;
        fs::rename(&tmp, &self.path).with_context(|| format!("failed to replace vault: {}", self.path.display()))?;

        Ok(())
    }
}
