//! Storage layer: in-memory account map mirrored to one JSON file
//!
//! # File layout
//!
//! ```text
//! {
//!   "schema_version": 1,
//!   "accounts": { "<account id>": { ...account with embedded transactions... } }
//! }
//! ```
//!
//! Every mutating call rewrites the whole document. The write goes to a
//! sibling `.tmp` file which is then renamed over the target, so readers of
//! the file never observe a half-written document.
//!
//! # Locking
//!
//! One `RwLock` guards the map and every access to the file. `load` and
//! `list_all` share the read lock; `save` and `save_all` hold the write lock
//! for the whole insert-then-write sequence.

use crate::{
    error::{Error, Result},
    metrics::Metrics,
    types::{Account, AccountId},
    Config,
};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Current on-disk schema version
pub const SCHEMA_VERSION: u32 = 1;


/// Versioned on-disk document (borrowed, for writing; sorted for stable diffs)
#[derive(Serialize)]
struct LedgerFileRef<'a> {
    schema_version: u32,
    accounts: BTreeMap<&'a AccountId, &'a Account>,
}

/// File-backed account store
pub struct Storage {
    path: PathBuf,
    accounts: RwLock<HashMap<AccountId, Account>>,
    metrics: Metrics,
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage")
            .field("path", &self.path)
            .field("accounts", &self.accounts.read().len())
            .finish()
    }
}

impl Storage {
    /// Open the store configured by `config`, creating its directory if needed
    pub fn from_config(config: &Config) -> Result<Self> {
        if let Some(dir) = config.data_file.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        Self::open(&config.data_file)
    }

    /// Open a store backed by `path`.
    ///
    /// A missing file yields an empty store. Any other read or parse
    /// failure is returned.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let accounts = Self::read_file(&path)?;

        let metrics = Metrics::new()
            .map_err(|e| Error::Config(format!("Failed to create metrics: {}", e)))?;
        metrics.accounts.set(accounts.len() as i64);

        tracing::info!(
            path = %path.display(),
            accounts = accounts.len(),
            "Opened account store"
        );

        Ok(Self {
            path,
            accounts: RwLock::new(accounts),
            metrics,
        })
    }

    fn read_file(path: &Path) -> Result<HashMap<AccountId, Account>> {
        let data = match fs::read(path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No backing file, starting empty");
                return Ok(HashMap::new());
            }
            Err(e) => return Err(e.into()),
        };

        if data.iter().all(u8::is_ascii_whitespace) {
            return Ok(HashMap::new());
        }

        let mut document: serde_json::Value = serde_json::from_slice(&data)?;

        // The version decides how the rest is read, so check it before
        // touching the accounts.
        let version = match document.get("schema_version") {
            Some(raw) => raw.as_u64().ok_or_else(|| {
                Error::Persistence(format!(
                    "{} has a non-numeric schema version: {}",
                    path.display(),
                    raw
                ))
            })?,
            None => {
                // Bare id -> account map written before the schema version existed
                let accounts = serde_json::from_value(document)?;
                tracing::info!(
                    path = %path.display(),
                    "Loaded unversioned ledger file, will upgrade on next save"
                );
                return Ok(accounts);
            }
        };

        if version > u64::from(SCHEMA_VERSION) {
            return Err(Error::Persistence(format!(
                "{} has schema version {}, newest supported is {}",
                path.display(),
                version,
                SCHEMA_VERSION
            )));
        }

        let accounts = document
            .get_mut("accounts")
            .map(serde_json::Value::take)
            .ok_or_else(|| {
                Error::Persistence(format!("{} has no accounts section", path.display()))
            })?;
        Ok(serde_json::from_value(accounts)?)
    }

    /// Insert or overwrite `account`, then rewrite the backing file.
    ///
    /// The in-memory map is updated before the write; if the write fails the
    /// map keeps the new state and the error is returned.
    pub fn save(&self, account: &Account) -> Result<()> {
        self.save_all(&[account])
    }

    /// Insert or overwrite every account, then rewrite the backing file once.
    ///
    /// Either all of them reach the file or none of them does.
    pub fn save_all(&self, accounts: &[&Account]) -> Result<()> {
        let mut map = self.accounts.write();
        for account in accounts {
            map.insert(account.id().clone(), (*account).clone());
        }

        let started = Instant::now();
        match self.write_file(&map) {
            Ok(()) => {
                self.metrics
                    .record_save(started.elapsed().as_secs_f64(), map.len());
                tracing::debug!(
                    path = %self.path.display(),
                    saved = accounts.len(),
                    total = map.len(),
                    "Ledger file rewritten"
                );
                Ok(())
            }
            Err(e) => {
                self.metrics.record_save_failure();
                tracing::error!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to rewrite ledger file"
                );
                Err(e)
            }
        }
    }

    fn write_file(&self, map: &HashMap<AccountId, Account>) -> Result<()> {
        let document = LedgerFileRef {
            schema_version: SCHEMA_VERSION,
            accounts: map.iter().collect(),
        };
        let data = serde_json::to_vec_pretty(&document)?;

        let tmp = self.tmp_path();
        let mut file = File::create(&tmp)?;
        file.write_all(&data)?;
        file.sync_all()?;
        fs::rename(&tmp, &self.path)?;

        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Snapshot of one account. Mutating it does not touch the store.
    pub fn load(&self, account_id: &AccountId) -> Result<Account> {
        self.accounts
            .read()
            .get(account_id)
            .cloned()
            .ok_or_else(|| Error::AccountNotFound(account_id.to_string()))
    }

    /// Snapshot of every account, in map order
    pub fn list_all(&self) -> Vec<Account> {
        self.accounts.read().values().cloned().collect()
    }

    /// Number of stored accounts
    pub fn len(&self) -> usize {
        self.accounts.read().len()
    }

    /// True when no account is stored
    pub fn is_empty(&self) -> bool {
        self.accounts.read().is_empty()
    }

    /// Backing file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Store metrics
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}
