//! Keypair persistence
//!
//! One JSON file per wallet id under the keystore directory. When key
//! persistence is disabled, saves are skipped with a warning and loads only
//! find files written earlier.

use super::signer::Keypair;
use crate::config::SecurityConfig;
use crate::{Error, Result};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Storage for agent keypairs, addressed by wallet id
#[async_trait]
pub trait KeyStore: Send + Sync {
    /// Keypair stored under `wallet_id`, if any
    async fn load(&self, wallet_id: &str) -> Result<Option<Keypair>>;

    /// Persist `keypair` under `wallet_id`
    async fn save(&self, keypair: &Keypair, wallet_id: &str) -> Result<()>;

    /// Remove the stored keypair; `false` if there was none
    async fn delete(&self, wallet_id: &str) -> Result<bool>;

    /// Wallet ids with a stored keypair
    async fn list(&self) -> Result<Vec<String>>;
}

/// On-disk representation of a keypair
#[derive(Serialize, Deserialize)]
struct StoredKeypair {
    public_key: String,
    secret_key: Vec<u8>,
}

/// Keypairs stored as JSON files
pub struct FileKeyStore {
    dir: PathBuf,
    persist: bool,
}

impl FileKeyStore {
    pub fn new(dir: impl Into<PathBuf>, persist: bool) -> Self {
        Self {
            dir: dir.into(),
            persist,
        }
    }

    pub fn from_config(config: &SecurityConfig) -> Self {
        Self::new(config.keystore_dir.clone(), config.persist_keys)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File for `wallet_id`; ids that could leave the keystore directory are rejected
    fn path_for(&self, wallet_id: &str) -> Result<PathBuf> {
        if wallet_id.is_empty()
            || wallet_id.contains("..")
            || wallet_id.chars().any(|c| c == '/' || c == '\\' || c == '\0')
        {
            return Err(Error::KeyStore(format!("invalid wallet id {:?}", wallet_id)));
        }
        Ok(self.dir.join(format!("{}.json", wallet_id)))
    }
}

#[async_trait]
impl KeyStore for FileKeyStore {
    async fn load(&self, wallet_id: &str) -> Result<Option<Keypair>> {
        let path = self.path_for(wallet_id)?;
        if !tokio::fs::try_exists(&path).await? {
            return Ok(None);
        }

        let content = tokio::fs::read_to_string(&path).await?;
        let stored: StoredKeypair = match serde_json::from_str(&content) {
            Ok(stored) => stored,
            Err(e) => {
                tracing::error!(
                    wallet_id = wallet_id,
                    path = %path.display(),
                    error = %e,
                    "Failed to parse stored keypair"
                );
                return Ok(None);
            }
        };

        let keypair = Keypair::from_slice(&stored.secret_key)?;
        if keypair.public_key().as_str() != stored.public_key {
            return Err(Error::KeyStore(format!(
                "public key mismatch in {}",
                path.display()
            )));
        }
        Ok(Some(keypair))
    }

    async fn save(&self, keypair: &Keypair, wallet_id: &str) -> Result<()> {
        let path = self.path_for(wallet_id)?;
        if !self.persist {
            tracing::warn!(
                wallet_id = wallet_id,
                "Key persistence is disabled. Keypair will not be saved."
            );
            return Ok(());
        }

        tokio::fs::create_dir_all(&self.dir).await?;
        let stored = StoredKeypair {
            public_key: keypair.public_key().to_string(),
            secret_key: keypair.secret_bytes().to_vec(),
        };
        let content = serde_json::to_string_pretty(&stored)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }

    async fn delete(&self, wallet_id: &str) -> Result<bool> {
        let path = self.path_for(wallet_id)?;
        if !tokio::fs::try_exists(&path).await? {
            return Ok(false);
        }
        tokio::fs::remove_file(path).await?;
        Ok(true)
    }

    async fn list(&self) -> Result<Vec<String>> {
        if !tokio::fs::try_exists(&self.dir).await? {
            return Ok(Vec::new());
        }

        let mut wallets = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            if let Some(id) = name.to_str().and_then(|n| n.strip_suffix(".json")) {
                wallets.push(id.to_string());
            }
        }
        wallets.sort();
        Ok(wallets)
    }
}

/// Keypairs kept in memory for the lifetime of the process
#[derive(Default)]
pub struct MemoryKeyStore {
    keys: RwLock<HashMap<String, [u8; super::signer::SECRET_KEY_LEN]>>,
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyStore for MemoryKeyStore {
    async fn load(&self, wallet_id: &str) -> Result<Option<Keypair>> {
        Ok(self
            .keys
            .read()
            .get(wallet_id)
            .map(|bytes| Keypair::from_secret_bytes(*bytes)))
    }

    async fn save(&self, keypair: &Keypair, wallet_id: &str) -> Result<()> {
        self.keys
            .write()
            .insert(wallet_id.to_string(), *keypair.secret_bytes());
        Ok(())
    }

    async fn delete(&self, wallet_id: &str) -> Result<bool> {
        Ok(self.keys.write().remove(wallet_id).is_some())
    }

    async fn list(&self) -> Result<Vec<String>> {
        let mut wallets: Vec<String> = self.keys.read().keys().cloned().collect();
        wallets.sort();
        Ok(wallets)
    }
}
