//! Key material stores
//!
//! Credential persistence is owned by an external collaborator; the toolkit
//! only reads and writes through the narrow [`KeyMaterialStore`] contract.
//! Two stores are provided: an in-memory map and a directory holding one
//! JSON file per organization.

use crate::keys::KeyMaterial;
use channel_core::{ChannelError, Identity, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use zeroize::Zeroizing;

/// Enrolled identity together with its private key
#[derive(Debug, Clone)]
pub struct StoredCredential {
    /// Certified identity
    pub identity: Identity,
    /// Matching private key
    pub key: KeyMaterial,
}

/// Narrow contract for per-organization credential storage
pub trait KeyMaterialStore: Send + Sync {
    /// Fetch the credential stored for an organization
    fn get(&self, org: &str) -> Result<Option<StoredCredential>>;

    /// Store the credential for an organization, replacing any previous one
    fn put(&self, org: &str, credential: StoredCredential) -> Result<()>;
}

/// In-memory credential store
#[derive(Default)]
pub struct MemoryKeyStore {
    entries: RwLock<HashMap<String, StoredCredential>>,
}

impl MemoryKeyStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyMaterialStore for MemoryKeyStore {
    fn get(&self, org: &str) -> Result<Option<StoredCredential>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| ChannelError::storage("key store lock poisoned"))?;
        Ok(entries.get(org).cloned())
    }

    fn put(&self, org: &str, credential: StoredCredential) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| ChannelError::storage("key store lock poisoned"))?;
        entries.insert(org.to_string(), credential);
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
struct CredentialFile {
    identity: Identity,
    secret_key: String,
}

/// Directory-backed credential store, one `<org>.json` file per organization
pub struct FileKeyStore {
    root: PathBuf,
}

impl FileKeyStore {
    /// Open a store rooted at `root`, creating the directory if needed
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| {
            ChannelError::storage(format!(
                "failed to create key store {}: {e}",
                root.display()
            ))
        })?;
        Ok(Self { root })
    }

    /// Directory the store writes to
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, org: &str) -> Result<PathBuf> {
        if org.is_empty() || org.contains(['/', '\\']) || org.starts_with('.') {
            return Err(ChannelError::storage(format!(
                "invalid organization key '{org}'"
            )));
        }
        Ok(self.root.join(format!("{org}.json")))
    }
}

impl KeyMaterialStore for FileKeyStore {
    fn get(&self, org: &str) -> Result<Option<StoredCredential>> {
        let path = self.path_for(org)?;
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => Zeroizing::new(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(ChannelError::storage(format!(
                    "failed to read {}: {e}",
                    path.display()
                )))
            }
        };

        let file: CredentialFile = serde_json::from_str(&text).map_err(|e| {
            ChannelError::storage(format!("corrupt credential {}: {e}", path.display()))
        })?;
        let secret = Zeroizing::new(file.secret_key);
        let key = KeyMaterial::from_hex(&secret)?;

        Ok(Some(StoredCredential {
            identity: file.identity,
            key,
        }))
    }

    fn put(&self, org: &str, credential: StoredCredential) -> Result<()> {
        let path = self.path_for(org)?;
        let file = CredentialFile {
            identity: credential.identity,
            secret_key: credential.key.to_hex().to_string(),
        };
        let text = Zeroizing::new(
            serde_json::to_string_pretty(&file)
                .map_err(|e| ChannelError::storage(format!("failed to encode credential: {e}")))?,
        );
        drop(Zeroizing::new(file.secret_key));

        std::fs::write(&path, text.as_bytes()).map_err(|e| {
            ChannelError::storage(format!("failed to write {}: {e}", path.display()))
        })?;

        tracing::debug!(org, path = %path.display(), "Stored credential");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use channel_core::{Certificate, MspId, Role};

    fn credential(seed: u8) -> StoredCredential {
        let key = KeyMaterial::from_secret_bytes(&[seed; 32]);
        let identity = Identity::new(
            MspId::new("Org1MSP"),
            Role::Admin,
            Certificate::new("admin@org1", key.public_key()),
        );
        StoredCredential { identity, key }
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryKeyStore::new();
        assert!(store.get("org1").unwrap().is_none());

        store.put("org1", credential(1)).unwrap();
        let loaded = store.get("org1").unwrap().unwrap();
        assert_eq!(loaded.key.public_key(), credential(1).key.public_key());
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyStore::open(dir.path().join("keys")).unwrap();

        assert!(store.get("org1").unwrap().is_none());
        store.put("org1", credential(2)).unwrap();

        let reopened = FileKeyStore::open(store.root()).unwrap();
        let loaded = reopened.get("org1").unwrap().unwrap();
        assert_eq!(loaded.identity, credential(2).identity);
        assert_eq!(loaded.key.public_key(), credential(2).key.public_key());
    }

    #[test]
    fn test_file_store_rejects_path_escape() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyStore::open(dir.path()).unwrap();
        assert!(store.get("../etc").is_err());
        assert!(store.put("a/b", credential(3)).is_err());
    }

    #[test]
    fn test_file_store_corrupt_entry() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyStore::open(dir.path()).unwrap();
        std::fs::write(dir.path().join("org1.json"), "{ not json").unwrap();
        assert!(store.get("org1").is_err());
    }
}
