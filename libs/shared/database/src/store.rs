use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, warn};

use shared_models::StorageError;

pub mod keys {
    pub const TOKEN: &str = "token";
    pub const CURRENT_USER: &str = "currentUser";
    pub const APPOINTMENTS: &str = "appointments";
}

/// Scoped string key-value persistence. Not transactional.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

/// All keys live in one JSON object file that is rewritten whole on every change.
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the file as a map. A corrupt file reads as empty; when `backup` is
    /// set it is first copied to `<path>.corrupt` so a later write cannot lose it.
    async fn read_map(&self, backup: bool) -> Result<HashMap<String, String>, StorageError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => return Err(e.into()),
        };

        if raw.trim().is_empty() {
            return Ok(HashMap::new());
        }

        match serde_json::from_str(&raw) {
            Ok(map) => Ok(map),
            Err(e) => {
                error!("Storage file {:?} is corrupt, reading as empty: {}", self.path, e);
                if backup {
                    let backup_path = self.backup_path();
                    tokio::fs::copy(&self.path, &backup_path).await?;
                    warn!("Corrupt storage file saved to {:?}", backup_path);
                }
                Ok(HashMap::new())
            }
        }
    }

    pub fn backup_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".corrupt");
        PathBuf::from(name)
    }

    async fn write_map(&self, map: &HashMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let serialized = serde_json::to_string_pretty(map)?;
        tokio::fs::write(&self.path, serialized).await?;
        debug!("Wrote {} keys to {:?}", map.len(), self.path);
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_map(false).await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut map = self.read_map(true).await?;
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map).await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut map = self.read_map(true).await?;
        if map.remove(key).is_some() {
            self.write_map(&map).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn memory_store_set_get_remove() {
        let store = MemoryStore::new();
        assert!(store.get(keys::TOKEN).await.unwrap().is_none());

        store.set(keys::TOKEN, "abc").await.unwrap();
        assert_eq!(store.get(keys::TOKEN).await.unwrap().as_deref(), Some("abc"));

        store.remove(keys::TOKEN).await.unwrap();
        assert!(store.get(keys::TOKEN).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn file_store_persists_across_instances() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        FileStore::new(&path)
            .set(keys::CURRENT_USER, "{\"name\":\"Alice\"}")
            .await
            .unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(
            reopened.get(keys::CURRENT_USER).await.unwrap().as_deref(),
            Some("{\"name\":\"Alice\"}")
        );
        assert!(reopened.get(keys::TOKEN).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn file_store_treats_corrupt_file_as_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "not json").unwrap();

        let store = FileStore::new(&path);
        assert!(store.get(keys::APPOINTMENTS).await.unwrap().is_none());

        assert!(!store.backup_path().exists());

        store.set(keys::APPOINTMENTS, "[]").await.unwrap();
        assert_eq!(store.get(keys::APPOINTMENTS).await.unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn file_store_backs_up_corrupt_file_before_overwrite() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "{\"token\": \"abc\", truncated").unwrap();

        let store = FileStore::new(&path);
        store.set(keys::APPOINTMENTS, "[]").await.unwrap();

        let backup = std::fs::read_to_string(store.backup_path()).unwrap();
        assert_eq!(backup, "{\"token\": \"abc\", truncated");
        assert_eq!(store.get(keys::APPOINTMENTS).await.unwrap().as_deref(), Some("[]"));
        assert!(store.get(keys::TOKEN).await.unwrap().is_none());
    }
}
