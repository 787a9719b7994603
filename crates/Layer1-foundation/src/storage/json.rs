//! JSON 파일 기반 키-값 저장소
//!
//! 키 하나당 `<base_dir>/<key>.json` 파일 하나를 사용합니다.

use super::kv::KvStore;
use crate::{Error, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// JSON 파일 저장소
#[derive(Debug, Clone)]
pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// 글로벌 저장소 (~/.config/tetrahub/)
    pub fn global() -> Result<Self> {
        let dir = dirs::config_dir()
            .ok_or_else(|| Error::Storage("Cannot find config directory".to_string()))?
            .join("tetrahub");
        Ok(Self::new(dir))
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn file_path(&self, key: &str) -> PathBuf {
        self.base_dir.join(format!("{}.json", key))
    }

    async fn ensure_dir(&self) -> Result<()> {
        if !self.base_dir.exists() {
            fs::create_dir_all(&self.base_dir).await.map_err(|e| {
                Error::Storage(format!(
                    "Failed to create directory {}: {}",
                    self.base_dir.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }
}

#[async_trait]
impl KvStore for JsonStore {
    async fn load(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.file_path(key);
        if !path.exists() {
            debug!("No file for key {} at {:?}", key, path);
            return Ok(None);
        }
        let bytes = fs::read(&path)
            .await
            .map_err(|e| Error::Storage(format!("Failed to read {}: {}", path.display(), e)))?;
        Ok(Some(bytes))
    }

    async fn save(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        self.ensure_dir().await?;
        let path = self.file_path(key);
        fs::write(&path, bytes)
            .await
            .map_err(|e| Error::Storage(format!("Failed to write {}: {}", path.display(), e)))?;
        debug!("Saved key {} to {:?}", key, path);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let path = self.file_path(key);
        if path.exists() {
            fs::remove_file(&path).await.map_err(|e| {
                Error::Storage(format!("Failed to remove {}: {}", path.display(), e))
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_store() -> (JsonStore, TempDir) {
        let temp = TempDir::new().unwrap();
        let store = JsonStore::new(temp.path().join("tetrahub"));
        (store, temp)
    }

    #[tokio::test]
    async fn test_missing_key() {
        let (store, _temp) = test_store();
        assert!(store.load("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_creates_dir_and_file() {
        let (store, _temp) = test_store();

        store.save("hub_data_alice", b"{}".to_vec()).await.unwrap();

        assert!(store.base_dir().exists());
        let loaded = store.load("hub_data_alice").await.unwrap();
        assert_eq!(loaded, Some(b"{}".to_vec()));
    }

    #[tokio::test]
    async fn test_remove() {
        let (store, _temp) = test_store();

        store.save("key", b"[]".to_vec()).await.unwrap();
        store.remove("key").await.unwrap();

        assert!(store.load("key").await.unwrap().is_none());
        // 없는 키 삭제는 no-op
        store.remove("key").await.unwrap();
    }
}
