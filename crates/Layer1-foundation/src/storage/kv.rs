//! 키-값 저장소 트레이트
//!
//! Hub와 ModuleManager의 영속화 로직을 저장소 구현에서 분리합니다.
//! 테스트에서는 `MemoryStore`, 프로덕션에서는 `JsonStore`를 주입합니다.

use crate::{Error, Result};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

/// 키-값 저장소 트레이트
///
/// 마지막 쓰기가 이기는 (last-writer-wins) 단순 키-값 계약.
/// 트랜잭션이나 낙관적 동시성 제어는 제공하지 않습니다.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// 키에 저장된 바이트 로드 (없으면 None)
    async fn load(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// 키에 바이트 저장 (기존 값 덮어쓰기)
    async fn save(&self, key: &str, bytes: Vec<u8>) -> Result<()>;

    /// 키 삭제 (없으면 no-op)
    async fn remove(&self, key: &str) -> Result<()>;
}

impl dyn KvStore {
    /// JSON 값 로드
    pub async fn load_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.load(key).await? {
            Some(bytes) => {
                let value = serde_json::from_slice(&bytes)
                    .map_err(|e| Error::Storage(format!("Failed to parse {}: {}", key, e)))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// JSON 값 저장
    pub async fn save_json<T: Serialize + ?Sized + Sync>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)
            .map_err(|e| Error::Storage(format!("Failed to serialize {}: {}", key, e)))?;
        self.save(key, bytes).await
    }
}
