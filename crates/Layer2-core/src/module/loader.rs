//! Module Loader - 매니페스트 참조에서 모듈 코드를 로드하는 seam
//!
//! 실제 구현이라면 `manifest_ref`를 해석해 코드를 가져와 인스턴스화
//! 하겠지만, 그 메커니즘은 이 코어의 범위 밖입니다. Manager에는
//! 로더를 주입하고, 테스트는 인메모리 `StubLoader`를 사용합니다.

use super::traits::{ConnectionStatus, Docking, ModuleHandle};
use crate::hub::HubAuth;
use crate::registry::{ModuleMetadata, ModuleRegistryEntry};
use async_trait::async_trait;
use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tetra_foundation::Result;
use tracing::debug;

/// 모듈 로더 트레이트
#[async_trait]
pub trait ModuleLoader: Send + Sync {
    /// 레지스트리 항목으로부터 라이브 모듈 인스턴스 로드
    async fn load(&self, entry: &ModuleRegistryEntry) -> Result<Arc<dyn ModuleHandle>>;
}

// ============================================================================
// StubLoader - 인메모리 구현
// ============================================================================

/// 인메모리 스텁 로더
///
/// 항상 연결에 성공하는 핸들을 만듭니다. `failing()`으로 생성하면
/// 도킹 핸드셰이크가 실패하는 핸들을 만들어 실패 경로를 테스트할 수
/// 있습니다.
pub struct StubLoader {
    fail_connect: bool,
}

impl StubLoader {
    pub fn new() -> Self {
        Self {
            fail_connect: false,
        }
    }

    /// 도킹이 항상 실패하는 로더
    pub fn failing() -> Self {
        Self { fail_connect: true }
    }
}

impl Default for StubLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ModuleLoader for StubLoader {
    async fn load(&self, entry: &ModuleRegistryEntry) -> Result<Arc<dyn ModuleHandle>> {
        debug!(
            "Loading module {} from {}",
            entry.metadata.id, entry.manifest_ref
        );
        Ok(Arc::new(StubModule {
            metadata: entry.metadata.clone(),
            docking: StubDocking {
                fail_connect: self.fail_connect,
                connected: AtomicBool::new(false),
            },
        }))
    }
}

struct StubDocking {
    fail_connect: bool,
    connected: AtomicBool,
}

#[async_trait]
impl Docking for StubDocking {
    async fn connect_to_hub(&self, _auth: &HubAuth) -> Result<ConnectionStatus> {
        if self.fail_connect {
            return Ok(ConnectionStatus::failed("hub connection refused"));
        }
        self.connected.store(true, Ordering::SeqCst);
        Ok(ConnectionStatus::Connected)
    }

    async fn disconnect(&self) -> Result<()> {
        self.connected.store(false, Ordering::SeqCst);
        Ok(())
    }
}

struct StubModule {
    metadata: ModuleMetadata,
    docking: StubDocking,
}

#[async_trait]
impl ModuleHandle for StubModule {
    fn metadata(&self) -> ModuleMetadata {
        self.metadata.clone()
    }

    fn docking(&self) -> &dyn Docking {
        &self.docking
    }

    async fn destroy(&self) -> Result<()> {
        self.docking.connected.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
