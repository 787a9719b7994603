//! # tetra-core
//!
//! TetraHub 모듈 라이프사이클 코어
//!
//! ## 개요
//!
//! 사용자별 모듈(선택적 기능 패키지)의 설치/제거, Hub 도킹, 활성화 상태를
//! 관리하는 코어 서브시스템:
//! - 의존성 무결성 강제 (설치 시 의존성 검사, 제거 시 의존 모듈 검사)
//! - 라이프사이클 이벤트 발행 (installed, docked, activated, ...)
//! - 단일 활성 모듈 불변식 유지
//!
//! ## 아키텍처
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Hub                                │
//! │  (사용자별 루트: 사면체 구조, 설정, 모듈 데이터, 인증 발급)  │
//! │              │                        │                     │
//! │              ▼                        ▼                     │
//! │      ModuleRegistry            ModuleManager                │
//! │  ┌──────┬───────────┬────────┐  ┌──────────┬────────────┐  │
//! │  │ core │ community │ private│  │ 상태 기계 │ EventBus   │  │
//! │  └──────┴───────────┴────────┘  └──────────┴────────────┘  │
//! │                                       │                     │
//! │                              ModuleLoader (주입 seam)       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 예시
//!
//! ```ignore
//! let store = Arc::new(MemoryStore::new());
//! let hub = Hub::new(store, Arc::new(StubLoader::new()));
//! hub.initialize("alice").await?;
//!
//! let manager = hub.manager();
//! manager.install("tetra.journal").await?;
//! manager.dock("tetra.journal", &hub.auth().await?).await?;
//! manager.activate("tetra.journal").await?;
//! ```

pub mod hub;
pub mod module;
pub mod registry;

// ============================================================================
// Hub
// ============================================================================
pub use hub::{
    DataSharingLevel, Hub, HubAuth, HubData, HubPermission, Settings, SettingsUpdate, Tetrahedron,
    Vertex, VertexCategory, VertexUpdate,
};

// ============================================================================
// Module (라이프사이클)
// ============================================================================
pub use module::{
    ConnectionStatus, Docking, EventBus, ModuleEvent, ModuleEventHandler, ModuleEventType,
    ModuleHandle, ModuleLoader, ModuleManager, ModuleSnapshot, ModuleStatus, StubLoader,
};

// ============================================================================
// Registry (카탈로그)
// ============================================================================
pub use registry::{
    ModuleMetadata, ModuleRegistry, ModuleRegistryEntry, ModuleStats, ModuleStatsUpdate,
    RegistryTier,
};
