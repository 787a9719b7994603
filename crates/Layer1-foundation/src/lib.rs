//! # tetra-foundation
//!
//! Foundation layer for TetraHub:
//! - Error: 중앙 에러 타입 (`Error`, `Result`)
//! - Storage: 키-값 저장소 추상화 (`KvStore`, `MemoryStore`, `JsonStore`)
//!
//! ## 아키텍처
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  tetra-core (Hub, ModuleManager, Registry)  │
//! │                     │                       │
//! │                     ▼                       │
//! │          KvStore (load/save/remove)         │
//! │          ┌─────────┴─────────┐              │
//! │          ▼                   ▼              │
//! │    MemoryStore           JsonStore          │
//! │    (테스트용)           (파일 기반)          │
//! └─────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod storage;

// ============================================================================
// Error
// ============================================================================
pub use error::{Error, Result};

// ============================================================================
// Storage (저장소)
// ============================================================================
pub use storage::{JsonStore, KvStore, MemoryStore};
