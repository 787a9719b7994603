//! Storage module for TetraHub
//!
//! - `kv`: 키-값 저장소 트레이트 (`KvStore`)
//! - `memory`: 인메모리 구현 (테스트/기본값)
//! - `json`: JSON 파일 기반 구현

mod json;
mod kv;
mod memory;

pub use json::JsonStore;
pub use kv::KvStore;
pub use memory::MemoryStore;
