//! Module System - 모듈 라이프사이클 관리
//!
//! ## 상태 기계
//!
//! ```text
//! uninstalled --install--> installed
//! installed   --dock-----> docked        (실패 시 기존 상태 유지)
//! docked      --activate-> active
//! docked      --(암묵적)--> background    [다른 모듈 활성화 시]
//! active      --deactivate-> background
//! background  --activate--> active
//! docked|active|background --undock--> undocked
//! installed|undocked --uninstall--> uninstalled
//! ```
//!
//! 활성화는 `docked` 또는 `background` 상태에서만 가능합니다.
//! 한 번에 최대 하나의 모듈만 `active` 상태를 가집니다.

mod events;
mod loader;
mod manager;
mod traits;

pub use events::{EventBus, ModuleEvent, ModuleEventHandler, ModuleEventType};
pub use loader::{ModuleLoader, StubLoader};
pub use manager::{ModuleManager, ModuleSnapshot};
pub use traits::{ConnectionStatus, Docking, ModuleHandle, ModuleStatus};
