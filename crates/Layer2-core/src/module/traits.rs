//! Module traits - 핵심 모듈 인터페이스

use crate::hub::HubAuth;
use crate::registry::ModuleMetadata;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::any::Any;
use tetra_foundation::Result;

// ============================================================================
// ModuleStatus - 라이프사이클 상태
// ============================================================================

/// 설치된 모듈의 라이프사이클 상태
///
/// "uninstalled"는 별도 상태가 아니라 설치 집합에서의 부재로 표현됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleStatus {
    /// 설치됨 (아직 도킹 안됨)
    Installed,

    /// Hub에 도킹됨
    Docked,

    /// 활성 (최대 하나)
    Active,

    /// 백그라운드 (다른 모듈 활성화로 강등됨)
    Background,

    /// 도킹 해제됨
    Undocked,
}

impl ModuleStatus {
    /// Hub에 연결된 상태인지 (docked/active/background)
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Docked | Self::Active | Self::Background)
    }
}

impl std::fmt::Display for ModuleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Installed => write!(f, "installed"),
            Self::Docked => write!(f, "docked"),
            Self::Active => write!(f, "active"),
            Self::Background => write!(f, "background"),
            Self::Undocked => write!(f, "undocked"),
        }
    }
}

// ============================================================================
// ConnectionStatus - 도킹 핸드셰이크 결과
// ============================================================================

/// 도킹 연결 결과
///
/// 연결 실패는 예외가 아니라 정상적인 보고 대상 결과이므로
/// 에러가 아닌 값으로 반환됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    /// 연결 성공
    Connected,

    /// 연결 실패 (사유 포함)
    Failed { reason: String },
}

impl ConnectionStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }
}

// ============================================================================
// Docking - 도킹 능력 경계
// ============================================================================

/// 모듈의 도킹 능력
///
/// Manager는 이 인터페이스만 호출하고 내부는 알지 못합니다.
#[async_trait]
pub trait Docking: Send + Sync {
    /// Hub 연결 핸드셰이크 - 결과를 상태 값으로 반환
    async fn connect_to_hub(&self, auth: &HubAuth) -> Result<ConnectionStatus>;

    /// Hub 연결 해제
    async fn disconnect(&self) -> Result<()>;

    /// 도킹 직후 훅
    async fn on_dock(&self) -> Result<()> {
        Ok(())
    }

    /// 도킹 해제 직전 훅
    async fn on_undock(&self) -> Result<()> {
        Ok(())
    }
}

// ============================================================================
// ModuleHandle - 로드된 모듈 인스턴스
// ============================================================================

/// 로드된 모듈 인스턴스 (레지스트리 항목과 구분되는 라이브 객체)
#[async_trait]
pub trait ModuleHandle: Send + Sync {
    /// 모듈 메타데이터 (레지스트리 항목 미러)
    fn metadata(&self) -> ModuleMetadata;

    /// 도킹 능력 접근
    fn docking(&self) -> &dyn Docking;

    /// 제거 시 정리 작업
    async fn destroy(&self) -> Result<()>;

    /// 타입 캐스팅 헬퍼 (다운캐스팅 지원)
    fn as_any(&self) -> &dyn Any;
}
