//! Error types for TetraHub
//!
//! 모든 에러를 중앙에서 관리

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// TetraHub 에러 타입
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Hub 관련
    // ========================================================================
    #[error("Hub not initialized: {0}")]
    NotInitialized(String),

    #[error("Vertex not found: {0}")]
    VertexNotFound(String),

    #[error("Invalid support structure: {0}")]
    InvalidStructure(String),

    #[error("Import validation failed: {0}")]
    ImportValidation(String),

    // ========================================================================
    // Registry 관련
    // ========================================================================
    #[error("Invalid registry entry: {0}")]
    InvalidRegistryEntry(String),

    #[error("Duplicate module: {0}")]
    DuplicateModule(String),

    // ========================================================================
    // Module 라이프사이클 관련
    // ========================================================================
    #[error("Module not found in registry: {0}")]
    ModuleNotFound(String),

    #[error("Module not installed: {0}")]
    NotInstalled(String),

    #[error("Module already installed: {0}")]
    AlreadyInstalled(String),

    #[error("Module already docked: {0}")]
    AlreadyDocked(String),

    #[error("Module {module} requires dependency: {dependency}")]
    MissingDependency { module: String, dependency: String },

    #[error("Module {module} is required by installed module: {dependent}")]
    DependentExists { module: String, dependent: String },

    #[error("Invalid transition for module {module}: cannot {operation} from {from}")]
    InvalidTransition {
        module: String,
        from: String,
        operation: String,
    },

    // ========================================================================
    // 저장소 관련
    // ========================================================================
    #[error("Storage error: {0}")]
    Storage(String),

    // ========================================================================
    // 외부 에러 변환
    // ========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ========================================================================
    // 기타
    // ========================================================================
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// 구조적 위반인지 확인 (상태 변경 없이 즉시 반환되는 에러)
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Error::NotInitialized(_)
                | Error::ModuleNotFound(_)
                | Error::NotInstalled(_)
                | Error::AlreadyInstalled(_)
                | Error::AlreadyDocked(_)
                | Error::DuplicateModule(_)
                | Error::MissingDependency { .. }
                | Error::DependentExists { .. }
                | Error::InvalidTransition { .. }
                | Error::ImportValidation(_)
        )
    }

    /// 의존성 누락 에러 생성 헬퍼
    pub fn missing_dependency(module: impl Into<String>, dependency: impl Into<String>) -> Self {
        Error::MissingDependency {
            module: module.into(),
            dependency: dependency.into(),
        }
    }

    /// 의존 모듈 존재 에러 생성 헬퍼
    pub fn dependent_exists(module: impl Into<String>, dependent: impl Into<String>) -> Self {
        Error::DependentExists {
            module: module.into(),
            dependent: dependent.into(),
        }
    }

    /// 잘못된 전이 에러 생성 헬퍼
    pub fn invalid_transition(
        module: impl Into<String>,
        from: impl std::fmt::Display,
        operation: impl Into<String>,
    ) -> Self {
        Error::InvalidTransition {
            module: module.into(),
            from: from.to_string(),
            operation: operation.into(),
        }
    }
}

// ============================================================================
// From 구현 (추가 변환)
// ============================================================================

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Internal(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Internal(s.to_string())
    }
}
