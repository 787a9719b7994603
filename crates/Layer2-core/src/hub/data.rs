//! Hub Data - 사용자별 구조 데이터 정의
//!
//! 사면체(Tetrahedron)는 사용자의 지지 구조를 나타내는 고정 4정점
//! 그래프입니다. 카테고리는 생성 후 추가/제거/중복되지 않습니다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tetra_foundation::{Error, Result};

// ============================================================================
// Vertex - 고정 카테고리 정점
// ============================================================================

/// 정점 카테고리 - 정확히 네 개, 불변
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VertexCategory {
    Technical,
    Emotional,
    Practical,
    Philosophical,
}

impl VertexCategory {
    /// 네 카테고리 전부, 고정 순서
    pub const ALL: [VertexCategory; 4] = [
        VertexCategory::Technical,
        VertexCategory::Emotional,
        VertexCategory::Practical,
        VertexCategory::Philosophical,
    ];

    fn default_id(&self) -> &'static str {
        match self {
            Self::Technical => "vertex.technical",
            Self::Emotional => "vertex.emotional",
            Self::Practical => "vertex.practical",
            Self::Philosophical => "vertex.philosophical",
        }
    }
}

impl std::fmt::Display for VertexCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Technical => write!(f, "technical"),
            Self::Emotional => write!(f, "emotional"),
            Self::Practical => write!(f, "practical"),
            Self::Philosophical => write!(f, "philosophical"),
        }
    }
}

/// 지지 구조의 정점
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vertex {
    /// 고정 정점 ID
    pub id: String,

    /// 카테고리 (불변)
    pub category: VertexCategory,

    /// 사용자 지정 이름
    pub name: String,

    /// 사용자 지정 설명
    pub description: String,

    /// 연결된 정점 ID 목록 (완전 그래프)
    #[serde(default)]
    pub edges: Vec<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 정점 부분 업데이트 - 카테고리와 ID는 변경 불가
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VertexUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl VertexUpdate {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// 업데이트 적용 및 수정 시각 갱신
    pub fn apply(&self, vertex: &mut Vertex) {
        if let Some(name) = &self.name {
            vertex.name = name.clone();
        }
        if let Some(description) = &self.description {
            vertex.description = description.clone();
        }
        vertex.updated_at = Utc::now();
    }
}

// ============================================================================
// Tetrahedron - 고정 4정점 구조
// ============================================================================

/// 사면체 지지 구조 - 카테고리당 정점 하나, 정확히 네 개
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tetrahedron {
    pub vertices: Vec<Vertex>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tetrahedron {
    /// 기본 구조 생성 - 빈 이름/설명의 네 정점, 완전 그래프 간선
    pub fn defaults() -> Self {
        let now = Utc::now();
        let vertices = VertexCategory::ALL
            .iter()
            .map(|category| Vertex {
                id: category.default_id().to_string(),
                category: *category,
                name: String::new(),
                description: String::new(),
                edges: VertexCategory::ALL
                    .iter()
                    .filter(|c| *c != category)
                    .map(|c| c.default_id().to_string())
                    .collect(),
                created_at: now,
                updated_at: now,
            })
            .collect();

        Self {
            vertices,
            created_at: now,
            updated_at: now,
        }
    }

    /// ID로 정점 조회
    pub fn vertex(&self, id: &str) -> Option<&Vertex> {
        self.vertices.iter().find(|v| v.id == id)
    }

    /// ID로 정점 조회 (mutable)
    pub fn vertex_mut(&mut self, id: &str) -> Option<&mut Vertex> {
        self.vertices.iter_mut().find(|v| v.id == id)
    }

    /// 구조 불변식 검증 - 정점 네 개, 카테고리당 하나
    pub fn validate(&self) -> Result<()> {
        if self.vertices.len() != 4 {
            return Err(Error::InvalidStructure(format!(
                "expected 4 vertices, got {}",
                self.vertices.len()
            )));
        }
        for category in VertexCategory::ALL {
            let count = self
                .vertices
                .iter()
                .filter(|v| v.category == category)
                .count();
            if count != 1 {
                return Err(Error::InvalidStructure(format!(
                    "expected exactly one {} vertex, got {}",
                    category, count
                )));
            }
        }
        Ok(())
    }
}

impl Default for Tetrahedron {
    fn default() -> Self {
        Self::defaults()
    }
}

// ============================================================================
// Settings - 사용자 설정
// ============================================================================

/// 데이터 공유 수준
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSharingLevel {
    None,
    Anonymous,
    Full,
}

/// 사용자 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub theme: String,
    pub notifications_enabled: bool,
    pub data_sharing: DataSharingLevel,
    pub auto_backup: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            notifications_enabled: true,
            data_sharing: DataSharingLevel::None,
            auto_backup: false,
        }
    }
}

/// 설정 부분 업데이트 - 지정된 필드만 얕은 병합
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    pub theme: Option<String>,
    pub notifications_enabled: Option<bool>,
    pub data_sharing: Option<DataSharingLevel>,
    pub auto_backup: Option<bool>,
}

impl SettingsUpdate {
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(theme) = &self.theme {
            settings.theme = theme.clone();
        }
        if let Some(enabled) = self.notifications_enabled {
            settings.notifications_enabled = enabled;
        }
        if let Some(level) = self.data_sharing {
            settings.data_sharing = level;
        }
        if let Some(backup) = self.auto_backup {
            settings.auto_backup = backup;
        }
    }
}

// ============================================================================
// HubData - 사용자별 전체 레코드
// ============================================================================

/// 사용자별 Hub 데이터 - `hub_data_<userId>` 키로 영속화
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HubData {
    pub user_id: String,

    pub tetrahedron: Tetrahedron,

    /// 모듈별 불투명 데이터 슬롯 - Hub는 내용을 해석하지 않음
    #[serde(default)]
    pub module_data: HashMap<String, serde_json::Value>,

    pub settings: Settings,
}

impl HubData {
    /// 기본 데이터 생성
    pub fn defaults(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            tetrahedron: Tetrahedron::defaults(),
            module_data: HashMap::new(),
            settings: Settings::default(),
        }
    }
}
