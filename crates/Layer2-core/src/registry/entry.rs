//! Registry Entry - 모듈 카탈로그 항목 정의

use serde::{Deserialize, Serialize};

/// 모듈 메타데이터
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleMetadata {
    /// 고유 모듈 ID (예: "tetra.journal")
    pub id: String,

    /// 표시 이름
    pub name: String,

    /// 설명
    pub description: String,

    /// 버전 문자열 (예: "1.0.0")
    pub version: String,

    /// 카테고리 (예: "planning", "reflection")
    pub category: String,

    /// 검색용 태그
    #[serde(default)]
    pub tags: Vec<String>,

    /// 설치 전 이미 설치되어 있어야 하는 모듈 ID 목록
    #[serde(default)]
    pub dependencies: Vec<String>,
}

/// 모듈 집계 통계
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleStats {
    /// 누적 설치 수
    pub installations: u64,

    /// 평균 평점
    pub rating: f32,

    /// 리뷰 수
    pub reviews: u32,
}

/// 통계 부분 업데이트 - 지정된 필드만 병합
#[derive(Debug, Clone, Default)]
pub struct ModuleStatsUpdate {
    pub installations: Option<u64>,
    pub rating: Option<f32>,
    pub reviews: Option<u32>,
}

impl ModuleStatsUpdate {
    pub fn installations(installations: u64) -> Self {
        Self {
            installations: Some(installations),
            ..Self::default()
        }
    }

    /// 업데이트를 기존 통계에 병합
    pub fn apply(&self, stats: &mut ModuleStats) {
        if let Some(installations) = self.installations {
            stats.installations = installations;
        }
        if let Some(rating) = self.rating {
            stats.rating = rating;
        }
        if let Some(reviews) = self.reviews {
            stats.reviews = reviews;
        }
    }
}

/// 레지스트리 계층
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistryTier {
    /// 내장 카탈로그 (초기화 시 시드, 불변)
    Core,

    /// 공유 커뮤니티 카탈로그 (중복 등록 거부)
    Community,

    /// 사용자 소유 카탈로그 (같은 ID는 덮어쓰기)
    Private,
}

impl std::fmt::Display for RegistryTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Core => write!(f, "core"),
            Self::Community => write!(f, "community"),
            Self::Private => write!(f, "private"),
        }
    }
}

/// 설치 가능한 모듈의 카탈로그 항목
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleRegistryEntry {
    /// 모듈 메타데이터
    pub metadata: ModuleMetadata,

    /// 모듈 코드 로케이터 (예: "builtin:journal")
    ///
    /// 실제 코드 로딩은 `ModuleLoader` seam이 담당합니다.
    pub manifest_ref: String,

    /// 검증된 모듈 여부
    pub verified: bool,

    /// 집계 통계
    #[serde(default)]
    pub stats: ModuleStats,
}

impl ModuleRegistryEntry {
    /// 새 항목 생성
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            metadata: ModuleMetadata {
                id: id.into(),
                name: name.into(),
                description: String::new(),
                version: "1.0.0".to_string(),
                category: "custom".to_string(),
                tags: vec![],
                dependencies: vec![],
            },
            manifest_ref: String::new(),
            verified: false,
            stats: ModuleStats::default(),
        }
    }

    /// 빌더 패턴: 설명 설정
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.metadata.description = description.into();
        self
    }

    /// 빌더 패턴: 버전 설정
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.metadata.version = version.into();
        self
    }

    /// 빌더 패턴: 카테고리 설정
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.metadata.category = category.into();
        self
    }

    /// 빌더 패턴: 태그 추가
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.metadata.tags.push(tag.into());
        self
    }

    /// 빌더 패턴: 의존성 추가
    pub fn with_dependency(mut self, dependency: impl Into<String>) -> Self {
        self.metadata.dependencies.push(dependency.into());
        self
    }

    /// 빌더 패턴: 매니페스트 참조 설정
    pub fn with_manifest_ref(mut self, manifest_ref: impl Into<String>) -> Self {
        self.manifest_ref = manifest_ref.into();
        self
    }

    /// 빌더 패턴: 검증 플래그 설정
    pub fn verified(mut self) -> Self {
        self.verified = true;
        self
    }

    /// 검색 쿼리 매칭 (이름/설명/태그, 대소문자 무시)
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.metadata.name.to_lowercase().contains(&query)
            || self.metadata.description.to_lowercase().contains(&query)
            || self
                .metadata
                .tags
                .iter()
                .any(|t| t.to_lowercase().contains(&query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_builder() {
        let entry = ModuleRegistryEntry::new("test.module", "Test Module")
            .with_description("A module for tests")
            .with_category("planning")
            .with_tag("test")
            .with_dependency("test.base")
            .with_manifest_ref("local:test")
            .verified();

        assert_eq!(entry.metadata.id, "test.module");
        assert_eq!(entry.metadata.dependencies, vec!["test.base".to_string()]);
        assert!(entry.verified);
    }

    #[test]
    fn test_matches_is_case_insensitive() {
        let entry = ModuleRegistryEntry::new("test.module", "Daily Journal")
            .with_description("Track your reflections")
            .with_tag("Writing");

        assert!(entry.matches("journal"));
        assert!(entry.matches("REFLECT"));
        assert!(entry.matches("writing"));
        assert!(!entry.matches("calendar"));
    }

    #[test]
    fn test_stats_update_merges_only_set_fields() {
        let mut stats = ModuleStats {
            installations: 10,
            rating: 4.5,
            reviews: 3,
        };

        ModuleStatsUpdate::installations(11).apply(&mut stats);

        assert_eq!(stats.installations, 11);
        assert_eq!(stats.rating, 4.5);
        assert_eq!(stats.reviews, 3);
    }
}
