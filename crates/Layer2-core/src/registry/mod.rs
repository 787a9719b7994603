//! Module Registry - 설치 가능한 모듈 카탈로그
//!
//! 세 계층(core/community/private)의 모듈 디스크립터를 보관하고
//! 검색/조회/통계 집계를 제공합니다. 라이프사이클 상태는 절대
//! 보관하지 않습니다 (그건 `ModuleManager` 소관).

mod catalog;
mod entry;

pub use entry::{
    ModuleMetadata, ModuleRegistryEntry, ModuleStats, ModuleStatsUpdate, RegistryTier,
};

use tetra_foundation::{Error, Result};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

#[derive(Debug, Default)]
struct Tiers {
    seeded: bool,
    core: Vec<ModuleRegistryEntry>,
    community: Vec<ModuleRegistryEntry>,
    private: Vec<ModuleRegistryEntry>,
}

/// 모듈 레지스트리
pub struct ModuleRegistry {
    tiers: RwLock<Tiers>,
}

impl ModuleRegistry {
    /// 새 레지스트리 생성 (비어있음, `initialize`로 시드)
    pub fn new() -> Self {
        Self {
            tiers: RwLock::new(Tiers::default()),
        }
    }

    /// core 계층 시드 (멱등)
    pub async fn initialize(&self) {
        let mut tiers = self.tiers.write().await;
        if tiers.seeded {
            debug!("Registry already seeded");
            return;
        }
        tiers.core = catalog::builtin_catalog();
        tiers.seeded = true;
        info!("Seeded core registry with {} modules", tiers.core.len());
    }

    // ========================================================================
    // 조회
    // ========================================================================

    /// 세 계층 전체 (core → community → private 순서)
    pub async fn all(&self) -> Vec<ModuleRegistryEntry> {
        let tiers = self.tiers.read().await;
        tiers
            .core
            .iter()
            .chain(tiers.community.iter())
            .chain(tiers.private.iter())
            .cloned()
            .collect()
    }

    /// core 계층
    pub async fn core(&self) -> Vec<ModuleRegistryEntry> {
        self.tiers.read().await.core.clone()
    }

    /// community 계층
    pub async fn community(&self) -> Vec<ModuleRegistryEntry> {
        self.tiers.read().await.community.clone()
    }

    /// private 계층
    pub async fn private(&self) -> Vec<ModuleRegistryEntry> {
        self.tiers.read().await.private.clone()
    }

    /// 이름/설명/태그 부분 일치 검색 (대소문자 무시)
    pub async fn search(&self, query: &str) -> Vec<ModuleRegistryEntry> {
        self.all()
            .await
            .into_iter()
            .filter(|e| e.matches(query))
            .collect()
    }

    /// ID로 조회 - core → community → private 우선순위
    ///
    /// ID는 계층 내에서만 유일하므로 전역 조회는 이 고정 순서로
    /// 첫 일치 항목을 선택합니다.
    pub async fn get(&self, id: &str) -> Option<ModuleRegistryEntry> {
        let tiers = self.tiers.read().await;
        tiers
            .core
            .iter()
            .chain(tiers.community.iter())
            .chain(tiers.private.iter())
            .find(|e| e.metadata.id == id)
            .cloned()
    }

    /// 카테고리로 필터 (전 계층)
    pub async fn by_category(&self, category: &str) -> Vec<ModuleRegistryEntry> {
        self.all()
            .await
            .into_iter()
            .filter(|e| e.metadata.category == category)
            .collect()
    }

    /// ID 존재 여부 (전 계층)
    pub async fn contains(&self, id: &str) -> bool {
        self.get(id).await.is_some()
    }

    // ========================================================================
    // 등록 / 제거
    // ========================================================================

    /// community 모듈 등록 - ID 충돌 시 거부
    pub async fn register_community(&self, entry: ModuleRegistryEntry) -> Result<()> {
        Self::validate(&entry)?;

        let mut tiers = self.tiers.write().await;
        if tiers
            .community
            .iter()
            .any(|e| e.metadata.id == entry.metadata.id)
        {
            warn!("Duplicate community module: {}", entry.metadata.id);
            return Err(Error::DuplicateModule(entry.metadata.id));
        }

        info!("Registered community module: {}", entry.metadata.id);
        tiers.community.push(entry);
        Ok(())
    }

    /// private 모듈 등록 - 같은 ID는 덮어쓰기 (upsert)
    ///
    /// private 항목은 사용자 소유이므로 덮어쓰기 가능, community 항목은
    /// 공유 자원이므로 충돌을 거부하는 비대칭이 의도된 동작입니다.
    pub async fn register_private(&self, entry: ModuleRegistryEntry) -> Result<()> {
        Self::validate(&entry)?;

        let mut tiers = self.tiers.write().await;
        if let Some(existing) = tiers
            .private
            .iter_mut()
            .find(|e| e.metadata.id == entry.metadata.id)
        {
            info!("Replacing private module: {}", entry.metadata.id);
            *existing = entry;
        } else {
            info!("Registered private module: {}", entry.metadata.id);
            tiers.private.push(entry);
        }
        Ok(())
    }

    /// 지정된 계층에서 모듈 제거 (없으면 no-op)
    pub async fn remove(&self, id: &str, tier: RegistryTier) {
        let mut tiers = self.tiers.write().await;
        let entries = match tier {
            RegistryTier::Core => &mut tiers.core,
            RegistryTier::Community => &mut tiers.community,
            RegistryTier::Private => &mut tiers.private,
        };

        if let Some(index) = entries.iter().position(|e| e.metadata.id == id) {
            entries.remove(index);
            info!("Removed module {} from {} tier", id, tier);
        } else {
            debug!("Module {} not in {} tier, nothing to remove", id, tier);
        }
    }

    // ========================================================================
    // 통계
    // ========================================================================

    /// 통계 병합 - ID를 보유한 계층에 적용 (없으면 no-op)
    pub async fn update_stats(&self, id: &str, update: ModuleStatsUpdate) {
        let mut tiers = self.tiers.write().await;
        let tiers = &mut *tiers;
        let entry = tiers
            .core
            .iter_mut()
            .chain(tiers.community.iter_mut())
            .chain(tiers.private.iter_mut())
            .find(|e| e.metadata.id == id);

        match entry {
            Some(entry) => {
                update.apply(&mut entry.stats);
                debug!("Updated stats for {}: {:?}", id, entry.stats);
            }
            None => debug!("No registry entry for {}, stats update skipped", id),
        }
    }

    fn validate(entry: &ModuleRegistryEntry) -> Result<()> {
        if entry.metadata.id.trim().is_empty() {
            return Err(Error::InvalidRegistryEntry(
                "metadata.id is required".to_string(),
            ));
        }
        if entry.manifest_ref.trim().is_empty() {
            return Err(Error::InvalidRegistryEntry(format!(
                "manifest_ref is required for {}",
                entry.metadata.id
            )));
        }
        Ok(())
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}
