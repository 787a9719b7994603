//! Module Manager - 라이프사이클 상태 기계, 의존성 강제, 이벤트 분배
//!
//! 설치된 모듈 집합의 단독 소유자. 이벤트는 해당 상태 변경이
//! 커밋되고 영속화가 성공한 뒤에만 발행됩니다.

use super::events::{EventBus, ModuleEvent, ModuleEventType};
use super::loader::ModuleLoader;
use super::traits::{ConnectionStatus, ModuleHandle, ModuleStatus};
use crate::hub::HubAuth;
use crate::registry::{ModuleMetadata, ModuleRegistry, ModuleStatsUpdate};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tetra_foundation::{Error, KvStore, Result};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// 설치 ID 목록 영속화 키
const INSTALLED_KEY: &str = "installed_modules";

/// 설치된 모듈 (라이브 인스턴스 + 상태)
struct InstalledModule {
    metadata: ModuleMetadata,
    handle: Arc<dyn ModuleHandle>,
    status: ModuleStatus,
    installed_at: DateTime<Utc>,
}

/// 설치된 모듈의 읽기 전용 스냅샷
#[derive(Debug, Clone)]
pub struct ModuleSnapshot {
    pub metadata: ModuleMetadata,
    pub status: ModuleStatus,
    pub installed_at: DateTime<Utc>,
}

/// 모듈 매니저
pub struct ModuleManager {
    /// 설치 검증 및 통계 갱신용 레지스트리
    registry: Arc<ModuleRegistry>,

    /// 설치 ID 목록 영속화
    store: Arc<dyn KvStore>,

    /// 모듈 코드 로딩 seam
    loader: Arc<dyn ModuleLoader>,

    /// 이벤트 버스
    event_bus: Arc<EventBus>,

    /// 설치된 모듈 집합 (ID -> InstalledModule)
    modules: RwLock<HashMap<String, InstalledModule>>,
}

impl ModuleManager {
    /// 새 매니저 생성
    pub fn new(
        registry: Arc<ModuleRegistry>,
        store: Arc<dyn KvStore>,
        loader: Arc<dyn ModuleLoader>,
    ) -> Self {
        Self {
            registry,
            store,
            loader,
            event_bus: Arc::new(EventBus::new()),
            modules: RwLock::new(HashMap::new()),
        }
    }

    /// 이벤트 버스 접근
    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.event_bus
    }

    /// 영속화된 설치 목록에서 모듈 복원
    ///
    /// 이전 세션에서 설치된 ID들을 레지스트리 + 로더를 통해 다시
    /// 로드합니다. 복원된 모듈은 `installed` 상태로 시작합니다
    /// (도킹/활성화는 세션 단위).
    pub async fn initialize(&self) -> Result<()> {
        let ids: Vec<String> = self
            .store
            .load_json(INSTALLED_KEY)
            .await?
            .unwrap_or_default();

        let mut restored = 0usize;
        for id in ids {
            if self.modules.read().await.contains_key(&id) {
                continue;
            }
            let Some(entry) = self.registry.get(&id).await else {
                warn!("Installed module {} no longer in registry, skipping", id);
                continue;
            };
            let handle = self.loader.load(&entry).await?;
            self.modules.write().await.insert(
                id.clone(),
                InstalledModule {
                    metadata: entry.metadata,
                    handle,
                    status: ModuleStatus::Installed,
                    installed_at: Utc::now(),
                },
            );
            restored += 1;
        }

        if restored > 0 {
            info!("Restored {} installed modules", restored);
        }
        Ok(())
    }

    // ========================================================================
    // 설치 / 제거
    // ========================================================================

    /// 모듈 설치
    ///
    /// 의존성은 이미 설치되어 있어야 합니다 (자동 연쇄 설치 없음).
    pub async fn install(&self, id: &str) -> Result<()> {
        {
            let modules = self.modules.read().await;
            if modules.contains_key(id) {
                return Err(Error::AlreadyInstalled(id.to_string()));
            }
        }

        let entry = self
            .registry
            .get(id)
            .await
            .ok_or_else(|| Error::ModuleNotFound(id.to_string()))?;

        {
            let modules = self.modules.read().await;
            for dep in &entry.metadata.dependencies {
                if !modules.contains_key(dep) {
                    return Err(Error::missing_dependency(id, dep));
                }
            }
        }

        info!("Installing module: {} (v{})", id, entry.metadata.version);
        let handle = self.loader.load(&entry).await?;

        {
            let mut modules = self.modules.write().await;
            modules.insert(
                id.to_string(),
                InstalledModule {
                    metadata: entry.metadata.clone(),
                    handle,
                    status: ModuleStatus::Installed,
                    installed_at: Utc::now(),
                },
            );
        }
        self.persist_installed().await?;

        self.registry
            .update_stats(
                id,
                ModuleStatsUpdate::installations(entry.stats.installations + 1),
            )
            .await;

        self.event_bus
            .publish(
                ModuleEvent::new(ModuleEventType::Installed, id)
                    .with_data(serde_json::json!({ "version": entry.metadata.version })),
            )
            .await;
        Ok(())
    }

    /// 모듈 제거
    ///
    /// 다른 설치된 모듈이 의존하는 모듈은 제거할 수 없습니다.
    /// 도킹/활성 상태면 먼저 암묵적으로 도킹 해제합니다.
    pub async fn uninstall(&self, id: &str) -> Result<()> {
        let (handle, status) = {
            let modules = self.modules.read().await;
            let module = modules
                .get(id)
                .ok_or_else(|| Error::NotInstalled(id.to_string()))?;

            if let Some(dependent) = modules
                .iter()
                .find(|(other_id, m)| {
                    other_id.as_str() != id && m.metadata.dependencies.iter().any(|d| d == id)
                })
                .map(|(other_id, _)| other_id.clone())
            {
                return Err(Error::dependent_exists(id, dependent));
            }

            (Arc::clone(&module.handle), module.status)
        };

        if matches!(status, ModuleStatus::Docked | ModuleStatus::Active) {
            debug!("Implicitly undocking {} before uninstall", id);
            self.undock(id).await?;
        }

        info!("Uninstalling module: {}", id);
        handle.destroy().await?;

        self.modules.write().await.remove(id);
        self.persist_installed().await?;

        self.event_bus
            .publish(ModuleEvent::new(ModuleEventType::Uninstalled, id))
            .await;
        Ok(())
    }

    // ========================================================================
    // 도킹
    // ========================================================================

    /// Hub에 모듈 도킹
    ///
    /// 연결 실패는 에러가 아니라 `ConnectionStatus::Failed`로 반환되며,
    /// 모듈은 기존 상태를 유지합니다.
    pub async fn dock(&self, id: &str, auth: &HubAuth) -> Result<ConnectionStatus> {
        let handle = {
            let modules = self.modules.read().await;
            let module = modules
                .get(id)
                .ok_or_else(|| Error::NotInstalled(id.to_string()))?;
            if module.status.is_connected() {
                return Err(Error::AlreadyDocked(id.to_string()));
            }
            Arc::clone(&module.handle)
        };

        let status = handle.docking().connect_to_hub(auth).await?;
        if let ConnectionStatus::Failed { reason } = &status {
            warn!("Docking failed for {}: {}", id, reason);
            return Ok(status);
        }

        {
            let mut modules = self.modules.write().await;
            if let Some(module) = modules.get_mut(id) {
                module.status = ModuleStatus::Docked;
            }
        }

        handle.docking().on_dock().await?;

        info!("Module {} docked", id);
        self.event_bus
            .publish(
                ModuleEvent::new(ModuleEventType::Docked, id)
                    .with_data(serde_json::json!({ "connection": status.clone() })),
            )
            .await;
        Ok(status)
    }

    /// 모듈 도킹 해제 (연결된 상태가 아니면 no-op)
    pub async fn undock(&self, id: &str) -> Result<()> {
        let handle = {
            let modules = self.modules.read().await;
            let module = modules
                .get(id)
                .ok_or_else(|| Error::NotInstalled(id.to_string()))?;
            if !module.status.is_connected() {
                debug!("Module {} not docked, undock is a no-op", id);
                return Ok(());
            }
            Arc::clone(&module.handle)
        };

        handle.docking().disconnect().await?;
        handle.docking().on_undock().await?;

        {
            let mut modules = self.modules.write().await;
            if let Some(module) = modules.get_mut(id) {
                module.status = ModuleStatus::Undocked;
            }
        }

        info!("Module {} undocked", id);
        self.event_bus
            .publish(ModuleEvent::new(ModuleEventType::Undocked, id))
            .await;
        Ok(())
    }

    // ========================================================================
    // 활성화 / 비활성화
    // ========================================================================

    /// 모듈 활성화
    ///
    /// `docked` 또는 `background` 상태에서만 가능. 기존 활성 모듈은
    /// `background`로 강등되고 그 뒤 대상이 승격됩니다. 강등과 승격은
    /// 하나의 쓰기 잠금 구간에서 수행되므로 중간 상태는 관찰되지
    /// 않습니다.
    pub async fn activate(&self, id: &str) -> Result<()> {
        let demoted = {
            let mut modules = self.modules.write().await;
            let target = modules
                .get(id)
                .ok_or_else(|| Error::NotInstalled(id.to_string()))?;

            match target.status {
                ModuleStatus::Docked | ModuleStatus::Background => {}
                from => return Err(Error::invalid_transition(id, from, "activate")),
            }

            let demoted = modules
                .iter_mut()
                .find(|(other_id, m)| {
                    other_id.as_str() != id && m.status == ModuleStatus::Active
                })
                .map(|(other_id, m)| {
                    m.status = ModuleStatus::Background;
                    other_id.clone()
                });

            if let Some(module) = modules.get_mut(id) {
                module.status = ModuleStatus::Active;
            }
            demoted
        };

        if let Some(previous) = &demoted {
            info!("Module {} demoted to background", previous);
            self.event_bus
                .publish(ModuleEvent::new(ModuleEventType::Deactivated, previous))
                .await;
        }

        info!("Module {} activated", id);
        self.event_bus
            .publish(ModuleEvent::new(ModuleEventType::Activated, id))
            .await;
        Ok(())
    }

    /// 모듈 비활성화 (활성 상태가 아니면 no-op)
    pub async fn deactivate(&self, id: &str) -> Result<()> {
        let deactivated = {
            let mut modules = self.modules.write().await;
            match modules.get_mut(id) {
                Some(module) if module.status == ModuleStatus::Active => {
                    module.status = ModuleStatus::Background;
                    true
                }
                _ => false,
            }
        };

        if deactivated {
            info!("Module {} deactivated", id);
            self.event_bus
                .publish(ModuleEvent::new(ModuleEventType::Deactivated, id))
                .await;
        }
        Ok(())
    }

    // ========================================================================
    // 조회 (부수 효과 없음)
    // ========================================================================

    /// 설치된 모듈 스냅샷 조회
    pub async fn get(&self, id: &str) -> Option<ModuleSnapshot> {
        self.modules.read().await.get(id).map(Self::snapshot)
    }

    /// 설치된 모든 모듈 (설치 시각 순)
    pub async fn installed(&self) -> Vec<ModuleSnapshot> {
        let modules = self.modules.read().await;
        let mut list: Vec<_> = modules.values().map(Self::snapshot).collect();
        list.sort_by(|a, b| {
            a.installed_at
                .cmp(&b.installed_at)
                .then_with(|| a.metadata.id.cmp(&b.metadata.id))
        });
        list
    }

    /// 현재 활성 모듈
    pub async fn active(&self) -> Option<ModuleSnapshot> {
        self.modules
            .read()
            .await
            .values()
            .find(|m| m.status == ModuleStatus::Active)
            .map(Self::snapshot)
    }

    /// 설치 여부
    pub async fn is_installed(&self, id: &str) -> bool {
        self.modules.read().await.contains_key(id)
    }

    /// 설치된 모듈 수
    pub async fn module_count(&self) -> usize {
        self.modules.read().await.len()
    }

    fn snapshot(module: &InstalledModule) -> ModuleSnapshot {
        ModuleSnapshot {
            metadata: module.metadata.clone(),
            status: module.status,
            installed_at: module.installed_at,
        }
    }

    async fn persist_installed(&self) -> Result<()> {
        let mut ids: Vec<String> = self.modules.read().await.keys().cloned().collect();
        ids.sort();
        self.store.save_json(INSTALLED_KEY, &ids).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::loader::StubLoader;
    use tetra_foundation::MemoryStore;

    async fn test_manager() -> ModuleManager {
        test_manager_with_loader(Arc::new(StubLoader::new())).await
    }

    async fn test_manager_with_loader(loader: Arc<dyn ModuleLoader>) -> ModuleManager {
        let registry = Arc::new(ModuleRegistry::new());
        registry.initialize().await;
        ModuleManager::new(registry, Arc::new(MemoryStore::new()), loader)
    }

    fn auth() -> HubAuth {
        HubAuth::issue("tester")
    }

    #[tokio::test]
    async fn test_install_and_query() {
        let manager = test_manager().await;

        manager.install("tetra.journal").await.unwrap();

        assert!(manager.is_installed("tetra.journal").await);
        let snapshot = manager.get("tetra.journal").await.unwrap();
        assert_eq!(snapshot.status, ModuleStatus::Installed);
        assert_eq!(
            manager
                .event_bus()
                .history_by_type(ModuleEventType::Installed)
                .await
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn test_install_unknown_module() {
        let manager = test_manager().await;
        let result = manager.install("missing.module").await;
        assert!(matches!(result, Err(Error::ModuleNotFound(_))));
    }

    #[tokio::test]
    async fn test_double_install_fails() {
        let manager = test_manager().await;
        manager.install("tetra.journal").await.unwrap();

        let result = manager.install("tetra.journal").await;

        assert!(matches!(result, Err(Error::AlreadyInstalled(_))));
        assert_eq!(manager.module_count().await, 1);
    }

    #[tokio::test]
    async fn test_install_requires_dependencies() {
        let manager = test_manager().await;

        // insights는 journal + habits 필요
        let result = manager.install("tetra.insights").await;
        assert!(matches!(result, Err(Error::MissingDependency { .. })));
        assert_eq!(manager.module_count().await, 0);

        manager.install("tetra.journal").await.unwrap();
        manager.install("tetra.habits").await.unwrap();
        manager.install("tetra.insights").await.unwrap();
        assert_eq!(manager.module_count().await, 3);
    }

    #[tokio::test]
    async fn test_install_bumps_registry_stats() {
        let registry = Arc::new(ModuleRegistry::new());
        registry.initialize().await;
        let manager = ModuleManager::new(
            Arc::clone(&registry),
            Arc::new(MemoryStore::new()),
            Arc::new(StubLoader::new()),
        );

        manager.install("tetra.journal").await.unwrap();

        let entry = registry.get("tetra.journal").await.unwrap();
        assert_eq!(entry.stats.installations, 1);
    }

    #[tokio::test]
    async fn test_uninstall_not_installed() {
        let manager = test_manager().await;
        let result = manager.uninstall("tetra.journal").await;
        assert!(matches!(result, Err(Error::NotInstalled(_))));
    }

    #[tokio::test]
    async fn test_uninstall_blocked_by_dependent() {
        let manager = test_manager().await;
        manager.install("tetra.journal").await.unwrap();
        manager.install("tetra.habits").await.unwrap();
        manager.install("tetra.insights").await.unwrap();

        let result = manager.uninstall("tetra.journal").await;
        assert!(matches!(result, Err(Error::DependentExists { .. })));
        assert!(manager.is_installed("tetra.journal").await);

        // 의존 모듈 먼저 제거하면 성공
        manager.uninstall("tetra.insights").await.unwrap();
        manager.uninstall("tetra.journal").await.unwrap();
        assert!(!manager.is_installed("tetra.journal").await);
    }

    #[tokio::test]
    async fn test_uninstall_docked_module_undocks_first() {
        let manager = test_manager().await;
        manager.install("tetra.journal").await.unwrap();
        manager.dock("tetra.journal", &auth()).await.unwrap();

        manager.uninstall("tetra.journal").await.unwrap();

        let bus = manager.event_bus();
        assert_eq!(bus.history_by_type(ModuleEventType::Undocked).await.len(), 1);
        assert_eq!(
            bus.history_by_type(ModuleEventType::Uninstalled).await.len(),
            1
        );
    }

    #[tokio::test]
    async fn test_dock_and_activate() {
        let manager = test_manager().await;
        manager.install("tetra.journal").await.unwrap();

        let status = manager.dock("tetra.journal", &auth()).await.unwrap();
        assert!(status.is_connected());
        assert_eq!(
            manager.get("tetra.journal").await.unwrap().status,
            ModuleStatus::Docked
        );

        manager.activate("tetra.journal").await.unwrap();
        assert_eq!(
            manager.active().await.unwrap().metadata.id,
            "tetra.journal"
        );
    }

    #[tokio::test]
    async fn test_activate_requires_docking() {
        let manager = test_manager().await;
        manager.install("tetra.journal").await.unwrap();

        let result = manager.activate("tetra.journal").await;
        assert!(matches!(result, Err(Error::InvalidTransition { .. })));
    }

    #[tokio::test]
    async fn test_dock_twice_fails() {
        let manager = test_manager().await;
        manager.install("tetra.journal").await.unwrap();
        manager.dock("tetra.journal", &auth()).await.unwrap();

        let result = manager.dock("tetra.journal", &auth()).await;
        assert!(matches!(result, Err(Error::AlreadyDocked(_))));
    }

    #[tokio::test]
    async fn test_failed_docking_keeps_state() {
        let manager = test_manager_with_loader(Arc::new(StubLoader::failing())).await;
        manager.install("tetra.journal").await.unwrap();

        let status = manager.dock("tetra.journal", &auth()).await.unwrap();

        assert!(!status.is_connected());
        assert_eq!(
            manager.get("tetra.journal").await.unwrap().status,
            ModuleStatus::Installed
        );
        assert!(manager
            .event_bus()
            .history_by_type(ModuleEventType::Docked)
            .await
            .is_empty());
    }

    #[tokio::test]
    async fn test_activation_demotes_previous_active() {
        let manager = test_manager().await;
        manager.install("tetra.journal").await.unwrap();
        manager.install("tetra.habits").await.unwrap();
        manager.dock("tetra.journal", &auth()).await.unwrap();
        manager.dock("tetra.habits", &auth()).await.unwrap();

        manager.activate("tetra.journal").await.unwrap();
        manager.activate("tetra.habits").await.unwrap();

        assert_eq!(
            manager.get("tetra.journal").await.unwrap().status,
            ModuleStatus::Background
        );
        assert_eq!(manager.active().await.unwrap().metadata.id, "tetra.habits");

        // background에서 재활성화 가능
        manager.activate("tetra.journal").await.unwrap();
        assert_eq!(manager.active().await.unwrap().metadata.id, "tetra.journal");
    }

    #[tokio::test]
    async fn test_single_active_invariant() {
        let manager = test_manager().await;
        for id in ["tetra.calendar", "tetra.journal", "tetra.habits"] {
            manager.install(id).await.unwrap();
            manager.dock(id, &auth()).await.unwrap();
            manager.activate(id).await.unwrap();

            let active: Vec<_> = manager
                .installed()
                .await
                .into_iter()
                .filter(|m| m.status == ModuleStatus::Active)
                .collect();
            assert_eq!(active.len(), 1);
            assert_eq!(active[0].metadata.id, id);
        }
    }

    #[tokio::test]
    async fn test_deactivate_and_noop() {
        let manager = test_manager().await;
        manager.install("tetra.journal").await.unwrap();
        manager.dock("tetra.journal", &auth()).await.unwrap();
        manager.activate("tetra.journal").await.unwrap();

        manager.deactivate("tetra.journal").await.unwrap();
        assert_eq!(
            manager.get("tetra.journal").await.unwrap().status,
            ModuleStatus::Background
        );

        // 이미 background면 no-op (이벤트도 추가로 안 나감)
        manager.deactivate("tetra.journal").await.unwrap();
        assert_eq!(
            manager
                .event_bus()
                .history_by_type(ModuleEventType::Deactivated)
                .await
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn test_undock_noop_when_not_connected() {
        let manager = test_manager().await;
        manager.install("tetra.journal").await.unwrap();

        manager.undock("tetra.journal").await.unwrap();
        assert_eq!(
            manager.get("tetra.journal").await.unwrap().status,
            ModuleStatus::Installed
        );

        manager.dock("tetra.journal", &auth()).await.unwrap();
        manager.undock("tetra.journal").await.unwrap();
        manager.undock("tetra.journal").await.unwrap(); // 두 번째는 no-op
        assert_eq!(
            manager
                .event_bus()
                .history_by_type(ModuleEventType::Undocked)
                .await
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn test_initialize_restores_installed_set() {
        let registry = Arc::new(ModuleRegistry::new());
        registry.initialize().await;
        let store: Arc<dyn KvStore> = Arc::new(MemoryStore::new());

        {
            let manager = ModuleManager::new(
                Arc::clone(&registry),
                Arc::clone(&store),
                Arc::new(StubLoader::new()),
            );
            manager.install("tetra.journal").await.unwrap();
            manager.install("tetra.habits").await.unwrap();
        }

        // 새 세션
        let manager = ModuleManager::new(registry, store, Arc::new(StubLoader::new()));
        manager.initialize().await.unwrap();

        assert_eq!(manager.module_count().await, 2);
        assert_eq!(
            manager.get("tetra.journal").await.unwrap().status,
            ModuleStatus::Installed
        );
    }
}
