//! Hub - 사용자별 조정 루트
//!
//! 지지 구조(사면체), 설정, 모듈별 데이터를 소유하고, 모듈 도킹에
//! 필요한 인증 능력을 발급합니다. Registry와 Manager는 초기화 순서만
//! 책임지고 내부에는 관여하지 않습니다.

mod auth;
mod data;

pub use auth::{HubAuth, HubPermission};
pub use data::{
    DataSharingLevel, HubData, Settings, SettingsUpdate, Tetrahedron, Vertex, VertexCategory,
    VertexUpdate,
};

use crate::module::{ModuleLoader, ModuleManager};
use crate::registry::ModuleRegistry;
use serde_json::Value;
use std::sync::Arc;
use tetra_foundation::{Error, KvStore, Result};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// 사용자별 Hub 영속화 키
fn hub_key(user_id: &str) -> String {
    format!("hub_data_{}", user_id)
}

/// Hub - 애플리케이션 세션당 하나
///
/// 프로세스 전역 싱글톤이 아니라 명시적으로 생성되는 서비스 객체입니다.
/// 같은 저장소를 Registry/Manager와 공유합니다.
pub struct Hub {
    store: Arc<dyn KvStore>,
    registry: Arc<ModuleRegistry>,
    manager: Arc<ModuleManager>,
    state: RwLock<Option<HubData>>,
}

impl Hub {
    /// 새 Hub 생성 - Registry와 Manager를 내부에서 구성
    pub fn new(store: Arc<dyn KvStore>, loader: Arc<dyn ModuleLoader>) -> Self {
        let registry = Arc::new(ModuleRegistry::new());
        let manager = Arc::new(ModuleManager::new(
            Arc::clone(&registry),
            Arc::clone(&store),
            loader,
        ));
        Self::with_components(store, registry, manager)
    }

    /// 기존 컴포넌트들과 함께 생성
    pub fn with_components(
        store: Arc<dyn KvStore>,
        registry: Arc<ModuleRegistry>,
        manager: Arc<ModuleManager>,
    ) -> Self {
        Self {
            store,
            registry,
            manager,
            state: RwLock::new(None),
        }
    }

    /// 레지스트리 접근
    pub fn registry(&self) -> &Arc<ModuleRegistry> {
        &self.registry
    }

    /// 매니저 접근
    pub fn manager(&self) -> &Arc<ModuleManager> {
        &self.manager
    }

    // ========================================================================
    // 초기화
    // ========================================================================

    /// 사용자 Hub 초기화 (멱등 - 이미 초기화됐으면 조용히 no-op)
    ///
    /// 영속 레코드가 있으면 로드하고, 없으면 기본값을 만들어 저장한 뒤
    /// Registry → Manager 순서로 초기화합니다.
    pub async fn initialize(&self, user_id: &str) -> Result<()> {
        {
            let state = self.state.read().await;
            if state.is_some() {
                debug!("Hub already initialized, skipping");
                return Ok(());
            }
        }

        let key = hub_key(user_id);
        let data = match self.store.load_json::<HubData>(&key).await? {
            Some(data) => {
                info!("Loaded hub data for {}", user_id);
                data
            }
            None => {
                info!("Creating default hub data for {}", user_id);
                let data = HubData::defaults(user_id);
                self.store.save_json(&key, &data).await?;
                data
            }
        };

        *self.state.write().await = Some(data);

        self.registry.initialize().await;
        self.manager.initialize().await?;
        Ok(())
    }

    // ========================================================================
    // 지지 구조
    // ========================================================================

    /// 사면체 조회
    pub async fn tetrahedron(&self) -> Result<Tetrahedron> {
        let state = self.state.read().await;
        let data = Self::require(&state, "tetrahedron")?;
        Ok(data.tetrahedron.clone())
    }

    /// 사면체 전체 교체 - 구조 불변식 검증 후 즉시 영속화
    pub async fn update_tetrahedron(&self, tetrahedron: Tetrahedron) -> Result<()> {
        tetrahedron.validate()?;

        let mut state = self.state.write().await;
        let mut data = Self::require(&state, "update_tetrahedron")?.clone();
        data.tetrahedron = tetrahedron;
        self.persist(&data).await?;
        *state = Some(data);
        Ok(())
    }

    /// 정점 부분 업데이트 - 성공 시 즉시 영속화
    pub async fn update_vertex(&self, id: &str, update: VertexUpdate) -> Result<()> {
        let mut state = self.state.write().await;
        let mut data = Self::require(&state, "update_vertex")?.clone();

        let vertex = data
            .tetrahedron
            .vertex_mut(id)
            .ok_or_else(|| Error::VertexNotFound(id.to_string()))?;
        update.apply(vertex);
        data.tetrahedron.updated_at = chrono::Utc::now();

        self.persist(&data).await?;
        *state = Some(data);
        Ok(())
    }

    // ========================================================================
    // 설정
    // ========================================================================

    /// 설정 조회
    pub async fn settings(&self) -> Result<Settings> {
        let state = self.state.read().await;
        let data = Self::require(&state, "settings")?;
        Ok(data.settings.clone())
    }

    /// 설정 얕은 병합 - 즉시 영속화
    pub async fn update_settings(&self, update: SettingsUpdate) -> Result<()> {
        let mut state = self.state.write().await;
        let mut data = Self::require(&state, "update_settings")?.clone();
        update.apply(&mut data.settings);
        self.persist(&data).await?;
        *state = Some(data);
        Ok(())
    }

    // ========================================================================
    // 인증
    // ========================================================================

    /// 인증 발급 - 호출마다 새 토큰
    pub async fn auth(&self) -> Result<HubAuth> {
        let state = self.state.read().await;
        let data = Self::require(&state, "auth")?;
        Ok(HubAuth::issue(&data.user_id))
    }

    // ========================================================================
    // 모듈 데이터 (불투명 슬롯)
    // ========================================================================

    /// 모듈 데이터 저장
    pub async fn set_module_data(&self, module_id: &str, value: Value) -> Result<()> {
        let mut state = self.state.write().await;
        let mut data = Self::require(&state, "set_module_data")?.clone();
        data.module_data.insert(module_id.to_string(), value);
        self.persist(&data).await?;
        *state = Some(data);
        Ok(())
    }

    /// 모듈 데이터 조회
    pub async fn module_data(&self, module_id: &str) -> Result<Option<Value>> {
        let state = self.state.read().await;
        let data = Self::require(&state, "module_data")?;
        Ok(data.module_data.get(module_id).cloned())
    }

    /// 모듈 데이터 삭제 (없으면 no-op)
    pub async fn clear_module_data(&self, module_id: &str) -> Result<()> {
        let mut state = self.state.write().await;
        let mut data = Self::require(&state, "clear_module_data")?.clone();
        data.module_data.remove(module_id);
        self.persist(&data).await?;
        *state = Some(data);
        Ok(())
    }

    // ========================================================================
    // 내보내기 / 가져오기
    // ========================================================================

    /// 전체 HubData를 JSON 문자열로 직렬화
    pub async fn export(&self) -> Result<String> {
        let state = self.state.read().await;
        let data = Self::require(&state, "export")?;
        Ok(serde_json::to_string_pretty(data)?)
    }

    /// JSON 페이로드 가져오기 - 검증 성공 시 상태 전체 교체
    ///
    /// `userId`, `tetrahedron`, `settings`가 없으면 거부하고 기존 상태를
    /// 그대로 둡니다.
    pub async fn import(&self, payload: &str) -> Result<()> {
        let mut state = self.state.write().await;
        Self::require(&state, "import")?;

        let value: Value = serde_json::from_str(payload)
            .map_err(|e| Error::ImportValidation(format!("invalid JSON: {}", e)))?;

        for field in ["userId", "tetrahedron", "settings"] {
            if value.get(field).is_none() {
                return Err(Error::ImportValidation(format!(
                    "missing required field: {}",
                    field
                )));
            }
        }

        let data: HubData = serde_json::from_value(value)
            .map_err(|e| Error::ImportValidation(format!("malformed payload: {}", e)))?;
        data.tetrahedron
            .validate()
            .map_err(|e| Error::ImportValidation(e.to_string()))?;

        self.persist(&data).await?;
        info!("Imported hub data for {}", data.user_id);
        *state = Some(data);
        Ok(())
    }

    // ========================================================================
    // 리셋
    // ========================================================================

    /// 모든 상태를 버리고 같은 사용자의 기본값으로 재생성
    /// (초기화 전이면 no-op)
    pub async fn reset(&self) -> Result<()> {
        let mut state = self.state.write().await;
        let Some(current) = state.as_ref() else {
            debug!("Hub not initialized, reset is a no-op");
            return Ok(());
        };

        let data = HubData::defaults(current.user_id.clone());
        self.persist(&data).await?;
        info!("Reset hub data for {}", data.user_id);
        *state = Some(data);
        Ok(())
    }

    fn require<'a>(state: &'a Option<HubData>, operation: &str) -> Result<&'a HubData> {
        state
            .as_ref()
            .ok_or_else(|| Error::NotInitialized(operation.to_string()))
    }

    async fn persist(&self, data: &HubData) -> Result<()> {
        self.store.save_json(&hub_key(&data.user_id), data).await
    }
}
