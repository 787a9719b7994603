//! Module Events - 라이프사이클 이벤트 시스템

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, error};

// ============================================================================
// ModuleEvent - 라이프사이클 이벤트 타입
// ============================================================================

/// 이벤트 타입
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleEventType {
    Installed,
    Uninstalled,
    Docked,
    Undocked,
    Activated,
    Deactivated,
}

impl std::fmt::Display for ModuleEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Installed => write!(f, "module:installed"),
            Self::Uninstalled => write!(f, "module:uninstalled"),
            Self::Docked => write!(f, "module:docked"),
            Self::Undocked => write!(f, "module:undocked"),
            Self::Activated => write!(f, "module:activated"),
            Self::Deactivated => write!(f, "module:deactivated"),
        }
    }
}

/// 라이프사이클 이벤트 - 불변, fire-and-forget, 영속화 안함
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleEvent {
    /// 이벤트 타입
    pub event_type: ModuleEventType,

    /// 대상 모듈 ID
    pub module_id: String,

    /// 타임스탬프
    pub timestamp: DateTime<Utc>,

    /// 추가 데이터 (예: 도킹 이벤트의 연결 상태)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ModuleEvent {
    /// 새 이벤트 생성
    pub fn new(event_type: ModuleEventType, module_id: impl Into<String>) -> Self {
        Self {
            event_type,
            module_id: module_id.into(),
            timestamp: Utc::now(),
            data: None,
        }
    }

    /// 추가 데이터 설정
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

// ============================================================================
// ModuleEventHandler - 이벤트 핸들러 트레이트
// ============================================================================

/// 이벤트 핸들러 트레이트
#[async_trait]
pub trait ModuleEventHandler: Send + Sync {
    /// 핸들러 이름 (등록 해제 키)
    fn name(&self) -> &str;

    /// 관심 있는 이벤트 타입들
    fn interested_events(&self) -> Vec<ModuleEventType>;

    /// 이벤트 처리
    async fn handle(&self, event: &ModuleEvent);
}

// ============================================================================
// EventBus - 이벤트 버스 (발행/구독)
// ============================================================================

/// 이벤트 버스 - 이벤트 발행 및 구독 관리
///
/// 핸들러는 등록 순서대로 동기 호출됩니다. 핸들러 하나가 패닉해도
/// 나머지 핸들러 전달과 발행 측 제어 흐름은 영향받지 않습니다.
pub struct EventBus {
    /// 브로드캐스트 채널 발신자
    sender: broadcast::Sender<ModuleEvent>,

    /// 등록된 핸들러 (등록 순서 유지)
    handlers: RwLock<Vec<Arc<dyn ModuleEventHandler>>>,

    /// 이벤트 히스토리 (최근 N개)
    history: RwLock<Vec<ModuleEvent>>,

    /// 히스토리 최대 크기
    history_size: usize,
}

impl EventBus {
    /// 새 이벤트 버스 생성
    pub fn new() -> Self {
        Self::with_capacity(256, 100)
    }

    /// 용량 지정하여 생성
    pub fn with_capacity(channel_capacity: usize, history_size: usize) -> Self {
        let (sender, _) = broadcast::channel(channel_capacity);
        Self {
            sender,
            handlers: RwLock::new(Vec::new()),
            history: RwLock::new(Vec::with_capacity(history_size)),
            history_size,
        }
    }

    /// 이벤트 핸들러 등록 (같은 이름이면 그 자리에서 교체)
    pub async fn register_handler(&self, handler: Arc<dyn ModuleEventHandler>) {
        let mut handlers = self.handlers.write().await;
        if let Some(existing) = handlers.iter_mut().find(|h| h.name() == handler.name()) {
            *existing = handler;
        } else {
            handlers.push(handler);
        }
    }

    /// 이벤트 핸들러 제거
    pub async fn unregister_handler(&self, name: &str) {
        let mut handlers = self.handlers.write().await;
        handlers.retain(|h| h.name() != name);
    }

    /// 이벤트 발행
    ///
    /// 호출 시점에는 해당 상태 변경이 이미 커밋/영속화된 뒤여야 합니다.
    pub async fn publish(&self, event: ModuleEvent) {
        debug!("Publishing event: {} for {}", event.event_type, event.module_id);

        // 히스토리에 추가
        {
            let mut history = self.history.write().await;
            if history.len() >= self.history_size {
                history.remove(0);
            }
            history.push(event.clone());
        }

        // 브로드캐스트 (구독자가 없어도 OK)
        let _ = self.sender.send(event.clone());

        // 핸들러 호출 - 등록 순서대로, 패닉 격리
        let handlers = self.handlers.read().await.clone();
        for handler in handlers {
            if !handler.interested_events().contains(&event.event_type) {
                continue;
            }
            let delivery = AssertUnwindSafe(handler.handle(&event)).catch_unwind();
            if delivery.await.is_err() {
                error!(
                    "Event handler {} panicked on {}, continuing delivery",
                    handler.name(),
                    event.event_type
                );
            }
        }
    }

    /// 이벤트 구독 (스트림 반환)
    pub fn subscribe(&self) -> broadcast::Receiver<ModuleEvent> {
        self.sender.subscribe()
    }

    /// 이벤트 히스토리 조회
    pub async fn history(&self) -> Vec<ModuleEvent> {
        self.history.read().await.clone()
    }

    /// 특정 타입의 이벤트 히스토리 조회
    pub async fn history_by_type(&self, event_type: ModuleEventType) -> Vec<ModuleEvent> {
        self.history
            .read()
            .await
            .iter()
            .filter(|e| e.event_type == event_type)
            .cloned()
            .collect()
    }

    /// 히스토리 클리어
    pub async fn clear_history(&self) {
        self.history.write().await.clear();
    }

    /// 등록된 핸들러 수
    pub async fn handler_count(&self) -> usize {
        self.handlers.read().await.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::Mutex;

    struct Recorder {
        name: String,
        seen: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl ModuleEventHandler for Recorder {
        fn name(&self) -> &str {
            &self.name
        }

        fn interested_events(&self) -> Vec<ModuleEventType> {
            vec![ModuleEventType::Installed, ModuleEventType::Activated]
        }

        async fn handle(&self, event: &ModuleEvent) {
            self.seen
                .lock()
                .await
                .push(format!("{}:{}", self.name, event.module_id));
        }
    }

    struct Panicker;

    #[async_trait]
    impl ModuleEventHandler for Panicker {
        fn name(&self) -> &str {
            "panicker"
        }

        fn interested_events(&self) -> Vec<ModuleEventType> {
            vec![ModuleEventType::Installed]
        }

        async fn handle(&self, _event: &ModuleEvent) {
            panic!("subscriber failure");
        }
    }

    #[tokio::test]
    async fn test_delivery_in_subscription_order() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        bus.register_handler(Arc::new(Recorder {
            name: "first".into(),
            seen: Arc::clone(&seen),
        }))
        .await;
        bus.register_handler(Arc::new(Recorder {
            name: "second".into(),
            seen: Arc::clone(&seen),
        }))
        .await;

        bus.publish(ModuleEvent::new(ModuleEventType::Installed, "m")).await;

        assert_eq!(*seen.lock().await, vec!["first:m", "second:m"]);
    }

    #[tokio::test]
    async fn test_unregister_stops_delivery() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        bus.register_handler(Arc::new(Recorder {
            name: "only".into(),
            seen: Arc::clone(&seen),
        }))
        .await;
        bus.unregister_handler("only").await;

        bus.publish(ModuleEvent::new(ModuleEventType::Installed, "m")).await;

        assert!(seen.lock().await.is_empty());
        assert_eq!(bus.handler_count().await, 0);
    }

    #[tokio::test]
    async fn test_panicking_handler_does_not_block_others() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        bus.register_handler(Arc::new(Panicker)).await;
        bus.register_handler(Arc::new(Recorder {
            name: "survivor".into(),
            seen: Arc::clone(&seen),
        }))
        .await;

        bus.publish(ModuleEvent::new(ModuleEventType::Installed, "m")).await;

        assert_eq!(*seen.lock().await, vec!["survivor:m"]);
    }

    #[tokio::test]
    async fn test_uninterested_events_skipped() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        bus.register_handler(Arc::new(Recorder {
            name: "r".into(),
            seen: Arc::clone(&seen),
        }))
        .await;

        bus.publish(ModuleEvent::new(ModuleEventType::Undocked, "m")).await;

        assert!(seen.lock().await.is_empty());
        // 히스토리에는 남음
        assert_eq!(bus.history().await.len(), 1);
    }

    #[tokio::test]
    async fn test_history_by_type() {
        let bus = EventBus::new();

        bus.publish(ModuleEvent::new(ModuleEventType::Installed, "a")).await;
        bus.publish(ModuleEvent::new(ModuleEventType::Docked, "a")).await;
        bus.publish(ModuleEvent::new(ModuleEventType::Installed, "b")).await;

        let installed = bus.history_by_type(ModuleEventType::Installed).await;
        assert_eq!(installed.len(), 2);

        bus.clear_history().await;
        assert!(bus.history().await.is_empty());
    }
}
