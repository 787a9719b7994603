//! Hub Auth - 도킹용 인증 능력
//!
//! 토큰은 요청마다 새로 발급되며 Hub는 캐시하거나 검증하지 않습니다.
//! 검증은 (있다면) 받는 모듈의 소관입니다.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 인증에 부여되는 권한
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HubPermission {
    /// 지지 구조 읽기
    ReadStructure,

    /// 자신의 모듈 데이터 쓰기
    WriteModuleData,

    /// 라이프사이클 이벤트 구독
    SubscribeEvents,
}

/// 모듈이 도킹에 사용하는 인증 능력
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HubAuth {
    pub user_id: String,

    /// 불투명 토큰 - 발급마다 새 값
    pub token: String,

    /// 고정 권한 집합
    pub permissions: Vec<HubPermission>,
}

impl HubAuth {
    /// 새 인증 발급
    pub fn issue(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            token: Uuid::new_v4().to_string(),
            permissions: vec![
                HubPermission::ReadStructure,
                HubPermission::WriteModuleData,
                HubPermission::SubscribeEvents,
            ],
        }
    }

    /// 권한 보유 여부
    pub fn has_permission(&self, permission: HubPermission) -> bool {
        self.permissions.contains(&permission)
    }
}
