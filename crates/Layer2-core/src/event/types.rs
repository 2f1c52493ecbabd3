//! Registry Event Types - 레지스트리 이벤트 정의

use crate::child::Manageable;
use crate::registry::ChildHandle;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// EventKind
// ============================================================================

/// 이벤트 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// 자식 생성됨
    Create,

    /// 자식 조회됨 (없는 키 조회 포함)
    Get,

    /// 자식 제거됨
    Remove,

    /// 레지스트리 닫힘
    Close,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Get => write!(f, "get"),
            Self::Remove => write!(f, "remove"),
            Self::Close => write!(f, "close"),
        }
    }
}

// ============================================================================
// RegistryEvent
// ============================================================================

/// 옵저버에게 전달되는 레지스트리 이벤트
///
/// CLOSE는 `key`/`child`가 없고, 없는 키에 대한 GET은 `child`만 없습니다.
pub struct RegistryEvent<C: Manageable> {
    /// 이벤트 종류
    pub kind: EventKind,

    /// 대상 키
    pub key: Option<String>,

    /// 대상 자식
    pub child: Option<ChildHandle<C>>,

    /// 발생한 레지스트리 이름
    pub registry: String,

    /// 발생한 레지스트리 인스턴스 ID
    pub registry_id: Uuid,

    /// 타임스탬프
    pub timestamp: DateTime<Utc>,
}

impl<C: Manageable> RegistryEvent<C> {
    /// 새 이벤트 생성 (key/child 없음)
    pub fn new(kind: EventKind, registry: impl Into<String>, registry_id: Uuid) -> Self {
        Self {
            kind,
            key: None,
            child: None,
            registry: registry.into(),
            registry_id,
            timestamp: Utc::now(),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_child(mut self, child: Option<ChildHandle<C>>) -> Self {
        self.child = child;
        self
    }

    /// 대상 키 (없으면 None)
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }
}

impl<C: Manageable> Clone for RegistryEvent<C> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            key: self.key.clone(),
            child: self.child.clone(),
            registry: self.registry.clone(),
            registry_id: self.registry_id,
            timestamp: self.timestamp,
        }
    }
}

impl<C: Manageable> fmt::Debug for RegistryEvent<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryEvent")
            .field("kind", &self.kind)
            .field("key", &self.key)
            .field("child", &self.child)
            .field("registry", &self.registry)
            .field("registry_id", &self.registry_id)
            .field("timestamp", &self.timestamp)
            .finish()
    }
}
