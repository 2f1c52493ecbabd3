//! Error types for Custodian
//!
//! 레지스트리/자식 라이프사이클 에러를 중앙에서 관리

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// 타입 생성자가 돌려주는 원인 에러 (boxed)
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Custodian 에러 타입
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // 레지스트리 상태 관련
    // ========================================================================
    #[error("Registry closed: '{0}' is closed and unable to process calls")]
    RegistryClosed(String),

    #[error("Key conflict: a child already exists in '{registry}' with key '{key}'")]
    KeyConflict { registry: String, key: String },

    #[error("Registry '{registry}' closed with {} child failure(s): {}", .failures.len(), .failures.join("; "))]
    PartialClose {
        registry: String,
        failures: Vec<String>,
    },

    // ========================================================================
    // 타입 해석 관련
    // ========================================================================
    #[error("Type resolution failed: {type_name} - {reason}")]
    TypeResolution {
        type_name: String,
        reason: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("Type already registered: {0}")]
    DuplicateType(String),

    // ========================================================================
    // 자식 상태 관련
    // ========================================================================
    #[error("Child closed: '{0}' has been closed and may not be used")]
    ChildClosed(String),

    #[error("Child not initialized: {0}")]
    NotInitialized(String),

    #[error("Child already initialized: {0}")]
    AlreadyInitialized(String),

    // ========================================================================
    // 입력 검증
    // ========================================================================
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ========================================================================
    // 설정 관련
    // ========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    // ========================================================================
    // 외부 에러 변환
    // ========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// 호출자가 다른 인자로 재시도할 수 있는 에러인지 확인
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::KeyConflict { .. } | Error::TypeResolution { .. } | Error::InvalidArgument(_)
        )
    }

    /// 닫힌 레지스트리/자식에 대한 호출인지 확인
    pub fn is_closed(&self) -> bool {
        matches!(self, Error::RegistryClosed(_) | Error::ChildClosed(_))
    }

    /// KeyConflict 에러 생성 헬퍼
    pub fn key_conflict(registry: impl Into<String>, key: impl Into<String>) -> Self {
        Error::KeyConflict {
            registry: registry.into(),
            key: key.into(),
        }
    }

    /// 원인 없는 TypeResolution 에러 생성 헬퍼
    pub fn type_resolution(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::TypeResolution {
            type_name: type_name.into(),
            reason: reason.into(),
            source: None,
        }
    }

    /// 원인을 감싼 TypeResolution 에러 생성 헬퍼
    pub fn type_resolution_from(
        type_name: impl Into<String>,
        reason: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Error::TypeResolution {
            type_name: type_name.into(),
            reason: reason.into(),
            source: Some(source.into()),
        }
    }
}
