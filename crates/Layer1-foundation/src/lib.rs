//! # custodian-foundation
//!
//! Foundation layer for Custodian:
//! - Error: 레지스트리/자식 라이프사이클 에러 분류
//! - Validate: 키/타입 이름 인자 검증
//! - Config: RegistryConfig (길이 제한, close 정책)
//! - Storage: JsonStore (설정 파일)
//!
//! ## 아키텍처
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  custodian-core (Registry, Manageable, Observer)        │
//! │                     │                                   │
//! │                     ▼                                   │
//! │  ┌──────────┬──────────────┬──────────────────────┐    │
//! │  │  Error   │   Validate   │  Config ── JsonStore │    │
//! │  └──────────┴──────────────┴──────────────────────┘    │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod storage;
pub mod validate;

// ============================================================================
// Error
// ============================================================================
pub use error::{BoxError, Error, Result};

// ============================================================================
// Config (설정)
// ============================================================================
pub use config::{
    ClosePolicy, RegistryConfig, KEY_MAX_LENGTH, REGISTRY_CONFIG_FILE, TYPE_NAME_MAX_LENGTH,
};

// ============================================================================
// Storage (저장소)
// ============================================================================
pub use storage::JsonStore;

// ============================================================================
// Validate (인자 검증)
// ============================================================================
pub use validate::{require_text, TextRule};
