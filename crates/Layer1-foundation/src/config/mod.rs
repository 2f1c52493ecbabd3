//! Config - 레지스트리 설정 관리
//!
//! - `registry.rs` - RegistryConfig (길이 제한, close 정책)

mod registry;

pub use registry::{
    ClosePolicy, RegistryConfig, KEY_MAX_LENGTH, REGISTRY_CONFIG_FILE, TYPE_NAME_MAX_LENGTH,
};
