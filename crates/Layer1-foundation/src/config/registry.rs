//! Registry Config - 레지스트리 설정
//!
//! 키/타입 이름 길이 제한과 close 실패 정책을 설정합니다.
//! 글로벌 + 프로젝트 JSON 파일을 병합해서 로드할 수 있습니다.

use crate::storage::JsonStore;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// 설정 파일명
pub const REGISTRY_CONFIG_FILE: &str = "registry.json";

/// 키 최대 길이 (기본값)
pub const KEY_MAX_LENGTH: usize = 256;

/// 타입 이름 최대 길이 (기본값)
pub const TYPE_NAME_MAX_LENGTH: usize = 2048;

// ============================================================================
// ClosePolicy
// ============================================================================

/// `Registry::close()` 중 자식 close가 실패했을 때의 처리 방식
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClosePolicy {
    /// 첫 실패를 그대로 전파하고 중단 (레지스트리는 열린 상태 유지)
    #[default]
    FailFast,

    /// 모든 자식을 정리한 뒤 실패 목록을 모아서 반환 (레지스트리는 닫힘)
    BestEffort,
}

impl std::fmt::Display for ClosePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FailFast => write!(f, "fail_fast"),
            Self::BestEffort => write!(f, "best_effort"),
        }
    }
}

// ============================================================================
// RegistryConfig
// ============================================================================

/// 레지스트리 설정
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryConfig {
    /// 레지스트리 이름 (로그/에러 메시지용)
    #[serde(default = "default_name")]
    pub name: String,

    /// 키 최대 길이
    #[serde(default = "default_key_max_length")]
    pub key_max_length: usize,

    /// 타입 이름 최대 길이
    #[serde(default = "default_type_name_max_length")]
    pub type_name_max_length: usize,

    /// close 실패 정책
    #[serde(default)]
    pub close_policy: ClosePolicy,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            key_max_length: KEY_MAX_LENGTH,
            type_name_max_length: TYPE_NAME_MAX_LENGTH,
            close_policy: ClosePolicy::default(),
        }
    }
}

impl RegistryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Load / Save
    // ========================================================================

    /// 글로벌 + 프로젝트 병합 로드
    ///
    /// `<config_dir>/custodian/registry.json` 위에 `./.custodian/registry.json`을 덮어씁니다.
    pub fn load() -> Result<Self> {
        let global = JsonStore::global().ok();
        let project = JsonStore::current_project().ok();
        Self::load_layered(global.as_ref(), project.as_ref())
    }

    /// 지정한 저장소들을 순서대로 병합 (없는 저장소/파일은 건너뜀)
    pub fn load_layered(global: Option<&JsonStore>, project: Option<&JsonStore>) -> Result<Self> {
        let mut config = Self::new();

        for store in [global, project].into_iter().flatten() {
            if let Some(layer) = store.load_optional::<RegistryConfig>(REGISTRY_CONFIG_FILE)? {
                debug!(
                    path = %store.file_path(REGISTRY_CONFIG_FILE).display(),
                    "Merging registry config"
                );
                config.merge(layer);
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// 특정 저장소에서 로드 (파일이 없으면 기본값)
    pub fn load_from(store: &JsonStore) -> Result<Self> {
        let config = store
            .load_optional::<RegistryConfig>(REGISTRY_CONFIG_FILE)?
            .unwrap_or_default();
        config.validate()?;
        Ok(config)
    }

    /// 특정 저장소에 저장
    pub fn save_to(&self, store: &JsonStore) -> Result<()> {
        self.validate()?;
        store.save(REGISTRY_CONFIG_FILE, self)
    }

    // ========================================================================
    // Merge / Validate
    // ========================================================================

    /// 다른 설정과 병합 (other가 기본값이 아닌 항목만 우선)
    pub fn merge(&mut self, other: RegistryConfig) {
        if other.name != default_name() {
            self.name = other.name;
        }
        if other.key_max_length != KEY_MAX_LENGTH {
            self.key_max_length = other.key_max_length;
        }
        if other.type_name_max_length != TYPE_NAME_MAX_LENGTH {
            self.type_name_max_length = other.type_name_max_length;
        }
        if other.close_policy != ClosePolicy::default() {
            self.close_policy = other.close_policy;
        }
    }

    /// 설정 값 검사
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Config("registry name must not be empty".to_string()));
        }
        if self.key_max_length == 0 {
            return Err(Error::Config("keyMaxLength must be greater than 0".to_string()));
        }
        if self.type_name_max_length == 0 {
            return Err(Error::Config(
                "typeNameMaxLength must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    // ========================================================================
    // Builder
    // ========================================================================

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn key_max_length(mut self, max: usize) -> Self {
        self.key_max_length = max;
        self
    }

    pub fn type_name_max_length(mut self, max: usize) -> Self {
        self.type_name_max_length = max;
        self
    }

    pub fn close_policy(mut self, policy: ClosePolicy) -> Self {
        self.close_policy = policy;
        self
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn default_name() -> String {
    "registry".to_string()
}

fn default_key_max_length() -> usize {
    KEY_MAX_LENGTH
}

fn default_type_name_max_length() -> usize {
    TYPE_NAME_MAX_LENGTH
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_registry_config_default() {
        let config = RegistryConfig::new();
        assert_eq!(config.name, "registry");
        assert_eq!(config.key_max_length, 256);
        assert_eq!(config.type_name_max_length, 2048);
        assert_eq!(config.close_policy, ClosePolicy::FailFast);
    }

    #[test]
    fn test_registry_config_builder() {
        let config = RegistryConfig::new()
            .name("sessions")
            .key_max_length(32)
            .close_policy(ClosePolicy::BestEffort);

        assert_eq!(config.name, "sessions");
        assert_eq!(config.key_max_length, 32);
        assert_eq!(config.type_name_max_length, TYPE_NAME_MAX_LENGTH);
        assert_eq!(config.close_policy, ClosePolicy::BestEffort);
    }

    #[test]
    fn test_merge_keeps_base_for_defaults() {
        let mut base = RegistryConfig::new().name("global").key_max_length(64);
        let project = RegistryConfig::new().close_policy(ClosePolicy::BestEffort);

        base.merge(project);

        assert_eq!(base.name, "global");
        assert_eq!(base.key_max_length, 64);
        assert_eq!(base.close_policy, ClosePolicy::BestEffort);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: RegistryConfig =
            serde_json::from_str(r#"{ "closePolicy": "best_effort" }"#).unwrap();
        assert_eq!(config.name, "registry");
        assert_eq!(config.key_max_length, KEY_MAX_LENGTH);
        assert_eq!(config.close_policy, ClosePolicy::BestEffort);
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        assert!(RegistryConfig::new().key_max_length(0).validate().is_err());
        assert!(RegistryConfig::new().type_name_max_length(0).validate().is_err());
        assert!(RegistryConfig::new().name("  ").validate().is_err());
    }

    #[test]
    fn test_save_and_load_from_store() {
        let dir = tempdir().unwrap();
        let store = JsonStore::new(dir.path());

        // 파일이 없으면 기본값
        assert_eq!(RegistryConfig::load_from(&store).unwrap(), RegistryConfig::default());

        let config = RegistryConfig::new().name("widgets").type_name_max_length(128);
        config.save_to(&store).unwrap();

        let loaded = RegistryConfig::load_from(&store).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_layered_project_overrides_global() {
        let global_dir = tempdir().unwrap();
        let project_dir = tempdir().unwrap();
        let global = JsonStore::new(global_dir.path());
        let project = JsonStore::project(project_dir.path());

        RegistryConfig::new()
            .name("global")
            .key_max_length(64)
            .save_to(&global)
            .unwrap();
        RegistryConfig::new()
            .name("project")
            .close_policy(ClosePolicy::BestEffort)
            .save_to(&project)
            .unwrap();

        let config = RegistryConfig::load_layered(Some(&global), Some(&project)).unwrap();
        assert_eq!(config.name, "project");
        assert_eq!(config.key_max_length, 64);
        assert_eq!(config.close_policy, ClosePolicy::BestEffort);

        // 프로젝트 파일이 없으면 글로벌만 적용
        let empty = JsonStore::project(tempdir().unwrap().path());
        let config = RegistryConfig::load_layered(Some(&global), Some(&empty)).unwrap();
        assert_eq!(config.name, "global");
        assert_eq!(config.close_policy, ClosePolicy::FailFast);

        assert_eq!(
            RegistryConfig::load_layered(None, None).unwrap(),
            RegistryConfig::default()
        );
    }

    #[test]
    fn test_load_layered_rejects_invalid_result() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(REGISTRY_CONFIG_FILE), r#"{ "keyMaxLength": 0 }"#).unwrap();
        let store = JsonStore::new(dir.path());

        let err = RegistryConfig::load_layered(None, Some(&store)).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
