//! Child traits - 자식 라이프사이클 인터페이스
//!
//! ## Two-phase close
//!
//! ```text
//!  child.close()                      registry.close_child(key) / registry.close()
//!       │                                        │
//!       └──► registry.close_child(key) ──► map에서 제거
//!                                                │
//!                                                ▼
//!                                   child.close_without_remove()
//!                                   (레지스트리를 다시 호출하지 않음)
//! ```

use super::state::{ChildState, SettingsSlot};
use crate::registry::Registry;
use custodian_foundation::{Error, Result};
use std::sync::Arc;
use tracing::warn;

// ============================================================================
// Manageable - 레지스트리가 관리하는 자식
// ============================================================================

/// 레지스트리가 생성/관리하는 자식이 구현해야 하는 trait
///
/// 필수 메서드는 `child_state()` 하나이고 나머지는 기본 구현이 있습니다.
/// 기본 구현을 덮어쓸 때도 two-phase close 규칙은 지켜야 합니다.
pub trait Manageable: Send + Sync + Sized + 'static {
    /// 내장된 라이프사이클 상태
    fn child_state(&self) -> &ChildState<Self>;

    /// 초기화 (생성 직후 소유 레지스트리가 한 번만 호출)
    fn initialize(&self, parent: &Arc<Registry<Self>>, key: &str) -> Result<()> {
        self.child_state().bind(parent, key)
    }

    /// 자식 쪽에서 시작하는 close
    ///
    /// 부모의 `close_child(key)`를 호출하고, 부모가 `close_without_remove()`로
    /// 되돌아와 상태를 정리합니다.
    fn close(&self) -> Result<()> {
        let state = self.child_state();

        if let Some(parent) = state.open_parent()? {
            parent.close_child(self.key())?;
        }

        if !state.is_closed() {
            // 부모가 이미 사라졌거나 맵에 이 자식이 없음
            warn!(key = %self.key(), "Releasing child that is no longer held by its registry");
            self.close_without_remove()?;
        }

        Ok(())
    }

    /// 레지스트리 쪽에서 시작하는 close (레지스트리만 호출)
    ///
    /// 절대 레지스트리를 다시 호출하지 않습니다.
    fn close_without_remove(&self) -> Result<()> {
        self.child_state().release()?;
        self.on_close();
        Ok(())
    }

    /// closed로 전이된 직후 한 번 호출되는 훅 (리소스 정리용)
    fn on_close(&self) {}

    /// 바인딩된 키
    fn key(&self) -> &str {
        self.child_state().key()
    }

    /// 소유 레지스트리
    fn parent(&self) -> Result<Arc<Registry<Self>>> {
        self.child_state().parent()
    }

    /// 닫힘 여부
    fn is_closed(&self) -> bool {
        self.child_state().is_closed()
    }
}

// ============================================================================
// PropertiedManageable - 설정값을 받는 자식
// ============================================================================

/// 초기화 시 설정값을 함께 받는 자식
pub trait PropertiedManageable: Manageable {
    /// 호출자가 정하는 설정값 타입 (레지스트리는 해석하지 않음)
    type Settings: Send + Sync + 'static;

    /// 내장된 설정값 슬롯
    fn settings_slot(&self) -> &SettingsSlot<Self::Settings>;

    /// 설정값과 함께 초기화
    fn initialize_with_settings(
        &self,
        parent: &Arc<Registry<Self>>,
        key: &str,
        settings: Self::Settings,
    ) -> Result<()> {
        if self.settings_slot().is_set() {
            return Err(Error::AlreadyInitialized(format!(
                "settings already set for '{}'",
                key
            )));
        }

        self.initialize(parent, key)?;
        self.settings_slot().set(key, settings)
    }

    /// 생성 시 전달된 설정값
    fn settings(&self) -> Result<&Self::Settings> {
        self.settings_slot().get(self.key())
    }
}
