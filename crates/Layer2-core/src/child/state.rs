//! Child State - 자식이 내장하는 라이프사이클 상태
//!
//! 키, 부모(레지스트리) 역참조, closed 플래그를 보관합니다.
//! 부모 참조는 `Weak`이므로 자식이 레지스트리를 살려두지 않습니다.

use super::traits::Manageable;
use crate::registry::Registry;
use custodian_foundation::{Error, Result, TextRule};
use parking_lot::Mutex;
use std::fmt;
use std::sync::{Arc, OnceLock, Weak};

/// 부모 바인딩 상태
struct Binding<C: Manageable> {
    /// 소유 레지스트리 (non-owning)
    parent: Option<Weak<Registry<C>>>,

    /// initialize 호출 여부
    initialized: bool,

    /// 닫힘 여부
    closed: bool,
}

// ============================================================================
// ChildState
// ============================================================================

/// 자식 라이프사이클 상태
///
/// `Manageable` 구현체가 필드로 하나 들고 있고 `child_state()`로 노출합니다.
/// 기본 trait 메서드들이 모두 이 구조체에 위임합니다.
pub struct ChildState<C: Manageable> {
    /// 바인딩된 키 (정확히 한 번만 설정)
    key: OnceLock<String>,

    /// 부모/플래그
    binding: Mutex<Binding<C>>,
}

impl<C: Manageable> ChildState<C> {
    /// 바인딩되지 않은 새 상태
    pub fn new() -> Self {
        Self {
            key: OnceLock::new(),
            binding: Mutex::new(Binding {
                parent: None,
                initialized: false,
                closed: false,
            }),
        }
    }

    /// 부모와 키를 바인딩 (정확히 한 번)
    pub fn bind(&self, parent: &Arc<Registry<C>>, key: &str) -> Result<()> {
        TextRule::new("key", key).not_blank().check()?;

        let mut binding = self.binding.lock();
        if binding.initialized {
            return Err(Error::AlreadyInitialized(format!(
                "'{}' is already bound to a registry",
                self.key()
            )));
        }

        self.key
            .set(key.to_string())
            .map_err(|_| Error::AlreadyInitialized(format!("key already set for '{}'", key)))?;
        binding.parent = Some(Arc::downgrade(parent));
        binding.initialized = true;
        binding.closed = false;

        Ok(())
    }

    /// 바인딩된 키 (close 이후에도 읽을 수 있음, initialize 이전에는 빈 문자열)
    pub fn key(&self) -> &str {
        self.key.get().map(String::as_str).unwrap_or_default()
    }

    pub fn is_initialized(&self) -> bool {
        self.binding.lock().initialized
    }

    pub fn is_closed(&self) -> bool {
        self.binding.lock().closed
    }

    /// 부모 레지스트리 (close 이후에는 ChildClosed)
    pub fn parent(&self) -> Result<Arc<Registry<C>>> {
        let binding = self.binding.lock();
        let weak = self.require_open(&binding)?;
        weak.upgrade()
            .ok_or_else(|| Error::RegistryClosed(format!("owner of '{}' was dropped", self.key())))
    }

    /// child-initiated close 직전 검사
    ///
    /// 열린 상태라면 (아직 살아있는) 부모를 돌려줍니다. 상태는 바꾸지 않습니다.
    pub(crate) fn open_parent(&self) -> Result<Option<Arc<Registry<C>>>> {
        let binding = self.binding.lock();
        let weak = self.require_open(&binding)?;
        Ok(weak.upgrade())
    }

    /// 부모 참조 해제 + closed 설정 (레지스트리를 다시 호출하지 않음)
    pub fn release(&self) -> Result<()> {
        let mut binding = self.binding.lock();
        self.require_open(&binding)?;
        binding.parent = None;
        binding.closed = true;
        Ok(())
    }

    fn require_open<'b>(&self, binding: &'b Binding<C>) -> Result<&'b Weak<Registry<C>>> {
        if binding.closed {
            return Err(Error::ChildClosed(self.key().to_string()));
        }
        match (&binding.parent, binding.initialized) {
            (Some(parent), true) => Ok(parent),
            _ => Err(Error::NotInitialized(
                "child has not been bound to a registry".to_string(),
            )),
        }
    }
}

impl<C: Manageable> Default for ChildState<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Manageable> fmt::Debug for ChildState<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let binding = self.binding.lock();
        f.debug_struct("ChildState")
            .field("key", &self.key.get())
            .field("initialized", &binding.initialized)
            .field("closed", &binding.closed)
            .field("has_parent", &binding.parent.is_some())
            .finish()
    }
}

// ============================================================================
// SettingsSlot
// ============================================================================

/// 설정값 슬롯 (PropertiedManageable 용)
///
/// 레지스트리는 설정값을 해석하지 않고 그대로 전달만 합니다.
pub struct SettingsSlot<S> {
    value: OnceLock<S>,
}

impl<S> SettingsSlot<S> {
    pub fn new() -> Self {
        Self {
            value: OnceLock::new(),
        }
    }

    pub fn is_set(&self) -> bool {
        self.value.get().is_some()
    }

    /// 설정값 저장 (정확히 한 번)
    pub fn set(&self, key: &str, settings: S) -> Result<()> {
        self.value
            .set(settings)
            .map_err(|_| Error::AlreadyInitialized(format!("settings already set for '{}'", key)))
    }

    /// 저장된 설정값 (initialize 이전이면 NotInitialized)
    pub fn get(&self, key: &str) -> Result<&S> {
        self.value.get().ok_or_else(|| {
            Error::NotInitialized(format!("settings read before initialize for '{}'", key))
        })
    }
}

impl<S> Default for SettingsSlot<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: fmt::Debug> fmt::Debug for SettingsSlot<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingsSlot")
            .field("value", &self.value.get())
            .finish()
    }
}
