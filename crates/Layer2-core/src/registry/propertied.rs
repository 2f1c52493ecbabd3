//! Propertied Registry - 설정값과 함께 자식을 생성하는 레지스트리
//!
//! `Registry<C>`를 감싸고 `create`에만 설정값 인자를 추가합니다.
//! 나머지 규칙(검사 순서, 이벤트, close)은 기본 레지스트리와 동일합니다.

use super::handle::ChildHandle;
use super::keyed::Registry;
use super::types::TypeTable;
use crate::child::PropertiedManageable;
use crate::event::{ObserverId, RegistryObserver};
use custodian_foundation::{RegistryConfig, Result};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// 설정값을 받는 자식용 레지스트리
pub struct PropertiedRegistry<C: PropertiedManageable> {
    inner: Arc<Registry<C>>,
}

impl<C: PropertiedManageable> PropertiedRegistry<C> {
    pub fn new(types: TypeTable<C>) -> Self {
        Self {
            inner: Registry::new(types),
        }
    }

    /// 설정 검증은 `Registry::with_config`와 동일
    pub fn with_config(config: RegistryConfig, types: TypeTable<C>) -> Result<Self> {
        Ok(Self {
            inner: Registry::with_config(config, types)?,
        })
    }

    /// 내부 레지스트리
    pub fn registry(&self) -> &Arc<Registry<C>> {
        &self.inner
    }

    // ========================================================================
    // 생성
    // ========================================================================

    /// 타입 이름으로 생성하고 설정값을 전달
    pub fn create(
        &self,
        key: &str,
        type_name: &str,
        settings: C::Settings,
    ) -> Result<ChildHandle<C>> {
        self.inner
            .create_with(key, type_name, move |child, parent, key| {
                child.initialize_with_settings(parent, key, settings)
            })
    }

    /// 타입 이름을 키로 사용해서 생성
    pub fn create_named(&self, type_name: &str, settings: C::Settings) -> Result<ChildHandle<C>> {
        self.create(type_name, type_name, settings)
    }

    // ========================================================================
    // 위임
    // ========================================================================

    pub fn get(&self, key: &str) -> Result<Option<ChildHandle<C>>> {
        self.inner.get(key)
    }

    pub fn contains_child(&self, key: &str) -> Result<bool> {
        self.inner.contains_child(key)
    }

    pub fn child_count(&self) -> Result<usize> {
        self.inner.child_count()
    }

    pub fn keys(&self) -> Result<BTreeSet<String>> {
        self.inner.keys()
    }

    pub fn close_child(&self, key: &str) -> Result<Option<ChildHandle<C>>> {
        self.inner.close_child(key)
    }

    pub fn close(&self) -> Result<()> {
        self.inner.close()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    pub fn add_observer(&self, observer: Arc<dyn RegistryObserver<C>>) -> Result<ObserverId> {
        self.inner.add_observer(observer)
    }

    pub fn remove_observer(&self, id: ObserverId) -> Result<bool> {
        self.inner.remove_observer(id)
    }

    pub fn observer_count(&self) -> Result<usize> {
        self.inner.observer_count()
    }
}

impl<C: PropertiedManageable> Clone for PropertiedRegistry<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: PropertiedManageable> fmt::Debug for PropertiedRegistry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PropertiedRegistry").field(&self.inner).finish()
    }
}
