//! Child Handle - 레지스트리가 돌려주는 자식 핸들

use crate::child::Manageable;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

/// 관리되는 자식에 대한 공유 핸들
///
/// 동등성/해시는 (생성된 타입 이름, 키)로 결정됩니다. 같은 `C`(enum 등) 안에서도
/// 서로 다른 타입으로 생성된 자식은 키가 같아도 다릅니다. 자식이 닫힌 뒤에도 동일합니다.
pub struct ChildHandle<C: Manageable> {
    inner: Arc<C>,

    /// `TypeTable`에서 해석된 타입 이름
    type_name: Arc<str>,
}

impl<C: Manageable> ChildHandle<C> {
    pub(crate) fn new(child: C, type_name: &str) -> Self {
        Self {
            inner: Arc::new(child),
            type_name: Arc::from(type_name),
        }
    }

    /// 생성 시 사용된 타입 이름
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// 내부 Arc 접근
    pub fn as_arc(&self) -> &Arc<C> {
        &self.inner
    }

    /// 같은 인스턴스인지 확인 (키 동등성보다 엄격)
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }
}

impl<C: Manageable> Clone for ChildHandle<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            type_name: Arc::clone(&self.type_name),
        }
    }
}

impl<C: Manageable> Deref for ChildHandle<C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.inner
    }
}

impl<C: Manageable> PartialEq for ChildHandle<C> {
    fn eq(&self, other: &Self) -> bool {
        self.type_name == other.type_name && self.inner.key() == other.inner.key()
    }
}

impl<C: Manageable> Eq for ChildHandle<C> {}

impl<C: Manageable> Hash for ChildHandle<C> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_name.hash(state);
        self.inner.key().hash(state);
    }
}

impl<C: Manageable> fmt::Debug for ChildHandle<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChildHandle")
            .field("type", &self.type_name)
            .field("key", &self.inner.key())
            .field("closed", &self.inner.is_closed())
            .finish()
    }
}
