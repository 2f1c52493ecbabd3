//! Type Table - 이름 기반 자식 생성자 테이블
//!
//! 타입 이름(문자열)을 생성자 함수에 매핑합니다. 시작 시점에 채워두고
//! `Registry::create(key, type_name)`이 여기서 생성자를 찾습니다.

use custodian_foundation::{require_text, Error, Result, TYPE_NAME_MAX_LENGTH};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// 자식 생성자
pub type Constructor<C> = Arc<dyn Fn() -> anyhow::Result<C> + Send + Sync>;

/// 타입의 식별자 문자열 (`std::any::type_name`)
///
/// 타입 자체로 등록/생성할 때 키로 사용합니다.
pub fn type_identifier<T: ?Sized>() -> &'static str {
    std::any::type_name::<T>()
}

/// 타입 이름 → 생성자 테이블
pub struct TypeTable<C> {
    constructors: HashMap<String, Constructor<C>>,
}

impl<C: 'static> TypeTable<C> {
    /// 빈 테이블 생성
    pub fn new() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    // ========================================================================
    // 등록
    // ========================================================================

    /// 생성자 등록
    ///
    /// 이름은 비어있지 않고 `TYPE_NAME_MAX_LENGTH` 이하여야 하며, 이미 있는 이름이면
    /// `DuplicateType`입니다.
    pub fn register<F>(&mut self, type_name: impl Into<String>, constructor: F) -> Result<()>
    where
        F: Fn() -> anyhow::Result<C> + Send + Sync + 'static,
    {
        let type_name = type_name.into();
        require_text("type name", &type_name, TYPE_NAME_MAX_LENGTH)?;

        if self.constructors.contains_key(&type_name) {
            return Err(Error::DuplicateType(type_name));
        }

        debug!(type_name = %type_name, "Registered child constructor");
        self.constructors.insert(type_name, Arc::new(constructor));
        Ok(())
    }

    /// 빌더 스타일 등록 (`register`와 같은 검사)
    ///
    /// ```ignore
    /// let types = TypeTable::new()
    ///     .with("cache", || Ok(Resource::cache()))?
    ///     .with("socket", || Ok(Resource::socket()))?;
    /// ```
    pub fn with<F>(mut self, type_name: impl Into<String>, constructor: F) -> Result<Self>
    where
        F: Fn() -> anyhow::Result<C> + Send + Sync + 'static,
    {
        self.register(type_name, constructor)?;
        Ok(self)
    }

    /// `T::default()`로 생성되는 타입을 `type_identifier::<T>()` 이름으로 등록
    ///
    /// `C`가 enum일 때 variant 타입별로 등록하는 용도입니다.
    pub fn with_type<T>(self) -> Result<Self>
    where
        T: Default + Into<C> + 'static,
    {
        self.with(type_identifier::<T>(), || Ok(T::default().into()))
    }

    /// `C::default()`를 `type_identifier::<C>()` 이름으로 등록
    pub fn with_default(self) -> Result<Self>
    where
        C: Default,
    {
        self.with(type_identifier::<C>(), || Ok(C::default()))
    }

    /// 모든 이름이 `max_length` 이하인지 확인 (레지스트리 설정과 맞추는 용도)
    pub(crate) fn check_name_length(&self, max_length: usize) -> Result<()> {
        match self
            .constructors
            .keys()
            .find(|name| name.chars().count() > max_length)
        {
            Some(name) => Err(Error::Config(format!(
                "type '{}' is longer than typeNameMaxLength ({})",
                name, max_length
            ))),
            None => Ok(()),
        }
    }

    // ========================================================================
    // 생성 / 조회
    // ========================================================================

    /// 이름으로 새 인스턴스 생성
    pub fn construct(&self, type_name: &str) -> Result<C> {
        let constructor = self
            .constructors
            .get(type_name)
            .ok_or_else(|| Error::type_resolution(type_name, "no constructor registered"))?;

        constructor()
            .map_err(|e| Error::type_resolution_from(type_name, "constructor failed", e))
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.constructors.contains_key(type_name)
    }

    /// 등록된 타입 이름 (정렬)
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.constructors.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }
}

impl<C: 'static> Default for TypeTable<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: 'static> fmt::Debug for TypeTable<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeTable")
            .field("types", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[derive(Debug, Default, PartialEq)]
    struct Widget(u32);

    #[test]
    fn test_register_and_construct() {
        let mut table = TypeTable::new();
        table.register("widget", || Ok(Widget(7))).unwrap();

        assert!(table.contains("widget"));
        assert_eq!(table.construct("widget").unwrap(), Widget(7));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_duplicate_registration() {
        let mut table = TypeTable::new();
        table.register("widget", || Ok(Widget(1))).unwrap();

        let err = table.register("widget", || Ok(Widget(2))).unwrap_err();
        assert!(matches!(err, Error::DuplicateType(name) if name == "widget"));
        // 기존 생성자 유지
        assert_eq!(table.construct("widget").unwrap(), Widget(1));
    }

    #[test]
    fn test_blank_type_name_rejected() {
        let mut table = TypeTable::<Widget>::new();
        let err = table.register("  ", || Ok(Widget(0))).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert!(table.is_empty());
    }

    #[test]
    fn test_unknown_type() {
        let table = TypeTable::<Widget>::new();
        let err = table.construct("missing").unwrap_err();
        match err {
            Error::TypeResolution { type_name, source, .. } => {
                assert_eq!(type_name, "missing");
                assert!(source.is_none());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_constructor_failure_is_wrapped() {
        let table = TypeTable::<Widget>::new()
            .with("broken", || anyhow::bail!("no capacity"))
            .unwrap();

        let err = table.construct("broken").unwrap_err();
        assert!(matches!(err, Error::TypeResolution { .. }));
        assert_eq!(err.source().unwrap().to_string(), "no capacity");
    }

    #[test]
    fn test_with_default_uses_type_identifier() {
        let table = TypeTable::<Widget>::new().with_default().unwrap();
        assert!(table.contains(type_identifier::<Widget>()));
        assert!(type_identifier::<Widget>().ends_with("Widget"));
    }

    #[test]
    fn test_with_type_converts_into_target() {
        #[derive(Default)]
        struct Small;

        impl From<Small> for Widget {
            fn from(_: Small) -> Self {
                Widget(1)
            }
        }

        let table = TypeTable::<Widget>::new().with_type::<Small>().unwrap();
        assert_eq!(table.construct(type_identifier::<Small>()).unwrap(), Widget(1));
        assert_eq!(table.names(), vec![type_identifier::<Small>().to_string()]);
    }

    #[test]
    fn test_builder_rejects_duplicate_name() {
        let err = TypeTable::<Widget>::new()
            .with("widget", || Ok(Widget(1)))
            .unwrap()
            .with("widget", || Ok(Widget(2)))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateType(name) if name == "widget"));

        let err = TypeTable::<Widget>::new()
            .with_default()
            .unwrap()
            .with_default()
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateType(_)));
    }

    #[test]
    fn test_builder_validates_name() {
        let err = TypeTable::<Widget>::new().with("", || Ok(Widget(0))).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));

        let long = "w".repeat(TYPE_NAME_MAX_LENGTH + 1);
        let err = TypeTable::<Widget>::new().with(long, || Ok(Widget(0))).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_check_name_length() {
        let table = TypeTable::<Widget>::new()
            .with("short", || Ok(Widget(0)))
            .unwrap()
            .with("much-longer-name", || Ok(Widget(0)))
            .unwrap();

        assert!(table.check_name_length(64).is_ok());
        assert!(matches!(table.check_name_length(8), Err(Error::Config(_))));
    }
}
