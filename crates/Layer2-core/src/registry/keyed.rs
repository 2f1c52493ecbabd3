//! Keyed Registry - 키 기반 자식 라이프사이클 레지스트리
//!
//! ## 락 구조
//!
//! - `sequence` (재진입 가능): 변경 + 이벤트 전달을 하나의 순서로 묶음
//! - `state`: 맵 + closed 플래그. 항상 `sequence` 다음에 잡고, 이벤트 전달 중에는 잡지 않음
//!
//! 따라서 옵저버는 전달받은 순서가 곧 변경 순서이고, 전달 중에 읽기 호출을 해도
//! 교착되지 않습니다. 같은 스레드의 옵저버가 레지스트리를 변경하면 그 이벤트는
//! 바깥 이벤트 전달 도중에 중첩되어 전달됩니다.

use super::handle::ChildHandle;
use super::types::TypeTable;
use crate::child::Manageable;
use crate::event::{EventKind, ObserverId, ObserverList, RegistryEvent, RegistryObserver};
use custodian_foundation::{require_text, ClosePolicy, Error, RegistryConfig, Result};
use parking_lot::{Mutex, ReentrantMutex};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// 락으로 보호되는 상태 (맵 + closed 플래그는 항상 함께 변경)
struct RegistryState<C: Manageable> {
    children: HashMap<String, ChildHandle<C>>,
    closed: bool,
}

// ============================================================================
// Registry<C>
// ============================================================================

/// 키 기반 레지스트리 - 자식을 이름으로 생성하고, 키로 조회하고, 한 번에 닫습니다
///
/// 항상 `Arc<Registry<C>>`로 생성되며 자식은 `Weak` 역참조만 가집니다.
/// 한 번 닫히면 `is_closed()`를 제외한 모든 호출이 `RegistryClosed`로 실패합니다.
///
/// 자식의 `on_close` 훅과 옵저버는 `sequence` 락 안에서 실행되므로, 이 레지스트리를
/// 사용하는 다른 스레드를 기다리면 안 됩니다.
pub struct Registry<C: Manageable> {
    /// 인스턴스 ID (이벤트 메타데이터)
    id: Uuid,

    /// 설정
    config: RegistryConfig,

    /// 타입 이름 → 생성자
    types: TypeTable<C>,

    /// 변경 + 이벤트 전달 순서 락
    sequence: ReentrantMutex<()>,

    /// 자식 맵 + closed 플래그
    state: Mutex<RegistryState<C>>,

    /// 옵저버 목록
    observers: ObserverList<C>,

    /// 자신에 대한 약한 참조 (자식 초기화 시 전달)
    self_ref: Weak<Registry<C>>,
}

impl<C: Manageable> Registry<C> {
    /// 기본 설정으로 생성
    ///
    /// `TypeTable`은 기본 `typeNameMaxLength` 안의 이름만 받으므로 항상 성공합니다.
    pub fn new(types: TypeTable<C>) -> Arc<Self> {
        Self::build(RegistryConfig::default(), types)
    }

    /// 설정을 지정해서 생성
    ///
    /// 설정이 유효하지 않거나, 등록된 타입 이름 중 `type_name_max_length`를 넘는 것이
    /// 있으면 (그 타입은 절대 생성할 수 없으므로) `Error::Config`입니다.
    pub fn with_config(config: RegistryConfig, types: TypeTable<C>) -> Result<Arc<Self>> {
        config.validate()?;
        types.check_name_length(config.type_name_max_length)?;
        Ok(Self::build(config, types))
    }

    fn build(config: RegistryConfig, types: TypeTable<C>) -> Arc<Self> {
        let registry = Arc::new_cyclic(|self_ref| Self {
            id: Uuid::new_v4(),
            config,
            types,
            sequence: ReentrantMutex::new(()),
            state: Mutex::new(RegistryState {
                children: HashMap::new(),
                closed: false,
            }),
            observers: ObserverList::new(),
            self_ref: self_ref.clone(),
        });

        debug!(
            registry = %registry.config.name,
            registry_id = %registry.id,
            types = registry.types.len(),
            "Registry created"
        );
        registry
    }

    // ========================================================================
    // 접근자
    // ========================================================================

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn types(&self) -> &TypeTable<C> {
        &self.types
    }

    /// 닫힘 여부 (닫힌 뒤에도 항상 성공)
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    // ========================================================================
    // 생성
    // ========================================================================

    /// 타입 이름으로 자식을 생성해서 `key`로 등록
    pub fn create(&self, key: &str, type_name: &str) -> Result<ChildHandle<C>> {
        self.create_with(key, type_name, |child, parent, key| {
            child.initialize(parent, key)
        })
    }

    /// 타입 이름을 키로 사용해서 생성
    pub fn create_named(&self, type_name: &str) -> Result<ChildHandle<C>> {
        self.create(type_name, type_name)
    }

    /// 생성 공통 경로 (초기화 방식만 다름)
    pub(crate) fn create_with<F>(
        &self,
        key: &str,
        type_name: &str,
        init: F,
    ) -> Result<ChildHandle<C>>
    where
        F: FnOnce(&C, &Arc<Registry<C>>, &str) -> Result<()>,
    {
        {
            let state = self.state.lock();
            self.ensure_open(&state)?;
            self.validate_key(key)?;
            require_text("type name", type_name, self.config.type_name_max_length)?;
            self.ensure_vacant(&state, key)?;
        }

        // 생성/초기화는 락 밖에서
        let child = self.types.construct(type_name)?;
        let parent = self
            .self_ref
            .upgrade()
            .ok_or_else(|| Error::RegistryClosed(self.name().to_string()))?;
        init(&child, &parent, key)?;
        let handle = ChildHandle::new(child, type_name);

        let _sequence = self.sequence.lock();
        let admitted = {
            let mut state = self.state.lock();
            let admitted = self
                .ensure_open(&state)
                .and_then(|_| self.ensure_vacant(&state, key));
            if admitted.is_ok() {
                state.children.insert(key.to_string(), handle.clone());
            }
            admitted
        };

        if let Err(e) = admitted {
            // 경합에서 진 자식은 맵에 들어간 적이 없으므로 스스로 정리
            debug!(registry = %self.name(), key = %key, error = %e, "Child rejected at insert");
            if let Err(release_err) = handle.close_without_remove() {
                warn!(
                    registry = %self.name(),
                    key = %key,
                    error = %release_err,
                    "Failed to release child rejected at insert"
                );
            }
            return Err(e);
        }

        debug!(registry = %self.name(), key = %key, type_name = %type_name, "Child created");
        self.emit(
            self.event(EventKind::Create)
                .with_key(key)
                .with_child(Some(handle.clone())),
        );

        Ok(handle)
    }

    // ========================================================================
    // 조회
    // ========================================================================

    /// 키로 조회 (없으면 None, 그래도 GET 이벤트는 발생)
    pub fn get(&self, key: &str) -> Result<Option<ChildHandle<C>>> {
        let _sequence = self.sequence.lock();
        let child = {
            let state = self.state.lock();
            self.ensure_open(&state)?;
            self.validate_key(key)?;
            state.children.get(key).cloned()
        };

        debug!(registry = %self.name(), key = %key, found = child.is_some(), "Child lookup");
        self.emit(self.event(EventKind::Get).with_key(key).with_child(child.clone()));

        Ok(child)
    }

    pub fn contains_child(&self, key: &str) -> Result<bool> {
        let state = self.state.lock();
        self.ensure_open(&state)?;
        self.validate_key(key)?;
        Ok(state.children.contains_key(key))
    }

    pub fn child_count(&self) -> Result<usize> {
        let state = self.state.lock();
        self.ensure_open(&state)?;
        Ok(state.children.len())
    }

    /// 현재 키 스냅샷 (이후 변경과 무관)
    pub fn keys(&self) -> Result<BTreeSet<String>> {
        let state = self.state.lock();
        self.ensure_open(&state)?;
        Ok(state.children.keys().cloned().collect())
    }

    // ========================================================================
    // 닫기
    // ========================================================================

    /// 키에 해당하는 자식을 제거하고 닫음
    ///
    /// 자식의 `close_without_remove()`만 호출하므로 자식이 레지스트리로
    /// 되돌아오지 않습니다. 제거된 자식이 없으면 `Ok(None)`.
    pub fn close_child(&self, key: &str) -> Result<Option<ChildHandle<C>>> {
        let _sequence = self.sequence.lock();
        let removed = {
            let mut state = self.state.lock();
            self.ensure_open(&state)?;
            self.validate_key(key)?;
            state.children.remove(key)
        };

        let Some(child) = removed else {
            return Ok(None);
        };

        let closed = child.close_without_remove();
        debug!(
            registry = %self.name(),
            key = %key,
            ok = closed.is_ok(),
            "Child removed"
        );
        self.emit(
            self.event(EventKind::Remove)
                .with_key(key)
                .with_child(Some(child.clone())),
        );

        closed.map(|_| Some(child))
    }

    /// 모든 자식을 닫고 레지스트리를 닫음 (두 번째 호출은 RegistryClosed)
    ///
    /// 자식 close 실패 처리는 `RegistryConfig::close_policy`를 따릅니다.
    /// 진행 중에는 다른 스레드의 생성/조회/제거가 끝나기를 기다리게 하므로
    /// CLOSE 이후에 다른 이벤트가 전달되지 않습니다.
    pub fn close(&self) -> Result<()> {
        let _sequence = self.sequence.lock();
        let mut failures = Vec::new();

        loop {
            let keys: Vec<String> = {
                let mut state = self.state.lock();
                self.ensure_open(&state)?;
                if state.children.is_empty() {
                    state.closed = true;
                    break;
                }
                state.children.keys().cloned().collect()
            };

            for key in keys {
                if let Err(e) = self.close_child(&key) {
                    match self.config.close_policy {
                        ClosePolicy::FailFast => return Err(e),
                        ClosePolicy::BestEffort => {
                            warn!(
                                registry = %self.name(),
                                key = %key,
                                error = %e,
                                "Child failed to close, continuing"
                            );
                            failures.push(format!("{}: {}", key, e));
                        }
                    }
                }
            }
        }

        self.emit(self.event(EventKind::Close));
        self.observers.clear();

        info!(
            registry = %self.name(),
            registry_id = %self.id,
            failures = failures.len(),
            "Registry closed"
        );

        if failures.is_empty() {
            Ok(())
        } else {
            Err(Error::PartialClose {
                registry: self.name().to_string(),
                failures,
            })
        }
    }

    // ========================================================================
    // 옵저버
    // ========================================================================

    /// 옵저버 등록 (등록 순서대로 전달, 등록 이후 발생한 이벤트부터 받음)
    pub fn add_observer(&self, observer: Arc<dyn RegistryObserver<C>>) -> Result<ObserverId> {
        let _sequence = self.sequence.lock();
        let state = self.state.lock();
        self.ensure_open(&state)?;
        let name = observer.name().to_string();
        let id = self.observers.add(observer);
        debug!(registry = %self.name(), observer_id = %id, observer = %name, "Observer added");
        Ok(id)
    }

    /// 옵저버 해제 (등록된 적 없으면 false)
    pub fn remove_observer(&self, id: ObserverId) -> Result<bool> {
        let _sequence = self.sequence.lock();
        let state = self.state.lock();
        self.ensure_open(&state)?;
        let removed = self.observers.remove(id);
        debug!(registry = %self.name(), observer_id = %id, removed, "Observer removed");
        Ok(removed)
    }

    pub fn observer_count(&self) -> Result<usize> {
        let state = self.state.lock();
        self.ensure_open(&state)?;
        Ok(self.observers.len())
    }

    // ========================================================================
    // 내부 헬퍼
    // ========================================================================

    fn ensure_open(&self, state: &RegistryState<C>) -> Result<()> {
        if state.closed {
            return Err(Error::RegistryClosed(self.name().to_string()));
        }
        Ok(())
    }

    fn ensure_vacant(&self, state: &RegistryState<C>, key: &str) -> Result<()> {
        if state.children.contains_key(key) {
            return Err(Error::key_conflict(self.name(), key));
        }
        Ok(())
    }

    fn validate_key(&self, key: &str) -> Result<()> {
        require_text("key", key, self.config.key_max_length)
    }

    fn event(&self, kind: EventKind) -> RegistryEvent<C> {
        RegistryEvent::new(kind, self.name(), self.id)
    }

    /// `sequence`를 잡고 `state`는 놓은 상태에서만 호출
    fn emit(&self, event: RegistryEvent<C>) {
        if self.observers.is_empty() {
            return;
        }
        self.observers.notify(&event);
    }
}

impl<C: Manageable> Drop for Registry<C> {
    /// close 없이 버려진 레지스트리의 자식 정리 (이벤트 없음)
    fn drop(&mut self) {
        let state = self.state.get_mut();
        if state.closed {
            return;
        }

        for (key, child) in state.children.drain() {
            if child.is_closed() {
                continue;
            }
            if let Err(e) = child.close_without_remove() {
                warn!(
                    registry = %self.config.name,
                    key = %key,
                    error = %e,
                    "Failed to release child on drop"
                );
            }
        }
    }
}

impl<C: Manageable> fmt::Debug for Registry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Registry")
            .field("name", &self.config.name)
            .field("id", &self.id)
            .field("closed", &state.closed)
            .field("children", &state.children.len())
            .field("observers", &self.observers.len())
            .field("types", &self.types)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::child::ChildState;
    use crate::event::FnObserver;
    use crate::registry::type_identifier;

    #[derive(Default)]
    struct Session {
        state: ChildState<Session>,
    }

    impl Manageable for Session {
        fn child_state(&self) -> &ChildState<Self> {
            &self.state
        }
    }

    fn registry() -> Arc<Registry<Session>> {
        Registry::new(TypeTable::new().with_default().unwrap())
    }

    fn session() -> &'static str {
        type_identifier::<Session>()
    }

    #[test]
    fn test_create_then_get() {
        let registry = registry();
        let created = registry.create("alpha", session()).unwrap();
        assert_eq!(created.key(), "alpha");

        let found = registry.get("alpha").unwrap().unwrap();
        assert!(ChildHandle::ptr_eq(&created, &found));
        assert!(Arc::ptr_eq(&found.parent().unwrap(), &registry));
        assert_eq!(registry.child_count().unwrap(), 1);
    }

    #[test]
    fn test_create_named_uses_type_name_as_key() {
        let registry = registry();
        let child = registry.create_named(session()).unwrap();
        assert_eq!(child.key(), session());
        assert!(registry.contains_child(session()).unwrap());
    }

    #[test]
    fn test_duplicate_key_keeps_existing() {
        let registry = registry();
        let first = registry.create("alpha", session()).unwrap();

        let err = registry.create("alpha", session()).unwrap_err();
        assert!(matches!(err, Error::KeyConflict { ref key, .. } if key == "alpha"));
        assert!(err.is_recoverable());

        let current = registry.get("alpha").unwrap().unwrap();
        assert!(ChildHandle::ptr_eq(&first, &current));
        assert_eq!(registry.child_count().unwrap(), 1);
    }

    #[test]
    fn test_argument_validation() {
        let registry = Registry::with_config(
            RegistryConfig::new().key_max_length(4),
            TypeTable::<Session>::new().with_default().unwrap(),
        )
        .unwrap();

        assert!(matches!(
            registry.create("  ", session()),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            registry.create("toolong", session()),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(registry.create("ok", ""), Err(Error::InvalidArgument(_))));
        assert!(matches!(registry.get(""), Err(Error::InvalidArgument(_))));
        assert_eq!(registry.child_count().unwrap(), 0);
    }

    #[test]
    fn test_with_config_rejects_unusable_settings() {
        let err = Registry::with_config(
            RegistryConfig::new().key_max_length(0),
            TypeTable::<Session>::new().with_default().unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        // 기본 타입 이름은 경로 전체라 짧은 한도를 넘음
        let err = Registry::with_config(
            RegistryConfig::new().type_name_max_length(4),
            TypeTable::<Session>::new().with_default().unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(ref msg) if msg.contains("typeNameMaxLength")));
    }

    #[test]
    fn test_closed_check_comes_before_validation() {
        let registry = registry();
        registry.close().unwrap();

        assert!(matches!(registry.get(""), Err(Error::RegistryClosed(_))));
        assert!(matches!(
            registry.create("", "missing"),
            Err(Error::RegistryClosed(_))
        ));
    }

    #[test]
    fn test_unknown_type_is_type_resolution() {
        let registry = registry();
        let err = registry.create("alpha", "no.such.Type").unwrap_err();
        assert!(matches!(err, Error::TypeResolution { .. }));
        assert!(!registry.contains_child("alpha").unwrap());
    }

    #[test]
    fn test_close_child_returns_removed() {
        let registry = registry();
        let child = registry.create("alpha", session()).unwrap();

        let removed = registry.close_child("alpha").unwrap().unwrap();
        assert_eq!(removed, child);
        assert!(child.is_closed());
        assert_eq!(child.key(), "alpha");
        assert!(registry.close_child("alpha").unwrap().is_none());
    }

    #[test]
    fn test_close_is_not_idempotent() {
        let registry = registry();
        registry.create("alpha", session()).unwrap();

        registry.close().unwrap();
        assert!(registry.is_closed());
        assert!(matches!(registry.close(), Err(Error::RegistryClosed(_))));
        assert!(matches!(registry.keys(), Err(Error::RegistryClosed(_))));
    }

    #[test]
    fn test_observers_cleared_after_close() {
        let registry = registry();
        let count = Arc::new(Mutex::new(0));
        let seen = Arc::clone(&count);
        registry
            .add_observer(Arc::new(FnObserver::new(
                "counter",
                move |_: &RegistryEvent<Session>| *seen.lock() += 1,
            )))
            .unwrap();
        assert_eq!(registry.observer_count().unwrap(), 1);

        registry.close().unwrap();
        assert_eq!(*count.lock(), 1);
        assert!(registry.observers.is_empty());
        assert!(matches!(registry.observer_count(), Err(Error::RegistryClosed(_))));
    }

    #[test]
    fn test_drop_releases_open_children() {
        let registry = registry();
        let child = registry.create("alpha", session()).unwrap();

        drop(registry);
        assert!(child.is_closed());
        assert!(matches!(child.close(), Err(Error::ChildClosed(_))));
    }
}
