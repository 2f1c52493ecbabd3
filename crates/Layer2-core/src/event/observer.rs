//! Registry Observer - 동기 이벤트 브로드캐스트
//!
//! 등록 순서대로, 호출한 스레드에서, 작업이 반환되기 전에 전달합니다.

use super::types::RegistryEvent;
use crate::child::Manageable;
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::trace;

// ============================================================================
// ObserverId
// ============================================================================

/// 옵저버 등록 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

impl ObserverId {
    fn new(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "observer-{}", self.0)
    }
}

// ============================================================================
// RegistryObserver Trait
// ============================================================================

/// 레지스트리 옵저버 trait
///
/// `on_event`는 레지스트리 락 밖에서 호출되지만, 같은 레지스트리를 변경하는
/// 호출(create/close 등)은 이벤트 순서를 꼬이게 하므로 피해야 합니다.
pub trait RegistryObserver<C: Manageable>: Send + Sync {
    /// 옵저버 이름 (디버깅용)
    fn name(&self) -> &str {
        "observer"
    }

    /// 이벤트 처리
    fn on_event(&self, event: &RegistryEvent<C>);
}

/// 클로저 기반 옵저버
pub struct FnObserver<F> {
    name: String,
    handler: F,
}

impl<F> FnObserver<F> {
    pub fn new(name: impl Into<String>, handler: F) -> Self {
        Self {
            name: name.into(),
            handler,
        }
    }
}

impl<C, F> RegistryObserver<C> for FnObserver<F>
where
    C: Manageable,
    F: Fn(&RegistryEvent<C>) + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn on_event(&self, event: &RegistryEvent<C>) {
        (self.handler)(event)
    }
}

// ============================================================================
// ObserverList
// ============================================================================

/// 등록 순서를 유지하는 옵저버 목록
pub(crate) struct ObserverList<C: Manageable> {
    entries: Mutex<Vec<(ObserverId, Arc<dyn RegistryObserver<C>>)>>,
    counter: AtomicU64,
}

impl<C: Manageable> ObserverList<C> {
    pub(crate) fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            counter: AtomicU64::new(0),
        }
    }

    pub(crate) fn add(&self, observer: Arc<dyn RegistryObserver<C>>) -> ObserverId {
        let id = ObserverId::new(self.counter.fetch_add(1, Ordering::SeqCst));
        self.entries.lock().push((id, observer));
        id
    }

    pub(crate) fn remove(&self, id: ObserverId) -> bool {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|(existing, _)| *existing != id);
        entries.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub(crate) fn clear(&self) {
        self.entries.lock().clear();
    }

    /// 현재 옵저버 전체에 이벤트 전달
    ///
    /// 목록을 복사한 뒤 락을 풀고 전달하므로 옵저버가 목록을 건드려도 안전합니다.
    pub(crate) fn notify(&self, event: &RegistryEvent<C>) {
        let snapshot: Vec<_> = self
            .entries
            .lock()
            .iter()
            .map(|(id, observer)| (*id, Arc::clone(observer)))
            .collect();

        for (id, observer) in snapshot {
            trace!(
                observer_id = %id,
                observer_name = observer.name(),
                event_kind = %event.kind,
                "Delivering registry event"
            );
            observer.on_event(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::child::ChildState;
    use crate::event::EventKind;
    use uuid::Uuid;

    #[derive(Default)]
    struct Widget {
        state: ChildState<Widget>,
    }

    impl Manageable for Widget {
        fn child_state(&self) -> &ChildState<Self> {
            &self.state
        }
    }

    fn close_event() -> RegistryEvent<Widget> {
        RegistryEvent::new(EventKind::Close, "widget", Uuid::new_v4())
    }

    #[test]
    fn test_delivery_in_registration_order() {
        let list = ObserverList::<Widget>::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for name in ["first", "second", "third"] {
            let seen = Arc::clone(&seen);
            list.add(Arc::new(FnObserver::new(name, move |_: &RegistryEvent<Widget>| {
                seen.lock().push(name);
            })));
        }

        list.notify(&close_event());
        assert_eq!(*seen.lock(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_remove_and_clear() {
        let list = ObserverList::<Widget>::new();
        let a = list.add(Arc::new(FnObserver::new("a", |_: &RegistryEvent<Widget>| {})));
        let b = list.add(Arc::new(FnObserver::new("b", |_: &RegistryEvent<Widget>| {})));
        assert_ne!(a, b);
        assert_eq!(list.len(), 2);

        assert!(list.remove(a));
        assert!(!list.remove(a));
        assert_eq!(list.len(), 1);

        list.clear();
        assert!(list.is_empty());
    }

    #[test]
    fn test_observer_id_display() {
        assert_eq!(ObserverId::new(3).to_string(), "observer-3");
    }
}
