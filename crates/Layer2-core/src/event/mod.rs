//! Event System - 레지스트리 이벤트 알림
//!
//! 레지스트리 라이프사이클 이벤트(CREATE, GET, REMOVE, CLOSE)를 등록된
//! 옵저버들에게 동기적으로 전달합니다.
//!
//! ## 아키텍처
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Registry<C>                           │
//! │  create / get / close_child / close                          │
//! │         │                                                    │
//! │         ▼  (락 해제 후, 등록 순서대로)                        │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐        │
//! │  │  Observer 1  │  │  Observer 2  │  │  Observer N  │        │
//! │  └──────────────┘  └──────────────┘  └──────────────┘        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 사용법
//!
//! ```ignore
//! let id = registry.add_observer(Arc::new(FnObserver::new("audit", |event| {
//!     println!("{} {:?}", event.kind, event.key());
//! })))?;
//!
//! registry.remove_observer(id)?;
//! ```

mod observer;
mod types;

pub(crate) use observer::ObserverList;
pub use observer::{FnObserver, ObserverId, RegistryObserver};
pub use types::{EventKind, RegistryEvent};
