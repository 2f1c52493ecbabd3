//! custodian-core: Keyed Lifecycle Registry
//!
//! Layer2 - 레지스트리/자식 라이프사이클 레이어
//!
//! # 주요 모듈
//!
//! - `registry`: Registry, PropertiedRegistry, TypeTable, ChildHandle
//! - `child`: Manageable / PropertiedManageable trait 및 내장 상태
//! - `event`: 레지스트리 이벤트와 옵저버
//!
//! # 사용 예시
//!
//! ```ignore
//! use custodian_core::{ChildState, Manageable, Registry, TypeTable, type_identifier};
//!
//! #[derive(Default)]
//! struct Worker {
//!     state: ChildState<Worker>,
//! }
//!
//! impl Manageable for Worker {
//!     fn child_state(&self) -> &ChildState<Self> {
//!         &self.state
//!     }
//! }
//!
//! let registry = Registry::new(TypeTable::new().with_default()?);
//! let worker = registry.create("w1", type_identifier::<Worker>())?;
//!
//! registry.add_observer(Arc::new(FnObserver::new("log", |event| {
//!     println!("{} {:?}", event.kind, event.key());
//! })))?;
//!
//! registry.close()?;
//! assert!(worker.is_closed());
//! ```

// Core modules
pub mod child;
pub mod event;
pub mod registry;

// Re-exports: Registry
pub use registry::{
    type_identifier, ChildHandle, Constructor, PropertiedRegistry, Registry, TypeTable,
};

// Re-exports: Child
pub use child::{ChildState, Manageable, PropertiedManageable, SettingsSlot};

// Re-exports: Event
pub use event::{EventKind, FnObserver, ObserverId, RegistryEvent, RegistryObserver};

// Re-exports: Foundation
pub use custodian_foundation::{ClosePolicy, Error, RegistryConfig, Result};
