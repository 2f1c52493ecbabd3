//! # Keyed Registry System
//!
//! 키로 자식을 생성/조회/닫는 라이프사이클 레지스트리
//!
//! ## 개요
//!
//! 레지스트리는 타입 이름으로 자식을 만들고(`TypeTable`), 고유한 키로 보관하며,
//! 닫힐 때 남은 자식을 모두 닫습니다. 자식 쪽에서 먼저 닫을 수도 있고
//! (`child.close()`), 이때도 레지스트리 맵에서 정확히 한 번 제거됩니다.
//!
//! ## 설계 원칙
//!
//! 1. **Two-phase close**: 자식 close → `close_child` → `close_without_remove`
//! 2. **Non-owning back-reference**: 자식은 `Weak<Registry<C>>`만 보관
//! 3. **Check-then-act under one lock**: 맵과 closed 플래그는 같은 Mutex
//! 4. **Events outside the lock**: 옵저버 전달은 락 해제 후
//!
//! ## 아키텍처
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Registry<C>                             │
//! │  ┌──────────────┐   ┌─────────────────────────────────────┐ │
//! │  │ TypeTable<C> │──►│ Mutex<{ children, closed }>         │ │
//! │  │ name → ctor  │   │  "a" → ChildHandle ─┐               │ │
//! │  └──────────────┘   │  "b" → ChildHandle  │ Weak parent   │ │
//! │                     └─────────────────────┼───────────────┘ │
//! │  ObserverList<C> ◄── CREATE/GET/REMOVE/CLOSE                 │
//! └─────────────────────────────────────────────────────────────┘
//!            ▲
//!            │ Arc
//!  PropertiedRegistry<C>  (create에 Settings 인자 추가)
//! ```
//!
//! ## 사용 예시
//!
//! ```ignore
//! use custodian_core::{Registry, TypeTable, type_identifier};
//!
//! let registry = Registry::new(TypeTable::<Session>::new().with_default()?);
//!
//! let session = registry.create("alice", type_identifier::<Session>())?;
//! assert_eq!(registry.child_count()?, 1);
//!
//! // 자식 쪽에서 닫아도 맵에서 제거됨
//! session.close()?;
//! assert_eq!(registry.child_count()?, 0);
//!
//! registry.close()?;
//! ```

mod handle;
mod keyed;
mod propertied;
mod types;

pub use handle::ChildHandle;
pub use keyed::Registry;
pub use propertied::PropertiedRegistry;
pub use types::{type_identifier, Constructor, TypeTable};
