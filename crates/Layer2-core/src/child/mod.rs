//! # Child Lifecycle
//!
//! 레지스트리가 관리하는 자식의 계약
//!
//! - [`Manageable`]: initialize / close / close_without_remove / key / parent
//! - [`PropertiedManageable`]: 설정값을 함께 받는 변형
//! - [`ChildState`], [`SettingsSlot`]: 자식 구조체에 내장하는 기본 상태
//!
//! ## 예시
//!
//! ```ignore
//! #[derive(Default)]
//! struct Session {
//!     state: ChildState<Session>,
//! }
//!
//! impl Manageable for Session {
//!     fn child_state(&self) -> &ChildState<Self> {
//!         &self.state
//!     }
//! }
//! ```

mod state;
mod traits;

pub use state::{ChildState, SettingsSlot};
pub use traits::{Manageable, PropertiedManageable};
