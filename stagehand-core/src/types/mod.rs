//! 类型定义

mod geometry;
mod lifecycle;
mod modal;
mod transition;
mod tutorial;

pub use geometry::{Rect, Size, Vec2};
pub use lifecycle::{LifecycleEvent, LifecycleState};
pub use modal::{ButtonSpec, ModalRequest, ModalResult, PlacementMode, Side};
pub use transition::{TransitionDirection, TransitionKind};
pub use tutorial::{TutorialEvent, TutorialStep};
