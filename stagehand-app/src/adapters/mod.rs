//! Host adapters for frontends without a native UI tree (TUI, headless tests).

mod json_file_store;
mod scene;
mod template_loader;
mod tick_animator;

pub use json_file_store::JsonFileStore;
pub use scene::{Scene, SceneNode};
pub use template_loader::{dialog_template, TemplateFactory, TemplateLoader, DIALOG_SIZE};
pub use tick_animator::TickAnimator;
