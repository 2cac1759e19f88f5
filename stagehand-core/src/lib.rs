//! Stagehand Core Library
//!
//! Presentation orchestration for interactive applications:
//! - Navigation stack of full-screen view controllers with versioned transitions
//! - Modal presenter and FIFO modal queue with targeted placement
//! - Tutorial sequencer with anchor highlighting and persisted progress
//!
//! The library is platform-independent. Rendering, animation playback, asset loading,
//! audio and storage are reached through the traits in [`traits`].

pub mod config;
pub mod error;
pub mod services;
pub mod traits;
pub mod types;
pub mod utils;

#[cfg(test)]
mod test_utils;

// Re-export common types
pub use config::StageConfig;
pub use error::{CoreError, CoreResult};
pub use services::{
    ModalHandle, ModalPresenter, ModalQueue, NavigationStack, StageContext, TutorialController,
    ViewController,
};
pub use traits::{Animator, AssetLoader, AudioSink, KeyValueStore, NodeHandle, VisualNode};
