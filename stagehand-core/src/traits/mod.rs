//! 平台协作者抽象 trait 定义

mod anchor;
mod animator;
mod asset_loader;
mod audio;
mod key_value_store;
mod visual_node;

pub use anchor::{AnchorElement, NodeAnchor};
pub use animator::{Animator, Completion, InstantAnimator, Timeline, Tween, TweenProperty};
pub use asset_loader::AssetLoader;
pub use audio::{AudioCue, AudioSink, NoopAudioSink};
pub use key_value_store::{InMemoryKeyValueStore, KeyValueStore};
pub use visual_node::{descendants, same_node, ClickListener, ElementKind, NodeHandle, VisualNode};
