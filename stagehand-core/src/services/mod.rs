//! 编排服务层

mod anchor_registry;
mod highlighter;
mod modal_presenter;
mod modal_queue;
mod modal_sequence;
mod navigation_stack;
mod placement;
mod transition_registry;
mod tutorial_controller;
mod tutorial_progress;
mod view_controller;

pub use anchor_registry::AnchorRegistry;
pub use highlighter::Highlighter;
pub use modal_presenter::{ModalHandle, ModalPresenter};
pub use modal_queue::ModalQueue;
pub use modal_sequence::{ModalSequence, SequenceOutcome};
pub use navigation_stack::{Layer, NavigationStack};
pub use placement::{available_space, choose_side, place, Placement};
pub use transition_registry::{
    BuiltTransition, FadeTransition, IdentityTransition, ScaleTransition, SettleAction,
    SlideTransition, TransitionBuilder, TransitionRegistry, TransitionRequest,
};
pub use tutorial_controller::TutorialController;
pub use tutorial_progress::{done_key, step_key, TutorialProgress};
pub use view_controller::{LifecycleListener, ViewController};

use std::sync::Arc;

use crate::config::StageConfig;
use crate::traits::{Animator, AssetLoader, AudioSink, KeyValueStore};

/// 编排上下文 - 持有所有平台协作者
///
/// 平台层需要创建此上下文，并注入平台特定的实现。
pub struct StageContext {
    /// 模板实例化
    pub loader: Arc<dyn AssetLoader>,
    /// 时间线播放
    pub animator: Arc<dyn Animator>,
    /// 提示音
    pub audio: Arc<dyn AudioSink>,
    /// 持久化键值存储
    pub store: Arc<dyn KeyValueStore>,
    /// 锚点注册表
    pub anchors: Arc<AnchorRegistry>,
    /// 转场策略
    pub transitions: Arc<TransitionRegistry>,
    pub config: StageConfig,
}

impl StageContext {
    /// 创建编排上下文
    #[must_use]
    pub fn new(
        loader: Arc<dyn AssetLoader>,
        animator: Arc<dyn Animator>,
        audio: Arc<dyn AudioSink>,
        store: Arc<dyn KeyValueStore>,
        anchors: Arc<AnchorRegistry>,
        transitions: Arc<TransitionRegistry>,
        config: StageConfig,
    ) -> Self {
        Self {
            loader,
            animator,
            audio,
            store,
            anchors,
            transitions,
            config,
        }
    }
}
