//! 教程高亮
//!
//! 在覆盖层上放置一个高亮节点，框出锚点矩形（外扩 padding）形成的“洞”。
//! 节点首次显示时从模板实例化，之后复用。

use std::sync::{Arc, Mutex};

use crate::services::StageContext;
use crate::traits::{AssetLoader, NodeHandle};
use crate::types::Rect;
use crate::utils::lock;

#[derive(Default)]
struct HighlightState {
    node: Option<NodeHandle>,
    hole: Option<Rect>,
}

/// 高亮器
pub struct Highlighter {
    loader: Arc<dyn AssetLoader>,
    parent: NodeHandle,
    template: String,
    padding: f32,
    state: Mutex<HighlightState>,
}

impl Highlighter {
    pub fn new(ctx: &StageContext, parent: NodeHandle) -> Self {
        Self {
            loader: Arc::clone(&ctx.loader),
            parent,
            template: ctx.config.tutorial.highlight_template.clone(),
            padding: ctx.config.tutorial.highlight_padding,
            state: Mutex::new(HighlightState::default()),
        }
    }

    /// 框出 `target`；模板缺失时记录日志并返回 `false`
    pub fn show(&self, target: Rect) -> bool {
        let existing = lock(&self.state).node.clone();
        let node = match existing {
            Some(node) if !node.is_destroyed() => node,
            _ => match self.loader.instantiate(&self.template, &self.parent) {
                Ok(node) => {
                    lock(&self.state).node = Some(node.clone());
                    node
                }
                Err(e) => {
                    log::warn!("Highlight unavailable: {e}");
                    return false;
                }
            },
        };

        let hole = target.expand(self.padding);
        node.set_position(hole.origin());
        node.set_size(hole.size());
        node.set_active(true);
        lock(&self.state).hole = Some(hole);
        true
    }

    /// 隐藏高亮；可重复调用
    pub fn hide(&self) {
        let node = {
            let mut state = lock(&self.state);
            state.hole = None;
            state.node.clone()
        };
        if let Some(node) = node {
            node.set_active(false);
        }
    }

    /// 当前高亮洞
    pub fn hole(&self) -> Option<Rect> {
        lock(&self.state).hole
    }

    pub fn is_visible(&self) -> bool {
        self.hole().is_some()
    }

    /// 销毁高亮节点
    pub fn dispose(&self) {
        let node = {
            let mut state = lock(&self.state);
            state.hole = None;
            state.node.take()
        };
        if let Some(node) = node {
            node.destroy();
        }
    }
}
