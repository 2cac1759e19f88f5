use std::collections::VecDeque;
use std::sync::Arc;

use stagehand_app::adapters::SceneNode;
use stagehand_core::traits::VisualNode;

use crate::backend::StageBackend;
use crate::util::timestamp;

/// 活动日志最多保留的条数
const ACTIVITY_LIMIT: usize = 6;

pub struct App {
    /// 是否应该退出
    pub should_quit: bool,

    /// 舞台与场景
    pub backend: StageBackend,

    /// 焦点在可点击按钮环中的位置
    pub focus: usize,

    /// 上一帧焦点环的节点 id（环变化时焦点回到第一个按钮）
    focus_ring_ids: Vec<u64>,

    /// 状态栏消息
    pub status_message: Option<String>,

    /// 最近的教程与弹窗活动
    pub activity: VecDeque<String>,
}

impl App {
    /// 创建新的应用实例
    pub fn new(backend: StageBackend) -> Self {
        Self {
            should_quit: false,
            backend,
            focus: 0,
            focus_ring_ids: Vec::new(),
            status_message: None,
            activity: VecDeque::new(),
        }
    }

    /// 当前焦点按钮
    pub fn focused(&self) -> Option<Arc<SceneNode>> {
        let ring = self.backend.focus_ring();
        if ring.is_empty() {
            return None;
        }
        ring.get(self.focus % ring.len()).cloned()
    }

    /// 焦点环变化（弹窗出现、页面切换）时重置焦点
    pub fn sync_focus(&mut self) {
        let ids: Vec<u64> = self.backend.focus_ring().iter().map(|n| n.id()).collect();
        if ids != self.focus_ring_ids {
            self.focus = 0;
            self.focus_ring_ids = ids;
        }
    }

    pub fn focus_next(&mut self) {
        let len = self.backend.focus_ring().len();
        if len > 0 {
            self.focus = (self.focus + 1) % len;
        }
    }

    pub fn focus_prev(&mut self) {
        let len = self.backend.focus_ring().len();
        if len > 0 {
            self.focus = (self.focus + len - 1) % len;
        }
    }

    /// 设置状态消息
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    /// 清除状态消息
    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    /// 记录一条活动
    pub fn record(&mut self, entry: impl Into<String>) {
        let line = format!("{} {}", timestamp(), entry.into());
        log::debug!("Activity: {line}");
        self.activity.push_front(line);
        self.activity.truncate(ACTIVITY_LIMIT);
    }
}
