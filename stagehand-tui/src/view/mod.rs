//! src/view/mod.rs
//! View 层：UI 渲染
//!
//! 只读取 Model，不修改状态。
//!
//!     ┌──────────────────────────────────────────────┐
//!     │                                              │
//!     │   场景区：Viewport 与 Overlay 的节点树       │  ← scene.rs
//!     │                                              │
//!     ├──────────────────────────────────────────────┤
//!     │ 活动日志                                     │  ← activity.rs
//!     ├──────────────────────────────────────────────┤
//!     │ 状态栏：导航路径 · 教程步骤 · 快捷键        │  ← statusbar.rs
//!     └──────────────────────────────────────────────┘
//!
//!     场景区的尺寸就是 Stagehand 视口的尺寸（见 update 中的 Resize 处理）。

mod activity;
mod scene;
mod statusbar;
mod theme;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    Frame,
};

use crate::model::App;

/// 活动日志高度（含边框）
const ACTIVITY_HEIGHT: u16 = 5;

fn split(area: Rect) -> [Rect; 3] {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),                  // 场景区
            Constraint::Length(ACTIVITY_HEIGHT), // 活动日志
            Constraint::Length(1),               // 状态栏
        ])
        .split(area);
    [layout[0], layout[1], layout[2]]
}

/// 终端区域中场景所占的部分
pub fn scene_area(area: Rect) -> Rect {
    split(area)[0]
}

pub fn render(app: &App, frame: &mut Frame) {
    let [scene_area, activity_area, status_area] = split(frame.area());

    scene::render(app, frame, scene_area);
    activity::render(app, frame, activity_area);
    statusbar::render(app, frame, status_area);
}
