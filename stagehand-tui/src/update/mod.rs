//! src/update/mod.rs
//! Update 层：状态更新
//!
//! 接收 AppMessage，修改 Model 或调用 Backend：
//!
//!     AppMessage::Focus(..)     → focus::update      焦点移动、点击按钮
//!     AppMessage::Stage(..)     → StageBackend::apply 导航、弹窗、教程
//!     AppMessage::Tutorial(..)  → tutorial::describe 写入活动日志
//!     AppMessage::Resize(..)    → 视口跟随终端尺寸
//!
//! 点击按钮只会触发按钮的回调，回调再把 StageMessage 发回主循环，
//! 因此"按 Enter 点按钮"和"按快捷键"最终走的是同一条路径。

mod focus;
mod tutorial;

use ratatui::layout::Rect;

use crate::message::AppMessage;
use crate::model::App;
use crate::view;

pub fn update(app: &mut App, msg: AppMessage) {
    match msg {
        AppMessage::Quit => {
            app.should_quit = true;
        }

        AppMessage::Focus(focus_msg) => {
            focus::update(app, focus_msg);
        }

        AppMessage::Stage(stage_msg) => {
            app.clear_status();
            if let Some(status) = app.backend.apply(stage_msg) {
                app.set_status(status);
            }
        }

        AppMessage::Tutorial(event) => {
            app.record(tutorial::describe(&event));
        }

        AppMessage::Resize(width, height) => {
            let scene = view::scene_area(Rect::new(0, 0, width, height));
            app.backend.resize(scene.width, scene.height);
        }

        AppMessage::Status(status) => {
            app.record(status.clone());
            app.set_status(status);
        }

        AppMessage::Noop => {}
    }
}
