//! src/event/mod.rs
//! Event 层：事件处理
//!
//! 负责将键盘与终端事件转换为 Message。
//!
//!
//! 有模块结构：
//!     src/event/mod.rs
//!         mod handler;        // 事件处理器
//!         mod keymap;         // 快捷键映射
//!
//!
//!     · poll_event      事件轮询，受 ~/app.rs 调用，超时即一帧
//!
//!     · handle_event    事件分发
//!
//!         Event::Key(KeyEvent)          → handle_key_event()
//!         Event::Resize(width, height)  → AppMessage::Resize
//!
//!         handle_key_event 的判断顺序：
//!             - Ctrl+C 在任何情况下退出
//!             - 焦点键（Tab/↑↓←→/Enter/Space）在任何情况下可用
//!             - 有弹窗时，Esc 关闭弹窗，其余按键忽略
//!             - 否则是页面快捷键：Esc 返回、m 提示、w 向导、t 教程、r 重置进度、q 退出
//!
//!
//!     弹窗按钮与教程高亮里的按钮都在焦点环中（见 StageBackend::focus_ring），
//!     所以 Enter 可以直接点击被高亮的锚点按钮。

mod handler;
mod keymap;

pub use handler::{handle_event, poll_event};
