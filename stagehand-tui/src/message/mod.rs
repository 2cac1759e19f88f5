//! Message 层：事件消息
//!
//! 事件层把按键翻译成消息；按钮回调和后台任务也通过通道投递同样的消息，
//! 于是所有状态修改都经过 `update::update` 一处。
//!
//!     按键 ──▶ handle_event ──┐
//!                             ├──▶ AppMessage ──▶ update
//!     按钮回调 / 后台任务 ────┘   (mpsc 通道，主循环每帧取出)

mod app;
mod stage;

pub use app::{AppMessage, FocusMessage};
pub use stage::StageMessage;
