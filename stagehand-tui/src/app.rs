//! 主循环
//!
//! 每帧：推进动画 → 消费后台消息 → 同步焦点 → 渲染 → 轮询输入。
//! 动画由 `TickAnimator` 按真实时间推进，所以轮询超时就是帧间隔。

use std::time::{Duration, Instant};

use anyhow::Result;

use crate::event;
use crate::message::AppMessage;
use crate::model::App;
use crate::update;
use crate::util::Term;
use crate::view;

/// 帧间隔
const FRAME: Duration = Duration::from_millis(33);

pub fn run(terminal: &mut Term, app: &mut App) -> Result<()> {
    let size = terminal.size()?;
    update::update(app, AppMessage::Resize(size.width, size.height));
    app.backend.start();

    loop {
        // 1. 推进动画（完成回调在此线程上执行）
        app.backend.tick(Instant::now());

        // 2. 消费按钮回调与后台任务发来的消息
        for msg in app.backend.drain_messages() {
            update::update(app, msg);
        }
        for tutorial_event in app.backend.drain_tutorial_events() {
            update::update(app, AppMessage::Tutorial(tutorial_event));
        }
        app.sync_focus();

        // 3. 渲染 UI
        terminal.draw(|frame| {
            view::render(app, frame);
        })?;

        // 4. 检查是否应该退出
        if app.should_quit {
            break;
        }

        // 5. 轮询事件
        if let Some(event) = event::poll_event(FRAME)? {
            let msg = event::handle_event(event, app);
            update::update(app, msg);
        }
    }

    app.backend.shutdown();
    Ok(())
}
