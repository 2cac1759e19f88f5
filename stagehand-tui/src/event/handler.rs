//! 事件处理器

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};

use crate::event::keymap::{any_matches, DefaultKeymap};
use crate::message::{AppMessage, FocusMessage, StageMessage};
use crate::model::App;

/// 轮询事件
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// 处理事件，返回对应的消息
pub fn handle_event(event: Event, app: &App) -> AppMessage {
    match event {
        Event::Key(key_event) => handle_key_event(key_event, app.backend.is_modal_showing()),
        Event::Resize(width, height) => AppMessage::Resize(width, height),
        _ => AppMessage::Noop,
    }
}

/// 处理键盘事件
fn handle_key_event(key: KeyEvent, modal_open: bool) -> AppMessage {
    // 只处理 Press 事件，忽略 Release 和 Repeat
    if key.kind != KeyEventKind::Press {
        return AppMessage::Noop;
    }

    if DefaultKeymap::FORCE_QUIT.matches(&key) {
        return AppMessage::Quit;
    }

    if let Some(msg) = handle_focus_keys(&key) {
        return msg;
    }

    // 有弹窗时只响应焦点键和 Esc
    if modal_open {
        return handle_modal_keys(&key);
    }

    if DefaultKeymap::QUIT.matches(&key) {
        return AppMessage::Quit;
    }
    if DefaultKeymap::BACK.matches(&key) {
        return AppMessage::Stage(StageMessage::Back);
    }
    if DefaultKeymap::TIPS.matches(&key) {
        return AppMessage::Stage(StageMessage::ShowTips);
    }
    if DefaultKeymap::WIZARD.matches(&key) {
        return AppMessage::Stage(StageMessage::RunWizard);
    }
    if DefaultKeymap::TOUR.matches(&key) {
        return AppMessage::Stage(StageMessage::StartTour);
    }
    if DefaultKeymap::RESET_TOUR.matches(&key) {
        return AppMessage::Stage(StageMessage::ResetTour);
    }

    AppMessage::Noop
}

fn handle_focus_keys(key: &KeyEvent) -> Option<AppMessage> {
    let msg = if any_matches(&DefaultKeymap::FOCUS_NEXT, key) {
        FocusMessage::Next
    } else if any_matches(&DefaultKeymap::FOCUS_PREV, key) {
        FocusMessage::Prev
    } else if any_matches(&DefaultKeymap::ACTIVATE, key) {
        FocusMessage::Activate
    } else {
        return None;
    };
    Some(AppMessage::Focus(msg))
}

/// 弹窗键盘处理
fn handle_modal_keys(key: &KeyEvent) -> AppMessage {
    if DefaultKeymap::BACK.matches(key) {
        return AppMessage::Stage(StageMessage::DismissModal);
    }
    AppMessage::Noop
}
