//! 快捷键配置

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// 快捷键绑定
#[derive(Debug, Clone)]
pub struct KeyBinding {
    pub modifiers: KeyModifiers,
    pub code: KeyCode,
}

impl KeyBinding {
    pub const fn new(modifiers: KeyModifiers, code: KeyCode) -> Self {
        Self { modifiers, code }
    }

    pub const fn key(code: KeyCode) -> Self {
        Self::new(KeyModifiers::NONE, code)
    }

    pub const fn shift(code: KeyCode) -> Self {
        Self::new(KeyModifiers::SHIFT, code)
    }

    pub const fn ctrl(code: KeyCode) -> Self {
        Self::new(KeyModifiers::CONTROL, code)
    }

    /// 检查按键事件是否匹配此快捷键绑定
    pub fn matches(&self, key: &KeyEvent) -> bool {
        key.modifiers == self.modifiers && key.code == self.code
    }
}

/// 检查按键是否匹配任意一个绑定
pub fn any_matches(bindings: &[KeyBinding], key: &KeyEvent) -> bool {
    bindings.iter().any(|b| b.matches(key))
}

/// 默认快捷键配置
pub struct DefaultKeymap;

impl DefaultKeymap {
    // 全局
    pub const QUIT: KeyBinding = KeyBinding::key(KeyCode::Char('q'));
    pub const FORCE_QUIT: KeyBinding = KeyBinding::ctrl(KeyCode::Char('c'));
    pub const BACK: KeyBinding = KeyBinding::key(KeyCode::Esc);

    // 焦点
    pub const FOCUS_NEXT: [KeyBinding; 3] = [
        KeyBinding::key(KeyCode::Tab),
        KeyBinding::key(KeyCode::Down),
        KeyBinding::key(KeyCode::Right),
    ];
    pub const FOCUS_PREV: [KeyBinding; 4] = [
        KeyBinding::shift(KeyCode::BackTab),
        KeyBinding::key(KeyCode::BackTab),
        KeyBinding::key(KeyCode::Up),
        KeyBinding::key(KeyCode::Left),
    ];
    pub const ACTIVATE: [KeyBinding; 2] = [
        KeyBinding::key(KeyCode::Enter),
        KeyBinding::key(KeyCode::Char(' ')),
    ];

    // 舞台操作
    pub const TIPS: KeyBinding = KeyBinding::key(KeyCode::Char('m'));
    pub const WIZARD: KeyBinding = KeyBinding::key(KeyCode::Char('w'));
    pub const TOUR: KeyBinding = KeyBinding::key(KeyCode::Char('t'));
    pub const RESET_TOUR: KeyBinding = KeyBinding::key(KeyCode::Char('r'));
}
