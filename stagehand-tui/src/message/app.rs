use stagehand_core::types::TutorialEvent;

use super::StageMessage;

#[derive(Debug, Clone)]
pub enum AppMessage {
    /// 退出应用
    Quit,

    /// 焦点移动与按钮激活
    Focus(FocusMessage),

    /// 舞台操作（导航、弹窗、教程）
    Stage(StageMessage),

    /// 教程事件（来自 `TutorialController::subscribe`）
    Tutorial(TutorialEvent),

    /// 终端尺寸变化
    Resize(u16, u16),

    /// 设置状态消息（后台任务回报结果）
    Status(String),

    /// 无操作（用于忽略未处理的事件）
    Noop,
}

/// 焦点消息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusMessage {
    Next,
    Prev,
    /// 点击当前焦点按钮
    Activate,
}
