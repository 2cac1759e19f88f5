use crate::model::Screen;

/// 舞台消息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageMessage {
    /// 打开页面：不在栈中则推入，已在栈中则弹回到它
    Open(Screen),
    /// 弹出栈顶页面
    Back,
    /// 关闭当前弹窗（结果为 `DismissedBackground`）
    DismissModal,
    /// 显示提示弹窗
    ShowTips,
    /// 运行三步向导
    RunWizard,
    /// 从头开始教程
    StartTour,
    /// 清除教程进度
    ResetTour,
}
