//! 转场类型

use std::fmt;

use serde::{Deserialize, Serialize};

/// 转场动画风格，用于从注册表中选择构建器
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    /// 无动画，立即切换
    None,
    /// 新视图从右侧滑入，旧视图向左滑出
    #[default]
    SlideLeft,
    /// 新视图从左侧滑入，旧视图向右滑出
    SlideRight,
    /// 新视图从下方滑入
    SlideUp,
    /// 新视图从上方滑入
    SlideDown,
    /// 新视图从零缩放放大
    Scale,
    /// 淡入淡出
    Fade,
}

impl TransitionKind {
    /// 所有内置类型
    pub const ALL: [Self; 7] = [
        Self::None,
        Self::SlideLeft,
        Self::SlideRight,
        Self::SlideUp,
        Self::SlideDown,
        Self::Scale,
        Self::Fade,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::SlideLeft => "slide_left",
            Self::SlideRight => "slide_right",
            Self::SlideUp => "slide_up",
            Self::SlideDown => "slide_down",
            Self::Scale => "scale",
            Self::Fade => "fade",
        }
    }
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 转场方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionDirection {
    /// push / present：incoming 是新内容
    Present,
    /// pop / dismiss：outgoing 被移除，incoming 是回到的内容
    Dismiss,
}
