//! 编排配置
//!
//! 所有字段均有默认值，配置文件只需写出要覆盖的部分。

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::TransitionKind;

/// 顶层配置
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    pub navigation: NavigationConfig,
    pub modal: ModalConfig,
    pub placement: PlacementConfig,
    pub tutorial: TutorialConfig,
}

/// 导航栈配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// 未注册的转场类型回退到此类型
    pub default_transition: TransitionKind,
    pub push_transition: TransitionKind,
    pub pop_transition: TransitionKind,
    pub popup_transition: TransitionKind,
    pub duration_ms: u64,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            default_transition: TransitionKind::Fade,
            push_transition: TransitionKind::SlideLeft,
            pop_transition: TransitionKind::SlideRight,
            popup_transition: TransitionKind::Scale,
            duration_ms: 250,
        }
    }
}

impl NavigationConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

/// 弹窗模板中各元素的节点名
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogElementNames {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub confirm_button: String,
    pub confirm_label: String,
    pub close_button: String,
    pub close_label: String,
    pub background: String,
}

impl Default for DialogElementNames {
    fn default() -> Self {
        Self {
            title: "Title".to_string(),
            body: "Body".to_string(),
            icon: "Icon".to_string(),
            confirm_button: "ConfirmButton".to_string(),
            confirm_label: "ConfirmLabel".to_string(),
            close_button: "CloseButton".to_string(),
            close_label: "CloseLabel".to_string(),
            background: "Background".to_string(),
        }
    }
}

/// 弹窗配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModalConfig {
    pub dialog_template: String,
    pub show_transition: TransitionKind,
    pub hide_transition: TransitionKind,
    pub elements: DialogElementNames,
}

impl Default for ModalConfig {
    fn default() -> Self {
        Self {
            dialog_template: "dialog".to_string(),
            show_transition: TransitionKind::Scale,
            hide_transition: TransitionKind::Fade,
            elements: DialogElementNames::default(),
        }
    }
}

/// 放置引擎配置
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// 弹窗与目标矩形之间的最小间距
    pub gap: f32,
    /// 弹窗与视口边缘的内边距
    pub padding: f32,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            gap: 1.0,
            padding: 1.0,
        }
    }
}

/// 教程配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TutorialConfig {
    pub highlight_template: String,
    /// 高亮洞在锚点矩形外扩的距离
    pub highlight_padding: f32,
}

impl Default for TutorialConfig {
    fn default() -> Self {
        Self {
            highlight_template: "highlight".to_string(),
            highlight_padding: 1.0,
        }
    }
}

impl StageConfig {
    /// 从 JSON 文本解析并校验
    pub fn from_json_str(json: &str) -> CoreResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// 校验配置
    pub fn validate(&self) -> CoreResult<()> {
        if !self.placement.gap.is_finite() || self.placement.gap < 0.0 {
            return Err(CoreError::InvalidConfig(format!(
                "placement.gap must be a non-negative number, got {}",
                self.placement.gap
            )));
        }
        if !self.placement.padding.is_finite() || self.placement.padding < 0.0 {
            return Err(CoreError::InvalidConfig(format!(
                "placement.padding must be a non-negative number, got {}",
                self.placement.padding
            )));
        }
        if self.modal.dialog_template.trim().is_empty() {
            return Err(CoreError::InvalidConfig(
                "modal.dialog_template cannot be empty".to_string(),
            ));
        }
        if self.tutorial.highlight_template.trim().is_empty() {
            return Err(CoreError::InvalidConfig(
                "tutorial.highlight_template cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
