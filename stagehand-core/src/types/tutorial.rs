//! 教程步骤与事件

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::modal::ModalRequest;

/// 单个教程步骤（纯数据）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TutorialStep {
    /// 在所属教程内唯一
    pub step_id: String,
    /// 锚点注册表中的 id
    pub anchor_id: String,
    /// 锚点被激活（例如按钮被点击）时结束该步骤
    #[serde(default)]
    pub dismiss_on_anchor_action: bool,
    /// 显示前的等待时间
    #[serde(default, with = "millis")]
    pub delay: Duration,
    pub modal: ModalRequest,
}

impl TutorialStep {
    pub fn new(
        step_id: impl Into<String>,
        anchor_id: impl Into<String>,
        modal: ModalRequest,
    ) -> Self {
        Self {
            step_id: step_id.into(),
            anchor_id: anchor_id.into(),
            dismiss_on_anchor_action: false,
            delay: Duration::ZERO,
            modal,
        }
    }

    #[must_use]
    pub fn dismiss_on_anchor_action(mut self) -> Self {
        self.dismiss_on_anchor_action = true;
        self
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// 教程运行事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TutorialEvent {
    Started { tutorial_id: String, step_id: String },
    StepShown { step_id: String },
    /// 锚点缺失或未挂载，跳过
    StepSkipped { step_id: String },
    StepCompleted { step_id: String },
    /// `completed` 为 true 表示走完了最后一步
    Ended { completed: bool },
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::cast_possible_truncation)]
    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
