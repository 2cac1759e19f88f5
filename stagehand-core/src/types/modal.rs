//! 弹窗请求与结果类型

use serde::{Deserialize, Serialize};

use super::geometry::{Rect, Vec2};
use super::transition::TransitionKind;

/// 弹窗结果，每个请求恰好产生一次
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ModalResult {
    /// 无结果（例如弹窗实例化失败）
    #[default]
    None,
    /// 用户点击确认
    Confirmed,
    /// 用户点击关闭
    Closed,
    /// 被抢占、背景点击或外部按 id 关闭
    DismissedBackground,
}

/// 靠近目标放置时的方位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Above,
    Below,
    Right,
    Left,
}

impl Side {
    /// 自动选择时的求值顺序（并列时先出现者胜出）
    pub const EVALUATION_ORDER: [Self; 4] = [Self::Above, Self::Below, Self::Right, Self::Left];
}

/// 弹窗放置模式
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PlacementMode {
    /// 视口居中
    #[default]
    Center,
    /// 放在目标矩形旁边；`side` 为 `None` 时自动选择空间最大的一侧
    NearTarget { target: Rect, side: Option<Side> },
    /// 视口内 0–1 比例坐标（弹窗中心）
    Normalized { at: Vec2 },
    /// 视口局部坐标（弹窗中心）
    Absolute { at: Vec2 },
}

/// 按钮配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonSpec {
    pub visible: bool,
    pub label: Option<String>,
}

impl ButtonSpec {
    pub fn shown() -> Self {
        Self {
            visible: true,
            label: None,
        }
    }

    pub fn hidden() -> Self {
        Self {
            visible: false,
            label: None,
        }
    }

    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            visible: true,
            label: Some(label.into()),
        }
    }
}

impl Default for ButtonSpec {
    fn default() -> Self {
        Self::shown()
    }
}

/// 弹窗请求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModalRequest {
    pub title: String,
    pub body: String,
    /// 图标资源名
    pub icon: Option<String>,
    pub confirm: ButtonSpec,
    pub close: ButtonSpec,
    /// 关联 id；为空时入队/展示时自动生成
    pub correlation_id: Option<String>,
    pub placement: PlacementMode,
    /// 是否显示背景遮罩
    pub dim_background: bool,
    /// 点击背景是否关闭（结果为 `DismissedBackground`）
    pub close_on_background: bool,
    /// 覆盖默认的弹窗模板
    pub template: Option<String>,
    pub show_transition: Option<TransitionKind>,
    pub hide_transition: Option<TransitionKind>,
}

impl ModalRequest {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            icon: None,
            confirm: ButtonSpec::shown(),
            close: ButtonSpec::shown(),
            correlation_id: None,
            placement: PlacementMode::Center,
            dim_background: true,
            close_on_background: false,
            template: None,
            show_transition: None,
            hide_transition: None,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    #[must_use]
    pub fn with_confirm(mut self, confirm: ButtonSpec) -> Self {
        self.confirm = confirm;
        self
    }

    #[must_use]
    pub fn with_close(mut self, close: ButtonSpec) -> Self {
        self.close = close;
        self
    }

    #[must_use]
    pub fn with_placement(mut self, placement: PlacementMode) -> Self {
        self.placement = placement;
        self
    }

    #[must_use]
    pub fn near(self, target: Rect) -> Self {
        self.with_placement(PlacementMode::NearTarget { target, side: None })
    }

    #[must_use]
    pub fn with_background(mut self, dim: bool, close_on_click: bool) -> Self {
        self.dim_background = dim;
        self.close_on_background = close_on_click;
        self
    }

    #[must_use]
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    #[must_use]
    pub fn with_transitions(
        mut self,
        show: Option<TransitionKind>,
        hide: Option<TransitionKind>,
    ) -> Self {
        self.show_transition = show;
        self.hide_transition = hide;
        self
    }

    /// 确保存在关联 id，返回该 id
    pub fn ensure_id(&mut self) -> String {
        self.correlation_id
            .get_or_insert_with(|| uuid::Uuid::new_v4().to_string())
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_id_keeps_caller_id() {
        let mut req = ModalRequest::new("t", "b").with_id("hint-1");
        assert_eq!(req.ensure_id(), "hint-1");
    }

    #[test]
    fn test_ensure_id_generates_once() {
        let mut req = ModalRequest::new("t", "b");
        let first = req.ensure_id();
        assert!(!first.is_empty());
        assert_eq!(req.ensure_id(), first);
    }

    #[test]
    fn test_placement_deserializes_from_tagged_json() {
        let mode: PlacementMode =
            serde_json::from_str(r#"{"mode":"normalized","at":{"x":0.5,"y":0.25}}"#).unwrap();
        assert_eq!(
            mode,
            PlacementMode::Normalized {
                at: Vec2::new(0.5, 0.25)
            }
        );
    }
}
