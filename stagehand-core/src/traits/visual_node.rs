//! 视觉节点抽象 Trait
//!
//! 平台层提供的可定位、可缩放 UI 图元。核心只通过此 trait 操作节点，
//! 不关心渲染细节。

use std::sync::Arc;

use crate::types::{Rect, Size, Vec2};

/// 共享节点句柄
pub type NodeHandle = Arc<dyn VisualNode>;

/// 按钮点击回调
pub type ClickListener = Arc<dyn Fn() + Send + Sync>;

/// 节点元素类型（决定进入哪个查找缓存）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Container,
    Button,
    Text,
    /// 带样式的富文本标签
    Label,
    Image,
}

/// 视觉节点 Trait
///
/// 平台实现:
/// - TUI: `TermNode`（终端单元格坐标）
/// - 测试: `MockNode`
///
/// 所有方法使用 `&self`，实现方自行处理内部可变性。
pub trait VisualNode: Send + Sync {
    /// 节点实例的稳定标识
    fn id(&self) -> u64;

    fn name(&self) -> String;

    fn kind(&self) -> ElementKind;

    fn is_active(&self) -> bool;

    fn set_active(&self, active: bool);

    /// 视口坐标下的矩形（未缩放）
    fn rect(&self) -> Rect;

    /// 设置左上角位置
    fn set_position(&self, position: Vec2);

    fn set_size(&self, size: Size);

    /// 缩放/旋转中心，0–1 比例；从未设置过时为 `None`
    fn pivot(&self) -> Option<Vec2>;

    fn set_pivot(&self, pivot: Vec2);

    fn scale(&self) -> f32;

    fn set_scale(&self, scale: f32);

    fn alpha(&self) -> f32;

    fn set_alpha(&self, alpha: f32);

    /// 文本类节点的内容；其他类型忽略
    fn set_text(&self, text: &str);

    /// 图片类节点的资源名；其他类型忽略
    fn set_image(&self, image: &str);

    fn is_interactable(&self) -> bool;

    fn set_interactable(&self, interactable: bool);

    fn add_click_listener(&self, listener: ClickListener);

    fn clear_click_listeners(&self);

    /// 直接子节点
    fn children(&self) -> Vec<NodeHandle>;

    /// 重新挂到 `parent` 下；`None` 表示从场景树上摘除
    fn set_parent(&self, parent: Option<&NodeHandle>);

    /// 销毁节点及其子树，之后的调用均为空操作
    fn destroy(&self);

    fn is_destroyed(&self) -> bool;
}

/// 两个句柄是否指向同一节点
pub fn same_node(a: &NodeHandle, b: &NodeHandle) -> bool {
    a.id() == b.id()
}

/// 深度优先遍历所有后代节点（不含自身）
pub fn descendants(node: &NodeHandle) -> Vec<NodeHandle> {
    let mut out = Vec::new();
    let mut stack: Vec<NodeHandle> = node.children().into_iter().rev().collect();
    while let Some(next) = stack.pop() {
        stack.extend(next.children().into_iter().rev());
        out.push(next);
    }
    out
}
