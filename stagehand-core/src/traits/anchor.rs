//! 锚点元素抽象
//!
//! 锚点是注册到 `AnchorRegistry` 的活动 UI 元素，教程用它定位高亮区域。

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::traits::NodeHandle;
use crate::types::Rect;

/// 锚点元素 Trait
pub trait AnchorElement: Send + Sync {
    /// 当前屏幕矩形
    fn rect(&self) -> Rect;

    /// 是否仍挂载在活动场景中
    fn is_mounted(&self) -> bool;

    /// 订阅“被激活”信号；不支持激活的锚点返回 `None`
    fn subscribe_activation(&self) -> Option<broadcast::Receiver<()>>;
}

/// 基于视觉节点的锚点
///
/// 若节点是按钮，点击会自动发出激活信号。
pub struct NodeAnchor {
    node: NodeHandle,
    activated: broadcast::Sender<()>,
}

impl NodeAnchor {
    pub fn new(node: NodeHandle) -> Arc<Self> {
        let (activated, _) = broadcast::channel(8);
        let anchor = Arc::new(Self { node, activated });
        let signal = anchor.activated.clone();
        anchor.node.add_click_listener(Arc::new(move || {
            // 无订阅者时发送失败是正常情况
            let _ = signal.send(());
        }));
        anchor
    }

    pub fn node(&self) -> &NodeHandle {
        &self.node
    }

    /// 手动发出激活信号
    pub fn activate(&self) {
        let _ = self.activated.send(());
    }
}

impl AnchorElement for NodeAnchor {
    fn rect(&self) -> Rect {
        self.node.rect()
    }

    fn is_mounted(&self) -> bool {
        !self.node.is_destroyed() && self.node.is_active()
    }

    fn subscribe_activation(&self) -> Option<broadcast::Receiver<()>> {
        Some(self.activated.subscribe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockNode;
    use crate::traits::{ElementKind, VisualNode};

    #[tokio::test]
    async fn test_click_emits_activation() {
        let node = Arc::new(MockNode::with_kind("Play", ElementKind::Button));
        node.set_active(true);
        let anchor = NodeAnchor::new(node.clone());
        let mut rx = anchor.subscribe_activation().unwrap();
        node.click();
        assert!(rx.recv().await.is_ok());
    }

    #[test]
    fn test_inactive_node_is_not_mounted() {
        let node = Arc::new(MockNode::new("Panel"));
        let anchor = NodeAnchor::new(node.clone());
        assert!(!anchor.is_mounted());
        node.set_active(true);
        assert!(anchor.is_mounted());
        node.destroy();
        assert!(!anchor.is_mounted());
    }
}
