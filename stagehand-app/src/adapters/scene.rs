//! 保留模式场景图
//!
//! `SceneNode` 是 `VisualNode` 的内存实现，供没有原生 UI 树的宿主（TUI、无头测试）使用。
//! 节点登记在所属 `Scene` 中，`set_parent` 通过 id 在场景内找到父节点并建立链接。
//!
//! 坐标约定：节点内部保存相对父节点的偏移，`rect()` 返回视口坐标，
//! 因此父节点移动时整棵子树随之移动。

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, Weak};

use stagehand_core::traits::{ClickListener, ElementKind, NodeHandle, VisualNode};
use stagehand_core::types::{Rect, Size, Vec2};
use stagehand_core::utils::{read, write};

/// 场景：节点注册表
pub struct Scene {
    nodes: RwLock<HashMap<u64, Weak<SceneNode>>>,
    next_id: AtomicU64,
    this: Weak<Scene>,
}

impl Scene {
    pub fn new() -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            nodes: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            this: this.clone(),
        })
    }

    /// 创建一个未挂载的节点
    pub fn create(&self, name: impl Into<String>, kind: ElementKind) -> Arc<SceneNode> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let node = Arc::new_cyclic(|me| SceneNode {
            id,
            name: name.into(),
            kind,
            scene: self.this.clone(),
            this: me.clone(),
            state: RwLock::new(NodeState::default()),
            children: RwLock::new(Vec::new()),
            parent: RwLock::new(None),
            listeners: RwLock::new(Vec::new()),
        });
        write(&self.nodes).insert(id, Arc::downgrade(&node));
        node
    }

    /// 创建指定矩形的节点
    pub fn create_with_rect(
        &self,
        name: impl Into<String>,
        kind: ElementKind,
        rect: Rect,
    ) -> Arc<SceneNode> {
        let node = self.create(name, kind);
        write(&node.state).local = rect;
        node
    }

    pub fn node(&self, id: u64) -> Option<Arc<SceneNode>> {
        read(&self.nodes).get(&id).and_then(Weak::upgrade)
    }

    /// 存活节点数
    pub fn len(&self) -> usize {
        read(&self.nodes)
            .values()
            .filter(|n| n.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn forget(&self, id: u64) {
        write(&self.nodes).remove(&id);
    }
}

#[derive(Debug, Clone)]
struct NodeState {
    active: bool,
    /// 相对父节点的矩形
    local: Rect,
    pivot: Option<Vec2>,
    scale: f32,
    alpha: f32,
    text: String,
    image: String,
    interactable: bool,
    destroyed: bool,
}

impl Default for NodeState {
    fn default() -> Self {
        Self {
            active: true,
            local: Rect::default(),
            pivot: None,
            scale: 1.0,
            alpha: 1.0,
            text: String::new(),
            image: String::new(),
            interactable: true,
            destroyed: false,
        }
    }
}

/// 场景节点
pub struct SceneNode {
    id: u64,
    name: String,
    kind: ElementKind,
    scene: Weak<Scene>,
    this: Weak<SceneNode>,
    state: RwLock<NodeState>,
    children: RwLock<Vec<Arc<SceneNode>>>,
    parent: RwLock<Option<Weak<SceneNode>>>,
    listeners: RwLock<Vec<ClickListener>>,
}

impl SceneNode {
    /// 挂一个子节点（从原父节点摘下）
    pub fn add_child(&self, child: &Arc<SceneNode>) {
        if let Some(me) = self.this.upgrade() {
            child.attach(Some(&me));
        }
    }

    pub fn parent(&self) -> Option<Arc<SceneNode>> {
        read(&self.parent).as_ref().and_then(Weak::upgrade)
    }

    pub fn child_nodes(&self) -> Vec<Arc<SceneNode>> {
        read(&self.children).clone()
    }

    /// 按名称深度优先查找后代
    pub fn find(&self, name: &str) -> Option<Arc<SceneNode>> {
        for child in self.child_nodes() {
            if child.name == name {
                return Some(child);
            }
            if let Some(found) = child.find(name) {
                return Some(found);
            }
        }
        None
    }

    /// 自身与所有祖先都处于激活状态
    pub fn is_visible(&self) -> bool {
        if !self.is_active() {
            return false;
        }
        self.parent().map_or(true, |p| p.is_visible())
    }

    /// 点击：节点可见且可交互时触发监听器
    pub fn click(&self) -> bool {
        if self.is_destroyed() || !self.is_interactable() || !self.is_visible() {
            return false;
        }
        let listeners = read(&self.listeners).clone();
        for listener in &listeners {
            listener();
        }
        !listeners.is_empty()
    }

    pub fn text(&self) -> String {
        read(&self.state).text.clone()
    }

    pub fn image(&self) -> String {
        read(&self.state).image.clone()
    }

    /// 相对父节点的矩形
    pub fn local_rect(&self) -> Rect {
        read(&self.state).local
    }

    pub fn set_local_rect(&self, rect: Rect) {
        write(&self.state).local = rect;
    }

    /// 可见且可点击的按钮（深度优先、自上而下的渲染顺序）
    pub fn clickable_buttons(&self) -> Vec<Arc<SceneNode>> {
        let mut out = Vec::new();
        self.collect_clickable(&mut out);
        out
    }

    fn collect_clickable(&self, out: &mut Vec<Arc<SceneNode>>) {
        if !self.is_active() {
            return;
        }
        for child in self.child_nodes() {
            if child.kind == ElementKind::Button
                && child.is_active()
                && child.is_interactable()
                && !read(&child.listeners).is_empty()
            {
                out.push(Arc::clone(&child));
            }
            child.collect_clickable(out);
        }
    }

    fn world_origin(&self) -> Vec2 {
        let local = read(&self.state).local.origin();
        match self.parent() {
            Some(parent) => {
                let base = parent.world_origin();
                Vec2::new(base.x + local.x, base.y + local.y)
            }
            None => local,
        }
    }

    fn attach(&self, parent: Option<&Arc<SceneNode>>) {
        let Some(me) = self.this.upgrade() else {
            return;
        };
        // 保持视口坐标不变
        let world = self.world_origin();

        if let Some(old) = self.parent() {
            write(&old.children).retain(|c| c.id != self.id);
        }

        let base = match parent {
            Some(parent) => {
                write(&parent.children).push(me);
                *write(&self.parent) = Some(Arc::downgrade(parent));
                parent.world_origin()
            }
            None => {
                *write(&self.parent) = None;
                Vec2::ZERO
            }
        };

        let mut state = write(&self.state);
        state.local.x = world.x - base.x;
        state.local.y = world.y - base.y;
    }
}

impl VisualNode for SceneNode {
    fn id(&self) -> u64 {
        self.id
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn kind(&self) -> ElementKind {
        self.kind
    }

    fn is_active(&self) -> bool {
        read(&self.state).active
    }

    fn set_active(&self, active: bool) {
        let mut state = write(&self.state);
        if !state.destroyed {
            state.active = active;
        }
    }

    fn rect(&self) -> Rect {
        let size = read(&self.state).local.size();
        Rect::from_origin_size(self.world_origin(), size)
    }

    fn set_position(&self, position: Vec2) {
        let base = self.parent().map_or(Vec2::ZERO, |p| p.world_origin());
        let mut state = write(&self.state);
        state.local.x = position.x - base.x;
        state.local.y = position.y - base.y;
    }

    fn set_size(&self, size: Size) {
        let mut state = write(&self.state);
        state.local.width = size.width;
        state.local.height = size.height;
    }

    fn pivot(&self) -> Option<Vec2> {
        read(&self.state).pivot
    }

    fn set_pivot(&self, pivot: Vec2) {
        write(&self.state).pivot = Some(pivot);
    }

    fn scale(&self) -> f32 {
        read(&self.state).scale
    }

    fn set_scale(&self, scale: f32) {
        write(&self.state).scale = scale;
    }

    fn alpha(&self) -> f32 {
        read(&self.state).alpha
    }

    fn set_alpha(&self, alpha: f32) {
        write(&self.state).alpha = alpha;
    }

    fn set_text(&self, text: &str) {
        write(&self.state).text = text.to_string();
    }

    fn set_image(&self, image: &str) {
        write(&self.state).image = image.to_string();
    }

    fn is_interactable(&self) -> bool {
        read(&self.state).interactable
    }

    fn set_interactable(&self, interactable: bool) {
        write(&self.state).interactable = interactable;
    }

    fn add_click_listener(&self, listener: ClickListener) {
        if !self.is_destroyed() {
            write(&self.listeners).push(listener);
        }
    }

    fn clear_click_listeners(&self) {
        write(&self.listeners).clear();
    }

    fn children(&self) -> Vec<NodeHandle> {
        self.child_nodes()
            .into_iter()
            .map(|c| c as NodeHandle)
            .collect()
    }

    fn set_parent(&self, parent: Option<&NodeHandle>) {
        match parent {
            Some(handle) => {
                let target = self.scene.upgrade().and_then(|scene| scene.node(handle.id()));
                match target {
                    Some(node) => self.attach(Some(&node)),
                    None => log::debug!(
                        "Node '{}' cannot be parented to '{}' outside its scene",
                        self.name,
                        handle.name()
                    ),
                }
            }
            None => self.attach(None),
        }
    }

    fn destroy(&self) {
        {
            let mut state = write(&self.state);
            if state.destroyed {
                return;
            }
            state.destroyed = true;
            state.active = false;
        }
        self.clear_click_listeners();

        let children = std::mem::take(&mut *write(&self.children));
        for child in children {
            *write(&child.parent) = None;
            child.destroy();
        }

        if let Some(parent) = self.parent() {
            write(&parent.children).retain(|c| c.id != self.id);
        }
        *write(&self.parent) = None;

        if let Some(scene) = self.scene.upgrade() {
            scene.forget(self.id);
        }
    }

    fn is_destroyed(&self) -> bool {
        read(&self.state).destroyed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_is_in_viewport_coordinates() {
        let scene = Scene::new();
        let root = scene.create_with_rect(
            "Root",
            ElementKind::Container,
            Rect::new(10.0, 5.0, 50.0, 20.0),
        );
        let button =
            scene.create_with_rect("Play", ElementKind::Button, Rect::new(2.0, 3.0, 8.0, 1.0));
        root.add_child(&button);

        assert_eq!(button.rect(), Rect::new(12.0, 8.0, 8.0, 1.0));
        root.set_position(Vec2::new(0.0, 0.0));
        assert_eq!(button.rect(), Rect::new(2.0, 3.0, 8.0, 1.0));

        button.set_position(Vec2::new(20.0, 20.0));
        assert_eq!(button.local_rect().origin(), Vec2::new(20.0, 20.0));
    }

    #[test]
    fn test_set_parent_keeps_world_position() {
        let scene = Scene::new();
        let viewport = scene.create_with_rect(
            "Viewport",
            ElementKind::Container,
            Rect::new(5.0, 5.0, 80.0, 24.0),
        );
        let dialog = scene.create_with_rect(
            "Dialog",
            ElementKind::Container,
            Rect::new(0.0, 0.0, 20.0, 8.0),
        );
        let handle: NodeHandle = viewport.clone();
        dialog.set_parent(Some(&handle));

        assert_eq!(dialog.parent().map(|p| p.id()), Some(viewport.id()));
        assert_eq!(viewport.child_nodes().len(), 1);
        assert_eq!(dialog.rect().origin(), Vec2::ZERO);

        dialog.set_parent(None);
        assert!(viewport.child_nodes().is_empty());
    }

    #[test]
    fn test_destroy_unlinks_subtree() {
        let scene = Scene::new();
        let root = scene.create("Root", ElementKind::Container);
        let panel = scene.create("Panel", ElementKind::Container);
        let label = scene.create("Label", ElementKind::Text);
        root.add_child(&panel);
        panel.add_child(&label);

        panel.destroy();
        assert!(root.child_nodes().is_empty());
        assert!(label.is_destroyed());
        assert!(scene.node(label.id()).is_none());
        // 重复销毁为空操作
        panel.destroy();
    }

    #[test]
    fn test_click_requires_visible_ancestors() {
        use std::sync::atomic::AtomicUsize;

        let scene = Scene::new();
        let root = scene.create("Root", ElementKind::Container);
        let button = scene.create("Ok", ElementKind::Button);
        root.add_child(&button);
        let clicks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&clicks);
        button.add_click_listener(Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        assert!(button.click());
        root.set_active(false);
        assert!(!button.click());
        assert!(root.clickable_buttons().is_empty());
        root.set_active(true);
        button.set_interactable(false);
        assert!(!button.click());
        assert_eq!(clicks.load(Ordering::SeqCst), 1);
    }
}
