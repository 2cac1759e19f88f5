//! 视图控制器
//!
//! 持有一个屏幕的视觉子树，维护生命周期状态机与按名称缓存的元素查找表。
//! 子控制器由父控制器独占持有，清理时递归释放。

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use crate::services::NavigationStack;
use crate::traits::{descendants, same_node, Completion, ElementKind, NodeHandle};
use crate::types::{LifecycleEvent, LifecycleState, TransitionKind, Vec2};
use crate::utils::lock;

/// 生命周期监听器
pub type LifecycleListener = Arc<dyn Fn(&ViewController, LifecycleEvent) + Send + Sync>;

/// 元素查找缓存
#[derive(Default)]
struct ElementCache {
    buttons: HashMap<String, NodeHandle>,
    texts: HashMap<String, NodeHandle>,
    labels: HashMap<String, NodeHandle>,
    images: HashMap<String, NodeHandle>,
}

impl ElementCache {
    fn rebuild(root: &NodeHandle) -> Self {
        let mut cache = Self::default();
        for node in descendants(root) {
            let map = match node.kind() {
                ElementKind::Button => &mut cache.buttons,
                ElementKind::Text => &mut cache.texts,
                ElementKind::Label => &mut cache.labels,
                ElementKind::Image => &mut cache.images,
                ElementKind::Container => continue,
            };
            // 同名元素以先遍历到的为准
            map.entry(node.name()).or_insert(node);
        }
        cache
    }

    fn is_empty(&self) -> bool {
        self.buttons.is_empty()
            && self.texts.is_empty()
            && self.labels.is_empty()
            && self.images.is_empty()
    }
}

#[derive(Default)]
struct ViewInner {
    state: LifecycleState,
    /// 逻辑上是否处于活动状态（栈顶）
    active: bool,
    root: Option<NodeHandle>,
    /// 根节点的静止位置，转场被打断时据此复原
    rest_position: Option<Vec2>,
    cache: ElementCache,
    listeners: Vec<(LifecycleEvent, LifecycleListener)>,
    stack: Weak<NavigationStack>,
    children: Vec<Arc<ViewController>>,
}

/// 视图控制器
pub struct ViewController {
    name: String,
    inner: Mutex<ViewInner>,
}

impl ViewController {
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            inner: Mutex::new(ViewInner::default()),
        })
    }

    /// 创建并立即挂载视觉根节点
    pub fn with_root(name: impl Into<String>, root: NodeHandle) -> Arc<Self> {
        let controller = Self::new(name);
        controller.attach_root(root);
        controller
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> LifecycleState {
        lock(&self.inner).state
    }

    pub fn is_active(&self) -> bool {
        lock(&self.inner).active
    }

    pub fn root(&self) -> Option<NodeHandle> {
        lock(&self.inner).root.clone()
    }

    /// 根节点的静止位置；首次进入导航栈时记录
    pub fn rest_position(&self) -> Option<Vec2> {
        lock(&self.inner).rest_position
    }

    /// 尚未记录静止位置时，以根节点当前位置为准
    pub(crate) fn remember_rest_position(&self) {
        let mut inner = lock(&self.inner);
        if inner.rest_position.is_none() {
            inner.rest_position = inner.root.as_ref().map(|root| root.rect().origin());
        }
    }

    /// 覆盖静止位置，例如弹窗按放置结果定位之后
    pub fn set_rest_position(&self, position: Vec2) {
        lock(&self.inner).rest_position = Some(position);
    }

    /// 挂载视觉根节点
    ///
    /// 节点会被设为非活动，元素缓存按名称重建，首次挂载时触发 `DidLoad`。
    /// 重复挂载同一节点是空操作。
    pub fn attach_root(&self, root: NodeHandle) {
        let first_load = {
            let mut inner = lock(&self.inner);
            if inner.root.as_ref().is_some_and(|r| same_node(r, &root)) {
                return;
            }
            if inner.root.is_some() {
                log::warn!(
                    "View '{}' root replaced after load; element caches rebuilt",
                    self.name
                );
            }
            root.set_active(false);
            inner.rest_position = None;
            inner.cache = ElementCache::rebuild(&root);
            inner.root = Some(root);
            inner.state == LifecycleState::Unloaded
        };
        if first_load {
            self.fire(LifecycleEvent::DidLoad);
        }
    }

    /// 注册生命周期监听器
    pub fn on<F>(&self, event: LifecycleEvent, listener: F)
    where
        F: Fn(&ViewController, LifecycleEvent) + Send + Sync + 'static,
    {
        lock(&self.inner).listeners.push((event, Arc::new(listener)));
    }

    pub fn will_appear(&self) -> bool {
        self.fire(LifecycleEvent::WillAppear)
    }

    pub fn did_appear(&self) -> bool {
        self.fire(LifecycleEvent::DidAppear)
    }

    pub fn will_disappear(&self) -> bool {
        self.fire(LifecycleEvent::WillDisappear)
    }

    pub fn did_disappear(&self) -> bool {
        self.fire(LifecycleEvent::DidDisappear)
    }

    /// 沿状态机推进一条边
    ///
    /// 非法边被忽略并返回 `false`；合法时通知监听器并转发给子控制器。
    fn fire(&self, event: LifecycleEvent) -> bool {
        let (listeners, children, buttons_enabled) = {
            let mut inner = lock(&self.inner);
            let Some(next) = inner.state.next(event) else {
                log::debug!(
                    "View '{}' ignored {:?} in state {:?}",
                    self.name,
                    event,
                    inner.state
                );
                return false;
            };
            inner.state = next;

            let buttons_enabled = match event {
                LifecycleEvent::WillAppear => {
                    inner.active = true;
                    None
                }
                LifecycleEvent::DidAppear => Some(true),
                LifecycleEvent::WillDisappear => {
                    inner.active = false;
                    Some(false)
                }
                LifecycleEvent::DidLoad | LifecycleEvent::DidDisappear => None,
            };

            let listeners: Vec<LifecycleListener> = inner
                .listeners
                .iter()
                .filter(|(e, _)| *e == event)
                .map(|(_, l)| Arc::clone(l))
                .collect();
            let children = if event == LifecycleEvent::DidLoad {
                Vec::new()
            } else {
                inner.children.clone()
            };
            (listeners, children, buttons_enabled)
        };

        if let Some(enabled) = buttons_enabled {
            self.set_interactable(enabled);
        }
        for listener in listeners {
            listener(self, event);
        }
        for child in children {
            child.fire(event);
        }
        true
    }

    // ===== 元素查找 =====

    fn lookup(&self, kind: ElementKind, name: &str) -> Option<NodeHandle> {
        let inner = lock(&self.inner);
        let map = match kind {
            ElementKind::Button => &inner.cache.buttons,
            ElementKind::Text => &inner.cache.texts,
            ElementKind::Label => &inner.cache.labels,
            ElementKind::Image => &inner.cache.images,
            ElementKind::Container => return None,
        };
        let found = map.get(name).cloned();
        if found.is_none() {
            log::warn!("View '{}': no {:?} named '{}'", self.name, kind, name);
        }
        found
    }

    pub fn button(&self, name: &str) -> Option<NodeHandle> {
        self.lookup(ElementKind::Button, name)
    }

    pub fn text(&self, name: &str) -> Option<NodeHandle> {
        self.lookup(ElementKind::Text, name)
    }

    pub fn label(&self, name: &str) -> Option<NodeHandle> {
        self.lookup(ElementKind::Label, name)
    }

    pub fn image(&self, name: &str) -> Option<NodeHandle> {
        self.lookup(ElementKind::Image, name)
    }

    /// 所有缓存的按钮
    pub fn buttons(&self) -> Vec<NodeHandle> {
        lock(&self.inner).cache.buttons.values().cloned().collect()
    }

    /// 启用/禁用所有缓存按钮，不改变生命周期状态
    pub fn set_interactable(&self, interactable: bool) {
        for button in self.buttons() {
            button.set_interactable(interactable);
        }
    }

    // ===== 导航委托 =====

    pub(crate) fn bind_stack(&self, stack: Weak<NavigationStack>) {
        lock(&self.inner).stack = stack;
    }

    /// 所属导航栈
    pub fn navigation(&self) -> Option<Arc<NavigationStack>> {
        lock(&self.inner).stack.upgrade()
    }

    /// 设置所属导航栈，供 `present_as_*` 系列方法使用
    pub fn set_navigation(&self, stack: &Arc<NavigationStack>) {
        self.bind_stack(Arc::downgrade(stack));
    }

    fn with_stack(&self, action: &str) -> Option<Arc<NavigationStack>> {
        let stack = self.navigation();
        if stack.is_none() {
            log::warn!("View '{}' cannot {action}: no navigation stack", self.name);
        }
        stack
    }

    /// 以 push 方式显示自身
    pub fn present_as_push(
        self: &Arc<Self>,
        kind: TransitionKind,
        on_complete: Option<Completion>,
    ) -> bool {
        let Some(stack) = self.with_stack("push") else {
            return false;
        };
        stack.push_with(Arc::clone(self), kind, std::time::Duration::ZERO, on_complete)
    }

    /// 从导航栈移除自身（仅当自身为栈顶）
    pub fn remove_from_stack(
        self: &Arc<Self>,
        kind: TransitionKind,
        on_complete: Option<Completion>,
    ) -> bool {
        let Some(stack) = self.with_stack("pop") else {
            return false;
        };
        if !stack.top().is_some_and(|top| Arc::ptr_eq(&top, self)) {
            log::warn!("View '{}' is not the top of its stack; pop ignored", self.name);
            return false;
        }
        stack
            .pop_with(kind, std::time::Duration::ZERO, on_complete)
            .is_some()
    }

    /// 以弹出层方式显示自身；`kind` 为 `None` 时使用配置的 popup 转场
    pub fn present_as_popup(
        self: &Arc<Self>,
        kind: Option<TransitionKind>,
        on_complete: Option<Completion>,
    ) -> bool {
        let Some(stack) = self.with_stack("present popup") else {
            return false;
        };
        let kind = kind.unwrap_or(stack.context().config.navigation.popup_transition);
        stack.present_popup(Arc::clone(self), kind, on_complete)
    }

    /// 关闭自身所在的弹出层（仅当自身为最上层弹出）
    pub fn dismiss_popup(
        self: &Arc<Self>,
        kind: Option<TransitionKind>,
        on_complete: Option<Completion>,
    ) -> bool {
        let Some(stack) = self.with_stack("dismiss popup") else {
            return false;
        };
        let kind = kind.unwrap_or(stack.context().config.navigation.popup_transition);
        if !stack.top_popup().is_some_and(|top| Arc::ptr_eq(&top, self)) {
            log::warn!("View '{}' is not the top popup; dismiss ignored", self.name);
            return false;
        }
        stack.dismiss_popup(kind, false, on_complete).is_some()
    }

    // ===== 子控制器 =====

    /// 添加子控制器（独占持有）
    pub fn add_child(&self, child: Arc<ViewController>) {
        lock(&self.inner).children.push(child);
    }

    /// 按名称移除子控制器并返回
    pub fn remove_child(&self, name: &str) -> Option<Arc<ViewController>> {
        let mut inner = lock(&self.inner);
        let index = inner.children.iter().position(|c| c.name() == name)?;
        Some(inner.children.remove(index))
    }

    pub fn children(&self) -> Vec<Arc<ViewController>> {
        lock(&self.inner).children.clone()
    }

    /// 释放按钮监听、清空缓存与生命周期监听，并递归清理子控制器
    ///
    /// 可重复调用。
    pub fn cleanup(&self) {
        let (cache, children) = {
            let mut inner = lock(&self.inner);
            inner.listeners.clear();
            (
                std::mem::take(&mut inner.cache),
                std::mem::take(&mut inner.children),
            )
        };
        if !cache.is_empty() {
            log::debug!("View '{}' cleaned up", self.name);
        }
        for button in cache.buttons.values() {
            button.clear_click_listeners();
        }
        for child in children {
            child.cleanup();
        }
    }
}

impl std::fmt::Debug for ViewController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewController")
            .field("name", &self.name)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::test_utils::screen_node;
    use crate::traits::VisualNode;

    #[test]
    fn test_attach_root_builds_caches_and_loads() {
        let root = screen_node("Home", &["Play", "Settings"]);
        let loads = Arc::new(AtomicUsize::new(0));
        let vc = ViewController::new("home");
        let counter = Arc::clone(&loads);
        vc.on(LifecycleEvent::DidLoad, move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        vc.attach_root(root.clone());
        vc.attach_root(root.clone());

        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert_eq!(vc.state(), LifecycleState::Loaded);
        assert!(!root.is_active());
        assert!(vc.button("Play").is_some());
        assert!(vc.text("Caption").is_some());
        assert!(vc.image("Logo").is_some());
    }

    #[test]
    fn test_missing_element_is_none() {
        let vc = ViewController::with_root("home", screen_node("Home", &["Play"]));
        assert!(vc.button("Missing").is_none());
        assert!(vc.label("Play").is_none());
    }

    #[test]
    fn test_appear_enables_and_disappear_disables_buttons() {
        let vc = ViewController::with_root("home", screen_node("Home", &["Play"]));
        let play = vc.button("Play").unwrap();

        assert!(vc.will_appear());
        assert!(vc.is_active());
        assert!(vc.did_appear());
        assert!(play.is_interactable());

        assert!(vc.will_disappear());
        assert!(!vc.is_active());
        assert!(!play.is_interactable());
        assert!(vc.did_disappear());
        assert_eq!(vc.state(), LifecycleState::Disappeared);
    }

    #[test]
    fn test_lifecycle_edges_fire_at_most_once() {
        let vc = ViewController::with_root("home", screen_node("Home", &[]));
        let appeared = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&appeared);
        vc.on(LifecycleEvent::DidAppear, move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        vc.will_appear();
        assert!(vc.did_appear());
        assert!(!vc.did_appear());
        assert_eq!(appeared.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_events_forwarded_to_children() {
        let parent = ViewController::with_root("parent", screen_node("Parent", &[]));
        let child = ViewController::with_root("child", screen_node("Child", &["Ok"]));
        parent.add_child(Arc::clone(&child));

        parent.will_appear();
        parent.did_appear();
        assert_eq!(child.state(), LifecycleState::Appeared);
        assert!(child.button("Ok").unwrap().is_interactable());
    }

    #[test]
    fn test_cleanup_is_idempotent() {
        let root = screen_node("Home", &["Play"]);
        let vc = ViewController::with_root("home", root.clone());
        let child = ViewController::with_root("child", screen_node("Child", &["Ok"]));
        vc.add_child(Arc::clone(&child));
        let play = root.find("Play").unwrap();
        play.add_click_listener(Arc::new(|| {}));

        vc.cleanup();
        let after_first = (vc.buttons().len(), vc.children().len(), child.buttons().len());
        vc.cleanup();
        let after_second = (vc.buttons().len(), vc.children().len(), child.buttons().len());

        assert_eq!(after_first, (0, 0, 0));
        assert_eq!(after_first, after_second);
        assert_eq!(play.listener_count(), 0);
    }

    #[test]
    fn test_delegation_without_stack_is_rejected() {
        let vc = ViewController::with_root("home", screen_node("Home", &[]));
        assert!(!vc.present_as_push(TransitionKind::None, None));
        assert!(!vc.dismiss_popup(Some(TransitionKind::None), None));
    }
}
