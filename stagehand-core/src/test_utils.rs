//! 测试辅助模块
//!
//! 提供 mock 实现和便捷的测试工厂方法。

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::config::StageConfig;
use crate::error::{CoreError, CoreResult};
use crate::services::{AnchorRegistry, StageContext, TransitionRegistry, ViewController};
use crate::traits::{
    Animator, AssetLoader, AudioCue, AudioSink, ClickListener, Completion, ElementKind,
    InMemoryKeyValueStore, NodeHandle, Timeline, VisualNode,
};
use crate::types::{Rect, Size, Vec2};
use crate::utils::lock;

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

// ===== MockNode =====

struct MockState {
    active: bool,
    rect: Rect,
    pivot: Option<Vec2>,
    scale: f32,
    alpha: f32,
    text: String,
    image: String,
    interactable: bool,
    listeners: Vec<ClickListener>,
    parent: Option<u64>,
    destroyed: bool,
}

pub struct MockNode {
    id: u64,
    name: String,
    kind: ElementKind,
    children: Mutex<Vec<Arc<MockNode>>>,
    state: Mutex<MockState>,
}

impl MockNode {
    pub fn new(name: &str) -> Self {
        Self::with_kind(name, ElementKind::Container)
    }

    pub fn with_kind(name: &str, kind: ElementKind) -> Self {
        Self {
            id: NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed),
            name: name.to_string(),
            kind,
            children: Mutex::new(Vec::new()),
            state: Mutex::new(MockState {
                active: false,
                rect: Rect::default(),
                pivot: None,
                scale: 1.0,
                alpha: 1.0,
                text: String::new(),
                image: String::new(),
                interactable: true,
                listeners: Vec::new(),
                parent: None,
                destroyed: false,
            }),
        }
    }

    #[must_use]
    pub fn with_rect(self, rect: Rect) -> Self {
        lock(&self.state).rect = rect;
        self
    }

    pub fn add_child(&self, child: Arc<MockNode>) {
        lock(&child.state).parent = Some(self.id);
        lock(&self.children).push(child);
    }

    /// 按名称深度优先查找后代
    pub fn find(&self, name: &str) -> Option<Arc<MockNode>> {
        for child in lock(&self.children).clone() {
            if child.name == name {
                return Some(child);
            }
            if let Some(found) = child.find(name) {
                return Some(found);
            }
        }
        None
    }

    /// 模拟点击：仅在可交互时触发监听器
    pub fn click(&self) {
        let listeners = {
            let state = lock(&self.state);
            if !state.interactable || state.destroyed {
                return;
            }
            state.listeners.clone()
        };
        for listener in listeners {
            listener();
        }
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.state).listeners.len()
    }

    pub fn text(&self) -> String {
        lock(&self.state).text.clone()
    }

    pub fn image(&self) -> String {
        lock(&self.state).image.clone()
    }

    pub fn parent_id(&self) -> Option<u64> {
        lock(&self.state).parent
    }
}

impl VisualNode for MockNode {
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
        lock(&self.state).active
    }

    fn set_active(&self, active: bool) {
        let mut state = lock(&self.state);
        if !state.destroyed {
            state.active = active;
        }
    }

    fn rect(&self) -> Rect {
        lock(&self.state).rect
    }

    fn set_position(&self, position: Vec2) {
        let mut state = lock(&self.state);
        state.rect.x = position.x;
        state.rect.y = position.y;
    }

    fn set_size(&self, size: Size) {
        let mut state = lock(&self.state);
        state.rect.width = size.width;
        state.rect.height = size.height;
    }

    fn pivot(&self) -> Option<Vec2> {
        lock(&self.state).pivot
    }

    fn set_pivot(&self, pivot: Vec2) {
        lock(&self.state).pivot = Some(pivot);
    }

    fn scale(&self) -> f32 {
        lock(&self.state).scale
    }

    fn set_scale(&self, scale: f32) {
        lock(&self.state).scale = scale;
    }

    fn alpha(&self) -> f32 {
        lock(&self.state).alpha
    }

    fn set_alpha(&self, alpha: f32) {
        lock(&self.state).alpha = alpha;
    }

    fn set_text(&self, text: &str) {
        lock(&self.state).text = text.to_string();
    }

    fn set_image(&self, image: &str) {
        lock(&self.state).image = image.to_string();
    }

    fn is_interactable(&self) -> bool {
        lock(&self.state).interactable
    }

    fn set_interactable(&self, interactable: bool) {
        lock(&self.state).interactable = interactable;
    }

    fn add_click_listener(&self, listener: ClickListener) {
        lock(&self.state).listeners.push(listener);
    }

    fn clear_click_listeners(&self) {
        lock(&self.state).listeners.clear();
    }

    fn children(&self) -> Vec<NodeHandle> {
        lock(&self.children)
            .iter()
            .map(|c| Arc::clone(c) as NodeHandle)
            .collect()
    }

    fn set_parent(&self, parent: Option<&NodeHandle>) {
        lock(&self.state).parent = parent.map(|p| p.id());
    }

    fn destroy(&self) {
        {
            let mut state = lock(&self.state);
            state.destroyed = true;
            state.active = false;
            state.listeners.clear();
        }
        for child in lock(&self.children).clone() {
            child.destroy();
        }
    }

    fn is_destroyed(&self) -> bool {
        lock(&self.state).destroyed
    }
}

/// 带按钮、"Caption" 文本与 "Logo" 图片的屏幕节点
pub fn screen_node(name: &str, buttons: &[&str]) -> Arc<MockNode> {
    let root = Arc::new(MockNode::new(name).with_rect(Rect::new(0.0, 0.0, 100.0, 50.0)));
    for button in buttons {
        root.add_child(Arc::new(MockNode::with_kind(button, ElementKind::Button)));
    }
    root.add_child(Arc::new(MockNode::with_kind("Caption", ElementKind::Text)));
    root.add_child(Arc::new(MockNode::with_kind("Logo", ElementKind::Image)));
    root
}

/// 挂好 `screen_node` 根节点的控制器
pub fn screen_controller(name: &str, buttons: &[&str]) -> Arc<ViewController> {
    ViewController::with_root(name, screen_node(name, buttons))
}

pub fn test_viewport() -> NodeHandle {
    let viewport = MockNode::new("Viewport").with_rect(Rect::new(0.0, 0.0, 100.0, 50.0));
    viewport.set_active(true);
    Arc::new(viewport)
}

// ===== MockLoader =====

/// 内置 "dialog" 与 "highlight" 模板，其余模板 id 返回 `TemplateNotFound`
pub struct MockLoader {
    instances: Mutex<Vec<(String, Arc<MockNode>)>>,
    placeholders: Mutex<Vec<Arc<MockNode>>>,
    missing: Mutex<HashSet<String>>,
}

impl MockLoader {
    pub fn new() -> Self {
        Self {
            instances: Mutex::new(Vec::new()),
            placeholders: Mutex::new(Vec::new()),
            missing: Mutex::new(HashSet::new()),
        }
    }

    /// 让某个内置模板表现为不存在
    pub fn remove_template(&self, template_id: &str) {
        lock(&self.missing).insert(template_id.to_string());
    }

    /// 最近一次实例化的模板节点
    pub fn last_instance(&self, template_id: &str) -> Option<Arc<MockNode>> {
        lock(&self.instances)
            .iter()
            .rev()
            .find(|(id, _)| id == template_id)
            .map(|(_, node)| Arc::clone(node))
    }

    pub fn instance_count(&self, template_id: &str) -> usize {
        lock(&self.instances)
            .iter()
            .filter(|(id, _)| id == template_id)
            .count()
    }

    pub fn placeholders(&self) -> Vec<Arc<MockNode>> {
        lock(&self.placeholders).clone()
    }

    fn dialog() -> Arc<MockNode> {
        let root = Arc::new(MockNode::new("Dialog").with_rect(Rect::new(0.0, 0.0, 20.0, 8.0)));
        root.add_child(Arc::new(MockNode::with_kind("Background", ElementKind::Button)));
        root.add_child(Arc::new(MockNode::with_kind("Title", ElementKind::Text)));
        root.add_child(Arc::new(MockNode::with_kind("Body", ElementKind::Text)));
        root.add_child(Arc::new(MockNode::with_kind("Icon", ElementKind::Image)));
        for (button, label) in [
            ("ConfirmButton", "ConfirmLabel"),
            ("CloseButton", "CloseLabel"),
        ] {
            let node = Arc::new(MockNode::with_kind(button, ElementKind::Button));
            node.add_child(Arc::new(MockNode::with_kind(label, ElementKind::Text)));
            root.add_child(node);
        }
        root
    }
}

impl AssetLoader for MockLoader {
    fn instantiate(&self, template_id: &str, parent: &NodeHandle) -> CoreResult<NodeHandle> {
        if lock(&self.missing).contains(template_id) {
            return Err(CoreError::TemplateNotFound(template_id.to_string()));
        }
        let node = match template_id {
            "dialog" => Self::dialog(),
            "highlight" => Arc::new(MockNode::new("Highlight")),
            _ => return Err(CoreError::TemplateNotFound(template_id.to_string())),
        };
        node.set_parent(Some(parent));
        lock(&self.instances).push((template_id.to_string(), Arc::clone(&node)));
        Ok(node as NodeHandle)
    }

    fn create_empty(&self, name: &str, parent: &NodeHandle) -> NodeHandle {
        let node = Arc::new(MockNode::new(name).with_rect(parent.rect()));
        node.set_parent(Some(parent));
        lock(&self.placeholders).push(Arc::clone(&node));
        node
    }
}

// ===== ManualAnimator =====

/// 由测试显式触发完成的播放器
pub struct ManualAnimator {
    pending: Mutex<Vec<(Timeline, Completion)>>,
}

impl ManualAnimator {
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(Vec::new()),
        }
    }

    pub fn pending_count(&self) -> usize {
        lock(&self.pending).len()
    }

    /// 完成当前队列中第 `index` 个时间线
    pub fn complete(&self, index: usize) -> bool {
        let entry = {
            let mut pending = lock(&self.pending);
            if index >= pending.len() {
                return false;
            }
            pending.remove(index)
        };
        let (timeline, on_complete) = entry;
        timeline.finish();
        on_complete();
        true
    }

    pub fn complete_last(&self) -> bool {
        let count = self.pending_count();
        count > 0 && self.complete(count - 1)
    }

    /// 按开始顺序完成所有时间线（包括完成过程中新开始的）
    pub fn complete_all(&self) {
        while self.complete(0) {}
    }
}

impl Animator for ManualAnimator {
    fn play(&self, timeline: Timeline, on_complete: Completion) {
        lock(&self.pending).push((timeline, on_complete));
    }
}

// ===== RecordingAudio =====

pub struct RecordingAudio {
    cues: Mutex<Vec<AudioCue>>,
}

impl RecordingAudio {
    pub fn new() -> Self {
        Self {
            cues: Mutex::new(Vec::new()),
        }
    }

    pub fn cues(&self) -> Vec<AudioCue> {
        lock(&self.cues).clone()
    }
}

impl AudioSink for RecordingAudio {
    fn play(&self, cue: AudioCue) {
        lock(&self.cues).push(cue);
    }
}

// ===== 工厂方法 =====

/// 创建测试上下文（手动播放器、零时长转场）
pub fn create_test_context() -> (
    Arc<StageContext>,
    Arc<MockLoader>,
    Arc<ManualAnimator>,
    Arc<RecordingAudio>,
) {
    let animator = Arc::new(ManualAnimator::new());
    let (ctx, loader, audio) = create_test_context_with(animator.clone());
    (ctx, loader, animator, audio)
}

pub fn create_test_context_with(
    animator: Arc<dyn Animator>,
) -> (Arc<StageContext>, Arc<MockLoader>, Arc<RecordingAudio>) {
    let loader = Arc::new(MockLoader::new());
    let audio = Arc::new(RecordingAudio::new());
    let mut config = StageConfig::default();
    config.navigation.duration_ms = 0;

    let ctx = StageContext::new(
        loader.clone(),
        animator,
        audio.clone(),
        Arc::new(InMemoryKeyValueStore::new()),
        Arc::new(AnchorRegistry::new()),
        Arc::new(TransitionRegistry::with_builtins(
            config.navigation.default_transition,
        )),
        config,
    );
    (Arc::new(ctx), loader, audio)
}

/// 让出执行权若干次，使已 spawn 的任务推进到下一个挂起点
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}
