//! 舞台后端
//!
//! 组装场景图、模板、帧驱动播放器与持久化存储，构建 `Stage`，
//! 并把 UI 层的操作翻译成导航栈、弹窗队列和教程控制器上的调用。

use std::collections::HashMap;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use stagehand_app::adapters::{Scene, SceneNode, TemplateLoader, TickAnimator};
use stagehand_app::{Stage, StageBuilder};
use stagehand_core::config::{DialogElementNames, StageConfig};
use stagehand_core::error::CoreResult;
use stagehand_core::services::{TutorialController, ViewController};
use stagehand_core::traits::{
    AnchorElement, AssetLoader, ElementKind, KeyValueStore, NodeAnchor, NodeHandle, VisualNode,
};
use stagehand_core::types::{LifecycleEvent, Rect, Size, TransitionKind, TutorialEvent};
use tokio::sync::broadcast;

use super::{screens, tour};
use crate::message::{AppMessage, StageMessage};
use crate::model::Screen;

/// 终端尺寸未知时的初始视口
const INITIAL_VIEWPORT: Rect = Rect::new(0.0, 0.0, 80.0, 23.0);

pub struct StageBackend {
    stage: Stage,
    viewport: Arc<SceneNode>,
    overlay: Arc<SceneNode>,
    animator: Arc<TickAnimator>,
    screens: HashMap<Screen, Arc<ViewController>>,
    tour: Arc<TutorialController>,
    tour_events: broadcast::Receiver<TutorialEvent>,
    sender: mpsc::Sender<AppMessage>,
    receiver: mpsc::Receiver<AppMessage>,
}

impl StageBackend {
    /// 构建舞台并实例化所有页面
    ///
    /// 必须在 tokio 运行时上下文中调用（弹窗队列与教程会派生任务）。
    pub fn new(config: StageConfig, store: Arc<dyn KeyValueStore>) -> CoreResult<Self> {
        let scene = Scene::new();
        let viewport =
            scene.create_with_rect("Viewport", ElementKind::Container, INITIAL_VIEWPORT);
        let overlay = scene.create_with_rect("Overlay", ElementKind::Container, INITIAL_VIEWPORT);

        let loader = Arc::new(TemplateLoader::with_standard_templates(
            Arc::clone(&scene),
            &config,
        ));
        screens::register(&loader);
        let animator = Arc::new(TickAnimator::new());
        let navigation_duration = config.navigation.duration();

        let stage = StageBuilder::new()
            .loader(loader.clone())
            .viewport(viewport.clone())
            .overlay(overlay.clone())
            .animator(animator.clone())
            .store(store)
            .config(config)
            .build()?;

        let (sender, receiver) = mpsc::channel();
        let screens = Self::build_screens(&loader, &viewport, &sender)?;
        Self::bind_anchors(&stage, &screens);

        let tour = stage.tutorial(tour::TOUR_ID, tour::tour_steps(navigation_duration));
        let tour_events = tour.subscribe();

        log::info!("Stage backend ready with {} screens", screens.len());
        Ok(Self {
            stage,
            viewport,
            overlay,
            animator,
            screens,
            tour,
            tour_events,
            sender,
            receiver,
        })
    }

    fn build_screens(
        loader: &TemplateLoader,
        viewport: &Arc<SceneNode>,
        sender: &mpsc::Sender<AppMessage>,
    ) -> CoreResult<HashMap<Screen, Arc<ViewController>>> {
        let parent: NodeHandle = viewport.clone();
        let mut screens = HashMap::new();
        for screen in Screen::ALL {
            let root = loader.instantiate(screen.template_id(), &parent)?;
            root.set_size(viewport.rect().size());
            let controller = ViewController::with_root(screen.name(), root);

            for def in screens::buttons(screen) {
                let Some(button) = controller.button(def.name) else {
                    continue;
                };
                let tx = sender.clone();
                let action = def.action;
                button.add_click_listener(Arc::new(move || {
                    // 主循环退出后接收端已丢弃
                    let _ = tx.send(AppMessage::Stage(action));
                }));
            }
            screens.insert(screen, controller);
        }
        Ok(screens)
    }

    /// 页面出现时注册锚点，开始离开时注销
    fn bind_anchors(stage: &Stage, screens: &HashMap<Screen, Arc<ViewController>>) {
        for (screen, button, anchor_id) in tour::ANCHORS {
            let Some(controller) = screens.get(&screen) else {
                continue;
            };
            let Some(node) = controller.button(button) else {
                continue;
            };
            let anchor: Arc<dyn AnchorElement> = NodeAnchor::new(node);

            let registry = Arc::clone(stage.anchors());
            let element = Arc::clone(&anchor);
            controller.on(LifecycleEvent::WillAppear, move |_, _| {
                registry.register(anchor_id, Arc::clone(&element));
            });
            let registry = Arc::clone(stage.anchors());
            controller.on(LifecycleEvent::WillDisappear, move |_, _| {
                registry.unregister(anchor_id, &anchor);
            });
        }
    }

    // ===== 生命周期 =====

    /// 显示首页，并按持久化进度恢复欢迎教程
    pub fn start(&self) {
        if let Some(home) = self.screens.get(&Screen::Home) {
            self.stage
                .navigation
                .push(Arc::clone(home), TransitionKind::None, Duration::ZERO);
        }

        let tour = Arc::clone(&self.tour);
        let tx = self.sender.clone();
        tokio::spawn(async move {
            match tour.begin_if_needed().await {
                Ok(true) => log::info!("Welcome tour resumed"),
                Ok(false) => log::debug!("Welcome tour already finished"),
                Err(e) => {
                    log::error!("Failed to read tour progress: {e}");
                    let status = format!("Tour progress unavailable: {e}");
                    let _ = tx.send(AppMessage::Status(status));
                }
            }
        });
    }

    /// 结束教程、清空弹窗并完成所有动画
    pub fn shutdown(&self) {
        self.tour.end();
        self.stage.shutdown();
        self.animator.finish_all();
    }

    /// 推进动画，返回本帧完成的时间线数
    pub fn tick(&self, now: Instant) -> usize {
        self.animator.tick(now)
    }

    /// 终端尺寸变化：视口、覆盖层和所有页面根节点跟随
    pub fn resize(&self, width: u16, height: u16) {
        let size = Size::new(f32::from(width), f32::from(height));
        self.viewport.set_size(size);
        self.overlay.set_size(size);
        for controller in self.screens.values() {
            if let Some(root) = controller.root() {
                root.set_size(size);
            }
        }
        log::debug!("Viewport resized to {width}x{height}");
    }

    // ===== 消息 =====

    /// 取出按钮回调与后台任务投递的消息
    pub fn drain_messages(&self) -> Vec<AppMessage> {
        self.receiver.try_iter().collect()
    }

    /// 取出教程事件
    pub fn drain_tutorial_events(&mut self) -> Vec<TutorialEvent> {
        let mut events = Vec::new();
        loop {
            match self.tour_events.try_recv() {
                Ok(event) => events.push(event),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    log::warn!("Dropped {skipped} tutorial events");
                }
                Err(_) => break,
            }
        }
        events
    }

    // ===== 操作 =====

    /// 打开页面：不在栈中则推入；已在栈中则弹回到它；已在栈顶时返回 `false`
    pub fn open(&self, screen: Screen) -> bool {
        let Some(controller) = self.screens.get(&screen) else {
            return false;
        };
        let navigation = &self.stage.navigation;
        let config = &self.stage.config().navigation;
        let stack = navigation.controllers();

        match stack.iter().position(|c| Arc::ptr_eq(c, controller)) {
            Some(index) if index + 1 == stack.len() => false,
            Some(index) => {
                for _ in index + 1..stack.len() {
                    navigation.pop(config.pop_transition, Duration::ZERO);
                }
                true
            }
            None => navigation.push(
                Arc::clone(controller),
                config.push_transition,
                Duration::ZERO,
            ),
        }
    }

    /// 弹出栈顶页面；首页不会被弹出
    pub fn back(&self) -> bool {
        let navigation = &self.stage.navigation;
        if navigation.len() <= 1 {
            return false;
        }
        navigation
            .pop(self.stage.config().navigation.pop_transition, Duration::ZERO)
            .is_some()
    }

    pub fn dismiss_modal(&self) -> bool {
        self.stage.modals.dismiss_active()
    }

    pub fn show_tips(&self) {
        let handle = self.stage.show_modal(tour::tips());
        let tx = self.sender.clone();
        tokio::spawn(async move {
            let result = handle.await;
            let _ = tx.send(AppMessage::Status(format!("Tips closed: {result:?}")));
        });
    }

    pub fn run_wizard(&self) {
        let sequence = self.stage.sequence(tour::wizard()).allow_back(true);
        let tx = self.sender.clone();
        tokio::spawn(async move {
            let outcome = sequence.run().await;
            log::info!("Wizard finished: {outcome:?}");
            let _ = tx.send(AppMessage::Status(format!("Wizard: {outcome:?}")));
        });
    }

    /// 从第一步重新开始教程（回到首页）
    pub fn start_tour(&self) -> bool {
        self.open(Screen::Home);
        self.tour.begin()
    }

    /// 结束教程并清除持久化进度
    pub fn reset_tour(&self) {
        self.tour.end();
        let progress = Arc::clone(&self.stage.progress);
        let tx = self.sender.clone();
        tokio::spawn(async move {
            let status = match progress.reset(tour::TOUR_ID).await {
                Ok(()) => "Tour progress cleared".to_string(),
                Err(e) => {
                    log::error!("Failed to reset tour progress: {e}");
                    format!("Reset failed: {e}")
                }
            };
            let _ = tx.send(AppMessage::Status(status));
        });
    }

    /// 执行舞台消息，返回给状态栏的说明
    pub fn apply(&self, msg: StageMessage) -> Option<String> {
        match msg {
            StageMessage::Open(screen) => {
                self.open(screen);
                None
            }
            StageMessage::Back => (!self.back()).then(|| "Already at the first screen".to_string()),
            StageMessage::DismissModal => {
                (!self.dismiss_modal()).then(|| "No dialog to dismiss".to_string())
            }
            StageMessage::ShowTips => {
                self.show_tips();
                None
            }
            StageMessage::RunWizard => {
                self.run_wizard();
                None
            }
            StageMessage::StartTour => {
                (!self.start_tour()).then(|| "Tour could not start".to_string())
            }
            StageMessage::ResetTour => {
                self.reset_tour();
                None
            }
        }
    }

    // ===== 查询（供 View 与焦点使用） =====

    pub fn viewport(&self) -> &Arc<SceneNode> {
        &self.viewport
    }

    pub fn overlay(&self) -> &Arc<SceneNode> {
        &self.overlay
    }

    /// 弹窗模板中各元素的节点名
    pub fn dialog_names(&self) -> &DialogElementNames {
        &self.stage.config().modal.elements
    }

    pub fn is_modal_showing(&self) -> bool {
        self.stage.presenter.is_showing()
    }

    pub fn pending_modals(&self) -> usize {
        self.stage.modals.len()
    }

    pub fn highlight_hole(&self) -> Option<Rect> {
        self.stage.highlighter.hole()
    }

    /// 导航栈上的页面名（自底向上）
    pub fn breadcrumb(&self) -> Vec<String> {
        self.stage
            .navigation
            .controllers()
            .iter()
            .map(|c| c.name().to_string())
            .collect()
    }

    /// 当前教程步骤 id
    pub fn tour_step(&self) -> Option<&str> {
        self.tour
            .current_index()
            .and_then(|index| self.tour.steps().get(index))
            .map(|step| step.step_id.as_str())
    }

    /// 键盘可达的按钮
    ///
    /// 有弹窗时只包含弹窗按钮，外加教程高亮洞里露出的按钮；否则是当前页面的按钮。
    pub fn focus_ring(&self) -> Vec<Arc<SceneNode>> {
        let overlay_buttons = labeled(self.overlay.clickable_buttons());
        if overlay_buttons.is_empty() && !self.is_modal_showing() {
            return labeled(self.viewport.clickable_buttons());
        }

        let mut ring = overlay_buttons;
        if let Some(hole) = self.highlight_hole() {
            ring.extend(
                labeled(self.viewport.clickable_buttons())
                    .into_iter()
                    .filter(|b| hole.contains(b.rect().center())),
            );
        }
        ring
    }
}

/// 按钮上显示的文字：自身文字，或第一个有文字的子节点
pub fn button_label(node: &SceneNode) -> Option<String> {
    let own = node.text();
    if !own.is_empty() {
        return Some(own);
    }
    node.child_nodes()
        .iter()
        .map(|c| c.text())
        .find(|t| !t.is_empty())
}

/// 过滤掉没有文字的按钮（弹窗的背景点击区）
fn labeled(buttons: Vec<Arc<SceneNode>>) -> Vec<Arc<SceneNode>> {
    buttons
        .into_iter()
        .filter(|b| button_label(b).is_some())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagehand_core::traits::InMemoryKeyValueStore;

    fn backend() -> StageBackend {
        StageBackend::new(
            StageConfig::default(),
            Arc::new(InMemoryKeyValueStore::new()),
        )
        .unwrap()
    }

    async fn settle() {
        for _ in 0..32 {
            tokio::task::yield_now().await;
        }
    }

    fn names(ring: &[Arc<SceneNode>]) -> Vec<String> {
        ring.iter().map(|n| n.name()).collect()
    }

    #[tokio::test]
    async fn test_home_buttons_form_focus_ring() {
        let backend = backend();
        backend.start();
        backend.animator.finish_all();

        let ring = names(&backend.focus_ring());
        assert_eq!(
            ring,
            vec!["TipsButton", "GalleryButton", "SettingsButton", "TourButton"]
        );
        assert_eq!(backend.breadcrumb(), vec!["Home"]);
    }

    #[tokio::test]
    async fn test_button_click_routes_through_channel() {
        let backend = backend();
        backend.start();
        backend.animator.finish_all();

        let gallery = backend.viewport.find("GalleryButton").unwrap();
        assert!(gallery.click());
        let messages = backend.drain_messages();
        assert!(messages
            .iter()
            .any(|m| matches!(m, AppMessage::Stage(StageMessage::Open(Screen::Gallery)))));
    }

    #[tokio::test]
    async fn test_open_and_back() {
        let backend = backend();
        backend.start();
        backend.animator.finish_all();

        assert!(backend.open(Screen::Gallery));
        backend.animator.finish_all();
        assert!(!backend.open(Screen::Gallery));
        assert_eq!(backend.breadcrumb(), vec!["Home", "Gallery"]);

        assert!(backend.open(Screen::Settings));
        backend.animator.finish_all();
        // 已在栈中：弹回到首页
        assert!(backend.open(Screen::Home));
        backend.animator.finish_all();
        assert_eq!(backend.breadcrumb(), vec!["Home"]);
        assert!(!backend.back());
    }

    #[tokio::test]
    async fn test_modal_restricts_focus_ring() {
        let backend = backend();
        backend.start();
        backend.animator.finish_all();
        settle().await;
        // 首次启动时教程自动开始，先结束它
        backend.tour.end();
        settle().await;
        backend.animator.finish_all();

        backend.show_tips();
        settle().await;
        backend.animator.finish_all();
        assert!(backend.is_modal_showing());
        assert_eq!(names(&backend.focus_ring()), vec!["ConfirmButton"]);

        assert!(backend.dismiss_modal());
        settle().await;
        backend.animator.finish_all();
        assert!(!backend.is_modal_showing());
    }

    #[tokio::test]
    async fn test_resize_follows_terminal() {
        let backend = backend();
        backend.resize(120, 39);
        assert_eq!(backend.viewport.rect().size(), Size::new(120.0, 39.0));
        let home = backend.screens.get(&Screen::Home).unwrap().root().unwrap();
        assert_eq!(home.rect().size(), Size::new(120.0, 39.0));
    }
}
