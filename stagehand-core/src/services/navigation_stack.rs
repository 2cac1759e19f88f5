//! 导航栈
//!
//! 有序的全屏视图控制器栈，外加一个叠放在栈顶之上的弹出层。
//!
//! 逻辑状态（谁在栈顶）在调用时同步更新，动画只负责视觉表现。
//! 每次开始转场都会推进该层的代数计数器，完成回调只有持有最新令牌时才执行
//! `DidAppear`/`DidDisappear`、收尾动作和调用方回调；占位节点与待销毁节点
//! 无论令牌是否过期都会被清理。

use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use crate::services::{
    BuiltTransition, StageContext, TransitionRequest, ViewController,
};
use crate::traits::{AudioCue, Completion, NodeHandle};
use crate::types::{TransitionDirection, TransitionKind, Vec2};
use crate::utils::{lock, Generation, GenerationToken};

/// 转场所在的层
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Stack,
    Popup,
}

#[derive(Default)]
struct LayerState {
    items: Vec<Arc<ViewController>>,
    version: Generation,
    /// 最新一次转场尚未完成
    pending: bool,
    /// 已移出但视觉上可能仍未收尾的控制器
    detached: Vec<Arc<ViewController>>,
}

impl LayerState {
    fn contains(&self, controller: &Arc<ViewController>) -> bool {
        self.items.iter().any(|c| Arc::ptr_eq(c, controller))
    }
}

#[derive(Default)]
struct StackState {
    stack: LayerState,
    popups: LayerState,
}

impl StackState {
    fn layer(&mut self, layer: Layer) -> &mut LayerState {
        match layer {
            Layer::Stack => &mut self.stack,
            Layer::Popup => &mut self.popups,
        }
    }

    /// 弹出层最上方的控制器，没有弹出时为栈顶
    fn frontmost(&self) -> Option<Arc<ViewController>> {
        self.popups
            .items
            .last()
            .or_else(|| self.stack.items.last())
            .cloned()
    }
}

/// 转场一端：根节点与其静止位置
struct Pose {
    node: NodeHandle,
    rest: Vec2,
}

impl Pose {
    fn of(controller: &ViewController) -> Option<Self> {
        let node = controller.root()?;
        let rest = controller
            .rest_position()
            .unwrap_or_else(|| node.rect().origin());
        Some(Self { node, rest })
    }
}

/// 一次转场所需的全部信息
struct TransitionPlan {
    layer: Layer,
    token: GenerationToken,
    outgoing: Option<Arc<ViewController>>,
    incoming: Option<Arc<ViewController>>,
    outgoing_pose: Option<Pose>,
    incoming_pose: Option<Pose>,
    kind: TransitionKind,
    delay: Duration,
    direction: TransitionDirection,
    layered: bool,
    dispose_outgoing: bool,
    on_complete: Option<Completion>,
}

/// 导航栈
pub struct NavigationStack {
    name: String,
    ctx: Arc<StageContext>,
    viewport: NodeHandle,
    state: Mutex<StackState>,
    this: Weak<NavigationStack>,
}

impl NavigationStack {
    pub fn new(name: impl Into<String>, ctx: Arc<StageContext>, viewport: NodeHandle) -> Arc<Self> {
        let name = name.into();
        Arc::new_cyclic(|this| Self {
            name,
            ctx,
            viewport,
            state: Mutex::new(StackState::default()),
            this: this.clone(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn viewport(&self) -> &NodeHandle {
        &self.viewport
    }

    pub fn context(&self) -> &Arc<StageContext> {
        &self.ctx
    }

    // ===== 查询 =====

    pub fn top(&self) -> Option<Arc<ViewController>> {
        lock(&self.state).stack.items.last().cloned()
    }

    pub fn top_popup(&self) -> Option<Arc<ViewController>> {
        lock(&self.state).popups.items.last().cloned()
    }

    pub fn len(&self) -> usize {
        lock(&self.state).stack.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn controllers(&self) -> Vec<Arc<ViewController>> {
        lock(&self.state).stack.items.clone()
    }

    pub fn popups(&self) -> Vec<Arc<ViewController>> {
        lock(&self.state).popups.items.clone()
    }

    /// 任一层的最新转场尚未完成
    pub fn is_transitioning(&self) -> bool {
        let state = lock(&self.state);
        state.stack.pending || state.popups.pending
    }

    /// 该控制器当前是否接收输入（最上方的弹出，或没有弹出时的栈顶）
    ///
    /// 逻辑变更后立即生效，不等待转场动画结束。
    pub fn is_interactive(&self, controller: &Arc<ViewController>) -> bool {
        lock(&self.state)
            .frontmost()
            .is_some_and(|front| Arc::ptr_eq(&front, controller))
    }

    // ===== 栈操作 =====

    /// 压入控制器
    pub fn push(
        &self,
        controller: Arc<ViewController>,
        kind: TransitionKind,
        delay: Duration,
    ) -> bool {
        self.push_with(controller, kind, delay, None)
    }

    /// 压入控制器，并在（未被后续转场取代的）转场完成后回调
    ///
    /// 没有视觉根节点或已在栈中的控制器会被忽略并返回 `false`。
    pub fn push_with(
        &self,
        controller: Arc<ViewController>,
        kind: TransitionKind,
        delay: Duration,
        on_complete: Option<Completion>,
    ) -> bool {
        let Some(root) = controller.root() else {
            log::warn!(
                "[{}] push ignored: view '{}' has no root node",
                self.name,
                controller.name()
            );
            return false;
        };

        let (previous, token) = {
            let mut state = lock(&self.state);
            if state.stack.contains(&controller) {
                log::warn!(
                    "[{}] push ignored: view '{}' is already on the stack",
                    self.name,
                    controller.name()
                );
                return false;
            }
            let previous = state.stack.items.last().cloned();
            state.stack.items.push(Arc::clone(&controller));
            state.stack.pending = true;
            (previous, state.stack.version.advance())
        };
        log::debug!(
            "[{}] push '{}' ({kind}, v{})",
            self.name,
            controller.name(),
            token.value()
        );

        controller.bind_stack(self.this.clone());
        root.set_parent(Some(&self.viewport));
        controller.remember_rest_position();
        if let Some(prev) = &previous {
            prev.will_disappear();
        }
        controller.will_appear();

        self.run(TransitionPlan {
            layer: Layer::Stack,
            token,
            outgoing_pose: previous.as_deref().and_then(Pose::of),
            outgoing: previous,
            incoming_pose: Pose::of(&controller),
            incoming: Some(controller),
            kind,
            delay,
            direction: TransitionDirection::Present,
            layered: false,
            dispose_outgoing: false,
            on_complete,
        });
        true
    }

    /// 弹出栈顶控制器
    pub fn pop(&self, kind: TransitionKind, delay: Duration) -> Option<Arc<ViewController>> {
        self.pop_with(kind, delay, None)
    }

    /// 弹出栈顶控制器；空栈时记录日志并返回 `None`
    pub fn pop_with(
        &self,
        kind: TransitionKind,
        delay: Duration,
        on_complete: Option<Completion>,
    ) -> Option<Arc<ViewController>> {
        let (popped, new_top, token) = {
            let mut state = lock(&self.state);
            let Some(popped) = state.stack.items.pop() else {
                log::warn!("[{}] pop ignored: stack is empty", self.name);
                return None;
            };
            state.stack.detached.push(Arc::clone(&popped));
            state.stack.pending = true;
            let new_top = state.stack.items.last().cloned();
            (popped, new_top, state.stack.version.advance())
        };
        log::debug!(
            "[{}] pop '{}' ({kind}, v{})",
            self.name,
            popped.name(),
            token.value()
        );

        popped.will_disappear();
        if let Some(top) = &new_top {
            top.will_appear();
        }

        self.run(TransitionPlan {
            layer: Layer::Stack,
            token,
            outgoing_pose: Pose::of(&popped),
            outgoing: Some(Arc::clone(&popped)),
            incoming_pose: new_top.as_deref().and_then(Pose::of),
            incoming: new_top,
            kind,
            delay,
            direction: TransitionDirection::Dismiss,
            layered: false,
            dispose_outgoing: false,
            on_complete,
        });
        Some(popped)
    }

    // ===== 弹出层 =====

    /// 在当前内容之上叠放一个弹出控制器
    pub fn present_popup(
        &self,
        controller: Arc<ViewController>,
        kind: TransitionKind,
        on_complete: Option<Completion>,
    ) -> bool {
        let Some(root) = controller.root() else {
            log::warn!(
                "[{}] popup ignored: view '{}' has no root node",
                self.name,
                controller.name()
            );
            return false;
        };

        let (beneath, token) = {
            let mut state = lock(&self.state);
            if state.popups.contains(&controller) {
                log::warn!(
                    "[{}] popup ignored: view '{}' is already presented",
                    self.name,
                    controller.name()
                );
                return false;
            }
            let beneath = state.frontmost();
            state.popups.items.push(Arc::clone(&controller));
            state.popups.pending = true;
            (beneath, state.popups.version.advance())
        };
        log::debug!(
            "[{}] present popup '{}' ({kind}, v{})",
            self.name,
            controller.name(),
            token.value()
        );

        controller.bind_stack(self.this.clone());
        root.set_parent(Some(&self.viewport));
        controller.remember_rest_position();
        if let Some(beneath) = &beneath {
            beneath.set_interactable(false);
        }
        controller.will_appear();

        self.run(TransitionPlan {
            layer: Layer::Popup,
            token,
            outgoing: None,
            outgoing_pose: beneath.as_deref().and_then(Pose::of),
            incoming_pose: Pose::of(&controller),
            incoming: Some(controller),
            kind,
            delay: Duration::ZERO,
            direction: TransitionDirection::Present,
            layered: true,
            dispose_outgoing: false,
            on_complete,
        });
        true
    }

    /// 关闭最上方的弹出控制器
    ///
    /// `dispose` 为 true 时，转场结束后无条件销毁其根节点（即使被后续转场取代）。
    pub fn dismiss_popup(
        &self,
        kind: TransitionKind,
        dispose: bool,
        on_complete: Option<Completion>,
    ) -> Option<Arc<ViewController>> {
        let (popped, beneath, token) = {
            let mut state = lock(&self.state);
            let Some(popped) = state.popups.items.pop() else {
                log::warn!("[{}] dismiss ignored: no popup presented", self.name);
                return None;
            };
            if !dispose {
                state.popups.detached.push(Arc::clone(&popped));
            }
            state.popups.pending = true;
            let beneath = state.frontmost();
            (popped, beneath, state.popups.version.advance())
        };
        log::debug!(
            "[{}] dismiss popup '{}' ({kind}, v{})",
            self.name,
            popped.name(),
            token.value()
        );

        popped.will_disappear();
        if let Some(beneath) = beneath.as_ref().filter(|b| b.is_active()) {
            beneath.set_interactable(true);
        }

        self.run(TransitionPlan {
            layer: Layer::Popup,
            token,
            outgoing_pose: Pose::of(&popped),
            outgoing: Some(Arc::clone(&popped)),
            incoming: None,
            incoming_pose: beneath.as_deref().and_then(Pose::of),
            kind,
            delay: Duration::ZERO,
            direction: TransitionDirection::Dismiss,
            layered: true,
            dispose_outgoing: dispose,
            on_complete,
        });
        Some(popped)
    }

    // ===== 转场执行 =====

    fn run(&self, plan: TransitionPlan) {
        let mut placeholders = Vec::new();
        let mut endpoint = |pose: Option<Pose>| {
            pose.unwrap_or_else(|| {
                let placeholder = self.ctx.loader.create_empty("Placeholder", &self.viewport);
                placeholders.push(placeholder.clone());
                let rest = placeholder.rect().origin();
                Pose {
                    node: placeholder,
                    rest,
                }
            })
        };
        let outgoing = endpoint(plan.outgoing_pose);
        let incoming = endpoint(plan.incoming_pose);
        let outgoing_node = outgoing.node.clone();

        let request = TransitionRequest {
            outgoing: outgoing.node,
            incoming: incoming.node,
            kind: plan.kind,
            duration: self.ctx.config.navigation.duration(),
            delay: plan.delay,
            direction: plan.direction,
            layered: plan.layered,
            viewport: self.viewport.rect(),
            outgoing_rest: outgoing.rest,
            incoming_rest: incoming.rest,
        };
        let BuiltTransition { timeline, settle } = self.ctx.transitions.build(&request);
        self.ctx.audio.play(AudioCue::Transition(plan.kind));

        let this = self.this.clone();
        let TransitionPlan {
            layer,
            token,
            outgoing,
            incoming,
            dispose_outgoing,
            on_complete,
            ..
        } = plan;
        let dispose = dispose_outgoing.then_some(outgoing_node);

        let completion: Completion = Box::new(move || {
            // 与版本无关的清理
            for placeholder in placeholders {
                placeholder.destroy();
            }
            if let Some(node) = dispose {
                node.destroy();
            }

            let Some(stack) = this.upgrade() else {
                return;
            };
            if !stack.complete(layer, token) {
                log::debug!(
                    "[{}] discarded stale {layer:?} transition v{}",
                    stack.name,
                    token.value()
                );
                return;
            }

            for action in &settle {
                action.apply();
            }
            stack.settle_layer(layer);
            if let Some(out) = &outgoing {
                out.did_disappear();
            }
            if let Some(inc) = &incoming {
                inc.did_appear();
                if layer == Layer::Stack && stack.top_popup().is_some() {
                    inc.set_interactable(false);
                }
            }
            if let Some(callback) = on_complete {
                callback();
            }
        });

        self.ctx.animator.play(timeline, completion);
    }

    /// 标记转场完成；令牌过期时返回 `false`
    fn complete(&self, layer: Layer, token: GenerationToken) -> bool {
        let mut state = lock(&self.state);
        let layer = state.layer(layer);
        if !layer.version.is_current(token) {
            return false;
        }
        layer.pending = false;
        true
    }

    /// 最新转场完成后收拢该层的可见性：栈中仅栈顶可见，已移出的控制器全部隐藏
    fn settle_layer(&self, layer: Layer) {
        let (hidden, top) = {
            let mut state = lock(&self.state);
            let layer_state = state.layer(layer);
            let detached = std::mem::take(&mut layer_state.detached);
            let mut hidden: Vec<Arc<ViewController>> = detached
                .into_iter()
                .filter(|c| !layer_state.contains(c))
                .collect();
            let top = match layer {
                Layer::Stack => {
                    let count = layer_state.items.len();
                    hidden.extend(layer_state.items.iter().take(count.saturating_sub(1)).cloned());
                    layer_state.items.last().cloned()
                }
                Layer::Popup => None,
            };
            (hidden, top)
        };

        for controller in hidden {
            if let Some(root) = controller.root() {
                root.set_active(false);
            }
        }
        if let Some(root) = top.and_then(|t| t.root()) {
            root.set_active(true);
        }
    }
}
