//! 转场策略注册表
//!
//! 转场类型 → 构建器。构建器负责激活两端节点、设置 incoming 的起始姿态，
//! 返回补间时间线以及完成时要执行的收尾动作。

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::traits::{NodeHandle, Timeline, Tween, TweenProperty};
use crate::types::{Rect, TransitionDirection, TransitionKind, Vec2};
use crate::utils::{read, write};

/// 转场请求（两端均非空，空端由调用方用占位节点补齐）
#[derive(Clone)]
pub struct TransitionRequest {
    pub outgoing: NodeHandle,
    pub incoming: NodeHandle,
    pub kind: TransitionKind,
    pub duration: Duration,
    pub delay: Duration,
    pub direction: TransitionDirection,
    /// 弹出层：present 时保留 outgoing 可见
    pub layered: bool,
    pub viewport: Rect,
    /// 两端的静止位置；与节点当前（可能正处于动画中途的）位置无关
    pub outgoing_rest: Vec2,
    pub incoming_rest: Vec2,
}

impl TransitionRequest {
    /// 结束后 outgoing 是否仍保持活动
    pub fn keeps_outgoing(&self) -> bool {
        self.layered && self.direction == TransitionDirection::Present
    }
}

/// 转场完成后的收尾动作
#[derive(Clone)]
pub enum SettleAction {
    SetActive(NodeHandle, bool),
    /// 恢复缩放、透明度与位置
    ResetPose { node: NodeHandle, position: Vec2 },
}

impl SettleAction {
    pub fn apply(&self) {
        match self {
            Self::SetActive(node, active) => node.set_active(*active),
            Self::ResetPose { node, position } => {
                node.set_scale(1.0);
                node.set_alpha(1.0);
                node.set_position(*position);
            }
        }
    }
}

/// 构建结果
#[derive(Clone, Default)]
pub struct BuiltTransition {
    pub timeline: Timeline,
    pub settle: Vec<SettleAction>,
}

impl BuiltTransition {
    pub fn apply_settle(&self) {
        for action in &self.settle {
            action.apply();
        }
    }
}

/// 转场构建器 Trait
pub trait TransitionBuilder: Send + Sync {
    fn build(&self, request: &TransitionRequest) -> BuiltTransition;
}

impl<F> TransitionBuilder for F
where
    F: Fn(&TransitionRequest) -> BuiltTransition + Send + Sync,
{
    fn build(&self, request: &TransitionRequest) -> BuiltTransition {
        self(request)
    }
}

/// 两端的静止位置以及通用的收尾动作
struct Endpoints {
    out_rest: Vec2,
    in_rest: Vec2,
}

fn prepare(request: &TransitionRequest) -> Endpoints {
    let endpoints = Endpoints {
        out_rest: request.outgoing_rest,
        in_rest: request.incoming_rest,
    };
    request.outgoing.set_active(true);
    request.incoming.set_active(true);
    endpoints
}

fn settle_actions(request: &TransitionRequest, endpoints: &Endpoints) -> Vec<SettleAction> {
    let mut settle = vec![
        SettleAction::ResetPose {
            node: request.incoming.clone(),
            position: endpoints.in_rest,
        },
        SettleAction::SetActive(request.incoming.clone(), true),
    ];
    if !request.keeps_outgoing() {
        settle.push(SettleAction::SetActive(request.outgoing.clone(), false));
        settle.push(SettleAction::ResetPose {
            node: request.outgoing.clone(),
            position: endpoints.out_rest,
        });
    }
    settle
}

/// 无动画：直接切换
pub struct IdentityTransition;

impl TransitionBuilder for IdentityTransition {
    fn build(&self, request: &TransitionRequest) -> BuiltTransition {
        let endpoints = prepare(request);
        BuiltTransition {
            timeline: Timeline::new(),
            settle: settle_actions(request, &endpoints),
        }
    }
}

/// 滑动：incoming 从 `direction` 的反方向滑入
pub struct SlideTransition {
    /// 单位方向（incoming 的运动方向）
    pub direction: Vec2,
}

impl TransitionBuilder for SlideTransition {
    fn build(&self, request: &TransitionRequest) -> BuiltTransition {
        let endpoints = prepare(request);
        let offset = Vec2::new(
            self.direction.x * request.viewport.width,
            self.direction.y * request.viewport.height,
        );
        let mut timeline = Timeline::new();

        let animate_incoming =
            !(request.layered && request.direction == TransitionDirection::Dismiss);
        if animate_incoming {
            let start = Vec2::new(endpoints.in_rest.x - offset.x, endpoints.in_rest.y - offset.y);
            request.incoming.set_position(start);
            timeline = timeline.with(
                Tween::new(
                    request.incoming.clone(),
                    TweenProperty::Position {
                        from: start,
                        to: endpoints.in_rest,
                    },
                    request.duration,
                )
                .delayed(request.delay),
            );
        }
        if !request.keeps_outgoing() {
            // 被打断的 outgoing 从当前位置继续滑出
            let end = Vec2::new(endpoints.out_rest.x + offset.x, endpoints.out_rest.y + offset.y);
            timeline = timeline.with(
                Tween::new(
                    request.outgoing.clone(),
                    TweenProperty::Position {
                        from: request.outgoing.rect().origin(),
                        to: end,
                    },
                    request.duration,
                )
                .delayed(request.delay),
            );
        }

        BuiltTransition {
            timeline,
            settle: settle_actions(request, &endpoints),
        }
    }
}

/// 缩放：present 时 incoming 从 0 放大，dismiss 时 outgoing 缩小到 0
pub struct ScaleTransition;

impl TransitionBuilder for ScaleTransition {
    fn build(&self, request: &TransitionRequest) -> BuiltTransition {
        let endpoints = prepare(request);
        // 保留调用方设置的轴心（弹窗朝向目标的一侧）
        for node in [&request.incoming, &request.outgoing] {
            if node.pivot().is_none() {
                node.set_pivot(Vec2::HALF);
            }
        }

        let timeline = match request.direction {
            TransitionDirection::Present => {
                request.incoming.set_scale(0.0);
                let mut timeline = Timeline::new().with(
                    Tween::new(
                        request.incoming.clone(),
                        TweenProperty::Scale { from: 0.0, to: 1.0 },
                        request.duration,
                    )
                    .delayed(request.delay),
                );
                if !request.keeps_outgoing() {
                    timeline = timeline.with(
                        Tween::new(
                            request.outgoing.clone(),
                            TweenProperty::Scale { from: 1.0, to: 0.0 },
                            request.duration,
                        )
                        .delayed(request.delay),
                    );
                }
                timeline
            }
            TransitionDirection::Dismiss => Timeline::new().with(
                Tween::new(
                    request.outgoing.clone(),
                    TweenProperty::Scale { from: 1.0, to: 0.0 },
                    request.duration,
                )
                .delayed(request.delay),
            ),
        };

        BuiltTransition {
            timeline,
            settle: settle_actions(request, &endpoints),
        }
    }
}

/// 淡入淡出
pub struct FadeTransition;

impl TransitionBuilder for FadeTransition {
    fn build(&self, request: &TransitionRequest) -> BuiltTransition {
        let endpoints = prepare(request);
        let mut timeline = Timeline::new();

        if !(request.layered && request.direction == TransitionDirection::Dismiss) {
            request.incoming.set_alpha(0.0);
            timeline = timeline.with(
                Tween::new(
                    request.incoming.clone(),
                    TweenProperty::Alpha { from: 0.0, to: 1.0 },
                    request.duration,
                )
                .delayed(request.delay),
            );
        }
        if !request.keeps_outgoing() {
            timeline = timeline.with(
                Tween::new(
                    request.outgoing.clone(),
                    TweenProperty::Alpha { from: 1.0, to: 0.0 },
                    request.duration,
                )
                .delayed(request.delay),
            );
        }

        BuiltTransition {
            timeline,
            settle: settle_actions(request, &endpoints),
        }
    }
}

/// 转场策略注册表
pub struct TransitionRegistry {
    builders: RwLock<HashMap<TransitionKind, Arc<dyn TransitionBuilder>>>,
    default_kind: TransitionKind,
}

impl TransitionRegistry {
    /// 空注册表；所有查找都会落到恒等构建器
    #[must_use]
    pub fn new(default_kind: TransitionKind) -> Self {
        Self {
            builders: RwLock::new(HashMap::new()),
            default_kind,
        }
    }

    /// 注册全部内置构建器
    #[must_use]
    pub fn with_builtins(default_kind: TransitionKind) -> Self {
        let registry = Self::new(default_kind);
        registry.register(TransitionKind::None, Arc::new(IdentityTransition));
        registry.register(
            TransitionKind::SlideLeft,
            Arc::new(SlideTransition {
                direction: Vec2::new(-1.0, 0.0),
            }),
        );
        registry.register(
            TransitionKind::SlideRight,
            Arc::new(SlideTransition {
                direction: Vec2::new(1.0, 0.0),
            }),
        );
        registry.register(
            TransitionKind::SlideUp,
            Arc::new(SlideTransition {
                direction: Vec2::new(0.0, -1.0),
            }),
        );
        registry.register(
            TransitionKind::SlideDown,
            Arc::new(SlideTransition {
                direction: Vec2::new(0.0, 1.0),
            }),
        );
        registry.register(TransitionKind::Scale, Arc::new(ScaleTransition));
        registry.register(TransitionKind::Fade, Arc::new(FadeTransition));
        registry
    }

    pub fn default_kind(&self) -> TransitionKind {
        self.default_kind
    }

    /// 注册（或替换）构建器
    pub fn register(&self, kind: TransitionKind, builder: Arc<dyn TransitionBuilder>) {
        write(&self.builders).insert(kind, builder);
    }

    pub fn unregister(&self, kind: TransitionKind) -> bool {
        write(&self.builders).remove(&kind).is_some()
    }

    pub fn contains(&self, kind: TransitionKind) -> bool {
        read(&self.builders).contains_key(&kind)
    }

    /// 查找构建器：指定类型 → 默认类型 → 恒等
    pub fn resolve(&self, kind: TransitionKind) -> Arc<dyn TransitionBuilder> {
        let builders = read(&self.builders);
        if let Some(builder) = builders.get(&kind) {
            return Arc::clone(builder);
        }
        if let Some(builder) = builders.get(&self.default_kind) {
            log::warn!(
                "No transition builder for '{kind}', falling back to default '{}'",
                self.default_kind
            );
            return Arc::clone(builder);
        }
        log::warn!(
            "No transition builder for '{kind}' and default '{}' is missing; using identity",
            self.default_kind
        );
        Arc::new(IdentityTransition)
    }

    pub fn build(&self, request: &TransitionRequest) -> BuiltTransition {
        self.resolve(request.kind).build(request)
    }
}
