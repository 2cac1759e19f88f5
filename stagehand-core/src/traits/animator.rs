//! 动画时间线与播放器抽象

use std::time::Duration;

use crate::traits::{same_node, NodeHandle};
use crate::types::Vec2;

/// 时间线播放完成回调
pub type Completion = Box<dyn FnOnce() + Send>;

/// 补间属性（起止值）
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TweenProperty {
    Position { from: Vec2, to: Vec2 },
    Scale { from: f32, to: f32 },
    Alpha { from: f32, to: f32 },
}

/// 单个属性补间
#[derive(Clone)]
pub struct Tween {
    pub target: NodeHandle,
    pub property: TweenProperty,
    pub duration: Duration,
    pub delay: Duration,
}

impl Tween {
    pub fn new(target: NodeHandle, property: TweenProperty, duration: Duration) -> Self {
        Self {
            target,
            property,
            duration,
            delay: Duration::ZERO,
        }
    }

    #[must_use]
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// 结束时间（delay + duration）
    pub fn end(&self) -> Duration {
        self.delay + self.duration
    }

    /// 按时间线已流逝时间写入属性值；尚未开始的补间不写入
    pub fn apply_at(&self, elapsed: Duration) {
        if elapsed < self.delay {
            return;
        }
        let local = elapsed - self.delay;
        let t = if self.duration.is_zero() {
            1.0
        } else {
            (local.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
        };
        self.apply_progress(ease_out_cubic(t));
    }

    /// 写入终值
    pub fn finish(&self) {
        self.apply_progress(1.0);
    }

    fn apply_progress(&self, t: f32) {
        match self.property {
            TweenProperty::Position { from, to } => self.target.set_position(from.lerp(to, t)),
            TweenProperty::Scale { from, to } => self.target.set_scale(from + (to - from) * t),
            TweenProperty::Alpha { from, to } => self.target.set_alpha(from + (to - from) * t),
        }
    }
}

fn ease_out_cubic(t: f32) -> f32 {
    1.0 - (1.0 - t).powi(3)
}

/// 可组合的补间序列
#[derive(Clone, Default)]
pub struct Timeline {
    tweens: Vec<Tween>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, tween: Tween) -> Self {
        self.tweens.push(tween);
        self
    }

    /// 与另一条时间线并行播放
    #[must_use]
    pub fn join(mut self, other: Self) -> Self {
        self.tweens.extend(other.tweens);
        self
    }

    /// 在本时间线结束后播放另一条
    #[must_use]
    pub fn then(mut self, other: Self) -> Self {
        let offset = self.duration();
        self.tweens
            .extend(other.tweens.into_iter().map(|t| {
                let delay = t.delay + offset;
                t.delayed(delay)
            }));
        self
    }

    pub fn tweens(&self) -> &[Tween] {
        &self.tweens
    }

    pub fn is_empty(&self) -> bool {
        self.tweens.is_empty()
    }

    /// 总时长（最晚结束的补间）
    pub fn duration(&self) -> Duration {
        self.tweens.iter().map(Tween::end).max().unwrap_or_default()
    }

    pub fn apply_at(&self, elapsed: Duration) {
        for tween in &self.tweens {
            tween.apply_at(elapsed);
        }
    }

    pub fn finish(&self) {
        for tween in &self.tweens {
            tween.finish();
        }
    }

    /// 去掉作用于 `newer` 所涉节点的补间，由较新的时间线接管这些节点
    pub fn yield_to(&mut self, newer: &Self) {
        self.tweens
            .retain(|t| !newer.tweens.iter().any(|n| same_node(&n.target, &t.target)));
    }
}

/// 动画播放器 Trait
///
/// 实现方负责按时间推进补间，并在全部结束后调用一次 `on_complete`。
/// 实现方不得在持有自身锁的情况下调用 `on_complete`。
pub trait Animator: Send + Sync {
    fn play(&self, timeline: Timeline, on_complete: Completion);
}

/// 立即完成的播放器：写入终值后同步回调
pub struct InstantAnimator;

impl Animator for InstantAnimator {
    fn play(&self, timeline: Timeline, on_complete: Completion) {
        timeline.finish();
        on_complete();
    }
}
