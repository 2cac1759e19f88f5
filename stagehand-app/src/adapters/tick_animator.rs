//! 帧驱动播放器
//!
//! 宿主在每帧调用 `tick(now)` 推进所有正在播放的时间线。
//! 结束的时间线先写入终值，再在锁外调用完成回调（回调里可以再开始新的播放）。

use std::sync::Mutex;
use std::time::{Duration, Instant};

use stagehand_core::traits::{Animator, Completion, Timeline};
use stagehand_core::utils::lock;

struct Running {
    timeline: Timeline,
    started: Instant,
    on_complete: Completion,
}

/// 帧驱动播放器
#[derive(Default)]
pub struct TickAnimator {
    running: Mutex<Vec<Running>>,
}

impl TickAnimator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_animating(&self) -> bool {
        !lock(&self.running).is_empty()
    }

    pub fn running_count(&self) -> usize {
        lock(&self.running).len()
    }

    /// 推进到 `now`，返回本次完成的时间线数
    pub fn tick(&self, now: Instant) -> usize {
        let finished: Vec<Running> = {
            let mut running = lock(&self.running);
            let mut finished = Vec::new();
            let mut index = 0;
            while index < running.len() {
                let elapsed = now.saturating_duration_since(running[index].started);
                if elapsed >= running[index].timeline.duration() {
                    finished.push(running.remove(index));
                } else {
                    running[index].timeline.apply_at(elapsed);
                    index += 1;
                }
            }
            finished
        };

        let count = finished.len();
        for entry in finished {
            entry.timeline.finish();
            (entry.on_complete)();
        }
        count
    }

    /// 立即完成所有时间线
    pub fn finish_all(&self) {
        let far = Instant::now() + Duration::from_secs(3600);
        while self.is_animating() {
            self.tick(far);
        }
    }
}

impl Animator for TickAnimator {
    fn play(&self, timeline: Timeline, on_complete: Completion) {
        let mut running = lock(&self.running);
        // 同一节点只由最新的时间线驱动；旧时间线照常完成
        for entry in running.iter_mut() {
            entry.timeline.yield_to(&timeline);
        }
        running.push(Running {
            timeline,
            started: Instant::now(),
            on_complete,
        });
    }
}
