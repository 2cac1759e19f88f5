//! 教程序列器
//!
//! 按顺序执行教程步骤：等待预显示延迟、解析锚点、高亮锚点并通过弹窗队列显示提示。
//! 步骤由弹窗结果推进，或在 `dismiss_on_anchor_action` 时由锚点激活推进。
//!
//! 每次 `begin*`/`end` 都推进代数计数器；后台任务在每个挂起点之后校验令牌，
//! 过期的延续直接丢弃，不会推进或结束已被取代的序列。

use std::sync::{Arc, Mutex, Weak};

use tokio::runtime::Handle;
use tokio::sync::broadcast;

use crate::error::CoreResult;
use crate::services::{AnchorRegistry, Highlighter, ModalQueue, StageContext, TutorialProgress};
use crate::traits::{AudioCue, AudioSink};
use crate::types::{ModalResult, PlacementMode, TutorialEvent, TutorialStep};
use crate::utils::{lock, Generation, GenerationToken};

const EVENT_CAPACITY: usize = 64;

#[derive(Default)]
struct RunState {
    /// `None` 表示未运行
    index: Option<usize>,
    generation: Generation,
    single_step: bool,
    /// 当前步骤弹窗的关联 id
    modal_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StepOutcome {
    Completed,
    Skipped,
    Ended,
    Stale,
}

/// 教程控制器
pub struct TutorialController {
    tutorial_id: String,
    steps: Vec<TutorialStep>,
    anchors: Arc<AnchorRegistry>,
    audio: Arc<dyn AudioSink>,
    queue: Arc<ModalQueue>,
    highlighter: Arc<Highlighter>,
    progress: Option<Arc<TutorialProgress>>,
    state: Mutex<RunState>,
    events: broadcast::Sender<TutorialEvent>,
    this: Weak<TutorialController>,
}

impl TutorialController {
    /// 创建控制器；提供 `progress` 时同时注册该教程的步骤顺序
    pub fn new(
        tutorial_id: impl Into<String>,
        steps: Vec<TutorialStep>,
        ctx: &StageContext,
        queue: Arc<ModalQueue>,
        highlighter: Arc<Highlighter>,
        progress: Option<Arc<TutorialProgress>>,
    ) -> Arc<Self> {
        let tutorial_id = tutorial_id.into();
        if let Some(progress) = &progress {
            progress.register(&tutorial_id, steps.iter().map(|s| s.step_id.clone()));
        }
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Arc::new_cyclic(|this| Self {
            tutorial_id,
            steps,
            anchors: Arc::clone(&ctx.anchors),
            audio: Arc::clone(&ctx.audio),
            queue,
            highlighter,
            progress,
            state: Mutex::new(RunState::default()),
            events,
            this: this.clone(),
        })
    }

    pub fn tutorial_id(&self) -> &str {
        &self.tutorial_id
    }

    pub fn steps(&self) -> &[TutorialStep] {
        &self.steps
    }

    pub fn current_index(&self) -> Option<usize> {
        lock(&self.state).index
    }

    pub fn is_running(&self) -> bool {
        self.current_index().is_some()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TutorialEvent> {
        self.events.subscribe()
    }

    fn index_of(&self, step_id: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.step_id == step_id)
    }

    // ===== 启动/结束 =====

    /// 从第一步开始
    pub fn begin(&self) -> bool {
        if self.steps.is_empty() {
            log::warn!("Tutorial '{}' has no steps", self.tutorial_id);
            return false;
        }
        self.start(0, false)
    }

    /// 从指定步骤开始
    pub fn begin_from(&self, step_id: &str) -> bool {
        self.show_step(step_id, false)
    }

    /// 显示指定步骤；`single_step` 为 true 时该步结束后即结束教程
    pub fn show_step(&self, step_id: &str, single_step: bool) -> bool {
        match self.index_of(step_id) {
            Some(index) => self.start(index, single_step),
            None => {
                log::warn!("Tutorial '{}' has no step '{step_id}'", self.tutorial_id);
                false
            }
        }
    }

    /// 按持久化进度恢复：从第一个未完成步骤开始；已全部完成时为空操作
    pub async fn begin_if_needed(&self) -> CoreResult<bool> {
        let Some(progress) = &self.progress else {
            return Ok(self.begin());
        };
        if progress.is_tutorial_done(&self.tutorial_id).await? {
            log::debug!("Tutorial '{}' already done", self.tutorial_id);
            return Ok(false);
        }
        match progress.first_pending_step(&self.tutorial_id).await? {
            Some(step_id) => Ok(self.begin_from(&step_id)),
            None => {
                progress.mark_tutorial_done(&self.tutorial_id).await?;
                Ok(false)
            }
        }
    }

    /// 结束教程：关闭当前提示、隐藏高亮、重置索引；可重复调用
    pub fn end(&self) {
        let (was_running, modal_id) = {
            let mut state = lock(&self.state);
            state.generation.advance();
            (state.index.take().is_some(), state.modal_id.take())
        };
        if let Some(id) = modal_id {
            self.queue.dismiss_by_id(&id, ModalResult::DismissedBackground);
        }
        self.highlighter.hide();
        if was_running {
            log::info!("Tutorial '{}' ended", self.tutorial_id);
            self.emit(TutorialEvent::Ended { completed: false });
        }
    }

    fn start(&self, index: usize, single_step: bool) -> bool {
        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                log::error!(
                    "Tutorial '{}' cannot start outside a tokio runtime: {e}",
                    self.tutorial_id
                );
                return false;
            }
        };
        let Some(this) = self.this.upgrade() else {
            return false;
        };
        let (token, superseded) = {
            let mut state = lock(&self.state);
            let token = state.generation.advance();
            state.index = Some(index);
            state.single_step = single_step;
            (token, state.modal_id.take())
        };
        if let Some(id) = superseded {
            self.queue.dismiss_by_id(&id, ModalResult::DismissedBackground);
        }
        self.highlighter.hide();

        let step_id = self.steps[index].step_id.clone();
        log::info!("Tutorial '{}' started at '{step_id}'", self.tutorial_id);
        self.emit(TutorialEvent::Started {
            tutorial_id: self.tutorial_id.clone(),
            step_id,
        });
        runtime.spawn(this.run(token, index));
        true
    }

    // ===== 执行 =====

    fn is_current(&self, token: GenerationToken) -> bool {
        lock(&self.state).generation.is_current(token)
    }

    fn emit(&self, event: TutorialEvent) {
        // 没有订阅者时发送失败是正常情况
        let _ = self.events.send(event);
    }

    async fn run(self: Arc<Self>, token: GenerationToken, mut index: usize) {
        loop {
            let outcome = self.run_step(token, index).await;
            let is_last = index + 1 >= self.steps.len();
            match outcome {
                StepOutcome::Stale => return,
                StepOutcome::Ended => {
                    self.finish(token, false);
                    return;
                }
                StepOutcome::Completed | StepOutcome::Skipped => {
                    let single_step = lock(&self.state).single_step;
                    if single_step || is_last {
                        self.finish(token, outcome == StepOutcome::Completed && is_last);
                        return;
                    }
                    index += 1;
                    let mut state = lock(&self.state);
                    if !state.generation.is_current(token) {
                        return;
                    }
                    state.index = Some(index);
                }
            }
        }
    }

    async fn run_step(&self, token: GenerationToken, index: usize) -> StepOutcome {
        let Some(step) = self.steps.get(index) else {
            return StepOutcome::Ended;
        };

        if !step.delay.is_zero() {
            tokio::time::sleep(step.delay).await;
            if !self.is_current(token) {
                return StepOutcome::Stale;
            }
        }

        let Some(anchor) = self
            .anchors
            .get(&step.anchor_id)
            .filter(|anchor| anchor.is_mounted())
        else {
            log::warn!(
                "Tutorial '{}' step '{}' skipped: anchor '{}' is missing or unmounted",
                self.tutorial_id,
                step.step_id,
                step.anchor_id
            );
            self.emit(TutorialEvent::StepSkipped {
                step_id: step.step_id.clone(),
            });
            return StepOutcome::Skipped;
        };

        let target = anchor.rect();
        self.highlighter.show(target);

        let modal_id = format!("tutorial:{}:{}", self.tutorial_id, step.step_id);
        let mut request = step.modal.clone();
        request.correlation_id = Some(modal_id.clone());
        if request.placement == PlacementMode::Center {
            request.placement = PlacementMode::NearTarget {
                target: self.highlighter.hole().unwrap_or(target),
                side: None,
            };
        }
        let activation = if step.dismiss_on_anchor_action {
            anchor.subscribe_activation()
        } else {
            None
        };

        {
            let mut state = lock(&self.state);
            if !state.generation.is_current(token) {
                return StepOutcome::Stale;
            }
            state.modal_id = Some(modal_id.clone());
        }
        let mut handle = self.queue.show(request);
        self.audio.play(AudioCue::TutorialStep);
        self.emit(TutorialEvent::StepShown {
            step_id: step.step_id.clone(),
        });

        let result = match activation {
            Some(mut activated) => {
                tokio::select! {
                    result = &mut handle => result,
                    Ok(()) = activated.recv() => {
                        if self.is_current(token) {
                            self.queue.dismiss_by_id(&modal_id, ModalResult::Confirmed);
                        }
                        ModalResult::Confirmed
                    }
                }
            }
            None => handle.await,
        };

        {
            let mut state = lock(&self.state);
            if !state.generation.is_current(token) {
                return StepOutcome::Stale;
            }
            state.modal_id = None;
        }
        self.highlighter.hide();

        if result != ModalResult::Confirmed {
            log::info!(
                "Tutorial '{}' stopped at '{}': {result:?}",
                self.tutorial_id,
                step.step_id
            );
            return StepOutcome::Ended;
        }

        self.emit(TutorialEvent::StepCompleted {
            step_id: step.step_id.clone(),
        });
        if let Some(progress) = &self.progress {
            if let Err(e) = progress
                .mark_step_done(&self.tutorial_id, &step.step_id)
                .await
            {
                log::error!(
                    "Failed to persist tutorial progress for '{}': {e}",
                    self.tutorial_id
                );
            }
        }
        StepOutcome::Completed
    }

    fn finish(&self, token: GenerationToken, completed: bool) {
        {
            let mut state = lock(&self.state);
            if !state.generation.is_current(token) {
                return;
            }
            state.index = None;
            state.modal_id = None;
        }
        self.highlighter.hide();
        log::info!(
            "Tutorial '{}' finished (completed: {completed})",
            self.tutorial_id
        );
        self.emit(TutorialEvent::Ended { completed });
    }
}
