//! 音频/通知钩子

use crate::types::{ModalResult, TransitionKind};

/// 可触发的提示音
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCue {
    Transition(TransitionKind),
    ModalShown,
    ModalResolved(ModalResult),
    TutorialStep,
}

/// 音频钩子 Trait
///
/// 即发即忘，核心从不等待播放结果。
pub trait AudioSink: Send + Sync {
    fn play(&self, cue: AudioCue);
}

/// 静音实现
pub struct NoopAudioSink;

impl AudioSink for NoopAudioSink {
    fn play(&self, _cue: AudioCue) {}
}
