//! 弹窗向导
//!
//! 把一组请求串成向导：确认前进，关闭后退（允许且不在第一步时），其余结果中止。

use std::sync::Arc;

use crate::services::ModalQueue;
use crate::types::{ModalRequest, ModalResult};

/// 向导结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceOutcome {
    Completed,
    /// 在第 `index` 步以 `result` 中止
    Aborted { index: usize, result: ModalResult },
}

/// 弹窗向导
pub struct ModalSequence {
    queue: Arc<ModalQueue>,
    requests: Vec<ModalRequest>,
    allow_back: bool,
}

impl ModalSequence {
    pub fn new(queue: Arc<ModalQueue>, requests: Vec<ModalRequest>) -> Self {
        Self {
            queue,
            requests,
            allow_back: false,
        }
    }

    #[must_use]
    pub fn allow_back(mut self, allow: bool) -> Self {
        self.allow_back = allow;
        self
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub async fn run(&self) -> SequenceOutcome {
        let mut index = 0;
        while let Some(request) = self.requests.get(index) {
            let result = self.queue.show_async(request.clone()).await;
            match result {
                ModalResult::Confirmed => index += 1,
                ModalResult::Closed if self.allow_back && index > 0 => index -= 1,
                other => {
                    log::debug!("Modal sequence aborted at step {index}: {other:?}");
                    return SequenceOutcome::Aborted {
                        index,
                        result: other,
                    };
                }
            }
        }
        SequenceOutcome::Completed
    }
}
