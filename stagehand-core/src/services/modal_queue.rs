//! 弹窗队列
//!
//! 调用方随时入队，单个后台泵按 FIFO 顺序把请求交给展示器，
//! 等上一个结果出来后才出队下一个，因此对话框永不重叠。

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, Weak};

use tokio::runtime::Handle;
use tokio::sync::oneshot;

use crate::services::{ModalHandle, ModalPresenter};
use crate::types::{ModalRequest, ModalResult};
use crate::utils::lock;

struct QueuedModal {
    id: String,
    request: ModalRequest,
    sender: oneshot::Sender<ModalResult>,
}

#[derive(Default)]
struct QueueState {
    pending: VecDeque<QueuedModal>,
    pumping: bool,
}

/// 弹窗队列
pub struct ModalQueue {
    presenter: Arc<ModalPresenter>,
    state: Mutex<QueueState>,
    this: Weak<ModalQueue>,
}

impl ModalQueue {
    pub fn new(presenter: Arc<ModalPresenter>) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            presenter,
            state: Mutex::new(QueueState::default()),
            this: this.clone(),
        })
    }

    pub fn presenter(&self) -> &Arc<ModalPresenter> {
        &self.presenter
    }

    /// 入队并立即返回结果句柄
    ///
    /// 泵在首次入队时 spawn 到当前 tokio 运行时；不在运行时内时记录错误，
    /// 排队中的请求全部以 `ModalResult::None` 解析。
    pub fn show(&self, mut request: ModalRequest) -> ModalHandle {
        let id = request.ensure_id();
        let (sender, rx) = oneshot::channel();
        let start_pump = {
            let mut state = lock(&self.state);
            state.pending.push_back(QueuedModal {
                id: id.clone(),
                request,
                sender,
            });
            !std::mem::replace(&mut state.pumping, true)
        };
        log::debug!("Modal '{id}' queued");

        if start_pump {
            match Handle::try_current() {
                Ok(runtime) => {
                    if let Some(queue) = self.this.upgrade() {
                        runtime.spawn(queue.pump());
                    }
                }
                Err(e) => {
                    log::error!("Modal '{id}' cannot be shown outside a tokio runtime: {e}");
                    self.abandon_pending();
                }
            }
        }
        ModalHandle::new(id, rx)
    }

    /// 没有泵可用：停止泵标记，排队请求以 `None` 解析
    fn abandon_pending(&self) {
        let drained: Vec<QueuedModal> = {
            let mut state = lock(&self.state);
            state.pumping = false;
            state.pending.drain(..).collect()
        };
        for queued in drained {
            let _ = queued.sender.send(ModalResult::None);
        }
    }

    /// 入队并等待结果
    pub async fn show_async(&self, request: ModalRequest) -> ModalResult {
        self.show(request).await
    }

    async fn pump(self: Arc<Self>) {
        loop {
            let next = {
                let mut state = lock(&self.state);
                let next = state.pending.pop_front();
                if next.is_none() {
                    state.pumping = false;
                }
                next
            };
            let Some(QueuedModal {
                id,
                request,
                sender,
            }) = next
            else {
                return;
            };

            let result = self.presenter.present(request).await;
            if sender.send(result).is_err() {
                log::debug!("Modal '{id}' resolved after its caller stopped waiting");
            }
        }
    }

    /// 关闭当前显示的弹窗（`DismissedBackground`）
    pub fn dismiss_active(&self) -> bool {
        self.presenter.dismiss_active()
    }

    /// 按关联 id 关闭：仍在排队的请求直接出队并以 `result` 解析，
    /// 正在显示的转交给展示器
    pub fn dismiss_by_id(&self, id: &str, result: ModalResult) -> bool {
        let queued = {
            let mut state = lock(&self.state);
            state
                .pending
                .iter()
                .position(|q| q.id == id)
                .and_then(|index| state.pending.remove(index))
        };
        match queued {
            Some(queued) => {
                log::debug!("Queued modal '{id}' removed: {result:?}");
                let _ = queued.sender.send(result);
                true
            }
            None => self.presenter.dismiss_by_id(id, result),
        }
    }

    /// 清空队列并关闭当前弹窗，所有请求以 `DismissedBackground` 解析
    pub fn clear(&self) {
        let drained: Vec<QueuedModal> = lock(&self.state).pending.drain(..).collect();
        for queued in drained {
            let _ = queued.sender.send(ModalResult::DismissedBackground);
        }
        self.presenter.dismiss_active();
    }

    /// 排队中（尚未显示）的关联 id
    pub fn pending_ids(&self) -> Vec<String> {
        lock(&self.state)
            .pending
            .iter()
            .map(|q| q.id.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        lock(&self.state).pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 泵已停止且没有弹窗在显示
    pub fn is_idle(&self) -> bool {
        !lock(&self.state).pumping && !self.presenter.is_showing()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use super::*;
    use crate::test_utils::{create_test_context, settle, test_viewport, MockLoader};

    fn queue() -> (Arc<ModalQueue>, Arc<MockLoader>) {
        let (ctx, loader, _animator, _audio) = create_test_context();
        let presenter = ModalPresenter::new(ctx, test_viewport());
        (ModalQueue::new(presenter), loader)
    }

    fn confirm_current(loader: &MockLoader) {
        loader
            .last_instance("dialog")
            .unwrap()
            .find("ConfirmButton")
            .unwrap()
            .click();
    }

    #[test]
    fn test_show_outside_runtime_resolves_none() {
        let (queue, loader) = queue();
        let mut handle = queue.show(ModalRequest::new("t", "b"));
        assert_eq!(handle.try_result(), Some(ModalResult::None));
        assert!(queue.is_idle());
        assert!(queue.is_empty());
        assert_eq!(loader.instance_count("dialog"), 0);
    }

    #[tokio::test]
    async fn test_fifo_resolution_order() {
        let (queue, loader) = queue();
        let order = Arc::new(StdMutex::new(Vec::new()));

        let mut tasks = Vec::new();
        for name in ["A", "B", "C"] {
            let handle = queue.show(ModalRequest::new(name, "").with_id(name));
            let order = Arc::clone(&order);
            tasks.push(tokio::spawn(async move {
                let result = handle.await;
                order.lock().unwrap().push(name);
                result
            }));
        }
        // 调用方以相反顺序等待
        tasks.reverse();

        for expected in ["A", "B", "C"] {
            settle().await;
            assert_eq!(queue.presenter().active_id().as_deref(), Some(expected));
            confirm_current(&loader);
        }
        for task in tasks {
            assert_eq!(task.await.unwrap(), ModalResult::Confirmed);
        }
        assert_eq!(*order.lock().unwrap(), vec!["A", "B", "C"]);
        settle().await;
        assert!(queue.is_idle());
    }

    #[tokio::test]
    async fn test_dismiss_queued_by_id_keeps_neighbours() {
        let (queue, loader) = queue();
        let a = queue.show(ModalRequest::new("A", "").with_id("A"));
        let b = queue.show(ModalRequest::new("B", "").with_id("B"));
        let c = queue.show(ModalRequest::new("C", "").with_id("C"));
        settle().await;

        assert_eq!(queue.pending_ids(), vec!["B".to_string(), "C".to_string()]);
        assert!(queue.dismiss_by_id("B", ModalResult::DismissedBackground));
        assert_eq!(b.await, ModalResult::DismissedBackground);
        assert_eq!(queue.pending_ids(), vec!["C".to_string()]);

        confirm_current(&loader);
        assert_eq!(a.await, ModalResult::Confirmed);
        settle().await;
        assert_eq!(queue.presenter().active_id().as_deref(), Some("C"));
        assert!(queue.dismiss_by_id("C", ModalResult::Closed));
        assert_eq!(c.await, ModalResult::Closed);
    }

    #[tokio::test]
    async fn test_clear_resolves_everything() {
        let (queue, _loader) = queue();
        let a = queue.show(ModalRequest::new("A", ""));
        let b = queue.show(ModalRequest::new("B", ""));
        settle().await;
        queue.clear();
        assert_eq!(a.await, ModalResult::DismissedBackground);
        assert_eq!(b.await, ModalResult::DismissedBackground);
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn test_pump_restarts_after_idle() {
        let (queue, loader) = queue();
        let first = queue.show(ModalRequest::new("A", ""));
        settle().await;
        confirm_current(&loader);
        assert_eq!(first.await, ModalResult::Confirmed);
        settle().await;
        assert!(queue.is_idle());

        let second = queue.show(ModalRequest::new("B", ""));
        settle().await;
        assert!(queue.presenter().is_showing());
        queue.dismiss_active();
        assert_eq!(second.await, ModalResult::DismissedBackground);
    }
}
