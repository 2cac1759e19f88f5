//! 弹窗展示器
//!
//! 在覆盖层导航栈上一次只显示一个对话框。每个请求的结果恰好产生一次：
//! 按钮点击、被新请求抢占、按 id 外部关闭以及实例化失败都会解析对应的 `ModalHandle`。

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, Weak};
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use crate::services::{place, NavigationStack, StageContext, ViewController};
use crate::traits::{AudioCue, NodeHandle};
use crate::types::{ButtonSpec, ModalRequest, ModalResult};
use crate::utils::lock;

/// 弹窗结果句柄
///
/// 作为 future 等待结果；发送端被丢弃时得到 `ModalResult::None`。
#[derive(Debug)]
pub struct ModalHandle {
    correlation_id: String,
    rx: oneshot::Receiver<ModalResult>,
}

impl ModalHandle {
    pub(crate) fn new(correlation_id: String, rx: oneshot::Receiver<ModalResult>) -> Self {
        Self { correlation_id, rx }
    }

    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    /// 非阻塞地取结果；尚未解析时返回 `None`
    pub fn try_result(&mut self) -> Option<ModalResult> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(ModalResult::None),
        }
    }
}

impl Future for ModalHandle {
    type Output = ModalResult;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.get_mut().rx)
            .poll(cx)
            .map(|r| r.unwrap_or_default())
    }
}

/// 正在显示的弹窗
struct PendingModal {
    id: String,
    request: ModalRequest,
    sender: oneshot::Sender<ModalResult>,
    controller: Arc<ViewController>,
}

/// 弹窗展示器
pub struct ModalPresenter {
    ctx: Arc<StageContext>,
    overlay: Arc<NavigationStack>,
    active: Mutex<Option<PendingModal>>,
    this: Weak<ModalPresenter>,
}

impl ModalPresenter {
    /// 在 `viewport` 上创建覆盖层并返回展示器
    pub fn new(ctx: Arc<StageContext>, viewport: NodeHandle) -> Arc<Self> {
        let overlay = NavigationStack::new("overlay", Arc::clone(&ctx), viewport);
        Arc::new_cyclic(|this| Self {
            ctx,
            overlay,
            active: Mutex::new(None),
            this: this.clone(),
        })
    }

    pub fn overlay(&self) -> &Arc<NavigationStack> {
        &self.overlay
    }

    pub fn is_showing(&self) -> bool {
        lock(&self.active).is_some()
    }

    pub fn active_id(&self) -> Option<String> {
        lock(&self.active).as_ref().map(|p| p.id.clone())
    }

    pub fn active_controller(&self) -> Option<Arc<ViewController>> {
        lock(&self.active).as_ref().map(|p| Arc::clone(&p.controller))
    }

    /// 显示弹窗
    ///
    /// 已有弹窗时先以 `DismissedBackground` 结束它。
    pub fn present(&self, mut request: ModalRequest) -> ModalHandle {
        let id = request.ensure_id();
        let (sender, rx) = oneshot::channel();
        let handle = ModalHandle::new(id.clone(), rx);

        if let Some(previous) = self.active_id() {
            log::debug!("Modal '{previous}' preempted by '{id}'");
            self.resolve_active(ModalResult::DismissedBackground);
        }

        let config = &self.ctx.config.modal;
        let template = request
            .template
            .clone()
            .unwrap_or_else(|| config.dialog_template.clone());
        let root = match self.ctx.loader.instantiate(&template, self.overlay.viewport()) {
            Ok(root) => root,
            Err(e) => {
                if e.is_expected() {
                    log::warn!("Modal '{id}' could not be shown: {e}");
                } else {
                    log::error!("Modal '{id}' could not be shown: {e}");
                }
                let _ = sender.send(ModalResult::None);
                return handle;
            }
        };

        let controller = ViewController::with_root(format!("modal:{id}"), Arc::clone(&root));
        self.populate(&controller, &request);
        self.wire(&controller, &id, &request);

        let placement = place(
            self.overlay.viewport().rect(),
            root.rect().size(),
            &request.placement,
            self.ctx.config.placement,
        );
        root.set_pivot(placement.pivot);
        root.set_position(placement.rect.origin());
        controller.set_rest_position(placement.rect.origin());

        let kind = request.show_transition.unwrap_or(config.show_transition);
        *lock(&self.active) = Some(PendingModal {
            id: id.clone(),
            request,
            sender,
            controller: Arc::clone(&controller),
        });
        log::debug!("Modal '{id}' shown");
        self.ctx.audio.play(AudioCue::ModalShown);
        self.overlay.present_popup(controller, kind, None);
        handle
    }

    /// 写入标题、正文、图标与按钮文字，隐藏未启用的元素
    fn populate(&self, controller: &ViewController, request: &ModalRequest) {
        let names = &self.ctx.config.modal.elements;

        if let Some(title) = controller.text(&names.title) {
            title.set_text(&request.title);
        }
        if let Some(body) = controller.text(&names.body) {
            body.set_text(&request.body);
        }
        if let Some(icon) = controller.image(&names.icon) {
            match &request.icon {
                Some(image) => {
                    icon.set_image(image);
                    icon.set_active(true);
                }
                None => icon.set_active(false),
            }
        }

        for (button, label, spec) in [
            (&names.confirm_button, &names.confirm_label, &request.confirm),
            (&names.close_button, &names.close_label, &request.close),
        ] {
            apply_button(controller, button, label, spec);
        }

        if let Some(background) = controller.button(&names.background) {
            background.set_active(request.dim_background);
        }
    }

    /// 按钮点击 → 以对应结果结束本请求（仅当它仍是当前弹窗）
    fn wire(&self, controller: &ViewController, id: &str, request: &ModalRequest) {
        let names = &self.ctx.config.modal.elements;
        let mut bindings = Vec::new();
        if request.confirm.visible {
            bindings.push((&names.confirm_button, ModalResult::Confirmed));
        }
        if request.close.visible {
            bindings.push((&names.close_button, ModalResult::Closed));
        }
        if request.close_on_background {
            bindings.push((&names.background, ModalResult::DismissedBackground));
        }

        for (name, result) in bindings {
            let Some(button) = controller.button(name) else {
                continue;
            };
            let presenter = self.this.clone();
            let id = id.to_string();
            button.add_click_listener(Arc::new(move || {
                if let Some(presenter) = presenter.upgrade() {
                    presenter.dismiss_by_id(&id, result);
                }
            }));
        }
    }

    /// 以 `result` 结束当前弹窗
    pub fn resolve_active(&self, result: ModalResult) -> bool {
        let Some(pending) = lock(&self.active).take() else {
            return false;
        };
        self.finish(pending, result);
        true
    }

    /// 外部关闭当前弹窗（结果为 `DismissedBackground`）
    pub fn dismiss_active(&self) -> bool {
        self.resolve_active(ModalResult::DismissedBackground)
    }

    /// 仅当当前弹窗的关联 id 为 `id` 时以 `result` 结束它
    pub fn dismiss_by_id(&self, id: &str, result: ModalResult) -> bool {
        let pending = {
            let mut active = lock(&self.active);
            if !active.as_ref().is_some_and(|p| p.id == id) {
                return false;
            }
            active.take()
        };
        match pending {
            Some(pending) => {
                self.finish(pending, result);
                true
            }
            None => false,
        }
    }

    fn finish(&self, pending: PendingModal, result: ModalResult) {
        let PendingModal {
            id,
            request,
            sender,
            controller,
        } = pending;
        log::debug!("Modal '{id}' resolved: {result:?}");

        // 先摘掉按钮监听，避免重复点击
        for button in controller.buttons() {
            button.clear_click_listeners();
        }

        let kind = request
            .hide_transition
            .unwrap_or(self.ctx.config.modal.hide_transition);
        let on_top = self
            .overlay
            .top_popup()
            .is_some_and(|top| Arc::ptr_eq(&top, &controller));
        if on_top {
            self.overlay.dismiss_popup(kind, true, None);
        } else if let Some(root) = controller.root() {
            log::warn!("Modal '{id}' is not the top popup; destroying without transition");
            root.destroy();
        }
        controller.cleanup();

        self.ctx.audio.play(AudioCue::ModalResolved(result));
        let _ = sender.send(result);
    }
}

fn apply_button(controller: &ViewController, button: &str, label: &str, spec: &ButtonSpec) {
    if let Some(node) = controller.button(button) {
        node.set_active(spec.visible);
    }
    if let (true, Some(text)) = (spec.visible, spec.label.as_deref()) {
        if let Some(label) = controller.text(label) {
            label.set_text(text);
        }
    }
}
