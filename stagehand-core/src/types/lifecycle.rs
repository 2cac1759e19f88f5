//! 视图控制器生命周期状态机

/// 生命周期状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    /// 尚未挂载视觉根节点
    #[default]
    Unloaded,
    /// 已加载，从未显示
    Loaded,
    Appearing,
    Appeared,
    Disappearing,
    Disappeared,
}

/// 生命周期事件（状态机的边）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    DidLoad,
    WillAppear,
    DidAppear,
    WillDisappear,
    DidDisappear,
}

impl LifecycleState {
    /// 计算事件触发后的下一个状态；非法边返回 `None`
    ///
    /// ```text
    /// Unloaded --DidLoad--> Loaded
    /// Loaded | Disappearing | Disappeared --WillAppear--> Appearing
    /// Appearing --DidAppear--> Appeared
    /// Appearing | Appeared --WillDisappear--> Disappearing
    /// Disappearing --DidDisappear--> Disappeared
    /// ```
    pub fn next(self, event: LifecycleEvent) -> Option<Self> {
        use LifecycleEvent as E;
        use LifecycleState as S;

        match (self, event) {
            (S::Unloaded, E::DidLoad) => Some(S::Loaded),
            (S::Loaded | S::Disappearing | S::Disappeared, E::WillAppear) => Some(S::Appearing),
            (S::Appearing, E::DidAppear) => Some(S::Appeared),
            (S::Appearing | S::Appeared, E::WillDisappear) => Some(S::Disappearing),
            (S::Disappearing, E::DidDisappear) => Some(S::Disappeared),
            _ => None,
        }
    }

    /// 是否处于“可见/正在显示”的一侧
    pub fn is_visible(self) -> bool {
        matches!(self, Self::Appearing | Self::Appeared)
    }
}
