//! src/backend/mod.rs
//! Backend 层：舞台与场景
//!
//! Backend 层持有 Stagehand 的 `Stage`、终端场景图和帧驱动播放器，
//! 向 UI 层暴露"打开页面 / 弹窗 / 向导 / 教程"这些操作。
//!
//!
//! 有模块结构：
//!     src/backend/mod.rs
//!         mod paths;              // 配置、进度与日志文件路径
//!         pub mod logging;        // tracing 日志初始化（写入文件）
//!         mod screens;            // 演示页面模板
//!         mod tour;               // 教程步骤、向导与提示弹窗内容
//!         mod stage_backend;      // StageBackend
//!
//!
//! ═══════════════════════════════════════════════════════════════════════════
//! 场景图
//! ═══════════════════════════════════════════════════════════════════════════
//!
//!     Viewport (Container, 终端尺寸减去状态栏)
//!       ├── Home      ← 主导航栈的页面根节点
//!       ├── Gallery
//!       └── Settings
//!     Overlay  (Container, 与 Viewport 同尺寸)
//!       ├── Highlight ← 教程高亮
//!       └── Dialog    ← 弹窗（覆盖层导航栈上的弹出层）
//!
//!     覆盖层与视口分开，弹窗显示时主栈上的按钮（教程锚点）仍然可以点击。
//!
//!
//! ═══════════════════════════════════════════════════════════════════════════
//! 线程
//! ═══════════════════════════════════════════════════════════════════════════
//!
//!     主循环线程：渲染、按键、TickAnimator::tick（动画完成回调在此执行）
//!     tokio 工作线程：ModalQueue 泵、ModalSequence、教程推进、进度读写
//!
//!     按钮回调与后台任务只通过 mpsc 通道把 AppMessage 发回主循环。

pub mod logging;
mod paths;
mod screens;
mod stage_backend;
mod tour;

pub use paths::AppPaths;
pub use stage_backend::{button_label, StageBackend};
