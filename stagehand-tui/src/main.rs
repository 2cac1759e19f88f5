//! Stagehand TUI
//!
//! 在终端里驱动 Stagehand 编排核心的演示宿主：导航栈、弹窗队列、向导和新手教程。
//!
//! ## 架构
//!
//! 采用 Elm Architecture (TEA) 模式：
//! - **Model**: 应用状态 (`model/`)
//! - **Message**: 事件消息 (`message/`)
//! - **Update**: 状态更新 (`update/`)
//! - **View**: 场景图渲染 (`view/`)
//! - **Event**: 输入处理 (`event/`)
//! - **Backend**: 舞台与场景 (`backend/`)
//!
//!
//! main.rs 的执行顺序：
//!
//!     AppPaths::resolve()       // 配置、进度与日志文件路径
//!     logging::init()           // 日志写入文件（终端被 TUI 占用）
//!     load_config()             // 缺失的配置文件使用默认值
//!     tokio runtime + enter     // 弹窗队列与教程在后台任务中推进
//!     init_terminal()
//!     app::run()                // 主循环
//!     restore_terminal()        // 无论成功与否，都恢复终端

mod app;
mod backend;
mod event;
mod message;
mod model;
mod update;
mod util;
mod view;

use std::sync::Arc;

use anyhow::Result;
use stagehand_app::adapters::JsonFileStore;
use stagehand_app::load_config;

use backend::{AppPaths, StageBackend};
use util::{init_terminal, restore_terminal};

fn main() -> Result<()> {
    // 1. 路径与日志
    let paths = AppPaths::resolve();
    backend::logging::init(&paths.log_file)?;

    // 2. 配置
    let config = load_config(&paths.config_file)?;

    // 3. 异步运行时（主循环保持同步，后台任务在工作线程上执行）
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()?;
    let _guard = runtime.enter();

    // 4. 舞台
    let store = Arc::new(JsonFileStore::new(&paths.progress_file));
    let backend = StageBackend::new(config, store)?;

    // 5. 终端与主循环
    let mut terminal = init_terminal()?;
    let mut app = model::App::new(backend);
    let result = app::run(&mut terminal, &mut app);

    // 6. 恢复终端（无论成功失败都执行）
    restore_terminal(&mut terminal)?;

    log::info!("Stagehand TUI exited");
    result
}
