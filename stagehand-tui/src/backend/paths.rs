//! 文件路径

use std::path::PathBuf;

/// 应用目录名
const APP_DIR: &str = "stagehand-tui";

/// 覆盖配置文件路径的环境变量
pub const CONFIG_ENV: &str = "STAGEHAND_CONFIG";

/// 应用使用的文件路径
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// 舞台配置（JSON，可缺失）
    pub config_file: PathBuf,
    /// 教程进度
    pub progress_file: PathBuf,
    /// 日志文件
    pub log_file: PathBuf,
}

impl AppPaths {
    /// 配置放在配置目录，进度与日志放在数据目录
    pub fn resolve() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR);
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR);

        let config_file = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| config_dir.join("config.json"));

        Self {
            config_file,
            progress_file: data_dir.join("progress.json"),
            log_file: data_dir.join("stagehand-tui.log"),
        }
    }
}
