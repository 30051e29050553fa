// ==========================================
// Trường Tồn 农场看板 - 配置层
// ==========================================
// 职责: 启动配置（环境变量）与运行期参数（config_kv 表）
// ==========================================

pub mod app_config;
pub mod config_manager;

// 重导出核心配置
pub use app_config::{default_db_path, AppConfig};
pub use config_manager::{config_keys, ConfigManager, DashboardSettings};
