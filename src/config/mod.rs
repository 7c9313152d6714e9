// ==========================================
// 施工现场日报系统 - 配置层
// ==========================================
// 职责: 系统配置管理
// 存储: config_kv 表（报表行数另存 report_row_limit 表）
// ==========================================

pub mod config_manager;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager, WeatherSettings, DEFAULT_WEATHER_BASE_URL};
