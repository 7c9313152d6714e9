// ==========================================
// 施工现场日报系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite + 기상청 단기예보 API
// 系统定位: 每日汇总（前日 / 当日 / 累计）与固定格式打印
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "ko");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 聚合与组装
pub mod engine;

// 气象层 - 短期预报同步
pub mod weather;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// 应用层 - 组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{Quantity, ReportPage, WeatherCondition};

// 领域实体
pub use domain::{
    AssembledReport, Company, EquipmentCatalogItem, MaterialCatalogItem, SiteWeather,
    WeatherSnapshot, WorkRecord,
};

// 引擎
pub use engine::{PeriodAggregator, PeriodWindow, ReportAssembler};

// API
pub use api::{ApiError, EntryApi, ReportApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "施工现场日报系统";
