// ==========================================
// 施工现场日报系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod activity_repo;
pub mod catalog_repo;
pub mod error;
pub mod report_source;
pub mod row_limit_repo;
pub mod weather_repo;

// 重导出核心仓储
pub use activity_repo::ActivityRepository;
pub use catalog_repo::CatalogRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use report_source::{
    ReportDataset, ReportSource, RowLimitStore, SqliteReportSource, WeatherStore,
};
pub use row_limit_repo::RowLimitRepository;
pub use weather_repo::WeatherRepository;
