// ==========================================
// 施工现场日报系统 - 引擎层
// ==========================================
// 职责: 复合键、期间聚合、行数预算、预报解析、报表组装
// 红线: Engine 不拼 SQL，数据一律经由 Repository 注入
// ==========================================

pub mod composite_key;
pub mod forecast_decode;
pub mod forecast_window;
pub mod period_aggregator;
pub mod report_assembler;
pub mod row_budget;

// 重导出核心引擎
pub use composite_key::{compare_catalog_entries, spec_sort_value, CompositeKey};
pub use forecast_decode::{ForecastItem, ForecastSummary};
pub use forecast_window::{issuance_window, kst_date, kst_now, ForecastWindow};
pub use period_aggregator::{personnel_totals, PeriodAggregator, PeriodError, PeriodWindow};
pub use report_assembler::{overflow_notice, ReportAssembler};
pub use row_budget::apply_budget;
