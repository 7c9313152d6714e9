// ==========================================
// 施工现场日报系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、报表结构
// 红线: 不含数据访问逻辑,不含聚合逻辑
// ==========================================

pub mod activity;
pub mod catalog;
pub mod report;
pub mod types;
pub mod weather;

// 重导出核心类型
pub use activity::{
    CompanyEntry, EquipmentLine, EquipmentUsageRow, MaterialLine, MaterialUsageRow, PersonnelRow,
    UsedEquipment, WorkLogEntry, WorkRecord,
};
pub use catalog::{Company, EquipmentCatalogItem, MaterialCatalogItem, Site};
pub use report::{
    AggregateRow, AssembledReport, BudgetedRows, CombinedFinalPaper, EntryStatus,
    EquipmentAggregate, ManpowerFinalPaper, MaterialAggregate, PeriodFigures,
    PersonnelAggregate, PersonnelTotals, ReportHeader, WorkStatusBrief, WorkStatusFinalPaper,
    WrittenEntry,
};
pub use types::{Quantity, ReportPage, WeatherCondition};
pub use weather::{SiteWeather, WeatherDisplay, WeatherSnapshot};
