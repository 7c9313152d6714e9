// ==========================================
// 施工现场日报系统 - 报表结构
// ==========================================
// 职责: 聚合结果与各打印页面的数据形状
// 红线: 只描述数据，不含计算逻辑
// ==========================================

use crate::domain::activity::{UsedEquipment, WorkLogEntry, WorkRecord};
use crate::domain::catalog::{Company, EquipmentCatalogItem, MaterialCatalogItem};
use crate::domain::types::{Quantity, ReportPage};
use crate::domain::weather::{SiteWeather, WeatherDisplay};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// 聚合结果
// ==========================================

/// 前日 / 当日 / 累计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodFigures<V> {
    pub previous: V,
    pub current: V,
    pub cumulative: V,
}

/// 单个目录项的聚合行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRow<C, V> {
    pub item: C,
    pub figures: PeriodFigures<V>,
}

pub type PersonnelAggregate = AggregateRow<Company, i64>;
pub type MaterialAggregate = AggregateRow<MaterialCatalogItem, Quantity>;
pub type EquipmentAggregate = AggregateRow<EquipmentCatalogItem, i64>;

/// 固定行数的打印网格
///
/// `slots.len() == max_rows`，前 `populated` 个有数据，其余为空行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetedRows<T> {
    pub max_rows: u32,
    pub populated: usize,
    /// 超出行数预算而被截断的行数
    pub overflow: usize,
    pub slots: Vec<Option<T>>,
}

impl<T> BudgetedRows<T> {
    pub fn is_truncated(&self) -> bool {
        self.overflow > 0
    }

    /// 已填充的行
    pub fn rows(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().flatten()
    }

    pub fn blank_rows(&self) -> usize {
        self.slots.len() - self.populated
    }
}

/// 出勤人数合计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonnelTotals {
    pub previous: i64,
    pub current: i64,
    pub cumulative: i64,
}

// ==========================================
// 页面
// ==========================================

/// 所有页面共用的表头
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportHeader {
    pub site_name: String,
    pub date: NaiveDate,
    pub previous_date: NaiveDate,
    pub weather: SiteWeather,
    pub weather_display: WeatherDisplay,
}

/// 出勤现况（人员 / 材料 / 装备）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManpowerFinalPaper {
    pub header: ReportHeader,
    pub personnel: BudgetedRows<PersonnelAggregate>,
    pub materials: BudgetedRows<MaterialAggregate>,
    pub equipments: BudgetedRows<EquipmentAggregate>,
    pub totals: PersonnelTotals,
}

/// 作业现况（当日 / 前日作业内容）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkStatusFinalPaper {
    pub header: ReportHeader,
    pub today_log: BudgetedRows<WorkLogEntry>,
    pub previous_log: BudgetedRows<WorkLogEntry>,
}

/// 单页合并版
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedFinalPaper {
    pub header: ReportHeader,
    pub personnel: BudgetedRows<PersonnelAggregate>,
    pub materials: BudgetedRows<MaterialAggregate>,
    pub equipments: BudgetedRows<EquipmentAggregate>,
    pub totals: PersonnelTotals,
    pub today_log: BudgetedRows<WorkLogEntry>,
    pub previous_log: BudgetedRows<WorkLogEntry>,
}

/// 简版作业现况（仅当日，无天气）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkStatusBrief {
    pub site_name: String,
    pub date: NaiveDate,
    pub today_log: BudgetedRows<WorkLogEntry>,
}

/// 按页面名分派后的结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "page", content = "report")]
pub enum AssembledReport {
    ManpowerFinalPaper(ManpowerFinalPaper),
    WorkStatusFinalPaper(WorkStatusFinalPaper),
    CombinedFinalPaper(CombinedFinalPaper),
    WorkStatusForSmaty(WorkStatusBrief),
}

impl AssembledReport {
    pub fn page(&self) -> ReportPage {
        match self {
            AssembledReport::ManpowerFinalPaper(_) => ReportPage::ManpowerFinalPaper,
            AssembledReport::WorkStatusFinalPaper(_) => ReportPage::WorkStatusFinalPaper,
            AssembledReport::CombinedFinalPaper(_) => ReportPage::CombinedFinalPaper,
            AssembledReport::WorkStatusForSmaty(_) => ReportPage::WorkStatusForSmaty,
        }
    }
}

// ==========================================
// 录入现况
// ==========================================

/// 已录入业者
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WrittenEntry {
    pub company: Company,
    pub record: WorkRecord,
    pub equipments: Vec<UsedEquipment>,
}

/// 某日的录入现况（仅未完成业者）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryStatus {
    pub date: NaiveDate,
    pub written: Vec<WrittenEntry>,
    pub pending: Vec<Company>,
}
