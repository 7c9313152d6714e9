// ==========================================
// 施工现场日报系统 - 报表数据源
// ==========================================
// 职责: 一次报表请求所需的目录与事务数据，在同一读事务内读取
// 目的: 三个领域的数据来自同一快照，避免并发写入造成撕裂读
// ==========================================

use crate::domain::activity::{EquipmentUsageRow, MaterialUsageRow, PersonnelRow, WorkLogEntry};
use crate::domain::catalog::{Company, EquipmentCatalogItem, MaterialCatalogItem, Site};
use crate::domain::types::ReportPage;
use crate::domain::weather::WeatherSnapshot;
use crate::engine::period_aggregator::PeriodWindow;
use crate::repository::activity_repo::{
    query_equipment_usage_until, query_material_usage_until, query_personnel_until,
    query_work_log_on,
};
use crate::repository::catalog_repo::{
    query_companies, query_equipments, query_first_site, query_materials,
};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_limit_repo::RowLimitRepository;
use crate::repository::weather_repo::WeatherRepository;
use chrono::NaiveDate;
use rusqlite::Connection;
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// 数据集
// ==========================================

/// 报表请求的原始数据
#[derive(Debug, Clone, Default)]
pub struct ReportDataset {
    pub site: Option<Site>,
    pub companies: Vec<Company>,
    pub materials: Vec<MaterialCatalogItem>,
    pub equipments: Vec<EquipmentCatalogItem>,
    pub personnel: Vec<PersonnelRow>,
    pub material_usage: Vec<MaterialUsageRow>,
    pub equipment_usage: Vec<EquipmentUsageRow>,
    pub today_log: Vec<WorkLogEntry>,
    pub previous_log: Vec<WorkLogEntry>,
}

// ==========================================
// 注入接口
// ==========================================

/// 报表数据源
pub trait ReportSource: Send + Sync {
    /// 读取窗口内全部数据（单一读事务）
    fn load_dataset(&self, window: &PeriodWindow) -> RepositoryResult<ReportDataset>;

    /// 读取单日作业内容
    fn load_day_log(&self, date: NaiveDate) -> RepositoryResult<(Option<Site>, Vec<WorkLogEntry>)>;
}

/// 天气快照存储
pub trait WeatherStore: Send + Sync {
    fn find_snapshot(&self, date: NaiveDate) -> RepositoryResult<Option<WeatherSnapshot>>;

    /// 按日期 upsert
    fn save_snapshot(&self, snapshot: &WeatherSnapshot) -> RepositoryResult<()>;
}

/// 行数配置
pub trait RowLimitStore: Send + Sync {
    fn max_rows(&self, page: ReportPage) -> RepositoryResult<u32>;
}

impl WeatherStore for WeatherRepository {
    fn find_snapshot(&self, date: NaiveDate) -> RepositoryResult<Option<WeatherSnapshot>> {
        self.find_by_date(date)
    }

    fn save_snapshot(&self, snapshot: &WeatherSnapshot) -> RepositoryResult<()> {
        self.upsert(snapshot)
    }
}

impl RowLimitStore for RowLimitRepository {
    fn max_rows(&self, page: ReportPage) -> RepositoryResult<u32> {
        RowLimitRepository::max_rows(self, page)
    }
}

// ==========================================
// SqliteReportSource - SQLite 实现
// ==========================================

pub struct SqliteReportSource {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteReportSource {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }
}

impl ReportSource for SqliteReportSource {
    fn load_dataset(&self, window: &PeriodWindow) -> RepositoryResult<ReportDataset> {
        let conn = self.get_conn()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let selected = window.selected();
        let dataset = ReportDataset {
            site: query_first_site(&tx)?,
            companies: query_companies(&tx, false)?,
            materials: query_materials(&tx)?,
            equipments: query_equipments(&tx)?,
            personnel: query_personnel_until(&tx, selected)?,
            material_usage: query_material_usage_until(&tx, selected)?,
            equipment_usage: query_equipment_usage_until(&tx, selected)?,
            today_log: query_work_log_on(&tx, selected)?,
            previous_log: query_work_log_on(&tx, window.previous())?,
        };

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        tracing::debug!(
            date = %selected,
            companies = dataset.companies.len(),
            materials = dataset.materials.len(),
            equipments = dataset.equipments.len(),
            personnel_rows = dataset.personnel.len(),
            material_rows = dataset.material_usage.len(),
            equipment_rows = dataset.equipment_usage.len(),
            "报表数据读取完成"
        );
        Ok(dataset)
    }

    fn load_day_log(&self, date: NaiveDate) -> RepositoryResult<(Option<Site>, Vec<WorkLogEntry>)> {
        let conn = self.get_conn()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let site = query_first_site(&tx)?;
        let log = query_work_log_on(&tx, date)?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok((site, log))
    }
}
