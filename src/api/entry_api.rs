// ==========================================
// 施工现场日报系统 - 录入 API
// ==========================================
// 职责: 业者作业录入、材料投入录入、录入现况查询
// ==========================================

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::domain::activity::{CompanyEntry, MaterialLine};
use crate::domain::report::{EntryStatus, WrittenEntry};
use crate::domain::types::Quantity;
use crate::engine::period_aggregator::PeriodWindow;
use crate::repository::activity_repo::ActivityRepository;
use crate::repository::catalog_repo::CatalogRepository;

/// 材料投入输入（数量为用户输入的文本，最多 3 位小数）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialQuantityInput {
    pub material_id: i64,
    pub quantity: String,
}

// ==========================================
// EntryApi - 录入 API
// ==========================================

pub struct EntryApi {
    catalog_repo: Arc<CatalogRepository>,
    activity_repo: Arc<ActivityRepository>,
}

impl EntryApi {
    pub fn new(
        catalog_repo: Arc<CatalogRepository>,
        activity_repo: Arc<ActivityRepository>,
    ) -> Self {
        Self {
            catalog_repo,
            activity_repo,
        }
    }

    fn parse_date(date: &str) -> ApiResult<NaiveDate> {
        Ok(PeriodWindow::parse(date)?.selected())
    }

    /// 提交一日的业者录入
    ///
    /// # 返回
    /// - Ok(Vec<i64>): 新建的作业记录 id（跳过的业者不含在内）
    pub fn submit_company_entries(
        &self,
        date: &str,
        entries: &[CompanyEntry],
    ) -> ApiResult<Vec<i64>> {
        let date = Self::parse_date(date)?;
        if entries.is_empty() {
            return Err(ApiError::InvalidInput("录入内容不能为空".to_string()));
        }

        let created = self.activity_repo.submit_company_entries(date, entries)?;
        tracing::info!(
            date = %date,
            submitted = entries.len(),
            created = created.len(),
            "业者录入已提交"
        );
        Ok(created)
    }

    /// 记录材料投入
    pub fn record_material_usage(
        &self,
        date: &str,
        inputs: &[MaterialQuantityInput],
    ) -> ApiResult<usize> {
        let date = Self::parse_date(date)?;

        let lines = inputs
            .iter()
            .map(|input| {
                let quantity = input
                    .quantity
                    .parse::<Quantity>()
                    .map_err(ApiError::InvalidInput)?;
                if quantity < Quantity::ZERO {
                    return Err(ApiError::InvalidInput(format!(
                        "数量不能为负: {}",
                        input.quantity
                    )));
                }
                Ok(MaterialLine {
                    material_id: input.material_id,
                    quantity,
                })
            })
            .collect::<ApiResult<Vec<_>>>()?;

        let recorded = self.activity_repo.record_material_usage(date, &lines)?;
        tracing::info!(date = %date, recorded, "材料投入已记录");
        Ok(recorded)
    }

    /// 某日录入现况（仅作业未完成的业者）
    ///
    /// - written: 当日已有作业记录的业者，附记录与装备
    /// - pending: 尚未录入的业者
    pub fn entry_status(&self, date: &str) -> ApiResult<EntryStatus> {
        let date = Self::parse_date(date)?;

        let mut companies = self.catalog_repo.list_active_companies()?;
        companies.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.trade.cmp(&b.trade)));

        let records = self.activity_repo.records_on(date)?;

        let mut written = Vec::new();
        let mut pending = Vec::new();
        for company in companies {
            let company_records: Vec<_> = records
                .iter()
                .filter(|r| r.company_id == company.id)
                .cloned()
                .collect();
            if company_records.is_empty() {
                pending.push(company);
                continue;
            }
            for record in company_records {
                let equipments = self.activity_repo.equipments_for_record(record.id)?;
                written.push(WrittenEntry {
                    company: company.clone(),
                    record,
                    equipments,
                });
            }
        }

        tracing::debug!(date = %date, written = written.len(), pending = pending.len(), "录入现况");
        Ok(EntryStatus {
            date,
            written,
            pending,
        })
    }
}
