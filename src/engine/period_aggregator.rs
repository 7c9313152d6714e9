// ==========================================
// 施工现场日报系统 - 期间聚合引擎
// ==========================================
// 职责: 对选定日期 D，按复合键计算 前日(D-1) / 当日(D) / 累计(≤D)
// 输入: 完整目录 + 累计窗口 (date ≤ D) 的事务行
// 输出: 按目录自然顺序排列的聚合行
// ==========================================
// 规则:
// 1. 先用完整目录播种，全部置 0（无活动的目录项也必须出现）
// 2. 每条事务行无条件计入累计；D 计入当日；D-1 计入前日
// 3. 同键同日的多条记录求和，不覆盖
// 4. 目录中不存在的键、晚于 D 的记录忽略
// ==========================================

use crate::domain::activity::{EquipmentUsageRow, MaterialUsageRow, PersonnelRow};
use crate::domain::catalog::{Company, EquipmentCatalogItem, MaterialCatalogItem};
use crate::domain::report::{
    AggregateRow, EquipmentAggregate, MaterialAggregate, PeriodFigures, PersonnelAggregate,
    PersonnelTotals,
};
use crate::engine::composite_key::{self, compare_catalog_entries, CompositeKey};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::AddAssign;
use thiserror::Error;
use tracing::{debug, instrument};

// ==========================================
// PeriodWindow - 聚合窗口
// ==========================================

#[derive(Error, Debug, PartialEq)]
pub enum PeriodError {
    #[error("无效的日期: {0}")]
    InvalidDate(String),

    #[error("日期没有前一天: {0}")]
    NoPreviousDay(NaiveDate),
}

/// 选定日期与前一日（日历意义上的前一天，不考虑周末/节假日）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodWindow {
    selected: NaiveDate,
    previous: NaiveDate,
}

impl PeriodWindow {
    pub fn new(selected: NaiveDate) -> Result<Self, PeriodError> {
        let previous = selected
            .pred_opt()
            .ok_or(PeriodError::NoPreviousDay(selected))?;
        Ok(Self { selected, previous })
    }

    /// 解析 `YYYY-MM-DD`，不合法的日期直接拒绝
    pub fn parse(raw: &str) -> Result<Self, PeriodError> {
        let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .map_err(|_| PeriodError::InvalidDate(raw.to_string()))?;
        Self::new(date)
    }

    pub fn selected(&self) -> NaiveDate {
        self.selected
    }

    pub fn previous(&self) -> NaiveDate {
        self.previous
    }
}

// ==========================================
// PeriodAggregator - 期间聚合器
// ==========================================

pub struct PeriodAggregator {
    window: PeriodWindow,
}

impl PeriodAggregator {
    pub fn new(window: PeriodWindow) -> Self {
        Self { window }
    }

    /// 通用聚合
    ///
    /// `catalog` 需已按输出顺序排好；复合键冲突时保留先出现的目录项，
    /// 两者的事务数量合并到同一行
    pub fn aggregate<C, V, K, I>(
        &self,
        catalog: Vec<C>,
        catalog_key: K,
        facts: I,
    ) -> Vec<AggregateRow<C, V>>
    where
        V: Copy + Default + AddAssign,
        K: Fn(&C) -> CompositeKey,
        I: IntoIterator<Item = (CompositeKey, NaiveDate, V)>,
    {
        let mut index: HashMap<CompositeKey, usize> = HashMap::with_capacity(catalog.len());
        let mut rows: Vec<AggregateRow<C, V>> = Vec::with_capacity(catalog.len());

        for item in catalog {
            let key = catalog_key(&item);
            if index.contains_key(&key) {
                debug!(key = %key, "目录复合键冲突，合并到先出现的目录项");
                continue;
            }
            index.insert(key, rows.len());
            rows.push(AggregateRow {
                item,
                figures: PeriodFigures::default(),
            });
        }

        let mut unmatched = 0usize;
        for (key, date, value) in facts {
            if date > self.window.selected {
                continue;
            }
            let Some(&pos) = index.get(&key) else {
                unmatched += 1;
                continue;
            };

            let figures = &mut rows[pos].figures;
            figures.cumulative += value;
            if date == self.window.selected {
                figures.current += value;
            } else if date == self.window.previous {
                figures.previous += value;
            }
        }

        if unmatched > 0 {
            debug!(unmatched, "存在无法匹配目录的事务行，已忽略");
        }

        rows
    }

    /// 人员出勤聚合（业者名 → 工种 排序）
    #[instrument(skip_all, fields(date = %self.window.selected, companies = companies.len()))]
    pub fn personnel(
        &self,
        companies: &[Company],
        rows: &[PersonnelRow],
    ) -> Vec<PersonnelAggregate> {
        let mut catalog = companies.to_vec();
        catalog.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.trade.cmp(&b.trade)));

        let facts = rows.iter().map(|r| {
            (
                composite_key::key(&r.company_name, Some(&r.trade)),
                r.date,
                r.personnel_count,
            )
        });

        self.aggregate(catalog, Company::key, facts)
    }

    /// 材料投入聚合（名称 → 规格数值 排序）
    #[instrument(skip_all, fields(date = %self.window.selected, materials = materials.len()))]
    pub fn materials(
        &self,
        materials: &[MaterialCatalogItem],
        rows: &[MaterialUsageRow],
    ) -> Vec<MaterialAggregate> {
        let mut catalog = materials.to_vec();
        catalog.sort_by(|a, b| {
            compare_catalog_entries(
                &a.name,
                Some(&a.specification),
                &b.name,
                Some(&b.specification),
            )
        });

        let facts = rows.iter().map(|r| {
            (
                composite_key::key(&r.material_name, Some(&r.specification)),
                r.date,
                r.quantity,
            )
        });

        self.aggregate(catalog, MaterialCatalogItem::key, facts)
    }

    /// 装备使用聚合（同一装备被多个业者使用时合计）
    #[instrument(skip_all, fields(date = %self.window.selected, equipments = equipments.len()))]
    pub fn equipments(
        &self,
        equipments: &[EquipmentCatalogItem],
        rows: &[EquipmentUsageRow],
    ) -> Vec<EquipmentAggregate> {
        let mut catalog = equipments.to_vec();
        catalog.sort_by(|a, b| {
            compare_catalog_entries(
                &a.name,
                a.specification.as_deref(),
                &b.name,
                b.specification.as_deref(),
            )
        });

        let facts = rows.iter().map(|r| {
            (
                composite_key::key(&r.equipment_name, r.specification.as_deref()),
                r.date,
                r.count,
            )
        });

        self.aggregate(catalog, EquipmentCatalogItem::key, facts)
    }
}

/// 出勤人数合计
pub fn personnel_totals(rows: &[PersonnelAggregate]) -> PersonnelTotals {
    rows.iter().fold(PersonnelTotals::default(), |mut acc, row| {
        acc.previous += row.figures.previous;
        acc.current += row.figures.current;
        acc.cumulative += row.figures.cumulative;
        acc
    })
}
