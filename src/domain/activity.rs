// ==========================================
// 施工现场日报系统 - 日常作业记录
// ==========================================
// 出勤 / 材料投入 / 装备使用
// 职责: 带日期的事务记录，以及与目录联表后的读取行
// ==========================================

use crate::domain::types::Quantity;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// 持久化实体
// ==========================================

/// 作业记录（每业者每日一条为常态，但不做唯一约束）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkRecord {
    pub id: i64,
    pub date: NaiveDate,
    pub company_id: i64,
    pub personnel_count: i64,
    pub description: String,
}

// ==========================================
// 联表读取行（累计窗口查询的结果）
// ==========================================

/// 出勤行: work_details ⋈ companies
#[derive(Debug, Clone, PartialEq)]
pub struct PersonnelRow {
    pub date: NaiveDate,
    pub company_name: String,
    pub trade: String,
    pub personnel_count: i64,
}

/// 材料行: daily_materials ⋈ materials
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialUsageRow {
    pub date: NaiveDate,
    pub material_name: String,
    pub specification: String,
    pub quantity: Quantity,
}

/// 装备行: work_equipments ⋈ equipments ⋈ work_details（日期取自作业记录）
#[derive(Debug, Clone, PartialEq)]
pub struct EquipmentUsageRow {
    pub date: NaiveDate,
    pub equipment_name: String,
    pub specification: Option<String>,
    pub count: i64,
}

/// 作业内容日志（作业现况报表使用，不做聚合）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkLogEntry {
    pub work_record_id: i64,
    pub company_id: i64,
    pub company_name: String,
    pub trade: String,
    pub personnel_count: i64,
    pub description: String,
}

/// 装备使用明细（录入现况视图使用）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsedEquipment {
    pub equipment_id: i64,
    pub equipment_name: String,
    pub specification: Option<String>,
    pub count: i64,
}

// ==========================================
// 录入请求
// ==========================================

/// 单个业者的当日录入
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanyEntry {
    pub company_id: i64,
    pub personnel_count: Option<i64>,
    pub description: Option<String>,
    pub equipments: Vec<EquipmentLine>,
}

/// 装备录入行（按 名称+规格 解析到目录）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquipmentLine {
    pub equipment_name: String,
    pub specification: Option<String>,
    pub count: i64,
}

/// 材料录入行
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialLine {
    pub material_id: i64,
    pub quantity: Quantity,
}
