// ==========================================
// 施工现场日报系统 - 目录主数据
// ==========================================
// 业者 / 材料 / 装备 / 现场
// 职责: 主数据实体定义，与日期无关
// ==========================================

use crate::engine::composite_key::{self, CompositeKey};
use serde::{Deserialize, Serialize};

// ==========================================
// Company - 协力业者
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: i64,
    pub name: String,            // 业者名
    pub trade: String,           // 工种
    pub is_completed: bool,      // 作业完成（不再出现在当期录入视图）
    pub display_order: Option<i64>,
}

impl Company {
    /// 聚合键: (业者名, 工种)
    pub fn key(&self) -> CompositeKey {
        composite_key::key(&self.name, Some(&self.trade))
    }
}

// ==========================================
// MaterialCatalogItem - 材料目录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialCatalogItem {
    pub id: i64,
    pub name: String,
    pub specification: String,   // 规格，常为数字字符串（如管径）
    pub unit: String,
}

impl MaterialCatalogItem {
    pub fn key(&self) -> CompositeKey {
        composite_key::key(&self.name, Some(&self.specification))
    }
}

// ==========================================
// EquipmentCatalogItem - 装备目录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentCatalogItem {
    pub id: i64,
    pub name: String,
    pub specification: Option<String>,
}

impl EquipmentCatalogItem {
    pub fn key(&self) -> CompositeKey {
        composite_key::key(&self.name, self.specification.as_deref())
    }
}

// ==========================================
// Site - 现场
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub id: i64,
    pub name: String,
}
