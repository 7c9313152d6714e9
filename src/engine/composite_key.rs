// ==========================================
// 施工现场日报系统 - 复合键与排序策略
// ==========================================
// 职责:
// - 生成 (名称, 规格) 的稳定复合键，用于合并目录与稀疏事务数据
// - 规格中数字的排序策略（仅用于排序，不参与存储与计算）
// ==========================================

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// 复合键
///
/// 编码: `<名称字节长度>:<名称>` + (`~` 表示无规格 | `=<规格>`)
/// 名称带长度前缀，因此任意内容都不会产生歧义
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompositeKey(String);

impl CompositeKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 生成复合键（纯函数）
pub fn key(name: &str, specification: Option<&str>) -> CompositeKey {
    let spec_part = match specification {
        None => "~".to_string(),
        Some(spec) => format!("={}", spec),
    };
    CompositeKey(format!("{}:{}{}", name.len(), name, spec_part))
}

/// 规格排序值
///
/// 规则: 去掉所有非数字字符后按整数解析，无数字或溢出时为 0
/// 例: "100A" → 100, "D-25" → 25, "소형" → 0
pub fn spec_sort_value(specification: Option<&str>) -> u64 {
    let digits: String = specification
        .unwrap_or("")
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect();
    digits.parse::<u64>().unwrap_or(0)
}

/// 目录排序: 名称 → 规格数值 → 规格原文
pub fn compare_catalog_entries(
    a_name: &str,
    a_spec: Option<&str>,
    b_name: &str,
    b_spec: Option<&str>,
) -> Ordering {
    a_name
        .cmp(b_name)
        .then_with(|| spec_sort_value(a_spec).cmp(&spec_sort_value(b_spec)))
        .then_with(|| a_spec.cmp(&b_spec))
}
