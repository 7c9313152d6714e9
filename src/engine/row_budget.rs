// ==========================================
// 施工现场日报系统 - 行数预算
// ==========================================
// 职责: 把有序结果填入固定行数的打印网格
// 规则:
// - 输出恰好 max_rows 个位置
// - 超出部分截断（不报错），通过 overflow 暴露给运维调整配置
// ==========================================

use crate::domain::report::BudgetedRows;
use tracing::warn;

/// 填充 / 截断到 `max_rows`
pub fn apply_budget<T>(rows: Vec<T>, max_rows: u32) -> BudgetedRows<T> {
    let limit = max_rows as usize;
    let total = rows.len();
    let overflow = total.saturating_sub(limit);

    let mut slots: Vec<Option<T>> = rows.into_iter().take(limit).map(Some).collect();
    let populated = slots.len();
    slots.resize_with(limit, || None);

    if overflow > 0 {
        warn!(total, max_rows, overflow, "输出行数超过预算，超出部分已截断");
    }

    BudgetedRows {
        max_rows,
        populated,
        overflow,
        slots,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pads_to_exact_slot_count() {
        let budgeted = apply_budget((1..=10).collect::<Vec<i32>>(), 50);

        assert_eq!(budgeted.slots.len(), 50);
        assert_eq!(budgeted.populated, 10);
        assert_eq!(budgeted.blank_rows(), 40);
        assert!(!budgeted.is_truncated());
        assert_eq!(budgeted.rows().copied().collect::<Vec<_>>(), (1..=10).collect::<Vec<_>>());
        assert!(budgeted.slots[10..].iter().all(Option::is_none));
    }

    #[test]
    fn test_truncates_and_flags_overflow() {
        let budgeted = apply_budget((1..=60).collect::<Vec<i32>>(), 50);

        assert_eq!(budgeted.slots.len(), 50);
        assert_eq!(budgeted.populated, 50);
        assert_eq!(budgeted.overflow, 10);
        assert!(budgeted.is_truncated());
        assert_eq!(budgeted.slots[49], Some(50));
    }

    #[test]
    fn test_exact_fit_is_not_truncated() {
        let budgeted = apply_budget(vec!["a"; 88], 88);
        assert_eq!(budgeted.blank_rows(), 0);
        assert!(!budgeted.is_truncated());
    }
}
