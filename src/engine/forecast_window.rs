// ==========================================
// 施工现场日报系统 - 预报发布时次选择
// ==========================================
// 职责: 由当前时刻 (UTC+9) 决定查询哪个发布时次 (base_date, base_time)
// 发布时次: 02 / 05 / 08 / 11 / 14 / 17 / 20 / 23 时
// 红线: 00:00 ~ 01:59 使用前一日 23 时发布（唯一跨日的时次）
// ==========================================

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// 韩国标准时 (UTC+9) 偏移秒数
pub const KST_OFFSET_SECS: i32 = 9 * 3600;

/// 发布时次（小时）
pub const ISSUANCE_HOURS: [u32; 8] = [2, 5, 8, 11, 14, 17, 20, 23];

/// UTC+9 固定偏移（编译期校验）
const KST_OFFSET: FixedOffset = match FixedOffset::east_opt(KST_OFFSET_SECS) {
    Some(offset) => offset,
    None => panic!("UTC+9 偏移越界"),
};

pub fn kst_offset() -> FixedOffset {
    KST_OFFSET
}

/// 当前 UTC+9 时刻
pub fn kst_now() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&kst_offset())
}

/// 某时刻对应的 UTC+9 日期（"今天"的唯一口径）
pub fn kst_date<Tz: TimeZone>(now: &DateTime<Tz>) -> NaiveDate {
    now.with_timezone(&kst_offset()).date_naive()
}

/// 预报查询窗口
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastWindow {
    pub base_date: NaiveDate,
    pub base_hour: u32,
}

impl ForecastWindow {
    /// base_date 参数 (YYYYMMDD)
    pub fn base_date_param(&self) -> String {
        self.base_date.format("%Y%m%d").to_string()
    }

    /// base_time 参数 (HHMM)
    pub fn base_time_param(&self) -> String {
        format!("{:02}00", self.base_hour)
    }
}

/// 选择不晚于当前时刻的最近发布时次（纯函数）
pub fn issuance_window<Tz: TimeZone>(now: &DateTime<Tz>) -> ForecastWindow {
    let local = now.with_timezone(&kst_offset());
    let hour = local.hour();
    let today = local.date_naive();

    match ISSUANCE_HOURS.iter().rev().find(|&&h| h <= hour) {
        Some(&base_hour) => ForecastWindow {
            base_date: today,
            base_hour,
        },
        // 02 时之前: 回退到前一日 23 时
        None => ForecastWindow {
            base_date: today.pred_opt().unwrap_or(today),
            base_hour: 23,
        },
    }
}
