// ==========================================
// 施工现场日报系统 - 天气快照
// ==========================================
// 每个日期至多一条，按日期 upsert
// ==========================================

use crate::domain::types::WeatherCondition;
use crate::i18n::{t, t_with_args};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 天气快照
///
/// 气温保留预报接口返回的原始文本（如 "-3.0"），缺失时为 None
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub date: NaiveDate,
    pub min_temp: Option<String>,
    pub max_temp: Option<String>,
    pub condition: WeatherCondition,
}

impl WeatherSnapshot {
    /// 获取失败时写入的占位快照
    pub fn no_data(date: NaiveDate) -> Self {
        Self {
            date,
            min_temp: None,
            max_temp: None,
            condition: WeatherCondition::Unknown,
        }
    }
}

/// 报表使用的天气结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "snapshot", rename_all = "snake_case")]
pub enum SiteWeather {
    Recorded(WeatherSnapshot),
    /// 非当日且无快照：不调用接口
    Unavailable,
}

impl SiteWeather {
    pub fn snapshot(&self) -> Option<&WeatherSnapshot> {
        match self {
            SiteWeather::Recorded(s) => Some(s),
            SiteWeather::Unavailable => None,
        }
    }

    /// 转换为打印用文本
    pub fn display(&self) -> WeatherDisplay {
        let no_data = t("common.no_data");
        match self {
            SiteWeather::Recorded(s) => WeatherDisplay {
                condition: t(s.condition.label_key()),
                low_temp: format_temp(s.min_temp.as_deref()).unwrap_or_else(|| no_data.clone()),
                high_temp: format_temp(s.max_temp.as_deref()).unwrap_or(no_data),
            },
            SiteWeather::Unavailable => WeatherDisplay {
                condition: no_data.clone(),
                low_temp: no_data.clone(),
                high_temp: no_data,
            },
        }
    }
}

fn format_temp(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| t_with_args("weather.temperature", &[("value", v)]))
}

/// 打印用天气文本
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherDisplay {
    pub condition: String,
    pub low_temp: String,
    pub high_temp: String,
}
