// ==========================================
// 施工现场日报系统 - 预报条目解析
// ==========================================
// 只消费以下分类:
// - TMN: 日最低气温
// - TMX: 日最高气温
// - SKY: 天空状态 (1 晴 / 3 多云 / 4 阴)，首个可识别值生效
// - PTY: 降水形态 (1 雨 / 2 雨夹雪 / 3 雪 / 4 阵雨)，非 0 时覆盖 SKY
// ==========================================

use crate::domain::types::WeatherCondition;
use crate::domain::weather::WeatherSnapshot;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

/// 预报条目 `{category, fcstValue}`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ForecastItem {
    pub category: String,
    #[serde(rename = "fcstValue", deserialize_with = "string_or_number")]
    pub fcst_value: String,
}

impl ForecastItem {
    pub fn new(category: &str, fcst_value: &str) -> Self {
        Self {
            category: category.to_string(),
            fcst_value: fcst_value.to_string(),
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "fcstValue 类型不支持: {}",
            other
        ))),
    }
}

/// SKY 编码表
pub fn sky_condition(code: &str) -> Option<WeatherCondition> {
    match code.trim() {
        "1" => Some(WeatherCondition::Clear),
        "3" => Some(WeatherCondition::MostlyCloudy),
        "4" => Some(WeatherCondition::Overcast),
        _ => None,
    }
}

/// PTY 编码表（"0" 表示无降水）
pub fn precipitation_condition(code: &str) -> Option<WeatherCondition> {
    match code.trim() {
        "1" => Some(WeatherCondition::Rain),
        "2" => Some(WeatherCondition::RainSnow),
        "3" => Some(WeatherCondition::Snow),
        "4" => Some(WeatherCondition::Shower),
        _ => None,
    }
}

/// 解析结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForecastSummary {
    pub min_temp: Option<String>,
    pub max_temp: Option<String>,
    pub condition: Option<WeatherCondition>,
}

impl ForecastSummary {
    /// 按条目顺序扫描
    pub fn from_items(items: &[ForecastItem]) -> Self {
        let mut summary = ForecastSummary::default();

        for item in items {
            let value = item.fcst_value.trim();
            match item.category.as_str() {
                "TMN" => summary.min_temp = Some(value.to_string()),
                "TMX" => summary.max_temp = Some(value.to_string()),
                "SKY" => {
                    if summary.condition.is_none() {
                        summary.condition = sky_condition(value);
                    }
                }
                "PTY" => {
                    if let Some(precipitation) = precipitation_condition(value) {
                        summary.condition = Some(precipitation);
                    }
                }
                _ => {}
            }
        }

        summary
    }

    /// 缺失字段: 气温为 None，天气为 Unknown
    pub fn into_snapshot(self, date: NaiveDate) -> WeatherSnapshot {
        WeatherSnapshot {
            date,
            min_temp: self.min_temp.filter(|v| !v.is_empty()),
            max_temp: self.max_temp.filter(|v| !v.is_empty()),
            condition: self.condition.unwrap_or(WeatherCondition::Unknown),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_temperatures_and_sky() {
        let items = vec![
            ForecastItem::new("TMP", "7"),
            ForecastItem::new("SKY", "3"),
            ForecastItem::new("PTY", "0"),
            ForecastItem::new("TMN", "-2.0"),
            ForecastItem::new("TMX", "11.0"),
            ForecastItem::new("SKY", "1"),
        ];

        let summary = ForecastSummary::from_items(&items);

        assert_eq!(summary.min_temp.as_deref(), Some("-2.0"));
        assert_eq!(summary.max_temp.as_deref(), Some("11.0"));
        assert_eq!(summary.condition, Some(WeatherCondition::MostlyCloudy));
    }

    #[test]
    fn test_precipitation_overrides_sky() {
        let items = vec![
            ForecastItem::new("SKY", "4"),
            ForecastItem::new("PTY", "3"),
            ForecastItem::new("SKY", "1"),
        ];

        assert_eq!(
            ForecastSummary::from_items(&items).condition,
            Some(WeatherCondition::Snow)
        );
    }

    #[test]
    fn test_unknown_sky_code_waits_for_next_value() {
        let items = vec![ForecastItem::new("SKY", "2"), ForecastItem::new("SKY", "4")];
        assert_eq!(
            ForecastSummary::from_items(&items).condition,
            Some(WeatherCondition::Overcast)
        );
    }

    #[test]
    fn test_missing_fields_fall_back_to_sentinels() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let snapshot = ForecastSummary::from_items(&[]).into_snapshot(date);
        assert_eq!(snapshot.min_temp, None);
        assert_eq!(snapshot.max_temp, None);
        assert_eq!(snapshot.condition, WeatherCondition::Unknown);
    }

    #[test]
    fn test_numeric_fcst_value_is_accepted() {
        let item: ForecastItem =
            serde_json::from_str(r#"{"category":"TMX","fcstValue":12.5}"#).unwrap();
        assert_eq!(item.fcst_value, "12.5");
    }
}
