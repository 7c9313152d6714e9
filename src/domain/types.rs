// ==========================================
// 施工现场日报系统 - 领域类型定义
// ==========================================
// 职责: 报表页面、数量、天气状况等值类型
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

// ==========================================
// ReportPage - 报表页面
// ==========================================
// 页面名即 report_row_limit 表的主键，保持与历史数据一致
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportPage {
    ManpowerFinalPaper,
    WorkStatusFinalPaper,
    CombinedFinalPaper,
    WorkStatusForSmaty,
}

impl ReportPage {
    pub const ALL: [ReportPage; 4] = [
        ReportPage::ManpowerFinalPaper,
        ReportPage::WorkStatusFinalPaper,
        ReportPage::CombinedFinalPaper,
        ReportPage::WorkStatusForSmaty,
    ];

    /// 可配置行数上限（打印网格的物理上限）
    pub const MAX_ROWS_CEILING: u32 = 1_000;

    /// 持久化使用的页面名
    pub fn page_name(&self) -> &'static str {
        match self {
            ReportPage::ManpowerFinalPaper => "ManpowerFinalPaper",
            ReportPage::WorkStatusFinalPaper => "WorkStatusFinalPaper",
            ReportPage::CombinedFinalPaper => "CombinedFinalPaper",
            ReportPage::WorkStatusForSmaty => "WorkStatusForSmaty",
        }
    }

    /// 未配置时的默认行数
    ///
    /// - 出勤类（Manpower）: 88
    /// - 作业现况类: 50
    pub fn default_max_rows(&self) -> u32 {
        match self {
            ReportPage::ManpowerFinalPaper => 88,
            _ => 50,
        }
    }

    /// 行数是否在可配置范围 [1, MAX_ROWS_CEILING] 内
    pub fn accepts_max_rows(max_rows: i64) -> bool {
        (1..=Self::MAX_ROWS_CEILING as i64).contains(&max_rows)
    }
}

impl fmt::Display for ReportPage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.page_name())
    }
}

impl FromStr for ReportPage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReportPage::ALL
            .iter()
            .copied()
            .find(|p| p.page_name() == s.trim())
            .ok_or_else(|| format!("未知的报表页面: {}", s))
    }
}

// ==========================================
// Quantity - 材料数量 (小数点后 3 位)
// ==========================================
// 以千分之一为单位的整数保存，累加不产生浮点误差
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(i64);

impl Quantity {
    pub const SCALE: i64 = 1_000;
    pub const ZERO: Quantity = Quantity(0);

    pub fn from_thousandths(value: i64) -> Self {
        Self(value)
    }

    pub fn thousandths(&self) -> i64 {
        self.0
    }

    /// 由数据库 REAL 值换算（四舍五入到 3 位小数）
    pub fn from_f64(value: f64) -> Self {
        Self((value * Self::SCALE as f64).round() as i64)
    }

    pub fn as_f64(&self) -> f64 {
        self.0 as f64 / Self::SCALE as f64
    }
}

impl Add for Quantity {
    type Output = Quantity;

    fn add(self, rhs: Quantity) -> Quantity {
        Quantity(self.0 + rhs.0)
    }
}

impl AddAssign for Quantity {
    fn add_assign(&mut self, rhs: Quantity) {
        self.0 += rhs.0;
    }
}

impl Sum for Quantity {
    fn sum<I: Iterator<Item = Quantity>>(iter: I) -> Quantity {
        iter.fold(Quantity::ZERO, |acc, q| acc + q)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.abs();
        write!(f, "{}{}.{:03}", sign, abs / Self::SCALE, abs % Self::SCALE)
    }
}

impl FromStr for Quantity {
    type Err = String;

    /// 解析用户输入的数量，最多 3 位小数
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let (negative, digits) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };
        let (int_part, frac_part) = match digits.split_once('.') {
            Some((i, f)) => (i, f),
            None => (digits, ""),
        };

        let valid = !int_part.is_empty()
            && int_part.chars().all(|c| c.is_ascii_digit())
            && frac_part.len() <= 3
            && frac_part.chars().all(|c| c.is_ascii_digit());
        if !valid {
            return Err(format!("无效的数量: {}", s));
        }

        let int_value: i64 = int_part.parse().map_err(|_| format!("数量超出范围: {}", s))?;
        let frac_value: i64 = if frac_part.is_empty() {
            0
        } else {
            format!("{:0<3}", frac_part)
                .parse()
                .map_err(|_| format!("无效的数量: {}", s))?
        };

        let value = int_value
            .checked_mul(Self::SCALE)
            .and_then(|v| v.checked_add(frac_value))
            .ok_or_else(|| format!("数量超出范围: {}", s))?;
        Ok(Quantity(if negative { -value } else { value }))
    }
}

// ==========================================
// WeatherCondition - 天气状况
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WeatherCondition {
    Clear,
    MostlyCloudy,
    Overcast,
    Rain,
    RainSnow,
    Snow,
    Shower,
    Unknown,
}

impl WeatherCondition {
    /// 持久化编码
    pub fn code(&self) -> &'static str {
        match self {
            WeatherCondition::Clear => "CLEAR",
            WeatherCondition::MostlyCloudy => "MOSTLY_CLOUDY",
            WeatherCondition::Overcast => "OVERCAST",
            WeatherCondition::Rain => "RAIN",
            WeatherCondition::RainSnow => "RAIN_SNOW",
            WeatherCondition::Snow => "SNOW",
            WeatherCondition::Shower => "SHOWER",
            WeatherCondition::Unknown => "UNKNOWN",
        }
    }

    /// 数据库中无法识别的编码一律视为 Unknown
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_uppercase().as_str() {
            "CLEAR" => WeatherCondition::Clear,
            "MOSTLY_CLOUDY" => WeatherCondition::MostlyCloudy,
            "OVERCAST" => WeatherCondition::Overcast,
            "RAIN" => WeatherCondition::Rain,
            "RAIN_SNOW" => WeatherCondition::RainSnow,
            "SNOW" => WeatherCondition::Snow,
            "SHOWER" => WeatherCondition::Shower,
            _ => WeatherCondition::Unknown,
        }
    }

    /// i18n 键
    pub fn label_key(&self) -> &'static str {
        match self {
            WeatherCondition::Clear => "weather.clear",
            WeatherCondition::MostlyCloudy => "weather.mostly_cloudy",
            WeatherCondition::Overcast => "weather.overcast",
            WeatherCondition::Rain => "weather.rain",
            WeatherCondition::RainSnow => "weather.rain_snow",
            WeatherCondition::Snow => "weather.snow",
            WeatherCondition::Shower => "weather.shower",
            WeatherCondition::Unknown => "weather.unknown",
        }
    }
}

impl fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
