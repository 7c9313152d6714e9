// ==========================================
// 施工现场日报系统 - 气象同步层
// ==========================================
// 职责: 调用短期预报接口，按日期缓存天气快照
// ==========================================

pub mod client;
pub mod error;
pub mod sync;

pub use client::{ForecastClient, KmaForecastClient};
pub use error::WeatherError;
pub use sync::{override_condition, WeatherSync};
