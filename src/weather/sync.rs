// ==========================================
// 施工现场日报系统 - 天气同步
// ==========================================
// 规则:
// 1. 该日期已有快照 -> 直接返回，不调用接口
// 2. 非当日 (UTC+9) 且无快照 -> Unavailable，不调用接口
// 3. 当日且无快照 -> 调用接口；失败时写入占位快照
// 红线: 天气失败不得导致报表失败
// ==========================================

use crate::domain::types::WeatherCondition;
use crate::domain::weather::{SiteWeather, WeatherSnapshot};
use crate::engine::forecast_decode::ForecastSummary;
use crate::engine::forecast_window::{issuance_window, kst_date};
use crate::repository::error::RepositoryResult;
use crate::repository::report_source::WeatherStore;
use crate::repository::WeatherRepository;
use crate::weather::client::ForecastClient;
use chrono::{DateTime, FixedOffset, NaiveDate};
use std::sync::Arc;
use tracing::instrument;

pub struct WeatherSync {
    store: Arc<dyn WeatherStore>,
    client: Arc<dyn ForecastClient>,
}

impl WeatherSync {
    pub fn new(store: Arc<dyn WeatherStore>, client: Arc<dyn ForecastClient>) -> Self {
        Self { store, client }
    }

    /// 取得报表日期的天气
    ///
    /// # 参数
    /// - date: 报表日期
    /// - now: 当前时刻（决定"今天"与发布时次）
    ///
    /// # 返回
    /// - Ok(SiteWeather): 快照或 Unavailable
    /// - Err: 仅快照读取失败时
    #[instrument(skip(self), fields(date = %date))]
    pub async fn snapshot_for(
        &self,
        date: NaiveDate,
        now: DateTime<FixedOffset>,
    ) -> RepositoryResult<SiteWeather> {
        if let Some(snapshot) = self.store.find_snapshot(date)? {
            return Ok(SiteWeather::Recorded(snapshot));
        }

        let today = kst_date(&now);
        if date != today {
            tracing::debug!(today = %today, "非当日且无快照，跳过接口调用");
            return Ok(SiteWeather::Unavailable);
        }

        let snapshot = self.fetch_snapshot(today, &now).await;

        // 写入失败只记录，本次报表仍使用取得的快照
        if let Err(e) = self.store.save_snapshot(&snapshot) {
            tracing::error!(error = %e, "天气快照写入失败");
        }

        Ok(SiteWeather::Recorded(snapshot))
    }

    /// 调用接口并解析；任何失败都返回占位快照
    async fn fetch_snapshot(
        &self,
        today: NaiveDate,
        now: &DateTime<FixedOffset>,
    ) -> WeatherSnapshot {
        let window = issuance_window(now);

        match self.client.fetch_forecast(&window).await {
            Ok(items) => {
                let snapshot = ForecastSummary::from_items(&items).into_snapshot(today);
                tracing::info!(
                    base_date = %window.base_date_param(),
                    base_time = %window.base_time_param(),
                    items = items.len(),
                    condition = snapshot.condition.code(),
                    "天气快照已获取"
                );
                snapshot
            }
            Err(e) => {
                tracing::warn!(error = %e, "天气接口调用失败，写入占位快照");
                WeatherSnapshot::no_data(today)
            }
        }
    }
}

// ==========================================
// 天气状况人工修正
// ==========================================

/// 覆写已存在快照的天气状况
pub fn override_condition(
    repo: &WeatherRepository,
    date: NaiveDate,
    condition: WeatherCondition,
) -> RepositoryResult<()> {
    repo.update_condition(date, condition)?;
    tracing::info!(date = %date, condition = condition.code(), "天气状况已人工修正");
    Ok(())
}
