// ==========================================
// 施工现场日报系统 - 报表 API
// ==========================================
// 职责: 输入校验（日期 / 页面名 / 行数）→ 报表组装
// 红线: 非法输入在聚合之前拒绝
// ==========================================

use std::sync::Arc;

use chrono::{DateTime, FixedOffset};

use crate::api::error::{ApiError, ApiResult};
use crate::domain::report::{
    AssembledReport, CombinedFinalPaper, ManpowerFinalPaper, WorkStatusBrief, WorkStatusFinalPaper,
};
use crate::domain::types::{ReportPage, WeatherCondition};
use crate::engine::forecast_window::{kst_date, kst_now};
use crate::engine::period_aggregator::PeriodWindow;
use crate::engine::report_assembler::ReportAssembler;
use crate::repository::row_limit_repo::RowLimitRepository;
use crate::repository::weather_repo::WeatherRepository;
use crate::weather::override_condition;

/// 当前时刻来源（测试中可固定）
pub type Clock = Arc<dyn Fn() -> DateTime<FixedOffset> + Send + Sync>;

// ==========================================
// ReportApi - 报表 API
// ==========================================

/// 报表API
///
/// 职责：
/// 1. 四种打印页面的组装
/// 2. 页面行数配置
/// 3. 天气状况人工修正
pub struct ReportApi {
    assembler: Arc<ReportAssembler>,
    row_limit_repo: Arc<RowLimitRepository>,
    weather_repo: Arc<WeatherRepository>,
    clock: Clock,
}

impl ReportApi {
    /// 创建新的ReportApi实例
    pub fn new(
        assembler: Arc<ReportAssembler>,
        row_limit_repo: Arc<RowLimitRepository>,
        weather_repo: Arc<WeatherRepository>,
    ) -> Self {
        Self {
            assembler,
            row_limit_repo,
            weather_repo,
            clock: Arc::new(kst_now),
        }
    }

    /// 替换时钟
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// 解析报表日期
    ///
    /// # 参数
    /// - date: `YYYY-MM-DD`；None 或空串表示今天 (UTC+9)
    pub fn resolve_window(&self, date: Option<&str>) -> ApiResult<PeriodWindow> {
        match date.map(str::trim).filter(|d| !d.is_empty()) {
            Some(raw) => Ok(PeriodWindow::parse(raw)?),
            None => Ok(PeriodWindow::new(kst_date(&(self.clock)()))?),
        }
    }

    /// 解析页面名
    pub fn parse_page(page_name: &str) -> ApiResult<ReportPage> {
        page_name
            .parse::<ReportPage>()
            .map_err(|_| ApiError::UnknownPage(page_name.to_string()))
    }

    // ==========================================
    // 报表
    // ==========================================

    /// 按页面名组装报表
    ///
    /// # 参数
    /// - page_name: 页面名（ManpowerFinalPaper 等）
    /// - date: 报表日期，None 为今天
    ///
    /// # 返回
    /// - Ok(AssembledReport): 页面数据
    /// - Err(ApiError): 输入错误或数据库错误
    pub async fn get_report(
        &self,
        page_name: &str,
        date: Option<&str>,
    ) -> ApiResult<AssembledReport> {
        let page = Self::parse_page(page_name)?;
        let window = self.resolve_window(date)?;
        Ok(self.assembler.assemble(page, window, (self.clock)()).await?)
    }

    pub async fn manpower_final_paper(&self, date: Option<&str>) -> ApiResult<ManpowerFinalPaper> {
        let window = self.resolve_window(date)?;
        Ok(self.assembler.manpower(window, (self.clock)()).await?)
    }

    pub async fn work_status_final_paper(
        &self,
        date: Option<&str>,
    ) -> ApiResult<WorkStatusFinalPaper> {
        let window = self.resolve_window(date)?;
        Ok(self.assembler.work_status(window, (self.clock)()).await?)
    }

    pub async fn combined_final_paper(&self, date: Option<&str>) -> ApiResult<CombinedFinalPaper> {
        let window = self.resolve_window(date)?;
        Ok(self.assembler.combined(window, (self.clock)()).await?)
    }

    pub async fn work_status_brief(&self, date: Option<&str>) -> ApiResult<WorkStatusBrief> {
        let window = self.resolve_window(date)?;
        Ok(self.assembler.work_status_brief(window).await?)
    }

    // ==========================================
    // 维护
    // ==========================================

    /// 查询页面行数
    pub fn get_max_rows(&self, page_name: &str) -> ApiResult<u32> {
        let page = Self::parse_page(page_name)?;
        Ok(self.row_limit_repo.max_rows(page)?)
    }

    /// 修改页面行数
    ///
    /// # 参数
    /// - page_name: 页面名
    /// - max_rows: 1 ~ ReportPage::MAX_ROWS_CEILING
    pub fn update_max_rows(&self, page_name: &str, max_rows: i64) -> ApiResult<()> {
        let page = Self::parse_page(page_name)?;
        if !ReportPage::accepts_max_rows(max_rows) {
            return Err(ApiError::InvalidInput(format!(
                "行数必须在 1 ~ {} 之间: {}",
                ReportPage::MAX_ROWS_CEILING,
                max_rows
            )));
        }
        let max_rows = max_rows as u32;

        self.row_limit_repo.set_max_rows(page, max_rows)?;
        tracing::info!(page = %page, max_rows, "报表行数已更新");
        Ok(())
    }

    /// 人工修正某日天气状况（快照必须已存在）
    ///
    /// # 参数
    /// - date: `YYYY-MM-DD`
    /// - condition: 天气编码（CLEAR / MOSTLY_CLOUDY / ...）
    pub fn override_weather_condition(&self, date: &str, condition: &str) -> ApiResult<()> {
        let window = PeriodWindow::parse(date)?;
        let parsed = WeatherCondition::from_code(condition);
        let explicit_unknown = condition.trim().eq_ignore_ascii_case("UNKNOWN");
        if parsed == WeatherCondition::Unknown && !explicit_unknown {
            return Err(ApiError::InvalidInput(format!("未知的天气编码: {}", condition)));
        }

        override_condition(&self.weather_repo, window.selected(), parsed)?;
        Ok(())
    }
}
