// ==========================================
// 施工现场日报系统 - 报表组装
// ==========================================
// 职责: 数据源 → 期间聚合 → 行数预算 → 页面结构
// 流程:
// 1. 单一读事务读取目录与累计窗口数据
// 2. 三个领域分别聚合（人员 / 材料 / 装备）
// 3. 按页面行数配置填充 / 截断
// 4. 附加现场名与天气
// ==========================================

use crate::domain::activity::WorkLogEntry;
use crate::domain::catalog::Site;
use crate::domain::report::{
    AssembledReport, BudgetedRows, CombinedFinalPaper, EquipmentAggregate, ManpowerFinalPaper,
    MaterialAggregate, PersonnelAggregate, PersonnelTotals, ReportHeader, WorkStatusBrief,
    WorkStatusFinalPaper,
};
use crate::domain::types::ReportPage;
use crate::engine::period_aggregator::{personnel_totals, PeriodAggregator, PeriodWindow};
use crate::engine::row_budget::apply_budget;
use crate::i18n::t;
use crate::repository::error::RepositoryResult;
use crate::repository::report_source::{ReportDataset, ReportSource, RowLimitStore};
use crate::weather::WeatherSync;
use chrono::{DateTime, FixedOffset};
use std::sync::Arc;
use tracing::instrument;

/// 三个领域的聚合结果（尚未套用行数预算）
struct AggregatedSections {
    personnel: Vec<PersonnelAggregate>,
    materials: Vec<MaterialAggregate>,
    equipments: Vec<EquipmentAggregate>,
    totals: PersonnelTotals,
}

/// 作业日志按业者名（不区分大小写）排序，同名按记录 id
fn sort_work_log(mut log: Vec<WorkLogEntry>) -> Vec<WorkLogEntry> {
    log.sort_by(|a, b| {
        a.company_name
            .to_uppercase()
            .cmp(&b.company_name.to_uppercase())
            .then_with(|| a.work_record_id.cmp(&b.work_record_id))
    });
    log
}

// ==========================================
// ReportAssembler
// ==========================================

pub struct ReportAssembler {
    source: Arc<dyn ReportSource>,
    weather: Arc<WeatherSync>,
    row_limits: Arc<dyn RowLimitStore>,
    site_name_fallback: Option<String>,
}

impl ReportAssembler {
    pub fn new(
        source: Arc<dyn ReportSource>,
        weather: Arc<WeatherSync>,
        row_limits: Arc<dyn RowLimitStore>,
    ) -> Self {
        Self {
            source,
            weather,
            row_limits,
            site_name_fallback: None,
        }
    }

    /// 现场表无记录时使用的名称
    pub fn with_site_name_fallback(mut self, name: Option<String>) -> Self {
        self.site_name_fallback = name;
        self
    }

    // ==========================================
    // 页面
    // ==========================================

    /// 出勤现况
    #[instrument(skip(self, window, now), fields(date = %window.selected()))]
    pub async fn manpower(
        &self,
        window: PeriodWindow,
        now: DateTime<FixedOffset>,
    ) -> RepositoryResult<ManpowerFinalPaper> {
        let dataset = self.source.load_dataset(&window)?;
        let max_rows = self.row_limits.max_rows(ReportPage::ManpowerFinalPaper)?;
        let header = self.header(dataset.site.as_ref(), window, now).await?;
        let sections = Self::aggregate(window, &dataset);

        Ok(ManpowerFinalPaper {
            header,
            personnel: apply_budget(sections.personnel, max_rows),
            materials: apply_budget(sections.materials, max_rows),
            equipments: apply_budget(sections.equipments, max_rows),
            totals: sections.totals,
        })
    }

    /// 作业现况（当日 + 前日作业内容）
    #[instrument(skip(self, window, now), fields(date = %window.selected()))]
    pub async fn work_status(
        &self,
        window: PeriodWindow,
        now: DateTime<FixedOffset>,
    ) -> RepositoryResult<WorkStatusFinalPaper> {
        let dataset = self.source.load_dataset(&window)?;
        let max_rows = self.row_limits.max_rows(ReportPage::WorkStatusFinalPaper)?;
        let header = self.header(dataset.site.as_ref(), window, now).await?;

        Ok(WorkStatusFinalPaper {
            header,
            today_log: apply_budget(sort_work_log(dataset.today_log), max_rows),
            previous_log: apply_budget(sort_work_log(dataset.previous_log), max_rows),
        })
    }

    /// 单页合并版
    #[instrument(skip(self, window, now), fields(date = %window.selected()))]
    pub async fn combined(
        &self,
        window: PeriodWindow,
        now: DateTime<FixedOffset>,
    ) -> RepositoryResult<CombinedFinalPaper> {
        let dataset = self.source.load_dataset(&window)?;
        let max_rows = self.row_limits.max_rows(ReportPage::CombinedFinalPaper)?;
        let header = self.header(dataset.site.as_ref(), window, now).await?;
        let sections = Self::aggregate(window, &dataset);

        Ok(CombinedFinalPaper {
            header,
            personnel: apply_budget(sections.personnel, max_rows),
            materials: apply_budget(sections.materials, max_rows),
            equipments: apply_budget(sections.equipments, max_rows),
            totals: sections.totals,
            today_log: apply_budget(sort_work_log(dataset.today_log), max_rows),
            previous_log: apply_budget(sort_work_log(dataset.previous_log), max_rows),
        })
    }

    /// 简版作业现况（仅当日，不取天气）
    #[instrument(skip(self, window), fields(date = %window.selected()))]
    pub async fn work_status_brief(
        &self,
        window: PeriodWindow,
    ) -> RepositoryResult<WorkStatusBrief> {
        let (site, log) = self.source.load_day_log(window.selected())?;
        let max_rows = self.row_limits.max_rows(ReportPage::WorkStatusForSmaty)?;

        Ok(WorkStatusBrief {
            site_name: self.site_name(site.as_ref()),
            date: window.selected(),
            today_log: apply_budget(sort_work_log(log), max_rows),
        })
    }

    /// 按页面分派
    pub async fn assemble(
        &self,
        page: ReportPage,
        window: PeriodWindow,
        now: DateTime<FixedOffset>,
    ) -> RepositoryResult<AssembledReport> {
        let report = match page {
            ReportPage::ManpowerFinalPaper => {
                AssembledReport::ManpowerFinalPaper(self.manpower(window, now).await?)
            }
            ReportPage::WorkStatusFinalPaper => {
                AssembledReport::WorkStatusFinalPaper(self.work_status(window, now).await?)
            }
            ReportPage::CombinedFinalPaper => {
                AssembledReport::CombinedFinalPaper(self.combined(window, now).await?)
            }
            ReportPage::WorkStatusForSmaty => {
                AssembledReport::WorkStatusForSmaty(self.work_status_brief(window).await?)
            }
        };

        tracing::info!(page = %page, date = %window.selected(), "报表组装完成");
        Ok(report)
    }

    // ==========================================
    // 内部
    // ==========================================

    fn aggregate(window: PeriodWindow, dataset: &ReportDataset) -> AggregatedSections {
        let aggregator = PeriodAggregator::new(window);

        let personnel = aggregator.personnel(&dataset.companies, &dataset.personnel);
        let totals = personnel_totals(&personnel);

        AggregatedSections {
            personnel,
            materials: aggregator.materials(&dataset.materials, &dataset.material_usage),
            equipments: aggregator.equipments(&dataset.equipments, &dataset.equipment_usage),
            totals,
        }
    }

    async fn header(
        &self,
        site: Option<&Site>,
        window: PeriodWindow,
        now: DateTime<FixedOffset>,
    ) -> RepositoryResult<ReportHeader> {
        let weather = self.weather.snapshot_for(window.selected(), now).await?;
        let weather_display = weather.display();

        Ok(ReportHeader {
            site_name: self.site_name(site),
            date: window.selected(),
            previous_date: window.previous(),
            weather,
            weather_display,
        })
    }

    fn site_name(&self, site: Option<&Site>) -> String {
        site.map(|s| s.name.trim())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .or_else(|| self.site_name_fallback.clone())
            .unwrap_or_else(|| t("common.default_site_name"))
    }
}

/// 截断提示（供打印层显示）
pub fn overflow_notice<T>(page: ReportPage, rows: &BudgetedRows<T>) -> Option<String> {
    if !rows.is_truncated() {
        return None;
    }
    let dropped = rows.overflow.to_string();
    Some(crate::i18n::t_with_args(
        "report.row_overflow",
        &[("page", page.page_name()), ("dropped", dropped.as_str())],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::activity::{MaterialUsageRow, PersonnelRow};
    use crate::domain::catalog::{Company, MaterialCatalogItem};
    use crate::domain::types::{Quantity, WeatherCondition};
    use crate::domain::weather::{SiteWeather, WeatherSnapshot};
    use crate::engine::forecast_decode::ForecastItem;
    use crate::engine::forecast_window::{kst_offset, ForecastWindow};
    use crate::repository::error::RepositoryError;
    use crate::repository::report_source::WeatherStore;
    use crate::weather::{ForecastClient, WeatherError};
    use async_trait::async_trait;
    use chrono::{NaiveDate, TimeZone};
    use std::collections::HashMap;
    use std::sync::Mutex;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    struct FixedSource(ReportDataset);

    impl ReportSource for FixedSource {
        fn load_dataset(&self, _window: &PeriodWindow) -> RepositoryResult<ReportDataset> {
            Ok(self.0.clone())
        }

        fn load_day_log(
            &self,
            _date: NaiveDate,
        ) -> RepositoryResult<(Option<Site>, Vec<WorkLogEntry>)> {
            Ok((self.0.site.clone(), self.0.today_log.clone()))
        }
    }

    struct FixedLimits(HashMap<ReportPage, u32>);

    impl RowLimitStore for FixedLimits {
        fn max_rows(&self, page: ReportPage) -> RepositoryResult<u32> {
            Ok(self.0.get(&page).copied().unwrap_or_else(|| page.default_max_rows()))
        }
    }

    #[derive(Default)]
    struct MemoryWeather(Mutex<HashMap<NaiveDate, WeatherSnapshot>>);

    impl WeatherStore for MemoryWeather {
        fn find_snapshot(&self, date: NaiveDate) -> RepositoryResult<Option<WeatherSnapshot>> {
            Ok(self.0.lock().unwrap().get(&date).cloned())
        }

        fn save_snapshot(&self, snapshot: &WeatherSnapshot) -> RepositoryResult<()> {
            self.0.lock().unwrap().insert(snapshot.date, snapshot.clone());
            Ok(())
        }
    }

    struct OfflineClient;

    #[async_trait]
    impl ForecastClient for OfflineClient {
        async fn fetch_forecast(
            &self,
            _window: &ForecastWindow,
        ) -> Result<Vec<ForecastItem>, WeatherError> {
            Ok(vec![ForecastItem::new("SKY", "4")])
        }
    }

    struct BrokenSource;

    impl ReportSource for BrokenSource {
        fn load_dataset(&self, _window: &PeriodWindow) -> RepositoryResult<ReportDataset> {
            Err(RepositoryError::LockError("poisoned".to_string()))
        }

        fn load_day_log(
            &self,
            _date: NaiveDate,
        ) -> RepositoryResult<(Option<Site>, Vec<WorkLogEntry>)> {
            Err(RepositoryError::LockError("poisoned".to_string()))
        }
    }

    fn company(id: i64, name: &str, trade: &str) -> Company {
        Company {
            id,
            name: name.to_string(),
            trade: trade.to_string(),
            is_completed: false,
            display_order: None,
        }
    }

    fn log(id: i64, company: &str) -> WorkLogEntry {
        WorkLogEntry {
            work_record_id: id,
            company_id: id,
            company_name: company.to_string(),
            trade: "T".to_string(),
            personnel_count: 1,
            description: format!("work {}", id),
        }
    }

    fn dataset() -> ReportDataset {
        ReportDataset {
            site: Some(Site {
                id: 1,
                name: "Suwon A-1".to_string(),
            }),
            companies: vec![company(1, "Beta", "Rebar"), company(2, "Alpha", "Form")],
            materials: vec![MaterialCatalogItem {
                id: 1,
                name: "Cement".to_string(),
                specification: "40".to_string(),
                unit: "bag".to_string(),
            }],
            equipments: vec![],
            personnel: vec![
                PersonnelRow {
                    date: d("2024-03-14"),
                    company_name: "Alpha".to_string(),
                    trade: "Form".to_string(),
                    personnel_count: 3,
                },
                PersonnelRow {
                    date: d("2024-03-15"),
                    company_name: "Alpha".to_string(),
                    trade: "Form".to_string(),
                    personnel_count: 4,
                },
            ],
            material_usage: vec![MaterialUsageRow {
                date: d("2024-03-15"),
                material_name: "Cement".to_string(),
                specification: "40".to_string(),
                quantity: Quantity::from_thousandths(2_500),
            }],
            equipment_usage: vec![],
            today_log: vec![log(3, "beta"), log(1, "Alpha"), log(2, "alpha")],
            previous_log: vec![],
        }
    }

    fn assembler(
        source: Arc<dyn ReportSource>,
        limits: HashMap<ReportPage, u32>,
    ) -> ReportAssembler {
        let weather = Arc::new(WeatherSync::new(
            Arc::new(MemoryWeather::default()),
            Arc::new(OfflineClient),
        ));
        ReportAssembler::new(source, weather, Arc::new(FixedLimits(limits)))
    }

    fn now() -> DateTime<FixedOffset> {
        kst_offset().with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_manpower_aggregates_and_pads() {
        let assembler = assembler(Arc::new(FixedSource(dataset())), HashMap::new());
        let window = PeriodWindow::parse("2024-03-15").unwrap();

        let paper = assembler.manpower(window, now()).await.unwrap();

        assert_eq!(paper.header.site_name, "Suwon A-1");
        assert_eq!(paper.header.previous_date, d("2024-03-14"));
        assert_eq!(paper.personnel.slots.len(), 88);
        assert_eq!(paper.personnel.populated, 2);

        let rows: Vec<_> = paper.personnel.rows().collect();
        assert_eq!(rows[0].item.name, "Alpha");
        assert_eq!(rows[0].figures.previous, 3);
        assert_eq!(rows[0].figures.current, 4);
        assert_eq!(rows[0].figures.cumulative, 7);
        assert_eq!(rows[1].item.name, "Beta");
        assert_eq!(rows[1].figures.cumulative, 0);

        assert_eq!(paper.totals.cumulative, 7);
        assert_eq!(paper.materials.rows().next().unwrap().figures.current.to_string(), "2.500");
        assert_eq!(
            paper.header.weather.snapshot().map(|s| s.condition),
            Some(WeatherCondition::Overcast)
        );
    }

    #[tokio::test]
    async fn test_past_date_reports_unavailable_weather() {
        let assembler = assembler(Arc::new(FixedSource(dataset())), HashMap::new());
        let window = PeriodWindow::parse("2024-03-01").unwrap();

        let paper = assembler.work_status(window, now()).await.unwrap();

        assert_eq!(paper.header.weather, SiteWeather::Unavailable);
    }

    #[tokio::test]
    async fn test_work_log_sorted_case_insensitively_then_by_id() {
        let assembler = assembler(Arc::new(FixedSource(dataset())), HashMap::new());
        let window = PeriodWindow::parse("2024-03-15").unwrap();

        let paper = assembler.work_status(window, now()).await.unwrap();

        let ids: Vec<i64> = paper.today_log.rows().map(|e| e.work_record_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(paper.today_log.slots.len(), 50);
        assert_eq!(paper.previous_log.populated, 0);
    }

    #[tokio::test]
    async fn test_configured_limit_truncates_combined_page() {
        let limits = HashMap::from([(ReportPage::CombinedFinalPaper, 1)]);
        let assembler = assembler(Arc::new(FixedSource(dataset())), limits);
        let window = PeriodWindow::parse("2024-03-15").unwrap();

        let paper = assembler.combined(window, now()).await.unwrap();

        assert_eq!(paper.personnel.slots.len(), 1);
        assert_eq!(paper.personnel.overflow, 1);
        assert_eq!(paper.today_log.overflow, 2);
        // 合计不受截断影响
        assert_eq!(paper.totals.current, 4);
        assert!(overflow_notice(ReportPage::CombinedFinalPaper, &paper.personnel).is_some());
        assert!(overflow_notice(ReportPage::CombinedFinalPaper, &paper.materials).is_none());
    }

    #[tokio::test]
    async fn test_site_name_falls_back_to_configured_name() {
        let mut data = dataset();
        data.site = None;
        let assembler = assembler(Arc::new(FixedSource(data)), HashMap::new())
            .with_site_name_fallback(Some("Configured".to_string()));
        let window = PeriodWindow::parse("2024-03-15").unwrap();

        let brief = assembler.work_status_brief(window).await.unwrap();

        assert_eq!(brief.site_name, "Configured");
        assert_eq!(brief.today_log.populated, 3);
    }

    #[tokio::test]
    async fn test_assemble_dispatches_by_page() {
        let assembler = assembler(Arc::new(FixedSource(dataset())), HashMap::new());
        let window = PeriodWindow::parse("2024-03-15").unwrap();

        for page in ReportPage::ALL {
            let report = assembler.assemble(page, window, now()).await.unwrap();
            assert_eq!(report.page(), page);
        }
    }

    #[tokio::test]
    async fn test_source_error_propagates() {
        let assembler = assembler(Arc::new(BrokenSource), HashMap::new());
        let window = PeriodWindow::parse("2024-03-15").unwrap();

        let result = assembler.manpower(window, now()).await;

        assert!(matches!(result, Err(RepositoryError::LockError(_))));
    }
}
