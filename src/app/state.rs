// ==========================================
// 施工现场日报系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{EntryApi, ReportApi};
use crate::config::config_manager::ConfigManager;
use crate::db::{init_schema, open_sqlite_connection};
use crate::engine::report_assembler::ReportAssembler;
use crate::repository::{
    ActivityRepository, CatalogRepository, RowLimitRepository, SqliteReportSource,
    WeatherRepository,
};
use crate::weather::{KmaForecastClient, WeatherSync};

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 报表API
    pub report_api: Arc<ReportApi>,

    /// 录入API
    pub entry_api: Arc<EntryApi>,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    ///
    /// # 返回
    /// - Ok(AppState): 应用状态实例
    /// - Err(String): 初始化错误
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 打开共享连接并建表
    /// 2. 初始化所有Repository
    /// 3. 读取气象接口配置，创建天气同步与报表组装
    /// 4. 创建所有API实例
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        // 创建数据库连接（共享连接）
        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        init_schema(&conn).map_err(|e| format!("数据库初始化失败: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================

        let catalog_repo = Arc::new(CatalogRepository::new(conn.clone()));
        let activity_repo = Arc::new(ActivityRepository::new(conn.clone()));
        let weather_repo = Arc::new(WeatherRepository::new(conn.clone()));
        let row_limit_repo = Arc::new(RowLimitRepository::new(conn.clone()));
        let report_source = Arc::new(SqliteReportSource::new(conn.clone()));

        // ==========================================
        // 配置
        // ==========================================

        let config_manager = Arc::new(ConfigManager::from_connection(conn.clone()));
        let weather_settings = config_manager
            .weather_settings()
            .map_err(|e| format!("无法读取气象接口配置: {}", e))?;
        let site_name_fallback = config_manager
            .site_name_fallback()
            .map_err(|e| format!("无法读取现场名配置: {}", e))?;

        if weather_settings.service_key.is_empty() {
            tracing::warn!("未配置气象接口服务密钥，当日天气将记录为无数据");
        }

        // ==========================================
        // 初始化Engine层
        // ==========================================

        let forecast_client = Arc::new(
            KmaForecastClient::new(weather_settings)
                .map_err(|e| format!("无法创建气象接口客户端: {}", e))?,
        );
        let weather_sync = Arc::new(WeatherSync::new(weather_repo.clone(), forecast_client));

        let assembler = Arc::new(
            ReportAssembler::new(report_source, weather_sync, row_limit_repo.clone())
                .with_site_name_fallback(site_name_fallback),
        );

        // ==========================================
        // 初始化API层
        // ==========================================

        let report_api = Arc::new(ReportApi::new(assembler, row_limit_repo, weather_repo));
        let entry_api = Arc::new(EntryApi::new(catalog_repo, activity_repo));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            report_api,
            entry_api,
            config_manager,
        })
    }
}

// ==========================================
// 默认数据库路径
// ==========================================

/// 获取默认数据库路径
///
/// # 返回
/// - 环境变量 SITE_DAILY_REPORT_DB_PATH（非空时）
/// - 开发环境: 用户数据目录/site-daily-report-dev/site_daily_report.db
/// - 生产环境: 用户数据目录/site-daily-report/site_daily_report.db
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var("SITE_DAILY_REPORT_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./site_daily_report.db");

    if let Some(data_dir) = dirs::data_dir() {
        // 开发环境使用独立目录，避免污染生产数据
        #[cfg(debug_assertions)]
        {
            path = data_dir.join("site-daily-report-dev");
        }

        #[cfg(not(debug_assertions))]
        {
            path = data_dir.join("site-daily-report");
        }

        // 确保目录存在
        std::fs::create_dir_all(&path).ok();
        path = path.join("site_daily_report.db");
    }

    path.to_string_lossy().to_string()
}
