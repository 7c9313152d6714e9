// ==========================================
// 施工现场日报系统 - 命令行入口
// ==========================================
// 用法: site-daily-report <page> [YYYY-MM-DD]
// 输出: 报表 JSON（stdout），日志走 stderr
// ==========================================

use anyhow::{bail, Context};
use site_daily_report::app::{get_default_db_path, AppState};
use site_daily_report::{logging, ReportPage};

fn usage() -> String {
    let pages: Vec<&str> = ReportPage::ALL.iter().map(|p| p.page_name()).collect();
    format!(
        "用法: site-daily-report <page> [YYYY-MM-DD]\n可用页面: {}",
        pages.join(", ")
    )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // LOG_FORMAT=json 时输出结构化日志
    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => logging::init_json(),
        _ => logging::init(),
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (page, date) = match args.as_slice() {
        [page] => (page.as_str(), None),
        [page, date] => (page.as_str(), Some(date.as_str())),
        _ => bail!(usage()),
    };

    tracing::info!("系统版本: {}", site_daily_report::VERSION);

    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);

    let state = AppState::new(db_path).map_err(anyhow::Error::msg)?;
    let report = state
        .report_api
        .get_report(page, date)
        .await
        .with_context(|| format!("报表生成失败: {}", page))?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
