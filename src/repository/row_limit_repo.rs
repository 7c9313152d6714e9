// ==========================================
// 施工现场日报系统 - 报表行数配置仓储
// ==========================================
// 表: report_row_limit (page_name → max_rows)
// 未配置或超出 [1, MAX_ROWS_CEILING] 的页面使用 ReportPage::default_max_rows
// ==========================================

use crate::domain::types::ReportPage;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

pub struct RowLimitRepository {
    conn: Arc<Mutex<Connection>>,
}

impl RowLimitRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 读取页面行数（带默认值）
    pub fn max_rows(&self, page: ReportPage) -> RepositoryResult<u32> {
        let conn = self.get_conn()?;
        let stored: Option<i64> = conn
            .query_row(
                "SELECT max_rows FROM report_row_limit WHERE page_name = ?1",
                params![page.page_name()],
                |row| row.get(0),
            )
            .optional()?;

        match stored {
            Some(v) if ReportPage::accepts_max_rows(v) => Ok(v as u32),
            Some(v) => {
                tracing::warn!(page = %page, value = v, "行数配置无效，使用默认值");
                Ok(page.default_max_rows())
            }
            None => Ok(page.default_max_rows()),
        }
    }

    /// 更新页面行数（upsert）
    pub fn set_max_rows(&self, page: ReportPage, max_rows: u32) -> RepositoryResult<()> {
        if !ReportPage::accepts_max_rows(max_rows as i64) {
            return Err(RepositoryError::ValidationError(format!(
                "max_rows 必须在 1 ~ {} 之间: {}",
                ReportPage::MAX_ROWS_CEILING,
                max_rows
            )));
        }

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO report_row_limit (page_name, max_rows) VALUES (?1, ?2)
            ON CONFLICT(page_name) DO UPDATE SET max_rows = excluded.max_rows
            "#,
            params![page.page_name(), max_rows],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;

    fn repo() -> RowLimitRepository {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        RowLimitRepository::new(Arc::new(Mutex::new(conn)))
    }

    #[test]
    fn test_defaults_when_absent() {
        let repo = repo();
        assert_eq!(repo.max_rows(ReportPage::ManpowerFinalPaper).unwrap(), 88);
        assert_eq!(repo.max_rows(ReportPage::WorkStatusFinalPaper).unwrap(), 50);
    }

    #[test]
    fn test_set_and_overwrite() {
        let repo = repo();
        repo.set_max_rows(ReportPage::WorkStatusFinalPaper, 60).unwrap();
        repo.set_max_rows(ReportPage::WorkStatusFinalPaper, 70).unwrap();

        assert_eq!(repo.max_rows(ReportPage::WorkStatusFinalPaper).unwrap(), 70);
        assert_eq!(repo.max_rows(ReportPage::ManpowerFinalPaper).unwrap(), 88);
    }

    #[test]
    fn test_zero_is_rejected() {
        let repo = repo();
        assert!(matches!(
            repo.set_max_rows(ReportPage::ManpowerFinalPaper, 0),
            Err(RepositoryError::ValidationError(_))
        ));
    }

    #[test]
    fn test_above_ceiling_is_rejected() {
        let repo = repo();
        assert!(repo.set_max_rows(ReportPage::CombinedFinalPaper, 1_000).is_ok());
        assert!(matches!(
            repo.set_max_rows(ReportPage::CombinedFinalPaper, 1_001),
            Err(RepositoryError::ValidationError(_))
        ));
        assert_eq!(repo.max_rows(ReportPage::CombinedFinalPaper).unwrap(), 1_000);
    }

    #[test]
    fn test_oversized_stored_value_falls_back_to_default() {
        let repo = repo();
        repo.get_conn()
            .unwrap()
            .execute(
                "INSERT INTO report_row_limit (page_name, max_rows) VALUES (?1, ?2)",
                params![ReportPage::ManpowerFinalPaper.page_name(), 3_000_000_000_i64],
            )
            .unwrap();

        assert_eq!(repo.max_rows(ReportPage::ManpowerFinalPaper).unwrap(), 88);
    }
}
