// ==========================================
// 施工现场日报系统 - 天气快照仓储
// ==========================================
// 表: weather（date 为主键）
// 并发: 写入为按日期 upsert，后写覆盖，不报错
// ==========================================

use crate::domain::types::WeatherCondition;
use crate::domain::weather::WeatherSnapshot;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

pub struct WeatherRepository {
    conn: Arc<Mutex<Connection>>,
}

impl WeatherRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 按日期查询快照
    pub fn find_by_date(&self, date: NaiveDate) -> RepositoryResult<Option<WeatherSnapshot>> {
        let conn = self.get_conn()?;
        let snapshot = conn
            .query_row(
                "SELECT date, min_temp, max_temp, condition FROM weather WHERE date = ?1",
                params![date],
                |row| {
                    Ok(WeatherSnapshot {
                        date: row.get(0)?,
                        min_temp: row.get(1)?,
                        max_temp: row.get(2)?,
                        condition: WeatherCondition::from_code(&row.get::<_, String>(3)?),
                    })
                },
            )
            .optional()?;
        Ok(snapshot)
    }

    /// 按日期 upsert
    pub fn upsert(&self, snapshot: &WeatherSnapshot) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO weather (date, min_temp, max_temp, condition)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(date) DO UPDATE SET
                min_temp = excluded.min_temp,
                max_temp = excluded.max_temp,
                condition = excluded.condition
            "#,
            params![
                snapshot.date,
                snapshot.min_temp,
                snapshot.max_temp,
                snapshot.condition.code(),
            ],
        )?;
        Ok(())
    }

    /// 人工修正天气状况（快照必须已存在）
    pub fn update_condition(
        &self,
        date: NaiveDate,
        condition: WeatherCondition,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE weather SET condition = ?1 WHERE date = ?2",
            params![condition.code(), date],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "WeatherSnapshot".to_string(),
                id: date.to_string(),
            });
        }
        Ok(())
    }
}
