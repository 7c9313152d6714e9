// ==========================================
// 施工现场日报系统 - 日常作业记录仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 表: work_details / work_equipments / daily_materials
// ==========================================
// 累计窗口查询: 每个领域一次 `date <= D` 查询，同时联表取目录名称
// ==========================================

use crate::domain::activity::{
    CompanyEntry, EquipmentUsageRow, MaterialLine, MaterialUsageRow, PersonnelRow,
    UsedEquipment, WorkLogEntry, WorkRecord,
};
use crate::domain::types::Quantity;
use crate::repository::catalog_repo::query_equipment_by_key;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Result as SqliteResult};
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// 累计窗口查询（供事务内复用）
// ==========================================

pub(crate) fn query_personnel_until(
    conn: &Connection,
    date: NaiveDate,
) -> RepositoryResult<Vec<PersonnelRow>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT w.date, c.name, c.trade, w.personnel_count
        FROM work_details w
        JOIN companies c ON c.id = w.company_id
        WHERE w.date <= ?1
        ORDER BY w.company_id ASC, w.date ASC
        "#,
    )?;
    let rows = stmt
        .query_map(params![date], |row| {
            Ok(PersonnelRow {
                date: row.get(0)?,
                company_name: row.get(1)?,
                trade: row.get(2)?,
                personnel_count: row.get(3)?,
            })
        })?
        .collect::<SqliteResult<Vec<_>>>()?;
    Ok(rows)
}

pub(crate) fn query_material_usage_until(
    conn: &Connection,
    date: NaiveDate,
) -> RepositoryResult<Vec<MaterialUsageRow>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT d.date, m.name, m.specification, d.quantity
        FROM daily_materials d
        JOIN materials m ON m.id = d.material_id
        WHERE d.date <= ?1
        ORDER BY d.material_id ASC, d.date ASC
        "#,
    )?;
    let rows = stmt
        .query_map(params![date], |row| {
            Ok(MaterialUsageRow {
                date: row.get(0)?,
                material_name: row.get(1)?,
                specification: row.get(2)?,
                quantity: Quantity::from_f64(row.get(3)?),
            })
        })?
        .collect::<SqliteResult<Vec<_>>>()?;
    Ok(rows)
}

pub(crate) fn query_equipment_usage_until(
    conn: &Connection,
    date: NaiveDate,
) -> RepositoryResult<Vec<EquipmentUsageRow>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT w.date, e.name, e.specification, we.equipment_count
        FROM work_equipments we
        JOIN equipments e ON e.id = we.equipment_id
        JOIN work_details w ON w.id = we.work_detail_id
        WHERE w.date <= ?1
        ORDER BY we.equipment_id ASC, w.date ASC
        "#,
    )?;
    let rows = stmt
        .query_map(params![date], |row| {
            Ok(EquipmentUsageRow {
                date: row.get(0)?,
                equipment_name: row.get(1)?,
                specification: row.get(2)?,
                count: row.get(3)?,
            })
        })?
        .collect::<SqliteResult<Vec<_>>>()?;
    Ok(rows)
}

/// 某日的作业内容（未排序，排序由报表组装负责）
pub(crate) fn query_work_log_on(
    conn: &Connection,
    date: NaiveDate,
) -> RepositoryResult<Vec<WorkLogEntry>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT w.id, w.company_id, c.name, c.trade, w.personnel_count, w.description
        FROM work_details w
        JOIN companies c ON c.id = w.company_id
        WHERE w.date = ?1
        "#,
    )?;
    let rows = stmt
        .query_map(params![date], |row| {
            Ok(WorkLogEntry {
                work_record_id: row.get(0)?,
                company_id: row.get(1)?,
                company_name: row.get(2)?,
                trade: row.get(3)?,
                personnel_count: row.get(4)?,
                description: row.get(5)?,
            })
        })?
        .collect::<SqliteResult<Vec<_>>>()?;
    Ok(rows)
}

// ==========================================
// ActivityRepository - 作业记录仓储
// ==========================================

pub struct ActivityRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ActivityRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ===== 查询 =====

    pub fn personnel_until(&self, date: NaiveDate) -> RepositoryResult<Vec<PersonnelRow>> {
        let conn = self.get_conn()?;
        query_personnel_until(&conn, date)
    }

    pub fn material_usage_until(&self, date: NaiveDate) -> RepositoryResult<Vec<MaterialUsageRow>> {
        let conn = self.get_conn()?;
        query_material_usage_until(&conn, date)
    }

    pub fn equipment_usage_until(
        &self,
        date: NaiveDate,
    ) -> RepositoryResult<Vec<EquipmentUsageRow>> {
        let conn = self.get_conn()?;
        query_equipment_usage_until(&conn, date)
    }

    pub fn work_log_on(&self, date: NaiveDate) -> RepositoryResult<Vec<WorkLogEntry>> {
        let conn = self.get_conn()?;
        query_work_log_on(&conn, date)
    }

    /// 某日全部作业记录
    pub fn records_on(&self, date: NaiveDate) -> RepositoryResult<Vec<WorkRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, date, company_id, personnel_count, description
            FROM work_details
            WHERE date = ?1
            ORDER BY company_id ASC, id ASC
            "#,
        )?;
        let records = stmt
            .query_map(params![date], |row| {
                Ok(WorkRecord {
                    id: row.get(0)?,
                    date: row.get(1)?,
                    company_id: row.get(2)?,
                    personnel_count: row.get(3)?,
                    description: row.get(4)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(records)
    }

    /// 某作业记录关联的装备
    pub fn equipments_for_record(
        &self,
        work_record_id: i64,
    ) -> RepositoryResult<Vec<UsedEquipment>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT e.id, e.name, e.specification, we.equipment_count
            FROM work_equipments we
            JOIN equipments e ON e.id = we.equipment_id
            WHERE we.work_detail_id = ?1
            ORDER BY we.id ASC
            "#,
        )?;
        let equipments = stmt
            .query_map(params![work_record_id], |row| {
                Ok(UsedEquipment {
                    equipment_id: row.get(0)?,
                    equipment_name: row.get(1)?,
                    specification: row.get(2)?,
                    count: row.get(3)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(equipments)
    }

    // ===== 写入（事务化） =====

    /// 提交一日的业者录入
    ///
    /// - 人数或作业内容缺失的业者跳过
    /// - 装备按 (名称, 规格) 解析，目录中不存在的装备跳过
    ///
    /// # 返回
    /// - Ok(Vec<i64>): 新建的作业记录 id
    /// - Err: 数据库错误（整个事务回滚）
    pub fn submit_company_entries(
        &self,
        date: NaiveDate,
        entries: &[CompanyEntry],
    ) -> RepositoryResult<Vec<i64>> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let mut created = Vec::new();
        for entry in entries {
            let (Some(personnel_count), Some(description)) =
                (entry.personnel_count, entry.description.as_deref())
            else {
                tracing::debug!(company_id = entry.company_id, "人数或作业内容缺失，跳过");
                continue;
            };
            if description.trim().is_empty() {
                tracing::debug!(company_id = entry.company_id, "作业内容为空，跳过");
                continue;
            }
            if personnel_count < 0 {
                return Err(RepositoryError::FieldValueError {
                    field: "personnel_count".to_string(),
                    message: format!("人数不能为负: {}", personnel_count),
                });
            }

            tx.execute(
                r#"
                INSERT INTO work_details (date, company_id, personnel_count, description)
                VALUES (?1, ?2, ?3, ?4)
                "#,
                params![date, entry.company_id, personnel_count, description],
            )?;
            let work_record_id = tx.last_insert_rowid();
            created.push(work_record_id);

            for line in &entry.equipments {
                let found = query_equipment_by_key(
                    &tx,
                    &line.equipment_name,
                    line.specification.as_deref(),
                )?;
                match found {
                    Some(equipment) => {
                        tx.execute(
                            r#"
                            INSERT INTO work_equipments (work_detail_id, equipment_id, equipment_count)
                            VALUES (?1, ?2, ?3)
                            "#,
                            params![work_record_id, equipment.id, line.count],
                        )?;
                    }
                    None => {
                        tracing::warn!(
                            equipment = %line.equipment_name,
                            specification = ?line.specification,
                            "目录中不存在该装备，跳过"
                        );
                    }
                }
            }
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(created)
    }

    /// 记录材料投入（事务化，材料必须存在）
    pub fn record_material_usage(
        &self,
        date: NaiveDate,
        lines: &[MaterialLine],
    ) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        for line in lines {
            if line.quantity < Quantity::ZERO {
                return Err(RepositoryError::FieldValueError {
                    field: "quantity".to_string(),
                    message: format!("数量不能为负: {}", line.quantity),
                });
            }
            let exists: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM materials WHERE id = ?1)",
                params![line.material_id],
                |row| row.get(0),
            )?;
            if !exists {
                return Err(RepositoryError::NotFound {
                    entity: "Material".to_string(),
                    id: line.material_id.to_string(),
                });
            }
            tx.execute(
                "INSERT INTO daily_materials (date, material_id, quantity) VALUES (?1, ?2, ?3)",
                params![date, line.material_id, line.quantity.as_f64()],
            )?;
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(lines.len())
    }
}
