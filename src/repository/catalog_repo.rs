// ==========================================
// 施工现场日报系统 - 目录主数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 表: companies / materials / equipments / sites
// ==========================================

use crate::domain::catalog::{Company, EquipmentCatalogItem, MaterialCatalogItem, Site};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// 行映射
// ==========================================

fn map_company(row: &Row) -> SqliteResult<Company> {
    Ok(Company {
        id: row.get(0)?,
        name: row.get(1)?,
        trade: row.get(2)?,
        is_completed: row.get::<_, i64>(3)? != 0,
        display_order: row.get(4)?,
    })
}

fn map_material(row: &Row) -> SqliteResult<MaterialCatalogItem> {
    Ok(MaterialCatalogItem {
        id: row.get(0)?,
        name: row.get(1)?,
        specification: row.get(2)?,
        unit: row.get(3)?,
    })
}

fn map_equipment(row: &Row) -> SqliteResult<EquipmentCatalogItem> {
    Ok(EquipmentCatalogItem {
        id: row.get(0)?,
        name: row.get(1)?,
        specification: row.get(2)?,
    })
}

// ==========================================
// 查询（供事务内复用）
// ==========================================

pub(crate) fn query_companies(
    conn: &Connection,
    only_active: bool,
) -> RepositoryResult<Vec<Company>> {
    let sql = if only_active {
        r#"
        SELECT id, name, trade, is_completed, display_order
        FROM companies
        WHERE is_completed = 0
        ORDER BY name ASC, id ASC
        "#
    } else {
        r#"
        SELECT id, name, trade, is_completed, display_order
        FROM companies
        ORDER BY name ASC, id ASC
        "#
    };
    let mut stmt = conn.prepare(sql)?;
    let companies = stmt
        .query_map([], map_company)?
        .collect::<SqliteResult<Vec<_>>>()?;
    Ok(companies)
}

pub(crate) fn query_materials(conn: &Connection) -> RepositoryResult<Vec<MaterialCatalogItem>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, specification, unit FROM materials ORDER BY id ASC",
    )?;
    let materials = stmt
        .query_map([], map_material)?
        .collect::<SqliteResult<Vec<_>>>()?;
    Ok(materials)
}

pub(crate) fn query_equipments(conn: &Connection) -> RepositoryResult<Vec<EquipmentCatalogItem>> {
    let mut stmt = conn.prepare("SELECT id, name, specification FROM equipments ORDER BY id ASC")?;
    let equipments = stmt
        .query_map([], map_equipment)?
        .collect::<SqliteResult<Vec<_>>>()?;
    Ok(equipments)
}

/// 插入顺序最早的现场即“本现场”
pub(crate) fn query_first_site(conn: &Connection) -> RepositoryResult<Option<Site>> {
    let site = conn
        .query_row(
            "SELECT id, name FROM sites ORDER BY id ASC LIMIT 1",
            [],
            |row| {
                Ok(Site {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            },
        )
        .optional()?;
    Ok(site)
}

/// 按复合键 (名称, 规格) 查找装备；规格为 None 时匹配 NULL
pub(crate) fn query_equipment_by_key(
    conn: &Connection,
    name: &str,
    specification: Option<&str>,
) -> RepositoryResult<Option<EquipmentCatalogItem>> {
    let equipment = conn
        .query_row(
            r#"
            SELECT id, name, specification FROM equipments
            WHERE name = ?1 AND specification IS ?2
            ORDER BY id ASC LIMIT 1
            "#,
            params![name, specification],
            map_equipment,
        )
        .optional()?;
    Ok(equipment)
}

// ==========================================
// CatalogRepository - 目录仓储
// ==========================================

pub struct CatalogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CatalogRepository {
    /// 从已有连接创建仓储实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ===== 查询 =====

    /// 全部业者（含作业完成）
    pub fn list_companies(&self) -> RepositoryResult<Vec<Company>> {
        let conn = self.get_conn()?;
        query_companies(&conn, false)
    }

    /// 当期业者（作业未完成）
    pub fn list_active_companies(&self) -> RepositoryResult<Vec<Company>> {
        let conn = self.get_conn()?;
        query_companies(&conn, true)
    }

    pub fn list_materials(&self) -> RepositoryResult<Vec<MaterialCatalogItem>> {
        let conn = self.get_conn()?;
        query_materials(&conn)
    }

    pub fn list_equipments(&self) -> RepositoryResult<Vec<EquipmentCatalogItem>> {
        let conn = self.get_conn()?;
        query_equipments(&conn)
    }

    pub fn first_site(&self) -> RepositoryResult<Option<Site>> {
        let conn = self.get_conn()?;
        query_first_site(&conn)
    }

    pub fn find_equipment_by_key(
        &self,
        name: &str,
        specification: Option<&str>,
    ) -> RepositoryResult<Option<EquipmentCatalogItem>> {
        let conn = self.get_conn()?;
        query_equipment_by_key(&conn, name, specification)
    }

    // ===== 写入（目录维护与测试数据准备） =====

    pub fn insert_company(&self, name: &str, trade: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO companies (name, trade) VALUES (?1, ?2)",
            params![name, trade],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn set_company_completed(&self, company_id: i64, completed: bool) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE companies SET is_completed = ?1 WHERE id = ?2",
            params![completed as i64, company_id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Company".to_string(),
                id: company_id.to_string(),
            });
        }
        Ok(())
    }

    pub fn insert_material(
        &self,
        name: &str,
        specification: &str,
        unit: &str,
    ) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO materials (name, specification, unit) VALUES (?1, ?2, ?3)",
            params![name, specification, unit],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn insert_equipment(
        &self,
        name: &str,
        specification: Option<&str>,
    ) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO equipments (name, specification) VALUES (?1, ?2)",
            params![name, specification],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn insert_site(&self, name: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute("INSERT INTO sites (name) VALUES (?1)", params![name])?;
        Ok(conn.last_insert_rowid())
    }
}
