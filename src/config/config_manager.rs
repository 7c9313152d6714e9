// ==========================================
// 施工现场日报系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写
// 存储: config_kv 表 (key-value)
// ==========================================

use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ==========================================
// 配置键
// ==========================================
pub mod config_keys {
    // 气象接口
    pub const WEATHER_SERVICE_KEY: &str = "weather_service_key";
    pub const WEATHER_BASE_URL: &str = "weather_base_url";
    pub const WEATHER_GRID_NX: &str = "weather_grid_nx";
    pub const WEATHER_GRID_NY: &str = "weather_grid_ny";
    pub const WEATHER_TIMEOUT_SECS: &str = "weather_timeout_secs";

    // 报表
    pub const SITE_NAME_FALLBACK: &str = "site_name_fallback";
}

/// 短期预报接口默认地址
pub const DEFAULT_WEATHER_BASE_URL: &str =
    "http://apis.data.go.kr/1360000/VilageFcstInfoService_2.0/getVilageFcst";

// ==========================================
// WeatherSettings - 气象接口配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSettings {
    pub service_key: String,
    pub base_url: String,
    pub grid_nx: i32,
    pub grid_ny: i32,
    pub timeout_secs: u64,
}

impl Default for WeatherSettings {
    fn default() -> Self {
        Self {
            service_key: String::new(),
            base_url: DEFAULT_WEATHER_BASE_URL.to_string(),
            // 水原市网格坐标
            grid_nx: 60,
            grid_ny: 121,
            timeout_secs: 10,
        }
    }
}

impl WeatherSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 从已有连接创建 ConfigManager
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 读取配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, Box<dyn Error>> {
        Ok(self
            .get_config_value(key)?
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| default.to_string()))
    }

    /// 写入配置值
    pub fn set_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            r#"
            INSERT INTO config_kv (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
            params![key, value],
        )?;
        tracing::info!(key = key, "配置已更新");
        Ok(())
    }

    /// 气象接口配置（数值无法解析时回退默认值）
    pub fn weather_settings(&self) -> Result<WeatherSettings, Box<dyn Error>> {
        let defaults = WeatherSettings::default();

        let service_key = self.get_config_or_default(config_keys::WEATHER_SERVICE_KEY, "")?;
        let base_url =
            self.get_config_or_default(config_keys::WEATHER_BASE_URL, &defaults.base_url)?;
        let grid_nx = self
            .get_config_or_default(config_keys::WEATHER_GRID_NX, &defaults.grid_nx.to_string())?
            .trim()
            .parse::<i32>()
            .unwrap_or(defaults.grid_nx);
        let grid_ny = self
            .get_config_or_default(config_keys::WEATHER_GRID_NY, &defaults.grid_ny.to_string())?
            .trim()
            .parse::<i32>()
            .unwrap_or(defaults.grid_ny);
        let timeout_secs = self
            .get_config_or_default(
                config_keys::WEATHER_TIMEOUT_SECS,
                &defaults.timeout_secs.to_string(),
            )?
            .trim()
            .parse::<u64>()
            .unwrap_or(defaults.timeout_secs);

        Ok(WeatherSettings {
            service_key,
            base_url,
            grid_nx,
            grid_ny,
            timeout_secs,
        })
    }

    /// 现场名缺失时的替代名（未配置时为 None，由上层使用本地化默认名）
    pub fn site_name_fallback(&self) -> Result<Option<String>, Box<dyn Error>> {
        Ok(self
            .get_config_value(config_keys::SITE_NAME_FALLBACK)?
            .filter(|v| !v.trim().is_empty()))
    }
}
