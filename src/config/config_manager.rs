// ==========================================
// Trường Tồn 农场看板 - 配置管理器
// ==========================================
// 职责: 看板可调参数的加载、查询、覆写
// 存储: config_kv 表 (scope_id = 'global')
// 缺失或格式错误的配置回退到默认值
// ==========================================

use rusqlite::params;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

use crate::repository::{connect, RepositoryError, RepositoryResult};

// ==========================================
// DashboardSettings - 生效配置快照
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSettings {
    /// 查询缓存 TTL（秒）
    pub cache_ttl_secs: u64,
    /// 会话空闲过期（秒）
    pub session_idle_secs: u64,
    /// 完成率 "达标" 下限 %
    pub quota_good_pct: f64,
    /// 完成率 "预警" 下限 %
    pub quota_warn_pct: f64,
    /// 班组/地块均值的最少样本数
    pub quota_min_samples: usize,
    /// 预算实现率 "正常" 下限 %
    pub budget_warn_pct: f64,
    /// 明细表显示行数
    pub cost_top_n: usize,
    /// 气泡图地块数
    pub bubble_top_n: usize,
    /// 热力图工作数
    pub heatmap_top_n: usize,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 300,
            session_idle_secs: 3600,
            quota_good_pct: 80.0,
            quota_warn_pct: 60.0,
            quota_min_samples: 3,
            budget_warn_pct: 80.0,
            cost_top_n: 20,
            bubble_top_n: 40,
            heatmap_top_n: 20,
        }
    }
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    db_path: String,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数仓文件路径
    pub fn new(db_path: impl Into<String>) -> Self {
        Self { db_path: db_path.into() }
    }

    /// 从 config_kv 表读取单个配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = connect(&self.db_path)?;
        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 读取全部 global 配置（原始字符串）
    fn load_all(&self) -> RepositoryResult<HashMap<String, String>> {
        let conn = connect(&self.db_path)?;
        let mut stmt = conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;

        let mut map = HashMap::new();
        for row in rows {
            let (key, value) = row?;
            map.insert(key, value);
        }
        Ok(map)
    }

    /// 获取全部生效配置
    ///
    /// # 返回
    /// - DashboardSettings: 库中的值覆盖默认值
    pub fn get_snapshot(&self) -> RepositoryResult<DashboardSettings> {
        let raw = self.load_all()?;
        let d = DashboardSettings::default();

        Ok(DashboardSettings {
            cache_ttl_secs: parse_or(&raw, config_keys::CACHE_TTL_SECS, d.cache_ttl_secs),
            session_idle_secs: parse_or(&raw, config_keys::SESSION_IDLE_SECS, d.session_idle_secs),
            quota_good_pct: parse_or(&raw, config_keys::QUOTA_GOOD_PCT, d.quota_good_pct),
            quota_warn_pct: parse_or(&raw, config_keys::QUOTA_WARN_PCT, d.quota_warn_pct),
            quota_min_samples: parse_or(&raw, config_keys::QUOTA_MIN_SAMPLES, d.quota_min_samples),
            budget_warn_pct: parse_or(&raw, config_keys::BUDGET_WARN_PCT, d.budget_warn_pct),
            cost_top_n: parse_or(&raw, config_keys::COST_TOP_N, d.cost_top_n),
            bubble_top_n: parse_or(&raw, config_keys::BUBBLE_TOP_N, d.bubble_top_n),
            heatmap_top_n: parse_or(&raw, config_keys::HEATMAP_TOP_N, d.heatmap_top_n),
        })
    }

    /// 写入配置（UPSERT）
    ///
    /// # 参数
    /// - key: 必须是 config_keys::ALL 中的键
    /// - value: 必须能解析为非负数
    pub fn set_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        if !config_keys::ALL.contains(&key) {
            return Err(RepositoryError::ValidationError(format!("未知配置键: {}", key)));
        }
        let valid = value.trim().parse::<f64>().map(|v| v >= 0.0).unwrap_or(false);
        if !valid {
            return Err(RepositoryError::FieldValueError {
                field: key.to_string(),
                message: format!("需要非负数值, 实际为 {:?}", value),
            });
        }

        let conn = connect(&self.db_path)?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value.trim()],
        )?;
        tracing::info!(config_key = key, value = value.trim(), "配置已更新");
        Ok(())
    }
}

fn parse_or<T: FromStr + Copy>(raw: &HashMap<String, String>, key: &str, default: T) -> T {
    match raw.get(key) {
        None => default,
        Some(value) => value.trim().parse::<T>().unwrap_or_else(|_| {
            tracing::warn!(config_key = key, raw_value = %value, "配置格式错误，使用默认值");
            default
        }),
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 缓存 / 会话
    pub const CACHE_TTL_SECS: &str = "cache_ttl_secs";
    pub const SESSION_IDLE_SECS: &str = "session_idle_secs";

    // 定额页
    pub const QUOTA_GOOD_PCT: &str = "quota_good_pct";
    pub const QUOTA_WARN_PCT: &str = "quota_warn_pct";
    pub const QUOTA_MIN_SAMPLES: &str = "quota_min_samples";

    // 预算页
    pub const BUDGET_WARN_PCT: &str = "budget_warn_pct";

    // 成本页
    pub const COST_TOP_N: &str = "cost_top_n";
    pub const BUBBLE_TOP_N: &str = "bubble_top_n";
    pub const HEATMAP_TOP_N: &str = "heatmap_top_n";

    pub const ALL: &[&str] = &[
        CACHE_TTL_SECS,
        SESSION_IDLE_SECS,
        QUOTA_GOOD_PCT,
        QUOTA_WARN_PCT,
        QUOTA_MIN_SAMPLES,
        BUDGET_WARN_PCT,
        COST_TOP_N,
        BUBBLE_TOP_N,
        HEATMAP_TOP_N,
    ];
}
