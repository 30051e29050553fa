// ==========================================
// Trường Tồn 农场看板 - 启动配置
// ==========================================
// 来源: 环境变量（进程启动时读取一次）
// 运行期可调参数见 config_manager（config_kv 表）
// ==========================================

use anyhow::Context;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "FARM_DASH_DB_PATH";
pub const BIND_ENV: &str = "FARM_DASH_BIND";
pub const LOCALE_ENV: &str = "FARM_DASH_LOCALE";

pub const DEFAULT_BIND: &str = "127.0.0.1:8501";

/// 启动配置
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub db_path: String,
    pub bind_addr: SocketAddr,
    pub locale: String,
}

impl AppConfig {
    /// 从进程环境变量读取
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源读取（测试时避免修改进程环境）
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let db_path = non_empty(DB_PATH_ENV).unwrap_or_else(default_db_path);
        let bind_raw = non_empty(BIND_ENV).unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind_addr = bind_raw
            .parse::<SocketAddr>()
            .with_context(|| format!("{} 不是合法的监听地址: {}", BIND_ENV, bind_raw))?;
        let locale = non_empty(LOCALE_ENV).unwrap_or_else(|| crate::i18n::DEFAULT_LOCALE.to_string());

        Ok(Self {
            db_path,
            bind_addr,
            locale,
        })
    }
}

/// 默认数仓路径: <data_dir>/truong-ton-farm/warehouse.db
///
/// data_dir 不可用时使用当前目录
pub fn default_db_path() -> String {
    let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("truong-ton-farm")
        .join("warehouse.db")
        .to_string_lossy()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.bind_addr, DEFAULT_BIND.parse::<SocketAddr>().unwrap());
        assert_eq!(cfg.locale, "vi");
        assert!(cfg.db_path.ends_with("warehouse.db"));
    }

    #[test]
    fn test_overrides_and_blank_values() {
        let cfg = AppConfig::from_lookup(lookup(&[
            (DB_PATH_ENV, "/tmp/wh.db"),
            (BIND_ENV, "0.0.0.0:9000"),
            (LOCALE_ENV, "  "),
        ]))
        .unwrap();
        assert_eq!(cfg.db_path, "/tmp/wh.db");
        assert_eq!(cfg.bind_addr.port(), 9000);
        assert_eq!(cfg.locale, "vi");
    }

    #[test]
    fn test_invalid_bind_is_error() {
        let err = AppConfig::from_lookup(lookup(&[(BIND_ENV, "localhost")])).unwrap_err();
        assert!(err.to_string().contains(BIND_ENV));
    }
}
