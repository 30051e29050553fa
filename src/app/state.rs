// ==========================================
// Trường Tồn 农场看板 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 所有 handler 通过 Arc<AppState> 共享
// ==========================================

use std::sync::Arc;
use std::time::Duration;

use crate::api::{BudgetApi, CostApi, FilterApi, QuotaApi};
use crate::cache::QueryCache;
use crate::config::{AppConfig, ConfigManager, DashboardSettings};
use crate::session::SessionStore;

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数仓路径
    pub db_path: String,

    /// 生效配置快照（启动时读取）
    pub settings: DashboardSettings,

    /// 查询缓存（刷新按钮清空）
    pub cache: Arc<QueryCache>,

    /// 下钻会话存储
    pub sessions: SessionStore,

    /// 侧边栏API
    pub filter_api: Arc<FilterApi>,

    /// 成本页API
    pub cost_api: Arc<CostApi>,

    /// 定额页API
    pub quota_api: Arc<QuotaApi>,

    /// 预算页API
    pub budget_api: Arc<BudgetApi>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - config: 启动配置
    ///
    /// # 返回
    /// - Ok(AppState): 应用状态实例
    /// - Err(String): 初始化错误
    ///
    /// # 说明
    /// config_kv 读取失败（表不存在/库不可读）时使用默认配置继续启动，
    /// 页面请求时再按数据库错误显示。
    pub fn new(config: &AppConfig) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", config.db_path);

        if config.db_path.trim().is_empty() {
            return Err("数据库路径为空".to_string());
        }

        let settings = match ConfigManager::new(config.db_path.clone()).get_snapshot() {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("读取 config_kv 失败，使用默认配置: {}", e);
                DashboardSettings::default()
            }
        };
        Ok(Self::with_settings(config.db_path.clone(), settings))
    }

    /// 以给定配置组装（测试使用）
    pub fn with_settings(db_path: String, settings: DashboardSettings) -> Self {
        let cache = Arc::new(QueryCache::new(
            &db_path,
            Duration::from_secs(settings.cache_ttl_secs),
        ));
        let sessions = SessionStore::new(Duration::from_secs(settings.session_idle_secs));

        let filter_api = Arc::new(FilterApi::new(cache.clone()));
        let cost_api = Arc::new(CostApi::new(cache.clone(), filter_api.clone(), settings.clone()));
        let quota_api = Arc::new(QuotaApi::new(cache.clone(), filter_api.clone(), settings.clone()));
        let budget_api = Arc::new(BudgetApi::new(cache.clone(), settings.clone()));

        tracing::info!(
            cache_ttl_secs = settings.cache_ttl_secs,
            session_idle_secs = settings.session_idle_secs,
            "AppState初始化完成"
        );

        Self {
            db_path,
            settings,
            cache,
            sessions,
            filter_api,
            cost_api,
            quota_api,
            budget_api,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_table_falls_back_to_defaults() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let config = AppConfig {
            db_path: tmp.path().to_string_lossy().to_string(),
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            locale: "vi".into(),
        };
        let state = AppState::new(&config).unwrap();
        assert_eq!(state.settings, DashboardSettings::default());
    }

    #[test]
    fn test_empty_db_path_is_rejected() {
        let config = AppConfig {
            db_path: "  ".into(),
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            locale: "vi".into(),
        };
        assert!(AppState::new(&config).is_err());
    }
}
