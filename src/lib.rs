// ==========================================
// Trường Tồn 农场运营看板 - 核心库
// ==========================================
// 技术栈: axum + Rust + SQLite
// 系统定位: 经营分析看板 (只读数仓 → 聚合 → 图表)
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "vi");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 参数化 SQL
pub mod repository;

// 查询缓存 - TTL 记忆化
pub mod cache;

// 会话层 - 下钻选择状态
pub mod session;

// 引擎层 - 聚合计算
pub mod engine;

// 展示层 - 图表/HTML
pub mod render;

// 导入层 - 预算 CSV
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// SQL 性能统计
pub mod perf;

// 国际化
pub mod i18n;

// API 层 - 页面组装
pub mod api;

// 应用层 - HTTP 集成
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{BudgetScope, DataKind, DrillDimension, Granularity, PageKey};

// 领域实体
pub use domain::{
    BudgetLine, DateRange, Farm, FilterOptions, LaborCostRow, LotOption, MaterialCostRow,
    QuotaRecord, TeamOption,
};

// 会话
pub use session::{DrillSelection, SessionStore};

// API
pub use api::{ApiError, BudgetApi, CostApi, FilterApi, QuotaApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "Trường Tồn Farm Dashboard";

// 数仓 schema 版本
pub const DB_VERSION: &str = "v1";
