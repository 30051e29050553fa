// ==========================================
// Trường Tồn 农场看板 - API 层
// ==========================================
// 职责: 按页面组装视图模型，供 HTTP 层渲染或直接输出 JSON
// ==========================================

pub mod budget_api;
pub mod cost_api;
pub mod error;
pub mod filter_api;
pub mod query;
pub mod quota_api;

// 重导出核心类型
pub use budget_api::{BudgetApi, BudgetDashboard, BudgetRequest};
pub use cost_api::{CostApi, CostDashboard, CostRequest};
pub use error::{ApiError, ApiResult};
pub use filter_api::{FilterApi, SelectOption, Sidebar, SidebarRequest};
pub use query::{QueryPairs, QueryParams};
pub use quota_api::{QuotaApi, QuotaDashboard, QuotaRequest};
