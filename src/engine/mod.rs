// ==========================================
// Trường Tồn 农场看板 - 引擎层
// ==========================================
// 职责: 对已加载的行做聚合（求和/均值/中位数/占比/透视）
// 红线: Engine 不拼 SQL，不依赖 HTTP/HTML
// ==========================================

pub mod budget;
pub mod cost;
pub mod drill;
pub mod quota;
pub mod stats;
pub mod time_bucket;

pub use budget::{BudgetFilter, BudgetKpis, BudgetOptions, PctBand};
pub use cost::{CostTotals, TableFilter};
pub use quota::{QuotaBand, QuotaKpis};
pub use time_bucket::{resample, Bucket};
