// ==========================================
// Trường Tồn 农场看板 - 导入层
// ==========================================
// 职责: 把外部 CSV 写入数仓（目前只有 Farm 195 预算对比表）
// ==========================================

pub mod budget_csv;
pub mod error;

pub use budget_csv::{BudgetImporter, ImportSummary};
pub use error::{ImportError, ImportResult};
