// ==========================================
// Trường Tồn 农场看板 - 领域模型层
// ==========================================
// 职责: 定义维度实体、事实行、查询条件与枚举类型
// 红线: 不含数据访问逻辑,不含聚合逻辑
// ==========================================

pub mod budget;
pub mod cost;
pub mod dimension;
pub mod quota;
pub mod types;

// 重导出核心类型
pub use budget::BudgetLine;
pub use cost::{CostFilter, LaborCostRow, MaterialCostRow};
pub use dimension::{DateRange, Farm, FilterOptions, LotOption, LotTeamMap, TeamOption};
pub use quota::{QuotaFilter, QuotaRecord};
pub use types::{BudgetScope, DataKind, DrillDimension, Granularity, PageKey};
