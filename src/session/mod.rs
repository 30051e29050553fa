// ==========================================
// Trường Tồn 农场看板 - 会话层
// ==========================================
// 只保存界面选择状态（下钻），不保存任何业务数据
// ==========================================

pub mod drill;
pub mod store;

pub use drill::{DrillSelection, ALL_SCOPE_LABEL};
pub use store::{SessionId, SessionStore};
