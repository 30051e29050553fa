// ==========================================
// Trường Tồn 农场看板 - 应用层
// ==========================================
// 职责: 共享状态 + axum 路由（HTML 页面、下钻、导出、JSON）
// ==========================================

pub mod routes;
pub mod state;

pub use routes::{build_router, SESSION_COOKIE};
pub use state::AppState;
