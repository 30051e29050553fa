// ==========================================
// Trường Tồn 农场看板 - 展示层
// ==========================================
// 职责: 视图模型 → Plotly 图表 JSON + HTML 页面
// 分层: format(数值文本) / style(调色板) / chart(图表) / html(组件) / pages(整页)
// ==========================================

pub mod chart;
pub mod format;
pub mod html;
pub mod pages;
pub mod style;

pub use chart::Figure;
pub use html::{NavItem, Page};
