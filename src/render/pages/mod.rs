// ==========================================
// Trường Tồn 农场看板 - 整页渲染
// ==========================================
// 每个页面一个模块，输入为 API 视图模型，输出完整 HTML 文档
// 提示页/错误页在此统一生成
// ==========================================

pub mod budget;
pub mod cost;
pub mod home;
pub mod quota;

use super::format::escape_html;
use super::html::{self, NavItem, NoticeKind, Page};
use super::style::Palette;
use crate::api::query::keys;
use crate::api::{ApiError, Sidebar};
use crate::domain::PageKey;
use crate::i18n::t;
use crate::session::DrillSelection;

/// 字符串列表 → (值, 标签) 选项
pub(crate) fn plain_options<S: AsRef<str>>(items: &[S]) -> Vec<(String, String)> {
    items
        .iter()
        .map(|s| (s.as_ref().to_string(), s.as_ref().to_string()))
        .collect()
}

// ==========================================
// 成本页 / 定额页共用的侧边栏字段
// ==========================================

pub(crate) fn farm_field(sidebar: &Sidebar) -> String {
    let options: Vec<(String, String)> = sidebar
        .farms
        .iter()
        .map(|f| (f.farm_code.clone(), f.farm_code.clone()))
        .collect();
    html::multi_select(keys::FARMS, "Farm", &options, &sidebar.selected_farms)
}

pub(crate) fn date_fields(sidebar: &Sidebar) -> String {
    let min = sidebar.bounds.start.format("%Y-%m-%d").to_string();
    let max = sidebar.bounds.end.format("%Y-%m-%d").to_string();
    format!(
        "{}{}",
        html::date_input(
            keys::START,
            &t("sidebar.date_from"),
            &sidebar.date_range.start.format("%Y-%m-%d").to_string(),
            &min,
            &max
        ),
        html::date_input(
            keys::END,
            &t("sidebar.date_to"),
            &sidebar.date_range.end.format("%Y-%m-%d").to_string(),
            &min,
            &max
        ),
    )
}

pub(crate) fn team_field(sidebar: &Sidebar, selected: &[String]) -> String {
    let options: Vec<(String, String)> = sidebar
        .teams
        .iter()
        .map(|o| (o.value.clone(), o.label.clone()))
        .collect();
    html::multi_select(keys::TEAMS, &t("sidebar.teams"), &options, selected)
}

/// 侧边栏下钻徽章区（无下钻时为空）
pub(crate) fn drill_badges(page: PageKey, drill: &DrillSelection) -> String {
    let active = drill.active();
    if active.is_empty() {
        return String::new();
    }
    let mut out = format!(
        r#"<div style="font-size:11px;font-weight:600;color:{};text-transform:uppercase;letter-spacing:0.08em;margin:16px 0 6px">{}</div>"#,
        Palette::TEXT_MUTED,
        escape_html(&t("drill.active"))
    );
    for (dim, value) in active {
        out.push_str(&html::drill_badge(page, dim, value));
    }
    out
}

/// 清除下钻按钮（POST /drill/{page}/clear）
pub(crate) fn clear_drill_button(page: PageKey) -> String {
    format!(
        r#"<form method="post" action="/drill/{}/clear" style="margin:8px 0"><button type="submit" class="btn">✕ {}</button></form>"#,
        page.slug(),
        escape_html(&t("drill.clear"))
    )
}

// ==========================================
// 提示页 / 错误页
// ==========================================

fn nav_title(nav: NavItem) -> String {
    match nav {
        NavItem::Home => t("nav.home"),
        NavItem::Cost => t("nav.cost"),
        NavItem::Quota => t("nav.quota"),
        NavItem::Budget => t("nav.budget"),
    }
}

fn nav_path(nav: NavItem) -> &'static str {
    match nav {
        NavItem::Home => "/",
        NavItem::Cost => "/chi-phi",
        NavItem::Quota => "/dinh-muc",
        NavItem::Budget => "/du-toan",
    }
}

/// "警告 + 停止渲染" 页面
///
/// # 参数
/// - nav: 所在页面
/// - err: 提示类错误（is_notice）
/// - drill_page: 下钻导致的空结果时提供清除下钻按钮
pub fn notice_page(nav: NavItem, err: &ApiError, drill_page: Option<PageKey>) -> String {
    let mut page = Page::new(&nav_title(nav), nav);
    page.sidebar(format!(
        r#"<a class="btn" href="{}" style="display:inline-block;text-decoration:none;margin-top:8px">↺ {}</a>"#,
        nav_path(nav),
        escape_html(&t("sidebar.reset"))
    ));
    if let Some(drill_page) = drill_page {
        page.sidebar(clear_drill_button(drill_page));
    }
    page.sidebar(html::refresh_button());

    page.push(html::notice(NoticeKind::Warning, &err.user_message()));
    if let Some(drill_page) = drill_page {
        page.push(clear_drill_button(drill_page));
    }
    page.render()
}

/// 故障页面（HTTP 500）
pub fn error_page(nav: NavItem, err: &ApiError) -> String {
    let mut page = Page::new(&nav_title(nav), nav);
    page.sidebar(html::refresh_button());
    page.push(html::notice(NoticeKind::Error, &err.user_message()));
    page.render()
}

/// 404
pub fn not_found_page() -> String {
    let mut page = Page::new("404", NavItem::Home);
    page.push(html::notice(NoticeKind::Info, &t("error.not_found")));
    page.render()
}
