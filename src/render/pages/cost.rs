// ==========================================
// Trường Tồn 农场看板 - 成本页
// ==========================================
// 区块顺序: KPI → 月度趋势 → 农场卡片 → 地块气泡 → 班组 → 旭日图 → 明细表
// 点击图表下钻; 农场卡片通过表单切换下钻
// ==========================================

use std::fmt::Write as _;

use serde_json::{json, Value};

use super::{clear_drill_button, date_fields, drill_badges, farm_field, plain_options, team_field};
use crate::api::query::{keys, QueryPairs};
use crate::api::CostDashboard;
use crate::domain::{DrillDimension, PageKey};
use crate::engine::cost::{FarmCard, MonthlyCost, NamedAmount, TableOptions};
use crate::i18n::{t, t_with_args};
use crate::render::chart::{self, categories, BarMode, Figure, Orientation};
use crate::render::format::{escape_html, format_pct, money, money_truncated, short_money};
use crate::render::html::{self, Cell, ClickDrill, Kpi, NavItem, Page, Row};
use crate::render::style::{
    farm_color, farm_icon, Palette, ACTIVE_COLOR, LABOR_COLOR, MATERIAL_COLOR, SUNBURST_COLORS,
    SUPPORT_COLOR,
};

const PAGE: PageKey = PageKey::Cost;
const PATH: &str = "/chi-phi";

fn click(dimension: DrillDimension) -> Option<ClickDrill> {
    Some(ClickDrill { page: PAGE, dimension })
}

/// 渲染成本页
pub fn render(view: &CostDashboard) -> String {
    let mut page = Page::new(&t("nav.cost"), NavItem::Cost);
    page.sidebar(sidebar(view));

    page.push(html::page_header("💰", "Chi Phí", &view.sidebar.date_range.label()));
    page.push(kpis(view));
    page.push(monthly_section(view));
    page.push(farm_section(view));
    page.push(lot_section(view));
    page.push(team_section(view));
    page.push(hierarchy_section(view));
    page.push(detail_section(view));
    page.push(lot_table(view));
    page.push(html::checkbox_submit_script());

    page.render()
}

// ==========================================
// 侧边栏
// ==========================================

fn sidebar(view: &CostDashboard) -> String {
    let sb = &view.sidebar;
    let fields = vec![
        farm_field(sb),
        date_fields(sb),
        html::multi_select(
            keys::LOT_TYPES,
            &t("sidebar.lot_types"),
            &plain_options(&sb.lot_types),
            &sb.selected_lot_types,
        ),
        html::multi_select(keys::LOTS, &t("sidebar.lots"), &plain_options(&sb.lots), &view.request.lots),
        team_field(sb, &view.request.teams),
        html::checkbox(keys::SUPPORT, &t("sidebar.include_support"), view.request.include_support),
    ];

    let mut out = html::filter_form(PATH, &fields);
    out.push_str(&drill_badges(PAGE, &view.drill));
    if !view.drill.is_empty() {
        out.push_str(&clear_drill_button(PAGE));
    }
    out.push_str(&html::refresh_button());
    out
}

// ==========================================
// KPI / 月度趋势
// ==========================================

fn kpis(view: &CostDashboard) -> String {
    let totals = &view.totals;
    html::kpi_row(&[
        Kpi::new("Tổng chi phí", format!("{} VND", short_money(totals.total)), "📊", Palette::GREEN),
        Kpi::new("Chi phí Công", format!("{} VND", short_money(totals.labor)), "👷", Palette::BLUE)
            .delta(format!("{} tổng", format_pct(totals.labor_share_pct)), true),
        Kpi::new("Chi phí Vật tư", format!("{} VND", short_money(totals.material)), "🧪", Palette::AMBER)
            .delta(format!("{} tổng", format_pct(totals.material_share_pct)), true),
        Kpi::new("Tổng số công", money(totals.labor_days), "🗓️", Palette::PURPLE).footnote("công · ngày"),
    ])
}

fn monthly_stack(trend: &[MonthlyCost], height: u32, title: &str) -> Figure {
    let x: Vec<&str> = trend.iter().map(|m| m.label.as_str()).collect();
    Figure::new(height)
        .trace(
            chart::bar("Công", categories(&x), trend.iter().map(|m| m.labor).collect(), Orientation::Vertical)
                .color(LABOR_COLOR)
                .hover("<b>%{x}</b><br>Công: %{y:,.0f} VND<extra></extra>"),
        )
        .trace(
            chart::bar("Vật tư", categories(&x), trend.iter().map(|m| m.material).collect(), Orientation::Vertical)
                .color(MATERIAL_COLOR)
                .hover("<b>%{x}</b><br>Vật tư: %{y:,.0f} VND<extra></extra>"),
        )
        .bar_mode(BarMode::Stack)
        .money_axis("yaxis")
        .title(title)
}

/// 水平排名柱（升序输入，最大值在顶部）
fn ranked_bar(items: &[NamedAmount], color: &str, title: &str, left_margin: u32, height: u32) -> Figure {
    let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
    let labels: Vec<String> = items.iter().map(|i| short_money(i.amount)).collect();
    Figure::new(height)
        .trace(
            chart::bar("", categories(&names), items.iter().map(|i| i.amount).collect(), Orientation::Horizontal)
                .color(color)
                .text(&labels, "inside")
                .text_font("#fff", 10)
                .hover("<b>%{y}</b><br>%{x:,.0f} VND<extra></extra>"),
        )
        .hide_legend()
        .money_axis("xaxis")
        .category_margin(left_margin)
        .title(title)
}

fn monthly_section(view: &CostDashboard) -> String {
    let trend = monthly_stack(&view.monthly, 300, "");
    let donut = Figure::new(300)
        .trace(chart::pie(
            vec!["Công".to_string(), "Vật tư".to_string()],
            vec![view.totals.labor, view.totals.material],
            vec![LABOR_COLOR, MATERIAL_COLOR],
            0.6,
        ))
        .layout(json!({ "showlegend": true, "legend": { "orientation": "h", "y": -0.1 } }));

    format!(
        "{}{}",
        html::section_header("Xu hướng theo tháng", "Công và Vật tư"),
        html::weighted_columns(&[
            (3, html::chart("monthly_trend", &trend, None)),
            (1, html::chart("cost_donut", &donut, None)),
        ])
    )
}

// ==========================================
// 农场
// ==========================================

fn farm_card(card: &FarmCard) -> String {
    let (border, background, badge) = if card.active {
        (
            ACTIVE_COLOR,
            Palette::AMBER_PALE,
            format!(
                r#"<span style="background:{a};color:#000;font-size:9px;font-weight:700;padding:2px 6px;border-radius:4px;margin-left:8px">ĐANG CHỌN</span>"#,
                a = ACTIVE_COLOR
            ),
        )
    } else {
        (Palette::BORDER, Palette::SURFACE, String::new())
    };
    let button = if card.active {
        "✕ Bỏ chọn".to_string()
    } else {
        format!("📊 Drill vào {}", card.farm_code)
    };

    format!(
        r#"<div style="background:{bg};border:1px solid {border};border-top:3px solid {accent};border-radius:8px;padding:16px 18px"><div style="font-size:13px;font-weight:600;color:{tx}">{icon} {farm}{badge}</div><div style="font-size:22px;font-weight:600;color:{tx};font-family:'DM Mono',monospace;margin:8px 0">{total} VND</div><div style="font-size:11px;color:{ts}">👷 Công <b style="color:{lc}">{lpct}</b> · 🧪 Vật tư <b style="color:{mc}">{mpct}</b></div><form method="post" action="/drill/{slug}/toggle-farm" style="margin-top:10px"><input type="hidden" name="value" value="{farm}"><button type="submit" class="btn">{button}</button></form></div>"#,
        bg = background,
        border = border,
        accent = if card.active { ACTIVE_COLOR } else { farm_color(&card.farm_code) },
        tx = Palette::TEXT,
        ts = Palette::TEXT_SUB,
        lc = LABOR_COLOR,
        mc = MATERIAL_COLOR,
        icon = farm_icon(&card.farm_code),
        farm = escape_html(&card.farm_code),
        badge = badge,
        total = short_money(card.total),
        lpct = format_pct(card.labor_pct),
        mpct = format_pct(card.material_pct),
        slug = PAGE.slug(),
        button = escape_html(&button),
    )
}

fn farm_section(view: &CostDashboard) -> String {
    let mut out = html::section_header("Theo Farm", "bấm nút dưới thẻ để drill");
    let cards: Vec<String> = view.farm_cards.iter().map(farm_card).collect();
    out.push_str(&html::columns(&cards));

    if let Some(bd) = &view.farm_breakdown {
        out.push_str(&html::focus_banner(&bd.farm_code));
        let trend = monthly_stack(&bd.trend, 280, &format!("Chi phí {} theo tháng", bd.farm_code));
        let teams = ranked_bar(&bd.top_teams, LABOR_COLOR, &format!("Top đội trong {}", bd.farm_code), 120, 280);
        out.push_str(&html::columns(&[
            html::chart("farm_trend", &trend, None),
            html::chart("farm_teams", &teams, None),
        ]));
    }
    out
}

// ==========================================
// 地块
// ==========================================

fn lot_section(view: &CostDashboard) -> String {
    let mut out = html::section_header("Theo Lô", "bubble chart: click để drill · x=công · y=vật tư · size=tổng");
    out.push_str(&html::tip(
        "Bubble to = tổng chi phí cao · Vị trí nằm gần trục Y = nhiều vật tư · Gần trục X = nhiều công",
    ));

    let bubbles = &view.lot_bubbles;
    let colors: Vec<&str> = bubbles
        .iter()
        .map(|b| if b.active { ACTIVE_COLOR } else { farm_color(&b.farm_code) })
        .collect();
    let highlighted: Vec<bool> = bubbles.iter().map(|b| b.active).collect();
    let customdata: Vec<Value> = bubbles
        .iter()
        .map(|b| json!([b.lo_code, b.farm_code, b.total]))
        .collect();
    let fig = Figure::new(480)
        .trace(
            chart::bubble(
                "Lô",
                bubbles.iter().map(|b| b.labor).collect(),
                bubbles.iter().map(|b| b.material).collect(),
                bubbles.iter().map(|b| b.size).collect(),
                colors,
                &highlighted,
                bubbles.iter().map(|b| b.lo_code.clone()).collect(),
            )
            .customdata(customdata)
            .hover("<b>Lô %{customdata[0]}</b> · %{customdata[1]}<br>Công: %{x:,.0f} VND<br>Vật tư: %{y:,.0f} VND<br>Tổng: %{customdata[2]:,.0f} VND<extra></extra>"),
        )
        .hide_legend()
        .money_axis("xaxis")
        .money_axis("yaxis")
        .layout(json!({
            "xaxis": { "title": { "text": "Chi phí Công (VND)" } },
            "yaxis": { "title": { "text": "Chi phí Vật tư (VND)" } },
        }))
        .title("Chi phí Công vs Vật tư theo Lô (click bubble để drill)");
    out.push_str(&html::chart("lot_bubble", &fig, click(DrillDimension::Lot)));

    if let Some(bd) = &view.lot_breakdown {
        out.push_str(&html::focus_banner(&format!("{} · Lô {}", bd.farm_code, bd.lo_code)));
        let trend = monthly_stack(&bd.trend, 280, &format!("Lô {} — chi phí theo tháng", bd.lo_code));
        let stages = ranked_bar(&bd.top_stages, LABOR_COLOR, &format!("Công đoạn trong Lô {}", bd.lo_code), 140, 280);
        out.push_str(&html::columns(&[
            html::chart("lot_trend", &trend, None),
            html::chart("lot_stages", &stages, None),
        ]));
    }
    out
}

// ==========================================
// 班组
// ==========================================

fn team_section(view: &CostDashboard) -> String {
    let mut out = html::section_header("Theo Đội", "click thanh để drill");
    let teams = &view.team_split;
    let names: Vec<&str> = teams.iter().map(|s| s.doi_code.as_str()).collect();
    let own_colors: Vec<&str> = teams
        .iter()
        .map(|s| if s.active { ACTIVE_COLOR } else { LABOR_COLOR })
        .collect();
    let longest = names.iter().map(|n| n.chars().count()).max().unwrap_or(0) as u32;
    let height = (teams.len() as u32 * 26).max(400);

    let fig = Figure::new(height)
        .trace(
            chart::bar("Chính chủ", categories(&names), teams.iter().map(|s| s.own).collect(), Orientation::Horizontal)
                .colors(&own_colors)
                .hover("<b>%{y}</b><br>Chính chủ: %{x:,.0f} VND<extra></extra>"),
        )
        .trace(
            chart::bar("Hỗ trợ", categories(&names), teams.iter().map(|s| s.support).collect(), Orientation::Horizontal)
                .color(SUPPORT_COLOR)
                .opacity(0.7)
                .hover("<b>%{y}</b><br>Hỗ trợ: %{x:,.0f} VND<extra></extra>"),
        )
        .bar_mode(BarMode::Stack)
        .money_axis("xaxis")
        .category_margin((longest * 7).max(80))
        .title("Chi phí Công theo Đội — Chính chủ / Hỗ trợ");
    out.push_str(&html::chart("team_bar", &fig, click(DrillDimension::Team)));

    if let Some(bd) = &view.team_breakdown {
        out.push_str(&html::focus_banner(&format!("Đội {}", bd.doi_code)));
        let farms: Vec<&str> = bd.by_farm.iter().map(|f| f.name.as_str()).collect();
        let farm_colors: Vec<&str> = farms.iter().map(|f| farm_color(f)).collect();
        let labels: Vec<String> = bd.by_farm.iter().map(|f| short_money(f.amount)).collect();
        let by_farm = Figure::new(260)
            .trace(
                chart::bar("", categories(&farms), bd.by_farm.iter().map(|f| f.amount).collect(), Orientation::Vertical)
                    .colors(&farm_colors)
                    .text(&labels, "outside")
                    .text_font(Palette::TEXT_SUB, 11)
                    .hover("<b>%{x}</b><br>%{y:,.0f} VND<extra></extra>"),
            )
            .hide_legend()
            .money_axis("yaxis")
            .title(&format!("Đội {} theo Farm", bd.doi_code));

        let months: Vec<&str> = bd.trend.iter().map(|m| m.label.as_str()).collect();
        let trend = Figure::new(260)
            .trace(
                chart::line("", categories(&months), bd.trend.iter().map(|m| Some(m.amount)).collect(), LABOR_COLOR)
                    .fill_to_zero("rgba(63,185,80,0.08)")
                    .hover("<b>%{x}</b><br>%{y:,.0f} VND<extra></extra>"),
            )
            .hide_legend()
            .money_axis("yaxis")
            .title(&format!("Đội {} — xu hướng tháng", bd.doi_code));

        out.push_str(&html::columns(&[
            html::chart("team_farms", &by_farm, None),
            html::chart("team_trend", &trend, None),
        ]));
    }
    out
}

// ==========================================
// 旭日图
// ==========================================

fn hierarchy_section(view: &CostDashboard) -> String {
    let mut out = html::section_header("Cơ cấu chi phí chi tiết", "click mảnh để zoom · click giữa để quay lại");

    let labor = if view.labor_hierarchy.is_empty() {
        html::notice(html::NoticeKind::Info, "Không có dữ liệu công đoạn.")
    } else {
        let fig = Figure::new(420)
            .trace(
                chart::sunburst(&view.labor_hierarchy, &SUNBURST_COLORS)
                    .hover("<b>%{label}</b><br>%{value:,.0f} VND<extra></extra>"),
            )
            .title("Chi phí Công: Farm → Đội → Công đoạn");
        html::chart("labor_sunburst", &fig, None)
    };

    let material = if view.material_hierarchy.is_empty() {
        html::notice(html::NoticeKind::Info, "Không có dữ liệu vật tư.")
    } else {
        let reversed: Vec<&str> = SUNBURST_COLORS.iter().rev().copied().collect();
        let fig = Figure::new(420)
            .trace(
                chart::sunburst(&view.material_hierarchy, &reversed)
                    .hover("<b>%{label}</b><br>%{value:,.0f} VND<extra></extra>"),
            )
            .title("Chi phí Vật tư: Farm → Lô → Loại vật tư");
        html::chart("material_sunburst", &fig, None)
    };

    out.push_str(&html::columns(&[labor, material]));
    out
}

// ==========================================
// 明细表
// ==========================================

/// 表内筛选表单：携带页面其余查询参数（去掉本表自己的字段）
fn table_filter_form(summary: &str, own_prefix: &str, query: &QueryPairs, fields: &[String], open: bool) -> String {
    let hidden: Vec<(&str, String)> = query
        .iter()
        .filter(|(k, _)| !k.starts_with(own_prefix))
        .map(|(k, v)| (*k, v.clone()))
        .collect();
    let mut form = format!(r#"<form method="get" action="{}">"#, PATH);
    form.push_str(&html::hidden_fields(&hidden));
    form.push_str(r#"<div class="row">"#);
    for f in fields {
        let _ = write!(form, r#"<div class="col">{}</div>"#, f);
    }
    let _ = write!(
        form,
        r#"</div><div style="margin-top:8px"><button type="submit" class="btn">{}</button></div></form>"#,
        escape_html(&t("sidebar.apply"))
    );
    html::details(summary, &form, open)
}

fn showing_caption(shown: usize, total: usize, top: usize) -> String {
    html::caption(&t_with_args(
        "table.showing_rows",
        &[
            ("shown", &shown.to_string()),
            ("total", &total.to_string()),
            ("top", &top.to_string()),
        ],
    ))
}

fn pct2(value: f64) -> String {
    format!("{:.2}%", value)
}

fn work_table(view: &CostDashboard, query: &QueryPairs) -> String {
    let mut out = html::tip(&format!("Công việc chi tiết theo Lô — {}", view.work_scope));
    let filter = &view.request.work_filter;
    let TableOptions { farms, teams, lots, categories: stages } = &view.work_table.options;
    let fields = vec![
        html::multi_select(keys::WORK_FARMS, "Farm", &plain_options(farms), &filter.farms),
        html::multi_select(keys::WORK_TEAMS, "Đội", &plain_options(teams), &filter.teams),
        html::multi_select(keys::WORK_LOTS, "Lô", &plain_options(lots), &filter.lots),
        html::multi_select(keys::WORK_STAGES, "Hạng mục", &plain_options(stages), &filter.categories),
        html::text_input(
            keys::WORK_SEARCH,
            "Tìm tên công việc",
            filter.search.as_deref().unwrap_or(""),
            "Nhập từ khoá...",
        ),
    ];
    let filtered = !filter.farms.is_empty()
        || !filter.teams.is_empty()
        || !filter.lots.is_empty()
        || !filter.categories.is_empty()
        || filter.search.is_some();
    out.push_str(&table_filter_form("🔽 Lọc bảng Công việc", "w_", query, &fields, filtered));

    let page = &view.work_table;
    if page.rows.is_empty() && page.total_matched == 0 && !filtered {
        out.push_str(&html::notice(html::NoticeKind::Info, "Không có dữ liệu công việc."));
        return out;
    }
    out.push_str(&showing_caption(page.rows.len(), page.total_matched, page.top_n));
    let rows: Vec<Row> = page
        .rows
        .iter()
        .map(|r| {
            Row::new(vec![
                Cell::text(&r.farm_code),
                Cell::text(&r.doi_code),
                Cell::text(&r.lo_code),
                Cell::text(&r.ten_cong_viec),
                Cell::text(&r.cong_doan),
                Cell::num(money_truncated(r.amount)),
                Cell::num(pct2(r.pct)),
            ])
        })
        .collect();
    out.push_str(&html::table(
        &["Farm", "Đội", "Lô", "Công việc", "Hạng mục", "Chi phí (VND)", "% tổng Công"],
        &rows,
    ));
    out
}

fn material_table(view: &CostDashboard, query: &QueryPairs) -> String {
    let doi_note = match view.team_lot_count {
        Some(0) => " · đội này không có lô trong dim_lo_doi".to_string(),
        Some(n) => format!(" · qua {} lô của đội này", n),
        None => String::new(),
    };
    let mut out = html::tip(&format!("Vật tư chi tiết theo Lô — {}{}", view.material_scope, doi_note));
    let filter = &view.request.material_filter;
    let options = &view.material_table.options;
    let fields = vec![
        html::multi_select(keys::MATERIAL_FARMS, "Farm", &plain_options(&options.farms), &filter.farms),
        html::multi_select(
            keys::MATERIAL_KINDS,
            "Loại vật tư",
            &plain_options(&options.categories),
            &filter.categories,
        ),
        html::multi_select(keys::MATERIAL_LOTS, "Lô", &plain_options(&options.lots), &filter.lots),
        html::text_input(
            keys::MATERIAL_SEARCH,
            "Tìm tên vật tư",
            filter.search.as_deref().unwrap_or(""),
            "Nhập từ khoá...",
        ),
    ];
    let filtered = !filter.farms.is_empty()
        || !filter.lots.is_empty()
        || !filter.categories.is_empty()
        || filter.search.is_some();
    out.push_str(&table_filter_form("🔽 Lọc bảng Vật tư", "m_", query, &fields, filtered));

    let page = &view.material_table;
    if page.rows.is_empty() && page.total_matched == 0 && !filtered {
        out.push_str(&html::notice(html::NoticeKind::Info, "Không có dữ liệu vật tư."));
        return out;
    }
    out.push_str(&showing_caption(page.rows.len(), page.total_matched, page.top_n));
    let rows: Vec<Row> = page
        .rows
        .iter()
        .map(|r| {
            Row::new(vec![
                Cell::text(&r.farm_code),
                Cell::text(&r.lo_code),
                Cell::text(&r.ten_vat_tu),
                Cell::text(&r.loai_vat_tu),
                Cell::num(money_truncated(r.amount)),
                Cell::num(pct2(r.pct)),
            ])
        })
        .collect();
    out.push_str(&html::table(
        &["Farm", "Lô", "Tên vật tư", "Loại", "Chi phí (VND)", "% tổng Vật tư"],
        &rows,
    ));
    out
}

fn detail_section(view: &CostDashboard) -> String {
    let query = view.request.to_query();
    format!(
        "{}{}<div style=\"margin-top:28px\"></div>{}",
        html::section_header(
            "Chi tiết hạng mục chi phí",
            "top 20 · click tiêu đề cột để sort · tự lọc theo drill đang bật"
        ),
        work_table(view, &query),
        material_table(view, &query),
    )
}

fn lot_table(view: &CostDashboard) -> String {
    let rows: Vec<Row> = view
        .lot_table
        .iter()
        .map(|r| {
            Row::new(vec![
                Cell::text(&r.farm_code),
                Cell::text(&r.lo_code),
                Cell::num(money(r.labor)),
                Cell::num(money(r.material)),
                Cell::num(money(r.total)),
            ])
        })
        .collect();
    html::details(
        "📋 Bảng chi tiết theo Lô",
        &html::table(&["Farm", "Lô", "Công", "Vật tư", "Tổng"], &rows),
        false,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(active: bool) -> FarmCard {
        FarmCard {
            farm_code: "Farm 126".into(),
            labor: 3_000_000.0,
            material: 1_000_000.0,
            total: 4_000_000.0,
            labor_pct: Some(75.0),
            material_pct: Some(25.0),
            active,
        }
    }

    #[test]
    fn test_farm_card_toggle_form() {
        let html = farm_card(&card(false));
        assert!(html.contains(r#"action="/drill/chi-phi/toggle-farm""#));
        assert!(html.contains(r#"name="value" value="Farm 126""#));
        assert!(html.contains("📊 Drill vào Farm 126"));
        assert!(!html.contains("ĐANG CHỌN"));
        assert!(html.contains("75.0%"));
    }

    #[test]
    fn test_active_farm_card_is_highlighted() {
        let html = farm_card(&card(true));
        assert!(html.contains("ĐANG CHỌN"));
        assert!(html.contains("✕ Bỏ chọn"));
        assert!(html.contains(Palette::AMBER_PALE));
    }

    #[test]
    fn test_table_filter_form_keeps_other_params() {
        let query: QueryPairs = vec![
            (keys::FARMS, "Farm 126".to_string()),
            (keys::WORK_SEARCH, "cỏ".to_string()),
            (keys::MATERIAL_SEARCH, "ure".to_string()),
        ];
        let html = table_filter_form("x", "w_", &query, &[], false);
        assert!(html.contains(r#"name="farms" value="Farm 126""#));
        assert!(html.contains(r#"name="m_q" value="ure""#));
        assert!(!html.contains(r#"name="w_q""#));
    }

    #[test]
    fn test_ranked_bar_keeps_input_order() {
        let items = vec![
            NamedAmount { name: "D02".into(), amount: 100.0 },
            NamedAmount { name: "D01".into(), amount: 300.0 },
        ];
        let json = ranked_bar(&items, LABOR_COLOR, "Top", 120, 280).to_json();
        assert!(json.contains(r#""y":["D02","D01"]"#));
        assert!(json.contains(r#""orientation":"h""#));
    }
}
