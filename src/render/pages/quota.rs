// ==========================================
// Trường Tồn 农场看板 - 定额页
// ==========================================
// 区块顺序: KPI → 完成率趋势 → 农场 → 班组 & 地块 → 工作热力图 → 汇总表
// 只统计实地块; 完成率按 good/warn 阈值三档着色
// ==========================================

use serde_json::{json, Value};

use super::{clear_drill_button, date_fields, drill_badges, farm_field, plain_options, team_field};
use crate::api::query::keys;
use crate::api::QuotaDashboard;
use crate::domain::{DrillDimension, Granularity, PageKey};
use crate::engine::quota::RatioGroup;
use crate::i18n::t;
use crate::render::chart::{self, categories, Dash, Figure, Orientation};
use crate::render::format::{format_pct, thousands, MISSING};
use crate::render::html::{self, Cell, ClickDrill, Kpi, NavItem, Page, Row};
use crate::render::style::{
    quota_band_background, quota_band_color, Palette, ACTIVE_COLOR, HEATMAP_SCALE,
};

const PAGE: PageKey = PageKey::Quota;
const PATH: &str = "/dinh-muc";

/// 渲染定额页
pub fn render(view: &QuotaDashboard) -> String {
    let mut page = Page::new(&t("nav.quota"), NavItem::Quota);
    page.sidebar(sidebar(view));

    page.push(html::page_header(
        "📊",
        "Định Mức — Tỉ lệ hoàn thành công việc",
        &view.sidebar.date_range.label(),
    ));
    page.push(kpis(view));
    page.push(trend_section(view));
    page.push(farm_section(view));
    page.push(team_lot_section(view));
    page.push(heatmap_section(view));
    page.push(summary_table(view));
    page.push(html::checkbox_submit_script());

    page.render()
}

fn sidebar(view: &QuotaDashboard) -> String {
    let sb = &view.sidebar;
    let granularities: Vec<(String, String)> = Granularity::ALL
        .iter()
        .map(|g| (g.code().to_string(), g.label().to_string()))
        .collect();
    let fields = vec![
        farm_field(sb),
        date_fields(sb),
        html::select(
            keys::GRANULARITY,
            &t("sidebar.granularity"),
            &granularities,
            view.request.granularity.code(),
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

fn kpis(view: &QuotaDashboard) -> String {
    let k = &view.kpis;
    let mean_color = view.mean_band.map_or(Palette::TEXT_MUTED, quota_band_color);
    html::kpi_row(&[
        Kpi::new("Số lượt ghi nhận", thousands(k.count as i64), "📝", Palette::BLUE),
        Kpi::new("Tỉ lệ HT trung bình", format_pct(k.mean), "📈", mean_color),
        Kpi::new("Tỉ lệ HT trung vị", format_pct(k.median), "📊", Palette::PURPLE)
            .footnote("Ít bị ảnh hưởng bởi outlier"),
        Kpi::new("Trên 100% (vượt DM)", thousands(k.over_full as i64), "🏆", Palette::GREEN)
            .delta(format!("{:.1}% tổng", k.over_full_share), true),
    ])
}

// ==========================================
// 趋势
// ==========================================

fn trend_section(view: &QuotaDashboard) -> String {
    let trend = &view.trend;
    let x: Vec<&str> = trend.points.iter().map(|p| p.label.as_str()).collect();
    let good_label = format!("{:.0}%", view.good_pct);
    let fig = Figure::new(320)
        .trace(
            chart::line("Trung bình", categories(&x), trend.points.iter().map(|p| p.mean).collect(), Palette::GREEN)
                .fill_to_zero("rgba(63,185,80,0.08)")
                .hover("<b>%{x}</b><br>Trung bình: %{y:.1f}%<extra></extra>"),
        )
        .trace(
            chart::line("Trung vị", categories(&x), trend.points.iter().map(|p| p.median).collect(), Palette::AMBER)
                .dash(Dash::Dot)
                .hover("<b>%{x}</b><br>Trung vị: %{y:.1f}%<extra></extra>"),
        )
        .hline(100.0, Palette::BORDER2, Dash::Dash, Some("100% (đạt định mức)"))
        .hline(view.good_pct, Palette::BLUE, Dash::Dot, Some(&good_label))
        .layout(json!({ "yaxis": { "ticksuffix": "%", "range": [0.0, trend.y_max] } }));

    format!(
        "{}{}",
        html::section_header(
            &format!(
                "Biến động tỉ lệ hoàn thành theo {}",
                trend.granularity.label().to_lowercase()
            ),
            "median ít outlier hơn mean khi có dữ liệu bất thường",
        ),
        html::chart("quota_trend", &fig, None)
    )
}

// ==========================================
// 农场 / 班组 / 地块
// ==========================================

/// 分组柱颜色：下钻选中项琥珀色，其余按分档
fn group_colors(view: &QuotaDashboard, groups: &[RatioGroup], active: Option<&str>) -> Vec<&'static str> {
    groups
        .iter()
        .map(|g| {
            if active == Some(g.drill_value.as_str()) {
                ACTIVE_COLOR
            } else {
                quota_band_color(view.band_of(g.mean))
            }
        })
        .collect()
}

/// 点击映射: customdata = [下钻值, 记录数]
fn group_customdata(groups: &[RatioGroup]) -> Vec<Value> {
    groups.iter().map(|g| json!([g.drill_value, g.count])).collect()
}

fn farm_section(view: &QuotaDashboard) -> String {
    let groups = &view.by_farm;
    let labels: Vec<&str> = groups.iter().map(|g| g.label.as_str()).collect();
    let texts: Vec<String> = groups
        .iter()
        .map(|g| format!("{:.1}%<br>({} lượt)", g.mean, thousands(g.count as i64)))
        .collect();
    let fig = Figure::new(260)
        .trace(
            chart::bar("", categories(&labels), groups.iter().map(|g| g.mean).collect(), Orientation::Vertical)
                .colors(&group_colors(view, groups, view.drill.farm.as_deref()))
                .customdata(group_customdata(groups))
                .text(&texts, "outside")
                .text_font(Palette::TEXT_SUB, 11)
                .hover("<b>%{x}</b><br>Trung bình: %{y:.1f}%<extra></extra>"),
        )
        .hide_legend()
        .hline(100.0, Palette::BORDER2, Dash::Dash, None)
        .hline(view.good_pct, Palette::BLUE, Dash::Dot, None)
        .layout(json!({ "yaxis": { "ticksuffix": "%", "range": [0.0, view.farm_axis_max] } }));

    format!(
        "{}{}",
        html::section_header("Trung bình tỉ lệ hoàn thành theo Farm", "click để drill"),
        html::chart("quota_farm", &fig, Some(ClickDrill { page: PAGE, dimension: DrillDimension::Farm }))
    )
}

fn ratio_hbar(view: &QuotaDashboard, groups: &[RatioGroup], active: Option<&str>, title: &str, axis_max: f64, height: u32) -> Figure {
    let labels: Vec<&str> = groups.iter().map(|g| g.label.as_str()).collect();
    let texts: Vec<String> = groups.iter().map(|g| format!("{:.1}%", g.mean)).collect();
    Figure::new(height)
        .trace(
            chart::bar("", categories(&labels), groups.iter().map(|g| g.mean).collect(), Orientation::Horizontal)
                .colors(&group_colors(view, groups, active))
                .customdata(group_customdata(groups))
                .text(&texts, "outside")
                .text_font(Palette::TEXT_SUB, 10)
                .hover("<b>%{y}</b><br>Trung bình: %{x:.1f}%<br>(%{customdata[1]:,} lượt)<extra></extra>"),
        )
        .hide_legend()
        .vline(100.0, Palette::BORDER2, Dash::Dash, None)
        .vline(view.good_pct, Palette::BLUE, Dash::Dot, None)
        .category_margin(80)
        .layout(json!({ "xaxis": { "ticksuffix": "%", "range": [0.0, axis_max] } }))
        .title(title)
}

fn team_lot_section(view: &QuotaDashboard) -> String {
    let teams = ratio_hbar(view, &view.by_team, view.drill.team.as_deref(), "Theo Đội", view.team_axis_max, 400);
    let lot_height = (view.by_lot.len() as u32 * 20).max(400);
    let lots = ratio_hbar(
        view,
        &view.by_lot,
        view.drill.lot.as_deref(),
        "Theo Lô (click để drill)",
        view.lot_axis_max,
        lot_height,
    );

    let team_html = if view.by_team.is_empty() {
        html::notice(html::NoticeKind::Info, &t("notice.no_data"))
    } else {
        html::chart("quota_team", &teams, Some(ClickDrill { page: PAGE, dimension: DrillDimension::Team }))
    };
    let lot_html = if view.by_lot.is_empty() {
        html::notice(html::NoticeKind::Info, &t("notice.no_data"))
    } else {
        html::chart("quota_lot", &lots, Some(ClickDrill { page: PAGE, dimension: DrillDimension::Lot }))
    };

    format!(
        "{}{}",
        html::section_header("Theo Đội & Theo Lô", "click để drill · gộp xuyên farm"),
        html::columns(&[team_html, lot_html])
    )
}

// ==========================================
// 热力图 / 汇总表
// ==========================================

fn heatmap_section(view: &QuotaDashboard) -> String {
    let hm = &view.heatmap;
    let height = (hm.works.len() as u32 * 24).max(380);
    let fig = Figure::new(height)
        .trace(
            chart::heatmap(hm.months.clone(), hm.works.clone(), hm.cells.clone(), &HEATMAP_SCALE, 0.0, 150.0)
                .hover("<b>%{y}</b><br>%{x}<br>Tỉ lệ HT: %{z:.1f}%<extra></extra>"),
        )
        .category_margin(160);

    format!(
        "{}{}",
        html::section_header(
            "Tỉ lệ hoàn thành theo Công việc & Thời gian",
            "màu xanh = đạt cao, đỏ = thấp · hover để xem chi tiết",
        ),
        html::chart("quota_heatmap", &fig, None)
    )
}

fn summary_table(view: &QuotaDashboard) -> String {
    let rows: Vec<Row> = view
        .summary
        .iter()
        .map(|r| {
            Row::new(vec![
                Cell::text(r.ma_cv.clone().unwrap_or_else(|| MISSING.to_string())),
                Cell::text(&r.ten_cong_viec),
                Cell::num(thousands(r.count as i64)),
                Cell::num(format!("{:.1}", r.mean)),
                Cell::num(format!("{:.1}", r.min)),
                Cell::num(format!("{:.1}", r.max)),
                Cell::num(format!("{:.1}", r.median)),
                Cell::num(format!("{:.1}", r.total_labor_days)),
            ])
            .background(quota_band_background(view.band_of(r.mean)))
        })
        .collect();
    html::details(
        "📋 Bảng tổng hợp theo Công việc",
        &html::table(
            &["Mã", "Công việc", "Lượt", "TB %", "Min %", "Max %", "Trung vị %", "Tổng công"],
            &rows,
        ),
        false,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(label: &str, drill_value: &str, mean: f64) -> RatioGroup {
        RatioGroup {
            label: label.into(),
            drill_value: drill_value.into(),
            mean,
            count: 4,
        }
    }

    #[test]
    fn test_group_customdata_carries_drill_value() {
        let data = group_customdata(&[group("F126 · A1", "A1", 85.0)]);
        assert_eq!(data, vec![json!(["A1", 4])]);
    }
}
