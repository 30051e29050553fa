// ==========================================
// Trường Tồn 农场看板 - 预算对比页 (Farm 195)
// ==========================================
// 区块顺序: KPI → 差额横幅 → 科目对比 → 月度趋势 → 类别页签 → 预算外 → 汇总表
// 实现率只统计预算内; 预算外单独成区
// ==========================================

use serde_json::json;

use super::plain_options;
use crate::api::query::keys;
use crate::api::{BudgetDashboard, BudgetRequest};
use crate::engine::budget::{pct_band, CategoryTab, LineItemRow, PctBand};
use crate::i18n::t;
use crate::render::chart::{self, categories, BarMode, Dash, Figure, Orientation};
use crate::render::format::{escape_html, format_pct, money_truncated, short_money_signed, signed_money, MISSING};
use crate::render::html::{self, Cell, Kpi, NavItem, Page, Row};
use crate::render::style::{category_color, pct_band_color, Palette};

const PATH: &str = "/du-toan";
const EXPORT_PATH: &str = "/du-toan/export.csv";

fn vnd(value: f64) -> String {
    format!("{} VND", short_money_signed(Some(value)))
}

/// 渲染预算对比页
pub fn render(view: &BudgetDashboard) -> String {
    let mut page = Page::new(&t("nav.budget"), NavItem::Budget);
    page.sidebar(sidebar(view));

    page.push(html::page_header(
        "🎯",
        "So Sánh Thành Tiền vs Dự Toán — Farm 195",
        "Nguồn: fact_195_tong · chỉ tính nhóm Trong dự toán cho % thực hiện",
    ));
    page.push(kpis(view));
    page.push(variance_banner(view));
    page.push(line_item_section(view));
    page.push(monthly_section(view));
    page.push(category_section(view));
    page.push(out_of_budget_section(view));
    page.push(pivot_section(view));
    page.push(html::checkbox_submit_script());

    page.render()
}

/// 当前筛选对应的查询串（导出链接用）
fn current_query(view: &BudgetDashboard) -> Vec<(&'static str, String)> {
    BudgetRequest {
        categories: Some(view.filter.categories.clone()),
        months: Some(view.filter.months.clone()),
        scopes: Some(view.filter.scopes.clone()),
        line_items: view.filter.line_items.clone(),
    }
    .to_query()
}

// ==========================================
// 侧边栏
// ==========================================

fn sidebar(view: &BudgetDashboard) -> String {
    let opts = &view.options;
    let scopes: Vec<(String, String)> = opts
        .scopes
        .iter()
        .map(|s| (s.as_str().to_string(), s.as_str().to_string()))
        .collect();
    let selected_scopes: Vec<String> = view.filter.scopes.iter().map(|s| s.as_str().to_string()).collect();
    let fields = vec![
        html::multi_select(
            keys::CATEGORIES,
            "Loại chi phí",
            &plain_options(&opts.categories),
            &view.filter.categories,
        ),
        html::multi_select(keys::MONTHS, "Tháng", &plain_options(&opts.months), &view.filter.months),
        html::multi_select(keys::SCOPES, "Phân loại dự toán", &scopes, &selected_scopes),
        html::multi_select(
            keys::ITEMS,
            "Hạng mục",
            &plain_options(&opts.line_items),
            &view.filter.line_items,
        ),
        html::caption("Để trống = tất cả"),
    ];

    let mut out = html::filter_form(PATH, &fields);
    out.push_str(&format!(
        r#"<hr style="margin:12px 0"><div style="font-size:11px;color:{tm};line-height:1.8">📌 <b style="color:{g}">Xanh</b>: ≤ 100% DT (tiết kiệm/đúng)<br>📌 <b style="color:{r}">Đỏ</b>: &gt; 100% DT (vượt ngân sách)<br>📌 <b style="color:{a}">Vàng</b>: &lt; {warn:.0}% DT (chưa giải ngân)<br>📌 <b style="color:{tm}">Xám</b>: Ngoài dự toán (không có kế hoạch)</div>"#,
        tm = Palette::TEXT_MUTED,
        g = Palette::GREEN,
        r = Palette::RED,
        a = Palette::AMBER,
        warn = view.warn_pct,
    ));
    out.push_str(&html::refresh_button());
    out
}

// ==========================================
// KPI / 差额
// ==========================================

fn kpis(view: &BudgetDashboard) -> String {
    let k = &view.kpis;
    let band = pct_band(k.pct, view.warn_pct);
    let pct_kpi = Kpi::new("% Thực hiện", format_pct(k.pct), "📊", pct_band_color(band));
    let pct_kpi = match k.pct {
        Some(p) if p <= 100.0 => pct_kpi.delta("✅ Trong ngân sách", true),
        Some(_) => pct_kpi.delta("⚠️ Vượt ngân sách", false),
        None => pct_kpi,
    };
    html::kpi_row(&[
        Kpi::new("Thực tế (Trong DT)", vnd(k.actual_in), "💰", Palette::GREEN)
            .footnote("tổng thành tiền có kế hoạch DT"),
        Kpi::new("Dự toán kế hoạch", vnd(k.planned_in), "📋", Palette::BLUE).footnote("ngân sách phân bổ"),
        pct_kpi,
        Kpi::new("Phát sinh Ngoài DT", vnd(k.actual_out), "⚠️", Palette::AMBER)
            .footnote("chi phí không có trong kế hoạch"),
    ])
}

fn variance_banner(view: &BudgetDashboard) -> String {
    let k = &view.kpis;
    let (bg, color, label) = if k.is_over() {
        (Palette::RED_PALE, Palette::RED, "🔴 Vượt")
    } else {
        (Palette::GREEN_PALE, Palette::GREEN, "🟢 Tiết kiệm")
    };
    let sign = if k.variance > 0.0 { "+" } else { "" };
    html::banner(
        bg,
        color,
        &format!(
            r#"<div style="display:flex;gap:24px;align-items:center"><div style="font-size:20px">{label}</div><div><span style="font-size:12px;color:{tm}">Chênh lệch Thực tế − Dự toán (Trong DT):</span><span style="font-size:18px;font-weight:700;color:{color};font-family:'DM Mono',monospace;margin-left:12px">{sign}{amount} VND</span></div></div>"#,
            label = label,
            tm = Palette::TEXT_MUTED,
            color = color,
            sign = sign,
            amount = short_money_signed(Some(k.variance)),
        ),
    )
}

// ==========================================
// 科目对比
// ==========================================

fn pct_text(row: &LineItemRow) -> String {
    row.pct.map(|p| format!("{:.0}%", p)).unwrap_or_default()
}

fn line_item_section(view: &BudgetDashboard) -> String {
    let mut out = html::section_header(
        "Thực tế vs Dự toán theo Hạng mục",
        "chỉ nhóm Trong dự toán · nhóm theo loại chi phí",
    );
    let rows = &view.line_items;
    if rows.is_empty() {
        out.push_str(&html::notice(html::NoticeKind::Info, &t("notice.no_data")));
        return out;
    }

    let labels: Vec<String> = rows.iter().map(LineItemRow::label).collect();
    let colors: Vec<&str> = rows.iter().map(|r| category_color(&r.category)).collect();
    let texts: Vec<String> = rows.iter().map(pct_text).collect();
    let fig = Figure::new(400)
        .trace(
            chart::bar("Dự toán", categories(&labels), rows.iter().map(|r| r.planned).collect(), Orientation::Vertical)
                .color(Palette::BORDER2)
                .opacity(0.5)
                .hover("<b>%{x}</b><br>Dự toán: %{y:,.0f} VND<extra></extra>"),
        )
        .trace(
            chart::bar("Thực tế", categories(&labels), rows.iter().map(|r| r.actual).collect(), Orientation::Vertical)
                .colors(&colors)
                .opacity(0.9)
                .text(&texts, "outside")
                .text_font(Palette::TEXT_SUB, 10)
                .hover("<b>%{x}</b><br>Thực tế: %{y:,.0f} VND<br>%{text} DT<extra></extra>"),
        )
        .bar_mode(BarMode::Overlay)
        .money_axis("yaxis")
        .layout(json!({ "xaxis": { "tickangle": -35, "automargin": true } }))
        .title("Thực tế (màu) chồng lên Dự toán (xám)");
    out.push_str(&html::chart("budget_items", &fig, None));

    out.push_str(&html::tip(
        "Thẻ bên dưới tóm tắt tỉ lệ thực hiện từng hạng mục · xanh = đúng ngân sách · đỏ = vượt",
    ));
    let cards: Vec<String> = view.progress_cards().map(progress_card).collect();
    for chunk in cards.chunks(4) {
        let mut row: Vec<String> = chunk.to_vec();
        row.resize(4, String::new());
        out.push_str(&html::columns(&row));
    }
    out
}

fn progress_card(row: &LineItemRow) -> String {
    let mut caption = format!(
        "{} · TT: {} · DT: {}",
        format_pct(row.pct),
        short_money_signed(Some(row.actual)),
        short_money_signed(Some(row.planned))
    );
    if row.overrun() > 0.0 {
        caption.push_str(&format!(" · ▲ Vượt {:.1}%", row.overrun()));
    }
    html::progress_card(
        &row.item,
        &row.category,
        row.bar_width(),
        pct_band_color(row.band),
        &caption,
        category_color(&row.category),
    )
}

// ==========================================
// 月度趋势
// ==========================================

fn monthly_section(view: &BudgetDashboard) -> String {
    let mut out = html::section_header(
        "Xu hướng tích lũy theo tháng",
        "so sánh tiến độ giải ngân thực tế với kế hoạch dự toán",
    );
    let rows = &view.monthly.rows;
    let months: Vec<&str> = rows.iter().map(|r| r.label.as_str()).collect();
    let bars = Figure::new(340)
        .trace(
            chart::bar("Dự toán", categories(&months), rows.iter().map(|r| r.planned).collect(), Orientation::Vertical)
                .color(Palette::BORDER2)
                .opacity(0.6)
                .hover("<b>%{x}</b><br>Dự toán: %{y:,.0f} VND<extra></extra>"),
        )
        .trace(
            chart::bar("Thực tế", categories(&months), rows.iter().map(|r| r.actual).collect(), Orientation::Vertical)
                .color(Palette::GREEN)
                .opacity(0.9)
                .hover("<b>%{x}</b><br>Thực tế: %{y:,.0f} VND<extra></extra>"),
        )
        .bar_mode(BarMode::Group)
        .money_axis("yaxis")
        .title("Thực tế vs Dự toán theo tháng (Trong DT)");

    let with_pct: Vec<_> = rows.iter().filter(|r| r.pct.is_some()).collect();
    let pct_months: Vec<&str> = with_pct.iter().map(|r| r.label.as_str()).collect();
    let pct_colors: Vec<&str> = with_pct.iter().map(|r| pct_band_color(r.band)).collect();
    let pct_labels: Vec<String> = with_pct.iter().map(|r| format_pct(r.pct)).collect();
    let mut pct_fig = Figure::new(340)
        .hline(100.0, Palette::BORDER2, Dash::Dash, Some("100%"))
        .hrect(100.0, view.monthly.pct_y_max.max(200.0), "rgba(248,81,73,0.04)")
        .hide_legend()
        .layout(json!({ "yaxis": { "ticksuffix": "%", "range": [0.0, view.monthly.pct_y_max] } }))
        .title("% Thực hiện theo tháng");
    if !with_pct.is_empty() {
        pct_fig = pct_fig.trace(
            chart::line(
                "% thực hiện",
                categories(&pct_months),
                with_pct.iter().map(|r| r.pct).collect(),
                Palette::GREEN,
            )
            .colors(&pct_colors)
            .text(&pct_labels, "top center")
            .text_font(Palette::TEXT_SUB, 11)
            .hover("<b>%{x}</b><br>% thực hiện: %{y:.1f}%<extra></extra>"),
        );
    }

    out.push_str(&html::columns(&[
        html::chart("budget_monthly", &bars, None),
        html::chart("budget_monthly_pct", &pct_fig, None),
    ]));
    out
}

// ==========================================
// 类别页签
// ==========================================

/// 类别内科目柱色：超支红，达到阈值用类别色，偏低琥珀，无预算灰
fn item_bar_color(row: &LineItemRow, category_accent: &'static str) -> &'static str {
    match row.band {
        PctBand::Over => Palette::RED,
        PctBand::OnTrack => category_accent,
        PctBand::Under => Palette::AMBER,
        PctBand::NoPlan => Palette::BORDER2,
    }
}

fn category_tab(index: usize, tab: &CategoryTab, warn_pct: f64) -> String {
    let accent = category_color(&tab.category);
    let pct_color = pct_band_color(pct_band(tab.pct, warn_pct));
    let variance_color = if tab.variance > 0.0 { Palette::RED } else { Palette::GREEN };
    let mini = html::kpi_row(&[
        Kpi::new("Thực tế", vnd(tab.actual), "", accent),
        Kpi::new("Dự toán", vnd(tab.planned), "", Palette::BLUE),
        Kpi::new("% Thực hiện", format_pct(tab.pct), "", pct_color),
        Kpi::new(
            "Chênh lệch",
            format!("{}{}", if tab.variance > 0.0 { "+" } else { "" }, vnd(tab.variance)),
            "",
            variance_color,
        ),
    ]);

    let items = &tab.items;
    let names: Vec<&str> = items.iter().map(|r| r.item.as_str()).collect();
    let colors: Vec<&str> = items.iter().map(|r| item_bar_color(r, accent)).collect();
    let texts: Vec<String> = items.iter().map(pct_text).collect();
    let fig = Figure::new((items.len() as u32 * 40).max(280))
        .trace(
            chart::bar("Dự toán", categories(&names), items.iter().map(|r| r.planned).collect(), Orientation::Horizontal)
                .color(Palette::BORDER2)
                .opacity(0.5)
                .hover("<b>%{y}</b><br>Dự toán: %{x:,.0f} VND<extra></extra>"),
        )
        .trace(
            chart::bar("Thực tế", categories(&names), items.iter().map(|r| r.actual).collect(), Orientation::Horizontal)
                .colors(&colors)
                .opacity(0.9)
                .text(&texts, "outside")
                .text_font(Palette::TEXT_SUB, 10)
                .hover("<b>%{y}</b><br>Thực tế: %{x:,.0f} VND · %{text}<extra></extra>"),
        )
        .bar_mode(BarMode::Overlay)
        .money_axis("xaxis")
        .category_margin(160)
        .title(&format!("{} — Thực tế vs Dự toán theo Hạng mục", tab.category));

    let rows: Vec<Row> = items
        .iter()
        .map(|r| {
            Row::new(vec![
                Cell::text(&r.item),
                Cell::num(short_money_signed(Some(r.actual))),
                Cell::num(short_money_signed(Some(r.planned))),
                Cell::num(r.pct.map_or_else(|| "Ngoài DT".to_string(), |p| format!("{:.1}%", p))),
            ])
        })
        .collect();

    format!(
        "{}<div style=\"margin-top:12px\"></div>{}",
        mini,
        html::weighted_columns(&[
            (3, html::chart(&format!("budget_tab_{}", index), &fig, None)),
            (2, html::table(&["Hạng mục", "Thực tế", "Dự toán", "% TH"], &rows)),
        ])
    )
}

fn category_section(view: &BudgetDashboard) -> String {
    let mut out = html::section_header(
        "Chi tiết theo Loại chi phí & Tháng",
        "nhóm Trong dự toán · mỗi tab = 1 loại chi phí",
    );
    if view.category_tabs.is_empty() {
        out.push_str(&html::notice(
            html::NoticeKind::Info,
            "Không có dữ liệu Trong dự toán với filter hiện tại.",
        ));
        return out;
    }
    let tabs: Vec<(String, String)> = view
        .category_tabs
        .iter()
        .enumerate()
        .map(|(i, tab)| (tab.category.clone(), category_tab(i, tab, view.warn_pct)))
        .collect();
    out.push_str(&html::tabs("loai", &tabs));
    out
}

// ==========================================
// 预算外
// ==========================================

fn out_of_budget_section(view: &BudgetDashboard) -> String {
    let mut out = html::section_header(
        "Chi phí Ngoài dự toán",
        "các khoản thực tế không có trong kế hoạch · dự toán luôn = 0",
    );
    let oob = &view.out_of_budget;
    if oob.is_empty() {
        out.push_str(&html::notice(
            html::NoticeKind::Info,
            "Không có chi phí Ngoài dự toán với filter hiện tại.",
        ));
        return out;
    }

    let mut bars = Figure::new((oob.items.len() as u32 * 36).max(320));
    for category in &oob.stack_order {
        let items: Vec<_> = oob.items.iter().filter(|i| &i.category == category).collect();
        let labels: Vec<String> = items.iter().map(|i| format!("{} · {}", i.category, i.item)).collect();
        bars = bars.trace(
            chart::bar(category, categories(&labels), items.iter().map(|i| i.amount).collect(), Orientation::Horizontal)
                .color(category_color(category))
                .opacity(0.85)
                .hover(&format!("<b>{}</b><br>%{{y}}<br>%{{x:,.0f}} VND<extra></extra>", category)),
        );
    }
    let bars = bars
        .bar_mode(BarMode::Stack)
        .money_axis("xaxis")
        .category_margin(220)
        .title("Tổng chi phí Ngoài dự toán theo Hạng mục");

    let pie = Figure::new(320)
        .trace(
            chart::pie(
                oob.by_category.iter().map(|c| c.name.clone()).collect(),
                oob.by_category.iter().map(|c| c.amount).collect(),
                oob.by_category.iter().map(|c| category_color(&c.name)).collect(),
                0.55,
            )
            .hover("<b>%{label}</b><br>%{value:,.0f} VND<br>%{percent}<extra></extra>"),
        )
        .hide_legend()
        .title("Cơ cấu Ngoài DT");

    out.push_str(&html::weighted_columns(&[
        (2, html::chart("budget_oob", &bars, None)),
        (1, html::chart("budget_oob_pie", &pie, None)),
    ]));

    let text = |v: &Option<String>| v.clone().unwrap_or_else(|| MISSING.to_string());
    let rows: Vec<Row> = oob
        .details
        .iter()
        .map(|d| {
            Row::new(vec![
                Cell::text(&d.category),
                Cell::text(&d.month),
                Cell::text(text(&d.lot)),
                Cell::text(text(&d.item)),
                Cell::text(text(&d.work_item)),
                Cell::text(text(&d.material)),
                Cell::text(text(&d.ma_dtbd)),
                Cell::text(text(&d.team)),
                Cell::num(money_truncated(d.amount)),
            ])
        })
        .collect();
    out.push_str(&html::details(
        "📋 Chi tiết từng dòng Ngoài dự toán",
        &html::table(
            &[
                "Loại",
                "Tháng",
                "Lô",
                "Hạng mục DT",
                "Hạng mục CV",
                "Vật tư",
                "Mã ĐTBĐ",
                "Đội",
                "Thành tiền (VND)",
            ],
            &rows,
        ),
        false,
    ));
    out
}

// ==========================================
// 汇总表 / 导出
// ==========================================

fn pivot_section(view: &BudgetDashboard) -> String {
    let mut out = html::section_header(
        "Bảng tổng hợp đầy đủ",
        "pivot thực tế vs dự toán · mọi hạng mục · mọi tháng",
    );
    let rows: Vec<Row> = view
        .pivot
        .iter()
        .map(|r| {
            Row::new(vec![
                Cell::text(&r.category),
                Cell::text(&r.item),
                Cell::text(r.scope.as_str()),
                Cell::text(&r.month),
                Cell::num(money_truncated(r.actual)),
                Cell::num(money_truncated(r.planned)),
                Cell::num(signed_money(r.variance)),
                Cell::num(format_pct(r.pct)),
            ])
        })
        .collect();
    out.push_str(&format!(
        r#"<div style="max-height:500px;overflow-y:auto">{}</div>"#,
        html::table(
            &["Loại", "Hạng mục", "DT", "Tháng", "Thực tế", "Dự toán", "Chênh lệch", "% TH"],
            &rows,
        )
    ));
    out.push_str(&format!(
        r#"<a class="btn" href="{}" style="display:inline-block;margin-top:12px;text-decoration:none">⬇️ {}</a>"#,
        escape_html(&html::href_with_query(EXPORT_PATH, &current_query(view))),
        escape_html(&t("budget.download_csv")),
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(pct: Option<f64>, band: PctBand) -> LineItemRow {
        LineItemRow {
            category: "Công".into(),
            item: "Làm cỏ".into(),
            actual: 1_200_000.0,
            planned: 1_000_000.0,
            pct,
            band,
        }
    }

    #[test]
    fn test_progress_card_shows_overrun() {
        let html = progress_card(&item(Some(120.0), PctBand::Over));
        assert!(html.contains("▲ Vượt 20.0%"));
        assert!(html.contains("width:100.0%"));
        assert!(html.contains(Palette::RED));
    }

    #[test]
    fn test_item_bar_color_uses_category_accent_when_on_track() {
        assert_eq!(item_bar_color(&item(Some(90.0), PctBand::OnTrack), Palette::PURPLE), Palette::PURPLE);
        assert_eq!(item_bar_color(&item(None, PctBand::NoPlan), Palette::PURPLE), Palette::BORDER2);
    }
}
