// ==========================================
// Trường Tồn 农场看板 - HTML 组件
// ==========================================
// 组件均返回 HTML 片段字符串，由 Page 拼装为完整文档
// 所有外部文本经 escape_html 转义后才进入片段
// ==========================================

use std::fmt::Write as _;

use super::chart::Figure;
use super::format::escape_html;
use super::style::{page_css, Palette};
use crate::domain::types::{DrillDimension, PageKey};
use crate::i18n::t;

/// Plotly 脚本地址
pub const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

// ==========================================
// 页面骨架
// ==========================================

/// 顶部导航项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavItem {
    Home,
    Cost,
    Quota,
    Budget,
}

impl NavItem {
    const ALL: [NavItem; 4] = [NavItem::Home, NavItem::Cost, NavItem::Quota, NavItem::Budget];

    fn href(&self) -> &'static str {
        match self {
            NavItem::Home => "/",
            NavItem::Cost => "/chi-phi",
            NavItem::Quota => "/dinh-muc",
            NavItem::Budget => "/du-toan",
        }
    }

    fn label_key(&self) -> &'static str {
        match self {
            NavItem::Home => "nav.home",
            NavItem::Cost => "nav.cost",
            NavItem::Quota => "nav.quota",
            NavItem::Budget => "nav.budget",
        }
    }
}

/// 完整页面
pub struct Page {
    title: String,
    active: NavItem,
    sidebar: String,
    body: String,
}

impl Page {
    pub fn new(title: &str, active: NavItem) -> Self {
        Self {
            title: title.to_string(),
            active,
            sidebar: String::new(),
            body: String::new(),
        }
    }

    /// 追加侧边栏片段
    pub fn sidebar(&mut self, fragment: impl AsRef<str>) -> &mut Self {
        self.sidebar.push_str(fragment.as_ref());
        self
    }

    /// 追加正文片段
    pub fn push(&mut self, fragment: impl AsRef<str>) -> &mut Self {
        self.body.push_str(fragment.as_ref());
        self
    }

    pub fn render(&self) -> String {
        let mut nav = String::new();
        for item in NavItem::ALL {
            let color = if item == self.active { Palette::GREEN } else { Palette::TEXT_SUB };
            let _ = write!(
                nav,
                r#"<a href="{}" style="display:block;padding:6px 0;color:{};text-decoration:none;font-size:13px">{}</a>"#,
                item.href(),
                color,
                escape_html(&t(item.label_key()))
            );
        }

        format!(
            "<!doctype html><html lang=\"{lang}\"><head><meta charset=\"utf-8\">\
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
<title>{title} · Trường Tồn</title>\
<script src=\"{plotly}\"></script><style>{css}</style></head>\
<body><div class=\"layout\"><aside class=\"sidebar\">\
<div style=\"font-size:15px;font-weight:700;color:{text};margin-bottom:12px\">🌿 Trường Tồn</div>\
<nav>{nav}</nav><hr style=\"margin:12px 0\">{sidebar}</aside>\
<main class=\"main\">{body}</main></div></body></html>",
            lang = crate::i18n::current_locale(),
            title = escape_html(&self.title),
            plotly = PLOTLY_CDN,
            css = page_css(),
            text = Palette::TEXT,
            nav = nav,
            sidebar = self.sidebar,
            body = self.body,
        )
    }
}

// ==========================================
// 标题 / 提示
// ==========================================

pub fn page_header(icon: &str, title: &str, subtitle: &str) -> String {
    let sub = if subtitle.is_empty() {
        String::new()
    } else {
        format!(
            r#"<div style="font-size:13px;color:{};margin-top:3px">{}</div>"#,
            Palette::TEXT_MUTED,
            escape_html(subtitle)
        )
    };
    format!(
        r#"<div style="display:flex;align-items:center;gap:14px;padding:16px 0;border-bottom:1px solid {bd};margin-bottom:20px"><div style="font-size:26px">{icon}</div><div><div style="font-size:21px;font-weight:600;color:{tx};letter-spacing:-0.02em">{title}</div>{sub}</div></div>"#,
        bd = Palette::BORDER,
        tx = Palette::TEXT,
        icon = icon,
        title = escape_html(title),
        sub = sub,
    )
}

pub fn section_header(title: &str, description: &str) -> String {
    let desc = if description.is_empty() {
        String::new()
    } else {
        format!(
            r#"<span style="color:{};font-size:11px;margin-left:8px">{}</span>"#,
            Palette::TEXT_MUTED,
            escape_html(description)
        )
    };
    format!(
        r#"<div style="margin:24px 0 12px 0;padding-bottom:8px;border-bottom:1px solid {bd}"><span style="font-size:11px;font-weight:600;text-transform:uppercase;letter-spacing:0.1em;color:{ts}">{title}</span>{desc}</div>"#,
        bd = Palette::BORDER,
        ts = Palette::TEXT_SUB,
        title = escape_html(title),
        desc = desc,
    )
}

pub fn tip(text: &str) -> String {
    format!(
        r#"<div style="background:{bp};border:1px solid {b}33;border-radius:6px;padding:8px 12px;font-size:12px;color:{b};margin-bottom:12px">💡 {text}</div>"#,
        bp = Palette::BLUE_PALE,
        b = Palette::BLUE,
        text = escape_html(text),
    )
}

/// 下钻详情横幅（"📊 Đang xem chi tiết: X"）
pub fn focus_banner(subject: &str) -> String {
    format!(
        r#"<div style="background:{gp};border-left:3px solid {g};border-radius:0 6px 6px 0;padding:8px 14px;margin:8px 0;font-size:12px;color:{g}">📊 {prefix}: <b>{subject}</b></div>"#,
        gp = Palette::GREEN_PALE,
        g = Palette::GREEN,
        prefix = escape_html(&t("drill.viewing")),
        subject = escape_html(subject),
    )
}

/// 提示级别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Warning,
    Error,
}

pub fn notice(kind: NoticeKind, message: &str) -> String {
    let (bg, fg, icon) = match kind {
        NoticeKind::Info => (Palette::BLUE_PALE, Palette::BLUE, "ℹ️"),
        NoticeKind::Warning => (Palette::AMBER_PALE, Palette::AMBER, "⚠️"),
        NoticeKind::Error => (Palette::RED_PALE, Palette::RED, "⛔"),
    };
    format!(
        r#"<div class="notice" style="background:{bg};border-left:3px solid {fg};border-radius:0 6px 6px 0;padding:12px 16px;margin:12px 0;font-size:13px;color:{fg}">{icon} {msg}</div>"#,
        bg = bg,
        fg = fg,
        icon = icon,
        msg = escape_html(message),
    )
}

/// 任意颜色的横幅（预算页 "🔴 Vượt" 条）
pub fn banner(background: &str, accent: &str, inner_html: &str) -> String {
    format!(
        r#"<div style="background:{bg};border-left:3px solid {ac};border-radius:0 6px 6px 0;padding:10px 16px;margin:8px 0 16px;font-size:13px;color:{tx}">{inner}</div>"#,
        bg = background,
        ac = accent,
        tx = Palette::TEXT_SUB,
        inner = inner_html,
    )
}

// ==========================================
// KPI
// ==========================================

/// KPI 卡片
#[derive(Debug, Clone, PartialEq)]
pub struct Kpi {
    pub label: String,
    pub value: String,
    pub delta: Option<String>,
    pub delta_positive: bool,
    pub icon: &'static str,
    pub color: &'static str,
    pub footnote: Option<String>,
}

impl Kpi {
    pub fn new(label: impl Into<String>, value: impl Into<String>, icon: &'static str, color: &'static str) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            delta: None,
            delta_positive: true,
            icon,
            color,
            footnote: None,
        }
    }

    pub fn delta(mut self, text: impl Into<String>, positive: bool) -> Self {
        let text = text.into();
        self.delta = if text.is_empty() { None } else { Some(text) };
        self.delta_positive = positive;
        self
    }

    pub fn footnote(mut self, text: impl Into<String>) -> Self {
        self.footnote = Some(text.into());
        self
    }
}

pub fn kpi_card(kpi: &Kpi) -> String {
    let dc = if kpi.delta_positive { Palette::GREEN } else { Palette::RED };
    let mut out = format!(
        r#"<div style="background:{sf};border:1px solid {bd};border-top:2px solid {color};border-radius:8px;padding:16px 18px;height:100%">"#,
        sf = Palette::SURFACE,
        bd = Palette::BORDER,
        color = kpi.color,
    );
    if !kpi.icon.is_empty() {
        let _ = write!(out, r#"<div style="font-size:18px;margin-bottom:6px">{}</div>"#, kpi.icon);
    }
    let _ = write!(
        out,
        r#"<div style="font-size:10px;font-weight:600;text-transform:uppercase;letter-spacing:0.1em;color:{tm}">{label}</div><div style="font-size:22px;font-weight:600;color:{tx};font-family:'DM Mono',monospace;letter-spacing:-0.01em;margin-top:5px;line-height:1">{value}</div>"#,
        tm = Palette::TEXT_MUTED,
        tx = Palette::TEXT,
        label = escape_html(&kpi.label),
        value = escape_html(&kpi.value),
    );
    if let Some(delta) = &kpi.delta {
        let _ = write!(
            out,
            r#"<div style="font-size:11px;color:{dc};font-weight:500;margin-top:3px">{}</div>"#,
            escape_html(delta),
            dc = dc
        );
    }
    if let Some(foot) = &kpi.footnote {
        let _ = write!(
            out,
            r#"<div style="font-size:10px;color:{tm};margin-top:6px">{}</div>"#,
            escape_html(foot),
            tm = Palette::TEXT_MUTED
        );
    }
    out.push_str("</div>");
    out
}

pub fn kpi_row(items: &[Kpi]) -> String {
    let mut out = format!(
        r#"<div class="grid" style="grid-template-columns:repeat({},1fr);margin-bottom:8px">"#,
        items.len().max(1)
    );
    for kpi in items {
        out.push_str(&kpi_card(kpi));
    }
    out.push_str("</div>");
    out
}

/// 进度条：达到阈值绿色，达到阈值 80% 琥珀，否则红色
pub fn progress_bar(pct: f64, threshold: f64, label: &str) -> String {
    let color = if pct >= threshold {
        Palette::GREEN
    } else if pct >= threshold * 0.8 {
        Palette::AMBER
    } else {
        Palette::RED
    };
    let lbl = if label.is_empty() {
        String::new()
    } else {
        format!(
            r#"<div style="font-size:11px;color:{};margin-bottom:5px">{}</div>"#,
            Palette::TEXT_MUTED,
            escape_html(label)
        )
    };
    format!(
        r#"{lbl}<div style="background:{s2};border-radius:99px;height:20px;overflow:hidden;border:1px solid {bd}"><div style="background:{color};width:{width:.1}%;height:100%;display:flex;align-items:center;padding:0 10px;color:#fff;font-size:11px;font-weight:600;font-family:'DM Mono',monospace">{pct:.1}%</div></div><div style="margin-bottom:16px"></div>"#,
        lbl = lbl,
        s2 = Palette::SURFACE2,
        bd = Palette::BORDER,
        color = color,
        width = pct.clamp(0.0, 100.0),
        pct = pct,
    )
}

/// 进度卡片（预算科目卡）：标题、副标题、进度条与附注
pub fn progress_card(title: &str, subtitle: &str, bar_pct: f64, bar_color: &str, caption: &str, accent: &str) -> String {
    format!(
        r#"<div style="background:{sf};border:1px solid {bd};border-left:3px solid {accent};border-radius:8px;padding:12px 14px"><div style="font-size:12px;font-weight:600;color:{tx}">{title}</div><div style="font-size:11px;color:{tm};margin:2px 0 8px">{subtitle}</div><div style="background:{s2};border-radius:99px;height:8px;overflow:hidden"><div style="background:{bar_color};width:{width:.1}%;height:100%"></div></div><div style="font-size:11px;color:{bar_color};margin-top:6px;font-family:'DM Mono',monospace">{caption}</div></div>"#,
        sf = Palette::SURFACE,
        bd = Palette::BORDER,
        accent = accent,
        tx = Palette::TEXT,
        tm = Palette::TEXT_MUTED,
        s2 = Palette::SURFACE2,
        title = escape_html(title),
        subtitle = escape_html(subtitle),
        bar_color = bar_color,
        width = bar_pct.clamp(0.0, 100.0),
        caption = escape_html(caption),
    )
}

// ==========================================
// 下钻
// ==========================================

/// 侧边栏下钻徽章，附 "✕" 清除按钮（清除该页全部下钻）
pub fn drill_badge(page: PageKey, dimension: DrillDimension, value: &str) -> String {
    format!(
        r#"<div style="background:{gp};border:1px solid {gd};border-radius:6px;padding:7px 12px;margin:4px 0;font-size:12px;display:flex;justify-content:space-between;align-items:center"><span><span style="color:{tm}">{label}:</span><span style="color:{g};font-weight:600;margin-left:4px">{value}</span></span><form method="post" action="/drill/{slug}/clear" style="margin:0"><button type="submit" title="{clear}">✕</button></form></div>"#,
        gp = Palette::GREEN_PALE,
        gd = Palette::GREEN_DARK,
        tm = Palette::TEXT_MUTED,
        g = Palette::GREEN,
        label = escape_html(dimension.label()),
        value = escape_html(value),
        slug = page.slug(),
        clear = escape_html(&t("drill.clear")),
    )
}

/// 图表点击 → 下钻
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickDrill {
    pub page: PageKey,
    pub dimension: DrillDimension,
}

/// 图表容器
///
/// 绑定 ClickDrill 时，点击点的 customdata[0]（缺省时取 y 值）
/// 作为下钻值 POST 到 /drill/{page}，成功后刷新页面
pub fn chart(id: &str, figure: &Figure, click: Option<ClickDrill>) -> String {
    let id = escape_html(id);
    let mut out = format!(
        r#"<div id="{id}" class="chart"></div><script>(function(){{var fig={json};Plotly.newPlot("{id}",fig.data,fig.layout,{{displayModeBar:false,responsive:true}});"#,
        id = id,
        json = figure.to_json().replace("</", "<\\/"),
    );
    if let Some(click) = click {
        let _ = write!(
            out,
            r#"document.getElementById("{id}").on("plotly_click",function(ev){{var p=ev.points[0];var v=p.customdata!==undefined?(Array.isArray(p.customdata)?p.customdata[0]:p.customdata):p.y;if(v===undefined||v===null)return;fetch("/drill/{slug}",{{method:"POST",headers:{{"content-type":"application/json"}},body:JSON.stringify({{dimension:"{dim}",value:String(v)}})}}).then(function(){{location.reload();}});}});"#,
            id = id,
            slug = click.page.slug(),
            dim = click.dimension,
        );
    }
    out.push_str("})();</script>");
    out
}

// ==========================================
// 表格 / 布局
// ==========================================

/// 表格单元格
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub text: String,
    pub numeric: bool,
    pub color: Option<&'static str>,
}

impl Cell {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: text.into(), numeric: false, color: None }
    }

    pub fn num(text: impl Into<String>) -> Self {
        Self { text: text.into(), numeric: true, color: None }
    }

    pub fn colored(mut self, color: &'static str) -> Self {
        self.color = Some(color);
        self
    }
}

/// 表格行（可带整行底色）
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    pub cells: Vec<Cell>,
    pub background: Option<&'static str>,
}

impl Row {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells, background: None }
    }

    pub fn background(mut self, color: &'static str) -> Self {
        self.background = Some(color);
        self
    }
}

pub fn table(headers: &[&str], rows: &[Row]) -> String {
    let mut out = String::from(r#"<div style="overflow-x:auto"><table class="data"><thead><tr>"#);
    for h in headers {
        let _ = write!(out, "<th>{}</th>", escape_html(h));
    }
    out.push_str("</tr></thead><tbody>");
    for row in rows {
        match row.background {
            Some(bg) => {
                let _ = write!(out, r#"<tr style="background:{}">"#, bg);
            }
            None => out.push_str("<tr>"),
        }
        for cell in &row.cells {
            let class = if cell.numeric { r#" class="num""# } else { "" };
            match cell.color {
                Some(c) => {
                    let _ = write!(out, r#"<td{} style="color:{}">{}</td>"#, class, c, escape_html(&cell.text));
                }
                None => {
                    let _ = write!(out, "<td{}>{}</td>", class, escape_html(&cell.text));
                }
            }
        }
        out.push_str("</tr>");
    }
    out.push_str("</tbody></table></div>");
    out
}

/// 表格说明行（"Hiển thị x / y dòng"）
pub fn caption(text: &str) -> String {
    format!(
        r#"<div style="font-size:11px;color:{};margin:6px 0">{}</div>"#,
        Palette::TEXT_MUTED,
        escape_html(text)
    )
}

/// 等宽多列
pub fn columns(cells: &[String]) -> String {
    let mut out = String::from(r#"<div class="row">"#);
    for c in cells {
        let _ = write!(out, r#"<div class="col">{}</div>"#, c);
    }
    out.push_str("</div>");
    out
}

/// 按比例分列（如 3:1）
pub fn weighted_columns(cells: &[(u32, String)]) -> String {
    let mut out = String::from(r#"<div class="row">"#);
    for (w, c) in cells {
        let _ = write!(out, r#"<div class="col" style="flex:{}">{}</div>"#, w, c);
    }
    out.push_str("</div>");
    out
}

/// 可折叠区块
pub fn details(summary: &str, inner: &str, open: bool) -> String {
    format!(
        "<details{}><summary>{}</summary>{}</details>",
        if open { " open" } else { "" },
        escape_html(summary),
        inner
    )
}

/// 页签：纯 CSS radio 切换
pub fn tabs(group: &str, items: &[(String, String)]) -> String {
    let group = escape_html(group);
    let mut heads = String::new();
    let mut bodies = String::new();
    let mut css = String::new();
    for (i, (label, body)) in items.iter().enumerate() {
        let _ = write!(
            heads,
            r#"<input type="radio" name="{g}" id="{g}-{i}"{checked} style="display:none"><label for="{g}-{i}" class="tab-head">{label}</label>"#,
            g = group,
            i = i,
            checked = if i == 0 { " checked" } else { "" },
            label = escape_html(label),
        );
        let _ = write!(bodies, r#"<div class="tab-body {g}-body-{i}">{body}</div>"#, g = group, i = i, body = body);
        let _ = write!(
            css,
            "#{g}-{i}:checked~.tab-bodies .{g}-body-{i}{{display:block}}#{g}-{i}:checked+label{{color:{green};border-color:{green}}}",
            g = group,
            i = i,
            green = Palette::GREEN,
        );
    }
    format!(
        r#"<style>.tab-head{{display:inline-block;padding:6px 12px;margin-right:4px;border-bottom:2px solid transparent;cursor:pointer;font-size:12px;color:{tm}}}.tab-body{{display:none;padding-top:12px}}{css}</style><div class="tabs">{heads}<div class="tab-bodies">{bodies}</div></div>"#,
        tm = Palette::TEXT_MUTED,
        css = css,
        heads = heads,
        bodies = bodies,
    )
}

// ==========================================
// 侧边栏表单
// ==========================================

/// 侧边栏 GET 表单（筛选条件进入查询串）
pub fn filter_form(action: &str, fields: &[String]) -> String {
    let mut out = format!(
        r#"<div style="font-size:13px;font-weight:600;color:{};padding:10px 0 6px">🔍 {}</div><form method="get" action="{}">"#,
        Palette::TEXT,
        escape_html(&t("sidebar.filters")),
        escape_html(action)
    );
    for f in fields {
        out.push_str(f);
    }
    let _ = write!(
        out,
        r#"<div style="margin-top:14px"><button type="submit" class="btn btn-primary">{}</button></div></form>"#,
        escape_html(&t("sidebar.apply"))
    );
    out
}

/// 多选框
///
/// 每个选中项作为同名键提交；前置的空 hidden 字段保证全不选时键仍存在
pub fn multi_select(name: &str, label: &str, options: &[(String, String)], selected: &[String]) -> String {
    let mut out = format!(
        r#"<label>{label}</label><input type="hidden" name="{name}" value=""><select name="{name}" multiple size="{size}">"#,
        label = escape_html(label),
        name = escape_html(name),
        size = options.len().clamp(2, 6)
    );
    for (value, text) in options {
        let _ = write!(
            out,
            r#"<option value="{}"{}>{}</option>"#,
            escape_html(value),
            if selected.contains(value) { " selected" } else { "" },
            escape_html(text)
        );
    }
    out.push_str("</select>");
    out
}

/// 单选下拉
pub fn select(name: &str, label: &str, options: &[(String, String)], selected: &str) -> String {
    let mut out = format!(r#"<label>{}</label><select name="{}">"#, escape_html(label), escape_html(name));
    for (value, text) in options {
        let _ = write!(
            out,
            r#"<option value="{}"{}>{}</option>"#,
            escape_html(value),
            if value == selected { " selected" } else { "" },
            escape_html(text)
        );
    }
    out.push_str("</select>");
    out
}

pub fn date_input(name: &str, label: &str, value: &str, min: &str, max: &str) -> String {
    format!(
        r#"<label>{}</label><input type="date" name="{}" value="{}" min="{}" max="{}">"#,
        escape_html(label),
        escape_html(name),
        escape_html(value),
        escape_html(min),
        escape_html(max)
    )
}

pub fn text_input(name: &str, label: &str, value: &str, placeholder: &str) -> String {
    format!(
        r#"<label>{}</label><input type="text" name="{}" value="{}" placeholder="{}">"#,
        escape_html(label),
        escape_html(name),
        escape_html(value),
        escape_html(placeholder)
    )
}

/// 隐藏字段：另一张表单的当前取值随本表单一并提交
pub fn hidden_fields(pairs: &[(&str, String)]) -> String {
    let mut out = String::new();
    for (name, value) in pairs {
        let _ = write!(
            out,
            r#"<input type="hidden" name="{}" value="{}">"#,
            escape_html(name),
            escape_html(value)
        );
    }
    out
}

/// 带查询串的链接地址
pub fn href_with_query(path: &str, pairs: &[(&str, String)]) -> String {
    if pairs.is_empty() {
        return path.to_string();
    }
    let query: Vec<String> = pairs
        .iter()
        .map(|(k, v)| format!("{}={}", url_encode(k), url_encode(v)))
        .collect();
    format!("{}?{}", path, query.join("&"))
}

/// 查询串百分号编码（保留非保留字符）
fn url_encode(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for b in raw.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => out.push(b as char),
            _ => {
                let _ = write!(out, "%{:02X}", b);
            }
        }
    }
    out
}

/// 复选框（未勾选时提交 hidden 的 "0"）
pub fn checkbox(name: &str, label: &str, checked: bool) -> String {
    format!(
        r#"<label style="display:flex;gap:6px;align-items:center"><input type="hidden" name="{n}" value="0"><input type="checkbox" name="{n}" value="1"{c} onclick="this.previousElementSibling.disabled=this.checked">{l}</label>"#,
        n = escape_html(name),
        c = if checked { " checked" } else { "" },
        l = escape_html(label)
    )
}

/// 提交前禁用已勾选复选框的 "0" 占位字段（初始即勾选、未点击过的情况）
pub fn checkbox_submit_script() -> &'static str {
    r#"<script>document.querySelectorAll("form[method=get]").forEach(function(f){f.addEventListener("submit",function(){f.querySelectorAll("input[type=checkbox]:checked").forEach(function(c){c.previousElementSibling.disabled=true;});});});</script>"#
}

/// 刷新数据按钮（清空查询缓存）
pub fn refresh_button() -> String {
    format!(
        r#"<form method="post" action="/cache/refresh" style="margin-top:16px"><button type="submit" class="btn">🔄 {}</button></form>"#,
        escape_html(&t("sidebar.refresh"))
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::chart::{bar, categories, Orientation};

    #[test]
    fn test_kpi_card_escapes_and_colors() {
        let kpi = Kpi::new("Tổng <chi phí>", "1,000 VND", "📊", Palette::GREEN)
            .delta("12.0% tổng", false)
            .footnote("công · ngày");
        let html = kpi_card(&kpi);
        assert!(html.contains("Tổng &lt;chi phí&gt;"));
        assert!(html.contains(&format!("border-top:2px solid {}", Palette::GREEN)));
        assert!(html.contains(&format!("color:{};font-weight:500", Palette::RED)));
        assert!(html.contains("công · ngày"));
    }

    #[test]
    fn test_progress_bar_color_and_width() {
        let over = progress_bar(130.0, 100.0, "");
        assert!(over.contains("width:100.0%"));
        assert!(over.contains(Palette::GREEN));
        assert!(over.contains("130.0%"));

        let warn = progress_bar(85.0, 100.0, "x");
        assert!(warn.contains(Palette::AMBER));
        let low = progress_bar(50.0, 100.0, "");
        assert!(low.contains(Palette::RED));
    }

    #[test]
    fn test_chart_click_binding() {
        let fig = Figure::new(300).trace(bar("x", categories(&["D01"]), vec![1.0], Orientation::Horizontal));
        let html = chart(
            "doi_bar",
            &fig,
            Some(ClickDrill { page: PageKey::Cost, dimension: DrillDimension::Team }),
        );
        assert!(html.contains(r#"id="doi_bar""#));
        assert!(html.contains("/drill/chi-phi"));
        assert!(html.contains(r#"dimension:"team""#));

        let plain = chart("pie", &fig, None);
        assert!(!plain.contains("plotly_click"));
    }

    #[test]
    fn test_chart_json_cannot_close_script() {
        let fig = Figure::new(300).title("</script><b>");
        let html = chart("c", &fig, None);
        assert!(!html.contains("</script><b>"));
    }

    #[test]
    fn test_table_rows() {
        let rows = vec![
            Row::new(vec![Cell::text("Làm cỏ"), Cell::num("1,000")]).background(Palette::GREEN_PALE),
            Row::new(vec![Cell::text("A&B"), Cell::num("2").colored(Palette::RED)]),
        ];
        let html = table(&["Công việc", "Chi phí"], &rows);
        assert!(html.contains("<th>Công việc</th>"));
        assert!(html.contains(&format!(r#"<tr style="background:{}">"#, Palette::GREEN_PALE)));
        assert!(html.contains("A&amp;B"));
        assert!(html.contains(r#"<td class="num" style="color:#F85149">2</td>"#));
    }

    #[test]
    fn test_multi_select_marks_selected() {
        let html = multi_select(
            "farms",
            "Farm",
            &[("Farm 126".into(), "Farm 126".into()), ("Farm 157".into(), "Farm 157".into())],
            &["Farm 157".to_string()],
        );
        assert!(html.contains(r#"<option value="Farm 157" selected>"#));
        assert!(html.contains(r#"<option value="Farm 126">"#));
        assert!(html.contains(r#"<input type="hidden" name="farms" value=""><select name="farms" multiple"#));
    }

    #[test]
    fn test_href_with_query_encodes_values() {
        let href = href_with_query(
            "/du-toan",
            &[("items", "Phân bón, vôi".to_string()), ("items", "Làm cỏ".to_string())],
        );
        assert_eq!(href, "/du-toan?items=Ph%C3%A2n%20b%C3%B3n%2C%20v%C3%B4i&items=L%C3%A0m%20c%E1%BB%8F");
        assert_eq!(href_with_query("/du-toan", &[]), "/du-toan");
    }

    #[test]
    fn test_hidden_fields_escape() {
        let html = hidden_fields(&[("lots", "A\"1".to_string())]);
        assert_eq!(html, r#"<input type="hidden" name="lots" value="A&quot;1">"#);
    }
}
