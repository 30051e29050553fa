// ==========================================
// Trường Tồn 农场看板 - 视觉样式
// ==========================================
// 深色主题调色板 + Plotly 公共布局
// 页面 CSS 也集中在这里，各组件只引用调色板常量
// ==========================================

use serde_json::{json, Value};

use crate::engine::budget::PctBand;
use crate::engine::quota::QuotaBand;

/// 调色板
pub struct Palette;

impl Palette {
    pub const BG: &'static str = "#0D1117";
    pub const SURFACE: &'static str = "#161B22";
    pub const SURFACE2: &'static str = "#21262D";
    pub const SURFACE3: &'static str = "#30363D";
    pub const BORDER: &'static str = "#30363D";
    pub const BORDER2: &'static str = "#484F58";
    pub const TEXT: &'static str = "#E6EDF3";
    pub const TEXT_SUB: &'static str = "#C9D1D9";
    pub const TEXT_MUTED: &'static str = "#8B949E";
    pub const GREEN: &'static str = "#3FB950";
    pub const GREEN_DARK: &'static str = "#238636";
    pub const GREEN_PALE: &'static str = "#0D2818";
    pub const AMBER: &'static str = "#F0A800";
    pub const AMBER_PALE: &'static str = "#271D00";
    pub const BLUE: &'static str = "#58A6FF";
    pub const BLUE_PALE: &'static str = "#0D2045";
    pub const RED: &'static str = "#F85149";
    pub const RED_PALE: &'static str = "#2D0E0E";
    pub const PURPLE: &'static str = "#BC8CFF";
    pub const SKY: &'static str = "#79C0FF";
}

// 系列色
pub const LABOR_COLOR: &str = Palette::GREEN;
pub const MATERIAL_COLOR: &str = Palette::AMBER;
/// 下钻选中项高亮色
pub const ACTIVE_COLOR: &str = Palette::AMBER;
/// 支援工
pub const SUPPORT_COLOR: &str = Palette::RED;

/// 旭日图配色序列（物资图使用逆序）
pub const SUNBURST_COLORS: [&str; 15] = [
    Palette::GREEN,
    Palette::BLUE,
    Palette::PURPLE,
    Palette::AMBER,
    Palette::RED,
    Palette::SKY,
    "#A5F3B0",
    "#FCD34D",
    "#F97583",
    "#BC8CFF",
    "#58A6FF",
    "#3FB950",
    "#F0A800",
    "#8B949E",
    "#E6EDF3",
];

/// 完成率热力图色阶（0 → 红, 75 → 琥珀, 150 → 绿）
pub const HEATMAP_SCALE: [(f64, &str); 3] = [(0.0, Palette::RED), (0.5, Palette::AMBER), (1.0, Palette::GREEN)];

/// 农场代表色
pub fn farm_color(farm_code: &str) -> &'static str {
    match farm_code {
        "Farm 126" => Palette::GREEN,
        "Farm 157" => Palette::BLUE,
        "Farm 195" => Palette::PURPLE,
        _ => Palette::GREEN,
    }
}

/// 农场图标
pub fn farm_icon(farm_code: &str) -> &'static str {
    match farm_code {
        "Farm 126" => "🌿",
        "Farm 157" => "🌾",
        "Farm 195" => "🌱",
        _ => "🏡",
    }
}

/// 费用类别色（预算页）
pub fn category_color(category: &str) -> &'static str {
    match category {
        "Công" => Palette::GREEN,
        "Vườn Ươm" => Palette::PURPLE,
        "Vật Tư" => Palette::AMBER,
        "ĐTBĐ" => Palette::BLUE,
        _ => Palette::TEXT_MUTED,
    }
}

/// 完成率分档色
pub fn quota_band_color(band: QuotaBand) -> &'static str {
    match band {
        QuotaBand::Good => Palette::GREEN,
        QuotaBand::Warn => Palette::AMBER,
        QuotaBand::Poor => Palette::RED,
    }
}

/// 完成率分档底色（汇总表行）
pub fn quota_band_background(band: QuotaBand) -> &'static str {
    match band {
        QuotaBand::Good => Palette::GREEN_PALE,
        QuotaBand::Warn => Palette::AMBER_PALE,
        QuotaBand::Poor => Palette::RED_PALE,
    }
}

/// 预算实现率分档色：超支红，正常绿，偏低琥珀
pub fn pct_band_color(band: PctBand) -> &'static str {
    match band {
        PctBand::Over => Palette::RED,
        PctBand::OnTrack => Palette::GREEN,
        PctBand::Under => Palette::AMBER,
        PctBand::NoPlan => Palette::TEXT_MUTED,
    }
}

/// Plotly 公共布局
///
/// # 参数
/// - height: 图高（像素）
pub fn base_layout(height: u32) -> Value {
    let axis = json!({
        "gridcolor": Palette::SURFACE3,
        "zerolinecolor": Palette::BORDER2,
        "linecolor": Palette::BORDER,
        "tickfont": { "color": Palette::TEXT_MUTED, "size": 11 },
    });
    json!({
        "font": { "family": "DM Sans, sans-serif", "size": 12, "color": Palette::TEXT_SUB },
        "paper_bgcolor": "rgba(0,0,0,0)",
        "plot_bgcolor": "rgba(0,0,0,0)",
        "xaxis": axis.clone(),
        "yaxis": axis,
        "hoverlabel": {
            "bgcolor": Palette::SURFACE2,
            "bordercolor": Palette::BORDER2,
            "font": { "color": Palette::TEXT, "size": 12 },
        },
        "margin": { "t": 44, "b": 48, "l": 8, "r": 8 },
        "legend": {
            "orientation": "h",
            "y": -0.12,
            "x": 0,
            "bgcolor": "rgba(0,0,0,0)",
        },
        "colorway": [
            Palette::GREEN,
            Palette::AMBER,
            Palette::BLUE,
            Palette::PURPLE,
            Palette::RED,
            Palette::SKY,
        ],
        "height": height,
    })
}

/// 页面全局 CSS
pub fn page_css() -> String {
    format!(
        "*{{box-sizing:border-box}}\
body{{margin:0;background:{bg};color:{text};font-family:'DM Sans',sans-serif;font-size:14px}}\
a{{color:{blue}}}\
.layout{{display:flex;min-height:100vh}}\
.sidebar{{width:280px;flex-shrink:0;background:{surface};border-right:1px solid {border};padding:16px}}\
.sidebar label{{display:block;font-size:12px;color:{muted};margin:12px 0 4px}}\
.sidebar select,.sidebar input[type=date],.sidebar input[type=text]{{width:100%;background:{surface2};color:{text};border:1px solid {border};border-radius:6px;padding:6px}}\
.sidebar button,.btn{{background:{surface2};color:{text};border:1px solid {border2};border-radius:6px;padding:6px 12px;cursor:pointer;font-size:12px}}\
.btn-primary{{background:{green_dark};border-color:{green}}}\
.main{{flex:1;padding:24px 32px;min-width:0}}\
.grid{{display:grid;gap:16px}}\
.row{{display:flex;gap:16px;flex-wrap:wrap}}\
.col{{flex:1;min-width:320px}}\
.chart{{width:100%}}\
table.data{{width:100%;border-collapse:collapse;font-size:12px}}\
table.data th{{text-align:left;color:{muted};font-weight:600;border-bottom:1px solid {border};padding:6px 8px}}\
table.data td{{border-bottom:1px solid {surface2};padding:6px 8px;color:{sub}}}\
table.data td.num{{text-align:right;font-family:'DM Mono',monospace}}\
details{{background:{surface};border:1px solid {border};border-radius:8px;padding:8px 12px;margin:12px 0}}\
summary{{cursor:pointer;color:{sub};font-size:13px}}\
hr{{border:none;border-top:1px solid {border};margin:24px 0}}",
        bg = Palette::BG,
        text = Palette::TEXT,
        sub = Palette::TEXT_SUB,
        muted = Palette::TEXT_MUTED,
        blue = Palette::BLUE,
        surface = Palette::SURFACE,
        surface2 = Palette::SURFACE2,
        border = Palette::BORDER,
        border2 = Palette::BORDER2,
        green = Palette::GREEN,
        green_dark = Palette::GREEN_DARK,
    )
}
