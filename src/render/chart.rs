// ==========================================
// Trường Tồn 农场看板 - Plotly 图表构建
// ==========================================
// Figure 序列化为 {"data": [...], "layout": {...}}，
// 由页面中的 Plotly.newPlot 直接渲染
// 可下钻的 trace 通过 customdata[0] 携带下钻值
// ==========================================

use serde::Serialize;
use serde_json::{json, Map, Value};

use super::style::{base_layout, Palette};
use crate::engine::cost::SunburstNode;

/// 柱状图方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Vertical,
    Horizontal,
}

/// 多系列柱状图的排列方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarMode {
    Stack,
    Overlay,
    Group,
}

impl BarMode {
    fn as_str(&self) -> &'static str {
        match self {
            BarMode::Stack => "stack",
            BarMode::Overlay => "overlay",
            BarMode::Group => "group",
        }
    }
}

/// 参考线线型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dash {
    Solid,
    Dash,
    Dot,
}

impl Dash {
    fn as_str(&self) -> &'static str {
        match self {
            Dash::Solid => "solid",
            Dash::Dash => "dash",
            Dash::Dot => "dot",
        }
    }
}

/// 递归合并 JSON 对象（patch 覆盖 target 的同名键）
pub fn merge(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(t), Value::Object(p)) => {
            for (k, v) in p {
                merge(t.entry(k).or_insert(Value::Null), v);
            }
        }
        (t, p) => *t = p,
    }
}

// ==========================================
// Trace
// ==========================================

/// 单个 trace（Plotly data 数组中的一项）
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Trace(Value);

impl Trace {
    fn from_object(value: Value) -> Self {
        Self(value)
    }

    fn set(mut self, key: &str, value: Value) -> Self {
        if let Value::Object(map) = &mut self.0 {
            map.insert(key.to_string(), value);
        }
        self
    }

    fn patch(mut self, value: Value) -> Self {
        merge(&mut self.0, value);
        self
    }

    /// 单色
    pub fn color(self, color: &str) -> Self {
        self.patch(json!({ "marker": { "color": color } }))
    }

    /// 逐点颜色（高亮下钻项）
    pub fn colors<S: AsRef<str>>(self, colors: &[S]) -> Self {
        let colors: Vec<&str> = colors.iter().map(|c| c.as_ref()).collect();
        self.patch(json!({ "marker": { "color": colors } }))
    }

    pub fn opacity(self, opacity: f64) -> Self {
        self.set("opacity", json!(opacity))
    }

    pub fn hover(self, template: &str) -> Self {
        self.set("hovertemplate", json!(template))
    }

    /// 点击映射数据：每个点一行
    pub fn customdata(self, rows: Vec<Value>) -> Self {
        self.set("customdata", Value::Array(rows))
    }

    /// 数据标签
    pub fn text<S: AsRef<str>>(self, labels: &[S], position: &str) -> Self {
        let labels: Vec<&str> = labels.iter().map(|c| c.as_ref()).collect();
        self.set("text", json!(labels)).set("textposition", json!(position))
    }

    pub fn text_font(self, color: &str, size: u32) -> Self {
        self.set("textfont", json!({ "color": color, "size": size }))
    }

    /// 折线虚线样式
    pub fn dash(self, dash: Dash) -> Self {
        self.patch(json!({ "line": { "dash": dash.as_str() } }))
    }

    /// 面积填充到 0
    pub fn fill_to_zero(self, fill_color: &str) -> Self {
        self.set("fill", json!("tozeroy")).set("fillcolor", json!(fill_color))
    }

    pub fn show_legend(self, show: bool) -> Self {
        self.set("showlegend", json!(show))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

/// 柱状图
///
/// 水平方向时 `categories` 放在 y 轴
pub fn bar(name: &str, categories: Vec<Value>, values: Vec<f64>, orientation: Orientation) -> Trace {
    let base = match orientation {
        Orientation::Vertical => json!({ "type": "bar", "name": name, "x": categories, "y": values }),
        Orientation::Horizontal => {
            json!({ "type": "bar", "name": name, "x": values, "y": categories, "orientation": "h" })
        }
    };
    Trace::from_object(base)
}

/// 折线（lines+markers）
pub fn line(name: &str, x: Vec<Value>, y: Vec<Option<f64>>, color: &str) -> Trace {
    Trace::from_object(json!({
        "type": "scatter",
        "mode": "lines+markers",
        "name": name,
        "x": x,
        "y": y,
        "line": { "color": color, "width": 2.5 },
        "marker": { "size": 7 },
    }))
}

/// 气泡散点
///
/// # 参数
/// - sizes: 像素直径
/// - highlighted: 逐点是否为下钻选中项（加粗描边）
pub fn bubble(
    name: &str,
    x: Vec<f64>,
    y: Vec<f64>,
    sizes: Vec<f64>,
    colors: Vec<&str>,
    highlighted: &[bool],
    labels: Vec<String>,
) -> Trace {
    let widths: Vec<f64> = highlighted.iter().map(|h| if *h { 2.0 } else { 0.5 }).collect();
    let line_colors: Vec<&str> = highlighted
        .iter()
        .map(|h| if *h { Palette::TEXT } else { "rgba(0,0,0,0.3)" })
        .collect();
    Trace::from_object(json!({
        "type": "scatter",
        "mode": "markers+text",
        "name": name,
        "x": x,
        "y": y,
        "text": labels,
        "textposition": "top center",
        "textfont": { "color": Palette::TEXT_MUTED, "size": 9 },
        "marker": {
            "size": sizes,
            "color": colors,
            "opacity": 0.85,
            "line": { "width": widths, "color": line_colors },
        },
    }))
}

/// 环形图（hole = 0 为饼图）
pub fn pie(labels: Vec<String>, values: Vec<f64>, colors: Vec<&str>, hole: f64) -> Trace {
    Trace::from_object(json!({
        "type": "pie",
        "labels": labels,
        "values": values,
        "marker": { "colors": colors },
        "hole": hole,
        "textinfo": "percent",
        "textfont": { "size": 12 },
    }))
}

/// 旭日图：父节点值为子节点之和（branchvalues = total）
pub fn sunburst(nodes: &[SunburstNode], colors: &[&str]) -> Trace {
    let ids: Vec<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    let labels: Vec<&str> = nodes.iter().map(|n| n.label.as_str()).collect();
    let parents: Vec<&str> = nodes.iter().map(|n| n.parent.as_str()).collect();
    let values: Vec<f64> = nodes.iter().map(|n| n.value).collect();
    Trace::from_object(json!({
        "type": "sunburst",
        "ids": ids,
        "labels": labels,
        "parents": parents,
        "values": values,
        "branchvalues": "total",
        "insidetextorientation": "radial",
        "textfont": { "size": 11 },
        "marker": { "colors": colors },
    }))
}

/// 热力图；空格子序列化为 null
pub fn heatmap(x: Vec<String>, y: Vec<String>, z: Vec<Vec<Option<f64>>>, scale: &[(f64, &str)], zmin: f64, zmax: f64) -> Trace {
    let colorscale: Vec<Value> = scale.iter().map(|(p, c)| json!([p, c])).collect();
    Trace::from_object(json!({
        "type": "heatmap",
        "x": x,
        "y": y,
        "z": z,
        "colorscale": colorscale,
        "zmin": zmin,
        "zmax": zmax,
        "xgap": 2,
        "ygap": 2,
    }))
}

// ==========================================
// Figure
// ==========================================

/// Plotly 图表
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Value,
}

impl Figure {
    /// 带公共布局的空图
    pub fn new(height: u32) -> Self {
        Self {
            data: Vec::new(),
            layout: base_layout(height),
        }
    }

    pub fn trace(mut self, trace: Trace) -> Self {
        self.data.push(trace);
        self
    }

    /// 合并任意布局片段
    pub fn layout(mut self, patch: Value) -> Self {
        merge(&mut self.layout, patch);
        self
    }

    /// 小号灰色标题
    pub fn title(self, text: &str) -> Self {
        self.layout(json!({ "title": { "text": text, "font": { "size": 12, "color": Palette::TEXT_MUTED } } }))
    }

    pub fn bar_mode(self, mode: BarMode) -> Self {
        self.layout(json!({ "barmode": mode.as_str() }))
    }

    pub fn hide_legend(self) -> Self {
        self.layout(json!({ "showlegend": false }))
    }

    /// 金额轴（千分位刻度）
    pub fn money_axis(self, axis: &str) -> Self {
        let mut patch = Map::new();
        patch.insert(axis.to_string(), json!({ "tickformat": ",.0f" }));
        self.layout(Value::Object(patch))
    }

    /// 水平柱状图的类目轴留出标签空间
    pub fn category_margin(self, left: u32) -> Self {
        self.layout(json!({ "yaxis": { "automargin": true }, "margin": { "l": left } }))
    }

    fn push_layout_item(&mut self, key: &str, item: Value) {
        if let Value::Object(map) = &mut self.layout {
            let entry = map.entry(key.to_string()).or_insert_with(|| Value::Array(Vec::new()));
            if let Value::Array(items) = entry {
                items.push(item);
            }
        }
    }

    /// 水平参考线（横跨整个绘图区）
    pub fn hline(mut self, y: f64, color: &str, dash: Dash, annotation: Option<&str>) -> Self {
        self.push_layout_item(
            "shapes",
            json!({
                "type": "line", "xref": "paper", "x0": 0, "x1": 1, "y0": y, "y1": y,
                "line": { "color": color, "dash": dash.as_str(), "width": 1.5 },
            }),
        );
        if let Some(text) = annotation {
            self.push_layout_item(
                "annotations",
                json!({
                    "xref": "paper", "x": 1, "y": y, "text": text, "showarrow": false,
                    "xanchor": "right", "yanchor": "bottom",
                    "font": { "color": Palette::TEXT_MUTED, "size": 11 },
                }),
            );
        }
        self
    }

    /// 垂直参考线（横向柱状图的 80% / 100% 线）
    pub fn vline(mut self, x: f64, color: &str, dash: Dash, annotation: Option<&str>) -> Self {
        self.push_layout_item(
            "shapes",
            json!({
                "type": "line", "yref": "paper", "y0": 0, "y1": 1, "x0": x, "x1": x,
                "line": { "color": color, "dash": dash.as_str(), "width": 1.5 },
            }),
        );
        if let Some(text) = annotation {
            self.push_layout_item(
                "annotations",
                json!({
                    "yref": "paper", "y": 1, "x": x, "text": text, "showarrow": false,
                    "xanchor": "left", "yanchor": "bottom",
                    "font": { "color": Palette::TEXT_MUTED, "size": 11 },
                }),
            );
        }
        self
    }

    /// 水平色带
    pub fn hrect(mut self, y0: f64, y1: f64, fill: &str) -> Self {
        self.push_layout_item(
            "shapes",
            json!({
                "type": "rect", "xref": "paper", "x0": 0, "x1": 1, "y0": y0, "y1": y1,
                "fillcolor": fill, "line": { "width": 0 }, "layer": "below",
            }),
        );
        self
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            tracing::error!(error = %e, "图表序列化失败");
            "{\"data\":[],\"layout\":{}}".to_string()
        })
    }
}

/// 字符串类目转 JSON 数组
pub fn categories<S: AsRef<str>>(items: &[S]) -> Vec<Value> {
    items.iter().map(|s| Value::String(s.as_ref().to_string())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizontal_bar_puts_categories_on_y() {
        let t = bar("Chính chủ", categories(&["D01", "D02"]), vec![1.0, 2.0], Orientation::Horizontal)
            .colors(&[Palette::GREEN, Palette::AMBER])
            .customdata(vec![json!(["D01"]), json!(["D02"])]);
        let v = t.as_value();
        assert_eq!(v["orientation"], "h");
        assert_eq!(v["y"][1], "D02");
        assert_eq!(v["x"][1], 2.0);
        assert_eq!(v["marker"]["color"][1], Palette::AMBER);
        assert_eq!(v["customdata"][0][0], "D01");
    }

    #[test]
    fn test_figure_layout_patches_merge() {
        let fig = Figure::new(300)
            .bar_mode(BarMode::Stack)
            .title("Xu hướng")
            .money_axis("yaxis")
            .hline(100.0, Palette::BORDER2, Dash::Dash, Some("100%"))
            .hline(80.0, Palette::BLUE, Dash::Dot, None);
        assert_eq!(fig.layout["barmode"], "stack");
        assert_eq!(fig.layout["title"]["text"], "Xu hướng");
        // 公共轴样式保留
        assert_eq!(fig.layout["yaxis"]["gridcolor"], Palette::SURFACE3);
        assert_eq!(fig.layout["yaxis"]["tickformat"], ",.0f");
        assert_eq!(fig.layout["shapes"].as_array().map(|a| a.len()), Some(2));
        assert_eq!(fig.layout["annotations"].as_array().map(|a| a.len()), Some(1));
    }

    #[test]
    fn test_heatmap_empty_cells_are_null() {
        let t = heatmap(
            vec!["2025-01".into()],
            vec!["Làm cỏ".into()],
            vec![vec![None]],
            &[(0.0, Palette::RED), (1.0, Palette::GREEN)],
            0.0,
            150.0,
        );
        assert!(t.as_value()["z"][0][0].is_null());
        assert_eq!(t.as_value()["colorscale"][1][1], Palette::GREEN);
    }

    #[test]
    fn test_to_json_shape() {
        let fig = Figure::new(200).trace(pie(vec!["Công".into()], vec![1.0], vec![Palette::GREEN], 0.6));
        let parsed: Value = serde_json::from_str(&fig.to_json()).unwrap();
        assert_eq!(parsed["data"][0]["type"], "pie");
        assert_eq!(parsed["layout"]["height"], 200);
    }
}
