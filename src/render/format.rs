// ==========================================
// Trường Tồn 农场看板 - 数值格式化
// ==========================================
// 金额统一使用英文千分位（"1,234,567"），
// 缺失值显示 "—"
// ==========================================

/// 缺失值占位
pub const MISSING: &str = "—";

/// 整数千分位："-1234567" → "-1,234,567"
pub fn thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// 浮点金额取整后加千分位（-0 显示为 0）
pub fn money(value: f64) -> String {
    let rounded = value.round();
    if rounded == 0.0 {
        return "0".to_string();
    }
    thousands(rounded as i64)
}

/// 表格中的金额列：截断为整数（与导出表一致）
pub fn money_truncated(value: f64) -> String {
    thousands(value.trunc() as i64)
}

/// 带符号的差额："+1,234" / "-1,234" / "0"
pub fn signed_money(value: f64) -> String {
    let truncated = value.trunc() as i64;
    if truncated > 0 {
        format!("+{}", thousands(truncated))
    } else {
        thousands(truncated)
    }
}

/// "1,234 VND"；None 或 NaN 为 "—"
pub fn format_vnd(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{} VND", money(v)),
        _ => MISSING.to_string(),
    }
}

/// "12.3%"；None 为 "—"
pub fn format_pct(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.1}%", v),
        _ => MISSING.to_string(),
    }
}

/// 成本页短金额："1.2 tỷ" / "12M" / "1,234"
pub fn short_money(value: f64) -> String {
    if value >= 1e9 {
        format!("{:.1} tỷ", value / 1e9)
    } else if value >= 1e6 {
        format!("{:.0}M", value / 1e6)
    } else {
        money(value)
    }
}

/// 预算页短金额（按绝对值分档，保留符号）："-1.25 tỷ" / "3.4M" / "1,234"
pub fn short_money_signed(value: Option<f64>) -> String {
    let v = match value {
        Some(v) if v.is_finite() => v,
        _ => return MISSING.to_string(),
    };
    if v.abs() >= 1e9 {
        format!("{:.2} tỷ", v / 1e9)
    } else if v.abs() >= 1e6 {
        format!("{:.1}M", v / 1e6)
    } else {
        money(v)
    }
}

/// HTML 转义（文本节点与属性值通用）
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}
