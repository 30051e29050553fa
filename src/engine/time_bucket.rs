// ==========================================
// Trường Tồn 农场看板 - 时间分桶
// ==========================================
// 日/周/月/季/年 分桶与标签
// 周: 周一至周日，标签取周日（"dd/mm"）
// 重采样输出首末之间的连续桶，空桶不带统计值
// ==========================================

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use super::stats::{mean, median};
use crate::domain::types::{Granularity, UNKNOWN_MONTH_LABEL};

fn first_of_month(year: i32, month: u32) -> NaiveDate {
    // month 始终在 1..=12 内
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or_default()
}

fn add_months(d: NaiveDate, months: u32) -> NaiveDate {
    let total = d.year() * 12 + d.month0() as i32 + months as i32;
    first_of_month(total.div_euclid(12), total.rem_euclid(12) as u32 + 1)
}

/// 日期所在桶的起始日
pub fn bucket_start(g: Granularity, date: NaiveDate) -> NaiveDate {
    match g {
        Granularity::Day => date,
        Granularity::Week => date - Duration::days(date.weekday().num_days_from_monday() as i64),
        Granularity::Month => first_of_month(date.year(), date.month()),
        Granularity::Quarter => first_of_month(date.year(), (date.month0() / 3) * 3 + 1),
        Granularity::Year => first_of_month(date.year(), 1),
    }
}

/// 下一个桶的起始日（参数须为桶起始日）
pub fn next_bucket(g: Granularity, start: NaiveDate) -> NaiveDate {
    match g {
        Granularity::Day => start + Duration::days(1),
        Granularity::Week => start + Duration::days(7),
        Granularity::Month => add_months(start, 1),
        Granularity::Quarter => add_months(start, 3),
        Granularity::Year => add_months(start, 12),
    }
}

/// 桶的 x 轴标签
pub fn bucket_label(g: Granularity, start: NaiveDate) -> String {
    match g {
        Granularity::Day => start.format("%d/%m").to_string(),
        Granularity::Week => (start + Duration::days(6)).format("%d/%m").to_string(),
        Granularity::Month => start.format("%m/%Y").to_string(),
        Granularity::Quarter => format!("Q{}/{}", start.month0() / 3 + 1, start.year()),
        Granularity::Year => start.year().to_string(),
    }
}

/// 单个时间桶统计
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    pub start: NaiveDate,
    pub label: String,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub count: usize,
}

/// 重采样: (日期, 值) → 连续桶
pub fn resample(points: &[(NaiveDate, f64)], g: Granularity) -> Vec<Bucket> {
    let (Some(first), Some(last)) = (
        points.iter().map(|(d, _)| *d).min(),
        points.iter().map(|(d, _)| *d).max(),
    ) else {
        return Vec::new();
    };

    let end = bucket_start(g, last);
    let mut buckets = Vec::new();
    let mut cur = bucket_start(g, first);
    while cur <= end {
        let next = next_bucket(g, cur);
        let values: Vec<f64> = points
            .iter()
            .filter(|(d, _)| *d >= cur && *d < next)
            .map(|(_, v)| *v)
            .collect();
        buckets.push(Bucket {
            start: cur,
            label: bucket_label(g, cur),
            mean: mean(&values),
            median: median(&values),
            count: values.len(),
        });
        cur = next;
    }
    buckets
}

/// 月份标签 "mm/YYYY"
pub fn month_label(date: NaiveDate) -> String {
    date.format("%m/%Y").to_string()
}

/// "mm/YYYY" → (年, 月)，用于按时间顺序排序；无法解析的排在最后
pub fn month_key(label: &str) -> (i32, u32) {
    if label == UNKNOWN_MONTH_LABEL {
        return (9999, 99);
    }
    label
        .split_once('/')
        .and_then(|(m, y)| Some((y.trim().parse::<i32>().ok()?, m.trim().parse::<u32>().ok()?)))
        .unwrap_or((9999, 99))
}
