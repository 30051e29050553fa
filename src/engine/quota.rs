// ==========================================
// Trường Tồn 农场看板 - 定额完成率聚合
// ==========================================
// 完成率 = 每工产量 / 定额 × 100（由仓储层计算为 ti_le）
// by_farm 使用未下钻数据，其余使用已下钻数据
// ==========================================

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use super::stats::{max, mean, median, min, round1, share_pct};
use super::time_bucket::resample;
use crate::domain::{Granularity, QuotaRecord};

/// 达到定额的完成率
pub const FULL_COMPLETION_PCT: f64 = 100.0;

// ==========================================
// 完成率分档
// ==========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotaBand {
    Good,
    Warn,
    Poor,
}

/// 分档: ≥ good 为 Good，≥ warn 为 Warn，其余 Poor
pub fn band(pct: f64, good: f64, warn: f64) -> QuotaBand {
    if pct >= good {
        QuotaBand::Good
    } else if pct >= warn {
        QuotaBand::Warn
    } else {
        QuotaBand::Poor
    }
}

fn ratios<'a>(records: impl IntoIterator<Item = &'a QuotaRecord>) -> Vec<f64> {
    records.into_iter().map(|r| r.ti_le).collect()
}

// ==========================================
// KPI
// ==========================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuotaKpis {
    pub count: usize,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    /// 完成率 ≥ 100% 的记录数
    pub over_full: usize,
    /// 上项占比 %
    pub over_full_share: f64,
}

pub fn kpis(records: &[QuotaRecord]) -> QuotaKpis {
    let values = ratios(records);
    let over_full = values.iter().filter(|v| **v >= FULL_COMPLETION_PCT).count();
    QuotaKpis {
        count: values.len(),
        mean: mean(&values),
        median: median(&values),
        over_full,
        over_full_share: share_pct(over_full as f64, values.len() as f64),
    }
}

// ==========================================
// 时间趋势
// ==========================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub label: String,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionTrend {
    pub granularity: Granularity,
    pub points: Vec<TrendPoint>,
    /// y 轴上限 max(最大均值 × 1.2, 120)
    pub y_max: f64,
}

pub fn completion_trend(records: &[QuotaRecord], granularity: Granularity) -> CompletionTrend {
    let points: Vec<(chrono::NaiveDate, f64)> = records.iter().map(|r| (r.ngay, r.ti_le)).collect();
    let points: Vec<TrendPoint> = resample(&points, granularity)
        .into_iter()
        .map(|b| TrendPoint {
            label: b.label,
            mean: b.mean.map(round1),
            median: b.median.map(round1),
            count: b.count,
        })
        .collect();
    let max_mean = points.iter().filter_map(|p| p.mean).fold(0.0, f64::max);
    CompletionTrend {
        granularity,
        points,
        y_max: (max_mean * 1.2).max(120.0),
    }
}

// ==========================================
// 分组均值（农场 / 班组 / 地块）
// ==========================================

/// 分组后的平均完成率
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatioGroup {
    /// 图表显示标签
    pub label: String,
    /// 点击后写入下钻的值
    pub drill_value: String,
    pub mean: f64,
    pub count: usize,
}

fn group_means<K: Ord>(records: &[QuotaRecord], key: impl Fn(&QuotaRecord) -> K) -> BTreeMap<K, (f64, usize)> {
    let mut groups: BTreeMap<K, Vec<f64>> = BTreeMap::new();
    for r in records {
        groups.entry(key(r)).or_default().push(r.ti_le);
    }
    groups
        .into_iter()
        .filter_map(|(k, v)| mean(&v).map(|m| (k, (round1(m), v.len()))))
        .collect()
}

fn ascending(mut groups: Vec<RatioGroup>) -> Vec<RatioGroup> {
    groups.sort_by(|a, b| a.mean.total_cmp(&b.mean).then_with(|| a.label.cmp(&b.label)));
    groups
}

/// 农场均值（未下钻数据），按农场代码排序
pub fn by_farm(raw: &[QuotaRecord]) -> Vec<RatioGroup> {
    group_means(raw, |r| r.farm_code.clone())
        .into_iter()
        .map(|(farm, (mean, count))| RatioGroup {
            label: farm.clone(),
            drill_value: farm,
            mean,
            count,
        })
        .collect()
}

/// 班组均值（跨农场合并），样本数 ≥ min_samples，升序
pub fn by_team(records: &[QuotaRecord], min_samples: usize) -> Vec<RatioGroup> {
    ascending(
        group_means(records, |r| r.doi_code.clone())
            .into_iter()
            .filter(|(_, (_, count))| *count >= min_samples)
            .map(|(team, (mean, count))| RatioGroup {
                label: team.clone(),
                drill_value: team,
                mean,
                count,
            })
            .collect(),
    )
}

/// 地块标签 "F126 · A1"
pub fn lot_label(farm_code: &str, lo_code: &str) -> String {
    format!("{} · {}", farm_code.replace("Farm ", "F"), lo_code)
}

/// 从地块标签取回地块代码；不含分隔符时返回 None
pub fn lot_from_label(label: &str) -> Option<&str> {
    label.split_once(" · ").map(|(_, lot)| lot)
}

/// (农场, 地块) 均值，样本数 ≥ min_samples，升序
pub fn by_lot(records: &[QuotaRecord], min_samples: usize) -> Vec<RatioGroup> {
    ascending(
        group_means(records, |r| (r.farm_code.clone(), r.lo_code.clone()))
            .into_iter()
            .filter(|(_, (_, count))| *count >= min_samples)
            .map(|((farm, lot), (mean, count))| RatioGroup {
                label: lot_label(&farm, &lot),
                drill_value: lot,
                mean,
                count,
            })
            .collect(),
    )
}

/// 横向条形图 x 轴上限 max(max × 1.25, 125)
pub fn horizontal_axis_max(groups: &[RatioGroup]) -> f64 {
    let m = groups.iter().map(|g| g.mean).fold(0.0, f64::max);
    (m * 1.25).max(125.0)
}

/// 农场柱状图 y 轴上限 max(max × 1.3, 120)
pub fn farm_axis_max(groups: &[RatioGroup]) -> f64 {
    let m = groups.iter().map(|g| g.mean).fold(0.0, f64::max);
    (m * 1.3).max(120.0)
}

// ==========================================
// 工作 × 月份 热力图
// ==========================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WorkHeatmap {
    /// 行: 平均完成率最高的工作（降序）
    pub works: Vec<String>,
    /// 列: "YYYY-MM"
    pub months: Vec<String>,
    /// cells[行][列]，无记录为 None
    pub cells: Vec<Vec<Option<f64>>>,
}

pub fn work_heatmap(records: &[QuotaRecord], top_n: usize) -> WorkHeatmap {
    let mut by_work: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for r in records {
        by_work.entry(r.ten_cong_viec.clone()).or_default().push(r.ti_le);
    }
    let mut works: Vec<(String, f64)> = by_work
        .into_iter()
        .filter_map(|(w, v)| mean(&v).map(|m| (w, m)))
        .collect();
    works.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    works.truncate(top_n);
    let works: Vec<String> = works.into_iter().map(|(w, _)| w).collect();

    let selected: Vec<&QuotaRecord> = records.iter().filter(|r| works.contains(&r.ten_cong_viec)).collect();
    let months: Vec<String> = selected
        .iter()
        .map(|r| r.ngay.format("%Y-%m").to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut acc: BTreeMap<(String, String), Vec<f64>> = BTreeMap::new();
    for r in &selected {
        acc.entry((r.ten_cong_viec.clone(), r.ngay.format("%Y-%m").to_string()))
            .or_default()
            .push(r.ti_le);
    }

    let cells = works
        .iter()
        .map(|w| {
            months
                .iter()
                .map(|m| acc.get(&(w.clone(), m.clone())).and_then(|v| mean(v)).map(round1))
                .collect()
        })
        .collect();

    WorkHeatmap { works, months, cells }
}

// ==========================================
// 按工作汇总表
// ==========================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkSummaryRow {
    pub ma_cv: Option<String>,
    pub ten_cong_viec: String,
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    /// 总工日（1 位小数）
    pub total_labor_days: f64,
}

/// 每个 (工作代码, 工作名) 的完成率统计，按均值升序
pub fn work_summary(records: &[QuotaRecord]) -> Vec<WorkSummaryRow> {
    let mut groups: BTreeMap<(Option<String>, String), Vec<&QuotaRecord>> = BTreeMap::new();
    for r in records {
        groups.entry((r.ma_cv.clone(), r.ten_cong_viec.clone())).or_default().push(r);
    }

    let mut rows: Vec<(f64, WorkSummaryRow)> = groups
        .into_iter()
        .filter_map(|((ma_cv, ten_cong_viec), rs)| {
            let values = ratios(rs.iter().copied());
            let exact_mean = mean(&values)?;
            Some((
                exact_mean,
                WorkSummaryRow {
                    ma_cv,
                    ten_cong_viec,
                    count: values.len(),
                    mean: round1(exact_mean),
                    min: round1(min(&values)?),
                    max: round1(max(&values)?),
                    median: round1(median(&values)?),
                    total_labor_days: round1(rs.iter().map(|r| r.so_cong).sum()),
                },
            ))
        })
        .collect();
    rows.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.ten_cong_viec.cmp(&b.1.ten_cong_viec)));
    rows.into_iter().map(|(_, row)| row).collect()
}
