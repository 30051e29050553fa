// ==========================================
// Trường Tồn 农场看板 - 预算 vs 实际 (Farm 195)
// ==========================================
// 实现率只在 "Trong dự toán" 范围内计算；
// "Ngoài dự toán" 只有实际，没有计划
// 无月份的行不受月份筛选影响
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::cost::NamedAmount;
use super::stats::calc_pct;
use super::time_bucket::month_key;
use crate::domain::types::UNKNOWN_MONTH_LABEL;
use crate::domain::{BudgetLine, BudgetScope, DataKind};

/// 预算内缺少科目时的分组名
pub const UNKNOWN_ITEM_LABEL: &str = "(không rõ)";

/// 预算外缺少科目时的分组名
pub const NO_ITEM_LABEL: &str = "(không có hạng mục)";

/// 导出文件名
pub const EXPORT_FILE_NAME: &str = "farm195_du_toan_vs_thuc_te.csv";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

// ==========================================
// 筛选
// ==========================================

/// 预算页筛选
///
/// 类别/月份/范围必须至少选一项（由 API 层校验）；科目为空表示全部
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetFilter {
    pub categories: Vec<String>,
    /// "mm/YYYY"
    pub months: Vec<String>,
    pub scopes: Vec<BudgetScope>,
    pub line_items: Vec<String>,
}

impl BudgetFilter {
    /// 全选
    pub fn all(options: &BudgetOptions) -> Self {
        Self {
            categories: options.categories.clone(),
            months: options.months.clone(),
            scopes: options.scopes.clone(),
            line_items: Vec::new(),
        }
    }

    pub fn matches(&self, line: &BudgetLine) -> bool {
        let category_ok = line
            .loai_chi_phi
            .as_deref()
            .is_some_and(|c| self.categories.iter().any(|s| s == c));
        let month = line.month_label();
        let month_ok = month == UNKNOWN_MONTH_LABEL || self.months.contains(&month);
        let scope_ok = line.scope().is_some_and(|s| self.scopes.contains(&s));
        let item_ok = self.line_items.is_empty()
            || line
                .hang_muc
                .as_deref()
                .is_some_and(|h| self.line_items.iter().any(|s| s == h));
        category_ok && month_ok && scope_ok && item_ok
    }
}

/// 筛选下拉选项（来自全部行）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BudgetOptions {
    pub categories: Vec<String>,
    /// 按时间排序，不含 "Không rõ tháng"
    pub months: Vec<String>,
    pub scopes: Vec<BudgetScope>,
    pub line_items: Vec<String>,
}

impl BudgetOptions {
    pub fn from_lines(lines: &[BudgetLine]) -> Self {
        let categories: BTreeSet<String> = lines.iter().filter_map(|l| l.loai_chi_phi.clone()).collect();
        let line_items: BTreeSet<String> = lines.iter().filter_map(|l| l.hang_muc.clone()).collect();
        let mut months: Vec<String> = lines
            .iter()
            .filter(|l| l.ngay_eff.is_some())
            .map(|l| l.month_label())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        months.sort_by_key(|m| month_key(m));

        Self {
            categories: categories.into_iter().collect(),
            months,
            scopes: BudgetScope::ALL.to_vec(),
            line_items: line_items.into_iter().collect(),
        }
    }
}

// ==========================================
// 实现率分档
// ==========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PctBand {
    /// > 100%
    Over,
    /// 80% ~ 100%
    OnTrack,
    /// < 80%，尚未支出完
    Under,
    /// 无计划
    NoPlan,
}

pub fn pct_band(pct: Option<f64>, warn_pct: f64) -> PctBand {
    match pct {
        None => PctBand::NoPlan,
        Some(p) if p > 100.0 => PctBand::Over,
        Some(p) if p >= warn_pct => PctBand::OnTrack,
        Some(_) => PctBand::Under,
    }
}

// ==========================================
// 视图行
// ==========================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BudgetKpis {
    /// 预算内实际
    pub actual_in: f64,
    /// 预算内计划
    pub planned_in: f64,
    pub pct: Option<f64>,
    /// 预算外实际
    pub actual_out: f64,
    /// 实际 − 计划（预算内）
    pub variance: f64,
}

impl BudgetKpis {
    pub fn is_over(&self) -> bool {
        self.variance > 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineItemRow {
    pub category: String,
    pub item: String,
    pub actual: f64,
    pub planned: f64,
    pub pct: Option<f64>,
    pub band: PctBand,
}

impl LineItemRow {
    /// 图表标签 "类别 · 科目"
    pub fn label(&self) -> String {
        format!("{} · {}", self.category, self.item)
    }

    /// 进度条宽度 min(pct, 100)
    pub fn bar_width(&self) -> f64 {
        self.pct.map_or(0.0, |p| p.min(100.0))
    }

    /// 超出部分 max(pct − 100, 0)
    pub fn overrun(&self) -> f64 {
        self.pct.map_or(0.0, |p| (p - 100.0).max(0.0))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyBudgetRow {
    pub label: String,
    pub actual: f64,
    pub planned: f64,
    pub pct: Option<f64>,
    pub band: PctBand,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyBudget {
    pub rows: Vec<MonthlyBudgetRow>,
    /// 实现率折线 y 轴上限
    pub pct_y_max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTab {
    pub category: String,
    pub actual: f64,
    pub planned: f64,
    pub pct: Option<f64>,
    pub variance: f64,
    /// 按实际升序
    pub items: Vec<LineItemRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutOfBudgetItem {
    pub category: String,
    pub item: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutOfBudgetDetail {
    pub category: String,
    pub month: String,
    pub lot: Option<String>,
    pub item: Option<String>,
    pub work_item: Option<String>,
    pub material: Option<String>,
    pub ma_dtbd: Option<String>,
    pub team: Option<String>,
    pub amount: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OutOfBudget {
    /// 按金额升序
    pub items: Vec<OutOfBudgetItem>,
    /// 堆叠顺序（类别逆序）
    pub stack_order: Vec<String>,
    /// 饼图，按金额降序
    pub by_category: Vec<NamedAmount>,
    pub details: Vec<OutOfBudgetDetail>,
}

impl OutOfBudget {
    pub fn is_empty(&self) -> bool {
        self.details.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotRow {
    pub category: String,
    pub item: String,
    pub scope: BudgetScope,
    pub month: String,
    pub actual: f64,
    pub planned: f64,
    pub variance: f64,
    pub pct: Option<f64>,
}

// ==========================================
// 已筛选的预算视图
// ==========================================

/// 按 DataKind 拆分后的已筛选行
#[derive(Debug, Clone)]
pub struct BudgetView<'a> {
    pub actual: Vec<&'a BudgetLine>,
    pub planned: Vec<&'a BudgetLine>,
    warn_pct: f64,
}

fn item_of(line: &BudgetLine, missing: &str) -> String {
    line.hang_muc.clone().unwrap_or_else(|| missing.to_string())
}

fn in_budget<'a, 'b>(lines: &'b [&'a BudgetLine]) -> impl Iterator<Item = &'a BudgetLine> + 'b {
    lines.iter().copied().filter(|l| l.is_in_budget())
}

/// 实际/计划按键外连接
fn outer_join<K: Ord + Clone>(
    actual: impl Iterator<Item = (K, f64)>,
    planned: impl Iterator<Item = (K, f64)>,
) -> BTreeMap<K, (f64, f64)> {
    let mut out: BTreeMap<K, (f64, f64)> = BTreeMap::new();
    for (k, v) in actual {
        out.entry(k).or_default().0 += v;
    }
    for (k, v) in planned {
        out.entry(k).or_default().1 += v;
    }
    out
}

impl<'a> BudgetView<'a> {
    /// 应用筛选并拆分实际/计划（未识别的 loai_du_lieu 丢弃）
    pub fn new(lines: &'a [BudgetLine], filter: &BudgetFilter, warn_pct: f64) -> Self {
        let mut actual = Vec::new();
        let mut planned = Vec::new();
        for line in lines.iter().filter(|l| filter.matches(l)) {
            match line.kind() {
                Some(DataKind::Actual) => actual.push(line),
                Some(DataKind::Planned) => planned.push(line),
                None => {}
            }
        }
        Self {
            actual,
            planned,
            warn_pct,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.actual.is_empty() && self.planned.is_empty()
    }

    fn row(&self, category: String, item: String, actual: f64, planned: f64) -> LineItemRow {
        let pct = calc_pct(actual, planned);
        LineItemRow {
            category,
            item,
            actual,
            planned,
            pct,
            band: pct_band(pct, self.warn_pct),
        }
    }

    pub fn kpis(&self) -> BudgetKpis {
        let actual_in: f64 = in_budget(&self.actual).map(|l| l.gia_tri).sum();
        let planned_in: f64 = in_budget(&self.planned).map(|l| l.gia_tri).sum();
        let actual_out: f64 = self
            .actual
            .iter()
            .filter(|l| l.scope() == Some(BudgetScope::OutOfBudget))
            .map(|l| l.gia_tri)
            .sum();
        BudgetKpis {
            actual_in,
            planned_in,
            pct: calc_pct(actual_in, planned_in),
            actual_out,
            variance: actual_in - planned_in,
        }
    }

    /// 预算内 (类别, 科目) 实际 vs 计划；类别升序，类别内实际降序
    pub fn by_line_item(&self) -> Vec<LineItemRow> {
        let key = |l: &BudgetLine| (l.category().to_string(), item_of(l, UNKNOWN_ITEM_LABEL));
        let joined = outer_join(
            in_budget(&self.actual).map(|l| (key(l), l.gia_tri)),
            in_budget(&self.planned).map(|l| (key(l), l.gia_tri)),
        );
        let mut rows: Vec<LineItemRow> = joined
            .into_iter()
            .map(|((category, item), (a, p))| self.row(category, item, a, p))
            .collect();
        rows.sort_by(|a, b| {
            a.category
                .cmp(&b.category)
                .then_with(|| b.actual.total_cmp(&a.actual))
                .then_with(|| a.item.cmp(&b.item))
        });
        rows
    }

    /// 按月实际 vs 计划（预算内），按时间排序
    pub fn monthly(&self) -> MonthlyBudget {
        let joined = outer_join(
            in_budget(&self.actual).map(|l| (l.month_label(), l.gia_tri)),
            in_budget(&self.planned).map(|l| (l.month_label(), l.gia_tri)),
        );
        let mut rows: Vec<MonthlyBudgetRow> = joined
            .into_iter()
            .map(|(label, (actual, planned))| {
                let pct = calc_pct(actual, planned);
                MonthlyBudgetRow {
                    label,
                    actual,
                    planned,
                    pct,
                    band: pct_band(pct, self.warn_pct),
                }
            })
            .collect();
        rows.sort_by_key(|r| month_key(&r.label));

        let pct_y_max = rows
            .iter()
            .filter_map(|r| r.pct)
            .reduce(f64::max)
            .map_or(150.0, |m| m * 1.3)
            .max(120.0);
        MonthlyBudget { rows, pct_y_max }
    }

    /// 每个出现在预算内实际中的类别一页
    pub fn category_tabs(&self) -> Vec<CategoryTab> {
        let categories: BTreeSet<&str> = in_budget(&self.actual)
            .filter_map(|l| l.loai_chi_phi.as_deref())
            .collect();

        categories
            .into_iter()
            .map(|category| {
                let of_category = |l: &&BudgetLine| l.category() == category;
                let joined = outer_join(
                    in_budget(&self.actual)
                        .filter(|l| of_category(l))
                        .map(|l| (item_of(l, UNKNOWN_ITEM_LABEL), l.gia_tri)),
                    in_budget(&self.planned)
                        .filter(|l| of_category(l))
                        .map(|l| (item_of(l, UNKNOWN_ITEM_LABEL), l.gia_tri)),
                );
                let mut items: Vec<LineItemRow> = joined
                    .into_iter()
                    .map(|(item, (a, p))| self.row(category.to_string(), item, a, p))
                    .collect();
                items.sort_by(|a, b| a.actual.total_cmp(&b.actual).then_with(|| a.item.cmp(&b.item)));

                let actual: f64 = items.iter().map(|r| r.actual).sum();
                let planned: f64 = items.iter().map(|r| r.planned).sum();
                CategoryTab {
                    category: category.to_string(),
                    actual,
                    planned,
                    pct: calc_pct(actual, planned),
                    variance: actual - planned,
                    items,
                }
            })
            .collect()
    }

    /// 预算外实际支出
    pub fn out_of_budget(&self) -> OutOfBudget {
        let rows: Vec<&BudgetLine> = self
            .actual
            .iter()
            .copied()
            .filter(|l| l.scope() == Some(BudgetScope::OutOfBudget))
            .collect();
        if rows.is_empty() {
            return OutOfBudget::default();
        }

        let mut grouped: BTreeMap<(String, String), f64> = BTreeMap::new();
        let mut per_category: BTreeMap<String, f64> = BTreeMap::new();
        for l in &rows {
            *grouped
                .entry((l.category().to_string(), item_of(l, NO_ITEM_LABEL)))
                .or_default() += l.gia_tri;
            *per_category.entry(l.category().to_string()).or_default() += l.gia_tri;
        }

        let mut items: Vec<OutOfBudgetItem> = grouped
            .into_iter()
            .map(|((category, item), amount)| OutOfBudgetItem { category, item, amount })
            .collect();
        items.sort_by(|a, b| a.amount.total_cmp(&b.amount));

        let stack_order: Vec<String> = per_category.keys().rev().cloned().collect();

        let mut by_category: Vec<NamedAmount> = per_category
            .into_iter()
            .map(|(name, amount)| NamedAmount { name, amount })
            .collect();
        by_category.sort_by(|a, b| b.amount.total_cmp(&a.amount));

        let details = rows
            .iter()
            .map(|l| OutOfBudgetDetail {
                category: l.category().to_string(),
                month: l.month_label(),
                lot: l.lo.clone(),
                item: l.hang_muc.clone(),
                work_item: l.hang_muc_cong_viec.clone(),
                material: l.vat_tu.clone(),
                ma_dtbd: l.ma_dtbd.clone(),
                team: l.doi_thuc_hien.clone(),
                amount: l.gia_tri,
            })
            .collect();

        OutOfBudget {
            items,
            stack_order,
            by_category,
            details,
        }
    }

    /// 完整透视: (类别, 科目, 范围, 月份)
    pub fn full_pivot(&self) -> Vec<PivotRow> {
        let key = |l: &BudgetLine| {
            l.scope().map(|scope| {
                (
                    l.category().to_string(),
                    item_of(l, UNKNOWN_ITEM_LABEL),
                    scope,
                    l.month_label(),
                )
            })
        };
        let joined = outer_join(
            self.actual.iter().copied().filter_map(|l| key(l).map(|k| (k, l.gia_tri))),
            self.planned.iter().copied().filter_map(|l| key(l).map(|k| (k, l.gia_tri))),
        );
        let mut rows: Vec<PivotRow> = joined
            .into_iter()
            .map(|((category, item, scope, month), (actual, planned))| PivotRow {
                category,
                item,
                scope,
                month,
                actual,
                planned,
                variance: actual - planned,
                pct: calc_pct(actual, planned),
            })
            .collect();
        rows.sort_by(|a, b| {
            a.category
                .cmp(&b.category)
                .then_with(|| month_key(&a.month).cmp(&month_key(&b.month)))
                .then_with(|| a.scope.as_str().cmp(b.scope.as_str()))
                .then_with(|| a.item.cmp(&b.item))
        });
        rows
    }
}

/// 透视表导出为带 BOM 的 UTF-8 CSV
pub fn to_csv(rows: &[PivotRow]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(UTF8_BOM.to_vec());
    writer.write_record([
        "loai_chi_phi",
        "hang_muc",
        "ngoai_du_toan",
        "thang_str",
        "thuc_te",
        "du_toan",
        "chenh_lech",
        "pct",
    ])?;
    for r in rows {
        writer.write_record([
            r.category.clone(),
            r.item.clone(),
            r.scope.as_str().to_string(),
            r.month.clone(),
            r.actual.to_string(),
            r.planned.to_string(),
            r.variance.to_string(),
            r.pct.map(|p| p.to_string()).unwrap_or_default(),
        ])?;
    }
    writer.into_inner().map_err(|e| csv::Error::from(e.into_error()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::budget::fixtures::line;
    use chrono::NaiveDate;

    fn d(m: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2025, m, 10)
    }

    fn sample() -> Vec<BudgetLine> {
        use BudgetScope::*;
        use DataKind::*;
        vec![
            line(Planned, "Công", Some("Làm cỏ"), InBudget, d(1), 1000.0),
            line(Actual, "Công", Some("Làm cỏ"), InBudget, d(1), 1200.0),
            line(Planned, "Công", Some("Bón phân"), InBudget, d(2), 500.0),
            line(Actual, "Công", Some("Bón phân"), InBudget, d(2), 300.0),
            line(Actual, "Vật Tư", None, InBudget, d(2), 100.0),
            line(Actual, "Vật Tư", Some("Phân"), OutOfBudget, d(3), 250.0),
            line(Actual, "ĐTBĐ", None, OutOfBudget, None, 400.0),
        ]
    }

    fn view(lines: &[BudgetLine]) -> BudgetView<'_> {
        let filter = BudgetFilter::all(&BudgetOptions::from_lines(lines));
        BudgetView::new(lines, &filter, 80.0)
    }

    #[test]
    fn test_options_and_filter() {
        let lines = sample();
        let opts = BudgetOptions::from_lines(&lines);
        assert_eq!(opts.categories, vec!["Công", "Vật Tư", "ĐTBĐ"]);
        assert_eq!(opts.months, vec!["01/2025", "02/2025", "03/2025"]);
        assert_eq!(opts.line_items, vec!["Bón phân", "Làm cỏ", "Phân"]);

        let mut filter = BudgetFilter::all(&opts);
        filter.months = vec!["01/2025".into()];
        let v = BudgetView::new(&lines, &filter, 80.0);
        // 01/2025 两行 + 无月份的一行
        assert_eq!(v.actual.len() + v.planned.len(), 3);

        filter.line_items = vec!["Phân".into()];
        filter.months = opts.months.clone();
        let v = BudgetView::new(&lines, &filter, 80.0);
        assert_eq!(v.actual.len(), 1);
        assert!(v.planned.is_empty());
    }

    #[test]
    fn test_kpis() {
        let lines = sample();
        let k = view(&lines).kpis();
        assert_eq!(k.actual_in, 1600.0);
        assert_eq!(k.planned_in, 1500.0);
        assert_eq!(k.pct, Some(106.7));
        assert_eq!(k.actual_out, 650.0);
        assert_eq!(k.variance, 100.0);
        assert!(k.is_over());
    }

    #[test]
    fn test_pct_band() {
        assert_eq!(pct_band(None, 80.0), PctBand::NoPlan);
        assert_eq!(pct_band(Some(100.0), 80.0), PctBand::OnTrack);
        assert_eq!(pct_band(Some(100.1), 80.0), PctBand::Over);
        assert_eq!(pct_band(Some(79.9), 80.0), PctBand::Under);
    }

    #[test]
    fn test_by_line_item_sorted_with_unknown_item() {
        let lines = sample();
        let rows = view(&lines).by_line_item();
        let labels: Vec<String> = rows.iter().map(|r| r.label()).collect();
        assert_eq!(labels, vec!["Công · Làm cỏ", "Công · Bón phân", "Vật Tư · (không rõ)"]);
        assert_eq!(rows[0].pct, Some(120.0));
        assert_eq!(rows[0].bar_width(), 100.0);
        assert_eq!(rows[0].overrun(), 20.0);
        assert_eq!(rows[1].band, PctBand::Under);
        assert_eq!(rows[2].band, PctBand::NoPlan);
    }

    #[test]
    fn test_monthly_and_axis() {
        let lines = sample();
        let m = view(&lines).monthly();
        assert_eq!(m.rows.len(), 2);
        assert_eq!(m.rows[0].label, "01/2025");
        assert_eq!(m.rows[1].actual, 400.0);
        assert_eq!(m.rows[1].pct, Some(80.0));
        assert!((m.pct_y_max - 156.0).abs() < 1e-9);
    }

    #[test]
    fn test_category_tabs() {
        let lines = sample();
        let tabs = view(&lines).category_tabs();
        assert_eq!(tabs.len(), 2);
        assert_eq!(tabs[0].category, "Công");
        assert_eq!(tabs[0].items[0].item, "Bón phân");
        assert_eq!(tabs[0].variance, 0.0);
        assert_eq!(tabs[1].pct, None);
    }

    #[test]
    fn test_out_of_budget() {
        let lines = sample();
        let out = view(&lines).out_of_budget();
        assert_eq!(out.items[0].item, "Phân");
        assert_eq!(out.items[1].item, "(không có hạng mục)");
        assert_eq!(out.stack_order, vec!["ĐTBĐ", "Vật Tư"]);
        assert_eq!(out.by_category[0].name, "ĐTBĐ");
        assert_eq!(out.details.len(), 2);
        assert_eq!(out.details[1].month, "Không rõ tháng");
    }

    #[test]
    fn test_full_pivot_and_csv() {
        let lines = sample();
        let pivot = view(&lines).full_pivot();
        assert_eq!(pivot.len(), 5);
        assert_eq!(pivot[0].item, "Làm cỏ");
        assert_eq!(pivot[0].variance, 200.0);
        assert_eq!(pivot.last().unwrap().category, "ĐTBĐ");

        let bytes = to_csv(&pivot).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));
        let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
        let mut lines_out = text.lines();
        assert_eq!(lines_out.next().unwrap(), "loai_chi_phi,hang_muc,ngoai_du_toan,thang_str,thuc_te,du_toan,chenh_lech,pct");
        assert_eq!(lines_out.next().unwrap(), "Công,Làm cỏ,Trong dự toán,01/2025,1200,1000,200,120");
    }
}
