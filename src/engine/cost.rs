// ==========================================
// Trường Tồn 农场看板 - 成本页聚合
// ==========================================
// 输入: 已加载的人工/物资成本行（raw = 未下钻, drilled = 已下钻）
// 输出: 各图表/表格的视图数据
// 农场卡片与地块明细表使用未下钻数据，其余使用已下钻数据
// ==========================================

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use super::stats::{round2, share_pct};
use super::time_bucket::month_label;
use crate::domain::{LaborCostRow, MaterialCostRow};
use crate::session::DrillSelection;

/// 下钻明细中列出的条目数（班组/工序）
pub const BREAKDOWN_TOP: usize = 10;

// ==========================================
// 通用视图行
// ==========================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedAmount {
    pub name: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyCost {
    pub month: NaiveDate,
    pub label: String,
    pub labor: f64,
    pub material: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyAmount {
    pub label: String,
    pub amount: f64,
}

/// 降序（金额相同按名称）
fn sort_desc_by<T>(rows: &mut [T], amount: impl Fn(&T) -> f64, name: impl Fn(&T) -> String) {
    rows.sort_by(|a, b| amount(b).total_cmp(&amount(a)).then_with(|| name(a).cmp(&name(b))));
}

/// 金额最高的 n 项，按升序排列（横向条形图自下而上）
fn top_ascending(mut items: Vec<NamedAmount>, n: usize) -> Vec<NamedAmount> {
    sort_desc_by(&mut items, |r| r.amount, |r| r.name.clone());
    items.truncate(n);
    items.reverse();
    items
}

fn sum_by<K: Ord, T>(rows: &[T], key: impl Fn(&T) -> K, amount: impl Fn(&T) -> f64) -> BTreeMap<K, f64> {
    let mut out = BTreeMap::new();
    for r in rows {
        *out.entry(key(r)).or_insert(0.0) += amount(r);
    }
    out
}

// ==========================================
// KPI
// ==========================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostTotals {
    pub labor: f64,
    pub material: f64,
    pub total: f64,
    pub labor_share_pct: Option<f64>,
    pub material_share_pct: Option<f64>,
    pub labor_days: f64,
}

pub fn totals(labor: &[LaborCostRow], material: &[MaterialCostRow]) -> CostTotals {
    let l: f64 = labor.iter().map(|r| r.thanh_tien).sum();
    let m: f64 = material.iter().map(|r| r.thanh_tien).sum();
    let total = l + m;
    let share = |part: f64| (total != 0.0).then(|| share_pct(part, total));
    CostTotals {
        labor: l,
        material: m,
        total,
        labor_share_pct: share(l),
        material_share_pct: share(m),
        labor_days: labor.iter().map(|r| r.so_cong).sum(),
    }
}

/// 月度趋势：人工与物资按月外连接，缺失补 0
pub fn monthly_trend(labor: &[LaborCostRow], material: &[MaterialCostRow]) -> Vec<MonthlyCost> {
    let mut months: BTreeMap<NaiveDate, (f64, f64)> = BTreeMap::new();
    for r in labor {
        months.entry(r.thang).or_default().0 += r.thanh_tien;
    }
    for r in material {
        months.entry(r.thang).or_default().1 += r.thanh_tien;
    }
    months
        .into_iter()
        .map(|(month, (l, m))| MonthlyCost {
            month,
            label: month_label(month),
            labor: l,
            material: m,
        })
        .collect()
}

// ==========================================
// 农场卡片
// ==========================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FarmCard {
    pub farm_code: String,
    pub labor: f64,
    pub material: f64,
    pub total: f64,
    pub labor_pct: Option<f64>,
    pub material_pct: Option<f64>,
    pub active: bool,
}

/// 农场卡片（基于未下钻数据），按总额降序
pub fn farm_cards(raw_labor: &[LaborCostRow], raw_material: &[MaterialCostRow], drill: &DrillSelection) -> Vec<FarmCard> {
    let labor = sum_by(raw_labor, |r| r.farm_code.clone(), |r| r.thanh_tien);
    let material = sum_by(raw_material, |r| r.farm_code.clone(), |r| r.thanh_tien);
    let farms: BTreeSet<&String> = labor.keys().chain(material.keys()).collect();

    let mut cards: Vec<FarmCard> = farms
        .into_iter()
        .map(|farm| {
            let l = labor.get(farm).copied().unwrap_or(0.0);
            let m = material.get(farm).copied().unwrap_or(0.0);
            let total = l + m;
            FarmCard {
                farm_code: farm.clone(),
                labor: l,
                material: m,
                total,
                labor_pct: (total != 0.0).then(|| share_pct(l, total)),
                material_pct: (total != 0.0).then(|| share_pct(m, total)),
                active: drill.farm.as_deref() == Some(farm.as_str()),
            }
        })
        .collect();
    sort_desc_by(&mut cards, |c| c.total, |c| c.farm_code.clone());
    cards
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FarmBreakdown {
    pub farm_code: String,
    pub trend: Vec<MonthlyCost>,
    /// 成本最高的班组（升序）
    pub top_teams: Vec<NamedAmount>,
}

/// 农场下钻明细（参数为已下钻数据）
pub fn farm_breakdown(farm_code: &str, labor: &[LaborCostRow], material: &[MaterialCostRow]) -> FarmBreakdown {
    let teams = sum_by(labor, |r| r.doi_code.clone(), |r| r.thanh_tien)
        .into_iter()
        .map(|(name, amount)| NamedAmount { name, amount })
        .collect();
    FarmBreakdown {
        farm_code: farm_code.to_string(),
        trend: monthly_trend(labor, material),
        top_teams: top_ascending(teams, BREAKDOWN_TOP),
    }
}

// ==========================================
// 地块气泡图
// ==========================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LotBubble {
    pub farm_code: String,
    pub lo_code: String,
    pub labor: f64,
    pub material: f64,
    pub total: f64,
    /// 气泡直径 10..60
    pub size: f64,
    pub active: bool,
}

fn lot_totals(labor: &[LaborCostRow], material: &[MaterialCostRow]) -> BTreeMap<(String, String), (f64, f64)> {
    let mut lots: BTreeMap<(String, String), (f64, f64)> = BTreeMap::new();
    for r in labor {
        lots.entry((r.farm_code.clone(), r.lo_code.clone())).or_default().0 += r.thanh_tien;
    }
    for r in material {
        lots.entry((r.farm_code.clone(), r.lo_code.clone())).or_default().1 += r.thanh_tien;
    }
    lots
}

/// 总额 > 0 的地块中取前 top_n，气泡大小按总额线性缩放
pub fn lot_bubbles(
    labor: &[LaborCostRow],
    material: &[MaterialCostRow],
    top_n: usize,
    active_lot: Option<&str>,
) -> Vec<LotBubble> {
    let mut bubbles: Vec<LotBubble> = lot_totals(labor, material)
        .into_iter()
        .filter(|(_, (l, m))| l + m > 0.0)
        .map(|((farm_code, lo_code), (l, m))| LotBubble {
            active: active_lot == Some(lo_code.as_str()),
            farm_code,
            lo_code,
            labor: l,
            material: m,
            total: l + m,
            size: 0.0,
        })
        .collect();
    sort_desc_by(&mut bubbles, |b| b.total, |b| format!("{}/{}", b.farm_code, b.lo_code));
    bubbles.truncate(top_n);

    let t_max = bubbles.iter().map(|b| b.total).fold(f64::MIN, f64::max);
    let t_min = bubbles.iter().map(|b| b.total).fold(f64::MAX, f64::min);
    let span = (t_max - t_min).max(1.0);
    for b in &mut bubbles {
        b.size = 10.0 + 50.0 * (b.total - t_min) / span;
    }
    bubbles
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LotBreakdown {
    pub lo_code: String,
    /// 地块所属农场（无数据时为空串）
    pub farm_code: String,
    pub trend: Vec<MonthlyCost>,
    /// 成本最高的工序（升序）
    pub top_stages: Vec<NamedAmount>,
}

pub fn lot_breakdown(lo_code: &str, labor: &[LaborCostRow], material: &[MaterialCostRow]) -> LotBreakdown {
    let lot_labor: Vec<LaborCostRow> = labor.iter().filter(|r| r.lo_code == lo_code).cloned().collect();
    let lot_material: Vec<MaterialCostRow> = material.iter().filter(|r| r.lo_code == lo_code).cloned().collect();

    let farm_code = lot_totals(&lot_labor, &lot_material)
        .into_iter()
        .find(|(_, (l, m))| l + m > 0.0)
        .map(|((farm, _), _)| farm)
        .unwrap_or_default();

    let stages = sum_by(&lot_labor, |r| r.cong_doan.clone(), |r| r.thanh_tien)
        .into_iter()
        .map(|(name, amount)| NamedAmount { name, amount })
        .collect();

    LotBreakdown {
        lo_code: lo_code.to_string(),
        farm_code,
        trend: monthly_trend(&lot_labor, &lot_material),
        top_stages: top_ascending(stages, BREAKDOWN_TOP),
    }
}

// ==========================================
// 班组（本队 / 支援）
// ==========================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamSplit {
    pub doi_code: String,
    pub own: f64,
    pub support: f64,
    pub total: f64,
    pub active: bool,
}

/// 每个班组本队与支援人工成本，总额 > 0，按总额升序
pub fn team_split(labor: &[LaborCostRow], active_team: Option<&str>) -> Vec<TeamSplit> {
    let mut teams: BTreeMap<String, (f64, f64)> = BTreeMap::new();
    for r in labor {
        let entry = teams.entry(r.doi_code.clone()).or_default();
        if r.is_ho_tro {
            entry.1 += r.thanh_tien;
        } else {
            entry.0 += r.thanh_tien;
        }
    }
    let mut out: Vec<TeamSplit> = teams
        .into_iter()
        .filter(|(_, (own, support))| own + support > 0.0)
        .map(|(doi_code, (own, support))| TeamSplit {
            active: active_team == Some(doi_code.as_str()),
            doi_code,
            own,
            support,
            total: own + support,
        })
        .collect();
    out.sort_by(|a, b| a.total.total_cmp(&b.total).then_with(|| a.doi_code.cmp(&b.doi_code)));
    out
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamBreakdown {
    pub doi_code: String,
    pub by_farm: Vec<NamedAmount>,
    pub trend: Vec<MonthlyAmount>,
}

pub fn team_breakdown(doi_code: &str, labor: &[LaborCostRow]) -> TeamBreakdown {
    let team_rows: Vec<&LaborCostRow> = labor.iter().filter(|r| r.doi_code == doi_code).collect();
    let by_farm = sum_by(&team_rows, |r| r.farm_code.clone(), |r| r.thanh_tien)
        .into_iter()
        .map(|(name, amount)| NamedAmount { name, amount })
        .collect();
    let trend = sum_by(&team_rows, |r| r.thang, |r| r.thanh_tien)
        .into_iter()
        .map(|(month, amount)| MonthlyAmount {
            label: month_label(month),
            amount,
        })
        .collect();
    TeamBreakdown {
        doi_code: doi_code.to_string(),
        by_farm,
        trend,
    }
}

// ==========================================
// 旭日图层级
// ==========================================

/// 旭日图节点（id 为路径，以 "/" 分隔）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SunburstNode {
    pub id: String,
    pub label: String,
    pub parent: String,
    pub value: f64,
}

/// 三级路径 → 节点列表；只计入正值
fn hierarchy<'a>(paths: impl Iterator<Item = ([&'a str; 3], f64)>) -> Vec<SunburstNode> {
    let mut nodes: BTreeMap<String, SunburstNode> = BTreeMap::new();
    for (path, value) in paths.filter(|(_, v)| *v > 0.0) {
        let mut parent = String::new();
        for label in path {
            let id = if parent.is_empty() {
                label.to_string()
            } else {
                format!("{}/{}", parent, label)
            };
            nodes
                .entry(id.clone())
                .or_insert_with(|| SunburstNode {
                    id: id.clone(),
                    label: label.to_string(),
                    parent: parent.clone(),
                    value: 0.0,
                })
                .value += value;
            parent = id;
        }
    }
    nodes.into_values().collect()
}

/// 人工: Farm → Đội → Công đoạn
pub fn labor_hierarchy(labor: &[LaborCostRow]) -> Vec<SunburstNode> {
    hierarchy(labor.iter().map(|r| {
        ([r.farm_code.as_str(), r.doi_code.as_str(), r.cong_doan.as_str()], r.thanh_tien)
    }))
}

/// 物资: Farm → Lô → Loại vật tư
pub fn material_hierarchy(material: &[MaterialCostRow]) -> Vec<SunburstNode> {
    hierarchy(material.iter().map(|r| {
        ([r.farm_code.as_str(), r.lo_code.as_str(), r.loai_vat_tu.as_str()], r.thanh_tien)
    }))
}

// ==========================================
// 明细表
// ==========================================

/// 明细表筛选（空列表 = 全部）
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize, Serialize)]
pub struct TableFilter {
    #[serde(default)]
    pub farms: Vec<String>,
    #[serde(default)]
    pub teams: Vec<String>,
    #[serde(default)]
    pub lots: Vec<String>,
    /// 人工表: 工序；物资表: 物资类别
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub search: Option<String>,
}

impl TableFilter {
    fn allows(list: &[String], value: &str) -> bool {
        list.is_empty() || list.iter().any(|v| v == value)
    }

    fn search_matches(&self, name: &str) -> bool {
        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(needle) => name.to_lowercase().contains(&needle.to_lowercase()),
        }
    }
}

/// 表格筛选下拉选项（来自筛选前的全部行）
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TableOptions {
    pub farms: Vec<String>,
    pub teams: Vec<String>,
    pub lots: Vec<String>,
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TablePage<T> {
    pub rows: Vec<T>,
    /// 筛选后的总行数
    pub total_matched: usize,
    pub top_n: usize,
    pub options: TableOptions,
}

fn distinct<'a>(values: impl Iterator<Item = &'a String>) -> Vec<String> {
    values.cloned().collect::<BTreeSet<_>>().into_iter().collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkRow {
    pub farm_code: String,
    pub doi_code: String,
    pub lo_code: String,
    pub cong_doan: String,
    pub ten_cong_viec: String,
    pub amount: f64,
    /// 占人工总成本 %（2 位小数）
    pub pct: f64,
}

/// 工作明细表
pub fn work_table(labor: &[LaborCostRow], filter: &TableFilter, top_n: usize) -> TablePage<WorkRow> {
    let total: f64 = labor.iter().map(|r| r.thanh_tien).sum();
    let grouped = sum_by(
        labor,
        |r| {
            (
                r.farm_code.clone(),
                r.doi_code.clone(),
                r.lo_code.clone(),
                r.cong_doan.clone(),
                r.ten_cong_viec.clone(),
            )
        },
        |r| r.thanh_tien,
    );

    let mut all: Vec<WorkRow> = grouped
        .into_iter()
        .filter(|(_, amount)| *amount > 0.0)
        .map(|((farm_code, doi_code, lo_code, cong_doan, ten_cong_viec), amount)| WorkRow {
            farm_code,
            doi_code,
            lo_code,
            cong_doan,
            ten_cong_viec,
            amount,
            pct: round2(share_pct(amount, total)),
        })
        .collect();
    sort_desc_by(&mut all, |r| r.amount, |r| r.ten_cong_viec.clone());

    let options = TableOptions {
        farms: distinct(all.iter().map(|r| &r.farm_code)),
        teams: distinct(all.iter().map(|r| &r.doi_code)),
        lots: distinct(all.iter().map(|r| &r.lo_code)),
        categories: distinct(all.iter().map(|r| &r.cong_doan)),
    };

    let matched: Vec<WorkRow> = all
        .into_iter()
        .filter(|r| {
            TableFilter::allows(&filter.farms, &r.farm_code)
                && TableFilter::allows(&filter.teams, &r.doi_code)
                && TableFilter::allows(&filter.lots, &r.lo_code)
                && TableFilter::allows(&filter.categories, &r.cong_doan)
                && filter.search_matches(&r.ten_cong_viec)
        })
        .collect();

    let total_matched = matched.len();
    TablePage {
        rows: matched.into_iter().take(top_n).collect(),
        total_matched,
        top_n,
        options,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialRow {
    pub farm_code: String,
    pub lo_code: String,
    pub loai_vat_tu: String,
    pub ten_vat_tu: String,
    pub amount: f64,
    /// 占物资总成本 %（2 位小数）
    pub pct: f64,
}

/// 物资明细表（teams 筛选不适用）
pub fn material_table(material: &[MaterialCostRow], filter: &TableFilter, top_n: usize) -> TablePage<MaterialRow> {
    let total: f64 = material.iter().map(|r| r.thanh_tien).sum();
    let grouped = sum_by(
        material,
        |r| (r.farm_code.clone(), r.lo_code.clone(), r.loai_vat_tu.clone(), r.ten_vat_tu.clone()),
        |r| r.thanh_tien,
    );

    let mut all: Vec<MaterialRow> = grouped
        .into_iter()
        .filter(|(_, amount)| *amount > 0.0)
        .map(|((farm_code, lo_code, loai_vat_tu, ten_vat_tu), amount)| MaterialRow {
            farm_code,
            lo_code,
            loai_vat_tu,
            ten_vat_tu,
            amount,
            pct: round2(share_pct(amount, total)),
        })
        .collect();
    sort_desc_by(&mut all, |r| r.amount, |r| r.ten_vat_tu.clone());

    let options = TableOptions {
        farms: distinct(all.iter().map(|r| &r.farm_code)),
        teams: Vec::new(),
        lots: distinct(all.iter().map(|r| &r.lo_code)),
        categories: distinct(all.iter().map(|r| &r.loai_vat_tu)),
    };

    let matched: Vec<MaterialRow> = all
        .into_iter()
        .filter(|r| {
            TableFilter::allows(&filter.farms, &r.farm_code)
                && TableFilter::allows(&filter.categories, &r.loai_vat_tu)
                && TableFilter::allows(&filter.lots, &r.lo_code)
                && filter.search_matches(&r.ten_vat_tu)
        })
        .collect();

    let total_matched = matched.len();
    TablePage {
        rows: matched.into_iter().take(top_n).collect(),
        total_matched,
        top_n,
        options,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LotCostRow {
    pub farm_code: String,
    pub lo_code: String,
    pub labor: f64,
    pub material: f64,
    pub total: f64,
}

/// 地块成本明细（未下钻数据），按总额降序
pub fn lot_table(raw_labor: &[LaborCostRow], raw_material: &[MaterialCostRow]) -> Vec<LotCostRow> {
    let mut rows: Vec<LotCostRow> = lot_totals(raw_labor, raw_material)
        .into_iter()
        .map(|((farm_code, lo_code), (l, m))| LotCostRow {
            farm_code,
            lo_code,
            labor: l,
            material: m,
            total: l + m,
        })
        .collect();
    sort_desc_by(&mut rows, |r| r.total, |r| format!("{}/{}", r.farm_code, r.lo_code));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::DrillDimension;
    use crate::engine::fixtures::{labor, material};

    fn sample() -> (Vec<LaborCostRow>, Vec<MaterialCostRow>) {
        let l = vec![
            labor("Farm 126", "A1", "D01", "Chăm sóc", "Làm cỏ", 1, 300.0, false),
            labor("Farm 126", "A1", "D01", "Chăm sóc", "Làm cỏ", 2, 100.0, false),
            labor("Farm 126", "A2", "D02", "Thu hoạch", "Cắt buồng", 2, 200.0, true),
            labor("Farm 157", "B1", "D02", "Chăm sóc", "Bón phân", 3, 400.0, false),
        ];
        let m = vec![
            material("Farm 126", "A1", "Phân bón", "Ure", 1, 500.0),
            material("Farm 157", "B1", "Thuốc BVTV", "Regent", 4, 1000.0),
        ];
        (l, m)
    }

    #[test]
    fn test_totals_and_shares() {
        let (l, m) = sample();
        let t = totals(&l, &m);
        assert_eq!(t.labor, 1000.0);
        assert_eq!(t.material, 1500.0);
        assert_eq!(t.total, 2500.0);
        assert_eq!(t.labor_share_pct, Some(40.0));
        assert_eq!(t.labor_days, 4.0);
        assert_eq!(totals(&[], &[]).labor_share_pct, None);
    }

    #[test]
    fn test_monthly_trend_outer_join() {
        let (l, m) = sample();
        let trend = monthly_trend(&l, &m);
        assert_eq!(trend.iter().map(|t| t.label.as_str()).collect::<Vec<_>>(), vec!["01/2025", "02/2025", "03/2025", "04/2025"]);
        assert_eq!(trend[0].labor, 300.0);
        assert_eq!(trend[0].material, 500.0);
        assert_eq!(trend[3].labor, 0.0);
        assert_eq!(trend[3].material, 1000.0);
    }

    #[test]
    fn test_farm_cards_sorted_and_active() {
        let (l, m) = sample();
        let mut drill = DrillSelection::default();
        drill.select(DrillDimension::Farm, "Farm 126");
        let cards = farm_cards(&l, &m, &drill);
        assert_eq!(cards[0].farm_code, "Farm 157");
        assert_eq!(cards[0].total, 1400.0);
        assert!(!cards[0].active);
        assert!(cards[1].active);
        assert_eq!(cards[1].material_pct, Some(500.0 / 1100.0 * 100.0));
    }

    #[test]
    fn test_lot_bubbles_sizes() {
        let (l, m) = sample();
        let bubbles = lot_bubbles(&l, &m, 2, Some("B1"));
        assert_eq!(bubbles.len(), 2);
        assert_eq!(bubbles[0].lo_code, "B1");
        assert!(bubbles[0].active);
        assert_eq!(bubbles[0].size, 60.0);
        assert_eq!(bubbles[1].size, 10.0);
    }

    #[test]
    fn test_team_split_ascending() {
        let (l, _) = sample();
        let split = team_split(&l, None);
        assert_eq!(split[0].doi_code, "D01");
        assert_eq!(split[0].own, 400.0);
        assert_eq!(split[1].doi_code, "D02");
        assert_eq!(split[1].support, 200.0);
        assert_eq!(split[1].total, 600.0);
    }

    #[test]
    fn test_breakdowns() {
        let (l, m) = sample();
        let fb = farm_breakdown("Farm 126", &l[..3], &m[..1]);
        assert_eq!(fb.top_teams.last().unwrap().name, "D01");

        let lb = lot_breakdown("B1", &l, &m);
        assert_eq!(lb.farm_code, "Farm 157");
        assert_eq!(lb.top_stages, vec![NamedAmount { name: "Chăm sóc".into(), amount: 400.0 }]);

        let tb = team_breakdown("D02", &l);
        assert_eq!(tb.by_farm.len(), 2);
        assert_eq!(tb.trend[0].label, "02/2025");
    }

    #[test]
    fn test_hierarchy_nodes() {
        let (l, _) = sample();
        let nodes = labor_hierarchy(&l);
        let root = nodes.iter().find(|n| n.id == "Farm 126").unwrap();
        assert_eq!(root.parent, "");
        assert_eq!(root.value, 600.0);
        let leaf = nodes.iter().find(|n| n.id == "Farm 126/D01/Chăm sóc").unwrap();
        assert_eq!(leaf.parent, "Farm 126/D01");
        assert_eq!(leaf.value, 400.0);
    }

    #[test]
    fn test_work_table_filter_and_search() {
        let (l, _) = sample();
        let page = work_table(&l, &TableFilter::default(), 2);
        assert_eq!(page.total_matched, 3);
        assert_eq!(page.rows.len(), 2);
        assert_eq!(page.rows[0].ten_cong_viec, "Bón phân");
        assert_eq!(page.rows[0].pct, 40.0);
        assert_eq!(page.options.categories, vec!["Chăm sóc".to_string(), "Thu hoạch".to_string()]);

        let filter = TableFilter {
            search: Some("LÀM".into()),
            ..Default::default()
        };
        let page = work_table(&l, &filter, 20);
        assert_eq!(page.total_matched, 1);
        assert_eq!(page.rows[0].amount, 400.0);
    }

    #[test]
    fn test_material_and_lot_tables() {
        let (l, m) = sample();
        let filter = TableFilter {
            categories: vec!["Phân bón".into()],
            ..Default::default()
        };
        let page = material_table(&m, &filter, 20);
        assert_eq!(page.total_matched, 1);
        assert_eq!(page.rows[0].pct, 33.33);

        let lots = lot_table(&l, &m);
        assert_eq!(lots[0].lo_code, "B1");
        assert_eq!(lots[0].total, 1400.0);
        assert_eq!(lots.last().unwrap().lo_code, "A2");
    }
}
