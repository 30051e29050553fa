// ==========================================
// Trường Tồn 农场看板 - 下钻过滤
// ==========================================
// 物资行没有班组列: 班组下钻经 dim_lo_doi 换算为该班组的地块集合，
// 班组没有映射地块时结果为空
// ==========================================

use crate::domain::{LaborCostRow, LotTeamMap, MaterialCostRow, QuotaRecord};
use crate::session::DrillSelection;

fn matches(filter: Option<&str>, value: &str) -> bool {
    filter.map_or(true, |f| f == value)
}

/// 人工成本行: farm / team / lot
pub fn labor_rows(rows: &[LaborCostRow], drill: &DrillSelection) -> Vec<LaborCostRow> {
    rows.iter()
        .filter(|r| {
            matches(drill.farm.as_deref(), &r.farm_code)
                && matches(drill.team.as_deref(), &r.doi_code)
                && matches(drill.lot.as_deref(), &r.lo_code)
        })
        .cloned()
        .collect()
}

/// 物资成本行: farm / team(经地块映射) / lot
pub fn material_rows(
    rows: &[MaterialCostRow],
    drill: &DrillSelection,
    lot_team: &LotTeamMap,
) -> Vec<MaterialCostRow> {
    let team_lots = match drill.team.as_deref() {
        Some(team) => match lot_team.lots_of(team) {
            Some(lots) => Some(lots),
            None => return Vec::new(),
        },
        None => None,
    };

    rows.iter()
        .filter(|r| {
            matches(drill.farm.as_deref(), &r.farm_code)
                && team_lots.map_or(true, |lots| lots.contains(&r.lo_code))
                && matches(drill.lot.as_deref(), &r.lo_code)
        })
        .cloned()
        .collect()
}

/// 定额记录: farm / team / lot
pub fn quota_rows(rows: &[QuotaRecord], drill: &DrillSelection) -> Vec<QuotaRecord> {
    rows.iter()
        .filter(|r| {
            matches(drill.farm.as_deref(), &r.farm_code)
                && matches(drill.team.as_deref(), &r.doi_code)
                && matches(drill.lot.as_deref(), &r.lo_code)
        })
        .cloned()
        .collect()
}
