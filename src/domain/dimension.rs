// ==========================================
// Trường Tồn 农场看板 - 维度实体
// ==========================================
// Farm / Đội / Lô 维度记录，对本系统只读
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// 农场 (dim_farm)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Farm {
    pub farm_id: i64,
    pub farm_code: String,
}

/// 地块选项：在所选农场的生产日志中实际出现过的地块
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotOption {
    pub lo_code: String,
    pub lo_type: Option<String>,
    pub farm_code: String,
}

/// 班组选项
///
/// `farms` 为该班组出现过的农场编码（排序后以 ", " 连接）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamOption {
    pub doi_code: String,
    pub farms: String,
}

impl TeamOption {
    /// 下拉框标签：跨多个农场的班组附带农场列表
    pub fn label(&self) -> String {
        if self.farms.contains(',') {
            format!("{} ({})", self.doi_code, self.farms)
        } else {
            self.doi_code.clone()
        }
    }
}

/// 级联筛选项（地块 + 班组）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub lots: Vec<LotOption>,
    pub teams: Vec<TeamOption>,
}

impl FilterOptions {
    /// 地块类型（去重排序）
    pub fn lot_types(&self) -> Vec<String> {
        let set: BTreeSet<String> = self.lots.iter().filter_map(|l| l.lo_type.clone()).collect();
        set.into_iter().collect()
    }

    /// 属于给定地块类型的地块编码（去重排序）
    pub fn lot_codes_for_types(&self, lot_types: &[String]) -> Vec<String> {
        let set: BTreeSet<String> = self
            .lots
            .iter()
            .filter(|l| l.lo_type.as_ref().map_or(false, |t| lot_types.contains(t)))
            .map(|l| l.lo_code.clone())
            .collect();
        set.into_iter().collect()
    }
}

/// 日期区间（闭区间）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn is_valid(&self) -> bool {
        self.start <= self.end
    }

    /// 页眉显示："dd/mm/YYYY → dd/mm/YYYY"
    pub fn label(&self) -> String {
        format!("{} → {}", self.start.format("%d/%m/%Y"), self.end.format("%d/%m/%Y"))
    }
}

/// 班组 → 地块映射（dim_lo_doi）
///
/// 物资没有班组字段，按班组下钻物资时经由此映射换算为地块集合。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotTeamMap {
    teams: BTreeMap<String, BTreeSet<String>>,
}

impl LotTeamMap {
    pub fn insert(&mut self, doi_code: impl Into<String>, lo_code: impl Into<String>) {
        self.teams.entry(doi_code.into()).or_default().insert(lo_code.into());
    }

    /// 班组负责的地块；无映射时返回 None
    pub fn lots_of(&self, doi_code: &str) -> Option<&BTreeSet<String>> {
        self.teams.get(doi_code).filter(|s| !s.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_label_multi_farm() {
        let single = TeamOption { doi_code: "D01".into(), farms: "Farm 126".into() };
        let multi = TeamOption { doi_code: "D02".into(), farms: "Farm 126, Farm 157".into() };
        assert_eq!(single.label(), "D01");
        assert_eq!(multi.label(), "D02 (Farm 126, Farm 157)");
    }

    #[test]
    fn test_lot_codes_for_types() {
        let opts = FilterOptions {
            lots: vec![
                LotOption { lo_code: "A1".into(), lo_type: Some("Lô thực".into()), farm_code: "Farm 126".into() },
                LotOption { lo_code: "VP".into(), lo_type: Some("Lô ảo".into()), farm_code: "Farm 126".into() },
                LotOption { lo_code: "A1".into(), lo_type: Some("Lô thực".into()), farm_code: "Farm 157".into() },
            ],
            teams: vec![],
        };
        assert_eq!(opts.lot_types(), vec!["Lô thực".to_string(), "Lô ảo".to_string()]);
        assert_eq!(opts.lot_codes_for_types(&["Lô thực".to_string()]), vec!["A1".to_string()]);
        assert!(opts.lot_codes_for_types(&[]).is_empty());
    }

    #[test]
    fn test_lot_team_map_lookup() {
        let mut map = LotTeamMap::default();
        map.insert("D01", "A1");
        map.insert("D01", "A2");
        assert_eq!(map.lots_of("D01").map(|s| s.len()), Some(2));
        assert!(map.lots_of("D09").is_none());
    }
}
