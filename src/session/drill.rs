// ==========================================
// Trường Tồn 农场看板 - 下钻选择状态
// ==========================================
// 规则: 每个维度至多一个值；点击某个图表会替换之前的下钻
// ==========================================

use serde::{Deserialize, Serialize};

use crate::domain::types::DrillDimension;

/// 无下钻时的标签
pub const ALL_SCOPE_LABEL: &str = "Toàn bộ";

/// 单页下钻状态（farm / team / lot 三个可空值）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrillSelection {
    pub farm: Option<String>,
    pub team: Option<String>,
    pub lot: Option<String>,
}

impl DrillSelection {
    pub fn get(&self, dim: DrillDimension) -> Option<&str> {
        match dim {
            DrillDimension::Farm => self.farm.as_deref(),
            DrillDimension::Team => self.team.as_deref(),
            DrillDimension::Lot => self.lot.as_deref(),
        }
    }

    /// 选中某维度的值并清空另外两个维度
    ///
    /// # 返回
    /// - true: 状态发生变化
    /// - false: 该值已处于选中状态（无操作）
    pub fn select(&mut self, dim: DrillDimension, value: impl Into<String>) -> bool {
        let value = value.into();
        if value.is_empty() || self.get(dim) == Some(value.as_str()) {
            return false;
        }
        self.clear_all();
        match dim {
            DrillDimension::Farm => self.farm = Some(value),
            DrillDimension::Team => self.team = Some(value),
            DrillDimension::Lot => self.lot = Some(value),
        }
        true
    }

    /// 农场卡片按钮：未选中则选中，已选中则清空全部
    pub fn toggle_farm(&mut self, farm_code: impl Into<String>) {
        let farm_code = farm_code.into();
        if self.farm.as_deref() == Some(farm_code.as_str()) {
            self.clear_all();
        } else {
            self.select(DrillDimension::Farm, farm_code);
        }
    }

    pub fn clear_all(&mut self) {
        self.farm = None;
        self.team = None;
        self.lot = None;
    }

    pub fn is_empty(&self) -> bool {
        self.farm.is_none() && self.team.is_none() && self.lot.is_none()
    }

    /// 当前生效的下钻（按 Farm → Đội → Lô 顺序）
    pub fn active(&self) -> Vec<(DrillDimension, &str)> {
        DrillDimension::ALL
            .iter()
            .filter_map(|d| self.get(*d).map(|v| (*d, v)))
            .collect()
    }

    /// 表格提示用的范围标签，例如 "Farm 126 · Đội D01 · Lô A1"
    ///
    /// include_team = false 时省略班组（物资表没有班组列）
    pub fn label(&self, include_team: bool) -> String {
        let mut parts = Vec::new();
        if let Some(farm) = &self.farm {
            parts.push(farm.clone());
        }
        if include_team {
            if let Some(team) = &self.team {
                parts.push(format!("{} {}", DrillDimension::Team.label(), team));
            }
        }
        if let Some(lot) = &self.lot {
            parts.push(format!("{} {}", DrillDimension::Lot.label(), lot));
        }
        if parts.is_empty() {
            ALL_SCOPE_LABEL.to_string()
        } else {
            parts.join(" · ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_clears_other_dimensions() {
        let mut s = DrillSelection::default();
        assert!(s.select(DrillDimension::Farm, "Farm 126"));
        assert!(s.select(DrillDimension::Lot, "A1"));
        assert_eq!(s.farm, None);
        assert_eq!(s.lot.as_deref(), Some("A1"));
        assert_eq!(s.active(), vec![(DrillDimension::Lot, "A1")]);
    }

    #[test]
    fn test_select_same_value_is_noop() {
        let mut s = DrillSelection::default();
        s.select(DrillDimension::Team, "D01");
        let before = s.clone();
        assert!(!s.select(DrillDimension::Team, "D01"));
        assert_eq!(s, before);
        assert!(!s.select(DrillDimension::Lot, ""));
    }

    #[test]
    fn test_toggle_farm() {
        let mut s = DrillSelection::default();
        s.select(DrillDimension::Team, "D01");
        s.toggle_farm("Farm 157");
        assert_eq!(s.farm.as_deref(), Some("Farm 157"));
        assert_eq!(s.team, None);
        s.toggle_farm("Farm 157");
        assert!(s.is_empty());
    }

    #[test]
    fn test_label() {
        let mut s = DrillSelection::default();
        assert_eq!(s.label(true), "Toàn bộ");
        s.select(DrillDimension::Team, "BVTV");
        assert_eq!(s.label(true), "Đội BVTV");
        assert_eq!(s.label(false), "Toàn bộ");
        s.select(DrillDimension::Lot, "A1");
        assert_eq!(s.label(true), "Lô A1");
    }
}
