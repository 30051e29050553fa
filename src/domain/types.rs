// ==========================================
// Trường Tồn 农场看板 - 领域类型定义
// ==========================================
// 数仓中的枚举值以越南语字面量存储（'Thực tế' / 'Dự toán' 等），
// 这里统一映射为强类型，解析失败时保留原值由调用方决定如何处理。
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 真实地块的 lo_type 取值（定额分析只看真实地块）
pub const REAL_LOT_TYPE: &str = "Lô thực";

/// 工序/工作名称为空时的占位
pub const UNRECORDED_LABEL: &str = "Không ghi";

/// 物资类别/名称缺失时的占位
pub const UNKNOWN_MATERIAL_LABEL: &str = "Không xác định";

/// 预算行缺少月份时的占位
pub const UNKNOWN_MONTH_LABEL: &str = "Không rõ tháng";

// ==========================================
// 下钻维度 (Drill Dimension)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrillDimension {
    Farm,
    Team,
    Lot,
}

impl DrillDimension {
    pub const ALL: [DrillDimension; 3] = [DrillDimension::Farm, DrillDimension::Team, DrillDimension::Lot];

    /// 页面上显示的维度名
    pub fn label(&self) -> &'static str {
        match self {
            DrillDimension::Farm => "Farm",
            DrillDimension::Team => "Đội",
            DrillDimension::Lot => "Lô",
        }
    }
}

impl fmt::Display for DrillDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrillDimension::Farm => write!(f, "farm"),
            DrillDimension::Team => write!(f, "team"),
            DrillDimension::Lot => write!(f, "lot"),
        }
    }
}

impl FromStr for DrillDimension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "farm" => Ok(DrillDimension::Farm),
            "team" | "doi" => Ok(DrillDimension::Team),
            "lot" | "lo" => Ok(DrillDimension::Lot),
            other => Err(format!("未知下钻维度: {}", other)),
        }
    }
}

// ==========================================
// 页面标识 (Page Key)
// ==========================================
// 成本页与定额页各自维护独立的下钻状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageKey {
    Cost,
    Quota,
}

impl PageKey {
    /// URL 路径片段
    pub fn slug(&self) -> &'static str {
        match self {
            PageKey::Cost => "chi-phi",
            PageKey::Quota => "dinh-muc",
        }
    }
}

impl FromStr for PageKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chi-phi" | "cost" => Ok(PageKey::Cost),
            "dinh-muc" | "quota" => Ok(PageKey::Quota),
            other => Err(format!("未知页面: {}", other)),
        }
    }
}

// ==========================================
// 时间粒度 (Granularity)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Granularity {
    Day,
    Week,
    #[default]
    Month,
    Quarter,
    Year,
}

impl Granularity {
    pub const ALL: [Granularity; 5] = [
        Granularity::Day,
        Granularity::Week,
        Granularity::Month,
        Granularity::Quarter,
        Granularity::Year,
    ];

    /// 下拉框显示名
    pub fn label(&self) -> &'static str {
        match self {
            Granularity::Day => "Ngày",
            Granularity::Week => "Tuần",
            Granularity::Month => "Tháng",
            Granularity::Quarter => "Quý",
            Granularity::Year => "Năm",
        }
    }

    /// 查询参数编码（D/W/M/Q/Y）
    pub fn code(&self) -> &'static str {
        match self {
            Granularity::Day => "D",
            Granularity::Week => "W",
            Granularity::Month => "M",
            Granularity::Quarter => "Q",
            Granularity::Year => "Y",
        }
    }
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "D" | "Ngày" => Ok(Granularity::Day),
            "W" | "Tuần" => Ok(Granularity::Week),
            "M" | "Tháng" => Ok(Granularity::Month),
            "Q" | "Quý" => Ok(Granularity::Quarter),
            "Y" | "Năm" => Ok(Granularity::Year),
            other => Err(format!("未知时间粒度: {}", other)),
        }
    }
}

// ==========================================
// 预算数据类别 (Data Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataKind {
    Actual,  // Thực tế
    Planned, // Dự toán
}

impl DataKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataKind::Actual => "Thực tế",
            DataKind::Planned => "Dự toán",
        }
    }

    pub fn parse(raw: &str) -> Option<DataKind> {
        match raw.trim() {
            "Thực tế" => Some(DataKind::Actual),
            "Dự toán" => Some(DataKind::Planned),
            _ => None,
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// 预算范围 (Budget Scope)
// ==========================================
// 预算内: 有计划的支出；预算外: 无计划的实际支出（计划恒为 0）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BudgetScope {
    InBudget,
    OutOfBudget,
}

impl BudgetScope {
    pub const ALL: [BudgetScope; 2] = [BudgetScope::InBudget, BudgetScope::OutOfBudget];

    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetScope::InBudget => "Trong dự toán",
            BudgetScope::OutOfBudget => "Ngoài dự toán",
        }
    }

    pub fn parse(raw: &str) -> Option<BudgetScope> {
        match raw.trim() {
            "Trong dự toán" => Some(BudgetScope::InBudget),
            "Ngoài dự toán" => Some(BudgetScope::OutOfBudget),
            _ => None,
        }
    }
}

impl fmt::Display for BudgetScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drill_dimension_parse() {
        assert_eq!("farm".parse::<DrillDimension>().unwrap(), DrillDimension::Farm);
        assert_eq!("Doi".parse::<DrillDimension>().unwrap(), DrillDimension::Team);
        assert_eq!("lot".parse::<DrillDimension>().unwrap(), DrillDimension::Lot);
        assert!("plot-x".parse::<DrillDimension>().is_err());
    }

    #[test]
    fn test_granularity_default_is_month() {
        assert_eq!(Granularity::default(), Granularity::Month);
        for g in Granularity::ALL {
            assert_eq!(g.code().parse::<Granularity>().unwrap(), g);
            assert_eq!(g.label().parse::<Granularity>().unwrap(), g);
        }
    }

    #[test]
    fn test_budget_literals() {
        assert_eq!(DataKind::parse("Thực tế"), Some(DataKind::Actual));
        assert_eq!(DataKind::parse(" Dự toán "), Some(DataKind::Planned));
        assert_eq!(DataKind::parse("Khác"), None);
        assert_eq!(BudgetScope::parse("Ngoài dự toán"), Some(BudgetScope::OutOfBudget));
        assert_eq!(BudgetScope::InBudget.to_string(), "Trong dự toán");
    }

    #[test]
    fn test_page_key_slug_roundtrip() {
        assert_eq!(PageKey::Cost.slug().parse::<PageKey>().unwrap(), PageKey::Cost);
        assert_eq!(PageKey::Quota.slug().parse::<PageKey>().unwrap(), PageKey::Quota);
    }
}
