// ==========================================
// Trường Tồn 农场看板 - 成本事实行
// ==========================================
// 人工成本: fact_nhat_ky_san_xuat (按 农场/地块/班组/日期/工作 记录)
// 物资成本: fact_vat_tu (按 农场/地块/日期/物资 记录)
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::dimension::DateRange;

/// 人工成本行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaborCostRow {
    pub farm_code: String,
    pub lo_code: String,
    pub doi_code: String,
    /// 工序（cong_doan），空值为 "Không ghi"
    pub cong_doan: String,
    /// 工作名称，空值为 "Không ghi"
    pub ten_cong_viec: String,
    /// 所在月份的第一天
    pub thang: NaiveDate,
    /// 工日
    pub so_cong: f64,
    /// 金额 (VND)
    pub thanh_tien: f64,
    /// 是否为支援工（其他班组支援）
    pub is_ho_tro: bool,
}

/// 物资成本行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialCostRow {
    pub farm_code: String,
    pub lo_code: String,
    /// 物资类别：事实行取值 → 维度取值 → "Không xác định"
    pub loai_vat_tu: String,
    pub ten_vat_tu: String,
    pub thang: NaiveDate,
    pub thanh_tien: f64,
}

/// 成本查询条件
///
/// 空列表表示不过滤该维度（farm_ids 除外，调用方需保证非空）。
/// 作为缓存键使用，因此只包含可哈希字段。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CostFilter {
    pub farm_ids: Vec<i64>,
    pub date_range: DateRange,
    pub lot_types: Vec<String>,
    pub lots: Vec<String>,
    pub teams: Vec<String>,
    pub include_support: bool,
}

impl CostFilter {
    pub fn new(farm_ids: Vec<i64>, date_range: DateRange) -> Self {
        Self {
            farm_ids,
            date_range,
            lot_types: Vec::new(),
            lots: Vec::new(),
            teams: Vec::new(),
            // 成本页默认包含支援工
            include_support: true,
        }
    }
}
