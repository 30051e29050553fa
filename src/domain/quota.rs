// ==========================================
// Trường Tồn 农场看板 - 定额完成记录
// ==========================================
// 完成率 = (产量 / 工日) / 定额 × 100
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::dimension::DateRange;

/// 定额完成记录（一条生产日志）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotaRecord {
    pub farm_code: String,
    pub lo_code: String,
    pub doi_code: String,
    pub ma_cv: Option<String>,
    pub ten_cong_viec: String,
    pub ngay: NaiveDate,
    pub so_cong: f64,
    pub klcv: f64,
    pub dinh_muc: f64,
    /// 实际工效 = klcv / so_cong
    pub ns_thuc: f64,
    /// 完成率 (%)，保留 1 位小数
    pub ti_le: f64,
}

/// 定额查询条件
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuotaFilter {
    pub farm_ids: Vec<i64>,
    pub date_range: DateRange,
    pub teams: Vec<String>,
    pub lots: Vec<String>,
    pub include_support: bool,
}

impl QuotaFilter {
    pub fn new(farm_ids: Vec<i64>, date_range: DateRange) -> Self {
        Self {
            farm_ids,
            date_range,
            teams: Vec::new(),
            lots: Vec::new(),
            // 定额页默认排除支援工
            include_support: false,
        }
    }
}
