// ==========================================
// Trường Tồn 农场看板 - 预算对比行 (Farm 195)
// ==========================================
// 来源: fact_195_tong
// 每行是 "Thực tế"（实际）或 "Dự toán"（预算）的一笔金额
// ==========================================

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::types::{BudgetScope, DataKind, UNKNOWN_MONTH_LABEL};

/// 预算对比行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetLine {
    pub tong_id: i64,
    /// 原始 loai_du_lieu 字面量
    pub loai_du_lieu: String,
    /// 费用类别（Công / Vật Tư / Vườn Ươm / ĐTBĐ ...）
    pub loai_chi_phi: Option<String>,
    pub gia_tri: f64,
    pub ngay: Option<NaiveDate>,
    pub ngay_bat_dau_khau_hao: Option<NaiveDate>,
    /// 有效日期 = ngay，缺失时取折旧开始日
    pub ngay_eff: Option<NaiveDate>,
    pub lo: Option<String>,
    pub lo_2: Option<String>,
    pub loai_lo: Option<String>,
    pub dien_tich_ha: Option<f64>,
    /// 预算科目（三类科目列合并）
    pub hang_muc: Option<String>,
    /// 原始 ngoai_du_toan 字面量
    pub ngoai_du_toan: Option<String>,
    pub doi_thuc_hien: Option<String>,
    pub hang_muc_cong_viec: Option<String>,
    pub ma_cv: Option<String>,
    pub ma_dtbd: Option<String>,
    pub ten_vt_dtbd: Option<String>,
    pub phan_loai_dtbd: Option<String>,
    pub vat_tu: Option<String>,
    pub so_luong: Option<f64>,
    pub loai_vat_tu: Option<String>,
    pub so_cong: Option<f64>,
    pub dvt: Option<String>,
    pub don_gia: Option<f64>,
    pub vu: Option<String>,
    pub tien_do_vu: Option<f64>,
}

impl BudgetLine {
    pub fn kind(&self) -> Option<DataKind> {
        DataKind::parse(&self.loai_du_lieu)
    }

    pub fn scope(&self) -> Option<BudgetScope> {
        self.ngoai_du_toan.as_deref().and_then(BudgetScope::parse)
    }

    pub fn is_in_budget(&self) -> bool {
        self.scope() == Some(BudgetScope::InBudget)
    }

    /// 月份标签 "mm/YYYY"；无日期为 "Không rõ tháng"
    pub fn month_label(&self) -> String {
        match self.ngay_eff {
            Some(d) => d.format("%m/%Y").to_string(),
            None => UNKNOWN_MONTH_LABEL.to_string(),
        }
    }

    /// 月份排序键 (年, 月)；无日期排在最后
    pub fn month_key(&self) -> (i32, u32) {
        match self.ngay_eff {
            Some(d) => (d.year(), d.month()),
            None => (9999, 99),
        }
    }

    pub fn category(&self) -> &str {
        self.loai_chi_phi.as_deref().unwrap_or("")
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::line;
    use super::*;

    #[test]
    fn test_month_label_and_key() {
        let d = NaiveDate::from_ymd_opt(2025, 3, 14);
        let l = line(DataKind::Actual, "Công", Some("Làm cỏ"), BudgetScope::InBudget, d, 1.0);
        assert_eq!(l.month_label(), "03/2025");
        assert_eq!(l.month_key(), (2025, 3));

        let undated = line(DataKind::Actual, "Công", None, BudgetScope::OutOfBudget, None, 1.0);
        assert_eq!(undated.month_label(), "Không rõ tháng");
        assert!(undated.month_key() > l.month_key());
        assert!(!undated.is_in_budget());
    }
}
