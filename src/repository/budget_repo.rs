// ==========================================
// Trường Tồn 农场看板 - 预算对比仓储 (Farm 195)
// ==========================================
// 来源: fact_195_tong（由外部推送脚本或 import_budget_csv 写入）
// ==========================================

use rusqlite::{params, Row};

use super::error::RepositoryResult;
use super::{connect, parse_date_lenient};
use crate::domain::BudgetLine;

pub struct BudgetRepository {
    db_path: String,
}

const SELECT_BUDGET_LINES: &str = r#"
    SELECT
        tong_id,
        loai_du_lieu,
        loai_chi_phi,
        gia_tri,
        ngay,
        ngay_bat_dau_khau_hao,
        COALESCE(ngay, ngay_bat_dau_khau_hao) AS ngay_eff,
        lo, lo_2, loai_lo, dien_tich_ha,
        COALESCE(hang_muc_du_toan_cong,
                 hang_muc_du_toan_vat_tu,
                 hang_muc_du_toan_dtbd) AS hang_muc,
        ngoai_du_toan,
        doi_thuc_hien,
        hang_muc_cong_viec,
        ma_cv, ma_dtbd,
        ten_vt_dtbd, phan_loai_dtbd,
        vat_tu, so_luong, loai_vat_tu,
        so_cong, dvt, don_gia,
        vu, tien_do_vu
    FROM fact_195_tong
    ORDER BY loai_chi_phi, ngay_eff NULLS LAST, tong_id
"#;

impl BudgetRepository {
    pub fn new(db_path: impl Into<String>) -> Self {
        Self { db_path: db_path.into() }
    }

    /// 加载全部预算对比行
    pub fn load_budget_lines(&self) -> RepositoryResult<Vec<BudgetLine>> {
        let conn = connect(&self.db_path)?;
        let mut stmt = conn.prepare(SELECT_BUDGET_LINES)?;
        let lines = stmt
            .query_map([], map_budget_row)?
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(rows = lines.len(), "加载 fact_195_tong");
        Ok(lines)
    }

    /// 写入一批预算行（导入用，单事务）
    ///
    /// # 返回
    /// - 写入行数
    pub fn insert_budget_lines(&self, lines: &[BudgetLine]) -> RepositoryResult<usize> {
        let mut conn = connect(&self.db_path)?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO fact_195_tong (
                    loai_du_lieu, loai_chi_phi, gia_tri, ngay, ngay_bat_dau_khau_hao,
                    lo, lo_2, loai_lo, dien_tich_ha,
                    hang_muc_du_toan_cong, ngoai_du_toan, doi_thuc_hien, hang_muc_cong_viec,
                    ma_cv, ma_dtbd, ten_vt_dtbd, phan_loai_dtbd,
                    vat_tu, so_luong, loai_vat_tu, so_cong, dvt, don_gia, vu, tien_do_vu
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13,
                          ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25)",
            )?;
            for l in lines {
                stmt.execute(params![
                    l.loai_du_lieu,
                    l.loai_chi_phi,
                    l.gia_tri,
                    l.ngay,
                    l.ngay_bat_dau_khau_hao,
                    l.lo,
                    l.lo_2,
                    l.loai_lo,
                    l.dien_tich_ha,
                    l.hang_muc,
                    l.ngoai_du_toan,
                    l.doi_thuc_hien,
                    l.hang_muc_cong_viec,
                    l.ma_cv,
                    l.ma_dtbd,
                    l.ten_vt_dtbd,
                    l.phan_loai_dtbd,
                    l.vat_tu,
                    l.so_luong,
                    l.loai_vat_tu,
                    l.so_cong,
                    l.dvt,
                    l.don_gia,
                    l.vu,
                    l.tien_do_vu,
                ])?;
            }
        }
        tx.commit()?;

        tracing::info!(rows = lines.len(), "写入 fact_195_tong");
        Ok(lines.len())
    }
}

/// 行映射：日期列宽松解析（上游推送的日期格式不统一）
fn map_budget_row(row: &Row<'_>) -> rusqlite::Result<BudgetLine> {
    let ngay: Option<String> = row.get(4)?;
    let khau_hao: Option<String> = row.get(5)?;
    let eff: Option<String> = row.get(6)?;

    let ngay = parse_date_lenient(ngay.as_deref());
    let ngay_bat_dau_khau_hao = parse_date_lenient(khau_hao.as_deref());
    // COALESCE 取到的是文本，文本不可解析时再退回折旧日
    let ngay_eff = parse_date_lenient(eff.as_deref()).or(ngay).or(ngay_bat_dau_khau_hao);

    Ok(BudgetLine {
        tong_id: row.get(0)?,
        loai_du_lieu: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        loai_chi_phi: row.get(2)?,
        gia_tri: row.get::<_, Option<f64>>(3)?.unwrap_or(0.0),
        ngay,
        ngay_bat_dau_khau_hao,
        ngay_eff,
        lo: row.get(7)?,
        lo_2: row.get(8)?,
        loai_lo: row.get(9)?,
        dien_tich_ha: row.get(10)?,
        hang_muc: row.get(11)?,
        ngoai_du_toan: row.get(12)?,
        doi_thuc_hien: row.get(13)?,
        hang_muc_cong_viec: row.get(14)?,
        ma_cv: row.get(15)?,
        ma_dtbd: row.get(16)?,
        ten_vt_dtbd: row.get(17)?,
        phan_loai_dtbd: row.get(18)?,
        vat_tu: row.get(19)?,
        so_luong: row.get(20)?,
        loai_vat_tu: row.get(21)?,
        so_cong: row.get(22)?,
        dvt: row.get(23)?,
        don_gia: row.get(24)?,
        vu: row.get(25)?,
        tien_do_vu: row.get(26)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::temp_warehouse;
    use chrono::NaiveDate;
    use rusqlite::Connection;

    #[test]
    fn test_effective_date_and_line_item_coalesce() {
        let (_tmp, path) = temp_warehouse();
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            r#"
            INSERT INTO fact_195_tong (loai_du_lieu, loai_chi_phi, gia_tri, ngay, ngay_bat_dau_khau_hao,
                                       hang_muc_du_toan_cong, hang_muc_du_toan_vat_tu, ngoai_du_toan)
            VALUES
              ('Thực tế', 'Vật Tư', 2000000, NULL, '2025-02-01', NULL, 'Phân bón', 'Trong dự toán'),
              ('Dự toán', 'Công', 5000000, '2025-01-15', NULL, 'Làm cỏ', NULL, 'Trong dự toán'),
              ('Thực tế', 'Công', 700000, NULL, NULL, NULL, NULL, 'Ngoài dự toán');
            "#,
        )
        .unwrap();

        let repo = BudgetRepository::new(path);
        let lines = repo.load_budget_lines().unwrap();
        assert_eq!(lines.len(), 3);

        // 按类别排序，同类别内无日期行排最后
        assert_eq!(lines[0].category(), "Công");
        assert_eq!(lines[0].ngay_eff, NaiveDate::from_ymd_opt(2025, 1, 15));
        assert_eq!(lines[0].hang_muc.as_deref(), Some("Làm cỏ"));
        assert_eq!(lines[1].ngay_eff, None);
        assert_eq!(lines[2].ngay_eff, NaiveDate::from_ymd_opt(2025, 2, 1));
        assert_eq!(lines[2].hang_muc.as_deref(), Some("Phân bón"));
    }

    #[test]
    fn test_insert_then_load() {
        let (_tmp, path) = temp_warehouse();
        let repo = BudgetRepository::new(path);
        let line = crate::domain::budget::fixtures::line(
            crate::domain::DataKind::Planned,
            "ĐTBĐ",
            Some("Hệ thống tưới"),
            crate::domain::BudgetScope::InBudget,
            NaiveDate::from_ymd_opt(2025, 5, 1),
            12_000_000.0,
        );
        assert_eq!(repo.insert_budget_lines(&[line.clone()]).unwrap(), 1);

        let loaded = repo.load_budget_lines().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].hang_muc, line.hang_muc);
        assert_eq!(loaded[0].gia_tri, 12_000_000.0);
        assert_eq!(loaded[0].ngay_eff, line.ngay_eff);
    }
}
