// ==========================================
// Trường Tồn 农场看板 - 定额完成仓储
// ==========================================
// 只取可计算完成率的记录:
//   dinh_muc > 0 且 klcv 非空 且 so_cong > 0 且 真实地块
// 完成率在 SQL 侧计算并保留 1 位小数
// ==========================================

use rusqlite::params_from_iter;
use rusqlite::types::Value;

use super::error::RepositoryResult;
use super::sql_builder::FilterSql;
use super::{connect, date_param};
use crate::domain::types::{REAL_LOT_TYPE, UNRECORDED_LABEL};
use crate::domain::{QuotaFilter, QuotaRecord};

pub struct QuotaRepository {
    db_path: String,
}

impl QuotaRepository {
    pub fn new(db_path: impl Into<String>) -> Self {
        Self { db_path: db_path.into() }
    }

    /// 加载定额完成记录（按日期升序）
    pub fn load_quota_records(&self, filter: &QuotaFilter) -> RepositoryResult<Vec<QuotaRecord>> {
        let conn = connect(&self.db_path)?;

        let mut where_ = FilterSql::new();
        where_
            .in_list("nk.farm_id", &filter.farm_ids)
            .push_with(
                "date(nk.ngay) BETWEEN ? AND ?",
                vec![date_param(filter.date_range.start), date_param(filter.date_range.end)],
            )
            .push("nk.dinh_muc > 0")
            .push("nk.klcv IS NOT NULL")
            .push("nk.so_cong > 0")
            .push_with("l.lo_type = ?", vec![REAL_LOT_TYPE.to_string()])
            .in_list_if_any("d.doi_code", &filter.teams)
            .in_list_if_any("l.lo_code", &filter.lots)
            .push_if(!filter.include_support, "nk.is_ho_tro = 0");

        let sql = format!(
            "SELECT f.farm_code, l.lo_code, d.doi_code,
                    cv.ma_cv,
                    COALESCE(NULLIF(TRIM(cv.ten_cong_viec), ''), ?) AS ten_cong_viec,
                    date(nk.ngay) AS ngay,
                    nk.so_cong, nk.klcv, nk.dinh_muc,
                    1.0 * nk.klcv / nk.so_cong AS ns_thuc,
                    ROUND(1.0 * nk.klcv / nk.so_cong / nk.dinh_muc * 100, 1) AS ti_le
             FROM fact_nhat_ky_san_xuat nk
             JOIN dim_farm f ON f.farm_id = nk.farm_id
             JOIN dim_lo l ON l.lo_id = nk.lo_id
             JOIN dim_doi d ON d.doi_id = nk.doi_id
             JOIN dim_cong_viec cv ON cv.cong_viec_id = nk.cong_viec_id
             {}
             ORDER BY date(nk.ngay)",
            where_.where_sql()
        );

        let mut params: Vec<Value> = vec![UNRECORDED_LABEL.to_string().into()];
        params.extend(where_.params().iter().cloned());

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(params.iter()), |row| {
                Ok(QuotaRecord {
                    farm_code: row.get(0)?,
                    lo_code: row.get(1)?,
                    doi_code: row.get(2)?,
                    ma_cv: row.get(3)?,
                    ten_cong_viec: row.get(4)?,
                    ngay: row.get(5)?,
                    so_cong: row.get(6)?,
                    klcv: row.get(7)?,
                    dinh_muc: row.get(8)?,
                    ns_thuc: row.get(9)?,
                    ti_le: row.get(10)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(rows = rows.len(), include_support = filter.include_support, "加载定额记录");
        Ok(rows)
    }
}
