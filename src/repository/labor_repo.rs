// ==========================================
// Trường Tồn 农场看板 - 人工成本仓储
// ==========================================
// 来源: fact_nhat_ky_san_xuat ⨝ dim_farm/dim_lo/dim_doi/dim_cong_viec
// ==========================================

use rusqlite::params_from_iter;

use super::error::RepositoryResult;
use super::sql_builder::FilterSql;
use super::{connect, date_param};
use crate::domain::types::UNRECORDED_LABEL;
use crate::domain::{CostFilter, LaborCostRow};

/// 人工成本仓储
pub struct LaborRepository {
    db_path: String,
}

impl LaborRepository {
    pub fn new(db_path: impl Into<String>) -> Self {
        Self { db_path: db_path.into() }
    }

    /// 按条件加载人工成本行
    ///
    /// # 过滤规则
    /// - 农场、日期（闭区间）必选
    /// - 地块类型 / 地块 / 班组：列表为空时不过滤
    /// - include_support = false 时排除支援工
    pub fn load_labor_costs(&self, filter: &CostFilter) -> RepositoryResult<Vec<LaborCostRow>> {
        let conn = connect(&self.db_path)?;

        let mut where_ = FilterSql::new();
        where_
            .in_list("nk.farm_id", &filter.farm_ids)
            .push_with(
                "date(nk.ngay) BETWEEN ? AND ?",
                vec![date_param(filter.date_range.start), date_param(filter.date_range.end)],
            )
            .in_list_if_any("l.lo_type", &filter.lot_types)
            .in_list_if_any("l.lo_code", &filter.lots)
            .in_list_if_any("d.doi_code", &filter.teams)
            .push_if(!filter.include_support, "nk.is_ho_tro = 0");

        let sql = format!(
            "SELECT f.farm_code, l.lo_code, d.doi_code,
                    COALESCE(NULLIF(TRIM(nk.cong_doan), ''), ?) AS cong_doan,
                    COALESCE(NULLIF(TRIM(cv.ten_cong_viec), ''), ?) AS ten_cong_viec,
                    strftime('%Y-%m-01', nk.ngay) AS thang,
                    nk.so_cong, nk.thanh_tien, nk.is_ho_tro
             FROM fact_nhat_ky_san_xuat nk
             JOIN dim_farm f ON f.farm_id = nk.farm_id
             JOIN dim_lo l ON l.lo_id = nk.lo_id
             JOIN dim_doi d ON d.doi_id = nk.doi_id
             JOIN dim_cong_viec cv ON cv.cong_viec_id = nk.cong_viec_id
             {}",
            where_.where_sql()
        );

        let mut params: Vec<rusqlite::types::Value> =
            vec![UNRECORDED_LABEL.to_string().into(), UNRECORDED_LABEL.to_string().into()];
        params.extend(where_.params().iter().cloned());

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(params.iter()), |row| {
                Ok(LaborCostRow {
                    farm_code: row.get(0)?,
                    lo_code: row.get(1)?,
                    doi_code: row.get(2)?,
                    cong_doan: row.get(3)?,
                    ten_cong_viec: row.get(4)?,
                    thang: row.get(5)?,
                    so_cong: row.get::<_, Option<f64>>(6)?.unwrap_or(0.0),
                    thanh_tien: row.get::<_, Option<f64>>(7)?.unwrap_or(0.0),
                    is_ho_tro: row.get::<_, Option<bool>>(8)?.unwrap_or(false),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            farms = filter.farm_ids.len(),
            rows = rows.len(),
            include_support = filter.include_support,
            "加载人工成本"
        );
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DateRange;
    use crate::repository::test_support::{insert_log, seed_dimensions, temp_warehouse};
    use chrono::NaiveDate;
    use rusqlite::Connection;

    fn jan_to_mar() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
        )
    }

    fn setup() -> (tempfile::NamedTempFile, String) {
        let (tmp, path) = temp_warehouse();
        let conn = Connection::open(&path).unwrap();
        seed_dimensions(&conn);
        insert_log(&conn, 1, 1, 1, 1, "2025-01-05", Some("Chăm sóc"), 1.0, None, None, 300_000.0, false);
        insert_log(&conn, 1, 2, 1, 3, "2025-01-25", Some("  "), 2.0, None, None, 600_000.0, false);
        insert_log(&conn, 2, 3, 2, 2, "2025-02-10", Some("Bón"), 1.5, None, None, 450_000.0, true);
        insert_log(&conn, 2, 4, 2, 2, "2025-04-01", Some("Bón"), 1.0, None, None, 999_000.0, false);
        (tmp, path)
    }

    #[test]
    fn test_blank_stage_and_name_become_unrecorded() {
        let (_tmp, path) = setup();
        let repo = LaborRepository::new(path);
        let rows = repo.load_labor_costs(&CostFilter::new(vec![1], jan_to_mar())).unwrap();

        assert_eq!(rows.len(), 2);
        let blank = rows.iter().find(|r| r.lo_code == "A2").unwrap();
        assert_eq!(blank.cong_doan, "Không ghi");
        assert_eq!(blank.ten_cong_viec, "Không ghi");
        assert_eq!(blank.thang, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    }

    #[test]
    fn test_support_and_date_filters() {
        let (_tmp, path) = setup();
        let repo = LaborRepository::new(path);

        let mut filter = CostFilter::new(vec![1, 2], jan_to_mar());
        assert_eq!(repo.load_labor_costs(&filter).unwrap().len(), 3);

        filter.include_support = false;
        let rows = repo.load_labor_costs(&filter).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| !r.is_ho_tro));
    }

    #[test]
    fn test_team_and_lot_type_filters() {
        let (_tmp, path) = setup();
        let repo = LaborRepository::new(path);

        let mut filter = CostFilter::new(vec![1, 2], jan_to_mar());
        filter.teams = vec!["D02".into()];
        let rows = repo.load_labor_costs(&filter).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].farm_code, "Farm 157");

        let mut filter = CostFilter::new(vec![2], DateRange::new(
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
        ));
        filter.lot_types = vec!["Lô ảo".into()];
        let rows = repo.load_labor_costs(&filter).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].lo_code, "VP");
    }
}
