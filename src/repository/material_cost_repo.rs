// ==========================================
// Trường Tồn 农场看板 - 物资成本仓储
// ==========================================
// 来源: fact_vat_tu ⨝ dim_farm/dim_lo ⟕ dim_vat_tu
// 物资没有班组维度（班组下钻经 dim_lo_doi 换算）
// ==========================================

use rusqlite::params_from_iter;
use rusqlite::types::Value;

use super::error::RepositoryResult;
use super::sql_builder::FilterSql;
use super::{connect, date_param};
use crate::domain::types::UNKNOWN_MATERIAL_LABEL;
use crate::domain::{CostFilter, MaterialCostRow};

pub struct MaterialCostRepository {
    db_path: String,
}

impl MaterialCostRepository {
    pub fn new(db_path: impl Into<String>) -> Self {
        Self { db_path: db_path.into() }
    }

    /// 按条件加载物资成本行（忽略 teams / include_support）
    pub fn load_material_costs(&self, filter: &CostFilter) -> RepositoryResult<Vec<MaterialCostRow>> {
        let conn = connect(&self.db_path)?;

        let mut where_ = FilterSql::new();
        where_
            .in_list("vt.farm_id", &filter.farm_ids)
            .push_with(
                "date(vt.ngay) BETWEEN ? AND ?",
                vec![date_param(filter.date_range.start), date_param(filter.date_range.end)],
            )
            .in_list_if_any("l.lo_type", &filter.lot_types)
            .in_list_if_any("l.lo_code", &filter.lots);

        // 类别优先取事实行，其次取物资维度
        let sql = format!(
            "SELECT f.farm_code, l.lo_code,
                    COALESCE(NULLIF(TRIM(vt.loai_vat_tu), ''), NULLIF(TRIM(v.loai_vat_tu), ''), ?) AS loai_vat_tu,
                    COALESCE(NULLIF(TRIM(v.ten_vat_tu), ''), ?) AS ten_vat_tu,
                    strftime('%Y-%m-01', vt.ngay) AS thang,
                    vt.thanh_tien
             FROM fact_vat_tu vt
             JOIN dim_farm f ON f.farm_id = vt.farm_id
             JOIN dim_lo l ON l.lo_id = vt.lo_id
             LEFT JOIN dim_vat_tu v ON v.vat_tu_id = vt.vat_tu_id
             {}",
            where_.where_sql()
        );

        let mut params: Vec<Value> = vec![
            UNKNOWN_MATERIAL_LABEL.to_string().into(),
            UNKNOWN_MATERIAL_LABEL.to_string().into(),
        ];
        params.extend(where_.params().iter().cloned());

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(params.iter()), |row| {
                Ok(MaterialCostRow {
                    farm_code: row.get(0)?,
                    lo_code: row.get(1)?,
                    loai_vat_tu: row.get(2)?,
                    ten_vat_tu: row.get(3)?,
                    thang: row.get(4)?,
                    thanh_tien: row.get::<_, Option<f64>>(5)?.unwrap_or(0.0),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(rows = rows.len(), "加载物资成本");
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DateRange;
    use crate::repository::test_support::{insert_material, seed_dimensions, temp_warehouse};
    use chrono::NaiveDate;
    use rusqlite::Connection;

    #[test]
    fn test_material_type_fallback_chain() {
        let (_tmp, path) = temp_warehouse();
        let conn = Connection::open(&path).unwrap();
        seed_dimensions(&conn);
        // 事实行自带类别
        insert_material(&conn, 1, 1, Some(1), "2025-01-03", Some("Thuốc BVTV"), 1_000_000.0);
        // 取维度类别
        insert_material(&conn, 1, 1, Some(1), "2025-01-04", None, 2_000_000.0);
        // 维度也为空
        insert_material(&conn, 1, 2, Some(2), "2025-02-04", Some(" "), 500_000.0);
        // 无物资维度
        insert_material(&conn, 1, 2, None, "2025-02-05", None, 100_000.0);

        let repo = MaterialCostRepository::new(path);
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 2, 28).unwrap(),
        );
        let mut rows = repo.load_material_costs(&CostFilter::new(vec![1], range)).unwrap();
        rows.sort_by(|a, b| b.thanh_tien.partial_cmp(&a.thanh_tien).unwrap());

        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].loai_vat_tu, "Phân bón");
        assert_eq!(rows[0].ten_vat_tu, "Ure");
        assert_eq!(rows[1].loai_vat_tu, "Thuốc BVTV");
        assert_eq!(rows[2].loai_vat_tu, "Không xác định");
        assert_eq!(rows[2].ten_vat_tu, "Không xác định");
        assert_eq!(rows[3].ten_vat_tu, "Không xác định");
        assert_eq!(rows[3].thang, NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());
    }

    #[test]
    fn test_lot_filter() {
        let (_tmp, path) = temp_warehouse();
        let conn = Connection::open(&path).unwrap();
        seed_dimensions(&conn);
        insert_material(&conn, 1, 1, Some(1), "2025-01-03", None, 10.0);
        insert_material(&conn, 1, 2, Some(1), "2025-01-03", None, 20.0);

        let repo = MaterialCostRepository::new(path);
        let mut filter = CostFilter::new(
            vec![1],
            DateRange::new(
                NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
            ),
        );
        filter.lots = vec!["A2".into()];
        let rows = repo.load_material_costs(&filter).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].thanh_tien, 20.0);
    }
}
