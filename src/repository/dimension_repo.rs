// ==========================================
// Trường Tồn 农场看板 - 维度仓储
// ==========================================
// 职责: 农场列表、级联筛选项、日期范围、班组-地块映射
// ==========================================

use rusqlite::params_from_iter;
use std::collections::{BTreeMap, BTreeSet};

use super::error::RepositoryResult;
use super::sql_builder::FilterSql;
use super::connect;
use crate::domain::{DateRange, Farm, FilterOptions, LotOption, LotTeamMap, TeamOption};

/// 维度仓储
pub struct DimensionRepository {
    db_path: String,
}

impl DimensionRepository {
    /// 创建新的维度仓储
    ///
    /// # 参数
    /// - db_path: 数仓文件路径
    pub fn new(db_path: impl Into<String>) -> Self {
        Self { db_path: db_path.into() }
    }

    /// 全部农场（按编码排序）
    pub fn load_farms(&self) -> RepositoryResult<Vec<Farm>> {
        let conn = connect(&self.db_path)?;
        let mut stmt = conn.prepare("SELECT farm_id, farm_code FROM dim_farm ORDER BY farm_code")?;
        let farms = stmt
            .query_map([], |row| {
                Ok(Farm {
                    farm_id: row.get(0)?,
                    farm_code: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(count = farms.len(), "加载农场列表");
        Ok(farms)
    }

    /// 级联筛选项：只返回在所选农场生产日志中实际出现的地块/班组
    ///
    /// # 参数
    /// - farm_ids: 已选农场；为空时返回空选项
    pub fn load_filter_options(&self, farm_ids: &[i64]) -> RepositoryResult<FilterOptions> {
        if farm_ids.is_empty() {
            return Ok(FilterOptions::default());
        }

        let conn = connect(&self.db_path)?;
        let mut filter = FilterSql::new();
        filter.in_list("nk.farm_id", farm_ids);

        let lot_sql = format!(
            "SELECT DISTINCT l.lo_code, l.lo_type, f.farm_code
             FROM fact_nhat_ky_san_xuat nk
             JOIN dim_lo l ON l.lo_id = nk.lo_id
             JOIN dim_farm f ON f.farm_id = nk.farm_id
             {}
             ORDER BY l.lo_type, l.lo_code",
            filter.where_sql()
        );
        let mut stmt = conn.prepare(&lot_sql)?;
        let lots = stmt
            .query_map(params_from_iter(filter.params()), |row| {
                Ok(LotOption {
                    lo_code: row.get(0)?,
                    lo_type: row.get(1)?,
                    farm_code: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        // 班组所在农场在 Rust 侧聚合（", " 连接，农场编码有序）
        let team_sql = format!(
            "SELECT DISTINCT d.doi_code, f.farm_code
             FROM fact_nhat_ky_san_xuat nk
             JOIN dim_doi d ON d.doi_id = nk.doi_id
             JOIN dim_farm f ON f.farm_id = nk.farm_id
             {}
             ORDER BY d.doi_code, f.farm_code",
            filter.where_sql()
        );
        let mut stmt = conn.prepare(&team_sql)?;
        let pairs = stmt
            .query_map(params_from_iter(filter.params()), |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut grouped: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (doi, farm) in pairs {
            grouped.entry(doi).or_default().insert(farm);
        }
        let teams = grouped
            .into_iter()
            .map(|(doi_code, farms)| TeamOption {
                doi_code,
                farms: farms.into_iter().collect::<Vec<_>>().join(", "),
            })
            .collect::<Vec<_>>();

        tracing::debug!(lots = lots.len(), teams = teams.len(), "加载级联筛选项");
        Ok(FilterOptions { lots, teams })
    }

    /// 生产日志日期范围
    ///
    /// # 参数
    /// - farm_ids: 已选农场
    /// - quota_only: 只统计有定额（dinh_muc > 0）的记录
    ///
    /// # 返回
    /// - None: 无记录
    pub fn load_date_range(&self, farm_ids: &[i64], quota_only: bool) -> RepositoryResult<Option<DateRange>> {
        let conn = connect(&self.db_path)?;
        let mut filter = FilterSql::new();
        filter.in_list("farm_id", farm_ids).push_if(quota_only, "dinh_muc > 0");

        let sql = format!(
            "SELECT MIN(date(ngay)), MAX(date(ngay)) FROM fact_nhat_ky_san_xuat {}",
            filter.where_sql()
        );
        let (min, max): (Option<String>, Option<String>) =
            conn.query_row(&sql, params_from_iter(filter.params()), |row| Ok((row.get(0)?, row.get(1)?)))?;

        let range = match (
            super::parse_date_lenient(min.as_deref()),
            super::parse_date_lenient(max.as_deref()),
        ) {
            (Some(start), Some(end)) => Some(DateRange::new(start, end)),
            _ => None,
        };
        Ok(range)
    }

    /// 班组 → 地块映射（dim_lo_doi，按地块所属农场过滤）
    pub fn load_lot_team_map(&self, farm_ids: &[i64]) -> RepositoryResult<LotTeamMap> {
        let conn = connect(&self.db_path)?;
        let mut filter = FilterSql::new();
        filter.in_list("f.farm_id", farm_ids);

        let sql = format!(
            "SELECT l.lo_code, d.doi_code
             FROM dim_lo_doi ld
             JOIN dim_lo l ON l.lo_id = ld.lo_id
             JOIN dim_doi d ON d.doi_id = ld.doi_id
             JOIN dim_farm f ON f.farm_id = l.farm_id
             {}",
            filter.where_sql()
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(filter.params()), |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut map = LotTeamMap::default();
        for (lo, doi) in rows {
            map.insert(doi, lo);
        }
        Ok(map)
    }
}
