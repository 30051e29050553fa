// ==========================================
// Trường Tồn 农场看板 - 侧边栏筛选 API
// ==========================================
// 职责: 农场多选 → 日期区间 → 地块类型 → 地块 / 班组 级联选项
// 约定: 请求中的 None 表示 "全部"，Some(空列表) 表示用户清空了选择
// ==========================================

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::error::{ApiError, ApiResult};
use crate::cache::QueryCache;
use crate::domain::{DateRange, Farm};

/// 下拉选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn plain(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            label: value.clone(),
            value,
        }
    }
}

/// 侧边栏请求（成本页与定额页共用的部分）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidebarRequest {
    /// 农场编码；None = 全部
    pub farms: Option<Vec<String>>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    /// 地块类型；None = 全部
    pub lot_types: Option<Vec<String>>,
}

/// 侧边栏数据
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sidebar {
    /// 全部农场
    pub farms: Vec<Farm>,
    /// 已选农场编码（按 farm_id 顺序）
    pub selected_farms: Vec<String>,
    pub farm_ids: Vec<i64>,
    /// 数据覆盖的日期范围（日期输入框的上下限）
    pub bounds: DateRange,
    /// 生效的日期区间
    pub date_range: DateRange,
    /// 全部地块类型
    pub lot_types: Vec<String>,
    pub selected_lot_types: Vec<String>,
    /// 地块选项（已按所选类型级联）
    pub lots: Vec<String>,
    /// 班组选项（跨农场的班组标签附带农场列表）
    pub teams: Vec<SelectOption>,
}

/// 侧边栏筛选 API
pub struct FilterApi {
    cache: Arc<QueryCache>,
}

impl FilterApi {
    pub fn new(cache: Arc<QueryCache>) -> Self {
        Self { cache }
    }

    /// 组装侧边栏
    ///
    /// # 参数
    /// - request: 用户当前的选择
    /// - quota_only: 日期范围是否只统计有定额的日志（定额页）
    ///
    /// # 返回
    /// - Err(NoFarmSelected): 农场选择为空
    /// - Err(NoData): 所选农场没有任何日志
    /// - Err(InvalidDateRange): 起始日期晚于结束日期
    pub fn sidebar(&self, request: &SidebarRequest, quota_only: bool) -> ApiResult<Sidebar> {
        let farms = self.cache.farms()?;

        let selected: Vec<&Farm> = match &request.farms {
            None => farms.iter().collect(),
            Some(codes) => farms.iter().filter(|f| codes.contains(&f.farm_code)).collect(),
        };
        if selected.is_empty() {
            return Err(ApiError::NoFarmSelected);
        }
        let farm_ids: Vec<i64> = selected.iter().map(|f| f.farm_id).collect();
        let selected_farms: Vec<String> = selected.iter().map(|f| f.farm_code.clone()).collect();

        let bounds = self
            .cache
            .date_range(&farm_ids, quota_only)?
            .ok_or_else(|| ApiError::NoData(String::new()))?;
        let start = request.start.unwrap_or(bounds.start).clamp(bounds.start, bounds.end);
        let end = request.end.unwrap_or(bounds.end).clamp(bounds.start, bounds.end);
        let date_range = DateRange::new(start, end);
        if !date_range.is_valid() {
            return Err(ApiError::InvalidDateRange);
        }

        let options = self.cache.filter_options(&farm_ids)?;
        let lot_types = options.lot_types();
        let selected_lot_types: Vec<String> = match &request.lot_types {
            None => lot_types.clone(),
            Some(types) => types.iter().filter(|t| lot_types.contains(t)).cloned().collect(),
        };
        let lots = options.lot_codes_for_types(&selected_lot_types);
        let teams = options
            .teams
            .iter()
            .map(|t| SelectOption {
                value: t.doi_code.clone(),
                label: t.label(),
            })
            .collect();

        debug!(
            farms = ?selected_farms,
            range = %date_range.label(),
            lots = lots.len(),
            "侧边栏组装完成"
        );

        Ok(Sidebar {
            farms: farms.as_ref().clone(),
            selected_farms,
            farm_ids,
            bounds,
            date_range,
            lot_types,
            selected_lot_types,
            lots,
            teams,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{insert_log, seed_dimensions, temp_warehouse};
    use rusqlite::Connection;
    use std::time::Duration;

    fn api_with_logs() -> (tempfile::NamedTempFile, FilterApi) {
        let (tmp, path) = temp_warehouse();
        let conn = Connection::open(&path).unwrap();
        seed_dimensions(&conn);
        insert_log(&conn, 1, 1, 1, 1, "2025-01-05", Some("Chăm sóc"), 2.0, Some(10.0), Some(5.0), 400_000.0, false);
        insert_log(&conn, 2, 3, 2, 2, "2025-03-20", Some("Bón phân"), 1.0, None, None, 200_000.0, false);
        insert_log(&conn, 2, 4, 1, 2, "2025-02-11", None, 1.0, None, None, 100_000.0, true);
        let cache = Arc::new(QueryCache::new(&path, Duration::from_secs(60)));
        (tmp, FilterApi::new(cache))
    }

    #[test]
    fn test_default_sidebar_selects_everything() {
        let (_tmp, api) = api_with_logs();
        let sidebar = api.sidebar(&SidebarRequest::default(), false).unwrap();

        assert_eq!(sidebar.selected_farms, vec!["Farm 126", "Farm 157"]);
        assert_eq!(sidebar.date_range, sidebar.bounds);
        assert_eq!(sidebar.date_range.start, NaiveDate::from_ymd_opt(2025, 1, 5).unwrap());
        assert_eq!(sidebar.date_range.end, NaiveDate::from_ymd_opt(2025, 3, 20).unwrap());
        assert_eq!(sidebar.lot_types, vec!["Lô thực", "Lô ảo"]);
    }

    #[test]
    fn test_lot_options_follow_lot_types() {
        let (_tmp, api) = api_with_logs();
        let request = SidebarRequest {
            lot_types: Some(vec!["Lô ảo".to_string()]),
            ..Default::default()
        };
        let sidebar = api.sidebar(&request, false).unwrap();
        assert_eq!(sidebar.lots, vec!["VP"]);
    }

    #[test]
    fn test_cross_farm_team_label() {
        let (_tmp, api) = api_with_logs();
        let sidebar = api.sidebar(&SidebarRequest::default(), false).unwrap();
        let d01 = sidebar.teams.iter().find(|t| t.value == "D01").unwrap();
        assert_eq!(d01.label, "D01 (Farm 126, Farm 157)");
    }

    #[test]
    fn test_empty_farm_selection_halts() {
        let (_tmp, api) = api_with_logs();
        let request = SidebarRequest {
            farms: Some(Vec::new()),
            ..Default::default()
        };
        assert!(matches!(api.sidebar(&request, false), Err(ApiError::NoFarmSelected)));
    }

    #[test]
    fn test_reversed_dates_are_rejected() {
        let (_tmp, api) = api_with_logs();
        let request = SidebarRequest {
            start: NaiveDate::from_ymd_opt(2025, 3, 1),
            end: NaiveDate::from_ymd_opt(2025, 2, 1),
            ..Default::default()
        };
        assert!(matches!(api.sidebar(&request, false), Err(ApiError::InvalidDateRange)));
    }
}
