// ==========================================
// Trường Tồn 农场看板 - 定额完成率页 API
// ==========================================
// 职责: 查询有定额的日志 → 应用下钻 → KPI/趋势/分组/热力图/汇总表
// 约定: 地块选项只列 "Lô thực"；农场条形图基于未下钻数据
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::api::error::{ApiError, ApiResult};
use crate::api::filter_api::{FilterApi, Sidebar, SidebarRequest};
use crate::cache::QueryCache;
use crate::config::DashboardSettings;
use crate::domain::types::REAL_LOT_TYPE;
use crate::domain::{Granularity, QuotaFilter};
use crate::engine::drill;
use crate::engine::quota::{
    self, CompletionTrend, QuotaBand, QuotaKpis, RatioGroup, WorkHeatmap, WorkSummaryRow,
};
use crate::i18n::t;
use crate::perf::PerfGuard;
use crate::session::DrillSelection;

/// 定额页请求
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaRequest {
    /// 地块类型固定为 "Lô thực"，请求中的 lot_types 会被忽略
    #[serde(flatten)]
    pub sidebar: SidebarRequest,
    pub granularity: Granularity,
    /// 地块；空 = 全部
    pub lots: Vec<String>,
    /// 班组；空 = 全部
    pub teams: Vec<String>,
    /// 是否包含支援工（默认不含）
    pub include_support: bool,
}

/// 定额页视图模型
#[derive(Debug, Clone, Serialize)]
pub struct QuotaDashboard {
    pub request: QuotaRequest,
    pub sidebar: Sidebar,
    pub drill: DrillSelection,

    pub kpis: QuotaKpis,
    /// 平均完成率所在分档（决定 KPI 卡颜色）
    pub mean_band: Option<QuotaBand>,
    pub trend: CompletionTrend,

    pub by_farm: Vec<RatioGroup>,
    pub farm_axis_max: f64,
    pub by_team: Vec<RatioGroup>,
    pub team_axis_max: f64,
    pub by_lot: Vec<RatioGroup>,
    pub lot_axis_max: f64,

    pub heatmap: WorkHeatmap,
    pub summary: Vec<WorkSummaryRow>,

    /// 分档阈值
    pub good_pct: f64,
    pub warn_pct: f64,
}

impl QuotaDashboard {
    /// 按当前阈值分档
    pub fn band_of(&self, pct: f64) -> QuotaBand {
        quota::band(pct, self.good_pct, self.warn_pct)
    }
}

pub struct QuotaApi {
    cache: Arc<QueryCache>,
    filters: Arc<FilterApi>,
    settings: DashboardSettings,
}

impl QuotaApi {
    pub fn new(cache: Arc<QueryCache>, filters: Arc<FilterApi>, settings: DashboardSettings) -> Self {
        Self {
            cache,
            filters,
            settings,
        }
    }

    /// 组装定额页
    ///
    /// # 返回
    /// - Err(NoFarmSelected): 未选择农场
    /// - Err(NoData): 区间内没有定额记录
    /// - Err(EmptySelection("drill")): 下钻后无数据（页面提供清除按钮）
    pub fn dashboard(&self, request: &QuotaRequest, drill: &DrillSelection) -> ApiResult<QuotaDashboard> {
        let _perf = PerfGuard::new("quota_dashboard");

        let sidebar_request = SidebarRequest {
            lot_types: Some(vec![REAL_LOT_TYPE.to_string()]),
            ..request.sidebar.clone()
        };
        let sidebar = self.filters.sidebar(&sidebar_request, true)?;

        let filter = QuotaFilter {
            farm_ids: sidebar.farm_ids.clone(),
            date_range: sidebar.date_range,
            teams: request.teams.clone(),
            lots: request.lots.clone(),
            include_support: request.include_support,
        };
        let raw = self.cache.quota_records(&filter)?;
        if raw.is_empty() {
            return Err(ApiError::NoData(t("notice.no_quota_data")));
        }

        let records = drill::quota_rows(&raw, drill);
        debug!(raw = raw.len(), drilled = records.len(), "定额数据下钻完成");
        if records.is_empty() {
            return Err(ApiError::EmptySelection("drill".to_string()));
        }

        let s = &self.settings;
        let kpis = quota::kpis(&records);
        let mean_band = kpis.mean.map(|m| quota::band(m, s.quota_good_pct, s.quota_warn_pct));
        let by_farm = quota::by_farm(&raw);
        let by_team = quota::by_team(&records, s.quota_min_samples);
        let by_lot = quota::by_lot(&records, s.quota_min_samples);

        let dashboard = QuotaDashboard {
            request: request.clone(),
            sidebar,
            drill: drill.clone(),
            trend: quota::completion_trend(&records, request.granularity),
            farm_axis_max: quota::farm_axis_max(&by_farm),
            team_axis_max: quota::horizontal_axis_max(&by_team),
            lot_axis_max: quota::horizontal_axis_max(&by_lot),
            by_farm,
            by_team,
            by_lot,
            heatmap: quota::work_heatmap(&records, s.heatmap_top_n),
            summary: quota::work_summary(&records),
            kpis,
            mean_band,
            good_pct: s.quota_good_pct,
            warn_pct: s.quota_warn_pct,
        };

        info!(
            records = dashboard.kpis.count,
            mean = ?dashboard.kpis.mean,
            granularity = dashboard.request.granularity.code(),
            "定额页组装完成"
        );
        Ok(dashboard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::DrillDimension;
    use crate::repository::test_support::{insert_log, seed_dimensions, temp_warehouse};
    use rusqlite::Connection;
    use std::time::Duration;

    fn setup() -> (tempfile::NamedTempFile, QuotaApi) {
        let (tmp, path) = temp_warehouse();
        let conn = Connection::open(&path).unwrap();
        seed_dimensions(&conn);
        // 完成率 = klcv / so_cong / dinh_muc * 100
        insert_log(&conn, 1, 1, 1, 1, "2025-01-05", None, 1.0, Some(9.0), Some(10.0), 0.0, false);
        insert_log(&conn, 1, 1, 1, 1, "2025-01-06", None, 1.0, Some(12.0), Some(10.0), 0.0, false);
        insert_log(&conn, 1, 2, 1, 2, "2025-02-03", None, 2.0, Some(10.0), Some(10.0), 0.0, false);
        insert_log(&conn, 2, 3, 2, 1, "2025-02-04", None, 1.0, Some(7.0), Some(10.0), 0.0, false);
        // 无定额：不计入
        insert_log(&conn, 2, 4, 2, 2, "2025-03-01", None, 1.0, None, None, 0.0, false);

        let cache = Arc::new(QueryCache::new(&path, Duration::from_secs(60)));
        let filters = Arc::new(FilterApi::new(cache.clone()));
        (tmp, QuotaApi::new(cache, filters, DashboardSettings::default()))
    }

    #[test]
    fn test_dashboard_kpis_and_bands() {
        let (_tmp, api) = setup();
        let view = api.dashboard(&QuotaRequest::default(), &DrillSelection::default()).unwrap();

        assert_eq!(view.kpis.count, 4);
        assert_eq!(view.kpis.over_full, 1);
        assert_eq!(view.by_farm.len(), 2);
        assert_eq!(view.trend.granularity, Granularity::Month);
        assert_eq!(view.band_of(85.0), QuotaBand::Good);
        assert_eq!(view.band_of(65.0), QuotaBand::Warn);
        assert_eq!(view.band_of(10.0), QuotaBand::Poor);
        // 日期范围只看有定额的日志
        assert_eq!(view.sidebar.date_range.end, chrono::NaiveDate::from_ymd_opt(2025, 2, 4).unwrap());
    }

    #[test]
    fn test_lot_options_are_real_lots_only() {
        let (_tmp, api) = setup();
        let view = api.dashboard(&QuotaRequest::default(), &DrillSelection::default()).unwrap();
        assert!(!view.sidebar.lots.contains(&"VP".to_string()));
    }

    #[test]
    fn test_farm_chart_ignores_drill() {
        let (_tmp, api) = setup();
        let mut drill = DrillSelection::default();
        drill.select(DrillDimension::Farm, "Farm 157");
        let view = api.dashboard(&QuotaRequest::default(), &drill).unwrap();
        assert_eq!(view.kpis.count, 1);
        assert_eq!(view.by_farm.len(), 2);
    }

    #[test]
    fn test_empty_drill_is_reported() {
        let (_tmp, api) = setup();
        let mut drill = DrillSelection::default();
        drill.select(DrillDimension::Team, "D99");
        let err = api.dashboard(&QuotaRequest::default(), &drill).unwrap_err();
        assert!(matches!(err, ApiError::EmptySelection(ref f) if f == "drill"));
    }
}
