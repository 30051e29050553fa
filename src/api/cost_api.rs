// ==========================================
// Trường Tồn 农场看板 - 成本页 API
// ==========================================
// 职责: 侧边栏筛选 → 查询人工/物资成本 → 应用下钻 → 组装全部区块
// 约定: 农场卡片与地块汇总表基于未下钻数据，其余区块基于下钻后数据
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::api::error::{ApiError, ApiResult};
use crate::api::filter_api::{FilterApi, Sidebar, SidebarRequest};
use crate::cache::QueryCache;
use crate::config::DashboardSettings;
use crate::domain::CostFilter;
use crate::engine::cost::{
    self, CostTotals, FarmBreakdown, FarmCard, LotBreakdown, LotBubble, LotCostRow, MaterialRow,
    MonthlyCost, SunburstNode, TableFilter, TablePage, TeamBreakdown, TeamSplit, WorkRow,
};
use crate::engine::drill;
use crate::i18n::t;
use crate::perf::PerfGuard;
use crate::session::DrillSelection;

// ==========================================
// 请求
// ==========================================

/// 成本页请求
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostRequest {
    #[serde(flatten)]
    pub sidebar: SidebarRequest,
    /// 地块；空 = 全部
    pub lots: Vec<String>,
    /// 班组；空 = 全部
    pub teams: Vec<String>,
    /// 是否包含支援工
    pub include_support: bool,
    /// 人工明细表的表内筛选
    pub work_filter: TableFilter,
    /// 物资明细表的表内筛选
    pub material_filter: TableFilter,
}

impl Default for CostRequest {
    fn default() -> Self {
        Self {
            sidebar: SidebarRequest::default(),
            lots: Vec::new(),
            teams: Vec::new(),
            include_support: true,
            work_filter: TableFilter::default(),
            material_filter: TableFilter::default(),
        }
    }
}

// ==========================================
// 视图模型
// ==========================================

/// 成本页视图模型
#[derive(Debug, Clone, Serialize)]
pub struct CostDashboard {
    pub request: CostRequest,
    pub sidebar: Sidebar,
    pub drill: DrillSelection,

    pub totals: CostTotals,
    pub monthly: Vec<MonthlyCost>,

    pub farm_cards: Vec<FarmCard>,
    pub farm_breakdown: Option<FarmBreakdown>,

    pub lot_bubbles: Vec<LotBubble>,
    pub lot_breakdown: Option<LotBreakdown>,

    pub team_split: Vec<TeamSplit>,
    pub team_breakdown: Option<TeamBreakdown>,

    pub labor_hierarchy: Vec<SunburstNode>,
    pub material_hierarchy: Vec<SunburstNode>,

    pub work_table: TablePage<WorkRow>,
    pub material_table: TablePage<MaterialRow>,
    /// 人工表范围标签（含班组）
    pub work_scope: String,
    /// 物资表范围标签（不含班组）
    pub material_scope: String,
    /// 班组下钻时该班组映射到的地块数（物资表提示用）
    pub team_lot_count: Option<usize>,

    pub lot_table: Vec<LotCostRow>,
}

// ==========================================
// CostApi
// ==========================================

pub struct CostApi {
    cache: Arc<QueryCache>,
    filters: Arc<FilterApi>,
    settings: DashboardSettings,
}

impl CostApi {
    /// # 参数
    /// - cache: 查询缓存
    /// - filters: 侧边栏 API
    /// - settings: 生效配置（表格行数、气泡数）
    pub fn new(cache: Arc<QueryCache>, filters: Arc<FilterApi>, settings: DashboardSettings) -> Self {
        Self {
            cache,
            filters,
            settings,
        }
    }

    /// 组装成本页
    ///
    /// # 参数
    /// - request: 侧边栏与表内筛选
    /// - drill: 当前会话的下钻选择
    ///
    /// # 返回
    /// - Err(NoFarmSelected): 未选择农场
    /// - Err(NoData): 下钻后人工与物资均为空
    pub fn dashboard(&self, request: &CostRequest, drill: &DrillSelection) -> ApiResult<CostDashboard> {
        let _perf = PerfGuard::new("cost_dashboard");

        let sidebar = self.filters.sidebar(&request.sidebar, false)?;
        let filter = CostFilter {
            farm_ids: sidebar.farm_ids.clone(),
            date_range: sidebar.date_range,
            lot_types: sidebar.selected_lot_types.clone(),
            lots: request.lots.clone(),
            teams: request.teams.clone(),
            include_support: request.include_support,
        };

        let raw_labor = self.cache.labor_costs(&filter)?;
        let raw_material = self.cache.material_costs(&filter)?;
        let lot_teams = self.cache.lot_team_map(&filter.farm_ids)?;

        let labor = drill::labor_rows(&raw_labor, drill);
        let material = drill::material_rows(&raw_material, drill, &lot_teams);
        debug!(
            raw_labor = raw_labor.len(),
            raw_material = raw_material.len(),
            labor = labor.len(),
            material = material.len(),
            "成本数据下钻完成"
        );

        if labor.is_empty() && material.is_empty() {
            return Err(ApiError::NoData(t("notice.no_data")));
        }

        let team_lot_count = drill
            .team
            .as_deref()
            .map(|team| lot_teams.lots_of(team).map_or(0, |lots| lots.len()));

        let dashboard = CostDashboard {
            request: request.clone(),
            sidebar,
            drill: drill.clone(),
            totals: cost::totals(&labor, &material),
            monthly: cost::monthly_trend(&labor, &material),
            farm_cards: cost::farm_cards(&raw_labor, &raw_material, drill),
            farm_breakdown: drill
                .farm
                .as_deref()
                .map(|farm| cost::farm_breakdown(farm, &labor, &material)),
            lot_bubbles: cost::lot_bubbles(&labor, &material, self.settings.bubble_top_n, drill.lot.as_deref()),
            lot_breakdown: drill
                .lot
                .as_deref()
                .map(|lot| cost::lot_breakdown(lot, &labor, &material)),
            team_split: cost::team_split(&labor, drill.team.as_deref()),
            team_breakdown: drill.team.as_deref().map(|team| cost::team_breakdown(team, &labor)),
            labor_hierarchy: cost::labor_hierarchy(&labor),
            material_hierarchy: cost::material_hierarchy(&material),
            work_table: cost::work_table(&labor, &request.work_filter, self.settings.cost_top_n),
            material_table: cost::material_table(&material, &request.material_filter, self.settings.cost_top_n),
            work_scope: drill.label(true),
            material_scope: drill.label(false),
            team_lot_count,
            lot_table: cost::lot_table(&raw_labor, &raw_material),
        };

        info!(
            farms = ?dashboard.sidebar.selected_farms,
            total = dashboard.totals.total,
            drill = %dashboard.work_scope,
            "成本页组装完成"
        );
        Ok(dashboard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::DrillDimension;
    use crate::repository::test_support::{insert_log, insert_material, seed_dimensions, temp_warehouse};
    use rusqlite::Connection;
    use std::time::Duration;

    fn setup() -> (tempfile::NamedTempFile, CostApi) {
        let (tmp, path) = temp_warehouse();
        let conn = Connection::open(&path).unwrap();
        seed_dimensions(&conn);
        insert_log(&conn, 1, 1, 1, 1, "2025-01-05", Some("Chăm sóc"), 2.0, None, None, 400_000.0, false);
        insert_log(&conn, 1, 2, 1, 2, "2025-02-07", Some("Bón phân"), 1.0, None, None, 300_000.0, false);
        insert_log(&conn, 2, 3, 2, 1, "2025-02-10", Some("Chăm sóc"), 1.5, None, None, 250_000.0, true);
        insert_material(&conn, 1, 1, Some(1), "2025-01-20", Some("Phân bón"), 600_000.0);
        insert_material(&conn, 2, 3, Some(1), "2025-02-15", Some("Phân bón"), 100_000.0);

        let cache = Arc::new(QueryCache::new(&path, Duration::from_secs(60)));
        let filters = Arc::new(FilterApi::new(cache.clone()));
        (tmp, CostApi::new(cache, filters, DashboardSettings::default()))
    }

    #[test]
    fn test_dashboard_without_drill() {
        let (_tmp, api) = setup();
        let view = api.dashboard(&CostRequest::default(), &DrillSelection::default()).unwrap();

        assert_eq!(view.totals.labor, 950_000.0);
        assert_eq!(view.totals.material, 700_000.0);
        assert_eq!(view.farm_cards.len(), 2);
        assert!(view.farm_breakdown.is_none());
        assert_eq!(view.lot_table.len(), 3);
        assert_eq!(view.work_table.total_matched, 3);
        assert_eq!(view.team_lot_count, None);
    }

    #[test]
    fn test_farm_drill_keeps_cards_unfiltered() {
        let (_tmp, api) = setup();
        let mut drill = DrillSelection::default();
        drill.select(DrillDimension::Farm, "Farm 126");
        let view = api.dashboard(&CostRequest::default(), &drill).unwrap();

        assert_eq!(view.totals.total, 1_300_000.0);
        assert_eq!(view.farm_cards.len(), 2);
        assert!(view.farm_cards.iter().any(|c| c.farm_code == "Farm 126" && c.active));
        let breakdown = view.farm_breakdown.unwrap();
        assert_eq!(breakdown.farm_code, "Farm 126");
    }

    #[test]
    fn test_team_drill_reports_mapped_lots() {
        let (_tmp, api) = setup();
        let mut drill = DrillSelection::default();
        drill.select(DrillDimension::Team, "D01");
        let view = api.dashboard(&CostRequest::default(), &drill).unwrap();

        assert_eq!(view.team_lot_count, Some(2));
        assert_eq!(view.totals.labor, 700_000.0);
        // D01 → A1, A2：只有 A1 有物资
        assert_eq!(view.totals.material, 600_000.0);
        assert!(view.team_breakdown.is_some());
    }

    #[test]
    fn test_support_labor_can_be_excluded() {
        let (_tmp, api) = setup();
        let request = CostRequest {
            include_support: false,
            ..Default::default()
        };
        let view = api.dashboard(&request, &DrillSelection::default()).unwrap();
        assert_eq!(view.totals.labor, 700_000.0);
    }

    #[test]
    fn test_drill_without_rows_halts() {
        let (_tmp, api) = setup();
        let mut drill = DrillSelection::default();
        drill.select(DrillDimension::Lot, "KHÔNG-CÓ");
        let err = api.dashboard(&CostRequest::default(), &drill).unwrap_err();
        assert!(matches!(err, ApiError::NoData(_)));
        assert!(err.is_notice());
    }
}
