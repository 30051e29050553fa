// ==========================================
// Trường Tồn 农场看板 - 预算对比页 API (Farm 195)
// ==========================================
// 职责: 读取 fact_195_tong → 筛选 → 实际 vs 预算各区块 / CSV 导出
// 约定: 类别/月份/范围必须至少选一项；科目为空表示全部
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::cache::QueryCache;
use crate::config::DashboardSettings;
use crate::domain::{BudgetLine, BudgetScope};
use crate::engine::budget::{
    self, BudgetFilter, BudgetKpis, BudgetOptions, BudgetView, CategoryTab, LineItemRow,
    MonthlyBudget, OutOfBudget, PivotRow,
};
use crate::i18n::t;
use crate::perf::PerfGuard;

/// 预算页请求（来自查询串）
///
/// None 表示该项未出现在查询串中（全选）；Some(空) 表示用户清空了选择。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetRequest {
    pub categories: Option<Vec<String>>,
    pub months: Option<Vec<String>>,
    pub scopes: Option<Vec<BudgetScope>>,
    pub line_items: Vec<String>,
}

impl BudgetRequest {
    /// 以选项补全未指定的项，得到完整筛选
    pub fn resolve(&self, options: &BudgetOptions) -> BudgetFilter {
        let all = BudgetFilter::all(options);
        BudgetFilter {
            categories: self.categories.clone().unwrap_or(all.categories),
            months: self.months.clone().unwrap_or(all.months),
            scopes: self.scopes.clone().unwrap_or(all.scopes),
            line_items: self.line_items.clone(),
        }
    }
}

/// 预算页视图模型
#[derive(Debug, Clone, Serialize)]
pub struct BudgetDashboard {
    pub options: BudgetOptions,
    pub filter: BudgetFilter,
    pub warn_pct: f64,
    pub kpis: BudgetKpis,
    /// 预算内各科目（按类别、实际额降序）
    pub line_items: Vec<LineItemRow>,
    pub monthly: MonthlyBudget,
    pub category_tabs: Vec<CategoryTab>,
    pub out_of_budget: OutOfBudget,
    pub pivot: Vec<PivotRow>,
}

impl BudgetDashboard {
    /// 进度卡片：只列有预算的科目
    pub fn progress_cards(&self) -> impl Iterator<Item = &LineItemRow> {
        self.line_items.iter().filter(|r| r.planned > 0.0)
    }
}

pub struct BudgetApi {
    cache: Arc<QueryCache>,
    settings: DashboardSettings,
}

impl BudgetApi {
    pub fn new(cache: Arc<QueryCache>, settings: DashboardSettings) -> Self {
        Self { cache, settings }
    }

    fn load_lines(&self) -> ApiResult<Arc<Vec<BudgetLine>>> {
        let lines = self.cache.budget_lines()?;
        if lines.is_empty() {
            warn!("fact_195_tong 为空");
            return Err(ApiError::NoData(t("notice.budget_table_empty")));
        }
        Ok(lines)
    }

    /// 筛选下拉选项
    ///
    /// # 返回
    /// - Err(NoData): fact_195_tong 为空
    pub fn options(&self) -> ApiResult<BudgetOptions> {
        let lines = self.load_lines()?;
        Ok(BudgetOptions::from_lines(&lines))
    }

    fn check_selection(filter: &BudgetFilter) -> ApiResult<()> {
        if filter.categories.is_empty() {
            return Err(ApiError::EmptySelection(t("budget.field.category")));
        }
        if filter.months.is_empty() {
            return Err(ApiError::EmptySelection(t("budget.field.month")));
        }
        if filter.scopes.is_empty() {
            return Err(ApiError::EmptySelection(t("budget.field.scope")));
        }
        Ok(())
    }

    /// 组装预算页
    ///
    /// # 返回
    /// - Err(NoData): 表为空，或筛选后无数据
    /// - Err(EmptySelection): 类别/月份/范围被清空
    pub fn dashboard(&self, filter: &BudgetFilter) -> ApiResult<BudgetDashboard> {
        let _perf = PerfGuard::new("budget_dashboard");

        let lines = self.load_lines()?;
        Self::check_selection(filter)?;

        let view = BudgetView::new(&lines, filter, self.settings.budget_warn_pct);
        if view.is_empty() {
            return Err(ApiError::NoData(t("notice.filter_empty")));
        }

        let dashboard = BudgetDashboard {
            options: BudgetOptions::from_lines(&lines),
            filter: filter.clone(),
            warn_pct: self.settings.budget_warn_pct,
            kpis: view.kpis(),
            line_items: view.by_line_item(),
            monthly: view.monthly(),
            category_tabs: view.category_tabs(),
            out_of_budget: view.out_of_budget(),
            pivot: view.full_pivot(),
        };

        info!(
            actual = view.actual.len(),
            planned = view.planned.len(),
            pct = ?dashboard.kpis.pct,
            "预算页组装完成"
        );
        Ok(dashboard)
    }

    /// 导出完整透视表 CSV（UTF-8 BOM）
    pub fn export_csv(&self, filter: &BudgetFilter) -> ApiResult<Vec<u8>> {
        let _perf = PerfGuard::new("budget_export");

        let lines = self.load_lines()?;
        Self::check_selection(filter)?;
        let view = BudgetView::new(&lines, filter, self.settings.budget_warn_pct);
        let pivot = view.full_pivot();
        let bytes = budget::to_csv(&pivot)?;
        info!(rows = pivot.len(), bytes = bytes.len(), "预算透视表导出完成");
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::budget::fixtures::line;
    use crate::domain::DataKind;
    use crate::repository::test_support::temp_warehouse;
    use crate::repository::BudgetRepository;
    use chrono::NaiveDate;
    use std::time::Duration;

    fn setup(lines: &[BudgetLine]) -> (tempfile::NamedTempFile, BudgetApi) {
        let (tmp, path) = temp_warehouse();
        BudgetRepository::new(path.clone()).insert_budget_lines(lines).unwrap();
        let cache = Arc::new(QueryCache::new(&path, Duration::from_secs(60)));
        (tmp, BudgetApi::new(cache, DashboardSettings::default()))
    }

    fn date(m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2025, m, d)
    }

    fn sample() -> Vec<BudgetLine> {
        vec![
            line(DataKind::Actual, "Công", Some("Làm cỏ"), BudgetScope::InBudget, date(1, 10), 1_200_000.0),
            line(DataKind::Planned, "Công", Some("Làm cỏ"), BudgetScope::InBudget, date(1, 1), 1_000_000.0),
            line(DataKind::Actual, "Vật Tư", None, BudgetScope::OutOfBudget, date(2, 3), 300_000.0),
        ]
    }

    #[test]
    fn test_dashboard_with_all_selected() {
        let (_tmp, api) = setup(&sample());
        let options = api.options().unwrap();
        let filter = BudgetRequest::default().resolve(&options);
        let view = api.dashboard(&filter).unwrap();

        assert_eq!(view.kpis.actual_in, 1_200_000.0);
        assert_eq!(view.kpis.planned_in, 1_000_000.0);
        assert_eq!(view.kpis.actual_out, 300_000.0);
        assert!(view.kpis.is_over());
        assert_eq!(view.progress_cards().count(), 1);
        assert!(!view.out_of_budget.is_empty());
    }

    #[test]
    fn test_cleared_category_is_a_notice() {
        let (_tmp, api) = setup(&sample());
        let options = api.options().unwrap();
        let request = BudgetRequest {
            categories: Some(Vec::new()),
            ..Default::default()
        };
        let err = api.dashboard(&request.resolve(&options)).unwrap_err();
        assert!(matches!(err, ApiError::EmptySelection(_)));
    }

    #[test]
    fn test_empty_table_is_no_data() {
        let (_tmp, api) = setup(&[]);
        assert!(matches!(api.options(), Err(ApiError::NoData(_))));
    }

    #[test]
    fn test_export_has_header_row() {
        let (_tmp, api) = setup(&sample());
        let filter = BudgetRequest::default().resolve(&api.options().unwrap());
        let bytes = api.export_csv(&filter).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.lines().count() >= 2);
    }
}
