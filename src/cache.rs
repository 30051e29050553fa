// ==========================================
// Trường Tồn 农场看板 - 查询结果缓存
// ==========================================
// 单一 TTL 记忆化：键为完整查询参数，值为 Arc 包装的行集
// 过期由 moka 按 time_to_live 处理；手动刷新调用 invalidate_all
// ==========================================

use moka::sync::Cache;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::{
    BudgetLine, CostFilter, DateRange, Farm, FilterOptions, LaborCostRow, LotTeamMap,
    MaterialCostRow, QuotaFilter, QuotaRecord,
};
use crate::repository::{
    BudgetRepository, DimensionRepository, LaborRepository, MaterialCostRepository,
    QuotaRepository, RepositoryError, RepositoryResult,
};

/// 每类查询的最大条目数
const MAX_ENTRIES_PER_QUERY: u64 = 256;

/// 带 TTL 的仓储门面
#[derive(Clone)]
pub struct QueryCache {
    dimensions: Arc<DimensionRepository>,
    labor: Arc<LaborRepository>,
    quota: Arc<QuotaRepository>,
    material: Arc<MaterialCostRepository>,
    budget: Arc<BudgetRepository>,

    farms_cache: Cache<(), Arc<Vec<Farm>>>,
    options_cache: Cache<Vec<i64>, Arc<FilterOptions>>,
    date_range_cache: Cache<(Vec<i64>, bool), Option<DateRange>>,
    lot_team_cache: Cache<Vec<i64>, Arc<LotTeamMap>>,
    labor_cache: Cache<CostFilter, Arc<Vec<LaborCostRow>>>,
    material_cache: Cache<CostFilter, Arc<Vec<MaterialCostRow>>>,
    quota_cache: Cache<QuotaFilter, Arc<Vec<QuotaRecord>>>,
    budget_cache: Cache<(), Arc<Vec<BudgetLine>>>,
}

fn build<K, V>(ttl: Duration) -> Cache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    Cache::builder()
        .max_capacity(MAX_ENTRIES_PER_QUERY)
        .time_to_live(ttl)
        .build()
}

/// 命中直接返回；未命中时加载并写入（加载失败不缓存）
///
/// 同一键的并发未命中只执行一次加载，其余调用等待同一结果
fn cached<K, V>(
    cache: &Cache<K, V>,
    key: K,
    load: impl FnOnce() -> RepositoryResult<V>,
) -> RepositoryResult<V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    cache.try_get_with(key, load).map_err(unshare)
}

/// 取回共享的加载错误；多个等待者共享时退化为文本
fn unshare(err: Arc<RepositoryError>) -> RepositoryError {
    Arc::try_unwrap(err).unwrap_or_else(|shared| RepositoryError::DatabaseQueryError(shared.to_string()))
}

impl QueryCache {
    /// 创建缓存
    ///
    /// # 参数
    /// - db_path: 数仓文件路径
    /// - ttl: 条目存活时间（cache_ttl_secs）
    pub fn new(db_path: &str, ttl: Duration) -> Self {
        Self {
            dimensions: Arc::new(DimensionRepository::new(db_path)),
            labor: Arc::new(LaborRepository::new(db_path)),
            quota: Arc::new(QuotaRepository::new(db_path)),
            material: Arc::new(MaterialCostRepository::new(db_path)),
            budget: Arc::new(BudgetRepository::new(db_path)),
            farms_cache: build(ttl),
            options_cache: build(ttl),
            date_range_cache: build(ttl),
            lot_team_cache: build(ttl),
            labor_cache: build(ttl),
            material_cache: build(ttl),
            quota_cache: build(ttl),
            budget_cache: build(ttl),
        }
    }

    pub fn farms(&self) -> RepositoryResult<Arc<Vec<Farm>>> {
        cached(&self.farms_cache, (), || self.dimensions.load_farms().map(Arc::new))
    }

    pub fn filter_options(&self, farm_ids: &[i64]) -> RepositoryResult<Arc<FilterOptions>> {
        cached(&self.options_cache, farm_ids.to_vec(), || {
            self.dimensions.load_filter_options(farm_ids).map(Arc::new)
        })
    }

    pub fn date_range(&self, farm_ids: &[i64], quota_only: bool) -> RepositoryResult<Option<DateRange>> {
        cached(&self.date_range_cache, (farm_ids.to_vec(), quota_only), || {
            self.dimensions.load_date_range(farm_ids, quota_only)
        })
    }

    pub fn lot_team_map(&self, farm_ids: &[i64]) -> RepositoryResult<Arc<LotTeamMap>> {
        cached(&self.lot_team_cache, farm_ids.to_vec(), || {
            self.dimensions.load_lot_team_map(farm_ids).map(Arc::new)
        })
    }

    pub fn labor_costs(&self, filter: &CostFilter) -> RepositoryResult<Arc<Vec<LaborCostRow>>> {
        cached(&self.labor_cache, filter.clone(), || {
            self.labor.load_labor_costs(filter).map(Arc::new)
        })
    }

    pub fn material_costs(&self, filter: &CostFilter) -> RepositoryResult<Arc<Vec<MaterialCostRow>>> {
        cached(&self.material_cache, filter.clone(), || {
            self.material.load_material_costs(filter).map(Arc::new)
        })
    }

    pub fn quota_records(&self, filter: &QuotaFilter) -> RepositoryResult<Arc<Vec<QuotaRecord>>> {
        cached(&self.quota_cache, filter.clone(), || {
            self.quota.load_quota_records(filter).map(Arc::new)
        })
    }

    pub fn budget_lines(&self) -> RepositoryResult<Arc<Vec<BudgetLine>>> {
        cached(&self.budget_cache, (), || self.budget.load_budget_lines().map(Arc::new))
    }

    /// 清空全部缓存（侧边栏"刷新数据"）
    pub fn invalidate_all(&self) {
        self.farms_cache.invalidate_all();
        self.options_cache.invalidate_all();
        self.date_range_cache.invalidate_all();
        self.lot_team_cache.invalidate_all();
        self.labor_cache.invalidate_all();
        self.material_cache.invalidate_all();
        self.quota_cache.invalidate_all();
        self.budget_cache.invalidate_all();
        tracing::info!("查询缓存已清空");
    }
}
