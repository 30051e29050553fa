// ==========================================
// Trường Tồn 农场看板 - 查询串编解码
// ==========================================
// 页面筛选全部放在 GET 查询串中:
// - 多选: 同名键重复（items=a&items=b）；键缺失 = 默认，仅有空值 = 清空
// - 复选框: "1" / "0"
// - 日期: YYYY-MM-DD
// ==========================================

use std::str::FromStr;

use chrono::NaiveDate;

use crate::api::budget_api::BudgetRequest;
use crate::api::cost_api::CostRequest;
use crate::api::error::{ApiError, ApiResult};
use crate::api::filter_api::SidebarRequest;
use crate::api::quota_api::QuotaRequest;
use crate::domain::{BudgetScope, Granularity};
use crate::engine::cost::TableFilter;

/// 查询参数名
pub mod keys {
    pub const FARMS: &str = "farms";
    pub const START: &str = "start";
    pub const END: &str = "end";
    pub const LOT_TYPES: &str = "lot_types";
    pub const LOTS: &str = "lots";
    pub const TEAMS: &str = "teams";
    pub const SUPPORT: &str = "support";
    pub const GRANULARITY: &str = "gran";

    // 成本页表内筛选（w_ 人工表，m_ 物资表）
    pub const WORK_FARMS: &str = "w_farms";
    pub const WORK_TEAMS: &str = "w_teams";
    pub const WORK_LOTS: &str = "w_lots";
    pub const WORK_STAGES: &str = "w_stages";
    pub const WORK_SEARCH: &str = "w_q";
    pub const MATERIAL_FARMS: &str = "m_farms";
    pub const MATERIAL_KINDS: &str = "m_kinds";
    pub const MATERIAL_LOTS: &str = "m_lots";
    pub const MATERIAL_SEARCH: &str = "m_q";

    // 预算页
    pub const CATEGORIES: &str = "cats";
    pub const MONTHS: &str = "months";
    pub const SCOPES: &str = "scopes";
    pub const ITEMS: &str = "items";
}

/// 已解码的查询参数（保持原始顺序，同名键可重复）
#[derive(Debug, Clone, Default)]
pub struct QueryParams(Vec<(String, String)>);

impl From<Vec<(String, String)>> for QueryParams {
    fn from(pairs: Vec<(String, String)>) -> Self {
        Self(pairs)
    }
}

impl QueryParams {
    fn values<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0.iter().filter(move |(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// 单值参数取最后一次出现
    fn get<'a>(&'a self, key: &'a str) -> Option<&'a str> {
        self.values(key).last()
    }

    /// 多选：缺失 → None；存在 → 去空白后的非空项（值本身不再拆分）
    pub fn list(&self, key: &str) -> Option<Vec<String>> {
        let mut values = self.values(key).peekable();
        values.peek()?;
        Some(
            values
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    /// 多选，缺失与清空同义（空 = 全部）
    pub fn list_or_empty(&self, key: &str) -> Vec<String> {
        self.list(key).unwrap_or_default()
    }

    pub fn flag(&self, key: &str, default: bool) -> bool {
        match self.get(key).map(str::trim) {
            Some("1") | Some("true") | Some("on") => true,
            Some("0") | Some("false") | Some("off") => false,
            _ => default,
        }
    }

    pub fn date(&self, key: &str) -> ApiResult<Option<NaiveDate>> {
        match self.get(key).map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map(Some)
                .map_err(|_| ApiError::InvalidInput(format!("{}={}", key, raw))),
        }
    }

    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    pub fn parsed<T: FromStr>(&self, key: &str) -> ApiResult<Option<T>> {
        match self.text(key) {
            None => Ok(None),
            Some(raw) => raw
                .parse::<T>()
                .map(Some)
                .map_err(|_| ApiError::InvalidInput(format!("{}={}", key, raw))),
        }
    }
}

/// 编码后的查询对（渲染隐藏字段 / 链接用）
pub type QueryPairs = Vec<(&'static str, String)>;

/// 每个取值一对；空列表写一个空值，保留"已清空"语义
fn push_list(pairs: &mut QueryPairs, key: &'static str, list: &[String]) {
    if list.is_empty() {
        pairs.push((key, String::new()));
    }
    for value in list {
        pairs.push((key, value.clone()));
    }
}

fn push_opt_list(pairs: &mut QueryPairs, key: &'static str, list: &Option<Vec<String>>) {
    if let Some(list) = list {
        push_list(pairs, key, list);
    }
}

fn push_nonempty_list(pairs: &mut QueryPairs, key: &'static str, list: &[String]) {
    if !list.is_empty() {
        push_list(pairs, key, list);
    }
}

fn flag_value(on: bool) -> String {
    if on { "1" } else { "0" }.to_string()
}

// ==========================================
// 侧边栏
// ==========================================

impl SidebarRequest {
    pub fn from_query(q: &QueryParams) -> ApiResult<Self> {
        Ok(Self {
            farms: q.list(keys::FARMS),
            start: q.date(keys::START)?,
            end: q.date(keys::END)?,
            lot_types: q.list(keys::LOT_TYPES),
        })
    }

    pub fn to_query(&self) -> QueryPairs {
        let mut pairs = Vec::new();
        push_opt_list(&mut pairs, keys::FARMS, &self.farms);
        if let Some(start) = self.start {
            pairs.push((keys::START, start.format("%Y-%m-%d").to_string()));
        }
        if let Some(end) = self.end {
            pairs.push((keys::END, end.format("%Y-%m-%d").to_string()));
        }
        push_opt_list(&mut pairs, keys::LOT_TYPES, &self.lot_types);
        pairs
    }
}

// ==========================================
// 成本页
// ==========================================

impl CostRequest {
    pub fn from_query(q: &QueryParams) -> ApiResult<Self> {
        Ok(Self {
            sidebar: SidebarRequest::from_query(q)?,
            lots: q.list_or_empty(keys::LOTS),
            teams: q.list_or_empty(keys::TEAMS),
            include_support: q.flag(keys::SUPPORT, true),
            work_filter: TableFilter {
                farms: q.list_or_empty(keys::WORK_FARMS),
                teams: q.list_or_empty(keys::WORK_TEAMS),
                lots: q.list_or_empty(keys::WORK_LOTS),
                categories: q.list_or_empty(keys::WORK_STAGES),
                search: q.text(keys::WORK_SEARCH),
            },
            material_filter: TableFilter {
                farms: q.list_or_empty(keys::MATERIAL_FARMS),
                teams: Vec::new(),
                lots: q.list_or_empty(keys::MATERIAL_LOTS),
                categories: q.list_or_empty(keys::MATERIAL_KINDS),
                search: q.text(keys::MATERIAL_SEARCH),
            },
        })
    }

    /// 侧边栏部分（不含表内筛选）
    pub fn sidebar_query(&self) -> QueryPairs {
        let mut pairs = self.sidebar.to_query();
        push_nonempty_list(&mut pairs, keys::LOTS, &self.lots);
        push_nonempty_list(&mut pairs, keys::TEAMS, &self.teams);
        pairs.push((keys::SUPPORT, flag_value(self.include_support)));
        pairs
    }

    pub fn to_query(&self) -> QueryPairs {
        let mut pairs = self.sidebar_query();
        let w = &self.work_filter;
        push_nonempty_list(&mut pairs, keys::WORK_FARMS, &w.farms);
        push_nonempty_list(&mut pairs, keys::WORK_TEAMS, &w.teams);
        push_nonempty_list(&mut pairs, keys::WORK_LOTS, &w.lots);
        push_nonempty_list(&mut pairs, keys::WORK_STAGES, &w.categories);
        if let Some(s) = &w.search {
            pairs.push((keys::WORK_SEARCH, s.clone()));
        }
        let m = &self.material_filter;
        push_nonempty_list(&mut pairs, keys::MATERIAL_FARMS, &m.farms);
        push_nonempty_list(&mut pairs, keys::MATERIAL_LOTS, &m.lots);
        push_nonempty_list(&mut pairs, keys::MATERIAL_KINDS, &m.categories);
        if let Some(s) = &m.search {
            pairs.push((keys::MATERIAL_SEARCH, s.clone()));
        }
        pairs
    }
}

// ==========================================
// 定额页
// ==========================================

impl QuotaRequest {
    pub fn from_query(q: &QueryParams) -> ApiResult<Self> {
        Ok(Self {
            sidebar: SidebarRequest::from_query(q)?,
            granularity: q.parsed::<Granularity>(keys::GRANULARITY)?.unwrap_or_default(),
            lots: q.list_or_empty(keys::LOTS),
            teams: q.list_or_empty(keys::TEAMS),
            include_support: q.flag(keys::SUPPORT, false),
        })
    }

    pub fn to_query(&self) -> QueryPairs {
        let mut pairs = self.sidebar.to_query();
        pairs.push((keys::GRANULARITY, self.granularity.code().to_string()));
        push_nonempty_list(&mut pairs, keys::LOTS, &self.lots);
        push_nonempty_list(&mut pairs, keys::TEAMS, &self.teams);
        pairs.push((keys::SUPPORT, flag_value(self.include_support)));
        pairs
    }
}

// ==========================================
// 预算页
// ==========================================

impl BudgetRequest {
    pub fn from_query(q: &QueryParams) -> ApiResult<Self> {
        let scopes = match q.list(keys::SCOPES) {
            None => None,
            Some(raw) => Some(
                raw.iter()
                    .map(|s| {
                        BudgetScope::parse(s)
                            .ok_or_else(|| ApiError::InvalidInput(format!("{}={}", keys::SCOPES, s)))
                    })
                    .collect::<ApiResult<Vec<_>>>()?,
            ),
        };
        Ok(Self {
            categories: q.list(keys::CATEGORIES),
            months: q.list(keys::MONTHS),
            scopes,
            line_items: q.list_or_empty(keys::ITEMS),
        })
    }

    pub fn to_query(&self) -> QueryPairs {
        let mut pairs = Vec::new();
        push_opt_list(&mut pairs, keys::CATEGORIES, &self.categories);
        push_opt_list(&mut pairs, keys::MONTHS, &self.months);
        if let Some(scopes) = &self.scopes {
            let names: Vec<String> = scopes.iter().map(|s| s.as_str().to_string()).collect();
            push_list(&mut pairs, keys::SCOPES, &names);
        }
        push_nonempty_list(&mut pairs, keys::ITEMS, &self.line_items);
        pairs
    }
}
