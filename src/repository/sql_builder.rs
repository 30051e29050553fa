// ==========================================
// Trường Tồn 农场看板 - SQL 构建工具模块
// ==========================================
// 职责: 累积 WHERE 条件与绑定参数
// 红线: 值一律走参数绑定，不拼接进 SQL 文本
// ==========================================

use rusqlite::types::Value;

/// 构建 IN 子句占位符
///
/// # 参数
/// - `column`: 列名
/// - `count`: 值个数
///
/// # 返回
/// - "col IN (?, ?, ?)"；count 为 0 时返回恒假条件 "1 = 0"
///
/// # 示例
/// ```
/// use farm_ops_dashboard::repository::sql_builder::in_clause;
///
/// assert_eq!(in_clause("nk.farm_id", 2), "nk.farm_id IN (?, ?)");
/// assert_eq!(in_clause("nk.farm_id", 0), "1 = 0");
/// ```
pub fn in_clause(column: &str, count: usize) -> String {
    if count == 0 {
        return "1 = 0".to_string();
    }
    let placeholders = vec!["?"; count].join(", ");
    format!("{} IN ({})", column, placeholders)
}

/// 动态过滤条件构建器
///
/// # 用途
/// 看板查询都是 "固定 SELECT + 若干可选过滤"，可选过滤为空列表时不生效。
///
/// # 示例
/// ```
/// use farm_ops_dashboard::repository::sql_builder::FilterSql;
///
/// let mut f = FilterSql::new();
/// f.in_list("nk.farm_id", &[1_i64, 2]);
/// f.in_list_if_any::<String>("l.lo_code", &[]);
/// f.push("nk.dinh_muc > 0");
/// assert_eq!(f.where_sql(), "WHERE nk.farm_id IN (?, ?) AND nk.dinh_muc > 0");
/// assert_eq!(f.params().len(), 2);
/// ```
#[derive(Debug, Default, Clone)]
pub struct FilterSql {
    conditions: Vec<String>,
    params: Vec<Value>,
}

impl FilterSql {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加无参数条件
    pub fn push(&mut self, condition: &str) -> &mut Self {
        self.conditions.push(condition.to_string());
        self
    }

    /// 添加带参数条件（条件中的 ? 个数需与 values 一致）
    pub fn push_with<V: Into<Value>>(&mut self, condition: &str, values: Vec<V>) -> &mut Self {
        self.conditions.push(condition.to_string());
        self.params.extend(values.into_iter().map(Into::into));
        self
    }

    /// 强制 IN 条件：空列表生成恒假条件
    pub fn in_list<V: Clone + Into<Value>>(&mut self, column: &str, values: &[V]) -> &mut Self {
        self.conditions.push(in_clause(column, values.len()));
        self.params.extend(values.iter().cloned().map(Into::into));
        self
    }

    /// 可选 IN 条件：空列表表示不过滤
    pub fn in_list_if_any<V: Clone + Into<Value>>(&mut self, column: &str, values: &[V]) -> &mut Self {
        if !values.is_empty() {
            self.in_list(column, values);
        }
        self
    }

    /// 条件为真时添加
    pub fn push_if(&mut self, enabled: bool, condition: &str) -> &mut Self {
        if enabled {
            self.push(condition);
        }
        self
    }

    /// 生成 WHERE 子句（无条件时为空串）
    pub fn where_sql(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        }
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_clause() {
        assert_eq!(in_clause("d.doi_code", 1), "d.doi_code IN (?)");
        assert_eq!(in_clause("d.doi_code", 3), "d.doi_code IN (?, ?, ?)");
        assert_eq!(in_clause("d.doi_code", 0), "1 = 0");
    }

    #[test]
    fn test_empty_filter_has_no_where() {
        let f = FilterSql::new();
        assert_eq!(f.where_sql(), "");
        assert!(f.params().is_empty());
    }

    #[test]
    fn test_filter_params_order() {
        let mut f = FilterSql::new();
        f.in_list("nk.farm_id", &[7_i64])
            .push_with("nk.ngay BETWEEN ? AND ?", vec!["2025-01-01".to_string(), "2025-01-31".to_string()])
            .in_list_if_any("l.lo_type", &["Lô thực".to_string()])
            .push_if(false, "nk.is_ho_tro = 0");

        assert_eq!(
            f.where_sql(),
            "WHERE nk.farm_id IN (?) AND nk.ngay BETWEEN ? AND ? AND l.lo_type IN (?)"
        );
        assert_eq!(
            f.params(),
            &[
                Value::Integer(7),
                Value::Text("2025-01-01".into()),
                Value::Text("2025-01-31".into()),
                Value::Text("Lô thực".into()),
            ]
        );
    }

    #[test]
    fn test_forced_in_list_empty_is_false() {
        let mut f = FilterSql::new();
        f.in_list::<i64>("nk.farm_id", &[]);
        assert_eq!(f.where_sql(), "WHERE 1 = 0");
    }
}
