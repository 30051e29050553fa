// ==========================================
// Trường Tồn 农场看板 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换Repository错误为用户可读的提示
// 两类错误:
// - 提示类 (is_notice): 页面显示警告并停止渲染，HTTP 200
// - 故障类: 显示错误页，HTTP 500
// ==========================================

use crate::i18n::{t, t_with_args};
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 停止渲染的提示
    // ==========================================
    /// 侧边栏未选择任何农场
    #[error("未选择农场")]
    NoFarmSelected,

    /// 某个多选项被清空（类别/月份/范围），或下钻后无数据
    #[error("选择为空: {0}")]
    EmptySelection(String),

    /// 查询结果为空
    #[error("无数据: {0}")]
    NoData(String),

    /// 起始日期晚于结束日期
    #[error("日期区间无效")]
    InvalidDateRange,

    // ==========================================
    // 请求错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    // ==========================================
    // 导出错误
    // ==========================================
    #[error("导出失败: {0}")]
    ExportError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 是否为 "警告 + 停止渲染" 类提示
    pub fn is_notice(&self) -> bool {
        matches!(
            self,
            ApiError::NoFarmSelected | ApiError::EmptySelection(_) | ApiError::NoData(_)
        )
    }

    /// 是否为请求参数错误（非法取值、起止日期颠倒）
    pub fn is_bad_request(&self) -> bool {
        matches!(self, ApiError::InvalidInput(_) | ApiError::InvalidDateRange)
    }

    /// 面向页面的提示文本（当前语言）
    pub fn user_message(&self) -> String {
        match self {
            ApiError::NoFarmSelected => t("notice.no_farm"),
            ApiError::EmptySelection(field) => match field.as_str() {
                "drill" => t("notice.drill_empty"),
                other => t_with_args("notice.empty_selection", &[("field", other)]),
            },
            ApiError::NoData(detail) if detail.is_empty() => t("notice.no_data"),
            ApiError::NoData(detail) => detail.clone(),
            ApiError::InvalidDateRange => t("notice.invalid_date_range"),
            ApiError::InvalidInput(msg) => t_with_args("error.invalid_input", &[("detail", msg)]),
            ApiError::DatabaseConnectionError(_) => t("error.database_connection"),
            ApiError::DatabaseError(_) => t("error.database"),
            ApiError::ExportError(_) => t("error.export"),
            ApiError::InternalError(_) | ApiError::Other(_) => t("error.internal"),
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NoData(format!("{}(id={})", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => ApiError::DatabaseError(msg),
            RepositoryError::ValidationError(msg) => ApiError::InvalidInput(msg),
            RepositoryError::FieldValueError { field, message } => {
                ApiError::DatabaseError(format!("字段{}错误: {}", field, message))
            }
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

impl From<csv::Error> for ApiError {
    fn from(err: csv::Error) -> Self {
        ApiError::ExportError(err.to_string())
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_classification() {
        assert!(ApiError::NoFarmSelected.is_notice());
        assert!(ApiError::EmptySelection("drill".into()).is_notice());
        assert!(ApiError::NoData(String::new()).is_notice());
        assert!(!ApiError::InvalidDateRange.is_notice());
        assert!(!ApiError::DatabaseError("x".into()).is_notice());
        assert!(!ApiError::ExportError("x".into()).is_notice());
    }

    #[test]
    fn test_bad_request_classification() {
        assert!(ApiError::InvalidDateRange.is_bad_request());
        assert!(ApiError::InvalidInput("gran=X".into()).is_bad_request());
        assert!(!ApiError::NoFarmSelected.is_bad_request());
        assert!(!ApiError::DatabaseError("x".into()).is_bad_request());
    }

    #[test]
    fn test_repository_error_conversion() {
        let api_err: ApiError = RepositoryError::DatabaseQueryError("no such table: dim_farm".into()).into();
        match api_err {
            ApiError::DatabaseError(msg) => assert!(msg.contains("dim_farm")),
            other => panic!("意外的错误类型: {:?}", other),
        }

        let api_err: ApiError = RepositoryError::LockError("busy".into()).into();
        assert!(matches!(api_err, ApiError::DatabaseConnectionError(_)));
        assert!(!api_err.is_notice());
    }

    #[test]
    fn test_no_data_detail_is_shown_verbatim() {
        let err = ApiError::NoData("Farm 195 trống".into());
        assert_eq!(err.user_message(), "Farm 195 trống");
    }
}
