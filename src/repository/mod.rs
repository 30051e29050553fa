// ==========================================
// Trường Tồn 农场看板 - 数据仓储层
// ==========================================
// 职责: 对数仓执行参数化 SQL，返回强类型行
// 约定: 每次查询打开短连接，用完即关闭（不做连接池/事务）
// ==========================================

pub mod budget_repo;
pub mod dimension_repo;
pub mod error;
pub mod labor_repo;
pub mod material_cost_repo;
pub mod quota_repo;
pub mod sql_builder;

pub use budget_repo::BudgetRepository;
pub use dimension_repo::DimensionRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use labor_repo::LaborRepository;
pub use material_cost_repo::MaterialCostRepository;
pub use quota_repo::QuotaRepository;

use chrono::NaiveDate;
use rusqlite::Connection;

/// 打开一次性查询连接
///
/// 打开失败统一映射为 DatabaseConnectionError（与查询失败区分）。
pub(crate) fn connect(db_path: &str) -> RepositoryResult<Connection> {
    crate::db::open_sqlite_connection(db_path)
        .map_err(|e| RepositoryError::DatabaseConnectionError(format!("{}: {}", db_path, e)))
}

/// 日期参数（数仓日期列为 ISO 文本）
pub(crate) fn date_param(d: NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

/// 宽松日期解析：无法解析的值视为缺失
///
/// 支持 "YYYY-MM-DD"、"YYYY-MM-DD HH:MM:SS"、"YYYY-MM-DDTHH:MM:SS" 与 "dd/mm/YYYY"。
pub fn parse_date_lenient(raw: Option<&str>) -> Option<NaiveDate> {
    let s = raw?.trim();
    if s.is_empty() {
        return None;
    }
    let head = s.get(..10).unwrap_or(s);
    NaiveDate::parse_from_str(head, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%d/%m/%Y"))
        .ok()
}

#[cfg(test)]
pub(crate) mod test_support {
    use rusqlite::{params, Connection};
    use tempfile::NamedTempFile;

    /// 创建带数仓表结构的临时库
    pub fn temp_warehouse() -> (NamedTempFile, String) {
        let tmp = NamedTempFile::new().unwrap();
        let path = tmp.path().to_str().unwrap().to_string();
        let conn = Connection::open(&path).unwrap();
        crate::db::ensure_warehouse_schema(&conn).unwrap();
        (tmp, path)
    }

    /// 插入一组最小维度数据：
    /// - Farm 126 (1) / Farm 157 (2)
    /// - 地块 A1(实), A2(实) 属 126；B1(实), VP(虚) 属 157
    /// - 班组 D01 / D02；D01 → A1, A2
    /// - 工作 CV01 Làm cỏ / CV02 Bón phân
    pub fn seed_dimensions(conn: &Connection) {
        conn.execute_batch(
            r#"
            INSERT INTO dim_farm (farm_id, farm_code) VALUES (1, 'Farm 126'), (2, 'Farm 157');
            INSERT INTO dim_lo (lo_id, lo_code, lo_type, farm_id) VALUES
                (1, 'A1', 'Lô thực', 1), (2, 'A2', 'Lô thực', 1),
                (3, 'B1', 'Lô thực', 2), (4, 'VP', 'Lô ảo', 2);
            INSERT INTO dim_doi (doi_id, doi_code) VALUES (1, 'D01'), (2, 'D02');
            INSERT INTO dim_lo_doi (lo_id, doi_id) VALUES (1, 1), (2, 1);
            INSERT INTO dim_cong_viec (cong_viec_id, ma_cv, ten_cong_viec) VALUES
                (1, 'CV01', 'Làm cỏ'), (2, 'CV02', 'Bón phân'), (3, 'CV03', '  ');
            INSERT INTO dim_vat_tu (vat_tu_id, ten_vat_tu, loai_vat_tu) VALUES
                (1, 'Ure', 'Phân bón'), (2, NULL, NULL);
            "#,
        )
        .unwrap();
    }

    /// 插入一条生产日志
    #[allow(clippy::too_many_arguments)]
    pub fn insert_log(
        conn: &Connection,
        farm_id: i64,
        lo_id: i64,
        doi_id: i64,
        cv_id: i64,
        ngay: &str,
        cong_doan: Option<&str>,
        so_cong: f64,
        klcv: Option<f64>,
        dinh_muc: Option<f64>,
        thanh_tien: f64,
        is_ho_tro: bool,
    ) {
        conn.execute(
            "INSERT INTO fact_nhat_ky_san_xuat
             (farm_id, lo_id, doi_id, cong_viec_id, ngay, cong_doan, so_cong, klcv, dinh_muc, thanh_tien, is_ho_tro)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![farm_id, lo_id, doi_id, cv_id, ngay, cong_doan, so_cong, klcv, dinh_muc, thanh_tien, is_ho_tro],
        )
        .unwrap();
    }

    /// 插入一条物资记录
    pub fn insert_material(
        conn: &Connection,
        farm_id: i64,
        lo_id: i64,
        vat_tu_id: Option<i64>,
        ngay: &str,
        loai_vat_tu: Option<&str>,
        thanh_tien: f64,
    ) {
        conn.execute(
            "INSERT INTO fact_vat_tu (farm_id, lo_id, vat_tu_id, ngay, loai_vat_tu, thanh_tien)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![farm_id, lo_id, vat_tu_id, ngay, loai_vat_tu, thanh_tien],
        )
        .unwrap();
    }
}
