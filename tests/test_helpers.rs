// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 临时数仓 + 已知数值的小型数据集
// ==========================================
// 数据集:
// - Farm 126: A1, A2 (Lô thực)；Farm 157: B1 (Lô thực), VP (Lô ảo)
// - D01 → A1, A2；D02 → B1
// - 人工 1,100,000（其中支援 100,000）；物资 1,000,000
// - 定额记录 3 条: 90% / 120% / 50%
// - 预算: 预算内实际 3,400,000 / 预算 3,000,000，预算外 300,000
// ==========================================

#![allow(dead_code)]

use std::error::Error;
use std::sync::Arc;

use rusqlite::{params, Connection};
use tempfile::NamedTempFile;

use farm_ops_dashboard::app::AppState;
use farm_ops_dashboard::config::DashboardSettings;
use farm_ops_dashboard::db::ensure_warehouse_schema;

pub const LABOR_TOTAL: f64 = 1_100_000.0;
pub const SUPPORT_LABOR: f64 = 100_000.0;
pub const MATERIAL_TOTAL: f64 = 1_000_000.0;

/// 创建临时数仓并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().ok_or("临时路径非 UTF-8")?.to_string();

    let conn = Connection::open(&db_path)?;
    ensure_warehouse_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 创建临时数仓并写入完整数据集
pub fn create_seeded_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let (tmp, db_path) = create_test_db()?;
    let conn = Connection::open(&db_path)?;
    seed_dimensions(&conn)?;
    seed_facts(&conn)?;
    seed_budget(&conn)?;
    Ok((tmp, db_path))
}

pub fn seed_dimensions(conn: &Connection) -> Result<(), Box<dyn Error>> {
    conn.execute_batch(
        r#"
        INSERT INTO dim_farm (farm_id, farm_code) VALUES (1, 'Farm 126'), (2, 'Farm 157');
        INSERT INTO dim_lo (lo_id, lo_code, lo_type, farm_id) VALUES
            (1, 'A1', 'Lô thực', 1), (2, 'A2', 'Lô thực', 1),
            (3, 'B1', 'Lô thực', 2), (4, 'VP', 'Lô ảo', 2);
        INSERT INTO dim_doi (doi_id, doi_code) VALUES (1, 'D01'), (2, 'D02');
        INSERT INTO dim_lo_doi (lo_id, doi_id) VALUES (1, 1), (2, 1), (3, 2);
        INSERT INTO dim_cong_viec (cong_viec_id, ma_cv, ten_cong_viec) VALUES
            (1, 'CV01', 'Làm cỏ'), (2, 'CV02', 'Bón phân');
        INSERT INTO dim_vat_tu (vat_tu_id, ten_vat_tu, loai_vat_tu) VALUES (1, 'Ure', 'Phân bón');
        "#,
    )?;
    Ok(())
}

/// 生产日志与物资
pub fn seed_facts(conn: &Connection) -> Result<(), Box<dyn Error>> {
    let logs: [(i64, i64, i64, i64, &str, &str, f64, Option<f64>, Option<f64>, f64, bool); 4] = [
        (1, 1, 1, 1, "2025-01-05", "Chăm sóc", 2.0, Some(18.0), Some(10.0), 500_000.0, false),
        (1, 2, 1, 2, "2025-02-07", "Bón phân", 1.0, Some(12.0), Some(10.0), 300_000.0, false),
        (2, 3, 2, 1, "2025-02-10", "Chăm sóc", 1.0, Some(5.0), Some(10.0), 200_000.0, false),
        (2, 3, 1, 1, "2025-03-01", "Chăm sóc", 1.0, None, None, 100_000.0, true),
    ];
    for (farm, lo, doi, cv, ngay, cong_doan, so_cong, klcv, dinh_muc, thanh_tien, ho_tro) in logs {
        conn.execute(
            "INSERT INTO fact_nhat_ky_san_xuat
             (farm_id, lo_id, doi_id, cong_viec_id, ngay, cong_doan, so_cong, klcv, dinh_muc, thanh_tien, is_ho_tro)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![farm, lo, doi, cv, ngay, cong_doan, so_cong, klcv, dinh_muc, thanh_tien, ho_tro],
        )?;
    }

    let materials: [(i64, i64, &str, f64); 2] = [
        (1, 1, "2025-01-20", 600_000.0),
        (2, 3, "2025-02-15", 400_000.0),
    ];
    for (farm, lo, ngay, thanh_tien) in materials {
        conn.execute(
            "INSERT INTO fact_vat_tu (farm_id, lo_id, vat_tu_id, ngay, loai_vat_tu, thanh_tien)
             VALUES (?1, ?2, 1, ?3, 'Phân bón', ?4)",
            params![farm, lo, ngay, thanh_tien],
        )?;
    }
    Ok(())
}

/// Farm 195 预算对比
pub fn seed_budget(conn: &Connection) -> Result<(), Box<dyn Error>> {
    let lines: [(&str, &str, Option<&str>, &str, &str, f64, Option<&str>); 5] = [
        ("Dự toán", "Công", Some("Làm cỏ"), "Trong dự toán", "2025-01-15", 1_000_000.0, None),
        ("Thực tế", "Công", Some("Làm cỏ"), "Trong dự toán", "2025-01-20", 900_000.0, None),
        ("Dự toán", "Vật Tư", Some("Phân bón"), "Trong dự toán", "2025-02-10", 2_000_000.0, None),
        ("Thực tế", "Vật Tư", Some("Phân bón"), "Trong dự toán", "2025-02-12", 2_500_000.0, None),
        ("Thực tế", "Công", None, "Ngoài dự toán", "2025-02-20", 300_000.0, Some("Đội 5")),
    ];
    for (kind, category, item, scope, ngay, amount, team) in lines {
        conn.execute(
            "INSERT INTO fact_195_tong
             (loai_du_lieu, loai_chi_phi, hang_muc_du_toan_cong, ngoai_du_toan, ngay, gia_tri, doi_thuc_hien)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![kind, category, item, scope, ngay, amount, team],
        )?;
    }
    Ok(())
}

/// 以默认配置组装应用状态
pub fn test_state(db_path: &str) -> Arc<AppState> {
    Arc::new(AppState::with_settings(db_path.to_string(), DashboardSettings::default()))
}
