// ==========================================
// Trường Tồn 农场看板 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 每次查询使用短连接（打开 → 查询 → 关闭），不做连接池
// - 提供数仓建表语句（演示数据/测试使用，生产库已存在）
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 数仓表结构
///
/// 表名/列名与上游数仓保持一致（dim_* 维度表, fact_* 事实表）。
pub const WAREHOUSE_SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS dim_farm (
    farm_id     INTEGER PRIMARY KEY,
    farm_code   TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS dim_lo (
    lo_id       INTEGER PRIMARY KEY,
    lo_code     TEXT NOT NULL,
    lo_type     TEXT,
    farm_id     INTEGER REFERENCES dim_farm(farm_id)
);

CREATE TABLE IF NOT EXISTS dim_doi (
    doi_id      INTEGER PRIMARY KEY,
    doi_code    TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS dim_cong_viec (
    cong_viec_id  INTEGER PRIMARY KEY,
    ma_cv         TEXT,
    ten_cong_viec TEXT
);

CREATE TABLE IF NOT EXISTS dim_vat_tu (
    vat_tu_id    INTEGER PRIMARY KEY,
    ten_vat_tu   TEXT,
    loai_vat_tu  TEXT
);

CREATE TABLE IF NOT EXISTS dim_lo_doi (
    lo_id   INTEGER NOT NULL REFERENCES dim_lo(lo_id),
    doi_id  INTEGER NOT NULL REFERENCES dim_doi(doi_id),
    PRIMARY KEY (lo_id, doi_id)
);

CREATE TABLE IF NOT EXISTS fact_nhat_ky_san_xuat (
    nk_id         INTEGER PRIMARY KEY AUTOINCREMENT,
    farm_id       INTEGER NOT NULL REFERENCES dim_farm(farm_id),
    lo_id         INTEGER NOT NULL REFERENCES dim_lo(lo_id),
    doi_id        INTEGER NOT NULL REFERENCES dim_doi(doi_id),
    cong_viec_id  INTEGER NOT NULL REFERENCES dim_cong_viec(cong_viec_id),
    ngay          TEXT NOT NULL,
    cong_doan     TEXT,
    so_cong       REAL,
    klcv          REAL,
    dinh_muc      REAL,
    thanh_tien    REAL,
    is_ho_tro     INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_nk_farm_ngay ON fact_nhat_ky_san_xuat(farm_id, ngay);

CREATE TABLE IF NOT EXISTS fact_vat_tu (
    vt_id        INTEGER PRIMARY KEY AUTOINCREMENT,
    farm_id      INTEGER NOT NULL REFERENCES dim_farm(farm_id),
    lo_id        INTEGER NOT NULL REFERENCES dim_lo(lo_id),
    vat_tu_id    INTEGER REFERENCES dim_vat_tu(vat_tu_id),
    ngay         TEXT NOT NULL,
    loai_vat_tu  TEXT,
    thanh_tien   REAL
);

CREATE INDEX IF NOT EXISTS idx_vt_farm_ngay ON fact_vat_tu(farm_id, ngay);

CREATE TABLE IF NOT EXISTS fact_195_tong (
    tong_id                  INTEGER PRIMARY KEY AUTOINCREMENT,
    loai_du_lieu             TEXT NOT NULL,
    loai_chi_phi             TEXT,
    gia_tri                  REAL,
    ngay                     TEXT,
    ngay_bat_dau_khau_hao    TEXT,
    lo                       TEXT,
    lo_2                     TEXT,
    loai_lo                  TEXT,
    dien_tich_ha             REAL,
    hang_muc_du_toan_cong    TEXT,
    hang_muc_du_toan_vat_tu  TEXT,
    hang_muc_du_toan_dtbd    TEXT,
    ngoai_du_toan            TEXT,
    doi_thuc_hien            TEXT,
    hang_muc_cong_viec       TEXT,
    ma_cv                    TEXT,
    ma_dtbd                  TEXT,
    ten_vt_dtbd              TEXT,
    phan_loai_dtbd           TEXT,
    vat_tu                   TEXT,
    so_luong                 REAL,
    loai_vat_tu              TEXT,
    so_cong                  REAL,
    dvt                      TEXT,
    don_gia                  REAL,
    vu                       TEXT,
    tien_do_vu               REAL
);

CREATE TABLE IF NOT EXISTS config_kv (
    scope_id    TEXT NOT NULL DEFAULT 'global',
    key         TEXT NOT NULL,
    value       TEXT NOT NULL,
    updated_at  TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (scope_id, key)
);

CREATE TABLE IF NOT EXISTS schema_version (
    version     INTEGER NOT NULL,
    applied_at  TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let mut conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    crate::perf::install_sqlite_tracing(&mut conn);
    Ok(conn)
}

/// 建立数仓表结构（幂等）
///
/// 若 schema_version 为空则写入当前版本。
pub fn ensure_warehouse_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(WAREHOUSE_SCHEMA_SQL)?;
    if read_schema_version(conn)?.is_none() {
        conn.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            [CURRENT_SCHEMA_VERSION],
        )?;
    }
    Ok(())
}

/// 读取 schema_version（若表不存在或为空则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_schema_version_absent_on_empty_db() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(read_schema_version(&conn).unwrap(), None);
    }

    #[test]
    fn test_ensure_warehouse_schema_idempotent() {
        let tmp = NamedTempFile::new().unwrap();
        let path = tmp.path().to_str().unwrap().to_string();
        let conn = open_sqlite_connection(&path).unwrap();

        ensure_warehouse_schema(&conn).unwrap();
        ensure_warehouse_schema(&conn).unwrap();

        assert_eq!(read_schema_version(&conn).unwrap(), Some(CURRENT_SCHEMA_VERSION));
        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }
}
