// ==========================================
// Trường Tồn 农场看板 - 演示数仓生成工具
// ==========================================
// 用法: seed_demo_warehouse [db_path]
// 已存在的库先备份为 <db_path>.bak.<时间戳> 再重建
// 数据确定性生成（固定种子），便于对照页面截图
// ==========================================

use std::fs;
use std::path::Path;

use anyhow::Context;
use chrono::{Duration, Local, NaiveDate};
use rusqlite::{params, Connection};

use farm_ops_dashboard::config::AppConfig;
use farm_ops_dashboard::db::{ensure_warehouse_schema, open_sqlite_connection};
use farm_ops_dashboard::logging;

/// 日志覆盖天数
const HORIZON_DAYS: i64 = 180;

/// 人工日单价（VND）
const DAY_RATE: f64 = 250_000.0;

const FARMS: [(i64, &str); 3] = [(1, "Farm 126"), (2, "Farm 157"), (3, "Farm 195")];

const TEAMS: [(i64, &str); 6] = [
    (1, "Đội 1"),
    (2, "Đội 2"),
    (3, "Đội 3"),
    (4, "Đội 4"),
    (5, "Đội 5"),
    (6, "Đội 6"),
];

/// (cong_viec_id, ma_cv, ten_cong_viec, 工段, 定额)
const WORKS: [(i64, &str, &str, &str, f64); 6] = [
    (1, "CV01", "Làm cỏ", "Chăm sóc", 0.25),
    (2, "CV02", "Bón phân", "Chăm sóc", 0.5),
    (3, "CV03", "Tỉa cành", "Chăm sóc", 0.2),
    (4, "CV04", "Phun thuốc", "Bảo vệ thực vật", 1.0),
    (5, "CV05", "Thu hoạch", "Thu hoạch", 1.5),
    (6, "CV06", "Đào hố trồng mới", "Kiến thiết", 40.0),
];

/// (vat_tu_id, ten_vat_tu, loai_vat_tu, 单价)
const MATERIALS: [(i64, &str, &str, f64); 5] = [
    (1, "Ure", "Phân bón", 14_000.0),
    (2, "NPK 16-16-8", "Phân bón", 16_500.0),
    (3, "Glyphosate", "Thuốc BVTV", 120_000.0),
    (4, "Ống tưới PE", "Vật tư tưới", 9_000.0),
    (5, "Bao tải", "Vật tư khác", 4_500.0),
];

/// 预算科目: (类别, 科目, 月计划额)
const BUDGET_ITEMS: [(&str, &str, f64); 6] = [
    ("Công", "Chăm sóc vườn", 60_000_000.0),
    ("Công", "Thu hoạch", 45_000_000.0),
    ("Công", "Kiến thiết cơ bản", 25_000_000.0),
    ("Vật Tư", "Phân bón", 38_000_000.0),
    ("Vật Tư", "Thuốc BVTV", 18_000_000.0),
    ("Vật Tư", "Hệ thống tưới", 12_000_000.0),
];

/// 确定性伪随机数（线性同余）
struct Lcg(u64);

impl Lcg {
    fn next_f64(&mut self) -> f64 {
        self.0 = self.0.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1_442_695_040_888_963_407);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }

    /// [lo, hi) 均匀分布
    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    fn pick(&mut self, n: usize) -> usize {
        ((self.next_f64() * n as f64) as usize).min(n.saturating_sub(1))
    }
}

fn main() -> anyhow::Result<()> {
    logging::init();

    let db_path = match std::env::args().nth(1) {
        Some(path) => path,
        None => AppConfig::from_env()?.db_path,
    };

    backup_and_reset_db(&db_path)?;
    if let Some(parent) = Path::new(&db_path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| format!("无法创建目录 {}", parent.display()))?;
        }
    }

    let mut conn = open_sqlite_connection(&db_path).with_context(|| format!("无法打开 {}", db_path))?;
    ensure_warehouse_schema(&conn)?;

    let start = NaiveDate::from_ymd_opt(2025, 1, 1).context("起始日期无效")?;
    let mut rng = Lcg(195);

    let tx = conn.transaction()?;
    seed_dimensions(&tx)?;
    seed_logs(&tx, start, &mut rng)?;
    seed_materials(&tx, start, &mut rng)?;
    seed_budget(&tx, start, &mut rng)?;
    tx.commit()?;

    print_quick_counts(&conn)?;
    println!("演示数仓已生成: {}", db_path);
    Ok(())
}

fn backup_and_reset_db(db_path: &str) -> anyhow::Result<()> {
    let path = Path::new(db_path);
    if !path.exists() {
        return Ok(());
    }

    let ts = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let backup_path = format!("{}.bak.{}", db_path, ts);
    fs::copy(path, &backup_path)?;
    fs::remove_file(path)?;

    eprintln!("Backed up {} -> {}", db_path, backup_path);
    Ok(())
}

/// 地块: 每个农场 4 个实地块 + 1 个虚地块
///
/// lo_id = 农场序号 * 10 + 序号；虚地块序号为 9
fn lot_ids(farm_id: i64) -> Vec<(i64, String, &'static str)> {
    let prefix = ["A", "B", "C"][(farm_id - 1) as usize % 3];
    let mut lots: Vec<(i64, String, &'static str)> = (1..=4)
        .map(|i| (farm_id * 10 + i, format!("{}{}", prefix, i), "Lô thực"))
        .collect();
    lots.push((farm_id * 10 + 9, format!("{}-VP", prefix), "Lô ảo"));
    lots
}

/// 班组归属: Đội 1/2 → 农场 1，Đội 3/4 → 农场 2，Đội 5/6 → 农场 3
fn owner_team(lo_id: i64) -> i64 {
    let farm_id = lo_id / 10;
    let offset = if lo_id % 10 <= 2 { 1 } else { 2 };
    (farm_id - 1) * 2 + offset
}

fn seed_dimensions(conn: &Connection) -> anyhow::Result<()> {
    for (id, code) in FARMS {
        conn.execute("INSERT INTO dim_farm (farm_id, farm_code) VALUES (?1, ?2)", params![id, code])?;
        for (lo_id, lo_code, lo_type) in lot_ids(id) {
            conn.execute(
                "INSERT INTO dim_lo (lo_id, lo_code, lo_type, farm_id) VALUES (?1, ?2, ?3, ?4)",
                params![lo_id, lo_code, lo_type, id],
            )?;
        }
    }
    for (id, code) in TEAMS {
        conn.execute("INSERT INTO dim_doi (doi_id, doi_code) VALUES (?1, ?2)", params![id, code])?;
    }
    for (farm_id, _) in FARMS {
        for (lo_id, _, lo_type) in lot_ids(farm_id) {
            if lo_type == "Lô thực" {
                conn.execute(
                    "INSERT INTO dim_lo_doi (lo_id, doi_id) VALUES (?1, ?2)",
                    params![lo_id, owner_team(lo_id)],
                )?;
            }
        }
    }
    for (id, ma_cv, ten, _, _) in WORKS {
        conn.execute(
            "INSERT INTO dim_cong_viec (cong_viec_id, ma_cv, ten_cong_viec) VALUES (?1, ?2, ?3)",
            params![id, ma_cv, ten],
        )?;
    }
    for (id, ten, loai, _) in MATERIALS {
        conn.execute(
            "INSERT INTO dim_vat_tu (vat_tu_id, ten_vat_tu, loai_vat_tu) VALUES (?1, ?2, ?3)",
            params![id, ten, loai],
        )?;
    }
    Ok(())
}

/// 生产日志: 每两天每个地块一条；约 15% 由外组支援
fn seed_logs(conn: &Connection, start: NaiveDate, rng: &mut Lcg) -> anyhow::Result<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO fact_nhat_ky_san_xuat
         (farm_id, lo_id, doi_id, cong_viec_id, ngay, cong_doan, so_cong, klcv, dinh_muc, thanh_tien, is_ho_tro)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
    )?;

    for day in (0..HORIZON_DAYS).step_by(2) {
        let ngay = (start + Duration::days(day)).format("%Y-%m-%d").to_string();
        for (farm_id, _) in FARMS {
            for (lo_id, _, lo_type) in lot_ids(farm_id) {
                let (cv_id, _, _, cong_doan, dinh_muc) = WORKS[rng.pick(WORKS.len())];
                let owner = owner_team(lo_id);
                let support = rng.next_f64() < 0.15;
                let doi_id = if support { (owner % TEAMS.len() as i64) + 1 } else { owner };

                let so_cong = (rng.range(2.0, 12.0) * 2.0).round() / 2.0;
                // 完成率大致在 50%..130% 之间波动，虚地块不记定额
                let ratio = rng.range(0.5, 1.3);
                let (klcv, dm) = if lo_type == "Lô thực" {
                    (Some((so_cong * dinh_muc * ratio * 100.0).round() / 100.0), Some(dinh_muc))
                } else {
                    (None, None)
                };
                let thanh_tien = so_cong * DAY_RATE;

                stmt.execute(params![
                    farm_id, lo_id, doi_id, cv_id, ngay, cong_doan, so_cong, klcv, dm, thanh_tien, support
                ])?;
            }
        }
    }
    Ok(())
}

/// 物资: 每周每个实地块一到两条
fn seed_materials(conn: &Connection, start: NaiveDate, rng: &mut Lcg) -> anyhow::Result<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO fact_vat_tu (farm_id, lo_id, vat_tu_id, ngay, loai_vat_tu, thanh_tien)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;

    for week in 0..(HORIZON_DAYS / 7) {
        let ngay = (start + Duration::days(week * 7 + 1)).format("%Y-%m-%d").to_string();
        for (farm_id, _) in FARMS {
            for (lo_id, _, lo_type) in lot_ids(farm_id) {
                if lo_type != "Lô thực" {
                    continue;
                }
                let entries = if rng.next_f64() < 0.4 { 2 } else { 1 };
                for _ in 0..entries {
                    let (vt_id, _, loai, price) = MATERIALS[rng.pick(MATERIALS.len())];
                    let qty = rng.range(20.0, 200.0).round();
                    stmt.execute(params![farm_id, lo_id, vt_id, ngay, loai, qty * price])?;
                }
            }
        }
    }
    Ok(())
}

/// Farm 195 预算对比: 每科目每月一条预算 + 一条实际，另加少量预算外实际支出
fn seed_budget(conn: &Connection, start: NaiveDate, rng: &mut Lcg) -> anyhow::Result<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO fact_195_tong
         (loai_du_lieu, loai_chi_phi, gia_tri, ngay, lo, loai_lo, hang_muc_du_toan_cong,
          ngoai_du_toan, doi_thuc_hien, hang_muc_cong_viec, ma_cv, ma_dtbd, vat_tu, vu)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
    )?;

    let months = HORIZON_DAYS / 30;
    for m in 0..months {
        let ngay = (start + Duration::days(m * 30 + 14)).format("%Y-%m-%d").to_string();
        for (category, item, planned) in BUDGET_ITEMS {
            let actual = (planned * rng.range(0.55, 1.25) / 1_000.0).round() * 1_000.0;
            let lot = format!("C{}", rng.pick(4) + 1);
            stmt.execute(params![
                "Dự toán", category, planned, ngay, Option::<String>::None, "Lô thực", item,
                "Trong dự toán", Option::<String>::None, Option::<String>::None,
                Option::<String>::None, Option::<String>::None, Option::<String>::None, "2025"
            ])?;
            stmt.execute(params![
                "Thực tế", category, actual, ngay, lot, "Lô thực", item,
                "Trong dự toán", Option::<String>::None, Option::<String>::None,
                Option::<String>::None, Option::<String>::None, Option::<String>::None, "2025"
            ])?;
        }

        // 预算外
        let (team, work, ma_cv, material) = match m % 3 {
            0 => (Some("Đội 5"), Some("Sửa đường lô"), Some("CV90"), None),
            1 => (None, None, None, Some("Lưới che nắng")),
            _ => (Some("Đội 6"), Some("Khơi rãnh thoát nước"), Some("CV91"), None),
        };
        let category = if material.is_some() { "Vật Tư" } else { "Công" };
        let amount = (rng.range(3_000_000.0, 15_000_000.0) / 1_000.0).round() * 1_000.0;
        stmt.execute(params![
            "Thực tế", category, amount, ngay, format!("C{}", rng.pick(4) + 1), "Lô thực",
            Option::<String>::None, "Ngoài dự toán", team, work, ma_cv,
            format!("DTBD-{:02}", m + 1), material, "2025"
        ])?;
    }
    Ok(())
}

fn print_quick_counts(conn: &Connection) -> anyhow::Result<()> {
    for table in ["dim_farm", "dim_lo", "fact_nhat_ky_san_xuat", "fact_vat_tu", "fact_195_tong"] {
        let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))?;
        println!("{:<24} {}", table, count);
    }
    Ok(())
}
