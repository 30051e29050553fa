// ==========================================
// Trường Tồn 农场看板 - 预算 CSV 导入工具
// ==========================================
// 用法: import_budget_csv <file.csv> [db_path]
// db_path 缺省时取 FARM_DASH_DB_PATH / 默认数仓路径
// ==========================================

use std::path::PathBuf;

use anyhow::{bail, Context};
use farm_ops_dashboard::config::AppConfig;
use farm_ops_dashboard::importer::BudgetImporter;
use farm_ops_dashboard::logging;

fn main() -> anyhow::Result<()> {
    logging::init();

    let mut args = std::env::args().skip(1);
    let Some(file) = args.next() else {
        bail!("用法: import_budget_csv <file.csv> [db_path]");
    };
    let db_path = match args.next() {
        Some(path) => path,
        None => AppConfig::from_env()?.db_path,
    };

    let summary = BudgetImporter::new(db_path.clone())
        .import_file(&PathBuf::from(&file))
        .with_context(|| format!("导入失败: {}", file))?;

    println!("数据库: {}", db_path);
    println!(
        "共 {} 行, 写入 {} 行, 跳过 {} 行",
        summary.total_rows, summary.imported, summary.skipped
    );
    for err in &summary.errors {
        println!("  - {}", err);
    }
    Ok(())
}
