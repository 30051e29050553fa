// ==========================================
// Trường Tồn 农场看板 - 预算对比 CSV 导入器
// ==========================================
// 流程: 读取 CSV → 字段映射 → 行级校验 → 单事务写入 fact_195_tong
// 列名与 fact_195_tong 一致；三个预算科目列可任选其一，也接受合并列 hang_muc
// 行级错误跳过该行并记入汇总，文件级错误直接返回
// ==========================================

use csv::ReaderBuilder;
use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;
use tracing::{info, warn};

use super::error::{ImportError, ImportResult};
use crate::domain::types::{BudgetScope, DataKind};
use crate::domain::BudgetLine;
use crate::repository::{parse_date_lenient, BudgetRepository};

/// 必需列
const REQUIRED_COLUMNS: [&str; 2] = ["loai_du_lieu", "gia_tri"];

/// 预算科目候选列（按优先级）
const LINE_ITEM_COLUMNS: [&str; 4] = [
    "hang_muc_du_toan_cong",
    "hang_muc_du_toan_vat_tu",
    "hang_muc_du_toan_dtbd",
    "hang_muc",
];

/// 导入汇总
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportSummary {
    pub total_rows: usize,
    pub imported: usize,
    pub skipped: usize,
    /// 行级错误描述（含行号）
    pub errors: Vec<String>,
}

/// 原始行: (CSV 行号, 列名 → 去空白后的值)
type RawRecord = (usize, HashMap<String, String>);

pub struct BudgetImporter {
    repo: BudgetRepository,
}

impl BudgetImporter {
    pub fn new(db_path: impl Into<String>) -> Self {
        Self {
            repo: BudgetRepository::new(db_path),
        }
    }

    /// 导入一个 CSV 文件
    ///
    /// # 返回
    /// - Ok(ImportSummary): 成功写入与跳过的行数
    /// - Err: 文件不可读、缺少必需列或写库失败
    pub fn import_file(&self, path: &Path) -> ImportResult<ImportSummary> {
        let records = parse_csv_records(path)?;
        let mut summary = ImportSummary {
            total_rows: records.len(),
            ..Default::default()
        };

        let mut lines = Vec::with_capacity(records.len());
        for (row, fields) in &records {
            match map_record(*row, fields) {
                Ok(line) => lines.push(line),
                Err(e) if e.is_row_level() => {
                    warn!(row, error = %e, "跳过预算行");
                    summary.skipped += 1;
                    summary.errors.push(e.to_string());
                }
                Err(e) => return Err(e),
            }
        }

        summary.imported = self.repo.insert_budget_lines(&lines)?;
        info!(
            file = %path.display(),
            total = summary.total_rows,
            imported = summary.imported,
            skipped = summary.skipped,
            "预算 CSV 导入完成"
        );
        Ok(summary)
    }
}

/// 读取 CSV 为原始行（跳过全空行，表头去 BOM）
fn parse_csv_records(path: &Path) -> ImportResult<Vec<RawRecord>> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    if let Some(ext) = path.extension() {
        if !ext.eq_ignore_ascii_case("csv") {
            return Err(ImportError::UnsupportedFormat(ext.to_string_lossy().to_string()));
        }
    }

    let file = File::open(path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    for required in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == required) {
            return Err(ImportError::MissingColumn(required.to_string()));
        }
    }

    let mut records = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result?;
        let fields: HashMap<String, String> = headers
            .iter()
            .cloned()
            .zip(record.iter().map(|v| v.trim().to_string()))
            .collect();

        if fields.values().all(|v| v.is_empty()) {
            continue;
        }
        // 表头为第 1 行
        records.push((idx + 2, fields));
    }
    Ok(records)
}

fn text(fields: &HashMap<String, String>, key: &str) -> Option<String> {
    fields.get(key).filter(|v| !v.is_empty()).cloned()
}

/// 数值解析：允许千分位逗号与空格
fn number(fields: &HashMap<String, String>, key: &str, row: usize) -> ImportResult<Option<f64>> {
    let Some(raw) = text(fields, key) else {
        return Ok(None);
    };
    let cleaned: String = raw.chars().filter(|c| *c != ',' && !c.is_whitespace()).collect();
    cleaned
        .parse::<f64>()
        .map(Some)
        .map_err(|e| ImportError::TypeConversionError {
            row,
            field: key.to_string(),
            message: format!("{}: {}", raw, e),
        })
}

fn date(
    fields: &HashMap<String, String>,
    key: &str,
    row: usize,
) -> ImportResult<Option<chrono::NaiveDate>> {
    match text(fields, key) {
        None => Ok(None),
        Some(raw) => parse_date_lenient(Some(&raw)).map(Some).ok_or(ImportError::DateFormatError {
            row,
            field: key.to_string(),
            value: raw,
        }),
    }
}

/// 字段映射 + 行级校验
fn map_record(row: usize, fields: &HashMap<String, String>) -> ImportResult<BudgetLine> {
    let loai_du_lieu = text(fields, "loai_du_lieu").unwrap_or_default();
    if DataKind::parse(&loai_du_lieu).is_none() {
        return Err(ImportError::InvalidValue {
            row,
            field: "loai_du_lieu".to_string(),
            value: loai_du_lieu,
        });
    }

    let ngoai_du_toan = text(fields, "ngoai_du_toan");
    if let Some(scope) = &ngoai_du_toan {
        if BudgetScope::parse(scope).is_none() {
            return Err(ImportError::InvalidValue {
                row,
                field: "ngoai_du_toan".to_string(),
                value: scope.clone(),
            });
        }
    }

    let gia_tri = number(fields, "gia_tri", row)?.ok_or_else(|| ImportError::TypeConversionError {
        row,
        field: "gia_tri".to_string(),
        message: "giá trị trống".to_string(),
    })?;

    let ngay = date(fields, "ngay", row)?;
    let ngay_bat_dau_khau_hao = date(fields, "ngay_bat_dau_khau_hao", row)?;

    Ok(BudgetLine {
        tong_id: 0,
        loai_du_lieu,
        loai_chi_phi: text(fields, "loai_chi_phi"),
        gia_tri,
        ngay,
        ngay_bat_dau_khau_hao,
        ngay_eff: ngay.or(ngay_bat_dau_khau_hao),
        lo: text(fields, "lo"),
        lo_2: text(fields, "lo_2"),
        loai_lo: text(fields, "loai_lo"),
        dien_tich_ha: number(fields, "dien_tich_ha", row)?,
        hang_muc: LINE_ITEM_COLUMNS.iter().find_map(|c| text(fields, c)),
        ngoai_du_toan,
        doi_thuc_hien: text(fields, "doi_thuc_hien"),
        hang_muc_cong_viec: text(fields, "hang_muc_cong_viec"),
        ma_cv: text(fields, "ma_cv"),
        ma_dtbd: text(fields, "ma_dtbd"),
        ten_vt_dtbd: text(fields, "ten_vt_dtbd"),
        phan_loai_dtbd: text(fields, "phan_loai_dtbd"),
        vat_tu: text(fields, "vat_tu"),
        so_luong: number(fields, "so_luong", row)?,
        loai_vat_tu: text(fields, "loai_vat_tu"),
        so_cong: number(fields, "so_cong", row)?,
        dvt: text(fields, "dvt"),
        don_gia: number(fields, "don_gia", row)?,
        vu: text(fields, "vu"),
        tien_do_vu: number(fields, "tien_do_vu", row)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::temp_warehouse;
    use std::io::Write;

    fn write_csv(dir: &tempfile::TempDir, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_import_valid_and_invalid_rows() {
        let (_tmp, db) = temp_warehouse();
        let dir = tempfile::tempdir().unwrap();
        let csv = write_csv(
            &dir,
            "du_toan.csv",
            "\u{feff}loai_du_lieu,loai_chi_phi,gia_tri,ngay,hang_muc_du_toan_cong,ngoai_du_toan\n\
             Dự toán,Công,\"5,000,000\",2025-01-01,Làm cỏ,Trong dự toán\n\
             Thực tế,Công,4200000,15/01/2025,Làm cỏ,Trong dự toán\n\
             ,,,,,\n\
             Khác,Công,1,2025-01-01,,\n\
             Thực tế,Công,abc,2025-01-01,,\n\
             Thực tế,Vật Tư,300000,2025-13-40,,Ngoài dự toán\n",
        );

        let summary = BudgetImporter::new(db.clone()).import_file(&csv).unwrap();
        assert_eq!(summary.total_rows, 5);
        assert_eq!(summary.imported, 2);
        assert_eq!(summary.skipped, 3);
        assert!(summary.errors[0].contains("行 5"));

        let lines = BudgetRepository::new(db).load_budget_lines().unwrap();
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().any(|l| l.gia_tri == 5_000_000.0 && l.kind() == Some(DataKind::Planned)));
        assert!(lines
            .iter()
            .all(|l| l.hang_muc.as_deref() == Some("Làm cỏ") && l.is_in_budget()));
    }

    #[test]
    fn test_missing_required_column() {
        let (_tmp, db) = temp_warehouse();
        let dir = tempfile::tempdir().unwrap();
        let csv = write_csv(&dir, "thieu_cot.csv", "loai_du_lieu,ngay\nThực tế,2025-01-01\n");
        let err = BudgetImporter::new(db).import_file(&csv).unwrap_err();
        assert!(matches!(err, ImportError::MissingColumn(c) if c == "gia_tri"));
    }

    #[test]
    fn test_file_errors() {
        let (_tmp, db) = temp_warehouse();
        let importer = BudgetImporter::new(db);
        let err = importer.import_file(Path::new("/khong/ton/tai.csv")).unwrap_err();
        assert!(matches!(err, ImportError::FileNotFound(_)));

        let dir = tempfile::tempdir().unwrap();
        let xlsx = write_csv(&dir, "du_toan.xlsx", "x");
        assert!(matches!(importer.import_file(&xlsx).unwrap_err(), ImportError::UnsupportedFormat(_)));
    }
}
