// ==========================================
// Trường Tồn 农场看板 - SQL 性能统计
// ==========================================
// rusqlite trace/profile 回调 + 页面级 PerfGuard
// 输出 target: perf / slow_sql
// ==========================================

use rusqlite::Connection;
use std::cell::Cell;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

static PERF_SQL_ENABLED: AtomicBool = AtomicBool::new(false);
static SLOW_SQL_THRESHOLD_MS: AtomicU64 = AtomicU64::new(0);

thread_local! {
    static PERF_DEPTH: Cell<u32> = Cell::new(0);
    static SQL_COUNT: Cell<u64> = Cell::new(0);
    static SLOW_SQL_COUNT: Cell<u64> = Cell::new(0);
}

fn is_true(v: &str) -> bool {
    matches!(
        v.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "on"
    )
}

fn truncate_sql(sql: &str, max_len: usize) -> String {
    let s = sql.trim().replace('\n', " ");
    if s.chars().count() <= max_len {
        return s;
    }
    // 数仓 SQL 含越南语字面量（'Không ghi' 等），按字符截断
    let head: String = s.chars().take(max_len).collect();
    format!("{}…", head)
}

/// SQL 统计开关环境变量
pub const PERF_SQL_ENV: &str = "FARM_DASH_PERF_SQL";

/// 慢 SQL 阈值环境变量（毫秒）
pub const SLOW_SQL_MS_ENV: &str = "FARM_DASH_SLOW_SQL_MS";

/// 安装 SQLite 语句 trace/profile（用于 SQL 计数 + 慢查询日志）
///
/// 看板每次查询都打开短连接，所以由 `db::open_sqlite_connection` 统一调用。
///
/// 开关：
/// - Debug 默认开启；Release 默认关闭（可通过环境变量开启）
/// - `FARM_DASH_PERF_SQL=1` 强制开启
/// - `FARM_DASH_SLOW_SQL_MS=50` 配置慢 SQL 阈值（毫秒）
pub fn install_sqlite_tracing(conn: &mut Connection) {
    let enabled = match std::env::var(PERF_SQL_ENV) {
        Ok(v) => is_true(&v),
        Err(_) => cfg!(debug_assertions),
    };

    PERF_SQL_ENABLED.store(enabled, Ordering::Relaxed);

    if !enabled {
        // 显式清理，避免复用连接导致残留 callback
        conn.trace(None);
        conn.profile(None);
        return;
    }

    let slow_ms = std::env::var(SLOW_SQL_MS_ENV)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(if cfg!(debug_assertions) { 50 } else { 200 });
    SLOW_SQL_THRESHOLD_MS.store(slow_ms, Ordering::Relaxed);

    conn.trace(Some(sql_trace_callback));
    conn.profile(Some(sql_profile_callback));
}

fn sql_trace_callback(_sql: &str) {
    if !PERF_SQL_ENABLED.load(Ordering::Relaxed) {
        return;
    }
    let active = PERF_DEPTH.with(|d| d.get() > 0);
    if !active {
        return;
    }
    SQL_COUNT.with(|c| c.set(c.get().saturating_add(1)));
}

fn sql_profile_callback(sql: &str, duration: Duration) {
    if !PERF_SQL_ENABLED.load(Ordering::Relaxed) {
        return;
    }

    let ms = duration.as_millis() as u64;
    let threshold = SLOW_SQL_THRESHOLD_MS.load(Ordering::Relaxed);
    if threshold > 0 && ms >= threshold {
        let sql_short = truncate_sql(sql, 420);
        tracing::warn!(
            target: "slow_sql",
            duration_ms = ms,
            sql = %sql_short,
            "slow sql"
        );
        let active = PERF_DEPTH.with(|d| d.get() > 0);
        if active {
            SLOW_SQL_COUNT.with(|c| c.set(c.get().saturating_add(1)));
        }
    }
}

/// 性能统计 Guard：记录页面组装耗时 + SQL 语句数 + 慢 SQL 数
///
/// 计数器为线程局部变量，Guard 必须与查询在同一线程（spawn_blocking 内）创建。
///
/// 使用方式：
/// ```ignore
/// let _perf = farm_ops_dashboard::perf::PerfGuard::new("cost_dashboard");
/// // 查询 + 聚合...
/// ```
pub struct PerfGuard {
    op: &'static str,
    start: Instant,
    sql_start: u64,
    slow_sql_start: u64,
}

impl PerfGuard {
    pub fn new(op: &'static str) -> Self {
        PERF_DEPTH.with(|d| d.set(d.get().saturating_add(1)));
        let sql_start = SQL_COUNT.with(|c| c.get());
        let slow_sql_start = SLOW_SQL_COUNT.with(|c| c.get());
        Self {
            op,
            start: Instant::now(),
            sql_start,
            slow_sql_start,
        }
    }
}

impl Drop for PerfGuard {
    fn drop(&mut self) {
        let elapsed_ms = self.start.elapsed().as_millis() as u64;
        let sql_end = SQL_COUNT.with(|c| c.get());
        let slow_sql_end = SLOW_SQL_COUNT.with(|c| c.get());
        let sql_count = sql_end.saturating_sub(self.sql_start);
        let slow_sql_count = slow_sql_end.saturating_sub(self.slow_sql_start);

        tracing::info!(
            target: "perf",
            op = self.op,
            elapsed_ms,
            sql_count,
            slow_sql_count,
            "done"
        );

        PERF_DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_true_variants() {
        for v in ["1", "true", "YES", " on ", "y"] {
            assert!(is_true(v), "{} 应视为开启", v);
        }
        for v in ["0", "false", "off", ""] {
            assert!(!is_true(v), "{} 应视为关闭", v);
        }
    }

    #[test]
    fn test_truncate_sql_multibyte() {
        let sql = "SELECT COALESCE(NULLIF(TRIM(cong_doan),''),'Không ghi')\nFROM fact_nhat_ky_san_xuat";
        let short = truncate_sql(sql, 50);
        assert!(short.ends_with('…'));
        assert!(!short.contains('\n'));
        assert_eq!(short.chars().count(), 51);
    }

    #[test]
    fn test_perf_guard_nesting_restores_depth() {
        {
            let _outer = PerfGuard::new("outer");
            let _inner = PerfGuard::new("inner");
            assert_eq!(PERF_DEPTH.with(|d| d.get()), 2);
        }
        assert_eq!(PERF_DEPTH.with(|d| d.get()), 0);
    }
}
