// ==========================================
// Trường Tồn 农场看板 - HTTP 主入口
// ==========================================
// 技术栈: axum + Rust + SQLite
// 系统定位: 只读经营分析看板
// ==========================================

use std::sync::Arc;

use anyhow::Context;
use farm_ops_dashboard::app::{build_router, AppState};
use farm_ops_dashboard::config::AppConfig;
use farm_ops_dashboard::{i18n, logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志系统
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", farm_ops_dashboard::APP_NAME);
    tracing::info!("系统版本: {}", farm_ops_dashboard::VERSION);
    tracing::info!("==================================================");

    let config = AppConfig::from_env()?;
    i18n::set_locale(&config.locale);
    tracing::info!("使用数据库: {}", config.db_path);
    tracing::info!("界面语言: {}", i18n::current_locale());

    let state = AppState::new(&config).map_err(anyhow::Error::msg)?;
    let app = build_router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("无法监听 {}", config.bind_addr))?;
    tracing::info!("看板已启动: http://{}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP 服务异常退出")?;

    tracing::info!("看板已停止");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("无法监听退出信号: {}", e);
        std::future::pending::<()>().await;
    }
}
