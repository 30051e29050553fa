// ==========================================
// Trường Tồn 农场看板 - HTTP 路由
// ==========================================
// 页面:   GET /  /chi-phi  /dinh-muc  /du-toan
// 下钻:   POST /drill/{page}            (图表点击, JSON)
//         POST /drill/{page}/toggle-farm (农场卡片按钮, 表单)
//         POST /drill/{page}/clear
// 导出:   GET /du-toan/export.csv
// JSON:   GET /api/chi-phi  /api/dinh-muc  /api/du-toan
// 运维:   POST /cache/refresh, GET /healthz
// ==========================================
// 数据库访问全部放到 spawn_blocking 中执行
// 下钻状态按 cookie 中的会话 ID 存在 SessionStore
// ==========================================

use std::str::FromStr;
use std::sync::Arc;

use axum::extract::{Form, Path, Query, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

use super::state::AppState;
use crate::api::{ApiError, ApiResult, BudgetRequest, CostRequest, QueryParams, QuotaRequest};
use crate::domain::{DrillDimension, PageKey};
use crate::engine::budget::EXPORT_FILE_NAME;
use crate::perf::PerfGuard;
use crate::render::html::NavItem;
use crate::render::pages;
use crate::session::{DrillSelection, SessionId};

/// 会话 cookie 名
pub const SESSION_COOKIE: &str = "farm_dash_sid";

type SharedState = Arc<AppState>;

/// 构建路由
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(home_page))
        .route("/chi-phi", get(cost_page))
        .route("/dinh-muc", get(quota_page))
        .route("/du-toan", get(budget_page))
        .route("/du-toan/export.csv", get(budget_export))
        .route("/drill/:page", post(drill_select))
        .route("/drill/:page/toggle-farm", post(drill_toggle_farm))
        .route("/drill/:page/clear", post(drill_clear))
        .route("/api/chi-phi", get(cost_json))
        .route("/api/dinh-muc", get(quota_json))
        .route("/api/du-toan", get(budget_json))
        .route("/cache/refresh", post(refresh_cache))
        .route("/healthz", get(healthz))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ==========================================
// 会话 cookie
// ==========================================

/// 从 Cookie 头读取会话 ID
///
/// # 返回
/// - (会话 ID, 是否新发放)
fn session_from(headers: &HeaderMap) -> (SessionId, bool) {
    let existing = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| SessionId::parse(value));

    match existing {
        Some(sid) => (sid, false),
        None => (SessionId::new(), true),
    }
}

fn with_session_cookie(mut response: Response, sid: SessionId, fresh: bool) -> Response {
    if fresh {
        let cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, sid);
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }
    response
}

// ==========================================
// 公共: 阻塞执行 / 错误映射
// ==========================================

async fn run_blocking<T, F>(label: &'static str, f: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> ApiResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let _perf = PerfGuard::new(label);
        f()
    })
    .await
    .map_err(|e| ApiError::InternalError(format!("任务执行失败: {}", e)))?
}

fn error_status(err: &ApiError) -> StatusCode {
    match err {
        e if e.is_notice() => StatusCode::OK,
        e if e.is_bad_request() => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// 页面错误 → HTML
///
/// 提示类渲染为 200 提示页，其余记录日志后渲染错误页
fn page_error(nav: NavItem, err: &ApiError, drill_page: Option<PageKey>) -> Response {
    let status = error_status(err);
    if err.is_notice() {
        tracing::info!(error = %err, "页面停止渲染");
        return (status, Html(pages::notice_page(nav, err, drill_page))).into_response();
    }
    if err.is_bad_request() {
        tracing::warn!(error = %err, "请求参数错误");
    } else {
        tracing::error!(error = ?err, "页面组装失败");
    }
    (status, Html(pages::error_page(nav, err))).into_response()
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

/// JSON 接口错误；提示类返回 422
fn json_error(err: &ApiError) -> Response {
    let (status, code) = if err.is_notice() {
        (StatusCode::UNPROCESSABLE_ENTITY, "notice")
    } else if err.is_bad_request() {
        (StatusCode::BAD_REQUEST, "invalid_input")
    } else {
        tracing::error!(error = ?err, "JSON 接口失败");
        (StatusCode::INTERNAL_SERVER_ERROR, "error")
    };
    let body = ErrorBody {
        code,
        message: err.user_message(),
    };
    (status, Json(body)).into_response()
}

/// 下钻后页面为空时提示页附带清除按钮
fn drill_page_of(page: PageKey, drill: &DrillSelection) -> Option<PageKey> {
    (!drill.is_empty()).then_some(page)
}

// ==========================================
// 页面
// ==========================================

async fn home_page() -> Html<String> {
    Html(pages::home::render())
}

async fn cost_page(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(raw): Query<Vec<(String, String)>>,
) -> Response {
    let (sid, fresh) = session_from(&headers);
    let drill = state.sessions.get(sid, PageKey::Cost);
    let api = state.cost_api.clone();
    let params = QueryParams::from(raw);
    let selection = drill.clone();

    let result = run_blocking("http.cost_page", move || {
        let request = CostRequest::from_query(&params)?;
        api.dashboard(&request, &selection)
    })
    .await;

    let response = match result {
        Ok(view) => Html(pages::cost::render(&view)).into_response(),
        Err(e) => page_error(NavItem::Cost, &e, drill_page_of(PageKey::Cost, &drill)),
    };
    with_session_cookie(response, sid, fresh)
}

async fn quota_page(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(raw): Query<Vec<(String, String)>>,
) -> Response {
    let (sid, fresh) = session_from(&headers);
    let drill = state.sessions.get(sid, PageKey::Quota);
    let api = state.quota_api.clone();
    let params = QueryParams::from(raw);
    let selection = drill.clone();

    let result = run_blocking("http.quota_page", move || {
        let request = QuotaRequest::from_query(&params)?;
        api.dashboard(&request, &selection)
    })
    .await;

    let response = match result {
        Ok(view) => Html(pages::quota::render(&view)).into_response(),
        Err(e) => page_error(NavItem::Quota, &e, drill_page_of(PageKey::Quota, &drill)),
    };
    with_session_cookie(response, sid, fresh)
}

async fn budget_page(State(state): State<SharedState>, Query(raw): Query<Vec<(String, String)>>) -> Response {
    let api = state.budget_api.clone();
    let params = QueryParams::from(raw);

    let result = run_blocking("http.budget_page", move || {
        let request = BudgetRequest::from_query(&params)?;
        let filter = request.resolve(&api.options()?);
        api.dashboard(&filter)
    })
    .await;

    match result {
        Ok(view) => Html(pages::budget::render(&view)).into_response(),
        Err(e) => page_error(NavItem::Budget, &e, None),
    }
}

async fn budget_export(State(state): State<SharedState>, Query(raw): Query<Vec<(String, String)>>) -> Response {
    let api = state.budget_api.clone();
    let params = QueryParams::from(raw);

    let result = run_blocking("http.budget_export", move || {
        let request = BudgetRequest::from_query(&params)?;
        let filter = request.resolve(&api.options()?);
        api.export_csv(&filter)
    })
    .await;

    match result {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", EXPORT_FILE_NAME),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(e) => page_error(NavItem::Budget, &e, None),
    }
}

// ==========================================
// JSON 接口（同一视图模型）
// ==========================================

async fn cost_json(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(raw): Query<Vec<(String, String)>>,
) -> Response {
    let (sid, _) = session_from(&headers);
    let drill = state.sessions.get(sid, PageKey::Cost);
    let api = state.cost_api.clone();
    let params = QueryParams::from(raw);

    match run_blocking("http.cost_json", move || {
        let request = CostRequest::from_query(&params)?;
        api.dashboard(&request, &drill)
    })
    .await
    {
        Ok(view) => Json(view).into_response(),
        Err(e) => json_error(&e),
    }
}

async fn quota_json(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(raw): Query<Vec<(String, String)>>,
) -> Response {
    let (sid, _) = session_from(&headers);
    let drill = state.sessions.get(sid, PageKey::Quota);
    let api = state.quota_api.clone();
    let params = QueryParams::from(raw);

    match run_blocking("http.quota_json", move || {
        let request = QuotaRequest::from_query(&params)?;
        api.dashboard(&request, &drill)
    })
    .await
    {
        Ok(view) => Json(view).into_response(),
        Err(e) => json_error(&e),
    }
}

async fn budget_json(State(state): State<SharedState>, Query(raw): Query<Vec<(String, String)>>) -> Response {
    let api = state.budget_api.clone();
    let params = QueryParams::from(raw);

    match run_blocking("http.budget_json", move || {
        let request = BudgetRequest::from_query(&params)?;
        let filter = request.resolve(&api.options()?);
        api.dashboard(&filter)
    })
    .await
    {
        Ok(view) => Json(view).into_response(),
        Err(e) => json_error(&e),
    }
}

// ==========================================
// 下钻
// ==========================================

/// 图表点击请求体
#[derive(Debug, Deserialize)]
pub struct DrillRequest {
    pub dimension: DrillDimension,
    pub value: String,
}

/// 切换农场表单
#[derive(Debug, Deserialize)]
pub struct ToggleFarmForm {
    #[serde(default)]
    pub value: String,
}

fn parse_page(raw: &str) -> Option<PageKey> {
    PageKey::from_str(raw).ok()
}

/// 303 跳回来源页
///
/// 只接受同页路径的 Referer（取路径与查询串），否则回到页面首屏
fn back_to(headers: &HeaderMap, fallback: &str) -> Redirect {
    let target = headers
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
        .and_then(referer_path)
        .filter(|path| path == fallback || path.starts_with(&format!("{}?", fallback)));
    Redirect::to(target.as_deref().unwrap_or(fallback))
}

/// "http://host:port/chi-phi?x=1" → "/chi-phi?x=1"
fn referer_path(referer: &str) -> Option<String> {
    let rest = referer.split_once("://").map_or(referer, |(_, rest)| rest);
    let start = if referer.starts_with('/') { 0 } else { rest.find('/')? };
    let path = &rest[start..];
    let path = path.split('#').next().unwrap_or(path);
    Some(path.to_string())
}

async fn drill_select(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(page): Path<String>,
    Json(body): Json<DrillRequest>,
) -> Response {
    let Some(page) = parse_page(&page) else {
        return not_found().await.into_response();
    };
    let (sid, fresh) = session_from(&headers);
    let selection = state.sessions.update(sid, page, |s| {
        s.select(body.dimension, body.value.trim());
    });
    with_session_cookie(Json(selection).into_response(), sid, fresh)
}

async fn drill_toggle_farm(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(page): Path<String>,
    Form(form): Form<ToggleFarmForm>,
) -> Response {
    let Some(page) = parse_page(&page) else {
        return not_found().await.into_response();
    };
    let (sid, fresh) = session_from(&headers);
    state.sessions.update(sid, page, |s| s.toggle_farm(form.value.trim()));
    let fallback = format!("/{}", page.slug());
    with_session_cookie(back_to(&headers, &fallback).into_response(), sid, fresh)
}

async fn drill_clear(State(state): State<SharedState>, headers: HeaderMap, Path(page): Path<String>) -> Response {
    let Some(page) = parse_page(&page) else {
        return not_found().await.into_response();
    };
    let (sid, fresh) = session_from(&headers);
    state.sessions.clear(sid, page);
    tracing::debug!(session = %sid, page = page.slug(), "下钻已清除");
    let fallback = format!("/{}", page.slug());
    with_session_cookie(back_to(&headers, &fallback).into_response(), sid, fresh)
}

// ==========================================
// 运维
// ==========================================

/// 清空查询缓存并跳回来源页
async fn refresh_cache(State(state): State<SharedState>, headers: HeaderMap) -> Redirect {
    state.cache.invalidate_all();
    tracing::info!("查询缓存已清空");
    let target = headers
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
        .and_then(referer_path)
        .filter(|path| path.starts_with('/') && !path.starts_with("//"));
    Redirect::to(target.as_deref().unwrap_or("/"))
}

async fn healthz() -> &'static str {
    "ok"
}

async fn not_found() -> (StatusCode, Html<String>) {
    (StatusCode::NOT_FOUND, Html(pages::not_found_page()))
}
