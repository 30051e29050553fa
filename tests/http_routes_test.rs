// ==========================================
// HTTP 路由集成测试
// ==========================================
// 使用 tower::ServiceExt::oneshot 直接驱动 Router（不监听端口）
// 只断言状态码/头/结构，不依赖界面语言
// ==========================================

#[path = "test_helpers.rs"]
mod test_helpers;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use rusqlite::{params, Connection};
use serde_json::{json, Value};
use tower::ServiceExt;

use farm_ops_dashboard::app::{build_router, SESSION_COOKIE};
use test_helpers::{create_seeded_db, create_test_db, test_state};

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

/// 取 Set-Cookie 中的 "name=value" 部分
fn session_cookie(response: &Response) -> String {
    let raw = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("set-cookie")
        .to_str()
        .unwrap();
    raw.split(';').next().unwrap().to_string()
}

#[tokio::test]
async fn test_healthz_and_home() {
    let (_tmp, db) = create_seeded_db().unwrap();
    let app = build_router(test_state(&db));

    let response = send(&app, get("/healthz")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");

    let response = send(&app, get("/")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.starts_with("<!doctype html>"));
    assert!(html.contains(r#"href="/du-toan""#));
}

#[tokio::test]
async fn test_cost_page_issues_session_cookie() {
    let (_tmp, db) = create_seeded_db().unwrap();
    let app = build_router(test_state(&db));

    let response = send(&app, get("/chi-phi")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie(&response);
    assert!(cookie.starts_with(&format!("{}=", SESSION_COOKIE)));
    let html = body_text(response).await;
    assert!(html.contains(r#"id="monthly_trend""#));

    // 已有会话不再重新发放
    let response = send(&app, get_with_cookie("/chi-phi", &cookie)).await;
    assert!(response.headers().get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn test_notice_and_error_statuses() {
    let (_tmp, db) = create_seeded_db().unwrap();
    let app = build_router(test_state(&db));

    // 清空农场: 提示页，HTTP 200，带重置链接
    let response = send(&app, get("/chi-phi?farms=")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains(r#"href="/chi-phi""#));

    // 非法日期: 400
    let response = send(&app, get("/dinh-muc?start=2025-13-01")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // 起止日期颠倒: 页面与 JSON 接口均为 400
    let response = send(&app, get("/chi-phi?start=2025-03-01&end=2025-01-01")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let response = send(&app, get("/api/chi-phi?start=2025-03-01&end=2025-01-01")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "invalid_input");

    // 未知路径: 404
    let response = send(&app, get("/khong-co")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_missing_tables_render_error_page() {
    let tmp = tempfile::NamedTempFile::new().unwrap();
    let app = build_router(test_state(tmp.path().to_str().unwrap()));

    let response = send(&app, get("/chi-phi")).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let html = body_text(response).await;
    assert!(!html.contains("no such table"));
}

#[tokio::test]
async fn test_chart_click_drill_changes_json_view() {
    let (_tmp, db) = create_seeded_db().unwrap();
    let app = build_router(test_state(&db));

    let response = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/drill/chi-phi")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"dimension":"farm","value":"Farm 126"}"#))
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie(&response);
    let selection = body_json(response).await;
    assert_eq!(selection["farm"], "Farm 126");

    let view = body_json(send(&app, get_with_cookie("/api/chi-phi", &cookie)).await).await;
    assert_eq!(view["totals"]["labor"], 800_000.0);
    assert_eq!(view["totals"]["material"], 600_000.0);
    assert_eq!(view["drill"]["farm"], "Farm 126");

    // 定额页的下钻状态独立
    let view = body_json(send(&app, get_with_cookie("/api/dinh-muc", &cookie)).await).await;
    assert!(view["drill"]["farm"].is_null());
    assert_eq!(view["kpis"]["count"], 3);
}

#[tokio::test]
async fn test_toggle_farm_and_clear_redirect_back() {
    let (_tmp, db) = create_seeded_db().unwrap();
    let app = build_router(test_state(&db));

    let response = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/drill/chi-phi/toggle-farm")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(header::REFERER, "http://127.0.0.1:8501/chi-phi?support=0")
            .body(Body::from("value=Farm+157"))
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/chi-phi?support=0");
    let cookie = session_cookie(&response);

    let view = body_json(send(&app, get_with_cookie("/api/chi-phi", &cookie)).await).await;
    assert_eq!(view["drill"]["farm"], "Farm 157");

    let response = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/drill/chi-phi/clear")
            .header(header::COOKIE, &cookie)
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/chi-phi");

    let view = body_json(send(&app, get_with_cookie("/api/chi-phi", &cookie)).await).await;
    assert!(view["drill"]["farm"].is_null());

    // 未知页面
    let response = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/drill/du-toan/clear")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_empty_quota_drill_offers_clear_button() {
    let (_tmp, db) = create_seeded_db().unwrap();
    let app = build_router(test_state(&db));

    let response = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/drill/dinh-muc")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"dimension":"lot","value":"ZZ"}"#))
            .unwrap(),
    )
    .await;
    let cookie = session_cookie(&response);

    let response = send(&app, get_with_cookie("/dinh-muc", &cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains(r#"action="/drill/dinh-muc/clear""#));
}

#[tokio::test]
async fn test_budget_export_and_json() {
    let (_tmp, db) = create_seeded_db().unwrap();
    let app = build_router(test_state(&db));

    let response = send(&app, get("/du-toan/export.csv?scopes=Trong%20d%E1%BB%B1%20to%C3%A1n")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/csv; charset=utf-8");
    let disposition = response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().to_string();
    assert!(disposition.contains(".csv"));
    let csv = body_text(response).await;
    assert!(csv.starts_with('\u{feff}'));
    assert!(!csv.contains("Ngoài dự toán"));

    let response = send(&app, get("/api/du-toan")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let view = body_json(response).await;
    assert_eq!(view["kpis"]["actual_in"], 3_400_000.0);

    // 清空类别: JSON 接口返回 422
    let response = send(&app, get("/api/du-toan?cats=")).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(response).await["code"], "notice");

    // 非法范围值: 400
    let response = send(&app, get("/api/du-toan?scopes=abc")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_budget_line_item_with_comma_is_one_selection() {
    let (_tmp, db) = create_seeded_db().unwrap();
    let conn = Connection::open(&db).unwrap();
    for (kind, ngay, amount) in [("Dự toán", "2025-02-01", 400_000.0), ("Thực tế", "2025-02-05", 500_000.0)] {
        conn.execute(
            "INSERT INTO fact_195_tong
             (loai_du_lieu, loai_chi_phi, hang_muc_du_toan_vat_tu, ngoai_du_toan, ngay, gia_tri)
             VALUES (?1, 'Vật Tư', 'Phân bón, vôi', 'Trong dự toán', ?2, ?3)",
            params![kind, ngay, amount],
        )
        .unwrap();
    }
    let app = build_router(test_state(&db));

    let response = send(&app, get("/api/du-toan?items=Ph%C3%A2n%20b%C3%B3n%2C%20v%C3%B4i")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let view = body_json(response).await;
    assert_eq!(view["filter"]["line_items"], json!(["Phân bón, vôi"]));
    assert_eq!(view["kpis"]["actual_in"], 500_000.0);
    assert_eq!(view["kpis"]["planned_in"], 400_000.0);

    // 重复键: 两个科目同时选中
    let response = send(
        &app,
        get("/api/du-toan?items=Ph%C3%A2n%20b%C3%B3n%2C%20v%C3%B4i&items=Ph%C3%A2n%20b%C3%B3n"),
    )
    .await;
    let view = body_json(response).await;
    assert_eq!(view["filter"]["line_items"], json!(["Phân bón, vôi", "Phân bón"]));
    assert_eq!(view["kpis"]["actual_in"], 3_000_000.0);

    // 导出链接按重复键编码
    let html = body_text(send(&app, get("/du-toan?items=Ph%C3%A2n%20b%C3%B3n%2C%20v%C3%B4i")).await).await;
    assert!(html.contains("items=Ph%C3%A2n%20b%C3%B3n%2C%20v%C3%B4i"));
}

#[tokio::test]
async fn test_budget_page_without_data_is_notice() {
    let (_tmp, db) = create_test_db().unwrap();
    let app = build_router(test_state(&db));

    let response = send(&app, get("/du-toan")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains(r#"href="/du-toan""#));
}

#[tokio::test]
async fn test_cache_refresh_redirects() {
    let (_tmp, db) = create_seeded_db().unwrap();
    let app = build_router(test_state(&db));

    let response = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/cache/refresh")
            .header(header::REFERER, "http://localhost/dinh-muc?gran=W")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/dinh-muc?gran=W");
}
