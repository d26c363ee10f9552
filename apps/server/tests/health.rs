use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use daycare_core::backend::DisabledBackend;
use daycare_server::{api::app_router, build_state_with_backend, config::Config, BackendStatus};
use tower::ServiceExt;

async fn disabled_router() -> axum::Router {
    let config = Config::default();
    let reason = "SUPABASE_URL is not set".to_string();
    let state = build_state_with_backend(
        &config,
        DisabledBackend::new(reason.clone()).into_backend(),
        BackendStatus::Disabled { reason },
    )
    .await
    .unwrap();
    app_router(state, &config)
}

async fn get_json(app: &axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

#[tokio::test]
async fn health_endpoints_answer_without_backend() {
    let app = disabled_router().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/healthz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let (status, json) = get_json(&app, "/api/v1/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["backend"]["status"], "disabled");
    assert_eq!(json["backend"]["reason"], "SUPABASE_URL is not set");
}

#[tokio::test]
async fn disabled_backend_keeps_sign_in_view_and_fails_closed() {
    let app = disabled_router().await;

    let (_, view) = get_json(&app, "/api/v1/view").await;
    assert_eq!(view["view"]["kind"], "sign_in");
    assert_eq!(view["portalName"], "Welcome");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/auth/sign-in")
                .header("content-type", "application/json")
                .body(Body::from(
                    r#"{"email":"admin@daycare.test","password":"secret-pass"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["outcome"], "failed");

    let (status, rooms) = get_json(&app, "/api/v1/tables/rooms").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rooms["rows"], serde_json::json!([]));
}

#[tokio::test]
async fn unknown_table_is_not_found() {
    let app = disabled_router().await;
    let (status, json) = get_json(&app, "/api/v1/tables/lunch_menu").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], 404);
}
