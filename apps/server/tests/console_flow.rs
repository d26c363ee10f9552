use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use daycare_core::backend::{InMemoryBackend, Table};
use daycare_server::{api::app_router, build_state_with_backend, config::Config, BackendStatus};
use serde_json::{json, Value};
use tower::ServiceExt;

const PASSWORD: &str = "secret-pass";

async fn memory_router(memory: &InMemoryBackend) -> Router {
    let config = Config {
        resync_debounce: Duration::from_millis(10),
        ..Config::default()
    };
    let state = build_state_with_backend(
        &config,
        memory.backend(),
        BackendStatus::Connected {
            url: "memory://".to_string(),
        },
    )
    .await
    .unwrap();
    app_router(state, &config)
}

fn admin_account(memory: &InMemoryBackend) {
    let user_id = memory.register_user("admin@daycare.test", PASSWORD);
    memory.seed(
        Table::Staff,
        json!({"name": "Bea Park", "email": "admin@daycare.test", "role": "admin", "user_id": user_id}),
    );
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = app.clone().oneshot(request.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn sign_in_admin(app: &Router) {
    let (status, outcome) = send(
        app,
        "POST",
        "/api/v1/auth/sign-in",
        Some(json!({"email": "admin@daycare.test", "password": PASSWORD})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["outcome"], "completed");
}

/// Polls a table until `done` holds or two seconds pass.
async fn wait_for_table(app: &Router, table: &str, done: impl Fn(&Value) -> bool) -> Value {
    let uri = format!("/api/v1/tables/{}", table);
    for _ in 0..40 {
        let (_, state) = send(app, "GET", &uri, None).await;
        if done(&state) {
            return state;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("table {} never settled", table);
}

#[tokio::test]
async fn admin_signs_in_and_adds_a_room() {
    let memory = InMemoryBackend::new();
    admin_account(&memory);
    memory.seed(Table::Rooms, json!({"name": "Acorn", "capacity": 8}));
    let app = memory_router(&memory).await;

    sign_in_admin(&app).await;

    let (_, view) = send(&app, "GET", "/api/v1/view", None).await;
    assert_eq!(view["view"]["kind"], "portal");
    assert_eq!(view["view"]["role"], "admin");
    assert_eq!(view["page"], "AdminDashboard");
    assert_eq!(view["portalName"], "Admin Portal");

    let (status, outcome) = send(
        &app,
        "POST",
        "/api/v1/rooms",
        Some(json!({"name": "Sunflower", "capacity": 12})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["message"], "Room added!");
    assert_eq!(outcome["page"], "Rooms");

    let rooms = wait_for_table(&app, "rooms", |state| {
        state["rows"].as_array().is_some_and(|rows| rows.len() == 2)
    })
    .await;
    assert_eq!(rooms["rows"][0]["name"], "Acorn");
    assert_eq!(rooms["rows"][1]["name"], "Sunflower");
}

#[tokio::test]
async fn invalid_room_is_rejected_without_a_write() {
    let memory = InMemoryBackend::new();
    admin_account(&memory);
    let app = memory_router(&memory).await;
    sign_in_admin(&app).await;

    let (status, outcome) = send(&app, "POST", "/api/v1/rooms", Some(json!({"name": " "}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(outcome["outcome"], "rejected");
    assert_eq!(memory.write_calls(Table::Rooms), 0);
}

#[tokio::test]
async fn unconfirmed_delete_returns_prompt() {
    let memory = InMemoryBackend::new();
    admin_account(&memory);
    let room_id = memory.seed(Table::Rooms, json!({"name": "Acorn"}));
    let app = memory_router(&memory).await;
    sign_in_admin(&app).await;

    let uri = format!("/api/v1/rooms/{}", room_id);
    let (status, body) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "cancelled");
    assert_eq!(body["prompt"], "Are you sure you want to delete this room?");
    assert_eq!(memory.write_calls(Table::Rooms), 0);

    let (_, body) = send(&app, "DELETE", &format!("{}?confirmed=true", uri), None).await;
    assert_eq!(body["outcome"], "completed");
    assert_eq!(memory.rows(Table::Rooms).len(), 0);
}

#[tokio::test]
async fn invoice_downloads_as_pdf() {
    let memory = InMemoryBackend::new();
    admin_account(&memory);
    let parent_id = memory.seed(
        Table::Parents,
        json!({"first_name": "Ana", "last_name": "Ruiz", "email": "ana@daycare.test"}),
    );
    let child_id = memory.seed(
        Table::Children,
        json!({"name": "Zoe", "primary_parent_id": parent_id}),
    );
    let invoice_id = memory.seed(
        Table::Invoices,
        json!({
            "child_id": child_id,
            "invoice_number": "INV-007",
            "invoice_date": "2024-05-01",
            "amount_due": "500.00",
            "status": "unpaid",
            "items": [{"description": "Monthly Fee", "amount": "500.00"}]
        }),
    );
    let app = memory_router(&memory).await;
    sign_in_admin(&app).await;

    let (status, details) = send(&app, "GET", &format!("/api/v1/invoices/{}", invoice_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(details["billTo"]["name"], "Ana Ruiz");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/invoices/{}/pdf", invoice_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"invoice_INV-007.pdf\""
    );
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let pdf = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(pdf.starts_with("%PDF-1.4"));
    assert!(pdf.contains("(Total Due: $500.00) Tj"));

    let (status, missing) = send(&app, "GET", "/api/v1/invoices/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(missing["message"], "Invoice not found.");
}

#[tokio::test]
async fn sign_out_returns_to_sign_in() {
    let memory = InMemoryBackend::new();
    admin_account(&memory);
    let app = memory_router(&memory).await;
    sign_in_admin(&app).await;

    let (_, session) = send(&app, "GET", "/api/v1/auth/session", None).await;
    assert_eq!(session["signedIn"], true);
    assert_eq!(session["role"], "admin");

    let (_, outcome) = send(&app, "POST", "/api/v1/auth/sign-out", None).await;
    assert_eq!(outcome["outcome"], "completed");

    let (_, view) = send(&app, "GET", "/api/v1/view", None).await;
    assert_eq!(view["view"]["kind"], "sign_in");
    let (_, stats) = send(&app, "GET", "/api/v1/dashboard/admin", None).await;
    assert_eq!(stats["totalRooms"], 0);
}
