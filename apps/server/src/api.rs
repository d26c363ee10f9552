mod auth;
mod billing;
mod dashboards;
mod navigation;
mod records;
mod tables;

use std::{any::Any, convert::Infallible, sync::Arc, time::Duration};

use crate::{config::Config, main_lib::AppState};
use axum::{
    body::Body,
    extract::State,
    http::{header, Response, StatusCode},
    response::sse::{Event as SseEvent, KeepAlive, Sse},
    routing::get,
    Json, Router,
};
use daycare_core::CommandOutcome;
use futures_core::stream::Stream;
use serde_json::json;
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any as AnyOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

pub async fn healthz() -> &'static str {
    "ok"
}

pub async fn readyz() -> &'static str {
    "ok"
}

async fn backend_status(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({ "backend": state.backend_status }))
}

/// Status code for a command outcome. Rejections are the caller's fault,
/// failures the backend's.
pub(crate) fn outcome_status(outcome: &CommandOutcome) -> StatusCode {
    match outcome {
        CommandOutcome::Completed { .. } | CommandOutcome::Cancelled => StatusCode::OK,
        CommandOutcome::Rejected { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        CommandOutcome::Failed { .. } => StatusCode::BAD_GATEWAY,
    }
}

pub(crate) fn outcome_response(outcome: CommandOutcome) -> (StatusCode, Json<CommandOutcome>) {
    (outcome_status(&outcome), Json(outcome))
}

async fn stream_events(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    let receiver = BroadcastStream::new(state.event_bus.subscribe());
    let stream = tokio_stream::StreamExt::filter_map(receiver, |event| match event {
        Ok(evt) => {
            let sse_event = SseEvent::default().event(evt.name);
            let sse_event = if let Some(payload) = evt.payload {
                match sse_event.json_data(payload) {
                    Ok(ev) => ev,
                    Err(err) => {
                        tracing::error!(
                            "Failed to serialize SSE payload for {}: {}",
                            evt.name,
                            err
                        );
                        return None;
                    }
                }
            } else {
                sse_event.data("null")
            };
            Some(Ok(sse_event))
        }
        Err(BroadcastStreamRecvError::Lagged(_)) => None,
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Turns a panicking handler into a JSON diagnostic instead of a dropped
/// connection.
fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response<Body> {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic".to_string()
    };
    tracing::error!("Request handler panicked: {}", detail);

    let body = json!({
        "code": 500,
        "message": "Something went wrong.",
        "detail": detail,
    });
    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap_or_else(|_| Response::new(Body::from("Something went wrong.")))
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.cors_allow.iter().any(|o| o == "*") {
        return CorsLayer::new().allow_origin(AnyOrigin);
    }
    let origins = config
        .cors_allow
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(origin) => Some(origin),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", o);
                None
            }
        })
        .collect::<Vec<_>>();
    CorsLayer::new().allow_origin(origins)
}

pub fn app_router(state: Arc<AppState>, config: &Config) -> Router {
    let api = Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/status", get(backend_status))
        .route("/events/stream", get(stream_events))
        .merge(auth::router())
        .merge(navigation::router())
        .merge(tables::router())
        .merge(records::router())
        .merge(billing::router())
        .merge(dashboards::router());

    Router::new()
        .nest("/api/v1", api)
        .with_state(state)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors_layer(config))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(TraceLayer::new_for_http())
}
