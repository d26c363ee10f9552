use std::sync::Arc;

use crate::{api::outcome_response, main_lib::AppState};
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use daycare_core::session::SessionSnapshot;
use daycare_core::CommandOutcome;
use serde::Deserialize;

#[derive(Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

async fn sign_up(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Credentials>,
) -> (StatusCode, Json<CommandOutcome>) {
    outcome_response(state.console.sign_up(&body.email, &body.password).await)
}

async fn sign_in(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Credentials>,
) -> (StatusCode, Json<CommandOutcome>) {
    outcome_response(state.console.sign_in(&body.email, &body.password).await)
}

async fn sign_out(State(state): State<Arc<AppState>>) -> (StatusCode, Json<CommandOutcome>) {
    outcome_response(state.console.sign_out().await)
}

async fn get_session(State(state): State<Arc<AppState>>) -> Json<SessionSnapshot> {
    Json(state.console.snapshot())
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/sign-up", post(sign_up))
        .route("/auth/sign-in", post(sign_in))
        .route("/auth/sign-out", post(sign_out))
        .route("/auth/session", get(get_session))
}
