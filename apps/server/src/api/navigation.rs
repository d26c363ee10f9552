use std::sync::Arc;

use crate::main_lib::AppState;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use daycare_core::navigation::{NavItem, Page, View};
use daycare_core::Console;
use serde::{Deserialize, Serialize};

/// Everything the shell needs to render the current view.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewResponse {
    pub view: View,
    pub page: Option<Page>,
    pub portal_name: &'static str,
    pub nav_items: &'static [NavItem],
}

impl ViewResponse {
    fn of(console: &Console, view: View) -> Self {
        Self {
            view,
            page: console.page(),
            portal_name: console.portal_name(),
            nav_items: console.nav_items(),
        }
    }
}

#[derive(Deserialize)]
pub struct NavigateRequest {
    pub page: Page,
}

async fn get_view(State(state): State<Arc<AppState>>) -> Json<ViewResponse> {
    let view = state.console.view();
    Json(ViewResponse::of(&state.console, view))
}

async fn navigate(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NavigateRequest>,
) -> Json<ViewResponse> {
    let view = state.console.navigate(body.page);
    Json(ViewResponse::of(&state.console, view))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/view", get(get_view))
        .route("/navigate", post(navigate))
}
