use std::sync::Arc;

use crate::main_lib::AppState;
use axum::{extract::State, routing::get, Json, Router};
use daycare_core::billing::Invoice;
use daycare_core::daily_reports::DailyReport;
use daycare_core::dashboard::{AdminStats, ParentOverview};
use daycare_core::gallery::GalleryItem;
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentDashboard {
    pub overview: Option<ParentOverview>,
    pub daily_reports: Vec<DailyReport>,
    pub invoices: Vec<Invoice>,
}

async fn get_gallery(State(state): State<Arc<AppState>>) -> Json<Vec<GalleryItem>> {
    Json(state.console.gallery())
}

async fn get_admin_dashboard(State(state): State<Arc<AppState>>) -> Json<AdminStats> {
    Json(state.console.admin_stats())
}

async fn get_parent_dashboard(State(state): State<Arc<AppState>>) -> Json<ParentDashboard> {
    let console = &state.console;
    Json(ParentDashboard {
        overview: console.parent_overview(),
        daily_reports: console.parent_daily_reports(),
        invoices: console.parent_invoices(),
    })
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/gallery", get(get_gallery))
        .route("/dashboard/admin", get(get_admin_dashboard))
        .route("/dashboard/parent", get(get_parent_dashboard))
}
