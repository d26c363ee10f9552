use std::sync::Arc;

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use daycare_core::backend::Table;
use daycare_core::sync::TableState;

fn parse_table(name: &str) -> ApiResult<Table> {
    name.parse::<Table>().map_err(|_| ApiError::NotFound)
}

/// Cached rows and loading flag for one table.
async fn get_table(
    Path(name): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<TableState>> {
    let table = parse_table(&name)?;
    Ok(Json(state.console.table(table)))
}

/// Forces a refetch of one table.
async fn refresh_table(
    Path(name): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<TableState>> {
    let table = parse_table(&name)?;
    Ok(Json(state.console.refresh(table).await))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/tables/{table}", get(get_table))
        .route("/tables/{table}/refresh", post(refresh_table))
}
