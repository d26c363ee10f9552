use std::sync::Arc;

use crate::{api::outcome_response, error::ApiResult, main_lib::AppState};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use daycare_core::billing::{InvoiceDetails, InvoiceInput};
use daycare_core::CommandOutcome;

async fn create_invoice(
    State(state): State<Arc<AppState>>,
    Json(input): Json<InvoiceInput>,
) -> (StatusCode, Json<CommandOutcome>) {
    outcome_response(state.console.create_invoice(input).await)
}

async fn get_invoice_details(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<InvoiceDetails>> {
    Ok(Json(state.console.invoice_details(&id).await?))
}

/// Renders the invoice and returns it as a PDF download.
async fn download_invoice_pdf(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<impl IntoResponse> {
    let (file_name, bytes) = state.console.export_invoice_pdf(&id).await?;
    tracing::info!("Exported invoice {} as {}", id, file_name);
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        bytes,
    ))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/invoices", post(create_invoice))
        .route("/invoices/{id}", get(get_invoice_details))
        .route("/invoices/{id}/pdf", get(download_invoice_pdf))
}
