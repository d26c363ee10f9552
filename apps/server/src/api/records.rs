//! Entity commands: one route per console command.
//!
//! Every handler answers with the command outcome. Deletes need
//! `?confirmed=true`; without it nothing is sent and the confirmation
//! prompt comes back with a `cancelled` outcome.

use std::sync::Arc;

use crate::{
    api::{outcome_response, outcome_status},
    error::{ApiError, ApiResult},
    main_lib::AppState,
};
use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    routing::{post, put},
    Json, Router,
};
use daycare_core::announcements::AnnouncementInput;
use daycare_core::backend::FileUpload;
use daycare_core::children::ChildInput;
use daycare_core::daily_reports::DailyReportInput;
use daycare_core::incidents::IncidentInput;
use daycare_core::medications::{MedicationInput, MedicationLogInput};
use daycare_core::parents::ParentInput;
use daycare_core::rooms::RoomInput;
use daycare_core::staff::StaffInput;
use daycare_core::waitlist::WaitlistInput;
use daycare_core::{CommandOutcome, Confirmation, DeleteTarget};
use serde::{Deserialize, Serialize};

type OutcomeResponse = (StatusCode, Json<CommandOutcome>);

#[derive(Deserialize, Default)]
pub struct DeleteParams {
    #[serde(default)]
    pub confirmed: bool,
}

#[derive(Serialize)]
pub struct DeleteResponse {
    #[serde(flatten)]
    pub outcome: CommandOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<&'static str>,
}

fn delete_response(
    target: DeleteTarget,
    outcome: CommandOutcome,
) -> (StatusCode, Json<DeleteResponse>) {
    let prompt = matches!(outcome, CommandOutcome::Cancelled).then(|| target.prompt());
    (
        outcome_status(&outcome),
        Json(DeleteResponse { outcome, prompt }),
    )
}

// Children

async fn create_child(
    State(state): State<Arc<AppState>>,
    Json(input): Json<ChildInput>,
) -> OutcomeResponse {
    outcome_response(state.console.create_child(input).await)
}

async fn update_child(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(input): Json<ChildInput>,
) -> OutcomeResponse {
    outcome_response(state.console.update_child(&id, input).await)
}

async fn delete_child(
    Path(id): Path<String>,
    Query(params): Query<DeleteParams>,
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<DeleteResponse>) {
    let outcome = state
        .console
        .delete_child(&id, Confirmation::from(params.confirmed))
        .await;
    delete_response(DeleteTarget::Child, outcome)
}

async fn toggle_check_in(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> OutcomeResponse {
    outcome_response(state.console.toggle_check_in(&id).await)
}

// Staff

async fn create_staff(
    State(state): State<Arc<AppState>>,
    Json(input): Json<StaffInput>,
) -> OutcomeResponse {
    outcome_response(state.console.create_staff(input).await)
}

async fn update_staff(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(input): Json<StaffInput>,
) -> OutcomeResponse {
    outcome_response(state.console.update_staff(&id, input).await)
}

async fn delete_staff(
    Path(id): Path<String>,
    Query(params): Query<DeleteParams>,
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<DeleteResponse>) {
    let outcome = state
        .console
        .delete_staff(&id, Confirmation::from(params.confirmed))
        .await;
    delete_response(DeleteTarget::Staff, outcome)
}

// Rooms

async fn create_room(
    State(state): State<Arc<AppState>>,
    Json(input): Json<RoomInput>,
) -> OutcomeResponse {
    outcome_response(state.console.create_room(input).await)
}

async fn update_room(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(input): Json<RoomInput>,
) -> OutcomeResponse {
    outcome_response(state.console.update_room(&id, input).await)
}

async fn delete_room(
    Path(id): Path<String>,
    Query(params): Query<DeleteParams>,
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<DeleteResponse>) {
    let outcome = state
        .console
        .delete_room(&id, Confirmation::from(params.confirmed))
        .await;
    delete_response(DeleteTarget::Room, outcome)
}

// Parents

async fn create_parent(
    State(state): State<Arc<AppState>>,
    Json(input): Json<ParentInput>,
) -> OutcomeResponse {
    outcome_response(state.console.create_parent(input).await)
}

async fn update_parent(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(input): Json<ParentInput>,
) -> OutcomeResponse {
    outcome_response(state.console.update_parent(&id, input).await)
}

async fn delete_parent(
    Path(id): Path<String>,
    Query(params): Query<DeleteParams>,
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<DeleteResponse>) {
    let outcome = state
        .console
        .delete_parent(&id, Confirmation::from(params.confirmed))
        .await;
    delete_response(DeleteTarget::Parent, outcome)
}

// Daily reports

/// Multipart form: a `report` field holding the JSON payload and up to two
/// `photo` file fields. Empty file fields are skipped.
async fn create_daily_report(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> ApiResult<OutcomeResponse> {
    let mut report: Option<DailyReportInput> = None;
    let mut photos = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("report") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.to_string()))?;
                let input = serde_json::from_str(&text)
                    .map_err(|e| ApiError::BadRequest(format!("Invalid report: {}", e)))?;
                report = Some(input);
            }
            Some("photo") => {
                let file_name = field.file_name().unwrap_or("photo").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.to_string()))?;
                if bytes.is_empty() {
                    continue;
                }
                let mut upload = FileUpload::new(file_name, bytes.to_vec());
                if let Some(content_type) = content_type {
                    upload = upload.with_content_type(content_type);
                }
                photos.push(upload);
            }
            _ => {}
        }
    }

    let report = report.ok_or_else(|| ApiError::BadRequest("Missing report field".to_string()))?;
    Ok(outcome_response(
        state.console.create_daily_report(report, photos).await,
    ))
}

// Incidents

async fn log_incident(
    State(state): State<Arc<AppState>>,
    Json(input): Json<IncidentInput>,
) -> OutcomeResponse {
    outcome_response(state.console.log_incident(input).await)
}

// Medications

async fn create_medication(
    State(state): State<Arc<AppState>>,
    Json(input): Json<MedicationInput>,
) -> OutcomeResponse {
    outcome_response(state.console.create_medication(input).await)
}

async fn update_medication(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(input): Json<MedicationInput>,
) -> OutcomeResponse {
    outcome_response(state.console.update_medication(&id, input).await)
}

async fn delete_medication(
    Path(id): Path<String>,
    Query(params): Query<DeleteParams>,
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<DeleteResponse>) {
    let outcome = state
        .console
        .delete_medication(&id, Confirmation::from(params.confirmed))
        .await;
    delete_response(DeleteTarget::Medication, outcome)
}

async fn log_medication(
    State(state): State<Arc<AppState>>,
    Json(input): Json<MedicationLogInput>,
) -> OutcomeResponse {
    outcome_response(state.console.log_medication(input).await)
}

// Announcements

async fn create_announcement(
    State(state): State<Arc<AppState>>,
    Json(input): Json<AnnouncementInput>,
) -> OutcomeResponse {
    outcome_response(state.console.create_announcement(input).await)
}

async fn update_announcement(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(input): Json<AnnouncementInput>,
) -> OutcomeResponse {
    outcome_response(state.console.update_announcement(&id, input).await)
}

async fn delete_announcement(
    Path(id): Path<String>,
    Query(params): Query<DeleteParams>,
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<DeleteResponse>) {
    let outcome = state
        .console
        .delete_announcement(&id, Confirmation::from(params.confirmed))
        .await;
    delete_response(DeleteTarget::Announcement, outcome)
}

// Waitlist

async fn add_waitlist_entry(
    State(state): State<Arc<AppState>>,
    Json(mut input): Json<WaitlistInput>,
) -> OutcomeResponse {
    input.id = None;
    outcome_response(state.console.save_waitlist_entry(input).await)
}

async fn update_waitlist_entry(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(mut input): Json<WaitlistInput>,
) -> OutcomeResponse {
    input.id = Some(id);
    outcome_response(state.console.save_waitlist_entry(input).await)
}

async fn delete_waitlist_entry(
    Path(id): Path<String>,
    Query(params): Query<DeleteParams>,
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<DeleteResponse>) {
    let outcome = state
        .console
        .delete_waitlist_entry(&id, Confirmation::from(params.confirmed))
        .await;
    delete_response(DeleteTarget::WaitlistEntry, outcome)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/children", post(create_child))
        .route("/children/{id}", put(update_child).delete(delete_child))
        .route("/children/{id}/check-in", post(toggle_check_in))
        .route("/staff", post(create_staff))
        .route("/staff/{id}", put(update_staff).delete(delete_staff))
        .route("/rooms", post(create_room))
        .route("/rooms/{id}", put(update_room).delete(delete_room))
        .route("/parents", post(create_parent))
        .route("/parents/{id}", put(update_parent).delete(delete_parent))
        .route("/daily-reports", post(create_daily_report))
        .route("/incidents", post(log_incident))
        .route("/medications", post(create_medication))
        .route(
            "/medications/{id}",
            put(update_medication).delete(delete_medication),
        )
        .route("/medication-logs", post(log_medication))
        .route("/announcements", post(create_announcement))
        .route(
            "/announcements/{id}",
            put(update_announcement).delete(delete_announcement),
        )
        .route("/waitlist", post(add_waitlist_entry))
        .route(
            "/waitlist/{id}",
            put(update_waitlist_entry).delete(delete_waitlist_entry),
        )
}
