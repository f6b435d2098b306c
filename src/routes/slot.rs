use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::dto::slot_dto::AddSlotPayload;
use crate::{error::Result, models::user::Actor, AppState};

#[utoipa::path(
    post,
    path = "/api/campaigns/{id}/slots",
    params(
        ("id" = Uuid, Path, description = "Campaign ID")
    ),
    request_body = AddSlotPayload,
    responses(
        (status = 201, description = "Slot published", body = Json<InterviewerSlot>),
        (status = 403, description = "Caller is not an interviewer"),
    ),
)]
pub async fn add_slot(
    State(state): State<AppState>,
    Path(campaign_id): Path<Uuid>,
    actor: Actor,
    Json(payload): Json<AddSlotPayload>,
) -> Result<impl IntoResponse> {
    let slot = state.slot_service.add(&actor, campaign_id, payload).await?;
    Ok((StatusCode::CREATED, Json(slot)))
}

#[utoipa::path(
    get,
    path = "/api/campaigns/{id}/slots",
    params(
        ("id" = Uuid, Path, description = "Campaign ID")
    ),
    responses(
        (status = 200, description = "Published slots", body = Json<Vec<InterviewerSlot>>),
    ),
)]
pub async fn list_slots(
    State(state): State<AppState>,
    Path(campaign_id): Path<Uuid>,
    _actor: Actor,
) -> Result<impl IntoResponse> {
    let slots = state.slot_service.list(campaign_id).await?;
    Ok(Json(slots))
}

#[utoipa::path(
    delete,
    path = "/api/slots/{id}",
    params(
        ("id" = Uuid, Path, description = "Slot ID")
    ),
    responses(
        (status = 204, description = "Slot removed"),
        (status = 403, description = "Slot belongs to another interviewer"),
        (status = 404, description = "Slot not found"),
    ),
)]
pub async fn remove_slot(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    actor: Actor,
) -> Result<impl IntoResponse> {
    state.slot_service.remove(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
