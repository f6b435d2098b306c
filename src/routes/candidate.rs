use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::dto::candidate_dto::{CandidatePayload, NoShowPayload, StatusChange};
use crate::{error::Result, models::user::Actor, AppState};

#[utoipa::path(
    post,
    path = "/api/campaigns/{id}/candidates",
    params(
        ("id" = Uuid, Path, description = "Campaign ID")
    ),
    request_body = CandidatePayload,
    responses(
        (status = 201, description = "Candidate added to the pipeline", body = Json<Candidate>),
        (status = 409, description = "Email or phone already used in this campaign"),
    ),
)]
pub async fn create_candidate(
    State(state): State<AppState>,
    Path(campaign_id): Path<Uuid>,
    actor: Actor,
    Json(payload): Json<CandidatePayload>,
) -> Result<impl IntoResponse> {
    let candidate = state
        .candidate_service
        .create(&actor, campaign_id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(candidate)))
}

#[utoipa::path(
    get,
    path = "/api/campaigns/{id}/candidates",
    params(
        ("id" = Uuid, Path, description = "Campaign ID")
    ),
    responses(
        (status = 200, description = "Candidates with their display status", body = Json<Vec<CandidateSummary>>),
        (status = 404, description = "Campaign not found"),
    ),
)]
pub async fn list_candidates(
    State(state): State<AppState>,
    Path(campaign_id): Path<Uuid>,
    _actor: Actor,
) -> Result<impl IntoResponse> {
    let candidates = state.candidate_service.list(campaign_id).await?;
    Ok(Json(candidates))
}

#[utoipa::path(
    get,
    path = "/api/candidates/{id}",
    params(
        ("id" = Uuid, Path, description = "Candidate ID")
    ),
    responses(
        (status = 200, description = "Candidate with interview history", body = Json<CandidateDetail>),
        (status = 404, description = "Candidate not found"),
    ),
)]
pub async fn get_candidate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _actor: Actor,
) -> Result<impl IntoResponse> {
    let detail = state.candidate_service.detail(id).await?;
    Ok(Json(detail))
}

#[utoipa::path(
    patch,
    path = "/api/candidates/{id}",
    params(
        ("id" = Uuid, Path, description = "Candidate ID")
    ),
    request_body = CandidatePayload,
    responses(
        (status = 200, description = "Candidate updated", body = Json<Candidate>),
        (status = 409, description = "Email or phone already used in this campaign"),
    ),
)]
pub async fn update_candidate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    actor: Actor,
    Json(payload): Json<CandidatePayload>,
) -> Result<impl IntoResponse> {
    let candidate = state.candidate_service.update(&actor, id, payload).await?;
    Ok(Json(candidate))
}

#[utoipa::path(
    post,
    path = "/api/candidates/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Candidate ID")
    ),
    request_body = StatusChange,
    responses(
        (status = 200, description = "Status changed", body = Json<Candidate>),
        (status = 409, description = "Transition not allowed from the current status"),
    ),
)]
pub async fn change_candidate_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    actor: Actor,
    Json(change): Json<StatusChange>,
) -> Result<impl IntoResponse> {
    let candidate = state
        .candidate_service
        .change_status(&actor, id, change)
        .await?;
    Ok(Json(candidate))
}

#[utoipa::path(
    post,
    path = "/api/candidates/{id}/no-show",
    params(
        ("id" = Uuid, Path, description = "Candidate ID")
    ),
    request_body = NoShowPayload,
    responses(
        (status = 200, description = "No-show resolved", body = Json<Candidate>),
        (status = 409, description = "Last interview is not a no-show"),
    ),
)]
pub async fn resolve_no_show(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    actor: Actor,
    Json(payload): Json<NoShowPayload>,
) -> Result<impl IntoResponse> {
    let candidate = state
        .candidate_service
        .resolve_no_show(&actor, id, payload.action)
        .await?;
    Ok(Json(candidate))
}
