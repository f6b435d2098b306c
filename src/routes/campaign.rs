use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::dto::campaign_dto::{CampaignListQuery, CreateCampaignPayload};
use crate::{error::Result, models::user::Actor, AppState};

#[utoipa::path(
    post,
    path = "/api/campaigns",
    request_body = CreateCampaignPayload,
    responses(
        (status = 201, description = "Campaign created", body = Json<Campaign>),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Caller is not an admin"),
    ),
)]
pub async fn create_campaign(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<CreateCampaignPayload>,
) -> Result<impl IntoResponse> {
    let campaign = state.campaign_service.create(&actor, payload).await?;
    Ok((StatusCode::CREATED, Json(campaign)))
}

#[utoipa::path(
    get,
    path = "/api/campaigns",
    params(
        ("status" = Option<String>, Query, description = "Filter by active or completed")
    ),
    responses(
        (status = 200, description = "Campaigns, newest first", body = Json<Vec<Campaign>>),
    ),
)]
pub async fn list_campaigns(
    State(state): State<AppState>,
    _actor: Actor,
    Query(query): Query<CampaignListQuery>,
) -> Result<impl IntoResponse> {
    let campaigns = state.campaign_service.list(query.status).await?;
    Ok(Json(campaigns))
}

#[utoipa::path(
    get,
    path = "/api/campaigns/{id}",
    params(
        ("id" = Uuid, Path, description = "Campaign ID")
    ),
    responses(
        (status = 200, description = "Campaign found", body = Json<Campaign>),
        (status = 404, description = "Campaign not found"),
    ),
)]
pub async fn get_campaign(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _actor: Actor,
) -> Result<impl IntoResponse> {
    let campaign = state.campaign_service.get(id).await?;
    Ok(Json(campaign))
}

#[utoipa::path(
    post,
    path = "/api/campaigns/{id}/complete",
    params(
        ("id" = Uuid, Path, description = "Campaign ID")
    ),
    responses(
        (status = 200, description = "Campaign completed", body = Json<Campaign>),
        (status = 409, description = "Candidates are still in the pipeline or the campaign is already completed"),
    ),
)]
pub async fn complete_campaign(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    actor: Actor,
) -> Result<impl IntoResponse> {
    let campaign = state.campaign_service.complete(&actor, id).await?;
    Ok(Json(campaign))
}

#[utoipa::path(
    get,
    path = "/api/campaigns/{id}/stats",
    params(
        ("id" = Uuid, Path, description = "Campaign ID")
    ),
    responses(
        (status = 200, description = "Pipeline counters for the campaign", body = Json<CampaignStats>),
        (status = 404, description = "Campaign not found"),
    ),
)]
pub async fn campaign_stats(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _actor: Actor,
) -> Result<impl IntoResponse> {
    let stats = state.campaign_service.stats(id).await?;
    Ok(Json(stats))
}
