use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::dto::import_dto::{CsvImportPayload, ImportPayload};
use crate::{error::Result, models::user::Actor, AppState};

#[utoipa::path(
    post,
    path = "/api/campaigns/{id}/candidates/import",
    params(
        ("id" = Uuid, Path, description = "Campaign ID")
    ),
    request_body = ImportPayload,
    responses(
        (status = 200, description = "Import summary", body = Json<ImportSummary>),
        (status = 400, description = "Too many or too few rows"),
    ),
)]
pub async fn import_candidates(
    State(state): State<AppState>,
    Path(campaign_id): Path<Uuid>,
    actor: Actor,
    Json(payload): Json<ImportPayload>,
) -> Result<impl IntoResponse> {
    let summary = state
        .import_service
        .import(&actor, campaign_id, payload)
        .await?;
    Ok(Json(summary))
}

#[utoipa::path(
    post,
    path = "/api/campaigns/{id}/candidates/import-csv",
    params(
        ("id" = Uuid, Path, description = "Campaign ID")
    ),
    request_body = CsvImportPayload,
    responses(
        (status = 200, description = "Import summary", body = Json<ImportSummary>),
        (status = 400, description = "CSV is malformed or a mapped column is missing"),
    ),
)]
pub async fn import_candidates_csv(
    State(state): State<AppState>,
    Path(campaign_id): Path<Uuid>,
    actor: Actor,
    Json(payload): Json<CsvImportPayload>,
) -> Result<impl IntoResponse> {
    let summary = state
        .import_service
        .import_csv(&actor, campaign_id, payload)
        .await?;
    Ok(Json(summary))
}
