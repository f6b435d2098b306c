use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{error::Result, models::user::Actor, AppState};

fn attachment(campaign_id: Uuid, extension: &str) -> String {
    let filename = format!(
        "campaign_{}_{}.{}",
        campaign_id.simple(),
        chrono::Utc::now().format("%Y%m%d"),
        extension
    );
    format!("attachment; filename=\"{}\"", filename)
}

/// Export a campaign's candidates as CSV
#[utoipa::path(
    get,
    path = "/api/campaigns/{id}/candidates/export",
    params(
        ("id" = Uuid, Path, description = "Campaign ID")
    ),
    responses(
        (status = 200, description = "CSV file with one row per candidate"),
        (status = 404, description = "Campaign not found"),
    ),
)]
pub async fn export_csv(
    State(state): State<AppState>,
    Path(campaign_id): Path<Uuid>,
    actor: Actor,
) -> Result<impl IntoResponse> {
    actor.require_admin("export candidates")?;
    let buffer = state.export_service.campaign_csv(campaign_id).await?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, attachment(campaign_id, "csv")),
        ],
        buffer,
    ))
}

/// Export a campaign's candidates as XLSX
#[utoipa::path(
    get,
    path = "/api/campaigns/{id}/candidates/export.xlsx",
    params(
        ("id" = Uuid, Path, description = "Campaign ID")
    ),
    responses(
        (status = 200, description = "Excel workbook with one row per candidate"),
        (status = 404, description = "Campaign not found"),
    ),
)]
pub async fn export_xlsx(
    State(state): State<AppState>,
    Path(campaign_id): Path<Uuid>,
    actor: Actor,
) -> Result<impl IntoResponse> {
    actor.require_admin("export candidates")?;
    let buffer = state.export_service.campaign_xlsx(campaign_id).await?;

    Ok((
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE,
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet".to_string(),
            ),
            (header::CONTENT_DISPOSITION, attachment(campaign_id, "xlsx")),
        ],
        buffer,
    ))
}
