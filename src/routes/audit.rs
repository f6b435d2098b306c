use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};

use crate::dto::user_dto::AuditLogQuery;
use crate::{error::Result, models::user::Actor, AppState};

#[utoipa::path(
    get,
    path = "/api/stuck-candidates",
    responses(
        (status = 200, description = "Fresher candidates waiting on the next round", body = Json<Vec<StuckCandidate>>),
        (status = 403, description = "Caller is not an admin"),
    ),
)]
pub async fn stuck_candidates(
    State(state): State<AppState>,
    actor: Actor,
) -> Result<impl IntoResponse> {
    let stuck = state.stuck_service.stuck_candidates(&actor).await?;
    Ok(Json(stuck))
}

#[utoipa::path(
    get,
    path = "/api/audit-logs",
    params(
        ("limit" = Option<i64>, Query, description = "Number of entries, 1 to 500")
    ),
    responses(
        (status = 200, description = "Most recent audit entries", body = Json<Vec<AuditLog>>),
        (status = 403, description = "Caller is not an admin"),
    ),
)]
pub async fn audit_logs(
    State(state): State<AppState>,
    actor: Actor,
    Query(query): Query<AuditLogQuery>,
) -> Result<impl IntoResponse> {
    let entries = state.audit_service.recent(&actor, query.limit).await?;
    Ok(Json(entries))
}
