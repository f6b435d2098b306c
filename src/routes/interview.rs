use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::dto::interview_dto::{AssignInterviewPayload, FeedbackPayload, ReassignInterviewPayload};
use crate::{error::Result, models::user::Actor, AppState};

#[utoipa::path(
    post,
    path = "/api/candidates/{id}/interviews",
    params(
        ("id" = Uuid, Path, description = "Candidate ID")
    ),
    request_body = AssignInterviewPayload,
    responses(
        (status = 201, description = "Interview scheduled", body = Json<AssignOutcome>),
        (status = 200, description = "Interviewer already has an active interview with the candidate", body = Json<AssignOutcome>),
        (status = 409, description = "Candidate is not in the pipeline"),
    ),
)]
pub async fn assign_interview(
    State(state): State<AppState>,
    Path(candidate_id): Path<Uuid>,
    actor: Actor,
    Json(payload): Json<AssignInterviewPayload>,
) -> Result<impl IntoResponse> {
    let outcome = state
        .interview_service
        .assign(&actor, candidate_id, payload)
        .await?;
    let status = if outcome.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(outcome)))
}

#[utoipa::path(
    post,
    path = "/api/candidates/{id}/interviews/cancel",
    params(
        ("id" = Uuid, Path, description = "Candidate ID")
    ),
    responses(
        (status = 200, description = "Scheduled interview cancelled", body = Json<Interview>),
        (status = 409, description = "Nothing cancellable"),
    ),
)]
pub async fn cancel_interview(
    State(state): State<AppState>,
    Path(candidate_id): Path<Uuid>,
    actor: Actor,
) -> Result<impl IntoResponse> {
    let interview = state.interview_service.cancel(&actor, candidate_id).await?;
    Ok(Json(interview))
}

#[utoipa::path(
    get,
    path = "/api/interviews/mine",
    responses(
        (status = 200, description = "Interviews assigned to the caller", body = Json<Vec<InterviewerAssignment>>),
    ),
)]
pub async fn my_interviews(
    State(state): State<AppState>,
    actor: Actor,
) -> Result<impl IntoResponse> {
    let assignments = state.interview_service.list_mine(&actor).await?;
    Ok(Json(assignments))
}

#[utoipa::path(
    post,
    path = "/api/interviews/{id}/start",
    params(
        ("id" = Uuid, Path, description = "Interview ID")
    ),
    responses(
        (status = 200, description = "Interview started", body = Json<Interview>),
        (status = 403, description = "Caller is not the assigned interviewer"),
        (status = 409, description = "Interview is not scheduled"),
    ),
)]
pub async fn start_interview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    actor: Actor,
) -> Result<impl IntoResponse> {
    let interview = state.interview_service.start(&actor, id).await?;
    Ok(Json(interview))
}

#[utoipa::path(
    post,
    path = "/api/interviews/{id}/complete",
    params(
        ("id" = Uuid, Path, description = "Interview ID")
    ),
    request_body = FeedbackPayload,
    responses(
        (status = 200, description = "Interview completed with feedback", body = Json<InterviewRecord>),
        (status = 403, description = "Caller is not the assigned interviewer"),
        (status = 409, description = "Interview is not ongoing"),
    ),
)]
pub async fn complete_interview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    actor: Actor,
    Json(payload): Json<FeedbackPayload>,
) -> Result<impl IntoResponse> {
    let record = state.interview_service.complete(&actor, id, payload).await?;
    Ok(Json(record))
}

#[utoipa::path(
    patch,
    path = "/api/interviews/{id}/feedback",
    params(
        ("id" = Uuid, Path, description = "Interview ID")
    ),
    request_body = FeedbackPayload,
    responses(
        (status = 200, description = "Feedback revised", body = Json<Feedback>),
        (status = 409, description = "Feedback is no longer editable"),
    ),
)]
pub async fn edit_feedback(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    actor: Actor,
    Json(payload): Json<FeedbackPayload>,
) -> Result<impl IntoResponse> {
    let feedback = state
        .interview_service
        .edit_feedback(&actor, id, payload)
        .await?;
    Ok(Json(feedback))
}

#[utoipa::path(
    post,
    path = "/api/interviews/{id}/reassign",
    params(
        ("id" = Uuid, Path, description = "Interview ID")
    ),
    request_body = ReassignInterviewPayload,
    responses(
        (status = 200, description = "Interview reassigned", body = Json<Interview>),
        (status = 409, description = "Interview is completed or the target interviewer is busy with this candidate"),
    ),
)]
pub async fn reassign_interview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    actor: Actor,
    Json(payload): Json<ReassignInterviewPayload>,
) -> Result<impl IntoResponse> {
    let interview = state
        .interview_service
        .reassign(&actor, id, payload)
        .await?;
    Ok(Json(interview))
}
