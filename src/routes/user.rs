use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::dto::user_dto::{RegisterUserPayload, UserListQuery};
use crate::{error::Result, models::user::Actor, AppState};

#[utoipa::path(
    post,
    path = "/api/users",
    request_body = RegisterUserPayload,
    responses(
        (status = 201, description = "User registered", body = Json<User>),
        (status = 409, description = "Email already registered"),
    ),
)]
pub async fn register_user(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<RegisterUserPayload>,
) -> Result<impl IntoResponse> {
    let user = state.user_service.register(&actor, payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    get,
    path = "/api/users",
    params(
        ("role" = Option<String>, Query, description = "admin or interviewer")
    ),
    responses(
        (status = 200, description = "Registered users", body = Json<Vec<User>>),
    ),
)]
pub async fn list_users(
    State(state): State<AppState>,
    _actor: Actor,
    Query(query): Query<UserListQuery>,
) -> Result<impl IntoResponse> {
    let users = state.user_service.list(query.role).await?;
    Ok(Json(users))
}
