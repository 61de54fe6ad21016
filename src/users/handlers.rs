use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::extractors::AuthUser,
    error::AppResult,
    extract::{AppJson, AppPath},
    state::AppState,
    users::{
        dto::{EditUserRequest, PublicUser},
        repo_types::ProfileUpdate,
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route(
            "/users/:id",
            get(get_user).put(edit_user).delete(delete_user),
        )
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
) -> AppResult<Json<Vec<PublicUser>>> {
    let users = state.users.list_users().await?;
    Ok(Json(users.into_iter().map(PublicUser::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<PublicUser>> {
    let user = state.users.find_by_id(id).await?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, payload))]
pub async fn edit_user(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<EditUserRequest>,
) -> AppResult<Json<PublicUser>> {
    let update = ProfileUpdate::parse(&payload.first_name, &payload.last_name, &payload.email)?;
    let user = state.users.update_profile(id, update).await?;
    info!(caller = %caller, user_id = %user.id, "user edited");
    Ok(Json(user.into()))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<StatusCode> {
    state.users.delete_user(id).await?;
    info!(caller = %caller, user_id = %id, "user removed");
    Ok(StatusCode::NO_CONTENT)
}
