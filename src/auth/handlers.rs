use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{ChangePasswordRequest, LoginRequest, LoginResponse, RegisterRequest},
        extractors::AuthUser,
    },
    extract::AppJson,
    error::{AppError, AppResult},
    state::AppState,
    users::dto::PublicUser,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

pub fn me_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_me))
        .route("/me/password", post(change_password))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<PublicUser>)> {
    let user = state
        .auth
        .register(
            &payload.first_name,
            &payload.last_name,
            &payload.email,
            &payload.password,
            &payload.password_confirmation,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let issued = state.auth.login(&payload.email, &payload.password).await?;
    Ok(Json(LoginResponse {
        access_token: issued.token,
        token_type: "Bearer",
        expires_in: issued.expires_in.as_secs(),
        user: issued.user.into(),
    }))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<PublicUser>> {
    // A valid token can outlive its user.
    let user = state.users.find_by_id(user_id).await.map_err(|e| match e {
        AppError::NotFound => AppError::Unauthorized("user not found".into()),
        other => other,
    })?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, payload))]
pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppJson(payload): AppJson<ChangePasswordRequest>,
) -> AppResult<StatusCode> {
    state
        .auth
        .change_password(
            user_id,
            &payload.current_password,
            &payload.new_password,
            &payload.new_password_confirmation,
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
