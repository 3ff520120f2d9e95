use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use crate::auth::{RequireAccount, TokenGenerator, login};
use crate::server::AppState;
use crate::server::dto::{LoginRequest, LoginResponse};
use crate::server::response::{ApiError, ApiResponse};

pub fn auth_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/login", post(create_session))
        .route("/auth/logout", post(end_session))
        .route("/me", get(current_account))
}

async fn create_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> impl IntoResponse {
    let (token, raw_token) = login(
        state.store.as_ref(),
        &TokenGenerator::new(),
        req.username.trim(),
        &req.password,
        state.config.token_ttl()?,
    )?;

    tracing::info!("{} logged in", token.username);

    Ok::<_, ApiError>((
        StatusCode::CREATED,
        Json(ApiResponse::success(LoginResponse {
            token: raw_token,
            username: token.username,
            expires_at: token.expires_at,
        })),
    ))
}

async fn end_session(
    auth: RequireAccount,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    state.store.delete_token(&auth.token.id)?;
    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}

async fn current_account(auth: RequireAccount) -> impl IntoResponse {
    Json(ApiResponse::success(auth.account))
}
