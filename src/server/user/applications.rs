use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::auth::RequireAccount;
use crate::server::AppState;
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt};

pub async fn list_applications(
    _auth: RequireAccount,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let apps = state.store.list_applications()?;
    Ok::<_, ApiError>(Json(ApiResponse::success(apps)))
}

pub async fn get_application(
    _auth: RequireAccount,
    State(state): State<Arc<AppState>>,
    Path(acronym): Path<String>,
) -> impl IntoResponse {
    let app = state
        .store
        .get_application(&acronym)?
        .or_not_found("Application not found")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(app)))
}
