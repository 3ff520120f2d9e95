use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};

use crate::auth::RequireAccount;
use crate::server::AppState;
use crate::server::dto::ListPlansParams;
use crate::server::response::{ApiError, ApiResponse};

pub async fn list_plans(
    _auth: RequireAccount,
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListPlansParams>,
) -> impl IntoResponse {
    let app = params.app.as_deref().filter(|a| !a.trim().is_empty());
    let plans = state.store.list_plans(app)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(plans)))
}
