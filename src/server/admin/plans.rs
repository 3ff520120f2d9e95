use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;

use crate::auth::RequireAdmin;
use crate::server::AppState;
use crate::server::dto::CreatePlanRequest;
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt};
use crate::server::validation::{validate_date_range, validate_plan_name};
use crate::types::Plan;

pub async fn create_plan(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreatePlanRequest>,
) -> impl IntoResponse {
    let name = req.name.trim().to_string();
    validate_plan_name(&name)?;
    validate_date_range(req.start_date, req.end_date)?;

    let app_acronym = req.app_acronym.filter(|a| !a.trim().is_empty());
    if let Some(acronym) = &app_acronym {
        state
            .store
            .get_application(acronym)?
            .or_not_found(format!("Application '{acronym}' not found"))?;
    }

    let plan = Plan {
        name,
        app_acronym,
        start_date: req.start_date,
        end_date: req.end_date,
        created_at: Utc::now(),
    };
    state.store.create_plan(&plan)?;

    tracing::info!("{} created plan {}", admin.username, plan.name);

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(plan))))
}
