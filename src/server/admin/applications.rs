use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;

use crate::auth::RequireAdmin;
use crate::server::AppState;
use crate::server::dto::{CreateApplicationRequest, UpdateApplicationRequest};
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt};
use crate::server::validation::{validate_acronym, validate_date_range};
use crate::types::{Application, PermitLists};

pub async fn create_application(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateApplicationRequest>,
) -> impl IntoResponse {
    let acronym = req.acronym.trim().to_string();
    validate_acronym(&acronym)?;
    validate_date_range(req.start_date, req.end_date)?;

    let app = Application {
        acronym,
        description: req.description.filter(|d| !d.trim().is_empty()),
        revision: 0,
        start_date: req.start_date,
        end_date: req.end_date,
        permits: PermitLists {
            create: req.permit_create,
            open: req.permit_open,
            todo: req.permit_todo,
            doing: req.permit_doing,
            done: req.permit_done,
        },
        created_at: Utc::now(),
    };
    state.store.create_application(&app)?;

    tracing::info!("{} created application {}", admin.username, app.acronym);

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(app))))
}

pub async fn update_application(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(acronym): Path<String>,
    Json(req): Json<UpdateApplicationRequest>,
) -> impl IntoResponse {
    let mut app = state
        .store
        .get_application(&acronym)?
        .or_not_found("Application not found")?;

    if let Some(description) = req.description {
        app.description = Some(description).filter(|d| !d.trim().is_empty());
    }
    if req.start_date.is_some() {
        app.start_date = req.start_date;
    }
    if req.end_date.is_some() {
        app.end_date = req.end_date;
    }
    validate_date_range(app.start_date, app.end_date)?;

    let permits = &mut app.permits;
    if let Some(groups) = req.permit_create {
        permits.create = groups;
    }
    if let Some(groups) = req.permit_open {
        permits.open = groups;
    }
    if let Some(groups) = req.permit_todo {
        permits.todo = groups;
    }
    if let Some(groups) = req.permit_doing {
        permits.doing = groups;
    }
    if let Some(groups) = req.permit_done {
        permits.done = groups;
    }

    state.store.update_application(&app)?;

    tracing::info!("{} updated application {}", admin.username, app.acronym);

    Ok::<_, ApiError>(Json(ApiResponse::success(app)))
}
