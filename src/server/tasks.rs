use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use crate::auth::RequireAccount;
use crate::server::AppState;
use crate::server::dto::{AppendNoteRequest, CreateTaskRequest, ListTasksParams, UpdateTaskRequest};
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt};
use crate::types::{Task, TaskState};
use crate::workflow::{NewTask, UpdateIntent, UpdateOutcome, parse_entries};

pub fn tasks_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/by-state/{state}", get(list_tasks_by_state))
        .route("/tasks/{name}", get(get_task).patch(update_task))
        .route("/tasks/{name}/notes", get(list_notes).post(append_note))
        .route("/tasks/{name}/promote", post(promote_task))
}

/// Hands any review notice to the notifier. Only called once the store has
/// committed the change that produced it.
fn finish(state: &AppState, outcome: UpdateOutcome) -> ApiResponse<Task> {
    if let Some(notice) = outcome.notice {
        state.notifier.dispatch(notice);
    }
    ApiResponse::success(outcome.task)
}

async fn list_tasks(
    _auth: RequireAccount,
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListTasksParams>,
) -> impl IntoResponse {
    let filter = params.into_filter()?;
    let tasks = state.store.list_tasks(&filter)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(tasks)))
}

async fn list_tasks_by_state(
    _auth: RequireAccount,
    State(state): State<Arc<AppState>>,
    Path(task_state): Path<String>,
    Query(params): Query<ListTasksParams>,
) -> impl IntoResponse {
    let task_state: TaskState = task_state.parse()?;
    let filter = params.into_filter()?.with_state(task_state);
    let tasks = state.store.list_tasks(&filter)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(tasks)))
}

async fn get_task(
    _auth: RequireAccount,
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    let task = state
        .store
        .get_task(&name)?
        .or_not_found(format!("Task '{name}' not found"))?;

    Ok::<_, ApiError>(Json(ApiResponse::success(task)))
}

async fn create_task(
    auth: RequireAccount,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateTaskRequest>,
) -> impl IntoResponse {
    let new = NewTask::from(req);
    let task = state.store.create_task(&auth.account.username, &new)?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(task))))
}

async fn update_task(
    auth: RequireAccount,
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(req): Json<UpdateTaskRequest>,
) -> impl IntoResponse {
    let intent = UpdateIntent::resolve(req.plan, req.state.as_deref(), req.note)?;
    let outcome = state
        .store
        .update_task(&auth.account.username, &name, &intent)?;

    Ok::<_, ApiError>(Json(finish(&state, outcome)))
}

async fn promote_task(
    auth: RequireAccount,
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    let outcome = state.store.promote_task(&auth.account.username, &name)?;
    Ok::<_, ApiError>(Json(finish(&state, outcome)))
}

async fn list_notes(
    _auth: RequireAccount,
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    let task = state
        .store
        .get_task(&name)?
        .or_not_found(format!("Task '{name}' not found"))?;

    Ok::<_, ApiError>(Json(ApiResponse::success(parse_entries(&task.notes))))
}

async fn append_note(
    auth: RequireAccount,
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(req): Json<AppendNoteRequest>,
) -> impl IntoResponse {
    let task = state
        .store
        .append_task_note(&auth.account.username, &name, &req.note)?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(task))))
}
