use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;

use crate::auth::{RequireAdmin, TokenGenerator};
use crate::server::AppState;
use crate::server::dto::{CreateAccountRequest, UpdateAccountRequest};
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt};
use crate::server::validation::{validate_email, validate_username};
use crate::types::Account;

pub async fn create_account(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateAccountRequest>,
) -> impl IntoResponse {
    let username = req.username.trim().to_string();
    validate_username(&username)?;
    validate_email(&req.email)?;

    let password_hash = TokenGenerator::new().hash_password(&req.password)?;

    let now = Utc::now();
    let account = Account {
        username,
        email: req.email.trim().to_string(),
        password_hash,
        active: req.active.unwrap_or(true),
        groups: req.groups,
        created_at: now,
        updated_at: now,
    };
    state.store.create_account(&account)?;

    tracing::info!(
        "{} created account {} in groups [{}]",
        admin.username,
        account.username,
        account.groups
    );

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(account))))
}

pub async fn list_accounts(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let accounts = state.store.list_accounts()?;
    Ok::<_, ApiError>(Json(ApiResponse::success(accounts)))
}

pub async fn get_account(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> impl IntoResponse {
    let account = state
        .store
        .get_account(&username)?
        .or_not_found("Account not found")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(account)))
}

pub async fn update_account(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
    Json(req): Json<UpdateAccountRequest>,
) -> impl IntoResponse {
    let mut account = state
        .store
        .get_account(&username)?
        .or_not_found("Account not found")?;

    if let Some(email) = req.email {
        validate_email(&email)?;
        account.email = email.trim().to_string();
    }
    if let Some(password) = req.password {
        account.password_hash = TokenGenerator::new().hash_password(&password)?;
    }
    if let Some(groups) = req.groups {
        account.groups = groups;
    }
    if let Some(active) = req.active {
        account.active = active;
    }
    account.updated_at = Utc::now();

    state.store.update_account(&account)?;

    tracing::info!("{} updated account {}", admin.username, account.username);

    Ok::<_, ApiError>(Json(ApiResponse::success(account)))
}
