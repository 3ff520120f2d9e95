mod accounts;
mod applications;
mod plans;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::server::AppState;

pub fn admin_router() -> Router<Arc<AppState>> {
    Router::new()
        // Account routes
        .route("/accounts", post(accounts::create_account))
        .route("/accounts", get(accounts::list_accounts))
        .route("/accounts/{username}", get(accounts::get_account))
        .route("/accounts/{username}", patch(accounts::update_account))
        // Application routes
        .route("/applications", post(applications::create_application))
        .route(
            "/applications/{acronym}",
            patch(applications::update_application),
        )
        // Plan routes
        .route("/plans", post(plans::create_plan))
}
