mod applications;
mod plans;

use std::sync::Arc;

use axum::{Router, routing::get};

use crate::server::AppState;

pub fn user_router() -> Router<Arc<AppState>> {
    Router::new()
        // Applications
        .route("/applications", get(applications::list_applications))
        .route("/applications/{acronym}", get(applications::get_application))
        // Plans
        .route("/plans", get(plans::list_plans))
}
