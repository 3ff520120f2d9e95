use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use super::TokenGenerator;
use super::helpers::{extract_token_from_header, validate_token};
use crate::error::Error;
use crate::server::AppState;
use crate::server::response::ApiError;
use crate::types::{Account, Token, normalize_group};

/// Group whose members may use the admin routes. It grants nothing in the
/// task workflow.
pub const ADMIN_GROUP: &str = "admin";

/// Extractor that requires a valid token bound to an active account.
pub struct RequireAccount {
    pub token: Token,
    pub account: Account,
}

/// Extractor that requires an account in the admin group.
pub struct RequireAdmin(pub Account);

impl FromRequestParts<Arc<AppState>> for RequireAccount {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        let raw_token = extract_token_from_header(auth_header)?.ok_or(Error::Unauthenticated)?;

        let validated = validate_token(state.store.as_ref(), &TokenGenerator::new(), &raw_token)
            .map_err(|e| match e {
                Error::Database(_) | Error::Io(_) | Error::Config(_) => {
                    tracing::error!("token validation failed: {e}");
                    ApiError::internal("Internal server error")
                }
                other => ApiError::from(other),
            })?;

        Ok(RequireAccount {
            token: validated.token,
            account: validated.account,
        })
    }
}

impl FromRequestParts<Arc<AppState>> for RequireAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let auth = RequireAccount::from_request_parts(parts, state).await?;

        if !auth.account.groups.contains(&normalize_group(ADMIN_GROUP)) {
            return Err(ApiError::from(Error::Forbidden(
                "Admin access required".to_string(),
            )));
        }

        Ok(RequireAdmin(auth.account))
    }
}
