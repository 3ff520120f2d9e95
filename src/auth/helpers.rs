use chrono::{Duration, Utc};
use uuid::Uuid;

use super::{TokenGenerator, parse_token};
use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::{Account, Token};

pub struct ValidatedToken {
    pub token: Token,
    pub account: Account,
}

/// Extracts a token string from a Basic auth header.
/// Expects format: Basic base64(x-token:actual_token)
pub fn extract_basic_auth_token(header: &str) -> Option<String> {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;

    let encoded = header.strip_prefix("Basic ")?;
    let decoded = STANDARD.decode(encoded).ok()?;
    let credentials = String::from_utf8(decoded).ok()?;

    let (username, password) = credentials.split_once(':')?;

    if username != "x-token" {
        return None;
    }

    Some(password.to_string())
}

/// Extracts token from Authorization header (Bearer or Basic).
/// Returns None if no auth header is present.
pub fn extract_token_from_header(auth_header: Option<&str>) -> Result<Option<String>> {
    match auth_header {
        Some(header) => {
            if let Some(token) = header.strip_prefix("Bearer ") {
                Ok(Some(token.trim().to_string()))
            } else if header.starts_with("Basic ") {
                extract_basic_auth_token(header)
                    .ok_or(Error::InvalidTokenFormat)
                    .map(Some)
            } else {
                Err(Error::InvalidTokenFormat)
            }
        }
        None => Ok(None),
    }
}

/// Validates a raw token and resolves the active account it belongs to.
pub fn validate_token(
    store: &dyn Store,
    generator: &TokenGenerator,
    raw_token: &str,
) -> Result<ValidatedToken> {
    let (lookup, _secret) = parse_token(raw_token)?;

    let token = store
        .get_token_by_lookup(&lookup)?
        .ok_or(Error::Unauthenticated)?;

    if !generator.verify(raw_token, &token.token_hash)? {
        return Err(Error::Unauthenticated);
    }

    if let Some(expires_at) = &token.expires_at {
        if expires_at < &Utc::now() {
            return Err(Error::TokenExpired);
        }
    }

    let account = store
        .get_account(&token.username)?
        .filter(|a| a.active)
        .ok_or(Error::Unauthenticated)?;

    if let Err(e) = store.update_token_last_used(&token.id) {
        tracing::warn!("Failed to update token last_used_at: {e}");
    }

    Ok(ValidatedToken { token, account })
}

/// Checks a username/password pair and issues a new token.
/// Returns the stored token and the raw token string to hand to the client.
pub fn login(
    store: &dyn Store,
    generator: &TokenGenerator,
    username: &str,
    password: &str,
    ttl: Duration,
) -> Result<(Token, String)> {
    let account = store
        .get_account(username)?
        .filter(|a| a.active)
        .ok_or(Error::Unauthenticated)?;

    if !generator.verify(password, &account.password_hash)? {
        tracing::debug!("failed login for {username}");
        return Err(Error::Unauthenticated);
    }

    let now = Utc::now();
    let expires_at = now
        .checked_add_signed(ttl)
        .ok_or_else(|| Error::Config("token lifetime is out of range".to_string()))?;

    let (raw_token, lookup, hash) = generator.generate()?;
    let token = Token {
        id: Uuid::new_v4().to_string(),
        token_hash: hash,
        token_lookup: lookup,
        username: account.username,
        created_at: now,
        expires_at: Some(expires_at),
        last_used_at: None,
    };
    store.create_token(&token)?;

    Ok((token, raw_token))
}
