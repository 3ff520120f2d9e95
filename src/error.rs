use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("authentication required")]
    Unauthenticated,

    /// The caller is known but holds no permit for the requested action.
    #[error("not authorized: {0}")]
    Forbidden(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("invalid token format")]
    InvalidTokenFormat,

    #[error("token expired")]
    TokenExpired,

    #[error("token lookup collision")]
    TokenLookupCollision,
}

impl Error {
    /// Stable category string exposed to API clients.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Error::Unauthenticated | Error::InvalidTokenFormat | Error::TokenExpired => {
                "unauthenticated"
            }
            Error::Forbidden(_) => "unauthorized",
            Error::NotFound(_) => "not_found",
            Error::AlreadyExists(_) => "duplicate",
            Error::Conflict(_) => "conflict",
            Error::BadRequest(_) => "bad_request",
            Error::Database(_)
            | Error::Io(_)
            | Error::Config(_)
            | Error::TokenLookupCollision => "internal",
        }
    }

    pub(crate) fn stale(message: impl std::fmt::Display) -> Self {
        Error::Conflict(format!("{message}; reload the task and try again"))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
