mod helpers;
mod middleware;
mod token;

pub use helpers::{ValidatedToken, extract_token_from_header, login, validate_token};
pub use middleware::{ADMIN_GROUP, RequireAccount, RequireAdmin};
pub use token::{TokenGenerator, generate_password, parse_token};
