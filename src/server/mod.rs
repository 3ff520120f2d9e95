mod admin;
mod auth;
pub mod dto;
pub mod response;
mod router;
mod tasks;
mod user;
pub mod validation;

pub use admin::admin_router;
pub use auth::auth_router;
pub use router::{AppState, create_router};
pub use tasks::tasks_router;
pub use user::user_router;
