mod groups;
mod models;
mod state;

pub use groups::{GroupSet, normalize_group};
pub use models::*;
pub use state::TaskState;
