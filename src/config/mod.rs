mod server;

pub use server::{MailConfig, ServerConfig};
