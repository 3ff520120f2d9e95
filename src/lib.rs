//! # Tasktrack
//!
//! A task tracker whose tasks move through a fixed workflow
//! (Open, ToDo, Doing, Done, Closed). Every transition is gated by the
//! group lists configured on the owning application, and marking a task
//! Done mails the groups allowed to approve it.
//!
//! ## Library Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tasktrack::config::ServerConfig;
//! use tasktrack::notify::LogMailer;
//! use tasktrack::server::{AppState, create_router};
//! use tasktrack::store::{SqliteStore, Store};
//!
//! let config = ServerConfig::default();
//! let store = SqliteStore::new(config.db_path()).unwrap();
//! store.initialize().unwrap();
//!
//! let mailer = Arc::new(LogMailer::new(&config.mail.from));
//! let state = Arc::new(AppState::new(Arc::new(store), mailer, config));
//! let router = create_router(state);
//! // Serve with axum...
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Builds the `tasktrack` binary.

pub mod auth;
pub mod config;
pub mod error;
pub mod notify;
pub mod server;
pub mod store;
pub mod types;
pub mod workflow;
