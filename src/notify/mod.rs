//! Post-commit review notifications.
//!
//! A [`ReviewNotice`] is produced by the workflow engine when a task moves
//! from Doing to Done. It is handed to [`Notifier::dispatch`] only after the
//! transaction has committed; delivery runs detached from the request, is
//! attempted at most once, and failures are logged and dropped.

mod mailer;

use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinHandle;

pub use mailer::{LogMailer, Mailer, OutboxMailer};

use crate::error::Result;
use crate::store::Store;
use crate::types::GroupSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewNotice {
    pub task_id: String,
    pub task_name: String,
    pub app_acronym: String,
    pub reviewer: String,
    /// The application's Done permit list at the time of review.
    pub groups: GroupSet,
}

impl ReviewNotice {
    #[must_use]
    pub fn subject(&self) -> String {
        format!("[{}] Task {} is ready for review", self.app_acronym, self.task_id)
    }

    #[must_use]
    pub fn body(&self) -> String {
        format!(
            "Task \"{}\" ({}) in application {} was marked Done by {} and is awaiting approval.",
            self.task_name, self.task_id, self.app_acronym, self.reviewer
        )
    }
}

pub struct Notifier {
    store: Arc<dyn Store>,
    mailer: Arc<dyn Mailer>,
}

impl Notifier {
    pub fn new(store: Arc<dyn Store>, mailer: Arc<dyn Mailer>) -> Self {
        Self { store, mailer }
    }

    /// Schedules delivery and returns immediately. The handle may be
    /// dropped; delivery continues regardless.
    pub fn dispatch(&self, notice: ReviewNotice) -> JoinHandle<()> {
        let store = Arc::clone(&self.store);
        let mailer = Arc::clone(&self.mailer);

        tokio::task::spawn_blocking(move || {
            match deliver(store.as_ref(), mailer.as_ref(), &notice) {
                Ok(0) => tracing::debug!(
                    "no recipients in groups [{}] for task {}",
                    notice.groups,
                    notice.task_id
                ),
                Ok(n) => tracing::info!("review notice for task {} sent to {n} recipients", notice.task_id),
                Err(e) => tracing::warn!("Failed to send review notice for task {}: {e}", notice.task_id),
            }
        })
    }
}

/// Resolves recipients and sends one message. Returns the recipient count.
pub fn deliver(store: &dyn Store, mailer: &dyn Mailer, notice: &ReviewNotice) -> Result<usize> {
    let recipients = store.emails_for_groups(&notice.groups)?;
    if recipients.is_empty() {
        return Ok(0);
    }

    mailer.send_mail(&recipients, &notice.subject(), &notice.body())?;
    Ok(recipients.len())
}
