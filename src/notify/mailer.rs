use std::fs;
use std::path::PathBuf;

use chrono::Utc;
use uuid::Uuid;

use crate::error::Result;

/// Outbound mail transport.
pub trait Mailer: Send + Sync {
    fn send_mail(&self, to: &[String], subject: &str, body: &str) -> Result<()>;
}

/// Writes messages to the log only. Used when no outbox is configured.
pub struct LogMailer {
    from: String,
}

impl LogMailer {
    #[must_use]
    pub fn new(from: impl Into<String>) -> Self {
        Self { from: from.into() }
    }
}

impl Mailer for LogMailer {
    fn send_mail(&self, to: &[String], subject: &str, body: &str) -> Result<()> {
        tracing::info!(
            from = %self.from,
            to = %to.join(", "),
            subject,
            "mail: {}",
            body.lines().next().unwrap_or_default()
        );
        Ok(())
    }
}

/// Drops each message as a text file into a spool directory for an
/// external relay to deliver.
pub struct OutboxMailer {
    from: String,
    dir: PathBuf,
}

impl OutboxMailer {
    pub fn new(from: impl Into<String>, dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            from: from.into(),
            dir,
        })
    }

    #[must_use]
    pub fn dir(&self) -> &std::path::Path {
        &self.dir
    }
}

impl Mailer for OutboxMailer {
    fn send_mail(&self, to: &[String], subject: &str, body: &str) -> Result<()> {
        let message = format!(
            "From: {}\r\nTo: {}\r\nDate: {}\r\nSubject: {}\r\n\r\n{}\r\n",
            self.from,
            to.join(", "),
            Utc::now().to_rfc2822(),
            subject,
            body
        );

        let tmp = self.dir.join(format!(".{}.tmp", Uuid::new_v4()));
        let path = tmp.with_file_name(format!("{}.eml", Uuid::new_v4()));
        fs::write(&tmp, message)?;
        fs::rename(&tmp, &path)?;

        tracing::debug!("queued mail {}", path.display());
        Ok(())
    }
}
