use std::fmt;
use std::str::FromStr;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Lifecycle state of a task. Open is initial, Closed is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TaskState {
    Open,
    ToDo,
    Doing,
    Done,
    Closed,
}

impl TaskState {
    pub const ALL: [TaskState; 5] = [
        TaskState::Open,
        TaskState::ToDo,
        TaskState::Doing,
        TaskState::Done,
        TaskState::Closed,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            TaskState::Open => "Open",
            TaskState::ToDo => "ToDo",
            TaskState::Doing => "Doing",
            TaskState::Done => "Done",
            TaskState::Closed => "Closed",
        }
    }

    /// Upper-case label used in audit note headers.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            TaskState::Open => "OPEN",
            TaskState::ToDo => "TODO",
            TaskState::Doing => "DOING",
            TaskState::Done => "DONE",
            TaskState::Closed => "CLOSED",
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, TaskState::Closed)
    }

    /// Lenient parse: case-insensitive, and accepts the usual spellings of
    /// ToDo ("todo", "to-do", "to_do", "to do").
    #[must_use]
    pub fn parse(s: &str) -> Option<TaskState> {
        let folded: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        match folded.as_str() {
            "open" => Some(TaskState::Open),
            "todo" => Some(TaskState::ToDo),
            "doing" => Some(TaskState::Doing),
            "done" => Some(TaskState::Done),
            "closed" => Some(TaskState::Closed),
            _ => None,
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskState::parse(s).ok_or_else(|| {
            Error::BadRequest(format!(
                "Invalid task state '{s}'; expected one of Open, ToDo, Doing, Done, Closed"
            ))
        })
    }
}

impl ToSql for TaskState {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TaskState {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        TaskState::parse(s).ok_or_else(|| FromSqlError::Other(format!("unknown task state '{s}'").into()))
    }
}
