//! Append-only audit ledger stored in a task's notes field.
//!
//! Each entry is a block introduced by [`SEPARATOR`], with a header line
//! `[YYYY-MM-DD HH:MM] STATE - username` followed by the free-text body.
//! The stored text keeps entries in the order they were appended; only
//! [`parse_entries`] presents them newest first.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::types::TaskState;

/// Line that opens every ledger entry.
pub const SEPARATOR: &str = "~~~~~~~~";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteEntry {
    pub header: String,
    pub body: String,
}

/// Returns `existing` with a new entry appended. Prior entries are never
/// modified.
///
/// The body is stored byte for byte, followed by one terminating newline.
/// Only lines that would read back as a separator are escaped, with one
/// extra leading space that [`parse_entries`] removes again.
#[must_use]
pub fn append_entry(
    existing: Option<&str>,
    username: &str,
    text: &str,
    state: TaskState,
    timestamp: NaiveDateTime,
) -> String {
    let mut notes = existing.unwrap_or_default().to_string();
    if !notes.is_empty() && !notes.ends_with('\n') {
        notes.push('\n');
    }

    notes.push_str(SEPARATOR);
    notes.push('\n');
    notes.push_str(&format!(
        "[{}] {} - {}\n",
        timestamp.format(TIMESTAMP_FORMAT),
        state.label(),
        username
    ));

    if !text.is_empty() {
        for line in text.split_inclusive('\n') {
            if looks_like_separator(line) {
                notes.push(' ');
            }
            notes.push_str(line);
        }
        notes.push('\n');
    }

    notes
}

/// True for a line that is the separator once leading spaces and trailing
/// whitespace are ignored.
fn looks_like_separator(line: &str) -> bool {
    line.trim_start_matches(' ').trim_end() == SEPARATOR
}

fn unescape_line(line: &str) -> &str {
    match line.strip_prefix(' ') {
        Some(rest) if looks_like_separator(rest) => rest,
        _ => line,
    }
}

/// Splits a ledger into entries, most recent first.
#[must_use]
pub fn parse_entries(notes: &str) -> Vec<NoteEntry> {
    let mut blocks: Vec<Vec<&str>> = vec![Vec::new()];
    for line in notes.split_inclusive('\n') {
        if line.trim_end() == SEPARATOR {
            blocks.push(Vec::new());
        } else if let Some(current) = blocks.last_mut() {
            current.push(line);
        }
    }

    let mut entries: Vec<NoteEntry> = blocks
        .into_iter()
        .filter_map(|lines| {
            let start = lines.iter().position(|l| !l.trim().is_empty())?;
            let header = lines[start].trim().to_string();

            let mut body: String = lines[start + 1..]
                .iter()
                .map(|l| unescape_line(l))
                .collect();
            if body.ends_with('\n') {
                body.pop();
            }

            Some(NoteEntry { header, body })
        })
        .collect();

    entries.reverse();
    entries
}
