use std::collections::BTreeSet;
use std::fmt;

use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// GroupSet is a set of group names, stored as a comma-joined string.
///
/// Entries keep their original spelling for display; comparisons go through
/// [`normalize_group`] so that membership checks ignore case and padding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct GroupSet(BTreeSet<String>);

/// Canonical form used for every group-name comparison.
#[must_use]
pub fn normalize_group(name: &str) -> String {
    name.trim().to_lowercase()
}

impl GroupSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a comma-joined list. Blank entries are dropped.
    #[must_use]
    pub fn parse(joined: &str) -> Self {
        joined.split(',').collect()
    }

    /// Serializes back to the comma-joined storage form.
    #[must_use]
    pub fn to_joined(&self) -> String {
        self.0.iter().cloned().collect::<Vec<_>>().join(",")
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Returns true if `group` matches an entry after normalization.
    #[must_use]
    pub fn contains(&self, group: &str) -> bool {
        let wanted = normalize_group(group);
        !wanted.is_empty() && self.0.iter().any(|g| normalize_group(g) == wanted)
    }

    /// Returns true if any group of `other` is also in this set.
    #[must_use]
    pub fn intersects(&self, other: &GroupSet) -> bool {
        other.iter().any(|g| self.contains(g))
    }

    pub fn insert(&mut self, group: &str) {
        let trimmed = group.trim();
        if !trimmed.is_empty() && !self.contains(trimmed) {
            self.0.insert(trimmed.to_string());
        }
    }
}

impl<S: AsRef<str>> FromIterator<S> for GroupSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = GroupSet::new();
        for group in iter {
            set.insert(group.as_ref());
        }
        set
    }
}

impl From<Vec<String>> for GroupSet {
    fn from(groups: Vec<String>) -> Self {
        groups.into_iter().collect()
    }
}

impl From<GroupSet> for Vec<String> {
    fn from(set: GroupSet) -> Self {
        set.0.into_iter().collect()
    }
}

impl fmt::Display for GroupSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_joined())
    }
}

impl ToSql for GroupSet {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.to_joined()))
    }
}

impl FromSql for GroupSet {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value {
            ValueRef::Null => Ok(GroupSet::new()),
            other => other.as_str().map(GroupSet::parse),
        }
    }
}
