use std::fmt;

use serde::Serialize;

use super::membership::{GroupDirectory, is_member_of_any};
use crate::error::Result;
use crate::types::{Application, GroupSet};

/// The four permit lists consulted by the workflow. Several edges share a
/// category: ToDo covers take, drop and review; Done covers approve and reject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PermitCategory {
    Create,
    Open,
    ToDo,
    Done,
}

impl PermitCategory {
    /// The application's group list for this category.
    #[must_use]
    pub fn groups(self, app: &Application) -> &GroupSet {
        match self {
            PermitCategory::Create => &app.permits.create,
            PermitCategory::Open => &app.permits.open,
            PermitCategory::ToDo => &app.permits.todo,
            PermitCategory::Done => &app.permits.done,
        }
    }
}

impl fmt::Display for PermitCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PermitCategory::Create => "Create",
            PermitCategory::Open => "Open",
            PermitCategory::ToDo => "ToDo",
            PermitCategory::Done => "Done",
        };
        f.write_str(name)
    }
}

/// Returns true if `username` may act under `category` on `app`.
/// There is no override: an empty permit list locks everyone out.
pub fn can_transition<D: GroupDirectory + ?Sized>(
    dir: &D,
    username: &str,
    app: &Application,
    category: PermitCategory,
) -> Result<bool> {
    is_member_of_any(dir, username, category.groups(app))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::types::PermitLists;
    use crate::workflow::membership::tests::StaticDirectory;

    fn app(permits: PermitLists) -> Application {
        Application {
            acronym: "APP1".to_string(),
            description: None,
            revision: 0,
            start_date: None,
            end_date: None,
            permits,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_categories_map_to_lists() {
        let app = app(PermitLists {
            create: GroupSet::parse("PM"),
            open: GroupSet::parse("Dev"),
            todo: GroupSet::parse("Team"),
            doing: GroupSet::parse("Nobody"),
            done: GroupSet::parse("Lead"),
        });
        let dir = StaticDirectory::new(&[("pm", "PM"), ("dev", "Dev"), ("team", "team"), ("lead", "Lead")]);

        assert!(can_transition(&dir, "pm", &app, PermitCategory::Create).unwrap());
        assert!(!can_transition(&dir, "pm", &app, PermitCategory::Open).unwrap());
        assert!(can_transition(&dir, "dev", &app, PermitCategory::Open).unwrap());
        assert!(can_transition(&dir, "team", &app, PermitCategory::ToDo).unwrap());
        assert!(can_transition(&dir, "lead", &app, PermitCategory::Done).unwrap());
        assert!(!can_transition(&dir, "lead", &app, PermitCategory::ToDo).unwrap());
    }

    #[test]
    fn test_admin_group_has_no_override() {
        let app = app(PermitLists {
            done: GroupSet::parse("Lead"),
            ..PermitLists::default()
        });
        let dir = StaticDirectory::new(&[("root", "admin,Lead")]);

        assert!(!can_transition(&dir, "root", &app, PermitCategory::Create).unwrap());
        assert!(!can_transition(&dir, "root", &app, PermitCategory::Open).unwrap());
        assert!(can_transition(&dir, "root", &app, PermitCategory::Done).unwrap());
    }
}
