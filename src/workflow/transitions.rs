use serde::Serialize;

use super::gate::PermitCategory;
use crate::types::TaskState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trigger {
    Release,
    Drop,
    Take,
    Review,
    Approve,
    Reject,
}

/// What an edge does to the task owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerEffect {
    AssignCaller,
    Clear,
    Keep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: TaskState,
    pub to: TaskState,
    pub trigger: Trigger,
    pub permit: PermitCategory,
    pub owner: OwnerEffect,
    pub audit: &'static str,
}

impl Transition {
    /// Owner after this edge fires for `caller`, given the current owner.
    #[must_use]
    pub fn next_owner(&self, current: Option<&str>, caller: &str) -> Option<String> {
        match self.owner {
            OwnerEffect::AssignCaller => Some(caller.to_string()),
            OwnerEffect::Clear => None,
            OwnerEffect::Keep => current.map(str::to_string),
        }
    }
}

pub const TRANSITIONS: [Transition; 6] = [
    Transition {
        from: TaskState::Open,
        to: TaskState::ToDo,
        trigger: Trigger::Release,
        permit: PermitCategory::Open,
        owner: OwnerEffect::Keep,
        audit: "Task released.",
    },
    Transition {
        from: TaskState::Doing,
        to: TaskState::ToDo,
        trigger: Trigger::Drop,
        permit: PermitCategory::ToDo,
        owner: OwnerEffect::Clear,
        audit: "Task dropped.",
    },
    Transition {
        from: TaskState::ToDo,
        to: TaskState::Doing,
        trigger: Trigger::Take,
        permit: PermitCategory::ToDo,
        owner: OwnerEffect::AssignCaller,
        audit: "Task taken.",
    },
    Transition {
        from: TaskState::Doing,
        to: TaskState::Done,
        trigger: Trigger::Review,
        permit: PermitCategory::ToDo,
        owner: OwnerEffect::Clear,
        audit: "Task reviewed.",
    },
    Transition {
        from: TaskState::Done,
        to: TaskState::Closed,
        trigger: Trigger::Approve,
        permit: PermitCategory::Done,
        owner: OwnerEffect::Keep,
        audit: "Task approved.",
    },
    Transition {
        from: TaskState::Done,
        to: TaskState::Doing,
        trigger: Trigger::Reject,
        permit: PermitCategory::Done,
        owner: OwnerEffect::Keep,
        audit: "Task rejected.",
    },
];

/// Looks up the edge from `from` to `to`, if the workflow has one.
#[must_use]
pub fn find_transition(from: TaskState, to: TaskState) -> Option<&'static Transition> {
    TRANSITIONS.iter().find(|t| t.from == from && t.to == to)
}
