use crate::error::{Error, Result};
use crate::types::TaskState;

/// New plan reference for a task; `None` unassigns it.
pub type PlanTarget = Option<String>;

/// The shape of an update request, resolved once before any state is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateIntent {
    NoteOnly {
        note: String,
    },
    PlanChange {
        plan: PlanTarget,
        note: Option<String>,
    },
    StateChange {
        to: TaskState,
        note: Option<String>,
    },
    PlanAndState {
        plan: PlanTarget,
        to: TaskState,
        note: Option<String>,
    },
}

impl UpdateIntent {
    /// Classifies raw request fields. A blank `plan` string unassigns the
    /// plan, a blank note is treated as absent, and a request carrying
    /// nothing at all is rejected.
    pub fn resolve(
        plan: Option<String>,
        state: Option<&str>,
        note: Option<String>,
    ) -> Result<Self> {
        let plan = plan.map(|p| {
            let trimmed = p.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        });
        let to = state.map(str::parse::<TaskState>).transpose()?;
        let note = note.filter(|n| !n.trim().is_empty());

        match (plan, to) {
            (Some(plan), Some(to)) => Ok(UpdateIntent::PlanAndState { plan, to, note }),
            (Some(plan), None) => Ok(UpdateIntent::PlanChange { plan, note }),
            (None, Some(to)) => Ok(UpdateIntent::StateChange { to, note }),
            (None, None) => match note {
                Some(note) => Ok(UpdateIntent::NoteOnly { note }),
                None => Err(Error::BadRequest(
                    "Nothing to update: supply a plan, a state or a note".to_string(),
                )),
            },
        }
    }

    #[must_use]
    pub fn plan(&self) -> Option<&PlanTarget> {
        match self {
            UpdateIntent::PlanChange { plan, .. } | UpdateIntent::PlanAndState { plan, .. } => {
                Some(plan)
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn target_state(&self) -> Option<TaskState> {
        match self {
            UpdateIntent::StateChange { to, .. } | UpdateIntent::PlanAndState { to, .. } => {
                Some(*to)
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn note(&self) -> Option<&str> {
        match self {
            UpdateIntent::NoteOnly { note } => Some(note),
            UpdateIntent::PlanChange { note, .. }
            | UpdateIntent::StateChange { note, .. }
            | UpdateIntent::PlanAndState { note, .. } => note.as_deref(),
        }
    }
}
