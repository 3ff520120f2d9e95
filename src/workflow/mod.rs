//! Task lifecycle: the transition table, the group-based permission gate,
//! the audit note ledger, and the transactional operations built on them.
//!
//! The engine functions are generic over [`TaskTx`], so the same protocol
//! runs against SQLite in production and an in-memory double in tests.
//! Callers own the transaction: commit only on `Ok`, and dispatch any
//! returned [`ReviewNotice`](crate::notify::ReviewNotice) after commit.

mod engine;
mod gate;
mod membership;
mod notes;
mod request;
mod transitions;

pub use engine::{
    MAX_TASK_NAME_LEN, NewTask, TaskTx, UpdateOutcome, append_note, create_task, promote_to_done,
    update_task,
};
pub use gate::{PermitCategory, can_transition};
pub use membership::{GroupDirectory, is_member, is_member_of_any};
pub use notes::{NoteEntry, SEPARATOR, append_entry, parse_entries};
pub use request::{PlanTarget, UpdateIntent};
pub use transitions::{OwnerEffect, TRANSITIONS, Transition, Trigger, find_transition};
