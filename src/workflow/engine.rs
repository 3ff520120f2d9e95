use chrono::{DateTime, Local, Utc};

use super::gate::{PermitCategory, can_transition};
use super::membership::GroupDirectory;
use super::notes::append_entry;
use super::request::UpdateIntent;
use super::transitions::{Trigger, find_transition};
use crate::error::{Error, Result};
use crate::notify::ReviewNotice;
use crate::types::{Application, Task, TaskState};

pub const MAX_TASK_NAME_LEN: usize = 50;

/// Reads and writes available to the engine inside one transaction.
///
/// Implementations must hold a write lock on every task and application
/// row they return until the transaction ends, and `update_state` must be
/// conditional on the expected current state.
pub trait TaskTx: GroupDirectory {
    fn lock_task(&self, name: &str) -> Result<Option<Task>>;
    fn lock_application(&self, acronym: &str) -> Result<Option<Application>>;
    fn plan_exists(&self, name: &str) -> Result<bool>;
    fn task_name_taken(&self, name: &str) -> Result<bool>;

    /// Increments the application's revision counter and returns the new value.
    fn bump_revision(&self, acronym: &str) -> Result<i64>;
    fn insert_task(&self, task: &Task) -> Result<()>;

    /// Moves the task from `expected` to `to` and sets the owner.
    /// Returns the number of rows changed.
    fn update_state(
        &self,
        id: &str,
        expected: TaskState,
        to: TaskState,
        owner: Option<&str>,
    ) -> Result<usize>;
    fn update_plan(&self, id: &str, plan: Option<&str>) -> Result<()>;
    fn update_notes(&self, id: &str, notes: &str) -> Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub name: String,
    pub description: Option<String>,
    pub app_acronym: String,
    pub plan: Option<String>,
    pub owner: Option<String>,
    pub note: Option<String>,
}

impl NewTask {
    /// Checks that need no database access.
    pub fn validate(&self) -> Result<()> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(Error::BadRequest("Task name is required".to_string()));
        }
        if name.chars().count() > MAX_TASK_NAME_LEN {
            return Err(Error::BadRequest(format!(
                "Task name cannot exceed {MAX_TASK_NAME_LEN} characters"
            )));
        }
        if self.app_acronym.trim().is_empty() {
            return Err(Error::BadRequest("Application acronym is required".to_string()));
        }
        if self.owner.as_deref().is_some_and(|o| !o.trim().is_empty()) {
            return Err(Error::BadRequest(
                "A task owner is assigned by taking the task, not at creation".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct UpdateOutcome {
    pub task: Task,
    /// Set when the update was a review; dispatch only after commit.
    pub notice: Option<ReviewNotice>,
}

fn task_not_found(name: &str) -> Error {
    Error::NotFound(format!("Task '{name}' not found"))
}

fn require_permit<T: TaskTx + ?Sized>(
    tx: &T,
    caller: &str,
    app: &Application,
    category: PermitCategory,
    action: &str,
) -> Result<()> {
    if can_transition(tx, caller, app, category)? {
        return Ok(());
    }

    tracing::debug!(
        "{caller} denied: {category} permit on {} required to {action}",
        app.acronym
    );
    Err(Error::Forbidden(format!(
        "{category} permit on application '{}' is required to {action}",
        app.acronym
    )))
}

/// Creates a task in Open with a freshly minted `{acronym}_{revision}` id.
pub fn create_task<T: TaskTx + ?Sized>(
    tx: &T,
    caller: &str,
    new: &NewTask,
    now: DateTime<Local>,
) -> Result<Task> {
    let app = tx
        .lock_application(&new.app_acronym)?
        .ok_or_else(|| Error::NotFound(format!("Application '{}' not found", new.app_acronym)))?;

    require_permit(tx, caller, &app, PermitCategory::Create, "create tasks")?;

    let name = new.name.trim();
    if tx.task_name_taken(name)? {
        return Err(Error::AlreadyExists(format!("Task name '{name}' is already in use")));
    }

    let plan = new
        .plan
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty());
    if let Some(plan) = plan {
        if !tx.plan_exists(plan)? {
            return Err(Error::NotFound(format!("Plan '{plan}' not found")));
        }
    }

    let revision = tx.bump_revision(&app.acronym)?;
    let stamp = now.naive_local();

    let mut notes = append_entry(None, caller, "Task created.", TaskState::Open, stamp);
    if let Some(note) = new.note.as_deref().filter(|n| !n.trim().is_empty()) {
        notes = append_entry(Some(&notes), caller, note, TaskState::Open, stamp);
    }

    let task = Task {
        id: format!("{}_{}", app.acronym, revision),
        name: name.to_string(),
        description: new.description.clone(),
        notes,
        plan: plan.map(str::to_string),
        app_acronym: app.acronym.clone(),
        state: TaskState::Open,
        creator: caller.to_string(),
        owner: None,
        created_at: now.with_timezone(&Utc),
    };
    tx.insert_task(&task)?;

    tracing::info!("task {} '{}' created by {caller}", task.id, task.name);
    Ok(task)
}

/// Applies a plan change, a state transition and/or a note to a task.
pub fn update_task<T: TaskTx + ?Sized>(
    tx: &T,
    caller: &str,
    task_name: &str,
    intent: &UpdateIntent,
    now: DateTime<Local>,
) -> Result<UpdateOutcome> {
    let task = tx.lock_task(task_name)?.ok_or_else(|| task_not_found(task_name))?;
    apply_intent(tx, caller, task, intent, now)
}

/// Doing→Done only; any other current state is a bad request.
pub fn promote_to_done<T: TaskTx + ?Sized>(
    tx: &T,
    caller: &str,
    task_name: &str,
    now: DateTime<Local>,
) -> Result<UpdateOutcome> {
    let task = tx.lock_task(task_name)?.ok_or_else(|| task_not_found(task_name))?;
    if task.state != TaskState::Doing {
        return Err(Error::BadRequest(format!(
            "Task '{}' is {}; only tasks in Doing can be promoted to Done",
            task.name, task.state
        )));
    }

    let intent = UpdateIntent::StateChange {
        to: TaskState::Done,
        note: None,
    };
    apply_intent(tx, caller, task, &intent, now)
}

/// Appends a free-form note stamped with the task's current state.
pub fn append_note<T: TaskTx + ?Sized>(
    tx: &T,
    caller: &str,
    task_name: &str,
    text: &str,
    now: DateTime<Local>,
) -> Result<Task> {
    if text.trim().is_empty() {
        return Err(Error::BadRequest("Note text is required".to_string()));
    }

    let mut task = tx.lock_task(task_name)?.ok_or_else(|| task_not_found(task_name))?;
    task.notes = append_entry(Some(&task.notes), caller, text, task.state, now.naive_local());
    tx.update_notes(&task.id, &task.notes)?;
    Ok(task)
}

fn describe_plan(plan: Option<&str>) -> &str {
    plan.unwrap_or("none")
}

fn apply_intent<T: TaskTx + ?Sized>(
    tx: &T,
    caller: &str,
    task: Task,
    intent: &UpdateIntent,
    now: DateTime<Local>,
) -> Result<UpdateOutcome> {
    let app = tx
        .lock_application(&task.app_acronym)?
        .ok_or_else(|| Error::NotFound(format!("Application '{}' not found", task.app_acronym)))?;

    let stamp = now.naive_local();
    let mut updated = task.clone();
    let mut notice = None;

    if let Some(plan) = intent.plan() {
        let category = match task.state {
            TaskState::Open => PermitCategory::Open,
            TaskState::Done => PermitCategory::Done,
            other => {
                return Err(Error::stale(format!(
                    "The plan can only be changed while a task is Open or Done, but '{}' is {other}",
                    task.name
                )));
            }
        };
        require_permit(tx, caller, &app, category, "change the plan")?;

        if let Some(name) = plan {
            if !tx.plan_exists(name)? {
                return Err(Error::NotFound(format!("Plan '{name}' not found")));
            }
        }
        tx.update_plan(&task.id, plan.as_deref())?;

        // A bare plan change is silent; only log a real change alongside a
        // transition.
        if intent.target_state().is_some() && plan.as_deref() != task.plan.as_deref() {
            let text = format!(
                "Plan changed from {} to {}.",
                describe_plan(task.plan.as_deref()),
                describe_plan(plan.as_deref())
            );
            updated.notes = append_entry(Some(&updated.notes), caller, &text, task.state, stamp);
        }
        updated.plan = plan.clone();
    }

    if let Some(to) = intent.target_state() {
        let transition = find_transition(task.state, to).ok_or_else(|| {
            Error::stale(format!("Task '{}' cannot move from {} to {to}", task.name, task.state))
        })?;

        require_permit(
            tx,
            caller,
            &app,
            transition.permit,
            &format!("move a task from {} to {}", transition.from, transition.to),
        )?;

        let owner = transition.next_owner(task.owner.as_deref(), caller);
        let changed = tx.update_state(&task.id, transition.from, transition.to, owner.as_deref())?;
        if changed != 1 {
            tracing::warn!(
                "lost update on task {}: expected {}, {changed} rows changed",
                task.id,
                transition.from
            );
            return Err(Error::stale(format!(
                "Task '{}' is no longer in {}",
                task.name, transition.from
            )));
        }

        updated.state = to;
        updated.owner = owner;
        updated.notes = append_entry(Some(&updated.notes), caller, transition.audit, to, stamp);

        tracing::info!("task {} {} -> {} by {caller}", task.id, transition.from, to);

        if transition.trigger == Trigger::Review {
            notice = Some(ReviewNotice {
                task_id: task.id.clone(),
                task_name: task.name.clone(),
                app_acronym: app.acronym.clone(),
                reviewer: caller.to_string(),
                groups: app.permits.done.clone(),
            });
        }
    }

    if let Some(text) = intent.note() {
        updated.notes = append_entry(Some(&updated.notes), caller, text, updated.state, stamp);
    }

    if updated.notes != task.notes {
        tx.update_notes(&task.id, &updated.notes)?;
    }

    Ok(UpdateOutcome {
        task: updated,
        notice,
    })
}
