mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::types::*;
use crate::workflow::{NewTask, UpdateIntent, UpdateOutcome};

/// Store defines the database interface.
pub trait Store: Send + Sync {
    fn initialize(&self) -> Result<()>;

    // Account operations
    fn create_account(&self, account: &Account) -> Result<()>;
    fn get_account(&self, username: &str) -> Result<Option<Account>>;
    fn list_accounts(&self) -> Result<Vec<Account>>;
    fn update_account(&self, account: &Account) -> Result<()>;
    fn has_accounts(&self) -> Result<bool>;
    /// Distinct addresses of active accounts in any of `groups`.
    fn emails_for_groups(&self, groups: &GroupSet) -> Result<Vec<String>>;

    // Token operations
    fn create_token(&self, token: &Token) -> Result<()>;
    fn get_token_by_lookup(&self, lookup: &str) -> Result<Option<Token>>;
    fn delete_token(&self, id: &str) -> Result<bool>;
    fn update_token_last_used(&self, id: &str) -> Result<()>;

    // Application operations
    fn create_application(&self, app: &Application) -> Result<()>;
    fn get_application(&self, acronym: &str) -> Result<Option<Application>>;
    fn list_applications(&self) -> Result<Vec<Application>>;
    /// Updates everything except the acronym and revision counter.
    fn update_application(&self, app: &Application) -> Result<()>;

    // Plan operations
    fn create_plan(&self, plan: &Plan) -> Result<()>;
    fn get_plan(&self, name: &str) -> Result<Option<Plan>>;
    fn list_plans(&self, app_acronym: Option<&str>) -> Result<Vec<Plan>>;

    // Task reads, newest first then by name
    fn get_task(&self, name: &str) -> Result<Option<Task>>;
    fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>>;

    // Task workflow, each in a single write transaction
    fn create_task(&self, caller: &str, new: &NewTask) -> Result<Task>;
    fn update_task(
        &self,
        caller: &str,
        task_name: &str,
        intent: &UpdateIntent,
    ) -> Result<UpdateOutcome>;
    fn promote_task(&self, caller: &str, task_name: &str) -> Result<UpdateOutcome>;
    fn append_task_note(&self, caller: &str, task_name: &str, text: &str) -> Result<Task>;

    fn close(&self) -> Result<()>;
}
