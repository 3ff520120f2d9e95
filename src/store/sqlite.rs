use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Local, NaiveDate, Utc};
use rusqlite::types::ToSql;
use rusqlite::{Connection, OptionalExtension, Row, Transaction, TransactionBehavior, params};

use super::Store;
use super::schema::SCHEMA;
use crate::error::{Error, Result};
use crate::types::*;
use crate::workflow::{self, GroupDirectory, NewTask, TaskTx, UpdateIntent, UpdateOutcome};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const ACCOUNT_COLUMNS: &str =
    "username, email, password_hash, active, group_list, created_at, updated_at";
const TOKEN_COLUMNS: &str =
    "id, token_hash, token_lookup, username, created_at, expires_at, last_used_at";
const APPLICATION_COLUMNS: &str = "acronym, description, revision, start_date, end_date, \
     permit_create, permit_open, permit_todo, permit_doing, permit_done, created_at";
const PLAN_COLUMNS: &str = "name, app_acronym, start_date, end_date, created_at";
const TASK_COLUMNS: &str =
    "id, name, description, notes, plan, app_acronym, state, creator, owner, created_at";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.busy_timeout(BUSY_TIMEOUT)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Runs `f` inside a write transaction. `BEGIN IMMEDIATE` takes the
    /// database write lock up front, so every row read in `f` stays locked
    /// against other writers until commit. Any error rolls back.
    fn write_tx<T>(&self, f: impl FnOnce(&Transaction<'_>) -> Result<T>) -> Result<T> {
        let mut conn = self.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Handle SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn parse_date(s: Option<String>) -> Option<NaiveDate> {
    let s = s?;
    NaiveDate::parse_from_str(&s, "%Y-%m-%d")
        .map_err(|e| tracing::error!("Invalid date in database: '{}' - {}", s, e))
        .ok()
}

fn format_date(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format("%Y-%m-%d").to_string())
}

/// Maps a unique-constraint failure to `AlreadyExists(what)`.
fn map_constraint(e: rusqlite::Error, what: impl FnOnce() -> String) -> Error {
    match e {
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Error::AlreadyExists(what())
        }
        e => Error::from(e),
    }
}

fn account_from_row(row: &Row<'_>) -> rusqlite::Result<Account> {
    Ok(Account {
        username: row.get(0)?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        active: row.get(3)?,
        groups: row.get(4)?,
        created_at: parse_datetime(&row.get::<_, String>(5)?),
        updated_at: parse_datetime(&row.get::<_, String>(6)?),
    })
}

fn token_from_row(row: &Row<'_>) -> rusqlite::Result<Token> {
    Ok(Token {
        id: row.get(0)?,
        token_hash: row.get(1)?,
        token_lookup: row.get(2)?,
        username: row.get(3)?,
        created_at: parse_datetime(&row.get::<_, String>(4)?),
        expires_at: row.get::<_, Option<String>>(5)?.map(|s| parse_datetime(&s)),
        last_used_at: row.get::<_, Option<String>>(6)?.map(|s| parse_datetime(&s)),
    })
}

fn application_from_row(row: &Row<'_>) -> rusqlite::Result<Application> {
    Ok(Application {
        acronym: row.get(0)?,
        description: row.get(1)?,
        revision: row.get(2)?,
        start_date: parse_date(row.get(3)?),
        end_date: parse_date(row.get(4)?),
        permits: PermitLists {
            create: row.get(5)?,
            open: row.get(6)?,
            todo: row.get(7)?,
            doing: row.get(8)?,
            done: row.get(9)?,
        },
        created_at: parse_datetime(&row.get::<_, String>(10)?),
    })
}

fn plan_from_row(row: &Row<'_>) -> rusqlite::Result<Plan> {
    Ok(Plan {
        name: row.get(0)?,
        app_acronym: row.get(1)?,
        start_date: parse_date(row.get(2)?),
        end_date: parse_date(row.get(3)?),
        created_at: parse_datetime(&row.get::<_, String>(4)?),
    })
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        notes: row.get(3)?,
        plan: row.get(4)?,
        app_acronym: row.get(5)?,
        state: row.get(6)?,
        creator: row.get(7)?,
        owner: row.get(8)?,
        created_at: parse_datetime(&row.get::<_, String>(9)?),
    })
}

fn query_task(conn: &Connection, name: &str) -> Result<Option<Task>> {
    conn.query_row(
        &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE name = ?1"),
        params![name],
        task_from_row,
    )
    .optional()
    .map_err(Error::from)
}

fn query_application(conn: &Connection, acronym: &str) -> Result<Option<Application>> {
    conn.query_row(
        &format!("SELECT {APPLICATION_COLUMNS} FROM applications WHERE acronym = ?1"),
        params![acronym],
        application_from_row,
    )
    .optional()
    .map_err(Error::from)
}

impl GroupDirectory for Transaction<'_> {
    fn account_groups(&self, username: &str) -> Result<Option<GroupSet>> {
        self.query_row(
            "SELECT group_list FROM accounts WHERE username = ?1",
            params![username],
            |row| row.get(0),
        )
        .optional()
        .map_err(Error::from)
    }
}

impl TaskTx for Transaction<'_> {
    fn lock_task(&self, name: &str) -> Result<Option<Task>> {
        query_task(self, name)
    }

    fn lock_application(&self, acronym: &str) -> Result<Option<Application>> {
        query_application(self, acronym)
    }

    fn plan_exists(&self, name: &str) -> Result<bool> {
        let count: i64 = self.query_row(
            "SELECT COUNT(*) FROM plans WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn task_name_taken(&self, name: &str) -> Result<bool> {
        let count: i64 = self.query_row(
            "SELECT COUNT(*) FROM tasks WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn bump_revision(&self, acronym: &str) -> Result<i64> {
        self.query_row(
            "UPDATE applications SET revision = revision + 1 WHERE acronym = ?1 RETURNING revision",
            params![acronym],
            |row| row.get(0),
        )
        .optional()?
        .ok_or_else(|| Error::NotFound(format!("Application '{acronym}' not found")))
    }

    fn insert_task(&self, task: &Task) -> Result<()> {
        self.execute(
            "INSERT INTO tasks (id, name, description, notes, plan, app_acronym, state, creator, owner, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                task.id,
                task.name,
                task.description,
                task.notes,
                task.plan,
                task.app_acronym,
                task.state,
                task.creator,
                task.owner,
                format_datetime(&task.created_at),
            ],
        )
        .map_err(|e| map_constraint(e, || format!("Task '{}' already exists", task.name)))?;
        Ok(())
    }

    fn update_state(
        &self,
        id: &str,
        expected: TaskState,
        to: TaskState,
        owner: Option<&str>,
    ) -> Result<usize> {
        let rows = self.execute(
            "UPDATE tasks SET state = ?1, owner = ?2 WHERE id = ?3 AND state = ?4",
            params![to, owner, id, expected],
        )?;
        Ok(rows)
    }

    fn update_plan(&self, id: &str, plan: Option<&str>) -> Result<()> {
        let rows = self.execute(
            "UPDATE tasks SET plan = ?1 WHERE id = ?2",
            params![plan, id],
        )?;
        if rows == 0 {
            return Err(Error::NotFound(format!("Task '{id}' not found")));
        }
        Ok(())
    }

    fn update_notes(&self, id: &str, notes: &str) -> Result<()> {
        let rows = self.execute(
            "UPDATE tasks SET notes = ?1 WHERE id = ?2",
            params![notes, id],
        )?;
        if rows == 0 {
            return Err(Error::NotFound(format!("Task '{id}' not found")));
        }
        Ok(())
    }
}

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    // Account operations

    fn create_account(&self, account: &Account) -> Result<()> {
        self.conn()
            .execute(
                "INSERT INTO accounts (username, email, password_hash, active, group_list, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    account.username,
                    account.email,
                    account.password_hash,
                    account.active,
                    account.groups,
                    format_datetime(&account.created_at),
                    format_datetime(&account.updated_at),
                ],
            )
            .map_err(|e| map_constraint(e, || "Username or email already in use".to_string()))?;
        Ok(())
    }

    fn get_account(&self, username: &str) -> Result<Option<Account>> {
        self.conn()
            .query_row(
                &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE username = ?1"),
                params![username],
                account_from_row,
            )
            .optional()
            .map_err(Error::from)
    }

    fn list_accounts(&self) -> Result<Vec<Account>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY username"
        ))?;

        let rows = stmt.query_map([], account_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_account(&self, account: &Account) -> Result<()> {
        let rows = self
            .conn()
            .execute(
                "UPDATE accounts SET email = ?1, password_hash = ?2, active = ?3, group_list = ?4, updated_at = ?5
                 WHERE username = ?6",
                params![
                    account.email,
                    account.password_hash,
                    account.active,
                    account.groups,
                    format_datetime(&account.updated_at),
                    account.username,
                ],
            )
            .map_err(|e| map_constraint(e, || "Email already in use".to_string()))?;

        if rows == 0 {
            return Err(Error::NotFound(format!(
                "Account '{}' not found",
                account.username
            )));
        }
        Ok(())
    }

    fn has_accounts(&self) -> Result<bool> {
        let count: i64 = self
            .conn()
            .query_row("SELECT COUNT(*) FROM accounts", [], |row| row.get(0))?;
        Ok(count > 0)
    }

    fn emails_for_groups(&self, groups: &GroupSet) -> Result<Vec<String>> {
        if groups.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT email, group_list FROM accounts WHERE active = 1")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, GroupSet>(1)?))
        })?;

        let mut emails = BTreeSet::new();
        for row in rows {
            let (email, held) = row?;
            if held.intersects(groups) {
                emails.insert(email.trim().to_lowercase());
            }
        }
        Ok(emails.into_iter().collect())
    }

    // Token operations

    fn create_token(&self, token: &Token) -> Result<()> {
        let result = self.conn().execute(
            "INSERT INTO tokens (id, token_hash, token_lookup, username, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                token.id,
                token.token_hash,
                token.token_lookup,
                token.username,
                format_datetime(&token.created_at),
                token.expires_at.as_ref().map(format_datetime),
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(Error::TokenLookupCollision)
            }
            Err(e) => Err(Error::from(e)),
        }
    }

    fn get_token_by_lookup(&self, lookup: &str) -> Result<Option<Token>> {
        self.conn()
            .query_row(
                &format!("SELECT {TOKEN_COLUMNS} FROM tokens WHERE token_lookup = ?1"),
                params![lookup],
                token_from_row,
            )
            .optional()
            .map_err(Error::from)
    }

    fn delete_token(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM tokens WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn update_token_last_used(&self, id: &str) -> Result<()> {
        self.conn().execute(
            "UPDATE tokens SET last_used_at = ?1 WHERE id = ?2",
            params![format_datetime(&Utc::now()), id],
        )?;
        Ok(())
    }

    // Application operations

    fn create_application(&self, app: &Application) -> Result<()> {
        self.conn()
            .execute(
                "INSERT INTO applications (acronym, description, revision, start_date, end_date,
                     permit_create, permit_open, permit_todo, permit_doing, permit_done, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    app.acronym,
                    app.description,
                    app.revision,
                    format_date(app.start_date),
                    format_date(app.end_date),
                    app.permits.create,
                    app.permits.open,
                    app.permits.todo,
                    app.permits.doing,
                    app.permits.done,
                    format_datetime(&app.created_at),
                ],
            )
            .map_err(|e| {
                map_constraint(e, || format!("Application '{}' already exists", app.acronym))
            })?;
        Ok(())
    }

    fn get_application(&self, acronym: &str) -> Result<Option<Application>> {
        query_application(&self.conn(), acronym)
    }

    fn list_applications(&self) -> Result<Vec<Application>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications ORDER BY acronym"
        ))?;

        let rows = stmt.query_map([], application_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_application(&self, app: &Application) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE applications SET description = ?1, start_date = ?2, end_date = ?3,
                 permit_create = ?4, permit_open = ?5, permit_todo = ?6, permit_doing = ?7, permit_done = ?8
             WHERE acronym = ?9",
            params![
                app.description,
                format_date(app.start_date),
                format_date(app.end_date),
                app.permits.create,
                app.permits.open,
                app.permits.todo,
                app.permits.doing,
                app.permits.done,
                app.acronym,
            ],
        )?;

        if rows == 0 {
            return Err(Error::NotFound(format!(
                "Application '{}' not found",
                app.acronym
            )));
        }
        Ok(())
    }

    // Plan operations

    fn create_plan(&self, plan: &Plan) -> Result<()> {
        self.conn()
            .execute(
                "INSERT INTO plans (name, app_acronym, start_date, end_date, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    plan.name,
                    plan.app_acronym,
                    format_date(plan.start_date),
                    format_date(plan.end_date),
                    format_datetime(&plan.created_at),
                ],
            )
            .map_err(|e| map_constraint(e, || format!("Plan '{}' already exists", plan.name)))?;
        Ok(())
    }

    fn get_plan(&self, name: &str) -> Result<Option<Plan>> {
        self.conn()
            .query_row(
                &format!("SELECT {PLAN_COLUMNS} FROM plans WHERE name = ?1"),
                params![name],
                plan_from_row,
            )
            .optional()
            .map_err(Error::from)
    }

    fn list_plans(&self, app_acronym: Option<&str>) -> Result<Vec<Plan>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {PLAN_COLUMNS} FROM plans
             WHERE ?1 IS NULL OR app_acronym = ?1
             ORDER BY name"
        ))?;

        let rows = stmt.query_map(params![app_acronym], plan_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    // Task reads

    fn get_task(&self, name: &str) -> Result<Option<Task>> {
        query_task(&self.conn(), name)
    }

    fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        let mut sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE 1 = 1");
        let mut args: Vec<&dyn ToSql> = Vec::new();

        if let Some(app) = &filter.app {
            sql.push_str(" AND app_acronym = ?");
            args.push(app);
        }
        if let Some(state) = &filter.state {
            sql.push_str(" AND state = ?");
            args.push(state);
        }
        if let Some(plan) = &filter.plan {
            sql.push_str(" AND plan = ?");
            args.push(plan);
        }
        sql.push_str(" ORDER BY created_at DESC, name ASC");

        let conn = self.conn();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(args.as_slice(), task_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    // Task workflow

    fn create_task(&self, caller: &str, new: &NewTask) -> Result<Task> {
        new.validate()?;
        self.write_tx(|tx| workflow::create_task(tx, caller, new, Local::now()))
    }

    fn update_task(
        &self,
        caller: &str,
        task_name: &str,
        intent: &UpdateIntent,
    ) -> Result<UpdateOutcome> {
        self.write_tx(|tx| workflow::update_task(tx, caller, task_name, intent, Local::now()))
    }

    fn promote_task(&self, caller: &str, task_name: &str) -> Result<UpdateOutcome> {
        self.write_tx(|tx| workflow::promote_to_done(tx, caller, task_name, Local::now()))
    }

    fn append_task_note(&self, caller: &str, task_name: &str, text: &str) -> Result<Task> {
        if text.trim().is_empty() {
            return Err(Error::BadRequest("Note text is required".to_string()));
        }
        self.write_tx(|tx| workflow::append_note(tx, caller, task_name, text, Local::now()))
    }

    fn close(&self) -> Result<()> {
        self.conn().execute_batch("PRAGMA optimize")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, SqliteStore) {
        let temp = TempDir::new().unwrap();
        let store = SqliteStore::new(temp.path().join("test.db")).unwrap();
        store.initialize().unwrap();
        (temp, store)
    }

    fn account(username: &str, email: &str, groups: &str) -> Account {
        Account {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            active: true,
            groups: GroupSet::parse(groups),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn application(acronym: &str) -> Application {
        Application {
            acronym: acronym.to_string(),
            description: Some("Test app".to_string()),
            revision: 0,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            end_date: None,
            permits: PermitLists {
                create: GroupSet::parse("PM"),
                open: GroupSet::parse("PM,Dev"),
                ..PermitLists::default()
            },
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_initialize_creates_tables() {
        let (_temp, store) = store();

        let conn = store.conn();
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();

        for table in ["accounts", "tokens", "applications", "plans", "tasks"] {
            assert!(tables.contains(&table.to_string()), "missing {table}");
        }
    }

    #[test]
    fn test_account_groups_round_trip_through_storage() {
        let (_temp, store) = store();
        store.create_account(&account("alice", "alice@example.com", " Dev, QA ")).unwrap();

        let fetched = store.get_account("alice").unwrap().unwrap();
        assert_eq!(fetched.groups, GroupSet::parse("Dev,QA"));

        let raw: String = store
            .conn()
            .query_row("SELECT group_list FROM accounts WHERE username = 'alice'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(raw, "Dev,QA");
    }

    #[test]
    fn test_email_unique_case_insensitive() {
        let (_temp, store) = store();
        store.create_account(&account("a", "Same@Example.com", "")).unwrap();

        let result = store.create_account(&account("b", "same@example.com", ""));
        assert!(matches!(result, Err(Error::AlreadyExists(_))));
    }

    #[test]
    fn test_emails_for_groups() {
        let (_temp, store) = store();
        store.create_account(&account("l1", "Lead1@example.com", "Lead")).unwrap();
        store.create_account(&account("l2", "lead2@example.com", "lead,Dev")).unwrap();
        store.create_account(&account("d1", "dev@example.com", "Dev")).unwrap();
        let mut inactive = account("l3", "gone@example.com", "Lead");
        inactive.active = false;
        store.create_account(&inactive).unwrap();

        let emails = store.emails_for_groups(&GroupSet::parse("Lead")).unwrap();
        assert_eq!(emails, vec!["lead1@example.com", "lead2@example.com"]);

        assert!(store.emails_for_groups(&GroupSet::new()).unwrap().is_empty());
        assert!(store.emails_for_groups(&GroupSet::parse("Nobody")).unwrap().is_empty());
    }

    #[test]
    fn test_application_crud_keeps_revision() {
        let (_temp, store) = store();
        store.create_application(&application("APP")).unwrap();

        let dup = store.create_application(&application("APP"));
        assert!(matches!(dup, Err(Error::AlreadyExists(_))));

        let mut app = store.get_application("APP").unwrap().unwrap();
        assert_eq!(app.start_date, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(app.permits.open, GroupSet::parse("Dev,PM"));

        app.revision = 99;
        app.permits.done = GroupSet::parse("Lead");
        store.update_application(&app).unwrap();

        let fetched = store.get_application("APP").unwrap().unwrap();
        assert_eq!(fetched.revision, 0);
        assert_eq!(fetched.permits.done, GroupSet::parse("Lead"));
    }

    #[test]
    fn test_failed_transition_rolls_back() {
        let (_temp, store) = store();
        store.create_account(&account("pam", "pam@example.com", "PM")).unwrap();
        store.create_application(&application("APP")).unwrap();

        let new = NewTask {
            name: "task".to_string(),
            app_acronym: "APP".to_string(),
            ..NewTask::default()
        };
        let task = store.create_task("pam", &new).unwrap();
        assert_eq!(task.id, "APP_1");

        // The plan change succeeds inside the transaction, then the
        // transition fails; neither may persist.
        store
            .create_plan(&Plan {
                name: "P".to_string(),
                app_acronym: None,
                start_date: None,
                end_date: None,
                created_at: Utc::now(),
            })
            .unwrap();
        let intent = UpdateIntent::PlanAndState {
            plan: Some("P".to_string()),
            to: TaskState::Done,
            note: Some("should vanish".to_string()),
        };
        let err = store.update_task("pam", "task", &intent).unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));

        let stored = store.get_task("task").unwrap().unwrap();
        assert_eq!(stored.plan, None);
        assert_eq!(stored.state, TaskState::Open);
        assert!(!stored.notes.contains("should vanish"));
    }

    #[test]
    fn test_token_lookup_collision() {
        let (_temp, store) = store();
        store.create_account(&account("a", "a@example.com", "")).unwrap();

        let token = |id: &str| Token {
            id: id.to_string(),
            token_hash: "hash".to_string(),
            token_lookup: "lookup12".to_string(),
            username: "a".to_string(),
            created_at: Utc::now(),
            expires_at: None,
            last_used_at: None,
        };
        store.create_token(&token("token-1")).unwrap();

        let result = store.create_token(&token("token-2"));
        assert!(matches!(result, Err(Error::TokenLookupCollision)));
    }
}
