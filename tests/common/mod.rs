#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tempfile::TempDir;

use tasktrack::auth::TokenGenerator;
use tasktrack::error::{Error, Result};
use tasktrack::notify::Mailer;
use tasktrack::store::{SqliteStore, Store};
use tasktrack::types::{Account, Application, GroupSet, PermitLists, Plan};

pub const PASSWORD: &str = "correct-horse";

pub struct TestDb {
    pub temp_dir: TempDir,
    pub store: Arc<SqliteStore>,
}

impl TestDb {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");
        let store = SqliteStore::new(Self::path_in(&temp_dir)).expect("open store");
        store.initialize().expect("initialize schema");
        Self {
            temp_dir,
            store: Arc::new(store),
        }
    }

    fn path_in(temp_dir: &TempDir) -> PathBuf {
        temp_dir.path().join("tasktrack.db")
    }

    pub fn db_path(&self) -> PathBuf {
        Self::path_in(&self.temp_dir)
    }

    /// A second, independent connection to the same database file.
    pub fn reopen(&self) -> SqliteStore {
        SqliteStore::new(self.db_path()).expect("reopen store")
    }
}

pub fn groups(names: &[&str]) -> GroupSet {
    names.iter().collect()
}

/// Stores an account with a cheap placeholder hash. Use
/// [`add_login_account`] when the test needs to log in.
pub fn add_account(store: &dyn Store, username: &str, group_names: &[&str]) -> Account {
    insert_account(store, username, group_names, "unused".to_string(), true)
}

pub fn add_login_account(store: &dyn Store, username: &str, group_names: &[&str]) -> Account {
    let hash = TokenGenerator::new()
        .hash_password(PASSWORD)
        .expect("hash password");
    insert_account(store, username, group_names, hash, true)
}

pub fn add_inactive_account(store: &dyn Store, username: &str, group_names: &[&str]) -> Account {
    insert_account(store, username, group_names, "unused".to_string(), false)
}

fn insert_account(
    store: &dyn Store,
    username: &str,
    group_names: &[&str],
    password_hash: String,
    active: bool,
) -> Account {
    let now = Utc::now();
    let account = Account {
        username: username.to_string(),
        email: format!("{username}@example.com"),
        password_hash,
        active,
        groups: groups(group_names),
        created_at: now,
        updated_at: now,
    };
    store.create_account(&account).expect("create account");
    account
}

pub fn add_application(store: &dyn Store, acronym: &str, permits: PermitLists) -> Application {
    let app = Application {
        acronym: acronym.to_string(),
        description: None,
        revision: 0,
        start_date: None,
        end_date: None,
        permits,
        created_at: Utc::now(),
    };
    store.create_application(&app).expect("create application");
    app
}

pub fn add_plan(store: &dyn Store, name: &str, app_acronym: &str) -> Plan {
    let plan = Plan {
        name: name.to_string(),
        app_acronym: Some(app_acronym.to_string()),
        start_date: None,
        end_date: None,
        created_at: Utc::now(),
    };
    store.create_plan(&plan).expect("create plan");
    plan
}

/// Permits used by most scenarios: Dev creates and releases, Eng works the
/// task, Lead approves.
pub fn standard_permits() -> PermitLists {
    PermitLists {
        create: groups(&["Dev"]),
        open: groups(&["Dev"]),
        todo: groups(&["Eng"]),
        doing: groups(&["Eng"]),
        done: groups(&["Lead"]),
    }
}

#[derive(Debug, Clone)]
pub struct SentMail {
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

/// Mailer that keeps every message in memory. A failing mailer records the
/// attempt and then reports a delivery error.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<SentMail>>,
    fail: bool,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::default(),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }
}

impl Mailer for RecordingMailer {
    fn send_mail(&self, to: &[String], subject: &str, body: &str) -> Result<()> {
        self.sent.lock().unwrap().push(SentMail {
            to: to.to_vec(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        if self.fail {
            return Err(Error::Io(std::io::Error::other("relay refused the message")));
        }
        Ok(())
    }
}
