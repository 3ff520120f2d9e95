pub const SCHEMA: &str = r#"
-- Accounts: group membership is the only authorization primitive
CREATE TABLE IF NOT EXISTS accounts (
    username TEXT PRIMARY KEY,
    email TEXT NOT NULL UNIQUE COLLATE NOCASE,
    password_hash TEXT NOT NULL,
    active INTEGER NOT NULL DEFAULT 1,
    group_list TEXT NOT NULL DEFAULT '',  -- comma-joined group names
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now'))
);

-- Bearer tokens issued at login
CREATE TABLE IF NOT EXISTS tokens (
    id TEXT PRIMARY KEY,
    token_hash TEXT NOT NULL,          -- argon2id hash with embedded salt
    token_lookup TEXT NOT NULL,        -- first 8 chars of a UUID for fast lookup
    username TEXT NOT NULL REFERENCES accounts(username) ON DELETE CASCADE,
    created_at TEXT DEFAULT (datetime('now')),
    expires_at TEXT,                   -- NULL = never
    last_used_at TEXT
);

-- Applications own tasks and the permit lists gating their workflow
CREATE TABLE IF NOT EXISTS applications (
    acronym TEXT PRIMARY KEY,
    description TEXT,
    revision INTEGER NOT NULL DEFAULT 0,  -- last minted task number
    start_date TEXT,
    end_date TEXT,
    permit_create TEXT NOT NULL DEFAULT '',
    permit_open TEXT NOT NULL DEFAULT '',
    permit_todo TEXT NOT NULL DEFAULT '',
    permit_doing TEXT NOT NULL DEFAULT '',
    permit_done TEXT NOT NULL DEFAULT '',
    created_at TEXT DEFAULT (datetime('now'))
);

-- Plans group tasks loosely; tasks reference them by name
CREATE TABLE IF NOT EXISTS plans (
    name TEXT PRIMARY KEY,
    app_acronym TEXT REFERENCES applications(acronym) ON DELETE SET NULL,
    start_date TEXT,
    end_date TEXT,
    created_at TEXT DEFAULT (datetime('now'))
);

-- Tasks are only written by the workflow engine
CREATE TABLE IF NOT EXISTS tasks (
    id TEXT PRIMARY KEY,               -- {app_acronym}_{revision}
    name TEXT NOT NULL UNIQUE,
    description TEXT,
    notes TEXT NOT NULL DEFAULT '',    -- append-only audit ledger
    plan TEXT,
    app_acronym TEXT NOT NULL REFERENCES applications(acronym),
    state TEXT NOT NULL DEFAULT 'Open'
        CHECK (state IN ('Open', 'ToDo', 'Doing', 'Done', 'Closed')),
    creator TEXT NOT NULL,
    owner TEXT,
    created_at TEXT NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_tokens_lookup ON tokens(token_lookup);
CREATE INDEX IF NOT EXISTS idx_tokens_username ON tokens(username);
CREATE INDEX IF NOT EXISTS idx_plans_app ON plans(app_acronym);
CREATE INDEX IF NOT EXISTS idx_tasks_app ON tasks(app_acronym);
CREATE INDEX IF NOT EXISTS idx_tasks_state ON tasks(state);
CREATE INDEX IF NOT EXISTS idx_tasks_plan ON tasks(plan);
CREATE INDEX IF NOT EXISTS idx_tasks_created ON tasks(created_at);
"#;
