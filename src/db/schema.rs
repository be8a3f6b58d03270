//! SQL DDL for initializing the assistant's storage.
//! SQLite-first design; can be adapted for other RDBMS.

/// SQLite schema with:
/// - `users.phone` UNIQUE so first-contact upserts cannot create duplicates
/// - `lists` UNIQUE on (user_id, name) for the lazy get-or-create path
/// - timestamps stored as RFC3339 text
/// - `reminders.active` BOOLEAN (stored as INTEGER 0/1)
/// - composite index backing the due-reminder sweep query
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    phone TEXT NOT NULL UNIQUE,
    name TEXT NULL
);

CREATE TABLE IF NOT EXISTS reminders (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id),
    text TEXT NOT NULL,
    due_at TEXT NOT NULL, -- RFC3339
    recurrence TEXT NULL, -- DAILY | WEEKLY
    active INTEGER NOT NULL DEFAULT 1,
    last_sent_at TEXT NULL -- RFC3339
);

CREATE INDEX IF NOT EXISTS idx_reminders_active_due ON reminders(active, due_at);

CREATE TABLE IF NOT EXISTS lists (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id),
    name TEXT NOT NULL,
    UNIQUE(user_id, name)
);

CREATE TABLE IF NOT EXISTS list_items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    list_id INTEGER NOT NULL REFERENCES lists(id),
    content TEXT NOT NULL,
    created_at TEXT NOT NULL -- RFC3339
);

CREATE INDEX IF NOT EXISTS idx_list_items_list_id ON list_items(list_id);
"#;
