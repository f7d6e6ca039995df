pub(crate) const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS users (
    user_id    INTEGER PRIMARY KEY AUTOINCREMENT,
    username   TEXT NOT NULL UNIQUE,
    is_deleted BOOLEAN NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS categories (
    category_id   INTEGER PRIMARY KEY AUTOINCREMENT,
    category_name TEXT NOT NULL UNIQUE,
    user_id       INTEGER NOT NULL REFERENCES users(user_id),
    is_deleted    BOOLEAN NOT NULL DEFAULT 0,
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS payment_methods (
    payment_method_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name              TEXT NOT NULL UNIQUE,
    is_deleted        BOOLEAN NOT NULL DEFAULT 0,
    created_at        TEXT NOT NULL,
    updated_at        TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS expenses (
    expense_id        INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id           INTEGER NOT NULL REFERENCES users(user_id),
    category_id       INTEGER NOT NULL REFERENCES categories(category_id),
    payment_method_id INTEGER NOT NULL REFERENCES payment_methods(payment_method_id),
    amount            TEXT NOT NULL,
    expense_date      TEXT NOT NULL,
    description       TEXT NOT NULL DEFAULT '',
    tag               TEXT NOT NULL,
    is_deleted        BOOLEAN NOT NULL DEFAULT 0,
    created_at        TEXT NOT NULL,
    updated_at        TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_expenses_updated ON expenses(updated_at);
CREATE INDEX IF NOT EXISTS idx_expenses_date ON expenses(expense_date);
CREATE INDEX IF NOT EXISTS idx_expenses_category ON expenses(category_id);

-- Reporting store. One row per live source expense, keyed by the source
-- expense id; written only by the sync step, read only by reports.
CREATE TABLE IF NOT EXISTS expense_reports (
    expense_id          INTEGER PRIMARY KEY,
    username            TEXT NOT NULL,
    category_name       TEXT NOT NULL,
    payment_method_name TEXT NOT NULL,
    amount              TEXT NOT NULL,
    expense_date        TEXT NOT NULL,
    description         TEXT NOT NULL DEFAULT '',
    tag                 TEXT NOT NULL,
    is_deleted          BOOLEAN NOT NULL DEFAULT 0,
    created_at          TEXT NOT NULL,
    updated_at          TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_reports_date ON expense_reports(expense_date);
CREATE INDEX IF NOT EXISTS idx_reports_category ON expense_reports(category_name);
CREATE INDEX IF NOT EXISTS idx_reports_method ON expense_reports(payment_method_name);
CREATE INDEX IF NOT EXISTS idx_reports_tag ON expense_reports(tag);

-- Singleton watermark row; created on first sync, advanced on every
-- successful sync thereafter.
CREATE TABLE IF NOT EXISTS sync_metadata (
    id             INTEGER PRIMARY KEY CHECK (id = 1),
    last_sync_time TEXT NOT NULL
);

"#;

pub(crate) const CURRENT_VERSION: i32 = 1;

/// Migrations from version N to N+1.
/// Each entry is (from_version, sql).
pub(crate) const MIGRATIONS: &[(i32, &str)] = &[
    // Future migrations go here:
    // (1, "ALTER TABLE expense_reports ADD COLUMN currency TEXT NOT NULL DEFAULT 'USD';"),
];
