//! SQL DDL for initializing the service database.
//! SQLite-first design; can be adapted for other RDBMS.

/// Per-table schema versions this build understands. Recorded in `schema_info` on first
/// connect and compared on every later connect.
pub const SCHEMA_VERSIONS: &[(&str, i64)] = &[("pipelines", 1), ("models", 1), ("resources", 1)];

/// SQLite schema includes:
/// - `schema_info` table (one row per versioned table)
/// - `pipelines` table (one description per name)
/// - `models` table (one row per (name, version), at most one active row per name)
/// - `resources` table (many paths per name, insertion ordered by `id`)
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS schema_info (
    name TEXT PRIMARY KEY NOT NULL,
    version INTEGER NOT NULL DEFAULT 1
);

-- ---------------------------------------------------------------------------
-- Pipeline descriptions
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS pipelines (
    name TEXT PRIMARY KEY NOT NULL,
    description TEXT NOT NULL CHECK (length(description) > 0)
);

-- ---------------------------------------------------------------------------
-- Models (versions assigned by the store, never by clients)
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS models (
    name TEXT NOT NULL,
    version INTEGER NOT NULL CHECK (version > 0),
    active INTEGER NOT NULL DEFAULT 0,
    path TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    app_info TEXT NOT NULL DEFAULT '',
    PRIMARY KEY (name, version)
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_models_single_active ON models(name) WHERE active = 1;

-- ---------------------------------------------------------------------------
-- Resources (one (name, path) per row)
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS resources (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    path TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    app_info TEXT NOT NULL DEFAULT '',
    UNIQUE(name, path)
);
"#;
