//! Database Migrations
//!
//! Schema migration definitions for the record store.

/// Migration definitions
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "Initial schema: items and review plans",
        up: MIGRATION_V1_UP,
    },
    Migration {
        version: 2,
        description: "Track longest-streak high-water mark on items",
        up: MIGRATION_V2_UP,
    },
];

/// A database migration
#[derive(Debug, Clone)]
pub struct Migration {
    /// Version number
    pub version: u32,
    /// Description
    pub description: &'static str,
    /// SQL to apply
    pub up: &'static str,
}

/// V1: Initial schema
const MIGRATION_V1_UP: &str = r#"
CREATE TABLE IF NOT EXISTS items (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    category TEXT NOT NULL DEFAULT 'general',

    -- Aggregates maintained on every completed review
    mastery INTEGER NOT NULL DEFAULT 0,
    total_reviews INTEGER NOT NULL DEFAULT 0,
    average_score REAL NOT NULL DEFAULT 0.0,
    streak_count INTEGER NOT NULL DEFAULT 0,

    last_practiced_at TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_items_category ON items(category);

-- Plans reference items through item_id. No FK constraint: an orphaned plan
-- is a data-integrity gap the scheduler surfaces defensively instead of a
-- write the store rejects.
CREATE TABLE IF NOT EXISTS review_plans (
    id TEXT PRIMARY KEY,
    item_id TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending',

    -- SM-2 state
    interval_level INTEGER NOT NULL DEFAULT 0,
    ease_factor REAL NOT NULL DEFAULT 2.5,
    difficulty_adjustment REAL NOT NULL DEFAULT 1.0,

    -- Scheduling
    scheduled_at TEXT NOT NULL,

    -- Outcome, set on completion
    score INTEGER,
    confidence TEXT,
    time_spent_secs INTEGER,
    completed_at TEXT,

    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_plans_item ON review_plans(item_id);
CREATE INDEX IF NOT EXISTS idx_plans_status ON review_plans(status);
CREATE INDEX IF NOT EXISTS idx_plans_scheduled ON review_plans(scheduled_at);

-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL
);

INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (1, datetime('now'));
"#;

/// V2: Longest-streak high-water mark
/// streak_count resets on every lapse; reporting wants the best run too.
const MIGRATION_V2_UP: &str = r#"
ALTER TABLE items ADD COLUMN longest_streak INTEGER NOT NULL DEFAULT 0;

UPDATE items SET longest_streak = streak_count;

UPDATE schema_version SET version = 2, applied_at = datetime('now');
"#;

/// Get current schema version from database
pub fn get_current_version(conn: &rusqlite::Connection) -> rusqlite::Result<u32> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .or(Ok(0))
}

/// Apply pending migrations
pub fn apply_migrations(conn: &rusqlite::Connection) -> rusqlite::Result<u32> {
    let current_version = get_current_version(conn)?;
    let mut applied = 0;

    for migration in MIGRATIONS {
        if migration.version > current_version {
            tracing::info!(
                "Applying migration v{}: {}",
                migration.version,
                migration.description
            );

            // execute_batch handles multi-statement SQL
            conn.execute_batch(migration.up)?;

            applied += 1;
        }
    }

    Ok(applied)
}
