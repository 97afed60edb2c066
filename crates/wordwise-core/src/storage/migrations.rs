//! Database Migrations
//!
//! Schema migration definitions for the storage layer.

/// Migration definitions
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "Initial schema: vocabulary words with SRS state",
        up: MIGRATION_V1_UP,
    },
    Migration {
        version: 2,
        description: "Unknown words list",
        up: MIGRATION_V2_UP,
    },
    Migration {
        version: 3,
        description: "Daily study progress (streak and points)",
        up: MIGRATION_V3_UP,
    },
    Migration {
        version: 4,
        description: "Key words by identifier kind and value",
        up: MIGRATION_V4_UP,
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
///
/// `seq` keeps insertion order; `id` is the identifier key as text with
/// `id_kind` recording whether it was numeric. Timestamps are fixed-width
/// RFC 3339 (`...T..:..:...ffffffZ`) so text comparison is time order.
const MIGRATION_V1_UP: &str = r#"
CREATE TABLE IF NOT EXISTS vocabulary_words (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    id_kind TEXT NOT NULL DEFAULT 'text',
    word TEXT NOT NULL,

    part_of_speech TEXT,
    meaning TEXT,
    example_source TEXT,
    example_target TEXT,
    synonyms TEXT NOT NULL DEFAULT '[]',
    antonyms TEXT NOT NULL DEFAULT '[]',
    other_forms TEXT,
    status TEXT NOT NULL DEFAULT 'new',

    -- Spaced repetition state
    mastery_level INTEGER NOT NULL DEFAULT 0,
    next_review_at TEXT,
    last_reviewed_at TEXT,

    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_words_next_review ON vocabulary_words(next_review_at);
CREATE INDEX IF NOT EXISTS idx_words_word ON vocabulary_words(word);

-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL
);

INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (1, datetime('now'));
"#;

/// V2: Unknown words the learner wants to drill separately
///
/// Keyed by headword, holds a JSON snapshot of the word when it was added.
const MIGRATION_V2_UP: &str = r#"
CREATE TABLE IF NOT EXISTS unknown_words (
    word TEXT PRIMARY KEY,
    snapshot TEXT NOT NULL,
    added_at TEXT NOT NULL
);

UPDATE schema_version SET version = 2, applied_at = datetime('now');
"#;

/// V3: Single-row study progress
const MIGRATION_V3_UP: &str = r#"
CREATE TABLE IF NOT EXISTS study_progress (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    daily_streak INTEGER NOT NULL DEFAULT 0,
    total_points INTEGER NOT NULL DEFAULT 0,
    last_study_date TEXT
);

INSERT OR IGNORE INTO study_progress (id, daily_streak, total_points) VALUES (1, 0, 0);

UPDATE schema_version SET version = 3, applied_at = datetime('now');
"#;

/// V4: `7` and `"7"` are different words
///
/// SQLite cannot change a UNIQUE constraint in place, so the table is rebuilt
/// with `UNIQUE (id_kind, id)`. Explicit `seq` values keep insertion order.
const MIGRATION_V4_UP: &str = r#"
BEGIN;

CREATE TABLE vocabulary_words_v4 (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL,
    id_kind TEXT NOT NULL DEFAULT 'text',
    word TEXT NOT NULL,

    part_of_speech TEXT,
    meaning TEXT,
    example_source TEXT,
    example_target TEXT,
    synonyms TEXT NOT NULL DEFAULT '[]',
    antonyms TEXT NOT NULL DEFAULT '[]',
    other_forms TEXT,
    status TEXT NOT NULL DEFAULT 'new',

    mastery_level INTEGER NOT NULL DEFAULT 0,
    next_review_at TEXT,
    last_reviewed_at TEXT,

    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,

    UNIQUE (id_kind, id)
);

INSERT INTO vocabulary_words_v4 (
    seq, id, id_kind, word, part_of_speech, meaning, example_source,
    example_target, synonyms, antonyms, other_forms, status,
    mastery_level, next_review_at, last_reviewed_at, created_at, updated_at
)
SELECT
    seq, id, id_kind, word, part_of_speech, meaning, example_source,
    example_target, synonyms, antonyms, other_forms, status,
    mastery_level, next_review_at, last_reviewed_at, created_at, updated_at
FROM vocabulary_words;

DROP TABLE vocabulary_words;
ALTER TABLE vocabulary_words_v4 RENAME TO vocabulary_words;

CREATE INDEX IF NOT EXISTS idx_words_next_review ON vocabulary_words(next_review_at);
CREATE INDEX IF NOT EXISTS idx_words_word ON vocabulary_words(word);

UPDATE schema_version SET version = 4, applied_at = datetime('now');

COMMIT;
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

            // execute_batch handles the multi-statement scripts
            conn.execute_batch(migration.up)?;
            applied += 1;
        }
    }

    Ok(applied)
}
