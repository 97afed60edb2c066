//! SQLite Storage Implementation
//!
//! Durable store for vocabulary words, the unknown-words list and study
//! progress.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::WordStore;
use crate::progress::StudyProgress;
use crate::srs::MASTERED_LEVEL;
use crate::vocabulary::{filter_words, VocabularyItem, VocabularyStats, WordId, WordStatus};

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Storage error type
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    /// Word not found
    #[error("Word not found: {0}")]
    NotFound(String),
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Stored JSON column could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// Invalid timestamp
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
    /// Value cannot be stored as given
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// Initialization error
    #[error("Initialization error: {0}")]
    Init(String),
}

/// Storage result type
pub type Result<T> = std::result::Result<T, StorageError>;

// ============================================================================
// TIMESTAMPS
// ============================================================================

/// Fixed-width RFC 3339 with microseconds, e.g. `2026-03-01T09:00:00.000000Z`
pub(crate) fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse RFC3339 timestamp
fn parse_timestamp(value: &str, field_name: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("Invalid {} timestamp '{}': {}", field_name, value, e),
                )),
            )
        })
}

fn parse_optional_timestamp(
    value: Option<String>,
    field_name: &str,
) -> rusqlite::Result<Option<DateTime<Utc>>> {
    value.map(|s| parse_timestamp(&s, field_name)).transpose()
}

/// Decode a JSON column, logging and dropping values that no longer parse
fn decode_json_column<T: serde::de::DeserializeOwned>(raw: &str, column: &str, key: &str) -> Option<T> {
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Ignoring malformed {} of word {}: {}", column, key, e);
            None
        }
    }
}

fn required_id(item: &VocabularyItem) -> Result<&WordId> {
    match &item.id {
        Some(id) if !id.is_blank() => Ok(id),
        _ => Err(StorageError::InvalidInput(format!(
            "word '{}' has no identifier",
            item.word
        ))),
    }
}

// ============================================================================
// STORAGE
// ============================================================================

/// Main storage struct
///
/// Uses separate reader/writer connections for interior mutability.
/// All methods take `&self`, making Storage `Send + Sync` so callers can
/// share an `Arc<Storage>`.
pub struct Storage {
    writer: Mutex<Connection>,
    reader: Mutex<Connection>,
    path: PathBuf,
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage").field("path", &self.path).finish()
    }
}

impl Storage {
    /// Apply PRAGMAs and optional encryption to a connection
    fn configure_connection(conn: &Connection) -> Result<()> {
        // Apply encryption key if SQLCipher is enabled and key is provided
        #[cfg(feature = "encryption")]
        {
            if let Ok(key) = std::env::var("WORDWISE_ENCRYPTION_KEY") {
                if !key.is_empty() {
                    conn.pragma_update(None, "key", &key)?;
                }
            }
        }

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;
             PRAGMA temp_store = MEMORY;",
        )?;

        Ok(())
    }

    /// Default database location under the platform data directory
    pub fn default_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "wordwise", "core").ok_or_else(|| {
            StorageError::Init("Could not determine project directories".to_string())
        })?;
        Ok(proj_dirs.data_dir().join("wordwise.db"))
    }

    /// Create new storage instance
    ///
    /// `None` opens the database at [`Storage::default_path`].
    pub fn new(db_path: Option<PathBuf>) -> Result<Self> {
        let path = match db_path {
            Some(p) => p,
            None => Self::default_path()?,
        };

        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                std::fs::create_dir_all(dir)?;
                // Restrict directory permissions to owner-only on Unix
                #[cfg(unix)]
                {
                    use std::os::unix::fs::PermissionsExt;
                    let perms = std::fs::Permissions::from_mode(0o700);
                    let _ = std::fs::set_permissions(dir, perms);
                }
            }
        }

        // Open writer connection
        let writer_conn = Connection::open(&path)?;

        // Restrict database file permissions to owner-only on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if path.exists() {
                let perms = std::fs::Permissions::from_mode(0o600);
                let _ = std::fs::set_permissions(&path, perms);
            }
        }

        Self::configure_connection(&writer_conn)?;

        // Apply migrations on writer only
        let applied = super::migrations::apply_migrations(&writer_conn)?;
        if applied > 0 {
            tracing::info!("Applied {} migration(s) to {}", applied, path.display());
        }

        // Open reader connection to same path
        let reader_conn = Connection::open(&path)?;
        Self::configure_connection(&reader_conn)?;

        Ok(Self {
            writer: Mutex::new(writer_conn),
            reader: Mutex::new(reader_conn),
            path,
        })
    }

    /// Path of the database file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_reader(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.reader
            .lock()
            .map_err(|_| StorageError::Init("Reader lock poisoned".into()))
    }

    fn lock_writer(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.writer
            .lock()
            .map_err(|_| StorageError::Init("Writer lock poisoned".into()))
    }

    // ========================================================================
    // WORDS
    // ========================================================================

    /// Insert a new word; fails if the identifier is already taken
    pub fn add_word(&self, item: &VocabularyItem) -> Result<VocabularyItem> {
        let id = required_id(item)?;
        if item.word.trim().is_empty() {
            return Err(StorageError::InvalidInput("word cannot be empty".to_string()));
        }

        {
            let writer = self.lock_writer()?;
            writer.execute(
                "INSERT INTO vocabulary_words (
                    id, id_kind, word, part_of_speech, meaning, example_source,
                    example_target, synonyms, antonyms, other_forms, status,
                    mastery_level, next_review_at, last_reviewed_at, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
                params![
                    id.key(),
                    id.kind(),
                    item.word,
                    item.part_of_speech,
                    item.meaning,
                    item.example_source,
                    item.example_target,
                    serde_json::to_string(&item.synonyms)?,
                    serde_json::to_string(&item.antonyms)?,
                    item.other_forms.as_ref().map(serde_json::to_string).transpose()?,
                    item.status.as_str(),
                    item.mastery_level,
                    item.next_review_at.as_ref().map(format_timestamp),
                    item.last_reviewed_at.as_ref().map(format_timestamp),
                    format_timestamp(&item.created_at),
                    format_timestamp(&Utc::now()),
                ],
            )?;
        }

        self.get_word(id)?
            .ok_or_else(|| StorageError::NotFound(id.to_string()))
    }

    /// Insert or update a word keyed by its identifier
    ///
    /// Level and review timestamps are written in one statement.
    pub fn save_word(&self, item: &VocabularyItem) -> Result<()> {
        let id = required_id(item)?;
        let writer = self.lock_writer()?;
        Self::upsert_word(&writer, id, item)?;
        Ok(())
    }

    fn upsert_word(conn: &Connection, id: &WordId, item: &VocabularyItem) -> Result<usize> {
        let rows = conn.execute(
            "INSERT INTO vocabulary_words (
                id, id_kind, word, part_of_speech, meaning, example_source,
                example_target, synonyms, antonyms, other_forms, status,
                mastery_level, next_review_at, last_reviewed_at, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
            ON CONFLICT(id_kind, id) DO UPDATE SET
                word = excluded.word,
                part_of_speech = excluded.part_of_speech,
                meaning = excluded.meaning,
                example_source = excluded.example_source,
                example_target = excluded.example_target,
                synonyms = excluded.synonyms,
                antonyms = excluded.antonyms,
                other_forms = excluded.other_forms,
                status = excluded.status,
                mastery_level = excluded.mastery_level,
                next_review_at = excluded.next_review_at,
                last_reviewed_at = excluded.last_reviewed_at,
                updated_at = excluded.updated_at",
            params![
                id.key(),
                id.kind(),
                item.word,
                item.part_of_speech,
                item.meaning,
                item.example_source,
                item.example_target,
                serde_json::to_string(&item.synonyms)?,
                serde_json::to_string(&item.antonyms)?,
                item.other_forms.as_ref().map(serde_json::to_string).transpose()?,
                item.status.as_str(),
                item.mastery_level,
                item.next_review_at.as_ref().map(format_timestamp),
                item.last_reviewed_at.as_ref().map(format_timestamp),
                format_timestamp(&item.created_at),
                format_timestamp(&Utc::now()),
            ],
        )?;
        Ok(rows)
    }

    /// Get a word by identifier
    pub fn get_word(&self, id: &WordId) -> Result<Option<VocabularyItem>> {
        let reader = self.lock_reader()?;
        Self::query_word(&reader, id)
    }

    fn query_word(conn: &Connection, id: &WordId) -> Result<Option<VocabularyItem>> {
        let mut stmt =
            conn.prepare("SELECT * FROM vocabulary_words WHERE id_kind = ?1 AND id = ?2")?;
        let word = stmt
            .query_row(params![id.kind(), id.key()], |row| Self::row_to_word(row))
            .optional()?;
        Ok(word)
    }

    /// Identifier of the stored word a user typed as `raw`
    ///
    /// Tries each reading of [`WordId::lookup_candidates`] in turn, so a text
    /// id such as `"0042"` is still found.
    pub fn resolve_id(&self, raw: &str) -> Result<Option<WordId>> {
        let reader = self.lock_reader()?;
        let mut stmt = reader
            .prepare("SELECT 1 FROM vocabulary_words WHERE id_kind = ?1 AND id = ?2")?;

        for candidate in WordId::lookup_candidates(raw) {
            if stmt.exists(params![candidate.kind(), candidate.key()])? {
                return Ok(Some(candidate));
            }
        }
        Ok(None)
    }

    /// Convert a row to VocabularyItem
    fn row_to_word(row: &rusqlite::Row) -> rusqlite::Result<VocabularyItem> {
        let key: String = row.get("id")?;
        let kind: String = row.get("id_kind")?;

        let synonyms: String = row.get("synonyms")?;
        let antonyms: String = row.get("antonyms")?;
        let other_forms: Option<String> = row.get("other_forms")?;
        let status: String = row.get("status")?;

        let created_at: String = row.get("created_at")?;
        let next_review_at: Option<String> = row.get("next_review_at")?;
        let last_reviewed_at: Option<String> = row.get("last_reviewed_at")?;

        Ok(VocabularyItem {
            id: Some(WordId::from_parts(&key, &kind)),
            word: row.get("word")?,
            part_of_speech: row.get("part_of_speech")?,
            meaning: row.get("meaning")?,
            example_source: row.get("example_source")?,
            example_target: row.get("example_target")?,
            synonyms: decode_json_column(&synonyms, "synonyms", &key).unwrap_or_default(),
            antonyms: decode_json_column(&antonyms, "antonyms", &key).unwrap_or_default(),
            other_forms: other_forms.and_then(|s| decode_json_column(&s, "other_forms", &key)),
            status: WordStatus::parse_name(&status),
            mastery_level: row.get("mastery_level")?,
            next_review_at: parse_optional_timestamp(next_review_at, "next_review_at")?,
            last_reviewed_at: parse_optional_timestamp(last_reviewed_at, "last_reviewed_at")?,
            created_at: parse_timestamp(&created_at, "created_at")?,
        })
    }

    fn collect_words(conn: &Connection, sql: &str, params: impl rusqlite::Params) -> Result<Vec<VocabularyItem>> {
        let mut stmt = conn.prepare(sql)?;
        let words = stmt.query_map(params, |row| Self::row_to_word(row))?;

        let mut result = Vec::new();
        for word in words {
            result.push(word?);
        }
        Ok(result)
    }

    /// All words in insertion order
    pub fn get_all_words(&self) -> Result<Vec<VocabularyItem>> {
        let reader = self.lock_reader()?;
        Self::collect_words(&reader, "SELECT * FROM vocabulary_words ORDER BY seq ASC", [])
    }

    /// Words in insertion order (paginated)
    pub fn get_words(&self, limit: i64, offset: i64) -> Result<Vec<VocabularyItem>> {
        let reader = self.lock_reader()?;
        Self::collect_words(
            &reader,
            "SELECT * FROM vocabulary_words ORDER BY seq ASC LIMIT ?1 OFFSET ?2",
            params![limit, offset],
        )
    }

    /// Delete a word
    pub fn delete_word(&self, id: &WordId) -> Result<bool> {
        let writer = self.lock_writer()?;
        let rows = writer.execute(
            "DELETE FROM vocabulary_words WHERE id_kind = ?1 AND id = ?2",
            params![id.kind(), id.key()],
        )?;
        Ok(rows > 0)
    }

    /// Set the learner-assigned status of a word
    pub fn set_status(&self, id: &WordId, status: WordStatus) -> Result<VocabularyItem> {
        {
            let writer = self.lock_writer()?;
            let rows = writer.execute(
                "UPDATE vocabulary_words SET status = ?1, updated_at = ?2
                 WHERE id_kind = ?3 AND id = ?4",
                params![status.as_str(), format_timestamp(&Utc::now()), id.kind(), id.key()],
            )?;
            if rows == 0 {
                return Err(StorageError::NotFound(id.to_string()));
            }
        }

        self.get_word(id)?
            .ok_or_else(|| StorageError::NotFound(id.to_string()))
    }

    /// Words matching a search term, see [`filter_words`]
    pub fn search_words(&self, term: &str) -> Result<Vec<VocabularyItem>> {
        let words = self.get_all_words()?;
        Ok(filter_words(&words, term).into_iter().cloned().collect())
    }

    /// Upsert a batch of words in one transaction
    pub fn import_words(&self, items: &[VocabularyItem]) -> Result<usize> {
        let mut writer = self.lock_writer()?;
        let tx = writer.transaction()?;

        let mut written = 0;
        for item in items {
            let id = required_id(item)?;
            written += Self::upsert_word(&tx, id, item)?;
        }

        tx.commit()?;
        tracing::info!("Imported {} word(s)", written);
        Ok(written)
    }

    // ========================================================================
    // REVIEW
    // ========================================================================

    /// Write the review state of an existing word
    ///
    /// Only level, next review and last review change; content and status
    /// are left alone. A word that is gone is `NotFound`, never re-created.
    pub fn save_review_state(&self, item: &VocabularyItem) -> Result<()> {
        let id = required_id(item)?;
        let writer = self.lock_writer()?;
        let rows = writer.execute(
            "UPDATE vocabulary_words SET
                mastery_level = ?1,
                next_review_at = ?2,
                last_reviewed_at = ?3,
                updated_at = ?4
            WHERE id_kind = ?5 AND id = ?6",
            params![
                item.mastery_level,
                item.next_review_at.as_ref().map(format_timestamp),
                item.last_reviewed_at.as_ref().map(format_timestamp),
                format_timestamp(&Utc::now()),
                id.kind(),
                id.key(),
            ],
        )?;
        if rows == 0 {
            return Err(StorageError::NotFound(id.to_string()));
        }
        Ok(())
    }

    /// Words due at `now`, in insertion order
    pub fn get_due_words(&self, now: DateTime<Utc>) -> Result<Vec<VocabularyItem>> {
        let reader = self.lock_reader()?;
        Self::collect_words(
            &reader,
            "SELECT * FROM vocabulary_words
             WHERE next_review_at IS NULL OR next_review_at <= ?1
             ORDER BY seq ASC",
            params![format_timestamp(&now)],
        )
    }

    /// Vocabulary statistics as of `now`
    pub fn get_stats(&self, now: DateTime<Utc>) -> Result<VocabularyStats> {
        let reader = self.lock_reader()?;

        let (total, learned, mastered, due): (i64, i64, i64, i64) = reader.query_row(
            "SELECT
                COUNT(*),
                COALESCE(SUM(mastery_level > 0), 0),
                COALESCE(SUM(mastery_level >= ?1), 0),
                COALESCE(SUM(next_review_at IS NULL OR next_review_at <= ?2), 0)
             FROM vocabulary_words",
            params![MASTERED_LEVEL, format_timestamp(&now)],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )?;

        Ok(VocabularyStats {
            total_words: total as usize,
            learned_words: learned as usize,
            mastered_words: mastered as usize,
            words_to_review: due as usize,
        })
    }

    /// Reset every word to a fresh, immediately due state
    pub fn reset_progress(&self, now: DateTime<Utc>) -> Result<usize> {
        let writer = self.lock_writer()?;
        let stamp = format_timestamp(&now);
        let rows = writer.execute(
            "UPDATE vocabulary_words SET
                mastery_level = 0,
                next_review_at = ?1,
                last_reviewed_at = NULL,
                status = 'new',
                updated_at = ?1",
            params![stamp],
        )?;
        tracing::info!("Reset progress for {} word(s)", rows);
        Ok(rows)
    }

    // ========================================================================
    // UNKNOWN WORDS
    // ========================================================================

    /// Add a word to the unknown list; `false` if its headword is already there
    pub fn add_unknown_word(&self, item: &VocabularyItem, now: DateTime<Utc>) -> Result<bool> {
        let snapshot = serde_json::to_string(item)?;
        let writer = self.lock_writer()?;
        let rows = writer.execute(
            "INSERT OR IGNORE INTO unknown_words (word, snapshot, added_at) VALUES (?1, ?2, ?3)",
            params![item.word, snapshot, format_timestamp(&now)],
        )?;
        Ok(rows > 0)
    }

    /// Remove a headword from the unknown list
    pub fn remove_unknown_word(&self, word: &str) -> Result<bool> {
        let writer = self.lock_writer()?;
        let rows = writer.execute("DELETE FROM unknown_words WHERE word = ?1", params![word])?;
        Ok(rows > 0)
    }

    /// Unknown words, oldest first
    pub fn get_unknown_words(&self) -> Result<Vec<VocabularyItem>> {
        let reader = self.lock_reader()?;
        let mut stmt =
            reader.prepare("SELECT snapshot FROM unknown_words ORDER BY added_at ASC, word ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut result = Vec::new();
        for row in rows {
            result.push(serde_json::from_str(&row?)?);
        }
        Ok(result)
    }

    // ========================================================================
    // STUDY PROGRESS
    // ========================================================================

    pub fn get_study_progress(&self) -> Result<StudyProgress> {
        let reader = self.lock_reader()?;
        let row: Option<(u32, u32, Option<String>)> = reader
            .query_row(
                "SELECT daily_streak, total_points, last_study_date FROM study_progress WHERE id = 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;

        let Some((daily_streak, total_points, last_study_date)) = row else {
            return Ok(StudyProgress::default());
        };

        let last_study_date = match last_study_date {
            Some(s) => Some(
                NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                    .map_err(|e| StorageError::InvalidTimestamp(format!("{}: {}", s, e)))?,
            ),
            None => None,
        };

        Ok(StudyProgress {
            daily_streak,
            total_points,
            last_study_date,
        })
    }

    pub fn save_study_progress(&self, progress: &StudyProgress) -> Result<()> {
        let writer = self.lock_writer()?;
        writer.execute(
            "INSERT INTO study_progress (id, daily_streak, total_points, last_study_date)
             VALUES (1, ?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET
                daily_streak = excluded.daily_streak,
                total_points = excluded.total_points,
                last_study_date = excluded.last_study_date",
            params![
                progress.daily_streak,
                progress.total_points,
                progress.last_study_date.map(|d| d.format("%Y-%m-%d").to_string()),
            ],
        )?;
        Ok(())
    }

    // ========================================================================
    // MAINTENANCE
    // ========================================================================

    /// Create a consistent backup using VACUUM INTO
    pub fn backup_to(&self, path: &Path) -> Result<()> {
        let path_str = path
            .to_str()
            .ok_or_else(|| StorageError::InvalidInput("Invalid backup path encoding".to_string()))?;
        // Reject control characters (except tab)
        if path_str.bytes().any(|b| b < 0x20 && b != b'\t') {
            return Err(StorageError::InvalidInput(
                "Backup path contains invalid characters".to_string(),
            ));
        }
        let reader = self.lock_reader()?;
        // VACUUM INTO doesn't support parameterized queries; escape single quotes
        reader.execute_batch(&format!("VACUUM INTO '{}'", path_str.replace('\'', "''")))?;
        Ok(())
    }
}

impl WordStore for Storage {
    fn load_word(&self, id: &WordId) -> Result<Option<VocabularyItem>> {
        self.get_word(id)
    }

    fn save_review_state(&self, item: &VocabularyItem) -> Result<()> {
        Storage::save_review_state(self, item)
    }
}

// ============================================================================
// TESTS
// ============================================================================
