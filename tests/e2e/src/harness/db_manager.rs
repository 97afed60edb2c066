//! Test Database Manager
//!
//! Provides isolated database instances for testing:
//! - Temporary databases that are automatically cleaned up
//! - A fixed clock that tests advance explicitly
//! - Pre-seeded word lists at various mastery levels
//! - Snapshots and restoration

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use tempfile::TempDir;
use wordwise_core::{
    Clock, FixedClock, NewWord, ReviewOutcome, Storage, VocabularyItem, VocabularyService, WordId,
};

/// Manager for test databases
///
/// Creates isolated database instances for each test to prevent interference.
/// Automatically cleans up temporary databases when dropped.
///
/// # Example
///
/// ```rust,ignore
/// let mut db = TestDatabaseManager::new_temp();
/// let ids = db.seed_words(3);
///
/// db.service.record_review(&ids[0], ReviewOutcome::Pass)?;
/// db.advance_days(1);
///
/// // Database is automatically deleted when `db` goes out of scope
/// ```
pub struct TestDatabaseManager {
    /// Service over the test database
    pub service: VocabularyService,
    /// Clock driving every operation of `service`
    pub clock: Arc<FixedClock>,
    /// Temporary directory (kept alive to prevent premature deletion)
    _temp_dir: Option<TempDir>,
    /// Path to the database file
    db_path: PathBuf,
    /// Snapshot data for restore operations
    snapshot: Option<Vec<VocabularyItem>>,
}

impl TestDatabaseManager {
    /// Instant every test database starts at
    pub fn start_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 8, 30, 0).unwrap()
    }

    fn open(path: &PathBuf, clock: Arc<FixedClock>) -> VocabularyService {
        let storage = Storage::new(Some(path.clone())).expect("Failed to create test storage");
        VocabularyService::with_clock(Arc::new(storage), clock)
    }

    /// Create a new test database in a temporary directory
    ///
    /// The database is automatically deleted when the manager is dropped.
    pub fn new_temp() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test_wordwise.db");
        let clock = Arc::new(FixedClock::new(Self::start_time()));

        Self {
            service: Self::open(&db_path, clock.clone()),
            clock,
            _temp_dir: Some(temp_dir),
            db_path,
            snapshot: None,
        }
    }

    /// Create a test database at a specific path
    ///
    /// The database is NOT automatically deleted.
    pub fn new_at_path(path: PathBuf) -> Self {
        let clock = Arc::new(FixedClock::new(Self::start_time()));

        Self {
            service: Self::open(&path, clock.clone()),
            clock,
            _temp_dir: None,
            db_path: path,
            snapshot: None,
        }
    }

    /// Get the database path
    pub fn path(&self) -> &PathBuf {
        &self.db_path
    }

    /// Direct access to the store
    pub fn storage(&self) -> &Storage {
        self.service.store()
    }

    /// Current instant of the test clock
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Move the test clock forward
    pub fn advance_days(&self, days: i64) {
        self.clock.advance(Duration::days(days));
    }

    /// Check if the database is empty
    pub fn is_empty(&self) -> bool {
        self.word_count() == 0
    }

    /// Get the number of words in the database
    pub fn word_count(&self) -> usize {
        self.service
            .stats()
            .map(|s| s.total_words)
            .unwrap_or(0)
    }

    // ========================================================================
    // SEEDING METHODS
    // ========================================================================

    /// Seed the database with a specified number of fresh words
    pub fn seed_words(&mut self, count: usize) -> Vec<WordId> {
        let mut ids = Vec::with_capacity(count);

        for i in 0..count {
            let input = NewWord {
                id: Some(WordId::Number(i as i64 + 1)),
                word: format!("word-{}", i + 1),
                meaning: Some(format!("meaning {}", i + 1)),
                ..Default::default()
            };

            if let Ok(item) = self.service.add_word(input) {
                ids.extend(item.id);
            }
        }

        ids
    }

    /// Seed words at mastery levels 0 through `max_level`
    ///
    /// Each word is passed `level` times in a row at the current instant, so
    /// word `n` ends at level `n`.
    pub fn seed_with_levels(&mut self, max_level: u32) -> Vec<WordId> {
        let mut ids = Vec::new();

        for level in 0..=max_level {
            let input = NewWord {
                id: Some(WordId::Text(format!("lvl-{}", level))),
                word: format!("level-{}", level),
                ..Default::default()
            };
            let Ok(item) = self.service.add_word(input) else {
                continue;
            };
            let Some(id) = item.id else {
                continue;
            };

            for _ in 0..level {
                self.service
                    .record_review(&id, ReviewOutcome::Pass)
                    .expect("Failed to seed review");
            }
            ids.push(id);
        }

        ids
    }

    // ========================================================================
    // SNAPSHOT/RESTORE
    // ========================================================================

    /// Take a snapshot of current database state
    pub fn take_snapshot(&mut self) {
        let words = self.storage().get_all_words().unwrap_or_default();
        self.snapshot = Some(words);
    }

    /// Restore from the last snapshot
    ///
    /// Clears the database and re-imports every word. Identifiers and review
    /// state are preserved.
    pub fn restore_snapshot(&mut self) -> bool {
        if let Some(words) = self.snapshot.take() {
            self.recreate();
            self.service
                .import_words(words)
                .expect("Failed to restore snapshot");
            true
        } else {
            false
        }
    }

    /// Check if a snapshot exists
    pub fn has_snapshot(&self) -> bool {
        self.snapshot.is_some()
    }

    // ========================================================================
    // CLEANUP
    // ========================================================================

    /// Clear all words from the database
    pub fn clear(&mut self) {
        if let Ok(words) = self.storage().get_all_words() {
            for id in words.into_iter().filter_map(|w| w.id) {
                let _ = self.service.delete_word(&id);
            }
        }
    }

    /// Recreate the database (useful for testing migrations)
    pub fn recreate(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut path = self.db_path.clone().into_os_string();
            path.push(suffix);
            let _ = std::fs::remove_file(PathBuf::from(path));
        }

        self.service = Self::open(&self.db_path, self.clock.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_database_creation() {
        let db = TestDatabaseManager::new_temp();
        assert!(db.is_empty());
        assert!(db.path().exists());
        assert_eq!(db.now(), TestDatabaseManager::start_time());
    }

    #[test]
    fn test_seed_words() {
        let mut db = TestDatabaseManager::new_temp();
        let ids = db.seed_words(10);

        assert_eq!(ids.len(), 10);
        assert_eq!(db.word_count(), 10);
        assert_eq!(ids[0], WordId::Number(1));
    }

    #[test]
    fn test_seed_with_levels() {
        let mut db = TestDatabaseManager::new_temp();
        let ids = db.seed_with_levels(3);

        assert_eq!(ids.len(), 4);
        let last = db.storage().get_word(&ids[3]).unwrap().unwrap();
        assert_eq!(last.mastery_level, 3);
    }

    #[test]
    fn test_clear_database() {
        let mut db = TestDatabaseManager::new_temp();
        db.seed_words(5);
        assert_eq!(db.word_count(), 5);

        db.clear();
        assert!(db.is_empty());
    }

    #[test]
    fn test_snapshot_restore_keeps_state() {
        let mut db = TestDatabaseManager::new_temp();
        let ids = db.seed_with_levels(2);

        db.take_snapshot();
        assert!(db.has_snapshot());

        db.clear();
        assert!(db.is_empty());

        assert!(db.restore_snapshot());
        assert_eq!(db.word_count(), 3);
        let restored = db.storage().get_word(&ids[2]).unwrap().unwrap();
        assert_eq!(restored.mastery_level, 2);
    }
}
