//! # Wordwise Core
//!
//! Vocabulary trainer engine: spaced repetition scheduling, a persistent
//! word list and daily study tracking.
//!
//! - **Leitner-style SRS**: fixed interval table `[0, 1, 3, 7, 14, 30]` days,
//!   a pass moves a word up one level, a fail sends it back to level 0
//! - **SQLite storage**: words keyed by numeric or text identifiers, versioned
//!   migrations, atomic review updates
//! - **Study progress**: daily streak and points
//! - **Change events**: every persisted change is broadcast to subscribers
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use wordwise_core::{NewWord, ReviewOutcome, Storage, VocabularyService};
//! use std::sync::Arc;
//!
//! // Create storage (uses default platform-specific location)
//! let storage = Arc::new(Storage::new(None)?);
//! let service = VocabularyService::new(storage);
//!
//! let word = service.add_word(NewWord {
//!     word: "ephemeral".to_string(),
//!     meaning: Some("geçici".to_string()),
//!     ..Default::default()
//! })?;
//!
//! // Review it
//! let id = word.id.clone().unwrap();
//! let updated = service.record_review(&id, ReviewOutcome::Pass)?;
//!
//! // What is due now?
//! let due = service.due_words()?;
//! ```
//!
//! The scheduling functions in [`srs`] are pure and can be used without any
//! storage:
//!
//! ```rust
//! use chrono::{Duration, TimeZone, Utc};
//! use wordwise_core::{record_review_outcome, select_due_items, ReviewOutcome, VocabularyItem};
//!
//! let now = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
//! let item = VocabularyItem::new("lucid", now).with_id(1);
//!
//! let passed = record_review_outcome(&item, ReviewOutcome::Pass, now).unwrap();
//! assert_eq!(passed.mastery_level, 1);
//! assert_eq!(passed.next_review_at, Some(now + Duration::days(1)));
//! assert!(select_due_items(&[passed], now).is_empty());
//! ```
//!
//! ## Feature Flags
//!
//! - `bundled-sqlite` (default): Compile SQLite into the binary
//! - `encryption`: SQLCipher database encryption (key from `WORDWISE_ENCRYPTION_KEY`)

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// MODULES
// ============================================================================

pub mod events;
pub mod progress;
pub mod service;
pub mod srs;
pub mod storage;
pub mod vocabulary;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

// Vocabulary types
pub use vocabulary::{
    filter_words, normalize_word, parse_word_list, ImportError, NewWord, VocabularyItem,
    VocabularyStats, WordId, WordStatus,
};

// Spaced repetition
pub use srs::{
    due_items,
    // Core functions
    interval_days,
    is_due,
    next_review_at,
    preview_outcomes,
    record_review_outcome,
    require_identifier,
    select_due_items,
    // Clocks
    Clock,
    FixedClock,
    ReviewOutcome,
    ReviewPreview,
    ScheduleError,
    SrsScheduler,
    SystemClock,
    INTERVAL_DAYS,
    MASTERED_LEVEL,
};

// Study progress
pub use progress::{current_stats, record_study, DailyStats, StudyProgress, POINTS_PER_STUDY};

// Storage layer
pub use storage::{Result, Storage, StorageError, WordStore};

// Service and events
pub use events::VocabularyEvent;
pub use service::{ReviewError, TrackedReview, VocabularyService};

// ============================================================================
// VERSION INFO
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// PRELUDE
// ============================================================================

/// Convenient imports for common usage
pub mod prelude {
    pub use crate::{
        NewWord, ReviewError, ReviewOutcome, Storage, StorageError, VocabularyEvent,
        VocabularyItem, VocabularyService, VocabularyStats, WordId, WordStatus,
    };

    pub use crate::{Clock, FixedClock, SrsScheduler, SystemClock};
}
