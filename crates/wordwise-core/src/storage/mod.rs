//! Storage Module
//!
//! SQLite-based storage layer with:
//! - Versioned schema migrations
//! - Words keyed by identifier kind and value (`7` and `"7"` differ),
//!   kept in insertion order
//! - Atomic review updates (level and next review in one statement)
//! - Unknown-words list and study progress

mod migrations;
mod sqlite;

pub use migrations::MIGRATIONS;
pub use sqlite::{Result, Storage, StorageError};

use crate::vocabulary::{VocabularyItem, WordId};

/// Persistence collaborator for review updates
///
/// Keyed by identifier. `save_review_state` writes level, next review and
/// last review together and only for a word that still exists.
pub trait WordStore: Send + Sync {
    /// Load a word by identifier
    fn load_word(&self, id: &WordId) -> Result<Option<VocabularyItem>>;

    /// Update the review state of an existing word
    ///
    /// Returns [`StorageError::NotFound`] when no word has this identifier.
    fn save_review_state(&self, item: &VocabularyItem) -> Result<()>;
}
