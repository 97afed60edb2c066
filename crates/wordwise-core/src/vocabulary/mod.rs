//! Vocabulary module - Core types and data structures
//!
//! Implements the learner's word model with:
//! - Vocabulary items with spaced repetition state
//! - Numeric or text identifiers
//! - Search filtering and legacy word-list import

mod filter;
pub mod import;
mod word;

pub use filter::filter_words;
pub use import::{normalize_word, parse_word_list, ImportError};
pub use word::{NewWord, VocabularyItem, WordId, WordStatus};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::srs::MASTERED_LEVEL;

/// Aggregate counts over a vocabulary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyStats {
    pub total_words: usize,
    /// Words reviewed successfully at least once since their last failure
    pub learned_words: usize,
    /// Words at or above the mastered level
    pub mastered_words: usize,
    /// Words due at the evaluation instant
    pub words_to_review: usize,
}

impl VocabularyStats {
    /// Compute statistics for `words` as of `now`
    pub fn compute(words: &[VocabularyItem], now: DateTime<Utc>) -> Self {
        Self {
            total_words: words.len(),
            learned_words: words.iter().filter(|w| w.mastery_level > 0).count(),
            mastered_words: words
                .iter()
                .filter(|w| w.mastery_level >= MASTERED_LEVEL)
                .count(),
            words_to_review: words.iter().filter(|w| w.is_due_at(now)).count(),
        }
    }
}
