//! Vocabulary change events.
//!
//! Emitted by the [`VocabularyService`](crate::VocabularyService) after a
//! change has been persisted, and broadcast to every subscriber through a
//! tokio broadcast channel.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::srs::ReviewOutcome;
use crate::vocabulary::{WordId, WordStatus};

/// Every persisted change to the word list emits one of these events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum VocabularyEvent {
    // -- Word lifecycle --
    WordAdded {
        id: WordId,
        word: String,
        timestamp: DateTime<Utc>,
    },
    WordUpdated {
        id: WordId,
        field: String,
        timestamp: DateTime<Utc>,
    },
    WordDeleted {
        id: WordId,
        timestamp: DateTime<Utc>,
    },
    WordsImported {
        count: usize,
        timestamp: DateTime<Utc>,
    },

    // -- Review --
    WordReviewed {
        id: WordId,
        outcome: ReviewOutcome,
        mastery_level: u32,
        next_review_at: DateTime<Utc>,
        timestamp: DateTime<Utc>,
    },
    ProgressReset {
        words_reset: usize,
        timestamp: DateTime<Utc>,
    },

    // -- Unknown words --
    UnknownWordsChanged {
        word: String,
        added: bool,
        timestamp: DateTime<Utc>,
    },

    // -- Study --
    StudyRecorded {
        daily_streak: u32,
        total_points: u32,
        date: NaiveDate,
        timestamp: DateTime<Utc>,
    },
}

impl VocabularyEvent {
    /// Status change shorthand
    pub fn status_changed(id: WordId, status: WordStatus, timestamp: DateTime<Utc>) -> Self {
        VocabularyEvent::WordUpdated {
            id,
            field: format!("status={}", status),
            timestamp,
        }
    }

    /// Event name as it appears in the `type` tag
    pub fn kind(&self) -> &'static str {
        match self {
            VocabularyEvent::WordAdded { .. } => "WordAdded",
            VocabularyEvent::WordUpdated { .. } => "WordUpdated",
            VocabularyEvent::WordDeleted { .. } => "WordDeleted",
            VocabularyEvent::WordsImported { .. } => "WordsImported",
            VocabularyEvent::WordReviewed { .. } => "WordReviewed",
            VocabularyEvent::ProgressReset { .. } => "ProgressReset",
            VocabularyEvent::UnknownWordsChanged { .. } => "UnknownWordsChanged",
            VocabularyEvent::StudyRecorded { .. } => "StudyRecorded",
        }
    }

    /// Serialize to a JSON string, one line per event.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}
