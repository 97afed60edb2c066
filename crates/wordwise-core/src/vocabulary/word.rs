//! Vocabulary Item - The fundamental unit of study
//!
//! Each item represents one headword with:
//! - Translation, examples and related words
//! - Spaced repetition state (mastery level, next review)
//! - A coarse learning status set by the learner

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// IDENTIFIERS
// ============================================================================

/// Stable key of a vocabulary item
///
/// Word lists imported from remote sources carry numeric ids, words created
/// locally get a UUID string. Both forms are accepted and preserved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WordId {
    /// Numeric identifier (e.g. `42`)
    Number(i64),
    /// Text identifier (e.g. a UUID)
    Text(String),
}

impl WordId {
    /// Generate a fresh text identifier
    pub fn generate() -> Self {
        WordId::Text(Uuid::new_v4().to_string())
    }

    /// A text identifier that is empty or whitespace cannot key anything
    pub fn is_blank(&self) -> bool {
        match self {
            WordId::Number(_) => false,
            WordId::Text(s) => s.trim().is_empty(),
        }
    }

    /// Storage discriminator
    pub fn kind(&self) -> &'static str {
        match self {
            WordId::Number(_) => "number",
            WordId::Text(_) => "text",
        }
    }

    /// Rebuild an identifier from its stored key and discriminator
    pub fn from_parts(key: &str, kind: &str) -> Self {
        match kind {
            "number" => key
                .parse::<i64>()
                .map(WordId::Number)
                .unwrap_or_else(|_| WordId::Text(key.to_string())),
            _ => WordId::Text(key.to_string()),
        }
    }

    /// Parse user input
    ///
    /// Only canonical integers (`42`, `-3`) become numeric ids. `0042` or
    /// `+5` stay text so they are not renumbered.
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim();
        match trimmed.parse::<i64>() {
            Ok(n) if n.to_string() == trimmed => WordId::Number(n),
            _ => WordId::Text(trimmed.to_string()),
        }
    }

    /// Every identifier `s` may refer to, most likely first
    pub fn lookup_candidates(s: &str) -> Vec<Self> {
        let parsed = Self::parse(s);
        let other = match &parsed {
            WordId::Number(n) => Some(WordId::Text(n.to_string())),
            WordId::Text(t) => t.parse::<i64>().ok().map(WordId::Number),
        };
        std::iter::once(parsed).chain(other).collect()
    }

    /// Key used as the storage primary key
    pub fn key(&self) -> String {
        match self {
            WordId::Number(n) => n.to_string(),
            WordId::Text(s) => s.clone(),
        }
    }
}

impl std::fmt::Display for WordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WordId::Number(n) => write!(f, "{}", n),
            WordId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for WordId {
    fn from(n: i64) -> Self {
        WordId::Number(n)
    }
}

impl From<&str> for WordId {
    fn from(s: &str) -> Self {
        WordId::Text(s.to_string())
    }
}

impl From<String> for WordId {
    fn from(s: String) -> Self {
        WordId::Text(s)
    }
}

// ============================================================================
// WORD STATUS
// ============================================================================

/// Learner-assigned status of a word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WordStatus {
    /// Not studied yet
    #[default]
    New,
    /// Flagged for more review
    Review,
    /// Learner knows the word
    Learned,
    /// Learner has fully mastered the word
    Mastered,
}

impl WordStatus {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            WordStatus::New => "new",
            WordStatus::Review => "review",
            WordStatus::Learned => "learned",
            WordStatus::Mastered => "mastered",
        }
    }

    /// Parse from string name, unknown names map to `New`
    pub fn parse_name(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "review" => WordStatus::Review,
            "learned" => WordStatus::Learned,
            "mastered" => WordStatus::Mastered,
            _ => WordStatus::New,
        }
    }
}

impl std::fmt::Display for WordStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for WordStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "new" => Ok(WordStatus::New),
            "review" => Ok(WordStatus::Review),
            "learned" => Ok(WordStatus::Learned),
            "mastered" => Ok(WordStatus::Mastered),
            _ => Err(format!("Unknown status: {}", s)),
        }
    }
}

// ============================================================================
// VOCABULARY ITEM
// ============================================================================

/// A word in the learner's vocabulary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyItem {
    /// Stable identifier, absent until assigned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<WordId>,
    /// The headword itself
    pub word: String,
    /// Part of speech (noun, verb, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_of_speech: Option<String>,
    /// Translation into the learner's language
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meaning: Option<String>,
    /// Example sentence in the studied language
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example_source: Option<String>,
    /// Translated example sentence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example_target: Option<String>,
    #[serde(default)]
    pub synonyms: Vec<String>,
    #[serde(default)]
    pub antonyms: Vec<String>,
    /// Inflected forms (plural, past tense, ...) in whatever shape the source had
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_forms: Option<serde_json::Value>,
    #[serde(default)]
    pub status: WordStatus,

    // ========== Spaced repetition ==========
    /// Consecutive successful reviews since the last failure
    #[serde(default)]
    pub mastery_level: u32,
    /// Earliest instant the word should be shown again; `None` means due now
    #[serde(default)]
    pub next_review_at: Option<DateTime<Utc>>,
    /// When the most recent review outcome was recorded
    #[serde(default)]
    pub last_reviewed_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

impl VocabularyItem {
    /// Create a new, immediately due item
    pub fn new(word: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: None,
            word: word.into(),
            part_of_speech: None,
            meaning: None,
            example_source: None,
            example_target: None,
            synonyms: vec![],
            antonyms: vec![],
            other_forms: None,
            status: WordStatus::New,
            mastery_level: 0,
            next_review_at: Some(now),
            last_reviewed_at: None,
            created_at: now,
        }
    }

    /// Build an item from learner input, assigning an identifier if needed
    pub fn from_new(input: NewWord, now: DateTime<Utc>) -> Self {
        let mut item = Self::new(input.word.trim(), now);
        item.id = Some(input.id.unwrap_or_else(WordId::generate));
        item.part_of_speech = input.part_of_speech;
        item.meaning = input.meaning;
        item.example_source = input.example_source;
        item.example_target = input.example_target;
        item.synonyms = input.synonyms;
        item.antonyms = input.antonyms;
        item
    }

    /// Builder-style identifier assignment
    pub fn with_id(mut self, id: impl Into<WordId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Whether the learner marked the word as known
    pub fn is_known(&self) -> bool {
        matches!(self.status, WordStatus::Learned | WordStatus::Mastered)
    }

    /// Whether the word is due at the given instant (inclusive)
    pub fn is_due_at(&self, now: DateTime<Utc>) -> bool {
        self.next_review_at.map(|t| t <= now).unwrap_or(true)
    }
}

// ============================================================================
// INPUT TYPES
// ============================================================================

/// Input for adding a word
///
/// Uses `deny_unknown_fields` so typos in hand-written input are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewWord {
    /// Optional caller-chosen identifier
    #[serde(default)]
    pub id: Option<WordId>,
    pub word: String,
    #[serde(default)]
    pub part_of_speech: Option<String>,
    #[serde(default)]
    pub meaning: Option<String>,
    #[serde(default)]
    pub example_source: Option<String>,
    #[serde(default)]
    pub example_target: Option<String>,
    #[serde(default)]
    pub synonyms: Vec<String>,
    #[serde(default)]
    pub antonyms: Vec<String>,
}

// ============================================================================
// TESTS
// ============================================================================
