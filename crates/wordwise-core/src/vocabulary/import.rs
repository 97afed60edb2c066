//! Word list import
//!
//! Word lists arrive from several places (remote word APIs, bundled JSON
//! decks, earlier exports) and spell their fields differently. Everything is
//! normalized into [`VocabularyItem`] here.

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::{VocabularyItem, WordId, WordStatus};

/// Import error type
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    /// Input was not valid JSON
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// Top-level value was not an array of words
    #[error("Expected a JSON array of words, found {0}")]
    NotAnArray(&'static str),
}

/// First non-null value among alternative field spellings
fn field<'a>(raw: &'a Value, names: &[&str]) -> Option<&'a Value> {
    names.iter().find_map(|n| raw.get(*n).filter(|v| !v.is_null()))
}

fn text_field(raw: &Value, names: &[&str]) -> Option<String> {
    field(raw, names)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn list_field(raw: &Value, names: &[&str]) -> Vec<String> {
    field(raw, names)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Present but unparseable values are logged and treated as missing
fn timestamp_field(raw: &Value, names: &[&str]) -> Option<DateTime<Utc>> {
    let value = field(raw, names)?;
    let parsed = value
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc));

    if parsed.is_none() {
        tracing::warn!(
            "Ignoring malformed {} {} of word {}",
            names.join("/"),
            value,
            field(raw, &["word", "word_en"]).unwrap_or(&serde_json::Value::Null)
        );
    }
    parsed
}

fn id_field(raw: &Value) -> Option<WordId> {
    match field(raw, &["id", "ID"])? {
        Value::Number(n) => n.as_i64().map(WordId::Number),
        Value::String(s) if !s.trim().is_empty() => Some(WordId::Text(s.trim().to_string())),
        _ => None,
    }
}

/// Normalize one raw word record
///
/// Returns `None` when the record has no headword. Missing identifiers are
/// generated, a missing next review date makes the word due at `now`.
pub fn normalize_word(raw: &Value, now: DateTime<Utc>) -> Option<VocabularyItem> {
    let word = text_field(raw, &["word", "word_en"])?;

    let mut item = VocabularyItem::new(word, now);
    item.id = Some(id_field(raw).unwrap_or_else(WordId::generate));
    item.part_of_speech = text_field(raw, &["partOfSpeech", "pos"]);
    item.meaning = text_field(raw, &["meaning", "meaning_tr", "definition_tr"]);
    item.example_source = text_field(raw, &["exampleSource", "example_en", "example"]);
    item.example_target = text_field(raw, &["exampleTarget", "example_tr"]);
    item.synonyms = list_field(raw, &["synonyms"]);
    item.antonyms = list_field(raw, &["antonyms"]);
    item.other_forms = field(raw, &["otherForms", "other_forms"]).cloned();

    item.status = match text_field(raw, &["status"]) {
        Some(s) => WordStatus::parse_name(&s),
        None if field(raw, &["isKnown"]).and_then(Value::as_bool) == Some(true) => {
            WordStatus::Learned
        }
        None => WordStatus::New,
    };

    item.mastery_level = field(raw, &["masteryLevel", "level"])
        .and_then(Value::as_u64)
        .map(|l| u32::try_from(l).unwrap_or(u32::MAX))
        .unwrap_or(0);
    item.next_review_at =
        Some(timestamp_field(raw, &["nextReviewAt", "nextReviewDate"]).unwrap_or(now));
    item.last_reviewed_at = timestamp_field(raw, &["lastReviewedAt", "lastReviewDate"]);
    item.created_at = timestamp_field(raw, &["createdAt"]).unwrap_or(now);

    Some(item)
}

/// Parse a JSON array of raw word records
///
/// Records without a headword are skipped with a warning.
pub fn parse_word_list(json: &str, now: DateTime<Utc>) -> Result<Vec<VocabularyItem>, ImportError> {
    let value: Value = serde_json::from_str(json)?;
    let records = match value {
        Value::Array(records) => records,
        Value::Object(_) => return Err(ImportError::NotAnArray("object")),
        Value::String(_) => return Err(ImportError::NotAnArray("string")),
        Value::Number(_) => return Err(ImportError::NotAnArray("number")),
        Value::Bool(_) => return Err(ImportError::NotAnArray("boolean")),
        Value::Null => return Err(ImportError::NotAnArray("null")),
    };

    let mut words = Vec::with_capacity(records.len());
    for (index, raw) in records.iter().enumerate() {
        match normalize_word(raw, now) {
            Some(item) => words.push(item),
            None => tracing::warn!("Skipping word record {} without a headword", index),
        }
    }

    Ok(words)
}
