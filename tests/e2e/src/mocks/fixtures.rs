//! Test Data Factory
//!
//! Provides utilities for generating realistic test data:
//! - Words with translations, examples and related words
//! - Batch generation for stress testing
//! - Legacy word-list JSON as produced by older decks
//! - Pre-built scenarios for common test cases

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Value};
use wordwise_core::{
    NewWord, ReviewOutcome, Storage, VocabularyItem, VocabularyService, WordId,
};

/// Headwords with Turkish translations, cycled by the generators
const SAMPLE_WORDS: &[(&str, &str, &str)] = &[
    ("abundant", "bol", "adjective"),
    ("benevolent", "iyiliksever", "adjective"),
    ("candid", "samimi", "adjective"),
    ("diligent", "çalışkan", "adjective"),
    ("endeavor", "çaba", "noun"),
    ("forsake", "terk etmek", "verb"),
    ("gregarious", "sosyal", "adjective"),
    ("hinder", "engellemek", "verb"),
    ("inevitable", "kaçınılmaz", "adjective"),
    ("jeopardy", "tehlike", "noun"),
];

/// Factory for creating test data
///
/// # Example
///
/// ```rust,ignore
/// let word = TestDataFactory::create_word(&service, "serendipity");
/// let ids = TestDataFactory::create_batch(&service, 100);
/// let scenario = TestDataFactory::create_review_ladder_scenario(&service);
/// ```
pub struct TestDataFactory;

/// Configuration for batch word generation
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Number of words to create
    pub count: usize,
    /// Headword prefix; sample words are used when `None`
    pub prefix: Option<String>,
    /// Use numeric identifiers starting here; UUIDs otherwise
    pub first_numeric_id: Option<i64>,
    /// Attach synonyms and antonyms
    pub with_related_words: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            count: 10,
            prefix: None,
            first_numeric_id: Some(1),
            with_related_words: false,
        }
    }
}

/// Scenario containing related test data
#[derive(Debug)]
pub struct TestScenario {
    /// Identifiers of created words
    pub word_ids: Vec<WordId>,
    /// Description of the scenario
    pub description: String,
    /// Metadata for test assertions
    pub metadata: HashMap<String, String>,
}

impl TestDataFactory {
    // ========================================================================
    // SINGLE WORD CREATION
    // ========================================================================

    /// Create a word with a generated identifier
    pub fn create_word(service: &VocabularyService, word: &str) -> Option<VocabularyItem> {
        service
            .add_word(NewWord {
                word: word.to_string(),
                ..Default::default()
            })
            .ok()
    }

    /// Create a word with every optional field filled in
    pub fn create_word_full(
        service: &VocabularyService,
        id: WordId,
        word: &str,
        meaning: &str,
    ) -> Option<VocabularyItem> {
        service
            .add_word(NewWord {
                id: Some(id),
                word: word.to_string(),
                part_of_speech: Some("noun".to_string()),
                meaning: Some(meaning.to_string()),
                example_source: Some(format!("The {} was unexpected.", word)),
                example_target: Some(format!("{} beklenmedikti.", meaning)),
                synonyms: vec![format!("{}-syn", word)],
                antonyms: vec![format!("{}-ant", word)],
            })
            .ok()
    }

    /// A word as the pure scheduler sees it, not stored anywhere
    pub fn detached_word(id: i64, level: u32, next_review_at: Option<DateTime<Utc>>) -> VocabularyItem {
        let created = next_review_at.unwrap_or_else(Utc::now);
        let mut item = VocabularyItem::new(format!("detached-{}", id), created).with_id(id);
        item.mastery_level = level;
        item.next_review_at = next_review_at;
        item
    }

    // ========================================================================
    // BATCH CREATION
    // ========================================================================

    /// Create a batch of words with default configuration
    pub fn create_batch(service: &VocabularyService, count: usize) -> Vec<WordId> {
        Self::create_batch_with_config(
            service,
            BatchConfig {
                count,
                ..Default::default()
            },
        )
    }

    /// Create a batch of words with custom configuration
    pub fn create_batch_with_config(service: &VocabularyService, config: BatchConfig) -> Vec<WordId> {
        let mut ids = Vec::with_capacity(config.count);

        for i in 0..config.count {
            let (sample, meaning, pos) = SAMPLE_WORDS[i % SAMPLE_WORDS.len()];
            let word = match &config.prefix {
                Some(prefix) => format!("{}-{}", prefix, i),
                None => format!("{}-{}", sample, i),
            };

            let (synonyms, antonyms) = if config.with_related_words {
                (vec![format!("{}-like", sample)], vec![format!("non-{}", sample)])
            } else {
                (vec![], vec![])
            };

            let input = NewWord {
                id: config.first_numeric_id.map(|first| WordId::Number(first + i as i64)),
                word,
                part_of_speech: Some(pos.to_string()),
                meaning: Some(meaning.to_string()),
                synonyms,
                antonyms,
                ..Default::default()
            };

            if let Ok(item) = service.add_word(input) {
                ids.extend(item.id);
            }
        }

        ids
    }

    // ========================================================================
    // LEGACY WORD LISTS
    // ========================================================================

    /// One word record using the field spellings of older decks
    pub fn legacy_record(id: i64, index: usize) -> Value {
        let (word, meaning, pos) = SAMPLE_WORDS[index % SAMPLE_WORDS.len()];
        json!({
            "ID": id,
            "word_en": word,
            "pos": pos,
            "meaning_tr": meaning,
            "example_en": format!("It was {}.", word),
            "example_tr": format!("{} idi.", meaning),
            "synonyms": [],
            "antonyms": [],
            "other_forms": { "base": word },
            "level": 0,
            "isKnown": false
        })
    }

    /// A legacy deck of `count` words as a JSON array string
    pub fn legacy_word_list_json(count: usize) -> String {
        let records: Vec<Value> = (0..count)
            .map(|i| Self::legacy_record(100 + i as i64, i))
            .collect();
        Value::Array(records).to_string()
    }

    // ========================================================================
    // SCENARIOS
    // ========================================================================

    /// Words at every rung of the interval table, reviewed at the current instant
    ///
    /// Metadata: `level:<id>` holds the level each word reached.
    pub fn create_review_ladder_scenario(service: &VocabularyService) -> TestScenario {
        let mut word_ids = Vec::new();
        let mut metadata = HashMap::new();

        for level in 0..=6u32 {
            let id = WordId::Number(1_000 + level as i64);
            let word = format!("rung{}", level);
            if Self::create_word_full(service, id.clone(), &word, "basamak").is_none() {
                continue;
            }
            for _ in 0..level {
                service
                    .record_review(&id, ReviewOutcome::Pass)
                    .expect("Failed to seed review");
            }
            metadata.insert(format!("level:{}", id), level.to_string());
            word_ids.push(id);
        }

        TestScenario {
            word_ids,
            description: "One word per interval level, 0 through 6".to_string(),
            metadata,
        }
    }

    /// Words whose next review is spread around `now`
    ///
    /// Written straight to storage so the due dates are exact. Metadata:
    /// `due_count` is the number of words due at `now`.
    pub fn create_due_spread_scenario(storage: &Storage, now: DateTime<Utc>) -> TestScenario {
        let offsets_hours: [i64; 6] = [-48, -1, 0, 1, 24, 72];
        let mut word_ids = Vec::new();

        for (i, hours) in offsets_hours.iter().enumerate() {
            let mut item = VocabularyItem::new(format!("spread-{}", i), now - Duration::days(7))
                .with_id(format!("spread-{}", i));
            item.next_review_at = Some(now + Duration::hours(*hours));
            if storage.add_word(&item).is_ok() {
                word_ids.extend(item.id);
            }
        }

        let due_count = offsets_hours.iter().filter(|h| **h <= 0).count();
        let mut metadata = HashMap::new();
        metadata.insert("due_count".to_string(), due_count.to_string());

        TestScenario {
            word_ids,
            description: "Next reviews from two days ago to three days ahead".to_string(),
            metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::TestDatabaseManager;

    #[test]
    fn test_create_batch() {
        let db = TestDatabaseManager::new_temp();
        let ids = TestDataFactory::create_batch(&db.service, 25);
        assert_eq!(ids.len(), 25);
        assert_eq!(ids[0], WordId::Number(1));
        assert_eq!(db.word_count(), 25);
    }

    #[test]
    fn test_batch_with_uuid_ids() {
        let db = TestDatabaseManager::new_temp();
        let ids = TestDataFactory::create_batch_with_config(
            &db.service,
            BatchConfig {
                count: 3,
                first_numeric_id: None,
                with_related_words: true,
                ..Default::default()
            },
        );
        assert_eq!(ids.len(), 3);
        assert!(ids.iter().all(|id| matches!(id, WordId::Text(_))));

        let word = db.storage().get_word(&ids[0]).unwrap().unwrap();
        assert_eq!(word.synonyms, vec!["abundant-like"]);
    }

    #[test]
    fn test_legacy_word_list_parses() {
        let json = TestDataFactory::legacy_word_list_json(3);
        let words = wordwise_core::parse_word_list(&json, Utc::now()).unwrap();
        assert_eq!(words.len(), 3);
        assert_eq!(words[0].id, Some(WordId::Number(100)));
        assert_eq!(words[0].meaning.as_deref(), Some("bol"));
    }

    #[test]
    fn test_due_spread_scenario() {
        let db = TestDatabaseManager::new_temp();
        let scenario = TestDataFactory::create_due_spread_scenario(db.storage(), db.now());
        assert_eq!(scenario.word_ids.len(), 6);
        assert_eq!(scenario.metadata["due_count"], "3");
    }
}
