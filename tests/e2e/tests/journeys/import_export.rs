//! Journey: import a legacy deck, study it, export and restore elsewhere

use wordwise_core::{
    normalize_word, parse_word_list, ReviewOutcome, VocabularyItem, WordId, WordStatus,
};
use wordwise_e2e_tests::harness::TestDatabaseManager;
use wordwise_e2e_tests::mocks::TestDataFactory;

#[test]
fn test_import_legacy_deck() {
    let db = TestDatabaseManager::new_temp();
    let json = TestDataFactory::legacy_word_list_json(12);

    let words = parse_word_list(&json, db.now()).unwrap();
    assert_eq!(db.service.import_words(words).unwrap(), 12);

    let stored = db.storage().get_all_words().unwrap();
    assert_eq!(stored.len(), 12);
    assert_eq!(stored[0].id, Some(WordId::Number(100)));
    assert_eq!(stored[0].word, "abundant");
    assert_eq!(stored[0].part_of_speech.as_deref(), Some("adjective"));
    assert_eq!(stored[0].example_target.as_deref(), Some("bol idi."));
    assert_eq!(
        stored[0].other_forms,
        Some(serde_json::json!({ "base": "abundant" }))
    );

    // A deck without review dates is due immediately
    assert_eq!(db.service.due_words().unwrap().len(), 12);
}

#[test]
fn test_reimport_updates_in_place() {
    let db = TestDatabaseManager::new_temp();
    let json = TestDataFactory::legacy_word_list_json(3);
    db.service
        .import_words(parse_word_list(&json, db.now()).unwrap())
        .unwrap();

    let mut record = TestDataFactory::legacy_record(101, 1);
    record["meaning_tr"] = serde_json::json!("hayırsever");
    record["isKnown"] = serde_json::json!(true);
    let updated = normalize_word(&record, db.now()).unwrap();
    db.service.import_words(vec![updated]).unwrap();

    let stored = db.storage().get_all_words().unwrap();
    assert_eq!(stored.len(), 3);
    assert_eq!(stored[1].meaning.as_deref(), Some("hayırsever"));
    assert_eq!(stored[1].status, WordStatus::Learned);
}

#[test]
fn test_export_and_restore_preserves_schedule() {
    let source = TestDatabaseManager::new_temp();
    let ids = TestDataFactory::create_batch(&source.service, 5);
    source.service.record_review(&ids[0], ReviewOutcome::Pass).unwrap();
    source.service.record_review(&ids[0], ReviewOutcome::Pass).unwrap();
    source.service.record_review(&ids[1], ReviewOutcome::Fail).unwrap();
    source
        .service
        .set_status(&ids[2], WordStatus::Mastered)
        .unwrap();

    // JSON export as written by the CLI
    let exported = serde_json::to_string_pretty(&source.storage().get_all_words().unwrap()).unwrap();

    let target = TestDatabaseManager::new_temp();
    let words = parse_word_list(&exported, target.now()).unwrap();
    target.service.import_words(words).unwrap();

    let before = source.storage().get_all_words().unwrap();
    let after = target.storage().get_all_words().unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_jsonl_lines_round_trip() {
    let db = TestDatabaseManager::new_temp();
    TestDataFactory::create_batch(&db.service, 4);
    let words = db.storage().get_all_words().unwrap();

    let jsonl: String = words
        .iter()
        .map(|w| serde_json::to_string(w).unwrap() + "\n")
        .collect();

    let parsed: Vec<VocabularyItem> = jsonl
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(parsed, words);
}

#[test]
fn test_backup_copy_opens() {
    let db = TestDatabaseManager::new_temp();
    TestDataFactory::create_batch(&db.service, 3);

    let backup_path = db.path().with_file_name("backup.db");
    db.storage().backup_to(&backup_path).unwrap();

    let restored = TestDatabaseManager::new_at_path(backup_path);
    assert_eq!(restored.word_count(), 3);
}
