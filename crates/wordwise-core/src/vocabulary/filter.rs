//! Word list search

use super::VocabularyItem;

/// Filter words by a case-insensitive search term
///
/// Matches against the headword, meaning, part of speech, synonyms and
/// antonyms. A blank term returns every word. Order is preserved.
pub fn filter_words<'a>(words: &'a [VocabularyItem], term: &str) -> Vec<&'a VocabularyItem> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return words.iter().collect();
    }

    words.iter().filter(|w| matches_term(w, &term)).collect()
}

/// `term` must already be lowercased
fn matches_term(word: &VocabularyItem, term: &str) -> bool {
    let contains = |s: &str| s.to_lowercase().contains(term);

    contains(&word.word)
        || word.meaning.as_deref().is_some_and(contains)
        || word.part_of_speech.as_deref().is_some_and(contains)
        || word.synonyms.iter().any(|s| contains(s))
        || word.antonyms.iter().any(|s| contains(s))
}
