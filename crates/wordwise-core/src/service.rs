//! Vocabulary Service
//!
//! The caller side of the scheduler: loads a word, applies the review outcome
//! with the injected clock, persists the result and only then publishes a
//! [`VocabularyEvent`]. Reviews, status changes, deletes and unknown-list
//! additions of the same identifier are serialized.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::broadcast;

use crate::events::VocabularyEvent;
use crate::progress::{current_stats, record_study, DailyStats, StudyProgress};
use crate::srs::{record_review_outcome, Clock, ReviewOutcome, ScheduleError, SystemClock};
use crate::storage::{Storage, StorageError, WordStore};
use crate::vocabulary::{NewWord, VocabularyItem, VocabularyStats, WordId, WordStatus};

/// Capacity of the event channel before slow subscribers start lagging
pub const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Review error type
#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    /// The word cannot be scheduled as given
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// No word with this identifier
    #[error("Word not found: {0}")]
    NotFound(WordId),
    /// The store rejected the load or the write
    #[error("Persistence failure: {0}")]
    PersistenceFailure(#[source] StorageError),
}

impl From<ScheduleError> for ReviewError {
    fn from(e: ScheduleError) -> Self {
        match e {
            ScheduleError::InvalidArgument(msg) => ReviewError::InvalidArgument(msg),
        }
    }
}

impl From<StorageError> for ReviewError {
    fn from(e: StorageError) -> Self {
        ReviewError::PersistenceFailure(e)
    }
}

/// Result of [`VocabularyService::record_tracked_review`]
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedReview {
    /// The word after review and status change
    pub item: VocabularyItem,
    /// Study progress after a pass
    pub progress: Option<StudyProgress>,
    /// Whether a fail put the word on the unknown list
    pub added_to_unknown: bool,
}

/// Review and word-list operations with change notifications
pub struct VocabularyService<S: WordStore = Storage> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    event_tx: broadcast::Sender<VocabularyEvent>,
    /// One lock per identifier with an update in flight
    word_locks: Mutex<HashMap<WordId, Arc<Mutex<()>>>>,
}

impl<S: WordStore> std::fmt::Debug for VocabularyService<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VocabularyService")
            .field("subscribers", &self.event_tx.receiver_count())
            .finish()
    }
}

fn lock_ignoring_poison<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl<S: WordStore> VocabularyService<S> {
    /// Service on the wall clock
    pub fn new(store: Arc<S>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            store,
            clock,
            event_tx,
            word_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Receive every event published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<VocabularyEvent> {
        self.event_tx.subscribe()
    }

    /// Publish an event (no-op when nobody is listening)
    fn emit(&self, event: VocabularyEvent) {
        let kind = event.kind();
        if self.event_tx.send(event).is_err() {
            tracing::trace!("No subscribers for {}", kind);
        }
    }

    /// Run `f` while holding the lock of `id`
    fn with_word_lock<T>(&self, id: &WordId, f: impl FnOnce() -> T) -> T {
        let lock = {
            let mut locks = lock_ignoring_poison(&self.word_locks);
            locks.entry(id.clone()).or_default().clone()
        };

        let result = {
            let _guard = lock_ignoring_poison(&lock);
            f()
        };

        let mut locks = lock_ignoring_poison(&self.word_locks);
        // Only the map and `lock` hold it: nobody else is waiting
        if Arc::strong_count(&lock) == 2 {
            locks.remove(id);
        }
        result
    }

    /// Record a review outcome for the word with `id`
    ///
    /// The updated word is persisted before `WordReviewed` is published. On a
    /// persistence failure nothing is published and the stored word keeps its
    /// previous state.
    pub fn record_review(
        &self,
        id: &WordId,
        outcome: impl Into<ReviewOutcome>,
    ) -> Result<VocabularyItem, ReviewError> {
        if id.is_blank() {
            return Err(ReviewError::InvalidArgument(
                "identifier cannot be blank".to_string(),
            ));
        }
        let outcome = outcome.into();

        let reviewed = self.with_word_lock(id, || self.review_locked(id, outcome))?;
        if let Some(next_review_at) = reviewed.next_review_at {
            self.emit(VocabularyEvent::WordReviewed {
                id: id.clone(),
                outcome,
                mastery_level: reviewed.mastery_level,
                next_review_at,
                timestamp: reviewed.last_reviewed_at.unwrap_or(next_review_at),
            });
        }
        Ok(reviewed)
    }

    fn review_locked(
        &self,
        id: &WordId,
        outcome: ReviewOutcome,
    ) -> Result<VocabularyItem, ReviewError> {
        let current = self
            .store
            .load_word(id)?
            .ok_or_else(|| ReviewError::NotFound(id.clone()))?;

        let reviewed = record_review_outcome(&current, outcome, self.clock.now())?;
        self.store
            .save_review_state(&reviewed)
            .map_err(|e| match e {
                // Deleted outside this service since the load
                StorageError::NotFound(_) => ReviewError::NotFound(id.clone()),
                other => ReviewError::PersistenceFailure(other),
            })?;

        tracing::debug!(
            "Reviewed {} ({}): level {} -> {}",
            id,
            outcome,
            current.mastery_level,
            reviewed.mastery_level
        );
        Ok(reviewed)
    }
}

impl VocabularyService<Storage> {
    /// Add a new word, assigning an identifier if none was given
    pub fn add_word(&self, input: NewWord) -> Result<VocabularyItem, StorageError> {
        if input.word.trim().is_empty() {
            return Err(StorageError::InvalidInput("word cannot be empty".to_string()));
        }
        if input.id.as_ref().is_some_and(WordId::is_blank) {
            return Err(StorageError::InvalidInput(
                "identifier cannot be blank".to_string(),
            ));
        }

        let now = self.clock.now();
        let item = self.store.add_word(&VocabularyItem::from_new(input, now))?;

        if let Some(id) = &item.id {
            self.emit(VocabularyEvent::WordAdded {
                id: id.clone(),
                word: item.word.clone(),
                timestamp: now,
            });
        }
        Ok(item)
    }

    /// Words due now, in insertion order
    pub fn due_words(&self) -> Result<Vec<VocabularyItem>, StorageError> {
        self.store.get_due_words(self.clock.now())
    }

    pub fn stats(&self) -> Result<VocabularyStats, StorageError> {
        self.store.get_stats(self.clock.now())
    }

    pub fn set_status(
        &self,
        id: &WordId,
        status: WordStatus,
    ) -> Result<VocabularyItem, StorageError> {
        let item = self.with_word_lock(id, || self.store.set_status(id, status))?;
        self.emit(VocabularyEvent::status_changed(
            id.clone(),
            status,
            self.clock.now(),
        ));
        Ok(item)
    }

    pub fn delete_word(&self, id: &WordId) -> Result<bool, StorageError> {
        let deleted = self.with_word_lock(id, || self.store.delete_word(id))?;
        if deleted {
            self.emit(VocabularyEvent::WordDeleted {
                id: id.clone(),
                timestamp: self.clock.now(),
            });
        }
        Ok(deleted)
    }

    /// Put every word back to level 0, due now
    pub fn reset_progress(&self) -> Result<usize, StorageError> {
        let now = self.clock.now();
        let words_reset = self.store.reset_progress(now)?;
        self.emit(VocabularyEvent::ProgressReset {
            words_reset,
            timestamp: now,
        });
        Ok(words_reset)
    }

    /// Upsert a batch of words, generating identifiers where missing
    pub fn import_words(&self, items: Vec<VocabularyItem>) -> Result<usize, StorageError> {
        let items: Vec<VocabularyItem> = items
            .into_iter()
            .map(|mut item| {
                if item.id.as_ref().is_none_or(WordId::is_blank) {
                    item.id = Some(WordId::generate());
                }
                item
            })
            .collect();

        let count = self.store.import_words(&items)?;
        self.emit(VocabularyEvent::WordsImported {
            count,
            timestamp: self.clock.now(),
        });
        Ok(count)
    }

    /// Add the word with `id` to the unknown list
    ///
    /// Returns `false` when its headword is already on the list.
    pub fn mark_unknown(&self, id: &WordId) -> Result<bool, StorageError> {
        let now = self.clock.now();
        let (item, added) = self.with_word_lock(id, || -> Result<_, StorageError> {
            let item = self
                .store
                .get_word(id)?
                .ok_or_else(|| StorageError::NotFound(id.to_string()))?;
            let added = self.store.add_unknown_word(&item, now)?;
            Ok((item, added))
        })?;

        if added {
            self.emit(VocabularyEvent::UnknownWordsChanged {
                word: item.word,
                added: true,
                timestamp: now,
            });
        }
        Ok(added)
    }

    /// Remove a headword from the unknown list
    pub fn mark_known(&self, word: &str) -> Result<bool, StorageError> {
        let removed = self.store.remove_unknown_word(word)?;
        if removed {
            self.emit(VocabularyEvent::UnknownWordsChanged {
                word: word.to_string(),
                added: false,
                timestamp: self.clock.now(),
            });
        }
        Ok(removed)
    }

    /// Record one study activity today
    pub fn record_study(&self) -> Result<StudyProgress, StorageError> {
        let now = self.clock.now();
        let today = now.date_naive();

        let progress = record_study(&self.store.get_study_progress()?, today);
        self.store.save_study_progress(&progress)?;

        self.emit(VocabularyEvent::StudyRecorded {
            daily_streak: progress.daily_streak,
            total_points: progress.total_points,
            date: today,
            timestamp: now,
        });
        Ok(progress)
    }

    /// Review a word and update everything an answered flashcard touches
    ///
    /// A pass marks the word learned and records a study activity. A fail
    /// marks it for review and adds it to the unknown list.
    pub fn record_tracked_review(
        &self,
        id: &WordId,
        outcome: impl Into<ReviewOutcome>,
    ) -> Result<TrackedReview, ReviewError> {
        let outcome = outcome.into();
        self.record_review(id, outcome)?;

        if outcome.is_success() {
            let item = self.set_status(id, WordStatus::Learned)?;
            let progress = self.record_study()?;
            Ok(TrackedReview {
                item,
                progress: Some(progress),
                added_to_unknown: false,
            })
        } else {
            let item = self.set_status(id, WordStatus::Review)?;
            let added_to_unknown = self.mark_unknown(id)?;
            Ok(TrackedReview {
                item,
                progress: None,
                added_to_unknown,
            })
        }
    }

    /// Streak and points as seen today
    pub fn daily_stats(&self) -> Result<DailyStats, StorageError> {
        let today = self.clock.now().date_naive();
        Ok(current_stats(&self.store.get_study_progress()?, today))
    }
}
