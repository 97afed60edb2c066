//! Clock-bound scheduler
//!
//! Wraps the pure functions in [`super::algorithm`] with an injected clock so
//! callers that don't care about the evaluation instant get wall-clock time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::algorithm::{record_review_outcome, select_due_items, ReviewOutcome, ScheduleError};
use super::clock::{Clock, SystemClock};
use crate::vocabulary::VocabularyItem;

/// Both possible results of reviewing an item at one instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPreview {
    pub pass: VocabularyItem,
    pub fail: VocabularyItem,
}

/// Pass and fail results for `item` at `now`, side by side
pub fn preview_outcomes(
    item: &VocabularyItem,
    now: DateTime<Utc>,
) -> Result<ReviewPreview, ScheduleError> {
    Ok(ReviewPreview {
        pass: record_review_outcome(item, ReviewOutcome::Pass, now)?,
        fail: record_review_outcome(item, ReviewOutcome::Fail, now)?,
    })
}

/// Spaced repetition scheduler with an injectable clock
#[derive(Clone)]
pub struct SrsScheduler {
    clock: Arc<dyn Clock>,
}

impl Default for SrsScheduler {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl std::fmt::Debug for SrsScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SrsScheduler")
            .field("now", &self.clock.now())
            .finish()
    }
}

impl SrsScheduler {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Current instant according to the injected clock
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Apply a review outcome at the current instant
    pub fn review(
        &self,
        item: &VocabularyItem,
        outcome: ReviewOutcome,
    ) -> Result<VocabularyItem, ScheduleError> {
        record_review_outcome(item, outcome, self.now())
    }

    /// Items due at the current instant, in input order
    pub fn due(&self, items: &[VocabularyItem]) -> Vec<VocabularyItem> {
        select_due_items(items, self.now())
    }

    /// What a pass and a fail would each produce right now
    pub fn preview(&self, item: &VocabularyItem) -> Result<ReviewPreview, ScheduleError> {
        preview_outcomes(item, self.now())
    }
}
