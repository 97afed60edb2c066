//! Interval table and review transitions
//!
//! Pure functions only. No clock, no I/O.

use chrono::{DateTime, Duration, Utc};

use crate::vocabulary::{VocabularyItem, WordId};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Days until the next review, indexed by the mastery level reached
pub const INTERVAL_DAYS: [i64; 6] = [0, 1, 3, 7, 14, 30];

/// Level from which a word counts as mastered in statistics
///
/// Statistics only. Words at or above this level keep being scheduled.
pub const MASTERED_LEVEL: u32 = 5;

// ============================================================================
// TYPES
// ============================================================================

/// Outcome of a single review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewOutcome {
    /// Recalled correctly
    Pass,
    /// Forgotten or answered wrong
    Fail,
}

impl ReviewOutcome {
    pub fn is_success(self) -> bool {
        matches!(self, ReviewOutcome::Pass)
    }
}

impl From<bool> for ReviewOutcome {
    fn from(success: bool) -> Self {
        if success {
            ReviewOutcome::Pass
        } else {
            ReviewOutcome::Fail
        }
    }
}

impl std::fmt::Display for ReviewOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReviewOutcome::Pass => write!(f, "pass"),
            ReviewOutcome::Fail => write!(f, "fail"),
        }
    }
}

/// Scheduling error type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    /// The item cannot be scheduled as given
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

// ============================================================================
// CORE FUNCTIONS
// ============================================================================

/// Interval in days for a mastery level, clamped to the last table entry
pub fn interval_days(level: u32) -> i64 {
    let last = INTERVAL_DAYS.len() - 1;
    let index = usize::try_from(level).map_or(last, |l| l.min(last));
    INTERVAL_DAYS[index]
}

/// Next review instant after reaching `level` at `now`
pub fn next_review_at(level: u32, now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::days(interval_days(level))
}

/// Whether an item is due at `now`. `None` means due; the boundary is inclusive.
pub fn is_due(item: &VocabularyItem, now: DateTime<Utc>) -> bool {
    item.is_due_at(now)
}

/// Identifier of a schedulable item
///
/// Downstream persistence is keyed by identifier, so an item without one is
/// rejected instead of silently scheduled.
pub fn require_identifier(item: &VocabularyItem) -> Result<&WordId, ScheduleError> {
    match &item.id {
        None => Err(ScheduleError::InvalidArgument(format!(
            "word '{}' has no identifier",
            item.word
        ))),
        Some(id) if id.is_blank() => Err(ScheduleError::InvalidArgument(format!(
            "word '{}' has a blank identifier",
            item.word
        ))),
        Some(id) => Ok(id),
    }
}

/// Apply a review outcome to an item
///
/// - Pass: level + 1, next review after the table interval for the new level.
/// - Fail: level 0, due again at `now`.
///
/// `last_reviewed_at` is set to `now` either way. Level and next review are
/// produced together in the returned value; the input is left untouched.
pub fn record_review_outcome(
    item: &VocabularyItem,
    outcome: impl Into<ReviewOutcome>,
    now: DateTime<Utc>,
) -> Result<VocabularyItem, ScheduleError> {
    require_identifier(item)?;

    let (level, next) = match outcome.into() {
        ReviewOutcome::Pass => {
            let level = item.mastery_level.saturating_add(1);
            (level, next_review_at(level, now))
        }
        ReviewOutcome::Fail => (0, now),
    };

    Ok(VocabularyItem {
        mastery_level: level,
        next_review_at: Some(next),
        last_reviewed_at: Some(now),
        ..item.clone()
    })
}

/// Lazily yield the items due at `now`, in input order
pub fn due_items<'a, I>(items: I, now: DateTime<Utc>) -> impl Iterator<Item = &'a VocabularyItem>
where
    I: IntoIterator<Item = &'a VocabularyItem>,
{
    items.into_iter().filter(move |item| item.is_due_at(now))
}

/// Collect the items due at `now`, in input order
pub fn select_due_items(items: &[VocabularyItem], now: DateTime<Utc>) -> Vec<VocabularyItem> {
    due_items(items, now).cloned().collect()
}

// ============================================================================
// TESTS
// ============================================================================
