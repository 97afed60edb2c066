//! Spaced Repetition Scheduler Module
//!
//! Leitner-style fixed interval scheduling for vocabulary review.
//!
//! ## Rules
//! - Pass: mastery level + 1, next review after `INTERVAL_DAYS[level]` days
//!   (levels past the table use the last entry).
//! - Fail: mastery level 0, due again immediately.
//! - Every outcome stamps `last_reviewed_at`.
//!
//! ## Interval table (days, by level reached)
//! `[0, 1, 3, 7, 14, 30]`
//!
//! Items are never retired: a word at level 40 is still reviewed every 30 days.

mod algorithm;
mod clock;
mod scheduler;

pub use algorithm::{
    due_items,
    // Core functions
    interval_days,
    is_due,
    next_review_at,
    record_review_outcome,
    require_identifier,
    select_due_items,
    ReviewOutcome,
    ScheduleError,
    // Constants
    INTERVAL_DAYS,
    MASTERED_LEVEL,
};

pub use clock::{Clock, FixedClock, SystemClock};
pub use scheduler::{preview_outcomes, ReviewPreview, SrsScheduler};
