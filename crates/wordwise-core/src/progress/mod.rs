//! Study Progress Module
//!
//! Daily streak and point tracking. A study day counts once; every study
//! activity earns points.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Points awarded per study activity
pub const POINTS_PER_STUDY: u32 = 10;

/// Persisted study progress
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyProgress {
    /// Consecutive days with at least one study activity, as last recorded
    pub daily_streak: u32,
    pub total_points: u32,
    pub last_study_date: Option<NaiveDate>,
}

/// Progress as seen on a given day
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStats {
    pub daily_streak: u32,
    pub total_points: u32,
    pub studied_today: bool,
}

fn yesterday(today: NaiveDate) -> NaiveDate {
    today - Duration::days(1)
}

/// Stats for `today`
///
/// A streak whose last study day is neither today nor yesterday is broken
/// and reported as 0. The stored streak itself is not modified.
pub fn current_stats(progress: &StudyProgress, today: NaiveDate) -> DailyStats {
    let daily_streak = match progress.last_study_date {
        Some(last) if last == today || last == yesterday(today) => progress.daily_streak,
        Some(_) => 0,
        None => progress.daily_streak,
    };

    DailyStats {
        daily_streak,
        total_points: progress.total_points,
        studied_today: progress.last_study_date == Some(today),
    }
}

/// Record one study activity on `today`
///
/// The first activity of a day extends the streak when the previous one was
/// yesterday and restarts it at 1 otherwise. Later activities on the same
/// day only add points.
pub fn record_study(progress: &StudyProgress, today: NaiveDate) -> StudyProgress {
    let total_points = progress.total_points.saturating_add(POINTS_PER_STUDY);

    let daily_streak = match progress.last_study_date {
        Some(last) if last == today => progress.daily_streak,
        Some(last) if last == yesterday(today) => progress.daily_streak.saturating_add(1),
        _ => 1,
    };

    StudyProgress {
        daily_streak,
        total_points,
        last_study_date: Some(today),
    }
}
