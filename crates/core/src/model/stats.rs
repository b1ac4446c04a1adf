use chrono::{Datelike, NaiveDate};

use crate::model::ProgressRecord;

/// Lessons targeted per week.
pub const WEEKLY_LESSON_GOAL: u32 = 5;

/// Minutes of study targeted per day.
pub const DAILY_TIME_GOAL_MINUTES: u64 = 60;

/// Aggregate statistics derived from a progress record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StudyStats {
    pub lessons_completed: u32,
    pub perfect_scores: u32,
    pub total_minutes: u64,
    pub chapters_completed: u32,
}

impl StudyStats {
    /// Recomputes all statistics from scratch. Restartable, no caching.
    #[must_use]
    pub fn compute(record: &ProgressRecord) -> Self {
        let mut lessons_completed = 0_u32;
        let mut perfect_scores = 0_u32;
        let mut total_ms = 0_u64;
        for lesson in record.lessons().values() {
            if lesson.completed {
                lessons_completed = lessons_completed.saturating_add(1);
            }
            if lesson.score == 100 {
                perfect_scores = perfect_scores.saturating_add(1);
            }
            total_ms = total_ms.saturating_add(lesson.time_spent_ms);
        }
        let chapters_completed = u32::try_from(
            record
                .chapters()
                .values()
                .filter(|chapter| chapter.completed)
                .count(),
        )
        .unwrap_or(u32::MAX);

        Self {
            lessons_completed,
            perfect_scores,
            total_minutes: total_ms / 60_000,
            chapters_completed,
        }
    }

    /// Human-readable total study time: `"{h}h {m}m"`, or just `"{m}m"`
    /// under an hour.
    #[must_use]
    pub fn time_display(&self) -> String {
        let hours = self.total_minutes / 60;
        let minutes = self.total_minutes % 60;
        if hours > 0 {
            format!("{hours}h {minutes}m")
        } else {
            format!("{minutes}m")
        }
    }
}

/// Progress toward a single goal, percentage clamped to 0..=100.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoalProgress {
    pub current: u64,
    pub target: u64,
    pub pct: f64,
}

impl GoalProgress {
    fn new(current: u64, target: u64) -> Self {
        #[allow(clippy::cast_precision_loss)]
        let pct = (current as f64 / target as f64 * 100.0).clamp(0.0, 100.0);
        Self {
            current,
            target,
            pct,
        }
    }
}

/// Weekly goal standing.
///
/// The "weekly" lesson count and "daily" minutes are modulo approximations
/// over cumulative totals, not true calendar windows. Kept as-is until the
/// product decides otherwise; tests encode this behavior.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeeklyGoals {
    pub lessons: GoalProgress,
    pub study_time: GoalProgress,
}

impl WeeklyGoals {
    #[must_use]
    pub fn compute(stats: &StudyStats) -> Self {
        Self {
            lessons: GoalProgress::new(
                u64::from(stats.lessons_completed % 7),
                u64::from(WEEKLY_LESSON_GOAL),
            ),
            study_time: GoalProgress::new(stats.total_minutes % 60, DAILY_TIME_GOAL_MINUTES),
        }
    }
}

/// One entry of the Monday-first streak calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakDay {
    pub label: &'static str,
    pub active: bool,
}

const DAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Builds the 7-day streak calendar for the week containing `today`.
///
/// A day is active if it is not in the future and falls within the last
/// `streak` days ending today.
#[must_use]
pub fn streak_calendar(today: NaiveDate, streak: u32) -> [StreakDay; 7] {
    let today_idx = today.weekday().num_days_from_monday();
    let mut days = [StreakDay {
        label: "",
        active: false,
    }; 7];
    for (i, day) in days.iter_mut().enumerate() {
        let idx = u32::try_from(i).unwrap_or(u32::MAX);
        day.label = DAY_LABELS[i];
        day.active = idx <= today_idx && today_idx - idx < streak;
    }
    days
}
