//! Progress/achievement engine.
//!
//! Owns the canonical [`ProgressRecord`]; everything else reads snapshots.
//! Every mutation re-evaluates the achievement catalog against the previous
//! and the new snapshot; the diff drives notifications and feedback.
//! Persistence is fire-and-forget: a failed write is logged and the
//! in-memory record stays authoritative.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::warn;

use progress_core::Clock;
use progress_core::model::{
    Achievement, AchievementStatus, ChapterId, FeedbackEvent, LessonKey, LevelInfo,
    PASSING_SCORE, ProgressRecord, StreakDay, StudyStats, WeeklyGoals, evaluate, newly_earned,
    streak_calendar,
};

use crate::feedback_service::FeedbackService;
use crate::notification_service::NotificationService;
use crate::settings_service::ProgressStore;

/// What a single lesson result did to the record.
#[derive(Debug, Clone)]
pub struct LessonOutcome {
    pub xp_awarded: u64,
    pub leveled_up: bool,
    pub newly_earned: Vec<&'static Achievement>,
}

/// XP awarded for a lesson attempt: a base plus a score share, with a small
/// bonus for a perfect run.
#[must_use]
pub fn xp_for_score(score: u8) -> u64 {
    let score = u64::from(score.min(100));
    let bonus = if score == 100 { 5 } else { 0 };
    10 + score / 10 + bonus
}

/// Single owner of the progress record and the achievement evaluation loop.
pub struct ProgressService {
    store: ProgressStore,
    clock: Clock,
    notifications: Arc<NotificationService>,
    feedback: Arc<FeedbackService>,
    record: Mutex<ProgressRecord>,
}

impl ProgressService {
    #[must_use]
    pub fn new(
        clock: Clock,
        store: ProgressStore,
        notifications: Arc<NotificationService>,
        feedback: Arc<FeedbackService>,
    ) -> Self {
        Self {
            store,
            clock,
            notifications,
            feedback,
            record: Mutex::new(ProgressRecord::new()),
        }
    }

    /// Load the persisted record into memory.
    pub async fn init(&self) {
        let record = self.store.load().await;
        *self.lock() = record;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ProgressRecord> {
        self.record.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a lesson attempt and run the full derivation pipeline:
    /// upsert, persist, achievement diff, notification and feedback
    /// dispatch. Always succeeds against the in-memory record.
    pub async fn record_lesson_result(
        &self,
        key: &LessonKey,
        score: u8,
        time_spent_ms: u64,
    ) -> LessonOutcome {
        let xp_awarded = xp_for_score(score);
        let (previous, current) = {
            let mut record = self.lock();
            let previous = record.clone();
            record.record_lesson(key.clone(), score, time_spent_ms, xp_awarded);
            (previous, record.clone())
        };

        self.persist(&current).await;

        if score >= PASSING_SCORE {
            self.notifications
                .send_lesson_completion_notification(key.as_str(), xp_awarded)
                .await;
            self.feedback.play(FeedbackEvent::LessonCompleted).await;
        }
        if score >= 100 {
            self.feedback.play(FeedbackEvent::PerfectScore).await;
        }

        let leveled_up = LevelInfo::for_xp(current.total_xp()).level
            > LevelInfo::for_xp(previous.total_xp()).level;
        if leveled_up {
            self.feedback.play(FeedbackEvent::LevelUp).await;
        }

        let earned = newly_earned(&previous, &current);
        self.dispatch_achievements(&earned).await;

        LessonOutcome {
            xp_awarded,
            leveled_up,
            newly_earned: earned,
        }
    }

    /// Record a chapter result; a completed chapter can unlock compound
    /// achievements, so the same diff/dispatch pipeline runs.
    pub async fn record_chapter_result(
        &self,
        id: &ChapterId,
        completed: bool,
        lessons_done: u32,
    ) -> Vec<&'static Achievement> {
        let (previous, current) = {
            let mut record = self.lock();
            let previous = record.clone();
            record.record_chapter(id.clone(), completed, lessons_done);
            (previous, record.clone())
        };

        self.persist(&current).await;

        if completed {
            self.feedback.play(FeedbackEvent::ChapterCompleted).await;
        }

        let earned = newly_earned(&previous, &current);
        self.dispatch_achievements(&earned).await;
        earned
    }

    /// Update the consecutive-day streak, dispatch any streak achievements
    /// and refresh the evening streak reminder.
    pub async fn update_streak(&self, days: u32) -> Vec<&'static Achievement> {
        let (previous, current) = {
            let mut record = self.lock();
            let previous = record.clone();
            record.set_streak(days);
            (previous, record.clone())
        };

        self.persist(&current).await;

        if days > previous.streak() {
            self.feedback.play(FeedbackEvent::StreakMilestone).await;
        }
        self.notifications.schedule_streak_reminder(days).await;

        let earned = newly_earned(&previous, &current);
        self.dispatch_achievements(&earned).await;
        earned
    }

    /// Wipe the record back to its initial state and persist that.
    pub async fn reset(&self) {
        let current = {
            let mut record = self.lock();
            record.reset();
            record.clone()
        };
        self.persist(&current).await;
    }

    /// Snapshot of the canonical record.
    #[must_use]
    pub fn snapshot(&self) -> ProgressRecord {
        self.lock().clone()
    }

    /// Level standing derived from the current XP total.
    #[must_use]
    pub fn level(&self) -> LevelInfo {
        LevelInfo::for_xp(self.lock().total_xp())
    }

    /// Derived statistics over the current record.
    #[must_use]
    pub fn stats(&self) -> StudyStats {
        StudyStats::compute(&self.lock())
    }

    /// Weekly goal standing over the current record.
    #[must_use]
    pub fn weekly_goals(&self) -> WeeklyGoals {
        WeeklyGoals::compute(&self.stats())
    }

    /// Monday-first streak calendar for the current week.
    #[must_use]
    pub fn streak_calendar(&self) -> [StreakDay; 7] {
        let streak = self.lock().streak();
        streak_calendar(self.clock.today(), streak)
    }

    /// Every catalog achievement with its earned flag, in catalog order.
    #[must_use]
    pub fn achievements(&self) -> Vec<AchievementStatus> {
        evaluate(&self.lock())
    }

    /// Explicit persistence for teardown paths.
    ///
    /// # Errors
    ///
    /// Returns `PersistError` if the write fails; routine mutations swallow
    /// this, a shutdown caller may want to know.
    pub async fn flush(&self) -> Result<(), crate::error::PersistError> {
        let snapshot = self.snapshot();
        self.store.save(&snapshot).await
    }

    async fn persist(&self, record: &ProgressRecord) {
        if let Err(err) = self.store.save(record).await {
            warn!(error = %err, "persisting progress failed, continuing in memory");
        }
    }

    /// Sequential, per-achievement dispatch: one failing notification is
    /// logged inside the scheduler and never blocks the rest of the batch.
    async fn dispatch_achievements(&self, earned: &[&'static Achievement]) {
        for achievement in earned {
            self.notifications
                .send_achievement_notification(achievement.title, achievement.description)
                .await;
            self.feedback.play(FeedbackEvent::AchievementUnlocked).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xp_award_scales_with_score() {
        assert_eq!(xp_for_score(0), 10);
        assert_eq!(xp_for_score(40), 14);
        assert_eq!(xp_for_score(90), 19);
        assert_eq!(xp_for_score(100), 25);
        assert_eq!(xp_for_score(200), 25, "scores clamp at 100");
    }
}
