use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{ChapterId, LessonKey};

/// Minimum score that marks a lesson attempt as completing the lesson.
pub const PASSING_SCORE: u8 = 60;

/// Per-lesson progress. Created on the first attempt, updated on every
/// subsequent one; score and time reflect the latest attempt while
/// `completed` latches once reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonProgress {
    pub completed: bool,
    pub score: u8,
    pub time_spent_ms: u64,
    pub attempts: u32,
}

impl LessonProgress {
    #[must_use]
    pub fn first_attempt(score: u8, time_spent_ms: u64) -> Self {
        let score = score.min(100);
        Self {
            completed: score >= PASSING_SCORE,
            score,
            time_spent_ms,
            attempts: 1,
        }
    }

    /// Overwrite score/time with the latest attempt. Completion never
    /// un-latches: a failed retry does not invalidate an earlier pass.
    pub fn record_attempt(&mut self, score: u8, time_spent_ms: u64) {
        let score = score.min(100);
        self.completed = self.completed || score >= PASSING_SCORE;
        self.score = score;
        self.time_spent_ms = time_spent_ms;
        self.attempts = self.attempts.saturating_add(1);
    }
}

/// Per-chapter progress.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterProgress {
    pub completed: bool,
    pub lessons_done: u32,
}

/// Canonical progress record. Owned and mutated by the progress engine;
/// everything else only reads snapshots of it.
///
/// `total_xp` is monotonically non-decreasing except through [`Self::reset`],
/// and `streak` changes only through [`Self::set_streak`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgressRecord {
    total_xp: u64,
    streak: u32,
    lessons: HashMap<LessonKey, LessonProgress>,
    chapters: HashMap<ChapterId, ChapterProgress>,
}

impl ProgressRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert the lesson entry for `key` and add `xp_award` to the total.
    ///
    /// Always succeeds against the in-memory record; scores above 100 are
    /// clamped and XP addition saturates.
    pub fn record_lesson(&mut self, key: LessonKey, score: u8, time_spent_ms: u64, xp_award: u64) {
        match self.lessons.get_mut(&key) {
            Some(lesson) => lesson.record_attempt(score, time_spent_ms),
            None => {
                self.lessons
                    .insert(key, LessonProgress::first_attempt(score, time_spent_ms));
            }
        }
        self.total_xp = self.total_xp.saturating_add(xp_award);
    }

    /// Upsert the chapter entry for `id`.
    pub fn record_chapter(&mut self, id: ChapterId, completed: bool, lessons_done: u32) {
        let entry = self.chapters.entry(id).or_default();
        entry.completed = entry.completed || completed;
        entry.lessons_done = lessons_done.max(entry.lessons_done);
    }

    /// Set the consecutive-day study count. The only streak mutation path.
    pub fn set_streak(&mut self, days: u32) {
        self.streak = days;
    }

    /// Explicit reset, the one sanctioned decrease of `total_xp`.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    #[must_use]
    pub fn total_xp(&self) -> u64 {
        self.total_xp
    }

    #[must_use]
    pub fn streak(&self) -> u32 {
        self.streak
    }

    #[must_use]
    pub fn lesson(&self, key: &LessonKey) -> Option<&LessonProgress> {
        self.lessons.get(key)
    }

    #[must_use]
    pub fn lessons(&self) -> &HashMap<LessonKey, LessonProgress> {
        &self.lessons
    }

    #[must_use]
    pub fn chapters(&self) -> &HashMap<ChapterId, ChapterProgress> {
        &self.chapters
    }
}
