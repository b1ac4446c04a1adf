use crate::model::{ProgressRecord, StudyStats};

/// A statistic an achievement threshold is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatField {
    TotalXp,
    Streak,
    LessonsCompleted,
    PerfectScores,
    TotalMinutes,
}

impl StatField {
    fn value(self, record: &ProgressRecord, stats: &StudyStats) -> u64 {
        match self {
            StatField::TotalXp => record.total_xp(),
            StatField::Streak => u64::from(record.streak()),
            StatField::LessonsCompleted => u64::from(stats.lessons_completed),
            StatField::PerfectScores => u64::from(stats.perfect_scores),
            StatField::TotalMinutes => stats.total_minutes,
        }
    }
}

/// How an achievement is earned. Simple milestones are data-driven
/// thresholds; anything needing compound logic drops to a plain function.
#[derive(Debug, Clone, Copy)]
pub enum AchievementCondition {
    Threshold { field: StatField, min: u64 },
    Custom(fn(&ProgressRecord) -> bool),
}

impl AchievementCondition {
    /// Pure check against a record snapshot; `stats` must be derived from
    /// the same snapshot.
    #[must_use]
    pub fn is_met(&self, record: &ProgressRecord, stats: &StudyStats) -> bool {
        match self {
            AchievementCondition::Threshold { field, min } => {
                field.value(record, stats) >= *min
            }
            AchievementCondition::Custom(predicate) => predicate(record),
        }
    }
}

/// One catalog entry. The catalog is fixed at compile time and evaluated in
/// order; ids double as stable identifiers in notifications and storage.
#[derive(Debug, Clone, Copy)]
pub struct Achievement {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub condition: AchievementCondition,
}

fn five_chapters_complete(record: &ProgressRecord) -> bool {
    record
        .chapters()
        .values()
        .filter(|chapter| chapter.completed)
        .count()
        >= 5
}

static CATALOG: [Achievement; 8] = [
    Achievement {
        id: "first_steps",
        title: "First Steps",
        description: "Complete your first lesson",
        condition: AchievementCondition::Threshold {
            field: StatField::LessonsCompleted,
            min: 1,
        },
    },
    Achievement {
        id: "speed_demon",
        title: "Speed Demon",
        description: "Earn 100 XP",
        condition: AchievementCondition::Threshold {
            field: StatField::TotalXp,
            min: 100,
        },
    },
    Achievement {
        id: "streak_starter",
        title: "Streak Starter",
        description: "Study 3 days in a row",
        condition: AchievementCondition::Threshold {
            field: StatField::Streak,
            min: 3,
        },
    },
    Achievement {
        id: "week_warrior",
        title: "Week Warrior",
        description: "Keep a 7-day study streak",
        condition: AchievementCondition::Threshold {
            field: StatField::Streak,
            min: 7,
        },
    },
    Achievement {
        id: "perfectionist",
        title: "Perfectionist",
        description: "Score 100% on 5 lessons",
        condition: AchievementCondition::Threshold {
            field: StatField::PerfectScores,
            min: 5,
        },
    },
    Achievement {
        id: "dedicated_learner",
        title: "Dedicated Learner",
        description: "Complete 10 lessons",
        condition: AchievementCondition::Threshold {
            field: StatField::LessonsCompleted,
            min: 10,
        },
    },
    Achievement {
        id: "marathon",
        title: "Marathon",
        description: "Study for a full hour in total",
        condition: AchievementCondition::Threshold {
            field: StatField::TotalMinutes,
            min: 60,
        },
    },
    Achievement {
        id: "chapter_champion",
        title: "Chapter Champion",
        description: "Finish 5 chapters",
        condition: AchievementCondition::Custom(five_chapters_complete),
    },
];

/// The fixed, ordered achievement catalog.
#[must_use]
pub fn catalog() -> &'static [Achievement] {
    &CATALOG
}

/// Evaluation result for one catalog entry.
#[derive(Debug, Clone, Copy)]
pub struct AchievementStatus {
    pub achievement: &'static Achievement,
    pub earned: bool,
}

/// Applies every catalog condition to the record, in catalog order.
#[must_use]
pub fn evaluate(record: &ProgressRecord) -> Vec<AchievementStatus> {
    let stats = StudyStats::compute(record);
    CATALOG
        .iter()
        .map(|achievement| AchievementStatus {
            achievement,
            earned: achievement.condition.is_met(record, &stats),
        })
        .collect()
}

/// Achievements earned under `current` but not under `previous`.
///
/// Set semantics over the catalog; the returned order matches the catalog so
/// downstream notification dispatch is deterministic.
#[must_use]
pub fn newly_earned(
    previous: &ProgressRecord,
    current: &ProgressRecord,
) -> Vec<&'static Achievement> {
    let prev_stats = StudyStats::compute(previous);
    let curr_stats = StudyStats::compute(current);
    CATALOG
        .iter()
        .filter(|achievement| {
            achievement.condition.is_met(current, &curr_stats)
                && !achievement.condition.is_met(previous, &prev_stats)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ChapterId, LessonKey};

    fn record_with_xp(total_xp: u64) -> ProgressRecord {
        let mut record = ProgressRecord::new();
        record.record_lesson(LessonKey::from("seed"), 50, 0, total_xp);
        record
    }

    #[test]
    fn catalog_ids_are_unique() {
        for (i, a) in catalog().iter().enumerate() {
            for b in &catalog()[i + 1..] {
                assert_ne!(a.id, b.id);
            }
        }
    }

    #[test]
    fn speed_demon_threshold() {
        assert!(
            !evaluate(&record_with_xp(50))
                .iter()
                .find(|s| s.achievement.id == "speed_demon")
                .unwrap()
                .earned
        );
        assert!(
            evaluate(&record_with_xp(150))
                .iter()
                .find(|s| s.achievement.id == "speed_demon")
                .unwrap()
                .earned
        );
    }

    #[test]
    fn diff_is_empty_for_equal_snapshots() {
        let record = record_with_xp(150);
        assert!(newly_earned(&record, &record).is_empty());
    }

    #[test]
    fn diff_yields_exactly_the_crossed_thresholds() {
        let previous = record_with_xp(50);
        let current = record_with_xp(150);

        let earned: Vec<&str> = newly_earned(&previous, &current)
            .iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(earned, vec!["speed_demon"]);
    }

    #[test]
    fn diff_ignores_achievements_lost_by_reset() {
        let previous = record_with_xp(150);
        let current = ProgressRecord::new();
        assert!(newly_earned(&previous, &current).is_empty());
    }

    #[test]
    fn chapter_champion_needs_five_completed() {
        let mut record = ProgressRecord::new();
        for i in 0..4 {
            record.record_chapter(ChapterId::new(format!("c{i}")), true, 1);
        }
        record.record_chapter(ChapterId::from("open"), false, 0);
        assert!(
            !evaluate(&record)
                .iter()
                .find(|s| s.achievement.id == "chapter_champion")
                .unwrap()
                .earned
        );

        record.record_chapter(ChapterId::from("c4"), true, 1);
        assert!(
            evaluate(&record)
                .iter()
                .find(|s| s.achievement.id == "chapter_champion")
                .unwrap()
                .earned
        );
    }

    #[test]
    fn evaluation_order_matches_catalog() {
        let record = ProgressRecord::new();
        let statuses = evaluate(&record);
        assert_eq!(statuses.len(), catalog().len());
        for (status, entry) in statuses.iter().zip(catalog()) {
            assert_eq!(status.achievement.id, entry.id);
        }
    }

    #[test]
    fn streak_achievements_follow_streak_updates() {
        let mut previous = ProgressRecord::new();
        previous.set_streak(2);
        let mut current = previous.clone();
        current.set_streak(7);

        let earned: Vec<&str> = newly_earned(&previous, &current)
            .iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(earned, vec!["streak_starter", "week_warrior"]);
    }
}
