use crate::model::SoundSettings;

/// Symbolic user-facing events that may produce audio or haptic feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedbackEvent {
    ButtonClick,
    CorrectAnswer,
    IncorrectAnswer,
    LessonCompleted,
    ChapterCompleted,
    AchievementUnlocked,
    LevelUp,
    StreakMilestone,
    PerfectScore,
}

/// Per-category sound toggles. The event-to-category table is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCategory {
    Button,
    CorrectAnswer,
    IncorrectAnswer,
    LessonCompletion,
    Achievement,
}

impl FeedbackEvent {
    /// Fixed mapping from event to settings category.
    #[must_use]
    pub fn sound_category(self) -> SoundCategory {
        match self {
            FeedbackEvent::ButtonClick => SoundCategory::Button,
            FeedbackEvent::CorrectAnswer => SoundCategory::CorrectAnswer,
            FeedbackEvent::IncorrectAnswer => SoundCategory::IncorrectAnswer,
            FeedbackEvent::LessonCompleted | FeedbackEvent::ChapterCompleted => {
                SoundCategory::LessonCompletion
            }
            // Level-up, streak and perfect-score moments share the
            // achievement category; the dedicated levelUpSounds toggle is
            // persisted but not consulted here.
            FeedbackEvent::AchievementUnlocked
            | FeedbackEvent::LevelUp
            | FeedbackEvent::StreakMilestone
            | FeedbackEvent::PerfectScore => SoundCategory::Achievement,
        }
    }

    /// Haptic pattern used when no audio asset is loaded for the event.
    #[must_use]
    pub fn fallback_haptic(self) -> HapticAction {
        match self {
            FeedbackEvent::ButtonClick => HapticAction::Impact(ImpactStyle::Light),
            FeedbackEvent::CorrectAnswer
            | FeedbackEvent::LessonCompleted
            | FeedbackEvent::ChapterCompleted
            | FeedbackEvent::AchievementUnlocked
            | FeedbackEvent::PerfectScore => HapticAction::Notify(NotifyKind::Success),
            FeedbackEvent::IncorrectAnswer => HapticAction::Notify(NotifyKind::Error),
            FeedbackEvent::LevelUp | FeedbackEvent::StreakMilestone => {
                HapticAction::Impact(ImpactStyle::Medium)
            }
        }
    }
}

impl SoundCategory {
    /// Whether this category is switched on in the given settings. The
    /// global `enabled` flag is checked separately by the dispatcher.
    #[must_use]
    pub fn is_enabled(self, settings: &SoundSettings) -> bool {
        match self {
            SoundCategory::Button => settings.button_sounds,
            SoundCategory::CorrectAnswer => settings.correct_answer_sounds,
            SoundCategory::IncorrectAnswer => settings.incorrect_answer_sounds,
            SoundCategory::LessonCompletion => settings.lesson_completion_sounds,
            SoundCategory::Achievement => settings.achievement_sounds,
        }
    }
}

/// Strength of an impact haptic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImpactStyle {
    Light,
    Medium,
    Heavy,
}

/// Outcome flavor of a notification haptic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyKind {
    Success,
    Warning,
    Error,
}

/// A concrete haptic to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HapticAction {
    Impact(ImpactStyle),
    Notify(NotifyKind),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_table_matches_settings_flags() {
        let mut settings = SoundSettings::default();
        settings.button_sounds = false;
        settings.achievement_sounds = false;

        assert!(!FeedbackEvent::ButtonClick.sound_category().is_enabled(&settings));
        assert!(!FeedbackEvent::LevelUp.sound_category().is_enabled(&settings));
        assert!(FeedbackEvent::CorrectAnswer.sound_category().is_enabled(&settings));
        assert!(FeedbackEvent::LessonCompleted.sound_category().is_enabled(&settings));
    }

    #[test]
    fn fallback_haptics_by_outcome() {
        assert_eq!(
            FeedbackEvent::ButtonClick.fallback_haptic(),
            HapticAction::Impact(ImpactStyle::Light)
        );
        assert_eq!(
            FeedbackEvent::CorrectAnswer.fallback_haptic(),
            HapticAction::Notify(NotifyKind::Success)
        );
        assert_eq!(
            FeedbackEvent::IncorrectAnswer.fallback_haptic(),
            HapticAction::Notify(NotifyKind::Error)
        );
        assert_eq!(
            FeedbackEvent::StreakMilestone.fallback_haptic(),
            HapticAction::Impact(ImpactStyle::Medium)
        );
    }
}
