mod achievements;
mod feedback;
mod ids;
mod level;
mod notification;
mod progress;
mod settings;
mod stats;

pub use ids::{ChapterId, LessonKey};

pub use achievements::{
    Achievement, AchievementCondition, AchievementStatus, StatField, catalog, evaluate,
    newly_earned,
};
pub use feedback::{FeedbackEvent, HapticAction, ImpactStyle, NotifyKind, SoundCategory};
pub use level::{LevelInfo, XP_PER_LEVEL};
pub use notification::{
    ACHIEVEMENT_ID_PREFIX, DAILY_REMINDER_ID, LESSON_COMPLETE_ID_PREFIX, NotificationContent,
    NotificationRequest, NotificationTrigger, STREAK_REMINDER_ID, STUDY_REMINDER_PREFIX,
    TriggerError,
};
pub use progress::{ChapterProgress, LessonProgress, PASSING_SCORE, ProgressRecord};
pub use settings::{
    NotificationSettings, NotificationSettingsPatch, ReminderTime, SettingsError, SoundSettings,
    SoundSettingsPatch,
};
pub use stats::{
    DAILY_TIME_GOAL_MINUTES, GoalProgress, StreakDay, StudyStats, WEEKLY_LESSON_GOAL, WeeklyGoals,
    streak_calendar,
};
