use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("invalid reminder time {hour:02}:{minute:02}")]
    InvalidReminderTime { hour: u8, minute: u8 },

    #[error("volume {0} outside 0.0..=1.0")]
    InvalidVolume(f32),
}

/// Wall-clock time of day for the daily reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderTime {
    pub hour: u8,
    pub minute: u8,
}

impl ReminderTime {
    /// Creates a validated reminder time.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::InvalidReminderTime` for an out-of-range
    /// hour or minute.
    pub fn new(hour: u8, minute: u8) -> Result<Self, SettingsError> {
        let time = Self { hour, minute };
        time.validate()?;
        Ok(time)
    }

    pub(crate) fn validate(self) -> Result<(), SettingsError> {
        if self.hour > 23 || self.minute > 59 {
            return Err(SettingsError::InvalidReminderTime {
                hour: self.hour,
                minute: self.minute,
            });
        }
        Ok(())
    }
}

impl Default for ReminderTime {
    fn default() -> Self {
        Self {
            hour: 19,
            minute: 0,
        }
    }
}

/// User-facing notification toggles, persisted as the `userSettings` blob.
///
/// Loaded once at startup (defaults when absent or malformed), mutated only
/// through [`NotificationSettingsPatch::apply`], persisted after every
/// mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationSettings {
    pub enabled: bool,
    pub daily_reminder: bool,
    pub streak_reminder: bool,
    pub achievement_notifications: bool,
    pub study_reminders: bool,
    pub reminder_time: ReminderTime,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            daily_reminder: true,
            streak_reminder: true,
            achievement_notifications: true,
            study_reminders: false,
            reminder_time: ReminderTime::default(),
        }
    }
}

impl NotificationSettings {
    /// Re-checks invariants, used after deserializing persisted blobs.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if the reminder time is out of range.
    pub fn validate(&self) -> Result<(), SettingsError> {
        self.reminder_time.validate()
    }
}

/// Partial update for [`NotificationSettings`]; `None` keeps the current
/// value.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotificationSettingsPatch {
    pub enabled: Option<bool>,
    pub daily_reminder: Option<bool>,
    pub streak_reminder: Option<bool>,
    pub achievement_notifications: Option<bool>,
    pub study_reminders: Option<bool>,
    pub reminder_time: Option<ReminderTime>,
}

impl NotificationSettingsPatch {
    /// Merges the patch over `base` and validates the result.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if the merged settings fail validation.
    pub fn apply(self, base: &NotificationSettings) -> Result<NotificationSettings, SettingsError> {
        let merged = NotificationSettings {
            enabled: self.enabled.unwrap_or(base.enabled),
            daily_reminder: self.daily_reminder.unwrap_or(base.daily_reminder),
            streak_reminder: self.streak_reminder.unwrap_or(base.streak_reminder),
            achievement_notifications: self
                .achievement_notifications
                .unwrap_or(base.achievement_notifications),
            study_reminders: self.study_reminders.unwrap_or(base.study_reminders),
            reminder_time: self.reminder_time.unwrap_or(base.reminder_time),
        };
        merged.validate()?;
        Ok(merged)
    }
}

/// Audio/haptic feedback toggles, persisted as the `soundSettings` blob.
/// Independent of [`NotificationSettings`], same lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SoundSettings {
    pub enabled: bool,
    pub volume: f32,
    pub button_sounds: bool,
    pub achievement_sounds: bool,
    pub lesson_completion_sounds: bool,
    pub correct_answer_sounds: bool,
    pub incorrect_answer_sounds: bool,
    pub level_up_sounds: bool,
}

impl Default for SoundSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: 0.8,
            button_sounds: true,
            achievement_sounds: true,
            lesson_completion_sounds: true,
            correct_answer_sounds: true,
            incorrect_answer_sounds: true,
            level_up_sounds: true,
        }
    }
}

impl SoundSettings {
    /// Re-checks invariants, used after deserializing persisted blobs.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::InvalidVolume` if volume leaves 0.0..=1.0.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(0.0..=1.0).contains(&self.volume) || self.volume.is_nan() {
            return Err(SettingsError::InvalidVolume(self.volume));
        }
        Ok(())
    }
}

/// Partial update for [`SoundSettings`]; `None` keeps the current value.
#[derive(Debug, Clone, Copy, Default)]
pub struct SoundSettingsPatch {
    pub enabled: Option<bool>,
    pub volume: Option<f32>,
    pub button_sounds: Option<bool>,
    pub achievement_sounds: Option<bool>,
    pub lesson_completion_sounds: Option<bool>,
    pub correct_answer_sounds: Option<bool>,
    pub incorrect_answer_sounds: Option<bool>,
    pub level_up_sounds: Option<bool>,
}

impl SoundSettingsPatch {
    /// Merges the patch over `base` and validates the result.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::InvalidVolume` if the merged volume is out of
    /// range.
    pub fn apply(self, base: &SoundSettings) -> Result<SoundSettings, SettingsError> {
        let merged = SoundSettings {
            enabled: self.enabled.unwrap_or(base.enabled),
            volume: self.volume.unwrap_or(base.volume),
            button_sounds: self.button_sounds.unwrap_or(base.button_sounds),
            achievement_sounds: self.achievement_sounds.unwrap_or(base.achievement_sounds),
            lesson_completion_sounds: self
                .lesson_completion_sounds
                .unwrap_or(base.lesson_completion_sounds),
            correct_answer_sounds: self
                .correct_answer_sounds
                .unwrap_or(base.correct_answer_sounds),
            incorrect_answer_sounds: self
                .incorrect_answer_sounds
                .unwrap_or(base.incorrect_answer_sounds),
            level_up_sounds: self.level_up_sounds.unwrap_or(base.level_up_sounds),
        };
        merged.validate()?;
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_merges_only_given_fields() {
        let base = NotificationSettings::default();
        let merged = NotificationSettingsPatch {
            daily_reminder: Some(false),
            reminder_time: Some(ReminderTime::new(7, 30).unwrap()),
            ..NotificationSettingsPatch::default()
        }
        .apply(&base)
        .unwrap();

        assert!(!merged.daily_reminder);
        assert_eq!(merged.reminder_time.hour, 7);
        assert!(merged.enabled, "untouched fields keep their value");
        assert!(merged.streak_reminder);
    }

    #[test]
    fn invalid_reminder_time_is_rejected() {
        assert!(matches!(
            ReminderTime::new(24, 0),
            Err(SettingsError::InvalidReminderTime { .. })
        ));
        assert!(ReminderTime::new(23, 59).is_ok());
    }

    #[test]
    fn volume_outside_range_is_rejected() {
        let base = SoundSettings::default();
        let result = SoundSettingsPatch {
            volume: Some(1.5),
            ..SoundSettingsPatch::default()
        }
        .apply(&base);
        assert!(matches!(result, Err(SettingsError::InvalidVolume(_))));

        let ok = SoundSettingsPatch {
            volume: Some(0.0),
            ..SoundSettingsPatch::default()
        }
        .apply(&base)
        .unwrap();
        assert!((ok.volume - 0.0).abs() < f32::EPSILON);
    }

    #[test]
    fn persisted_blob_round_trips_camel_case() {
        let settings = NotificationSettings::default();
        let json = serde_json::to_string(&settings).unwrap();
        assert!(json.contains("\"dailyReminder\""));
        assert!(json.contains("\"reminderTime\""));

        let back: NotificationSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, settings);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let partial: SoundSettings = serde_json::from_str(r#"{"enabled":false}"#).unwrap();
        assert!(!partial.enabled);
        assert!((partial.volume - 0.8).abs() < f32::EPSILON);
        assert!(partial.button_sounds);
    }
}
