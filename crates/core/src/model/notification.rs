use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ReminderTime;

/// Identifier of the recurring daily study reminder.
pub const DAILY_REMINDER_ID: &str = "daily-reminder";

/// Identifier of the one-shot evening streak reminder.
pub const STREAK_REMINDER_ID: &str = "streak-reminder";

/// Identifier prefix shared by the fixed study-reminder slots.
pub const STUDY_REMINDER_PREFIX: &str = "study-reminder";

/// Identifier prefix for one-shot achievement notifications.
pub const ACHIEVEMENT_ID_PREFIX: &str = "achievement-";

/// Identifier prefix for one-shot lesson-completion notifications.
pub const LESSON_COMPLETE_ID_PREFIX: &str = "lesson-complete-";

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum TriggerError {
    #[error("invalid calendar trigger time {hour:02}:{minute:02}")]
    InvalidTime { hour: u8, minute: u8 },
}

/// When a scheduled notification fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NotificationTrigger {
    /// Fires at a wall-clock time, optionally every day.
    Calendar { hour: u8, minute: u8, repeats: bool },
    /// Fires once after a fixed delay.
    Interval { seconds: u32 },
}

impl NotificationTrigger {
    /// Calendar trigger from an already-validated reminder time.
    #[must_use]
    pub fn calendar(time: ReminderTime, repeats: bool) -> Self {
        Self::Calendar {
            hour: time.hour,
            minute: time.minute,
            repeats,
        }
    }

    /// Calendar trigger from raw hour/minute.
    ///
    /// # Errors
    ///
    /// Returns `TriggerError::InvalidTime` for an out-of-range hour or
    /// minute.
    pub fn calendar_at(hour: u8, minute: u8, repeats: bool) -> Result<Self, TriggerError> {
        if hour > 23 || minute > 59 {
            return Err(TriggerError::InvalidTime { hour, minute });
        }
        Ok(Self::Calendar {
            hour,
            minute,
            repeats,
        })
    }

    /// One-shot trigger after `seconds`.
    #[must_use]
    pub fn interval(seconds: u32) -> Self {
        Self::Interval { seconds }
    }

    #[must_use]
    pub fn is_repeating(&self) -> bool {
        matches!(self, Self::Calendar { repeats: true, .. })
    }
}

/// Displayed payload of a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
}

impl NotificationContent {
    #[must_use]
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// A notification to schedule. The identifier doubles as the primary key
/// and the cancellation handle; scheduling an identifier that is already
/// active must replace the prior instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub identifier: String,
    pub content: NotificationContent,
    pub trigger: NotificationTrigger,
}

impl NotificationRequest {
    #[must_use]
    pub fn new(
        identifier: impl Into<String>,
        content: NotificationContent,
        trigger: NotificationTrigger,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            content,
            trigger,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calendar_trigger_validates_time() {
        assert!(NotificationTrigger::calendar_at(9, 0, true).is_ok());
        assert!(matches!(
            NotificationTrigger::calendar_at(9, 60, true),
            Err(TriggerError::InvalidTime { .. })
        ));
    }

    #[test]
    fn only_repeating_calendar_triggers_repeat() {
        assert!(
            NotificationTrigger::calendar_at(9, 0, true)
                .unwrap()
                .is_repeating()
        );
        assert!(
            !NotificationTrigger::calendar_at(20, 0, false)
                .unwrap()
                .is_repeating()
        );
        assert!(!NotificationTrigger::interval(1).is_repeating());
    }

    #[test]
    fn trigger_serializes_with_type_tag() {
        let json = serde_json::to_string(&NotificationTrigger::interval(2)).unwrap();
        assert_eq!(json, r#"{"type":"interval","seconds":2}"#);

        let json =
            serde_json::to_string(&NotificationTrigger::calendar_at(9, 30, true).unwrap()).unwrap();
        assert!(json.contains(r#""type":"calendar""#));
    }
}
