#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod feedback_service;
pub mod notification_service;
pub mod platform;
pub mod progress_service;
pub mod settings_service;

pub use progress_core::Clock;

pub use app_services::{AppServices, Platforms};
pub use error::{AppServicesError, PersistError};
pub use feedback_service::{FeedbackAction, FeedbackService};
pub use notification_service::NotificationService;
pub use platform::{
    AudioPlatform, HapticPlatform, NotificationPlatform, PermissionStatus, PlatformError,
    RecordingHaptics, RecordingNotificationPlatform, SoundHandle, StubAudio, StubSoundHandle,
};
pub use progress_service::{LessonOutcome, ProgressService, xp_for_score};
pub use settings_service::{NotificationSettingsStore, ProgressStore, SoundSettingsStore};
