//! Idempotent local-notification scheduler.
//!
//! Identifiers are the sole correctness mechanism for "at most one active
//! schedule per logical reminder": every schedule call cancels its
//! identifier before creating it, and [`NotificationService::reconcile`]
//! re-derives the whole scheduled set from settings so it never drifts into
//! a stale superset.
//!
//! Everything here is best-effort. Permission or platform failures degrade
//! to a no-op with a logged warning; nothing crashes the host.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, warn};

use progress_core::Clock;
use progress_core::model::{
    ACHIEVEMENT_ID_PREFIX, DAILY_REMINDER_ID, LESSON_COMPLETE_ID_PREFIX, NotificationContent,
    NotificationRequest, NotificationSettings, NotificationSettingsPatch, NotificationTrigger,
    STREAK_REMINDER_ID, STUDY_REMINDER_PREFIX, ReminderTime, SettingsError,
};

use crate::platform::{NotificationPlatform, PermissionStatus};
use crate::settings_service::NotificationSettingsStore;

/// Channel all local notifications post to.
const CHANNEL_NAME: &str = "progress";

/// Hour of the one-shot streak reminder.
const STREAK_REMINDER_TIME: ReminderTime = ReminderTime {
    hour: 20,
    minute: 0,
};

/// The three fixed study-reminder slots.
const STUDY_SLOTS: [(&str, u8); 3] = [("morning", 9), ("afternoon", 14), ("evening", 18)];

/// Delay before an achievement one-shot fires.
const ACHIEVEMENT_DELAY_SECS: u32 = 1;

/// Delay before a lesson-completion one-shot fires.
const LESSON_COMPLETE_DELAY_SECS: u32 = 2;

struct SchedulerState {
    settings: NotificationSettings,
    channel_ready: bool,
    last_unique_ms: i64,
}

/// Settings-driven scheduler over a [`NotificationPlatform`].
pub struct NotificationService {
    platform: Arc<dyn NotificationPlatform>,
    store: NotificationSettingsStore,
    clock: Clock,
    state: Mutex<SchedulerState>,
}

impl NotificationService {
    #[must_use]
    pub fn new(
        clock: Clock,
        platform: Arc<dyn NotificationPlatform>,
        store: NotificationSettingsStore,
    ) -> Self {
        Self {
            platform,
            store,
            clock,
            state: Mutex::new(SchedulerState {
                settings: NotificationSettings::default(),
                channel_ready: false,
                last_unique_ms: 0,
            }),
        }
    }

    /// Load persisted settings into the in-memory snapshot.
    pub async fn init(&self) {
        let settings = self.store.load().await;
        self.lock().settings = settings;
    }

    /// Current settings snapshot.
    #[must_use]
    pub fn settings(&self) -> NotificationSettings {
        self.lock().settings
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SchedulerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Ask the platform for notification permission. Fails closed: any
    /// platform error reads as "not granted". Configures the notification
    /// channel once, on the first grant.
    pub async fn request_permissions(&self) -> bool {
        match self.platform.request_permissions().await {
            Ok(PermissionStatus::Granted) => {
                let channel_ready = self.lock().channel_ready;
                if !channel_ready {
                    match self.platform.configure_channel(CHANNEL_NAME).await {
                        Ok(()) => self.lock().channel_ready = true,
                        Err(err) => {
                            warn!(error = %err, "notification channel setup failed");
                        }
                    }
                }
                true
            }
            Ok(PermissionStatus::Denied) => false,
            Err(err) => {
                warn!(error = %err, "permission request failed, treating as denied");
                false
            }
        }
    }

    /// Replace the recurring daily reminder. No-op unless notifications and
    /// the daily reminder are both enabled.
    pub async fn schedule_daily_reminder(&self) {
        let settings = self.settings();
        if !settings.enabled || !settings.daily_reminder {
            return;
        }
        self.replace(daily_reminder_request(settings.reminder_time))
            .await;
    }

    /// Replace the one-shot evening streak reminder. No-op unless
    /// notifications and the streak reminder are both enabled.
    pub async fn schedule_streak_reminder(&self, current_streak: u32) {
        let settings = self.settings();
        if !settings.enabled || !settings.streak_reminder {
            return;
        }
        let content = NotificationContent::new(
            "Don't lose your streak!",
            format!("You're on a {current_streak}-day streak. Study today to keep it alive."),
        );
        self.replace(NotificationRequest::new(
            STREAK_REMINDER_ID,
            content,
            NotificationTrigger::calendar(STREAK_REMINDER_TIME, false),
        ))
        .await;
    }

    /// Fire-and-forget achievement notification, unique per call so rapid
    /// bursts never replace each other. No-op unless notifications and
    /// achievement notifications are both enabled.
    pub async fn send_achievement_notification(&self, title: &str, description: &str) {
        let settings = self.settings();
        if !settings.enabled || !settings.achievement_notifications {
            return;
        }
        let identifier = self.unique_identifier(ACHIEVEMENT_ID_PREFIX);
        let request = NotificationRequest::new(
            identifier,
            NotificationContent::new(format!("Achievement unlocked: {title}"), description),
            NotificationTrigger::interval(ACHIEVEMENT_DELAY_SECS),
        );
        if let Err(err) = self.platform.schedule(request).await {
            warn!(title, error = %err, "achievement notification failed");
        }
    }

    /// Replace the three fixed study-reminder slots. No-op unless
    /// notifications and study reminders are both enabled.
    pub async fn schedule_study_reminders(&self) {
        let settings = self.settings();
        if !settings.enabled || !settings.study_reminders {
            return;
        }
        self.cancel_with_prefix(STUDY_REMINDER_PREFIX).await;
        for request in study_reminder_requests() {
            if let Err(err) = self.platform.schedule(request).await {
                warn!(error = %err, "study reminder scheduling failed");
            }
        }
    }

    /// One-shot lesson completion notification, gated only by the global
    /// enabled flag.
    pub async fn send_lesson_completion_notification(&self, title: &str, xp: u64) {
        if !self.settings().enabled {
            return;
        }
        let identifier = self.unique_identifier(LESSON_COMPLETE_ID_PREFIX);
        let request = NotificationRequest::new(
            identifier,
            NotificationContent::new("Lesson complete!", format!("{title} finished, +{xp} XP")),
            NotificationTrigger::interval(LESSON_COMPLETE_DELAY_SECS),
        );
        if let Err(err) = self.platform.schedule(request).await {
            warn!(title, error = %err, "lesson completion notification failed");
        }
    }

    /// Cancel one identifier. Idempotent; unknown identifiers are fine.
    pub async fn cancel_notification(&self, identifier: &str) {
        if let Err(err) = self.platform.cancel(identifier).await {
            warn!(identifier, error = %err, "cancel failed");
        }
    }

    /// Cancel every scheduled notification whose identifier starts with
    /// `prefix`, leaving unrelated identifiers untouched.
    pub async fn cancel_with_prefix(&self, prefix: &str) {
        let scheduled = match self.platform.list_scheduled().await {
            Ok(scheduled) => scheduled,
            Err(err) => {
                warn!(prefix, error = %err, "listing scheduled notifications failed");
                return;
            }
        };
        for request in scheduled {
            if request.identifier.starts_with(prefix) {
                self.cancel_notification(&request.identifier).await;
            }
        }
    }

    /// Cancel everything currently scheduled.
    pub async fn cancel_all(&self) {
        let scheduled = match self.platform.list_scheduled().await {
            Ok(scheduled) => scheduled,
            Err(err) => {
                warn!(error = %err, "listing scheduled notifications failed");
                return;
            }
        };
        for request in scheduled {
            self.cancel_notification(&request.identifier).await;
        }
    }

    /// Merge a settings patch, persist, and re-sync the scheduled set.
    ///
    /// Persistence failures are logged and swallowed; the in-memory settings
    /// and the schedule still move forward (last-write-wins store).
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if the patch produces invalid settings; the
    /// current settings are left untouched in that case.
    pub async fn update_settings(
        &self,
        patch: NotificationSettingsPatch,
    ) -> Result<NotificationSettings, SettingsError> {
        let updated = {
            let mut state = self.lock();
            let updated = patch.apply(&state.settings)?;
            state.settings = updated;
            updated
        };
        if let Err(err) = self.store.save(&updated).await {
            warn!(error = %err, "persisting notification settings failed");
        }
        self.reconcile().await;
        Ok(updated)
    }

    /// Make the platform's scheduled set match current settings.
    ///
    /// Computes the desired recurring set, diffs it against what is actually
    /// scheduled and issues only the necessary cancel/schedule calls.
    /// Event-driven one-shots are kept while their gating flag allows them
    /// and cancelled otherwise; disabling the global flag cancels
    /// everything.
    pub async fn reconcile(&self) {
        let settings = self.settings();
        let desired = desired_schedule(&settings);
        let scheduled = match self.platform.list_scheduled().await {
            Ok(scheduled) => scheduled,
            Err(err) => {
                warn!(error = %err, "listing scheduled notifications failed, skipping reconcile");
                return;
            }
        };

        for request in &scheduled {
            let keep = desired
                .iter()
                .any(|want| want.identifier == request.identifier)
                || retains_one_shot(&settings, &request.identifier);
            if !keep {
                self.cancel_notification(&request.identifier).await;
            }
        }

        for want in desired {
            let up_to_date = scheduled
                .iter()
                .any(|have| have.identifier == want.identifier && have.trigger == want.trigger);
            if up_to_date {
                continue;
            }
            debug!(identifier = %want.identifier, "re-syncing schedule");
            self.replace(want).await;
        }
    }

    /// Cancel-then-create, the replace semantics every stable identifier
    /// relies on.
    async fn replace(&self, request: NotificationRequest) {
        self.cancel_notification(&request.identifier).await;
        if let Err(err) = self.platform.schedule(request.clone()).await {
            warn!(identifier = %request.identifier, error = %err, "scheduling failed");
        }
    }

    /// Timestamp-based unique identifier; bumps past the last one handed
    /// out so bursts under a fixed clock still get distinct ids.
    fn unique_identifier(&self, prefix: &str) -> String {
        let mut state = self.lock();
        let mut millis = self.clock.timestamp_millis();
        if millis <= state.last_unique_ms {
            millis = state.last_unique_ms + 1;
        }
        state.last_unique_ms = millis;
        format!("{prefix}{millis}")
    }
}

fn daily_reminder_request(time: ReminderTime) -> NotificationRequest {
    NotificationRequest::new(
        DAILY_REMINDER_ID,
        NotificationContent::new(
            "Time to study!",
            "A quick lesson a day keeps your streak alive.",
        ),
        NotificationTrigger::calendar(time, true),
    )
}

fn study_reminder_requests() -> Vec<NotificationRequest> {
    STUDY_SLOTS
        .iter()
        .filter_map(|(slot, hour)| {
            let trigger = NotificationTrigger::calendar_at(*hour, 0, true).ok()?;
            Some(NotificationRequest::new(
                format!("{STUDY_REMINDER_PREFIX}-{slot}"),
                NotificationContent::new("Study break", format!("Time for your {slot} session.")),
                trigger,
            ))
        })
        .collect()
}

/// Recurring schedules implied by the settings. Empty when notifications
/// are globally disabled.
fn desired_schedule(settings: &NotificationSettings) -> Vec<NotificationRequest> {
    let mut desired = Vec::new();
    if !settings.enabled {
        return desired;
    }
    if settings.daily_reminder {
        desired.push(daily_reminder_request(settings.reminder_time));
    }
    if settings.study_reminders {
        desired.extend(study_reminder_requests());
    }
    desired
}

/// Whether an event-driven one-shot identifier may stay scheduled under the
/// given settings.
fn retains_one_shot(settings: &NotificationSettings, identifier: &str) -> bool {
    if !settings.enabled {
        return false;
    }
    if identifier == STREAK_REMINDER_ID {
        return settings.streak_reminder;
    }
    if identifier.starts_with(ACHIEVEMENT_ID_PREFIX) {
        return settings.achievement_notifications;
    }
    identifier.starts_with(LESSON_COMPLETE_ID_PREFIX)
}
