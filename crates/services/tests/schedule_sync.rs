use std::sync::Arc;

use progress_core::fixed_clock;
use progress_core::model::{
    NotificationSettingsPatch, NotificationTrigger, ReminderTime,
};
use services::{
    AppServices, NotificationService, Platforms, RecordingHaptics,
    RecordingNotificationPlatform, StubAudio,
};
use storage::repository::Storage;

fn build_scheduler(platform: &RecordingNotificationPlatform) -> Arc<NotificationService> {
    let storage = Storage::in_memory();
    let services = AppServices::new(
        &storage,
        fixed_clock(),
        Platforms {
            notifications: Arc::new(platform.clone()),
            audio: Arc::new(StubAudio::new()),
            haptics: Arc::new(RecordingHaptics::new()),
        },
    );
    services.notifications()
}

#[tokio::test]
async fn daily_reminder_replaces_instead_of_duplicating() {
    let platform = RecordingNotificationPlatform::granting();
    let scheduler = build_scheduler(&platform);

    scheduler.schedule_daily_reminder().await;
    scheduler.schedule_daily_reminder().await;

    let daily: Vec<String> = platform
        .scheduled_identifiers()
        .into_iter()
        .filter(|id| id == "daily-reminder")
        .collect();
    assert_eq!(daily.len(), 1);
}

#[tokio::test]
async fn global_disable_cancels_everything() {
    let platform = RecordingNotificationPlatform::granting();
    let scheduler = build_scheduler(&platform);

    scheduler
        .update_settings(NotificationSettingsPatch {
            study_reminders: Some(true),
            ..NotificationSettingsPatch::default()
        })
        .await
        .unwrap();
    scheduler.schedule_streak_reminder(3).await;
    assert_eq!(platform.scheduled().len(), 5, "daily + 3 study + streak");

    scheduler
        .update_settings(NotificationSettingsPatch {
            enabled: Some(false),
            ..NotificationSettingsPatch::default()
        })
        .await
        .unwrap();
    assert!(platform.scheduled().is_empty());
}

#[tokio::test]
async fn prefix_cancel_leaves_unrelated_identifiers() {
    let platform = RecordingNotificationPlatform::granting();
    let scheduler = build_scheduler(&platform);

    scheduler
        .update_settings(NotificationSettingsPatch {
            study_reminders: Some(true),
            ..NotificationSettingsPatch::default()
        })
        .await
        .unwrap();
    assert_eq!(platform.scheduled().len(), 4);

    scheduler.cancel_with_prefix("study-reminder").await;

    let remaining = platform.scheduled_identifiers();
    assert_eq!(remaining, vec!["daily-reminder"]);
}

#[tokio::test]
async fn toggling_a_flag_schedules_and_cancels() {
    let platform = RecordingNotificationPlatform::granting();
    let scheduler = build_scheduler(&platform);

    scheduler
        .update_settings(NotificationSettingsPatch {
            daily_reminder: Some(false),
            ..NotificationSettingsPatch::default()
        })
        .await
        .unwrap();
    assert!(platform.scheduled().is_empty());

    scheduler
        .update_settings(NotificationSettingsPatch {
            daily_reminder: Some(true),
            ..NotificationSettingsPatch::default()
        })
        .await
        .unwrap();
    assert_eq!(platform.scheduled_identifiers(), vec!["daily-reminder"]);
}

#[tokio::test]
async fn reminder_time_change_resyncs_the_trigger() {
    let platform = RecordingNotificationPlatform::granting();
    let scheduler = build_scheduler(&platform);

    scheduler.schedule_daily_reminder().await;
    scheduler
        .update_settings(NotificationSettingsPatch {
            reminder_time: Some(ReminderTime::new(6, 30).unwrap()),
            ..NotificationSettingsPatch::default()
        })
        .await
        .unwrap();

    let scheduled = platform.scheduled();
    assert_eq!(scheduled.len(), 1);
    assert_eq!(
        scheduled[0].trigger,
        NotificationTrigger::Calendar {
            hour: 6,
            minute: 30,
            repeats: true
        }
    );
}

#[tokio::test]
async fn reconcile_keeps_permitted_one_shots() {
    let platform = RecordingNotificationPlatform::granting();
    let scheduler = build_scheduler(&platform);

    scheduler.schedule_streak_reminder(4).await;
    scheduler.reconcile().await;

    let identifiers = platform.scheduled_identifiers();
    assert!(identifiers.contains(&"streak-reminder".to_owned()));
    assert!(identifiers.contains(&"daily-reminder".to_owned()));

    scheduler
        .update_settings(NotificationSettingsPatch {
            streak_reminder: Some(false),
            ..NotificationSettingsPatch::default()
        })
        .await
        .unwrap();
    let identifiers = platform.scheduled_identifiers();
    assert!(!identifiers.contains(&"streak-reminder".to_owned()));
    assert!(identifiers.contains(&"daily-reminder".to_owned()));
}

#[tokio::test]
async fn gated_operations_are_no_ops_when_flag_is_off() {
    let platform = RecordingNotificationPlatform::granting();
    let scheduler = build_scheduler(&platform);

    // study_reminders defaults to off.
    scheduler.schedule_study_reminders().await;
    assert!(platform.scheduled().is_empty());

    scheduler
        .update_settings(NotificationSettingsPatch {
            enabled: Some(false),
            ..NotificationSettingsPatch::default()
        })
        .await
        .unwrap();
    scheduler.schedule_daily_reminder().await;
    scheduler.send_lesson_completion_notification("intro", 20).await;
    assert!(platform.scheduled().is_empty());
}

#[tokio::test]
async fn permission_request_fails_closed_and_configures_channel_once() {
    let denying = RecordingNotificationPlatform::denying();
    let scheduler = build_scheduler(&denying);
    assert!(!scheduler.request_permissions().await);
    assert!(denying.channels().is_empty());

    let granting = RecordingNotificationPlatform::granting();
    let scheduler = build_scheduler(&granting);
    assert!(scheduler.request_permissions().await);
    assert!(scheduler.request_permissions().await);
    assert_eq!(granting.channels(), vec!["progress".to_owned()]);
}

#[tokio::test]
async fn settings_survive_a_restart() {
    let storage = Storage::in_memory();
    let platforms = Platforms {
        notifications: Arc::new(RecordingNotificationPlatform::granting()),
        audio: Arc::new(StubAudio::new()),
        haptics: Arc::new(RecordingHaptics::new()),
    };

    let first = AppServices::new(&storage, fixed_clock(), platforms.clone());
    first.init().await;
    first
        .notifications()
        .update_settings(NotificationSettingsPatch {
            daily_reminder: Some(false),
            ..NotificationSettingsPatch::default()
        })
        .await
        .unwrap();

    let second = AppServices::new(&storage, fixed_clock(), platforms);
    second.init().await;
    assert!(!second.notifications().settings().daily_reminder);
}
