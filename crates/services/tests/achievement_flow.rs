use std::sync::Arc;

use progress_core::fixed_clock;
use progress_core::model::{
    ChapterId, FeedbackEvent, HapticAction, ImpactStyle, LessonKey, NotifyKind,
};
use services::{AppServices, Platforms, RecordingHaptics, RecordingNotificationPlatform, StubAudio};
use storage::repository::Storage;

fn build_services(
    platform: &RecordingNotificationPlatform,
    haptics: &RecordingHaptics,
) -> AppServices {
    let storage = Storage::in_memory();
    AppServices::new(
        &storage,
        fixed_clock(),
        Platforms {
            notifications: Arc::new(platform.clone()),
            audio: Arc::new(StubAudio::new()),
            haptics: Arc::new(haptics.clone()),
        },
    )
}

fn achievement_titles(platform: &RecordingNotificationPlatform) -> Vec<String> {
    platform
        .scheduled()
        .into_iter()
        .filter(|request| request.identifier.starts_with("achievement-"))
        .map(|request| request.content.title)
        .collect()
}

#[tokio::test]
async fn crossing_the_xp_threshold_notifies_exactly_once() {
    let platform = RecordingNotificationPlatform::granting();
    let haptics = RecordingHaptics::new();
    let services = build_services(&platform, &haptics);
    services.init().await;
    let progress = services.progress();

    // 25 XP per perfect lesson; the fourth crosses 100 XP.
    for i in 1..=3 {
        let outcome = progress
            .record_lesson_result(&LessonKey::new(format!("lesson-{i}")), 100, 60_000)
            .await;
        assert!(outcome.newly_earned.iter().all(|a| a.id != "speed_demon"));
    }
    let outcome = progress
        .record_lesson_result(&LessonKey::new("lesson-4"), 100, 60_000)
        .await;

    let earned: Vec<&str> = outcome.newly_earned.iter().map(|a| a.id).collect();
    assert_eq!(earned, vec!["speed_demon"]);

    let speed_demon_notices = achievement_titles(&platform)
        .iter()
        .filter(|title| title.contains("Speed Demon"))
        .count();
    assert_eq!(speed_demon_notices, 1);
}

#[tokio::test]
async fn burst_of_achievements_gets_unique_identifiers() {
    let platform = RecordingNotificationPlatform::granting();
    let haptics = RecordingHaptics::new();
    let services = build_services(&platform, &haptics);
    services.init().await;

    // Jumping straight to a 7-day streak earns two achievements at once,
    // under a fixed clock.
    let earned = services.progress().update_streak(7).await;
    let ids: Vec<&str> = earned.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec!["streak_starter", "week_warrior"]);

    let mut identifiers: Vec<String> = platform
        .scheduled_identifiers()
        .into_iter()
        .filter(|id| id.starts_with("achievement-"))
        .collect();
    assert_eq!(identifiers.len(), 2);
    identifiers.dedup();
    assert_eq!(identifiers.len(), 2, "identifiers must not collide");
}

#[tokio::test]
async fn failing_notifications_do_not_abort_the_batch() {
    let platform = RecordingNotificationPlatform::granting();
    platform.fail_schedules_with_prefix("achievement-");
    let haptics = RecordingHaptics::new();
    let services = build_services(&platform, &haptics);
    services.init().await;

    let earned = services.progress().update_streak(7).await;
    assert_eq!(earned.len(), 2, "diff result is unaffected by dispatch failures");

    // Feedback still fired per achievement even though every notification
    // was refused: streak haptic first, then one success per unlock.
    assert_eq!(
        haptics.actions(),
        vec![
            HapticAction::Impact(ImpactStyle::Medium),
            HapticAction::Notify(NotifyKind::Success),
            HapticAction::Notify(NotifyKind::Success),
        ]
    );
}

#[tokio::test]
async fn lesson_completion_drives_notification_and_feedback() {
    let platform = RecordingNotificationPlatform::granting();
    let haptics = RecordingHaptics::new();
    let services = build_services(&platform, &haptics);
    services.init().await;

    services
        .progress()
        .record_lesson_result(&LessonKey::new("intro"), 80, 30_000)
        .await;

    let identifiers = platform.scheduled_identifiers();
    assert!(
        identifiers
            .iter()
            .any(|id| id.starts_with("lesson-complete-"))
    );
    assert!(
        haptics
            .actions()
            .contains(&FeedbackEvent::LessonCompleted.fallback_haptic())
    );
}

#[tokio::test]
async fn failed_attempt_stays_quiet() {
    let platform = RecordingNotificationPlatform::granting();
    let haptics = RecordingHaptics::new();
    let services = build_services(&platform, &haptics);
    services.init().await;

    let outcome = services
        .progress()
        .record_lesson_result(&LessonKey::new("intro"), 30, 10_000)
        .await;

    assert!(outcome.newly_earned.is_empty());
    assert!(!outcome.leveled_up);
    assert!(
        platform
            .scheduled_identifiers()
            .iter()
            .all(|id| !id.starts_with("lesson-complete-"))
    );
}

#[tokio::test]
async fn progress_survives_a_restart() {
    let storage = Storage::in_memory();
    let platforms = Platforms {
        notifications: Arc::new(RecordingNotificationPlatform::granting()),
        audio: Arc::new(StubAudio::new()),
        haptics: Arc::new(RecordingHaptics::new()),
    };

    let first = AppServices::new(&storage, fixed_clock(), platforms.clone());
    first.init().await;
    first
        .progress()
        .record_lesson_result(&LessonKey::new("intro"), 100, 60_000)
        .await;
    first.shutdown().await;

    let second = AppServices::new(&storage, fixed_clock(), platforms);
    second.init().await;
    assert_eq!(second.progress().snapshot().total_xp(), 25);
    assert_eq!(second.progress().stats().lessons_completed, 1);
}

#[tokio::test]
async fn chapter_completion_can_unlock_compound_achievements() {
    let platform = RecordingNotificationPlatform::granting();
    let haptics = RecordingHaptics::new();
    let services = build_services(&platform, &haptics);
    services.init().await;
    let progress = services.progress();

    for i in 1..=4 {
        let earned = progress
            .record_chapter_result(&ChapterId::new(format!("chapter-{i}")), true, 3)
            .await;
        assert!(earned.is_empty());
    }
    let earned = progress
        .record_chapter_result(&ChapterId::new("chapter-5"), true, 3)
        .await;
    assert_eq!(earned.iter().map(|a| a.id).collect::<Vec<_>>(), vec![
        "chapter_champion"
    ]);
}
