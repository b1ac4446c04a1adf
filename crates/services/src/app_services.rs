use std::sync::Arc;

use tracing::warn;

use progress_core::Clock;
use storage::repository::Storage;

use crate::error::AppServicesError;
use crate::feedback_service::FeedbackService;
use crate::notification_service::NotificationService;
use crate::platform::{AudioPlatform, HapticPlatform, NotificationPlatform};
use crate::settings_service::{NotificationSettingsStore, ProgressStore, SoundSettingsStore};
use crate::progress_service::ProgressService;

/// Platform adapters the services run against.
#[derive(Clone)]
pub struct Platforms {
    pub notifications: Arc<dyn NotificationPlatform>,
    pub audio: Arc<dyn AudioPlatform>,
    pub haptics: Arc<dyn HapticPlatform>,
}

/// Assembles the per-process service singletons.
///
/// Construct once at app start, call [`Self::init`] to load persisted
/// state, and [`Self::shutdown`] on the way out to flush it.
#[derive(Clone)]
pub struct AppServices {
    notifications: Arc<NotificationService>,
    feedback: Arc<FeedbackService>,
    progress: Arc<ProgressService>,
}

impl AppServices {
    /// Build services over an existing storage handle.
    #[must_use]
    pub fn new(storage: &Storage, clock: Clock, platforms: Platforms) -> Self {
        let notifications = Arc::new(NotificationService::new(
            clock,
            platforms.notifications,
            NotificationSettingsStore::new(Arc::clone(&storage.kv)),
        ));
        let feedback = Arc::new(FeedbackService::new(
            platforms.audio,
            platforms.haptics,
            SoundSettingsStore::new(Arc::clone(&storage.kv)),
        ));
        let progress = Arc::new(ProgressService::new(
            clock,
            ProgressStore::new(Arc::clone(&storage.kv)),
            Arc::clone(&notifications),
            Arc::clone(&feedback),
        ));

        Self {
            notifications,
            feedback,
            progress,
        }
    }

    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        platforms: Platforms,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::new(&storage, clock, platforms))
    }

    /// Load all persisted state and sync the notification schedule to it.
    pub async fn init(&self) {
        self.notifications.init().await;
        self.feedback.init().await;
        self.progress.init().await;
        self.notifications.reconcile().await;
    }

    /// Flush persistent state on the way out.
    pub async fn shutdown(&self) {
        if let Err(err) = self.progress.flush().await {
            warn!(error = %err, "progress flush on shutdown failed");
        }
    }

    #[must_use]
    pub fn notifications(&self) -> Arc<NotificationService> {
        Arc::clone(&self.notifications)
    }

    #[must_use]
    pub fn feedback(&self) -> Arc<FeedbackService> {
        Arc::clone(&self.feedback)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress)
    }
}
