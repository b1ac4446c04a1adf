//! External platform contracts (notification center, audio, haptics) plus
//! in-memory implementations for testing and prototyping.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use thiserror::Error;

use progress_core::model::{HapticAction, ImpactStyle, NotificationRequest, NotifyKind};

/// Errors surfaced by platform adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PlatformError {
    #[error("permission denied")]
    PermissionDenied,

    #[error("platform call failed: {0}")]
    Call(String),
}

/// Outcome of a notification permission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

/// Local-notification platform contract.
#[async_trait]
pub trait NotificationPlatform: Send + Sync {
    /// Ask the user for notification permission.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError` if the platform call itself fails (callers
    /// treat that the same as a denial).
    async fn request_permissions(&self) -> Result<PermissionStatus, PlatformError>;

    /// Create or update the notification channel notifications post to.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError` on platform failures.
    async fn configure_channel(&self, name: &str) -> Result<(), PlatformError>;

    /// Schedule a notification. Platform behavior for an already-used
    /// identifier is unspecified; the scheduler always cancels first.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError` on invalid triggers or platform failures.
    async fn schedule(&self, request: NotificationRequest) -> Result<(), PlatformError>;

    /// Cancel by identifier. Cancelling an unknown identifier is not an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError` on platform failures.
    async fn cancel(&self, identifier: &str) -> Result<(), PlatformError>;

    /// Snapshot of everything currently scheduled.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError` on platform failures.
    async fn list_scheduled(&self) -> Result<Vec<NotificationRequest>, PlatformError>;
}

/// A loaded audio asset.
pub trait SoundHandle: Send + Sync {
    /// Play the asset from the start.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError` if playback fails.
    fn replay(&self) -> Result<(), PlatformError>;

    /// Adjust playback volume (0.0..=1.0).
    ///
    /// # Errors
    ///
    /// Returns `PlatformError` if the handle rejects the update.
    fn set_volume(&self, volume: f32) -> Result<(), PlatformError>;
}

/// Audio platform contract.
#[async_trait]
pub trait AudioPlatform: Send + Sync {
    /// Load an audio asset and return a replayable handle.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError` if the asset is missing or cannot be decoded.
    async fn load(&self, asset: &str) -> Result<Arc<dyn SoundHandle>, PlatformError>;
}

/// Haptics platform contract.
pub trait HapticPlatform: Send + Sync {
    /// Fire an impact haptic.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError` if the device rejects the call.
    fn impact(&self, style: ImpactStyle) -> Result<(), PlatformError>;

    /// Fire an outcome-notification haptic.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError` if the device rejects the call.
    fn notify(&self, kind: NotifyKind) -> Result<(), PlatformError>;
}

fn lock_err<T>(err: PoisonError<T>) -> PlatformError {
    PlatformError::Call(err.to_string())
}

#[derive(Default)]
struct RecordingState {
    scheduled: Vec<NotificationRequest>,
    channels: Vec<String>,
    grant: bool,
    fail_prefix: Option<String>,
}

/// In-memory notification platform for tests and prototyping.
///
/// Deliberately dumb: `schedule` appends without replacing, so duplicate
/// suppression has to come from the scheduler, which is exactly what the
/// tests want to observe.
#[derive(Clone)]
pub struct RecordingNotificationPlatform {
    inner: Arc<Mutex<RecordingState>>,
}

impl RecordingNotificationPlatform {
    /// Platform that grants permission.
    #[must_use]
    pub fn granting() -> Self {
        Self {
            inner: Arc::new(Mutex::new(RecordingState {
                grant: true,
                ..RecordingState::default()
            })),
        }
    }

    /// Platform that denies permission.
    #[must_use]
    pub fn denying() -> Self {
        Self {
            inner: Arc::new(Mutex::new(RecordingState::default())),
        }
    }

    /// Make `schedule` fail for identifiers starting with `prefix`.
    pub fn fail_schedules_with_prefix(&self, prefix: impl Into<String>) {
        if let Ok(mut state) = self.inner.lock() {
            state.fail_prefix = Some(prefix.into());
        }
    }

    /// Everything currently scheduled, in scheduling order.
    #[must_use]
    pub fn scheduled(&self) -> Vec<NotificationRequest> {
        self.inner
            .lock()
            .map(|state| state.scheduled.clone())
            .unwrap_or_default()
    }

    /// Identifiers currently scheduled, in scheduling order.
    #[must_use]
    pub fn scheduled_identifiers(&self) -> Vec<String> {
        self.scheduled()
            .into_iter()
            .map(|request| request.identifier)
            .collect()
    }

    /// Channels configured so far.
    #[must_use]
    pub fn channels(&self) -> Vec<String> {
        self.inner
            .lock()
            .map(|state| state.channels.clone())
            .unwrap_or_default()
    }
}

impl Default for RecordingNotificationPlatform {
    fn default() -> Self {
        Self::granting()
    }
}

#[async_trait]
impl NotificationPlatform for RecordingNotificationPlatform {
    async fn request_permissions(&self) -> Result<PermissionStatus, PlatformError> {
        let state = self.inner.lock().map_err(lock_err)?;
        Ok(if state.grant {
            PermissionStatus::Granted
        } else {
            PermissionStatus::Denied
        })
    }

    async fn configure_channel(&self, name: &str) -> Result<(), PlatformError> {
        let mut state = self.inner.lock().map_err(lock_err)?;
        state.channels.push(name.to_owned());
        Ok(())
    }

    async fn schedule(&self, request: NotificationRequest) -> Result<(), PlatformError> {
        let mut state = self.inner.lock().map_err(lock_err)?;
        if let Some(prefix) = &state.fail_prefix {
            if request.identifier.starts_with(prefix.as_str()) {
                return Err(PlatformError::Call(format!(
                    "refusing to schedule {}",
                    request.identifier
                )));
            }
        }
        state.scheduled.push(request);
        Ok(())
    }

    async fn cancel(&self, identifier: &str) -> Result<(), PlatformError> {
        let mut state = self.inner.lock().map_err(lock_err)?;
        state
            .scheduled
            .retain(|request| request.identifier != identifier);
        Ok(())
    }

    async fn list_scheduled(&self) -> Result<Vec<NotificationRequest>, PlatformError> {
        let state = self.inner.lock().map_err(lock_err)?;
        Ok(state.scheduled.clone())
    }
}

/// In-memory audio handle counting replays and remembering the volume.
#[derive(Default)]
pub struct StubSoundHandle {
    replays: Mutex<u32>,
    volume: Mutex<f32>,
    fail_replay: bool,
}

impl StubSoundHandle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle whose `replay` always fails.
    #[must_use]
    pub fn broken() -> Self {
        Self {
            fail_replay: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn replay_count(&self) -> u32 {
        self.replays.lock().map(|count| *count).unwrap_or(0)
    }

    #[must_use]
    pub fn volume(&self) -> f32 {
        self.volume.lock().map(|volume| *volume).unwrap_or(0.0)
    }
}

impl SoundHandle for StubSoundHandle {
    fn replay(&self) -> Result<(), PlatformError> {
        if self.fail_replay {
            return Err(PlatformError::Call("broken sound handle".into()));
        }
        let mut count = self.replays.lock().map_err(lock_err)?;
        *count += 1;
        Ok(())
    }

    fn set_volume(&self, volume: f32) -> Result<(), PlatformError> {
        let mut current = self.volume.lock().map_err(lock_err)?;
        *current = volume;
        Ok(())
    }
}

/// In-memory audio platform serving pre-registered handles by asset name.
#[derive(Clone, Default)]
pub struct StubAudio {
    assets: Arc<Mutex<HashMap<String, Arc<StubSoundHandle>>>>,
}

impl StubAudio {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an asset so later `load` calls succeed.
    pub fn register(&self, asset: impl Into<String>, handle: Arc<StubSoundHandle>) {
        if let Ok(mut assets) = self.assets.lock() {
            assets.insert(asset.into(), handle);
        }
    }
}

#[async_trait]
impl AudioPlatform for StubAudio {
    async fn load(&self, asset: &str) -> Result<Arc<dyn SoundHandle>, PlatformError> {
        let assets = self.assets.lock().map_err(lock_err)?;
        assets
            .get(asset)
            .map(|handle| Arc::clone(handle) as Arc<dyn SoundHandle>)
            .ok_or_else(|| PlatformError::Call(format!("unknown asset {asset}")))
    }
}

/// In-memory haptics platform recording every action.
#[derive(Clone, Default)]
pub struct RecordingHaptics {
    actions: Arc<Mutex<Vec<HapticAction>>>,
    fail: bool,
}

impl RecordingHaptics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Haptics that reject every call, for fallback-failure tests.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn actions(&self) -> Vec<HapticAction> {
        self.actions
            .lock()
            .map(|actions| actions.clone())
            .unwrap_or_default()
    }

    fn record(&self, action: HapticAction) -> Result<(), PlatformError> {
        if self.fail {
            return Err(PlatformError::Call("haptics unavailable".into()));
        }
        let mut actions = self.actions.lock().map_err(lock_err)?;
        actions.push(action);
        Ok(())
    }
}

impl HapticPlatform for RecordingHaptics {
    fn impact(&self, style: ImpactStyle) -> Result<(), PlatformError> {
        self.record(HapticAction::Impact(style))
    }

    fn notify(&self, kind: NotifyKind) -> Result<(), PlatformError> {
        self.record(HapticAction::Notify(kind))
    }
}
