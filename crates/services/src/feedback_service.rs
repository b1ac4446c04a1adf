//! Settings-gated audio/haptic feedback dispatcher.
//!
//! Dispatch is a two-tier strategy: [`FeedbackService::resolve`] picks an
//! audio replay when an asset is loaded for the event and a haptic pattern
//! otherwise, and [`FeedbackService::play`] executes it. Resolution is pure
//! over the settings snapshot, so it is unit-testable without an audio
//! backend. Nothing here raises: every platform failure is logged and
//! swallowed.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::warn;

use progress_core::model::{
    FeedbackEvent, HapticAction, SoundSettings, SoundSettingsPatch, SettingsError,
};

use crate::platform::{AudioPlatform, HapticPlatform, SoundHandle};
use crate::settings_service::SoundSettingsStore;

/// What [`FeedbackService::resolve`] decided to do for an event.
#[derive(Clone)]
pub enum FeedbackAction {
    Audio(Arc<dyn SoundHandle>),
    Haptic(HapticAction),
}

struct DispatcherState {
    settings: SoundSettings,
    handles: HashMap<FeedbackEvent, Arc<dyn SoundHandle>>,
}

/// Dispatches audio or haptic feedback for symbolic events.
pub struct FeedbackService {
    audio: Arc<dyn AudioPlatform>,
    haptics: Arc<dyn HapticPlatform>,
    store: SoundSettingsStore,
    state: Mutex<DispatcherState>,
}

impl FeedbackService {
    #[must_use]
    pub fn new(
        audio: Arc<dyn AudioPlatform>,
        haptics: Arc<dyn HapticPlatform>,
        store: SoundSettingsStore,
    ) -> Self {
        Self {
            audio,
            haptics,
            store,
            state: Mutex::new(DispatcherState {
                settings: SoundSettings::default(),
                handles: HashMap::new(),
            }),
        }
    }

    /// Load persisted sound settings into the in-memory snapshot.
    pub async fn init(&self) {
        let settings = self.store.load().await;
        self.lock().settings = settings;
    }

    /// Current settings snapshot.
    #[must_use]
    pub fn settings(&self) -> SoundSettings {
        self.lock().settings
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DispatcherState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Best-effort preload of an audio asset for an event. The handle picks
    /// up the current volume immediately; load failures leave the event on
    /// its haptic fallback.
    pub async fn load_sound(&self, event: FeedbackEvent, asset: &str) {
        match self.audio.load(asset).await {
            Ok(handle) => {
                let volume = {
                    let mut state = self.lock();
                    state.handles.insert(event, Arc::clone(&handle));
                    state.settings.volume
                };
                if let Err(err) = handle.set_volume(volume) {
                    warn!(asset, error = %err, "setting initial volume failed");
                }
            }
            Err(err) => {
                warn!(asset, error = %err, "sound asset load failed, haptic fallback stays");
            }
        }
    }

    /// Pick the feedback for an event: `None` when globally disabled or the
    /// event's category is off, audio when an asset is loaded, haptic
    /// fallback otherwise.
    #[must_use]
    pub fn resolve(&self, event: FeedbackEvent) -> Option<FeedbackAction> {
        let state = self.lock();
        if !state.settings.enabled || !event.sound_category().is_enabled(&state.settings) {
            return None;
        }
        match state.handles.get(&event) {
            Some(handle) => Some(FeedbackAction::Audio(Arc::clone(handle))),
            None => Some(FeedbackAction::Haptic(event.fallback_haptic())),
        }
    }

    /// Execute the feedback for an event. A failing audio replay degrades
    /// to the haptic fallback; a failing haptic is logged and dropped.
    pub async fn play(&self, event: FeedbackEvent) {
        match self.resolve(event) {
            None => {}
            Some(FeedbackAction::Audio(handle)) => {
                let volume = self.settings().volume;
                if let Err(err) = handle.set_volume(volume) {
                    warn!(?event, error = %err, "volume update before replay failed");
                }
                if let Err(err) = handle.replay() {
                    warn!(?event, error = %err, "audio replay failed, falling back to haptic");
                    self.perform_haptic(event.fallback_haptic());
                }
            }
            Some(FeedbackAction::Haptic(action)) => self.perform_haptic(action),
        }
    }

    fn perform_haptic(&self, action: HapticAction) {
        let result = match action {
            HapticAction::Impact(style) => self.haptics.impact(style),
            HapticAction::Notify(kind) => self.haptics.notify(kind),
        };
        if let Err(err) = result {
            warn!(?action, error = %err, "haptic feedback failed");
        }
    }

    /// Merge a settings patch, persist, and push the new volume to every
    /// loaded handle.
    ///
    /// Persistence and per-handle volume failures are logged and swallowed.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if the patch produces invalid settings; the
    /// current settings are left untouched in that case.
    pub async fn update_settings(
        &self,
        patch: SoundSettingsPatch,
    ) -> Result<SoundSettings, SettingsError> {
        let (updated, handles) = {
            let mut state = self.lock();
            let updated = patch.apply(&state.settings)?;
            state.settings = updated;
            let handles: Vec<Arc<dyn SoundHandle>> = state.handles.values().cloned().collect();
            (updated, handles)
        };
        if let Err(err) = self.store.save(&updated).await {
            warn!(error = %err, "persisting sound settings failed");
        }
        for handle in handles {
            if let Err(err) = handle.set_volume(updated.volume) {
                warn!(error = %err, "volume propagation failed");
            }
        }
        Ok(updated)
    }
}
