//! Typed access to the persisted JSON blobs (`userSettings`,
//! `soundSettings`, `userProgress`).
//!
//! Reads never fail: an absent key, a storage error or a malformed blob all
//! fall back to defaults (logged, not propagated). Writes surface a
//! [`PersistError`] so callers can decide to log-and-continue.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use progress_core::model::{NotificationSettings, ProgressRecord, SoundSettings};
use storage::repository::{
    KEY_SOUND_SETTINGS, KEY_USER_PROGRESS, KEY_USER_SETTINGS, KeyValueStore,
};

use crate::error::PersistError;

async fn load_or_default<T>(kv: &dyn KeyValueStore, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    let raw = match kv.get(key).await {
        Ok(raw) => raw,
        Err(err) => {
            warn!(key, error = %err, "settings read failed, using defaults");
            return T::default();
        }
    };
    let Some(raw) = raw else {
        return T::default();
    };
    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(err) => {
            // Malformed JSON is treated as absent, never as fatal.
            debug!(key, error = %err, "malformed persisted blob, using defaults");
            T::default()
        }
    }
}

async fn save_json<T: Serialize>(
    kv: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), PersistError> {
    let encoded = serde_json::to_string(value)?;
    kv.set(key, &encoded).await?;
    Ok(())
}

/// Persisted notification settings (`userSettings` key).
#[derive(Clone)]
pub struct NotificationSettingsStore {
    kv: Arc<dyn KeyValueStore>,
}

impl NotificationSettingsStore {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Load persisted settings, falling back to defaults. A blob that
    /// decodes but fails validation also falls back.
    pub async fn load(&self) -> NotificationSettings {
        let settings: NotificationSettings =
            load_or_default(self.kv.as_ref(), KEY_USER_SETTINGS).await;
        match settings.validate() {
            Ok(()) => settings,
            Err(err) => {
                debug!(error = %err, "persisted notification settings invalid, using defaults");
                NotificationSettings::default()
            }
        }
    }

    /// Persist the settings blob.
    ///
    /// # Errors
    ///
    /// Returns `PersistError` if encoding or the store write fails.
    pub async fn save(&self, settings: &NotificationSettings) -> Result<(), PersistError> {
        save_json(self.kv.as_ref(), KEY_USER_SETTINGS, settings).await
    }
}

/// Persisted sound settings (`soundSettings` key).
#[derive(Clone)]
pub struct SoundSettingsStore {
    kv: Arc<dyn KeyValueStore>,
}

impl SoundSettingsStore {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Load persisted settings, falling back to defaults.
    pub async fn load(&self) -> SoundSettings {
        let settings: SoundSettings = load_or_default(self.kv.as_ref(), KEY_SOUND_SETTINGS).await;
        match settings.validate() {
            Ok(()) => settings,
            Err(err) => {
                debug!(error = %err, "persisted sound settings invalid, using defaults");
                SoundSettings::default()
            }
        }
    }

    /// Persist the settings blob.
    ///
    /// # Errors
    ///
    /// Returns `PersistError` if encoding or the store write fails.
    pub async fn save(&self, settings: &SoundSettings) -> Result<(), PersistError> {
        save_json(self.kv.as_ref(), KEY_SOUND_SETTINGS, settings).await
    }
}

/// Persisted progress record (`userProgress` key).
#[derive(Clone)]
pub struct ProgressStore {
    kv: Arc<dyn KeyValueStore>,
}

impl ProgressStore {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Load the persisted record, falling back to an empty one.
    pub async fn load(&self) -> ProgressRecord {
        load_or_default(self.kv.as_ref(), KEY_USER_PROGRESS).await
    }

    /// Persist the record blob.
    ///
    /// # Errors
    ///
    /// Returns `PersistError` if encoding or the store write fails.
    pub async fn save(&self, record: &ProgressRecord) -> Result<(), PersistError> {
        save_json(self.kv.as_ref(), KEY_USER_PROGRESS, record).await
    }
}
