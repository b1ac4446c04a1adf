#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{
    InMemoryStore, KEY_SOUND_SETTINGS, KEY_USER_PROGRESS, KEY_USER_SETTINGS, KeyValueStore,
    Storage, StorageError,
};
pub use sqlite::{SqliteInitError, SqliteStore};
