use storage::repository::{KEY_USER_PROGRESS, KeyValueStore};
use storage::sqlite::SqliteStore;

async fn memory_store() -> SqliteStore {
    let store = SqliteStore::connect("sqlite::memory:").await.unwrap();
    store.migrate().await.unwrap();
    store
}

#[tokio::test]
async fn missing_key_is_none() {
    let store = memory_store().await;
    assert!(store.get(KEY_USER_PROGRESS).await.unwrap().is_none());
}

#[tokio::test]
async fn round_trips_a_json_blob() {
    let store = memory_store().await;
    let blob = r#"{"totalXp":250,"streak":3}"#;
    store.set(KEY_USER_PROGRESS, blob).await.unwrap();
    assert_eq!(
        store.get(KEY_USER_PROGRESS).await.unwrap().as_deref(),
        Some(blob)
    );
}

#[tokio::test]
async fn overwrite_replaces_previous_value() {
    let store = memory_store().await;
    store.set("k", "old").await.unwrap();
    store.set("k", "new").await.unwrap();
    assert_eq!(store.get("k").await.unwrap().as_deref(), Some("new"));
}

#[tokio::test]
async fn migrate_is_idempotent() {
    let store = memory_store().await;
    store.migrate().await.unwrap();
    store.set("k", "v").await.unwrap();
    store.migrate().await.unwrap();
    assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
}
