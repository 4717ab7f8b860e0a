//! Integration tests for the SQLite history store.
//!
//! Tests persistence of the bounded session-history log against a real
//! database file in a temp directory.

use chrono::{TimeZone, Utc};
use tempfile::TempDir;

use vishing_trainer::config::DatabaseConfig;
use vishing_trainer::scenario::ScenarioType;
use vishing_trainer::storage::{HistoryStore, SessionRecord, SqliteHistory};

async fn create_test_store() -> (SqliteHistory, TempDir) {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = DatabaseConfig {
        path: dir.path().join("history.db"),
        max_connections: 2,
    };
    let store = SqliteHistory::new(&config)
        .await
        .expect("Failed to create history store");
    (store, dir)
}

fn record(id: &str, reached_stage: u32) -> SessionRecord {
    SessionRecord {
        id: id.to_string(),
        date: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
        scenario_type: ScenarioType::Prosecutor,
        reached_stage,
        duration_seconds: 90,
    }
}

#[tokio::test]
async fn test_empty_store_loads_nothing() {
    let (store, _dir) = create_test_store().await;
    assert!(store.load().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_save_and_load_round_trip() {
    let (store, _dir) = create_test_store().await;

    let records = vec![record("newest", 5), record("middle", 3), record("oldest", 1)];
    store.save(&records).await.unwrap();

    let loaded = store.load().await.unwrap();
    assert_eq!(loaded, records);
}

#[tokio::test]
async fn test_save_replaces_previous_log() {
    let (store, _dir) = create_test_store().await;

    store.save(&[record("a", 1), record("b", 2)]).await.unwrap();
    store.save(&[record("c", 3)]).await.unwrap();

    let loaded = store.load().await.unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].id, "c");
}

#[tokio::test]
async fn test_order_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let config = DatabaseConfig {
        path: dir.path().join("history.db"),
        max_connections: 2,
    };

    {
        let store = SqliteHistory::new(&config).await.unwrap();
        store
            .save(&[record("second_attempt", 2), record("first_attempt", 4)])
            .await
            .unwrap();
    }

    let reopened = SqliteHistory::new(&config).await.unwrap();
    let loaded = reopened.load().await.unwrap();
    assert_eq!(loaded[0].id, "second_attempt");
    assert_eq!(loaded[1].id, "first_attempt");
}

#[tokio::test]
async fn test_timestamps_round_trip_as_rfc3339() {
    let (store, _dir) = create_test_store().await;

    let saved = record("timed", 2);
    store.save(std::slice::from_ref(&saved)).await.unwrap();

    let loaded = store.load().await.unwrap();
    assert_eq!(loaded[0].date, saved.date);
}
