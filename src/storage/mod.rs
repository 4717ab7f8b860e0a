//! Storage layer for the session history log.
//!
//! The controller persists one compact record per completed session into a
//! bounded, newest-first history. Persistence is an injected capability
//! invoked only at defined lifecycle points (session completion), never as a
//! side effect of field mutation.

mod sqlite;

pub use sqlite::SqliteHistory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::StorageResult;
use crate::scenario::ScenarioType;

/// Compact record of a completed training session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: String,
    pub date: DateTime<Utc>,
    pub scenario_type: ScenarioType,
    pub reached_stage: u32,
    pub duration_seconds: u32,
}

/// History log persistence capability.
///
/// `save` replaces the whole log; callers own ordering (newest first) and
/// eviction. The log is small by design - it is capped upstream.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Load all records, newest first.
    async fn load(&self) -> StorageResult<Vec<SessionRecord>>;

    /// Replace the stored log with `records`.
    async fn save(&self, records: &[SessionRecord]) -> StorageResult<()>;
}

/// In-memory history store for tests and ephemeral runs.
#[derive(Debug, Default)]
pub struct MemoryHistory {
    records: Mutex<Vec<SessionRecord>>,
}

impl MemoryHistory {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistory {
    async fn load(&self) -> StorageResult<Vec<SessionRecord>> {
        Ok(self.records.lock().await.clone())
    }

    async fn save(&self, records: &[SessionRecord]) -> StorageResult<()> {
        *self.records.lock().await = records.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str) -> SessionRecord {
        SessionRecord {
            id: id.to_string(),
            date: Utc::now(),
            scenario_type: ScenarioType::Prosecutor,
            reached_stage: 3,
            duration_seconds: 120,
        }
    }

    #[tokio::test]
    async fn test_memory_history_round_trip() {
        let store = MemoryHistory::new();
        assert!(store.load().await.unwrap().is_empty());

        let records = vec![record("a"), record("b")];
        store.save(&records).await.unwrap();
        assert_eq!(store.load().await.unwrap(), records);
    }

    #[tokio::test]
    async fn test_memory_history_save_replaces() {
        let store = MemoryHistory::new();
        store.save(&[record("a")]).await.unwrap();
        store.save(&[record("b")]).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, "b");
    }
}
