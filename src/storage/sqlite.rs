use std::str::FromStr;

use async_trait::async_trait;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::info;

use super::{HistoryStore, SessionRecord};
use crate::config::DatabaseConfig;
use crate::error::{StorageError, StorageResult};
use crate::scenario::ScenarioType;

/// Static migrator that embeds migrations at compile time
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// SQLite-backed history store
#[derive(Clone)]
pub struct SqliteHistory {
    pool: SqlitePool,
}

impl SqliteHistory {
    /// Create a new SQLite history store
    pub async fn new(config: &DatabaseConfig) -> StorageResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = config.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::Connection {
                message: format!("Failed to create database directory: {}", e),
            })?;
        }

        let database_url = format!("sqlite://{}?mode=rwc", config.path.display());

        let options = SqliteConnectOptions::from_str(&database_url)
            .map_err(|e| StorageError::Connection {
                message: format!("Invalid database URL: {}", e),
            })?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::Connection {
                message: format!("Failed to connect to database: {}", e),
            })?;

        let storage = Self { pool };
        storage.run_migrations().await?;

        Ok(storage)
    }

    /// Run database migrations using embedded sqlx migrations
    async fn run_migrations(&self) -> StorageResult<()> {
        info!("Running database migrations...");

        MIGRATOR
            .run(&self.pool)
            .await
            .map_err(|e| StorageError::Migration {
                message: format!("Failed to run migrations: {}", e),
            })?;

        info!("Database migrations completed successfully");
        Ok(())
    }

    /// Get the underlying pool for advanced queries
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl HistoryStore for SqliteHistory {
    async fn load(&self) -> StorageResult<Vec<SessionRecord>> {
        let rows: Vec<SessionRecordRow> = sqlx::query_as(
            r#"
            SELECT id, date, scenario_type, reached_stage, duration_seconds
            FROM session_history
            ORDER BY position ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(SessionRecord::try_from).collect()
    }

    async fn save(&self, records: &[SessionRecord]) -> StorageResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM session_history")
            .execute(&mut *tx)
            .await?;

        for (position, record) in records.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO session_history (position, id, date, scenario_type, reached_stage, duration_seconds)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(position as i64)
            .bind(&record.id)
            .bind(record.date.to_rfc3339())
            .bind(record.scenario_type.as_str())
            .bind(i64::from(record.reached_stage))
            .bind(i64::from(record.duration_seconds))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

// Internal row type for SQLx mapping
#[derive(sqlx::FromRow)]
struct SessionRecordRow {
    id: String,
    date: String,
    scenario_type: String,
    reached_stage: i64,
    duration_seconds: i64,
}

impl TryFrom<SessionRecordRow> for SessionRecord {
    type Error = StorageError;

    fn try_from(row: SessionRecordRow) -> Result<Self, Self::Error> {
        use chrono::DateTime;

        let scenario_type =
            ScenarioType::from_str(&row.scenario_type).map_err(|e| StorageError::Query {
                message: format!("Corrupt scenario_type column: {}", e),
            })?;

        Ok(Self {
            id: row.id,
            date: DateTime::parse_from_rfc3339(&row.date)
                .map(|dt| dt.with_timezone(&chrono::Utc))
                .unwrap_or_else(|_| chrono::Utc::now()),
            scenario_type,
            reached_stage: u32::try_from(row.reached_stage).unwrap_or(0),
            duration_seconds: u32::try_from(row.duration_seconds).unwrap_or(0),
        })
    }
}
