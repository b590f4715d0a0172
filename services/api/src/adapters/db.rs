//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It stores classification
//! records in PostgreSQL using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use feelscope_core::domain::{ClassificationRecord, Emotion, NewRecord};
use feelscope_core::ports::{DatabaseService, PortError, PortResult};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    /// Closes every pooled connection. Called once on shutdown.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

//=========================================================================================
// "Impure" Database Record Struct
//=========================================================================================

#[derive(FromRow)]
struct AnalysisRecord {
    id: Uuid,
    text: String,
    sentiment: String,
    emotion: Json<Emotion>,
    topic: String,
    source: String,
    analyzed_at: DateTime<Utc>,
}
impl AnalysisRecord {
    fn to_domain(self) -> ClassificationRecord {
        ClassificationRecord {
            id: self.id,
            text: self.text,
            sentiment: self.sentiment,
            emotion: self.emotion.0,
            topic: self.topic,
            timestamp: self.analyzed_at,
            source: self.source,
        }
    }
}

const SELECT_ALL: &str = "SELECT id, text, sentiment, emotion, topic, source, analyzed_at \
     FROM analyses ORDER BY analyzed_at DESC, id DESC";
const SELECT_BY_SOURCE: &str = "SELECT id, text, sentiment, emotion, topic, source, analyzed_at \
     FROM analyses WHERE source = $1 ORDER BY analyzed_at DESC, id DESC";

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn insert_record(&self, record: NewRecord) -> PortResult<ClassificationRecord> {
        // timestamptz keeps microseconds; truncate so the returned record matches what is read back.
        let stored = ClassificationRecord::from_new(record, Uuid::new_v4(), Utc::now().trunc_subsecs(6));

        sqlx::query(
            "INSERT INTO analyses (id, text, sentiment, emotion, topic, source, analyzed_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(stored.id)
        .bind(&stored.text)
        .bind(&stored.sentiment)
        .bind(Json(&stored.emotion))
        .bind(&stored.topic)
        .bind(&stored.source)
        .bind(stored.timestamp)
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        Ok(stored)
    }

    async fn list_records(&self, source: Option<&str>) -> PortResult<Vec<ClassificationRecord>> {
        let query = match source {
            Some(source) => sqlx::query_as::<_, AnalysisRecord>(SELECT_BY_SOURCE).bind(source),
            None => sqlx::query_as::<_, AnalysisRecord>(SELECT_ALL),
        };
        let records = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn delete_all_records(&self) -> PortResult<u64> {
        let result = sqlx::query("DELETE FROM analyses")
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(result.rows_affected())
    }
}
