use super::traits::ReportStore;
use crate::types::{AppError, Report, ReportSummary, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Builder, Connection, Database};

/// libsql-backed report store (local file or in-memory).
pub struct TursoClient {
    _db: Database,
    // One shared connection: each new connection to `:memory:` would see its
    // own empty database.
    conn: Connection,
}

impl TursoClient {
    /// Open the database named by `[database] url`.
    pub async fn connect(url: &str) -> Result<Self> {
        if url == ":memory:" {
            Self::new_memory().await
        } else {
            Self::new_local(url).await
        }
    }

    pub async fn new_local(path: &str) -> Result<Self> {
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    AppError::Database(format!("Failed to create database directory: {}", e))
                })?;
            }
        }

        let db = Builder::new_local(path)
            .build()
            .await
            .map_err(|e| AppError::Database(format!("Failed to open database: {}", e)))?;
        Self::from_database(db).await
    }

    pub async fn new_memory() -> Result<Self> {
        let db = Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| AppError::Database(format!("Failed to open in-memory database: {}", e)))?;
        Self::from_database(db).await
    }

    async fn from_database(db: Database) -> Result<Self> {
        let conn = db
            .connect()
            .map_err(|e| AppError::Database(format!("Failed to get connection: {}", e)))?;
        let client = Self { _db: db, conn };
        client.initialize_schema().await?;
        Ok(client)
    }

    async fn initialize_schema(&self) -> Result<()> {
        self.conn
            .execute(
                "CREATE TABLE IF NOT EXISTS reports (
                    job_id TEXT PRIMARY KEY,
                    topic TEXT NOT NULL,
                    refined_topic TEXT NOT NULL,
                    preferences TEXT NOT NULL,
                    stages TEXT NOT NULL,
                    created_at TEXT NOT NULL
                )",
                (),
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to create reports table: {}", e)))?;

        self.conn
            .execute(
                "CREATE INDEX IF NOT EXISTS idx_reports_created_at ON reports(created_at)",
                (),
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to create reports index: {}", e)))?;

        Ok(())
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::Database(format!("Invalid created_at '{}': {}", raw, e)))
}

#[async_trait]
impl ReportStore for TursoClient {
    async fn save_report(&self, report: &Report) -> Result<()> {
        let preferences = serde_json::to_string(&report.preferences)
            .map_err(|e| AppError::Internal(format!("Failed to encode preferences: {}", e)))?;
        let stages = serde_json::to_string(&report.stages)
            .map_err(|e| AppError::Internal(format!("Failed to encode report stages: {}", e)))?;

        self.conn
            .execute(
                "INSERT INTO reports (job_id, topic, refined_topic, preferences, stages, created_at)
                 VALUES (?, ?, ?, ?, ?, ?)",
                (
                    report.job_id.as_str(),
                    report.topic.as_str(),
                    report.refined_topic.as_str(),
                    preferences,
                    stages,
                    report.created_at.to_rfc3339(),
                ),
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to save report: {}", e)))?;

        Ok(())
    }

    async fn get_report(&self, job_id: &str) -> Result<Option<Report>> {
        let mut rows = self
            .conn
            .query(
                "SELECT job_id, topic, refined_topic, preferences, stages, created_at
                 FROM reports WHERE job_id = ?",
                [job_id],
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to query report: {}", e)))?;

        let Some(row) = rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        else {
            return Ok(None);
        };

        let preferences: String = row.get(3).map_err(|e| AppError::Database(e.to_string()))?;
        let stages: String = row.get(4).map_err(|e| AppError::Database(e.to_string()))?;
        let created_at: String = row.get(5).map_err(|e| AppError::Database(e.to_string()))?;

        Ok(Some(Report {
            job_id: row.get(0).map_err(|e| AppError::Database(e.to_string()))?,
            topic: row.get(1).map_err(|e| AppError::Database(e.to_string()))?,
            refined_topic: row.get(2).map_err(|e| AppError::Database(e.to_string()))?,
            preferences: serde_json::from_str(&preferences)
                .map_err(|e| AppError::Database(format!("Corrupt preferences column: {}", e)))?,
            stages: serde_json::from_str(&stages)
                .map_err(|e| AppError::Database(format!("Corrupt stages column: {}", e)))?,
            created_at: parse_timestamp(&created_at)?,
        }))
    }

    async fn list_reports(&self, limit: usize) -> Result<Vec<ReportSummary>> {
        let mut rows = self
            .conn
            .query(
                "SELECT job_id, topic, refined_topic, created_at
                 FROM reports ORDER BY created_at DESC LIMIT ?",
                [limit as i64],
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to list reports: {}", e)))?;

        let mut summaries = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            let created_at: String = row.get(3).map_err(|e| AppError::Database(e.to_string()))?;
            summaries.push(ReportSummary {
                job_id: row.get(0).map_err(|e| AppError::Database(e.to_string()))?,
                topic: row.get(1).map_err(|e| AppError::Database(e.to_string()))?,
                refined_topic: row.get(2).map_err(|e| AppError::Database(e.to_string()))?,
                created_at: parse_timestamp(&created_at)?,
            });
        }

        Ok(summaries)
    }
}
