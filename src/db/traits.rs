//! Report storage abstraction
//!
//! The pipeline hands a finished [`Report`] to a [`ReportStore`] only after all
//! stages succeeded. [`TursoClient`](super::turso::TursoClient) persists to
//! libsql; [`InMemoryReportStore`] keeps reports in a map for tests and the
//! one-shot CLI runner.

use crate::types::{AppError, Report, ReportSummary, Result};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Persistent sink for completed reports
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Store a completed report. Fails if a report already exists for the job.
    async fn save_report(&self, report: &Report) -> Result<()>;

    /// Fetch a stored report by job id
    async fn get_report(&self, job_id: &str) -> Result<Option<Report>>;

    /// Most recent reports first
    async fn list_reports(&self, limit: usize) -> Result<Vec<ReportSummary>>;
}

/// Report store backed by a process-local map.
#[derive(Default)]
pub struct InMemoryReportStore {
    reports: RwLock<HashMap<String, Report>>,
}

impl InMemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.reports.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.read().is_empty()
    }
}

#[async_trait]
impl ReportStore for InMemoryReportStore {
    async fn save_report(&self, report: &Report) -> Result<()> {
        let mut reports = self.reports.write();
        if reports.contains_key(&report.job_id) {
            return Err(AppError::Database(format!(
                "Report for job {} already exists",
                report.job_id
            )));
        }
        reports.insert(report.job_id.clone(), report.clone());
        Ok(())
    }

    async fn get_report(&self, job_id: &str) -> Result<Option<Report>> {
        Ok(self.reports.read().get(job_id).cloned())
    }

    async fn list_reports(&self, limit: usize) -> Result<Vec<ReportSummary>> {
        let reports = self.reports.read();
        let mut summaries: Vec<ReportSummary> = reports
            .values()
            .map(|r| ReportSummary {
                job_id: r.job_id.clone(),
                topic: r.topic.clone(),
                refined_topic: r.refined_topic.clone(),
                created_at: r.created_at,
            })
            .collect();
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        summaries.truncate(limit);
        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Preferences, ReportStages};
    use chrono::{Duration, Utc};

    fn report(job_id: &str, age_secs: i64) -> Report {
        Report {
            job_id: job_id.to_string(),
            topic: "ai".to_string(),
            refined_topic: "AI".to_string(),
            preferences: Preferences::default(),
            stages: ReportStages::default(),
            created_at: Utc::now() - Duration::seconds(age_secs),
        }
    }

    #[tokio::test]
    async fn test_save_and_get() {
        let store = InMemoryReportStore::new();
        store.save_report(&report("a", 0)).await.unwrap();
        assert_eq!(store.get_report("a").await.unwrap().unwrap().topic, "ai");
        assert!(store.get_report("b").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_is_rejected() {
        let store = InMemoryReportStore::new();
        store.save_report(&report("a", 0)).await.unwrap();
        assert!(store.save_report(&report("a", 0)).await.is_err());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let store = InMemoryReportStore::new();
        store.save_report(&report("old", 100)).await.unwrap();
        store.save_report(&report("new", 1)).await.unwrap();
        store.save_report(&report("mid", 50)).await.unwrap();

        let list = store.list_reports(2).await.unwrap();
        let ids: Vec<_> = list.iter().map(|s| s.job_id.as_str()).collect();
        assert_eq!(ids, vec!["new", "mid"]);
    }
}
