use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod preferences;

pub use preferences::{Depth, Focus, Preferences, Tone};

// ============= API Request/Response Types =============

/// Body of `POST /process_news`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewsRequest {
    pub topic: String,
    #[serde(default)]
    pub user_preferences: Preferences,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NewsResponse {
    pub message: String,
    pub job_id: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub active_jobs: usize,
}

// ============= Pipeline Data Types =============

/// A news article as produced by an article source.
///
/// `id` is generated fresh on every fetch and is the join key used by the
/// profiling and selection stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Article {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub content: String,
}

/// Source profile produced by the profiling stage for one article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Profile {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub tone: String,
    #[serde(default)]
    pub perspective: Vec<String>,
    #[serde(default)]
    pub source_type: String,
    #[serde(default)]
    pub region: String,
}

/// Per-stage outputs kept in a finished report.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ReportStages {
    pub search: Vec<Article>,
    pub profiling: Vec<Profile>,
    pub selection: Vec<Article>,
    pub synthesis: String,
    pub editing: String,
}

/// Final output of a fully completed pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Report {
    pub job_id: String,
    pub topic: String,
    #[serde(rename = "refinedTopic")]
    pub refined_topic: String,
    pub preferences: Preferences,
    pub stages: ReportStages,
    pub created_at: DateTime<Utc>,
}

/// Row summary returned when listing stored reports.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReportSummary {
    pub job_id: String,
    pub topic: String,
    pub refined_topic: String,
    pub created_at: DateTime<Utc>,
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("LLM error: {0}")]
    LLM(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::Database(msg) => (axum::http::StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::LLM(msg) => (axum::http::StatusCode::BAD_GATEWAY, msg),
            AppError::Search(msg) => (axum::http::StatusCode::BAD_GATEWAY, msg),
            AppError::NotFound(msg) => (axum::http::StatusCode::NOT_FOUND, msg),
            AppError::InvalidInput(msg) => (axum::http::StatusCode::BAD_REQUEST, msg),
            AppError::Configuration(msg) => (axum::http::StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::Internal(msg) => (axum::http::StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[test]
    fn test_error_status_codes() {
        let resp = AppError::NotFound("x".to_string()).into_response();
        assert_eq!(resp.status(), axum::http::StatusCode::NOT_FOUND);

        let resp = AppError::InvalidInput("x".to_string()).into_response();
        assert_eq!(resp.status(), axum::http::StatusCode::BAD_REQUEST);

        let resp = AppError::Database("x".to_string()).into_response();
        assert_eq!(
            resp.status(),
            axum::http::StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_article_tolerates_missing_fields() {
        let article: Article = serde_json::from_str(r#"{"id": "a-1", "title": "T"}"#).unwrap();
        assert_eq!(article.id, "a-1");
        assert!(article.content.is_empty());
    }

    #[test]
    fn test_report_uses_refined_topic_key() {
        let report = Report {
            job_id: "job".to_string(),
            topic: "tech layoffs".to_string(),
            refined_topic: "tech layoffs".to_string(),
            preferences: Preferences::default(),
            stages: ReportStages::default(),
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(&report).unwrap();
        assert!(value.get("refinedTopic").is_some());
        assert!(value["stages"].get("synthesis").is_some());
    }

    #[test]
    fn test_news_request_defaults_preferences() {
        let req: NewsRequest = serde_json::from_str(r#"{"topic": "ai"}"#).unwrap();
        assert_eq!(req.user_preferences, Preferences::default());
    }
}
