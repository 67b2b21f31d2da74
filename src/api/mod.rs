//! HTTP API Handlers and Routes
//!
//! The transport layer for Signal, built on the Axum web framework.
//!
//! # API Endpoints
//!
//! - `GET /` - Liveness message
//! - `GET /health` - Health check with active job count
//! - `POST /process_news` - Start a pipeline job, returns its `job_id`
//! - `GET /ws/status/{job_id}` - WebSocket stream of the job's progress events
//! - `GET /reports` - Recent stored reports
//! - `GET /reports/{job_id}` - A stored report
//!
//! # OpenAPI Documentation
//!
//! When the `swagger-ui` feature is enabled, interactive API documentation
//! is available at `/swagger-ui/`.

/// OpenAPI document.
pub mod docs;
/// Request and response handlers for all API endpoints.
pub mod handlers;
/// Router configuration and route definitions.
pub mod routes;
