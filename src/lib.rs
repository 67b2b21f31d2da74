//! # Signal - Multi-Perspective News Server
//!
//! Signal turns a topic into a multi-perspective news report by running a
//! fixed pipeline of agents: query refinement, news search, source profiling,
//! diversity selection, debate synthesis and creative editing. Progress is
//! streamed to the client over a WebSocket while the job runs.
//!
//! ## Overview
//!
//! Signal can be used in two ways:
//!
//! 1. **As a standalone server** - Run the `signal-server` binary
//! 2. **As a library** - Drive [`PipelineOrchestrator`] with your own
//!    [`LLMClient`], [`ArticleSource`] and [`ReportStore`]
//!
//! ### Basic Example
//!
//! ```rust,ignore
//! use signal::{CapabilityGate, InMemoryReportStore, Job, PipelineOrchestrator, ProgressHub};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let hub = Arc::new(ProgressHub::new(64, Duration::from_secs(300)));
//! let orchestrator = PipelineOrchestrator::new(
//!     llm,
//!     source,
//!     Arc::new(InMemoryReportStore::new()),
//!     hub.clone(),
//!     CapabilityGate::new(8, Duration::from_secs(180)),
//! );
//!
//! let report = orchestrator.run(Job::new("tech layoffs", Default::default())).await?;
//! println!("{}", report.stages.editing);
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `ollama` | Ollama local inference (default) |
//! | `openai` | OpenAI API and compatible endpoints |
//! | `swagger-ui` | Interactive API docs at `/swagger-ui` |
//!
//! ## Modules
//!
//! - [`agents`] - Agent roles and their instructions
//! - [`api`] - REST and WebSocket handlers and routes
//! - [`cli`] - Command-line interface for the binary
//! - [`db`] - Report persistence (libsql, in-memory)
//! - [`llm`] - LLM client implementations
//! - [`news`] - Article sources
//! - [`pipeline`] - The staged orchestrator and its state machine
//! - [`progress`] - Per-job progress channels
//! - [`types`] - Common types and error handling
//! - [`utils`] - Configuration loading and hot reload

#![cfg_attr(docsrs, feature(doc_cfg))]

/// Pipeline agent roles and instruction builders.
pub mod agents;
/// HTTP API handlers and routes.
pub mod api;
/// Command-line interface.
pub mod cli;
/// Report storage.
pub mod db;
/// LLM provider clients and abstractions.
pub mod llm;
/// Article sources for the search stage.
pub mod news;
/// Staged pipeline orchestration.
pub mod pipeline;
/// Per-job progress channels with replay.
pub mod progress;
/// Core types (requests, responses, errors).
pub mod types;
/// Configuration utilities.
pub mod utils;

// Re-export commonly used types
pub use db::{InMemoryReportStore, ReportStore, TursoClient};
pub use llm::{LLMClient, Provider};
pub use news::{ArticleSource, SerpApiSource};
pub use pipeline::{CapabilityGate, Job, PipelineOrchestrator, StageError, StageEvent};
pub use progress::ProgressHub;
pub use types::{AppError, Result};
pub use utils::toml_config::{ConfigManager, SignalConfig};

use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// TOML configuration with hot-reload support
    pub config_manager: Arc<ConfigManager>,
    /// Orchestrator template; each job runs on a clone
    pub pipeline: Arc<PipelineOrchestrator>,
    /// Stored reports
    pub store: Arc<dyn ReportStore>,
    /// Progress channels for running and recently finished jobs
    pub progress: Arc<ProgressHub>,
}

impl AppState {
    /// Wire the shared capabilities together using the current configuration.
    pub fn new(
        config_manager: Arc<ConfigManager>,
        llm: Arc<dyn LLMClient>,
        source: Arc<dyn ArticleSource>,
        store: Arc<dyn ReportStore>,
    ) -> Self {
        let config = config_manager.config();
        let progress = Arc::new(ProgressHub::from_config(&config.progress));
        let gate = CapabilityGate::from_config(&config.pipeline);
        let pipeline = Arc::new(PipelineOrchestrator::new(
            llm,
            source,
            store.clone(),
            progress.clone(),
            gate,
        ));

        Self {
            config_manager,
            pipeline,
            store,
            progress,
        }
    }
}
