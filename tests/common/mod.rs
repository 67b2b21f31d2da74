//! Shared helpers for integration tests.

#![allow(dead_code)]

pub mod mocks;

use signal::types::Preferences;
use signal::{CapabilityGate, InMemoryReportStore, PipelineOrchestrator, ProgressHub, ReportStore};
use std::sync::Arc;
use std::time::Duration;

pub use mocks::{FailingReportStore, ScriptedLLM, StaticSource};

/// Three articles in search order.
pub const ARTICLES: &str = r#"[
    {"id": "a1", "title": "Plant closures spread", "source": "Wire", "date": "2025-03-01", "url": "https://news.test/1", "content": "Workers laid off."},
    {"id": "a2", "title": "Markets shrug", "source": "Ledger", "date": "2025-03-01", "url": "https://news.test/2", "content": "Stocks rose."},
    {"id": "a3", "title": "Unions push back", "source": "Courier", "date": "2025-03-02", "url": "https://news.test/3", "content": "Strike threatened."}
]"#;

pub const PROFILES: &str = r#"```json
[
    {"id": "a1", "title": "Plant closures spread", "tone": "critical", "perspective": ["labor"], "source_type": "news report", "region": "US"},
    {"id": "a2", "title": "Markets shrug", "tone": "neutral", "perspective": ["markets"], "source_type": "analysis", "region": "Global"},
    {"id": "a3", "title": "Unions push back", "tone": "supportive", "perspective": ["unions"], "source_type": "news report", "region": "EU"}
]
```"#;

/// A script where every stage succeeds.
pub fn happy_llm() -> ScriptedLLM {
    ScriptedLLM::new()
        .refiner("\"tech layoffs\"")
        .profiler(PROFILES)
        .selector(r#"["a3", "a1"]"#)
        .synthesizer("[Wire](https://news.test/1) reports closures while [Courier](https://news.test/3) covers unions.")
        .editor("## Layoffs, two ways\n\nEdited report.")
}

/// Everything a pipeline test needs to inspect afterwards.
pub struct Harness {
    pub llm: Arc<ScriptedLLM>,
    pub source: Arc<StaticSource>,
    pub store: Arc<InMemoryReportStore>,
    pub progress: Arc<ProgressHub>,
    pub orchestrator: PipelineOrchestrator,
}

pub fn harness(llm: ScriptedLLM, source: StaticSource) -> Harness {
    harness_with_timeout(llm, source, Duration::from_secs(5))
}

pub fn harness_with_timeout(llm: ScriptedLLM, source: StaticSource, timeout: Duration) -> Harness {
    let llm = Arc::new(llm);
    let source = Arc::new(source);
    let store = Arc::new(InMemoryReportStore::new());
    let progress = Arc::new(ProgressHub::new(64, Duration::from_secs(60)));
    let orchestrator = PipelineOrchestrator::new(
        llm.clone(),
        source.clone(),
        store.clone(),
        progress.clone(),
        CapabilityGate::new(4, timeout),
    );
    Harness {
        llm,
        source,
        store,
        progress,
        orchestrator,
    }
}

/// Orchestrator backed by a store that refuses every write.
pub fn failing_store_orchestrator(llm: ScriptedLLM, source: StaticSource) -> (PipelineOrchestrator, Arc<ProgressHub>) {
    let progress = Arc::new(ProgressHub::new(64, Duration::from_secs(60)));
    let store: Arc<dyn ReportStore> = Arc::new(FailingReportStore);
    let orchestrator = PipelineOrchestrator::new(
        Arc::new(llm),
        Arc::new(source),
        store,
        progress.clone(),
        CapabilityGate::new(4, Duration::from_secs(5)),
    );
    (orchestrator, progress)
}

pub fn prefs(depth: i64) -> Preferences {
    Preferences::from_parts(None, Some(depth), None)
}
