//! One-shot pipeline run in the terminal.

use super::output::Output;
use crate::db::InMemoryReportStore;
use crate::llm::{LLMClient, Provider};
use crate::news::SerpApiSource;
use crate::pipeline::{CapabilityGate, Job, PipelineOrchestrator};
use crate::progress::ProgressHub;
use crate::types::{Preferences, Report};
use crate::utils::toml_config::SignalConfig;
use std::sync::Arc;

/// Options collected from `signal-server run`.
pub struct RunOptions {
    pub topic: String,
    pub focus: Option<String>,
    pub depth: Option<i64>,
    pub tone: Option<String>,
}

impl RunOptions {
    pub fn preferences(&self) -> Preferences {
        Preferences::from_parts(self.focus.as_deref(), self.depth, self.tone.as_deref())
    }
}

/// Run a single job, printing every progress event as it arrives.
///
/// The report is kept in memory only.
pub async fn run(
    config: &SignalConfig,
    options: RunOptions,
    output: &Output,
) -> anyhow::Result<Report> {
    let topic = options.topic.trim();
    if topic.is_empty() {
        anyhow::bail!("Topic cannot be empty");
    }

    let llm: Arc<dyn LLMClient> = Arc::from(Provider::from_config(config)?.create_client().await?);
    let source = Arc::new(SerpApiSource::from_config(config)?);
    let progress = Arc::new(ProgressHub::from_config(&config.progress));
    let orchestrator = PipelineOrchestrator::new(
        llm,
        source,
        Arc::new(InMemoryReportStore::new()),
        progress.clone(),
        CapabilityGate::from_config(&config.pipeline),
    );

    let job = Job::new(topic, options.preferences());
    output.header(&format!("Job {}", job.id));
    output.kv("topic", &job.topic);
    output.kv("focus", job.preferences.focus.label());
    output.kv("depth", &job.preferences.depth.level().to_string());
    output.kv("tone", job.preferences.tone.label());
    output.newline();

    progress.register(&job.id);
    let mut subscription = progress
        .attach(&job.id)
        .ok_or_else(|| anyhow::anyhow!("progress channel for job {} is missing", job.id))?;

    let printer = async {
        while let Some(event) = subscription.recv().await {
            output.event(&event);
        }
    };
    let (result, ()) = tokio::join!(orchestrator.run(job), printer);

    let report = result.map_err(|e| anyhow::anyhow!(e.user_message()))?;
    output.header("Report");
    println!("\n{}\n", report.stages.editing);
    Ok(report)
}
