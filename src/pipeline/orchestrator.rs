//! Pipeline Orchestrator
//!
//! Drives one job through the six dependent stages, publishing progress events
//! as it goes. The first failure ends the job: one `error` event is published,
//! nothing is persisted and the error is returned to the caller.

use super::error::{ErrorKind, StageError};
use super::events::{StageEvent, Step};
use super::gate::CapabilityGate;
use super::parse;
use super::state::{PipelineState, StateMachine};
use crate::agents::{Agent, RoleAgent};
use crate::db::ReportStore;
use crate::llm::LLMClient;
use crate::news::ArticleSource;
use crate::progress::ProgressHub;
use crate::types::{Article, Preferences, Profile, Report, ReportStages};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

/// A submitted pipeline run. Immutable once created.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: String,
    pub topic: String,
    pub preferences: Preferences,
}

impl Job {
    pub fn new(topic: impl Into<String>, preferences: Preferences) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            topic: topic.into(),
            preferences,
        }
    }
}

/// Sequences the stages of every job against shared capabilities.
#[derive(Clone)]
pub struct PipelineOrchestrator {
    llm: Arc<dyn LLMClient>,
    source: Arc<dyn ArticleSource>,
    store: Arc<dyn ReportStore>,
    progress: Arc<ProgressHub>,
    gate: CapabilityGate,
}

/// Per-job working state.
struct JobRun<'a> {
    job: &'a Job,
    machine: StateMachine,
}

impl JobRun<'_> {
    fn enter(&mut self, state: PipelineState) -> Result<Instant, StageError> {
        self.machine.transition(state)?;
        tracing::info!(job_id = %self.job.id, stage = %state, "Stage started");
        Ok(Instant::now())
    }

    fn finish(&self, started: Instant) {
        tracing::info!(
            job_id = %self.job.id,
            stage = %self.machine.current(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Stage finished"
        );
    }
}

fn to_value<T: Serialize>(state: PipelineState, value: &T) -> Result<Value, StageError> {
    serde_json::to_value(value)
        .map_err(|e| StageError::new(state, ErrorKind::Internal, format!("encode failed: {}", e)))
}

fn to_json<T: Serialize>(state: PipelineState, value: &T) -> Result<String, StageError> {
    serde_json::to_string(value)
        .map_err(|e| StageError::new(state, ErrorKind::Internal, format!("encode failed: {}", e)))
}

impl PipelineOrchestrator {
    pub fn new(
        llm: Arc<dyn LLMClient>,
        source: Arc<dyn ArticleSource>,
        store: Arc<dyn ReportStore>,
        progress: Arc<ProgressHub>,
        gate: CapabilityGate,
    ) -> Self {
        Self {
            llm,
            source,
            store,
            progress,
            gate,
        }
    }

    /// A handle sharing every capability but with a different stage deadline.
    pub fn with_stage_timeout(&self, timeout: std::time::Duration) -> Self {
        Self {
            gate: self.gate.with_timeout(timeout),
            ..self.clone()
        }
    }

    pub fn progress(&self) -> &Arc<ProgressHub> {
        &self.progress
    }

    /// Run `job` to completion.
    ///
    /// Returns the persisted report, or the error that ended the job. Either
    /// way the job's progress channel is closed before returning.
    pub async fn run(&self, job: Job) -> Result<Report, StageError> {
        let started = Instant::now();
        self.progress.register(&job.id);
        tracing::info!(
            job_id = %job.id,
            topic = %job.topic,
            focus = job.preferences.focus.label(),
            depth = job.preferences.depth.level(),
            tone = job.preferences.tone.label(),
            "Pipeline started"
        );

        let mut run = JobRun {
            job: &job,
            machine: StateMachine::new(),
        };

        let result = self.execute(&mut run).await;

        match &result {
            Ok(_) => {
                tracing::info!(
                    job_id = %job.id,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Pipeline completed"
                );
            }
            Err(err) => {
                if let Err(e) = run.machine.fail() {
                    tracing::warn!(job_id = %job.id, error = %e, "Could not mark job failed");
                }
                tracing::error!(
                    job_id = %job.id,
                    stage = %err.state,
                    kind = ?err.kind,
                    detail = %err.detail,
                    "Pipeline failed"
                );
                self.progress
                    .publish(StageEvent::failed(&job.id, err.step(), err.user_message()));
            }
        }

        self.progress.complete(&job.id);
        result
    }

    async fn execute(&self, run: &mut JobRun<'_>) -> Result<Report, StageError> {
        let refined_topic = self.refine_query(run).await?;
        let articles = self.search(run, &refined_topic).await?;
        let profiles = self.profile(run, &articles).await?;
        let selection = self.select(run, &articles, &profiles).await?;
        let synthesis = self.synthesize(run, &selection).await?;
        let editing = self.edit(run, &synthesis).await?;

        let report = Report {
            job_id: run.job.id.clone(),
            topic: run.job.topic.clone(),
            refined_topic,
            preferences: run.job.preferences,
            stages: ReportStages {
                search: articles,
                profiling: profiles,
                selection,
                synthesis,
                editing,
            },
            created_at: Utc::now(),
        };

        self.store
            .save_report(&report)
            .await
            .map_err(|e| StageError::persistence(e.to_string()))?;

        self.progress.publish(StageEvent::completed(
            &run.job.id,
            Step::Editing,
            Value::String(report.stages.editing.clone()),
        ));
        run.machine.advance()?;

        Ok(report)
    }

    async fn call_agent(
        &self,
        agent: &RoleAgent,
        state: PipelineState,
        input: &str,
    ) -> Result<String, StageError> {
        tracing::debug!(agent = agent.role().name(), input_len = input.len(), "Agent call");
        self.gate
            .call(agent.execute(input))
            .await
            .map_err(|e| StageError::upstream(state, e.to_string()))
    }

    async fn refine_query(&self, run: &mut JobRun<'_>) -> Result<String, StageError> {
        let state = PipelineState::RefiningQuery;
        let started = run.enter(state)?;
        self.progress.publish(StageEvent::running(
            &run.job.id,
            Step::Search,
            "Refining search query...",
        ));

        let agent = RoleAgent::query_refiner(self.llm.clone());
        let output = self.call_agent(&agent, state, &run.job.topic).await?;
        let refined = parse::strip_quotes(&output).to_string();
        if refined.is_empty() {
            return Err(StageError::empty(state, "refiner returned no keywords"));
        }

        if refined == run.job.topic.trim() {
            tracing::info!(job_id = %run.job.id, "Topic unchanged by refinement");
        } else {
            tracing::info!(job_id = %run.job.id, refined = %refined, "Topic refined");
        }
        run.finish(started);
        Ok(refined)
    }

    async fn search(
        &self,
        run: &mut JobRun<'_>,
        refined_topic: &str,
    ) -> Result<Vec<Article>, StageError> {
        let state = PipelineState::Searching;
        let started = run.enter(state)?;

        let raw = self
            .gate
            .call(self.source.fetch(refined_topic))
            .await
            .map_err(|e| StageError::upstream(state, e.to_string()))?;

        let articles = parse::parse_articles(&raw).map_err(|e| {
            StageError::parse(state, format!("{} returned invalid JSON: {}", self.source.name(), e))
        })?;
        if articles.is_empty() {
            return Err(StageError::empty(
                state,
                format!("no coverage found for '{}'", refined_topic),
            ));
        }

        tracing::debug!(job_id = %run.job.id, count = articles.len(), "Articles fetched");
        self.progress.publish(
            StageEvent::completed(&run.job.id, Step::Search, to_value(state, &articles)?)
                .with_refined_topic(refined_topic),
        );
        run.finish(started);
        Ok(articles)
    }

    async fn profile(
        &self,
        run: &mut JobRun<'_>,
        articles: &[Article],
    ) -> Result<Vec<Profile>, StageError> {
        let state = PipelineState::Profiling;
        let started = run.enter(state)?;
        self.progress.publish(StageEvent::running(
            &run.job.id,
            Step::Profiling,
            "Profiling sources...",
        ));

        let agent = RoleAgent::source_profiler(self.llm.clone(), run.job.preferences.focus);
        let output = self
            .call_agent(&agent, state, &to_json(state, &articles)?)
            .await?;

        let (profiles, orphans) = parse::parse_profiles(&output, articles)
            .map_err(|e| StageError::parse(state, format!("profiles are not valid JSON: {}", e)))?;
        if !orphans.is_empty() {
            tracing::warn!(
                job_id = %run.job.id,
                dropped = orphans.len(),
                ids = ?orphans,
                "Dropped profiles with unknown article ids"
            );
        }

        self.progress.publish(StageEvent::completed(
            &run.job.id,
            Step::Profiling,
            to_value(state, &profiles)?,
        ));
        run.finish(started);
        Ok(profiles)
    }

    async fn select(
        &self,
        run: &mut JobRun<'_>,
        articles: &[Article],
        profiles: &[Profile],
    ) -> Result<Vec<Article>, StageError> {
        let state = PipelineState::Selecting;
        let started = run.enter(state)?;
        self.progress.publish(StageEvent::running(
            &run.job.id,
            Step::Selection,
            "Selecting diverse articles...",
        ));

        let prefs = run.job.preferences;
        let agent = RoleAgent::diversity_selector(self.llm.clone(), prefs.focus, prefs.depth);
        let output = self
            .call_agent(&agent, state, &to_json(state, &profiles)?)
            .await?;

        let ids = parse::parse_selection_ids(&output)
            .map_err(|e| StageError::parse(state, format!("selection is not a JSON list: {}", e)))?;
        let selection = parse::select_articles(articles, &ids);
        let foreign = parse::foreign_ids(articles, &ids);
        if !foreign.is_empty() {
            tracing::warn!(
                job_id = %run.job.id,
                ignored = ?foreign,
                kept = selection.len(),
                "Ignored selected ids outside the article set"
            );
        }

        self.progress.publish(StageEvent::completed(
            &run.job.id,
            Step::Selection,
            to_value(state, &selection)?,
        ));
        run.finish(started);
        Ok(selection)
    }

    async fn synthesize(
        &self,
        run: &mut JobRun<'_>,
        selection: &[Article],
    ) -> Result<String, StageError> {
        let state = PipelineState::Synthesizing;
        let started = run.enter(state)?;
        self.progress.publish(StageEvent::running(
            &run.job.id,
            Step::Synthesis,
            "Synthesizing the debate...",
        ));

        let prefs = run.job.preferences;
        let agent = RoleAgent::debate_synthesizer(self.llm.clone(), prefs.focus, prefs.depth);
        let output = self
            .call_agent(&agent, state, &to_json(state, &selection)?)
            .await?;
        if output.trim().is_empty() {
            return Err(StageError::empty(state, "synthesizer returned no text"));
        }

        self.progress.publish(StageEvent::completed(
            &run.job.id,
            Step::Synthesis,
            Value::String(output.clone()),
        ));
        run.finish(started);
        Ok(output)
    }

    /// Runs the editor. The `completed` event is published by the caller once
    /// the report has been stored.
    async fn edit(&self, run: &mut JobRun<'_>, synthesis: &str) -> Result<String, StageError> {
        let state = PipelineState::Editing;
        let started = run.enter(state)?;
        self.progress.publish(StageEvent::running(
            &run.job.id,
            Step::Editing,
            "Applying a creative touch...",
        ));

        let prefs = run.job.preferences;
        let agent =
            RoleAgent::creative_editor(self.llm.clone(), prefs.focus, prefs.depth, prefs.tone);
        let output = self.call_agent(&agent, state, synthesis).await?;
        if output.trim().is_empty() {
            return Err(StageError::empty(state, "editor returned no text"));
        }

        run.finish(started);
        Ok(output)
    }
}
