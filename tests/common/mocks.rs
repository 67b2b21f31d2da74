//! Test doubles for the pipeline's capabilities.
//!
//! The LLM double recognises which agent is calling from the system prompt,
//! so scripts are keyed by role rather than by call order.

use async_trait::async_trait;
use parking_lot::Mutex;
use signal::agents::AgentRole;
use signal::types::{AppError, Report, ReportSummary, Result};
use signal::{ArticleSource, LLMClient, ReportStore};
use std::collections::HashMap;
use std::time::Duration;

fn role_of(system: &str) -> Option<AgentRole> {
    let role = if system.starts_with("You turn a reader's request") {
        AgentRole::QueryRefiner
    } else if system.starts_with("You profile news articles") {
        AgentRole::SourceProfiler
    } else if system.starts_with("You choose which profiled articles") {
        AgentRole::DiversitySelector
    } else if system.starts_with("You are a journalist") {
        AgentRole::DebateSynthesizer
    } else if system.starts_with("You rewrite a multi-source") {
        AgentRole::CreativeEditor
    } else {
        return None;
    };
    Some(role)
}

enum Reply {
    Text(String),
    Fail,
    Hang,
}

/// One recorded agent invocation.
#[derive(Debug, Clone)]
pub struct Call {
    pub role: AgentRole,
    pub system: String,
    pub input: String,
}

/// LLM double scripted per agent role.
#[derive(Default)]
pub struct ScriptedLLM {
    replies: Vec<(AgentRole, Reply)>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedLLM {
    pub fn new() -> Self {
        Self::default()
    }

    fn reply(mut self, role: AgentRole, reply: Reply) -> Self {
        self.replies.retain(|(r, _)| *r != role);
        self.replies.push((role, reply));
        self
    }

    pub fn refiner(self, text: &str) -> Self {
        self.reply(AgentRole::QueryRefiner, Reply::Text(text.to_string()))
    }

    pub fn profiler(self, text: &str) -> Self {
        self.reply(AgentRole::SourceProfiler, Reply::Text(text.to_string()))
    }

    pub fn selector(self, text: &str) -> Self {
        self.reply(AgentRole::DiversitySelector, Reply::Text(text.to_string()))
    }

    pub fn synthesizer(self, text: &str) -> Self {
        self.reply(AgentRole::DebateSynthesizer, Reply::Text(text.to_string()))
    }

    pub fn editor(self, text: &str) -> Self {
        self.reply(AgentRole::CreativeEditor, Reply::Text(text.to_string()))
    }

    /// Make `role` return an LLM error.
    pub fn failing(self, role: AgentRole) -> Self {
        self.reply(role, Reply::Fail)
    }

    /// Make `role` never answer.
    pub fn hanging(self, role: AgentRole) -> Self {
        self.reply(role, Reply::Hang)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn call_for(&self, role: AgentRole) -> Option<Call> {
        self.calls.lock().iter().find(|c| c.role == role).cloned()
    }
}

#[async_trait]
impl LLMClient for ScriptedLLM {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_with_system("", prompt).await
    }

    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        let role = role_of(system)
            .ok_or_else(|| AppError::LLM("unrecognised system prompt".to_string()))?;
        self.calls.lock().push(Call {
            role,
            system: system.to_string(),
            input: prompt.to_string(),
        });

        let reply = self
            .replies
            .iter()
            .find(|(r, _)| *r == role)
            .map(|(_, reply)| reply);
        match reply {
            Some(Reply::Text(text)) => Ok(text.clone()),
            Some(Reply::Fail) => Err(AppError::LLM(format!("{} unavailable", role.name()))),
            Some(Reply::Hang) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(AppError::LLM("woke up".to_string()))
            }
            None => Err(AppError::LLM(format!("no script for {}", role.name()))),
        }
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// Article source returning a fixed payload.
pub struct StaticSource {
    payload: Option<String>,
    queries: Mutex<Vec<String>>,
}

impl StaticSource {
    pub fn new(payload: &str) -> Self {
        Self {
            payload: Some(payload.to_string()),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            payload: None,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().clone()
    }
}

#[async_trait]
impl ArticleSource for StaticSource {
    async fn fetch(&self, query: &str) -> Result<String> {
        self.queries.lock().push(query.to_string());
        self.payload
            .clone()
            .ok_or_else(|| AppError::Search("search backend returned 503".to_string()))
    }

    fn name(&self) -> &str {
        "static"
    }
}

/// Store that rejects every write and finds nothing.
pub struct FailingReportStore;

#[async_trait]
impl ReportStore for FailingReportStore {
    async fn save_report(&self, _report: &Report) -> Result<()> {
        Err(AppError::Database("disk I/O error at /var/lib/signal.db".to_string()))
    }

    async fn get_report(&self, _job_id: &str) -> Result<Option<Report>> {
        Ok(None)
    }

    async fn list_reports(&self, _limit: usize) -> Result<Vec<ReportSummary>> {
        Ok(Vec::new())
    }
}

/// Count calls per role.
pub fn role_counts(calls: &[Call]) -> HashMap<&'static str, usize> {
    let mut counts = HashMap::new();
    for call in calls {
        *counts.entry(call.role.name()).or_insert(0) += 1;
    }
    counts
}
