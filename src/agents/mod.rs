//! Pipeline agents.
//!
//! An agent is a fixed role plus the instructions built for it, executed by
//! an [`LLMClient`]. The pipeline constructs one agent per stage, already
//! specialized for the job's focus, depth and tone.

pub mod prompts;

use crate::llm::LLMClient;
use crate::types::{Depth, Focus, Result, Tone};
use async_trait::async_trait;
use std::sync::Arc;

/// Base trait for all agents
#[async_trait]
pub trait Agent: Send + Sync {
    /// Execute the agent on the given input
    async fn execute(&self, input: &str) -> Result<String>;

    /// Get the agent's system prompt
    fn system_prompt(&self) -> String;

    /// Get the agent's role
    fn role(&self) -> AgentRole;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentRole {
    QueryRefiner,
    SourceProfiler,
    DiversitySelector,
    DebateSynthesizer,
    CreativeEditor,
}

impl AgentRole {
    pub fn name(&self) -> &'static str {
        match self {
            AgentRole::QueryRefiner => "Search Query Refiner",
            AgentRole::SourceProfiler => "Source Profiler",
            AgentRole::DiversitySelector => "Diversity Selector",
            AgentRole::DebateSynthesizer => "Debate Synthesizer",
            AgentRole::CreativeEditor => "Creative Editor",
        }
    }
}

/// Agent whose behavior is entirely defined by its role instructions.
pub struct RoleAgent {
    role: AgentRole,
    instructions: String,
    llm: Arc<dyn LLMClient>,
}

impl RoleAgent {
    pub fn new(role: AgentRole, instructions: String, llm: Arc<dyn LLMClient>) -> Self {
        Self {
            role,
            instructions,
            llm,
        }
    }

    pub fn query_refiner(llm: Arc<dyn LLMClient>) -> Self {
        Self::new(
            AgentRole::QueryRefiner,
            prompts::REFINER_PROMPT.to_string(),
            llm,
        )
    }

    pub fn source_profiler(llm: Arc<dyn LLMClient>, focus: Focus) -> Self {
        Self::new(AgentRole::SourceProfiler, prompts::profiler_prompt(focus), llm)
    }

    pub fn diversity_selector(llm: Arc<dyn LLMClient>, focus: Focus, depth: Depth) -> Self {
        Self::new(
            AgentRole::DiversitySelector,
            prompts::selector_prompt(focus, depth),
            llm,
        )
    }

    pub fn debate_synthesizer(llm: Arc<dyn LLMClient>, focus: Focus, depth: Depth) -> Self {
        Self::new(
            AgentRole::DebateSynthesizer,
            prompts::synthesizer_prompt(focus, depth),
            llm,
        )
    }

    pub fn creative_editor(
        llm: Arc<dyn LLMClient>,
        focus: Focus,
        depth: Depth,
        tone: Tone,
    ) -> Self {
        Self::new(
            AgentRole::CreativeEditor,
            prompts::editor_prompt(focus, depth, tone),
            llm,
        )
    }
}

#[async_trait]
impl Agent for RoleAgent {
    async fn execute(&self, input: &str) -> Result<String> {
        tracing::debug!(
            agent = self.role.name(),
            model = self.llm.model_name(),
            input_len = input.len(),
            "Running agent"
        );
        self.llm.generate_with_system(&self.instructions, input).await
    }

    fn system_prompt(&self) -> String {
        self.instructions.clone()
    }

    fn role(&self) -> AgentRole {
        self.role
    }
}
